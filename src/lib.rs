use std::sync::Arc;

use tokio::sync::watch;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;
pub mod admin_workspace;

pub use domain::{entities, use_cases, carousel, dropdown, timer};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{gateway, utils};

use admin_workspace::AdminWorkspace;
use carousel::{CarouselFrame, FrameSender};
use gateway::supabase::SupabaseGateway;
use repositories::gateway::{SharedAuthGateway, SharedGateway};
use use_cases::{auth::AuthHandler, gallery::{GalleryHandler, SlideView}, submission::SubmissionHandler};

pub type AppGalleryHandler = GalleryHandler<SharedGateway>;
pub type AppSubmissionHandler = SubmissionHandler<SharedGateway>;
pub type AppAuthHandler = AuthHandler<SharedAuthGateway>;

pub struct AppState {
    pub gallery: Arc<AppGalleryHandler>,
    pub submissions: AppSubmissionHandler,
    pub auth_handler: Arc<AppAuthHandler>,
    pub workspace: Arc<AdminWorkspace>,
    pub gateway: SharedGateway,
    pub hero_frames: watch::Receiver<Option<CarouselFrame<SlideView>>>,
    hero_sender: FrameSender<SlideView>,
    pub session_cookie: String,
    pub secure_cookies: bool,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &settings::AppConfig) -> Self {
        let supabase = Arc::new(SupabaseGateway::new(config));
        Self::with_gateways(config, supabase.clone(), supabase)
    }

    /// Builds the state over explicit gateways; tests pass in-memory ones.
    pub fn with_gateways(
        config: &settings::AppConfig,
        gateway: SharedGateway,
        auth_gateway: SharedAuthGateway,
    ) -> Self {
        let gallery = GalleryHandler::new(
            gateway.clone(),
            config.grid_limit,
            carousel::CarouselConfig::from(config),
        );
        let (hero_sender, hero_frames) = watch::channel(None);

        AppState {
            gallery: Arc::new(gallery),
            submissions: SubmissionHandler::new(gateway.clone()),
            auth_handler: Arc::new(AuthHandler::new(auth_gateway)),
            workspace: Arc::new(AdminWorkspace::new(gateway.clone())),
            gateway,
            hero_frames,
            hero_sender,
            session_cookie: config.session_cookie_name.clone(),
            secure_cookies: config.is_production(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Sender side of the hero carousel frames, for the background driver.
    pub fn hero_frame_sender(&self) -> FrameSender<SlideView> {
        self.hero_sender.clone()
    }

    /// Latest frame from the running hero carousel, or a fresh first frame
    /// when no driver has published yet.
    pub async fn current_hero_frame(&self) -> Option<CarouselFrame<SlideView>> {
        let live = self.hero_frames.borrow().clone();
        match live {
            Some(frame) => Some(frame),
            None => self.gallery.hero_frame().await,
        }
    }
}

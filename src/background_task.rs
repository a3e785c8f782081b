use std::sync::Arc;

use tokio::{
    sync::oneshot,
    time::{interval, sleep, Duration},
};

use crate::{
    carousel::{drive_carousel, Carousel, FrameSender},
    use_cases::gallery::SlideView,
    AppAuthHandler, AppGalleryHandler,
};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);
const HERO_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

pub async fn start_purge_task(auth: Arc<AppAuthHandler>) {
    let mut interval = interval(SESSION_PURGE_INTERVAL);

    loop {
        interval.tick().await;

        let purged = auth.purge_expired();
        if purged > 0 {
            tracing::info!("Purged {} expired admin sessions", purged);
        }
    }
}

/// Keeps the hero carousel running and publishes its frames.
///
/// The slides are re-read periodically; the carousel restarts only when they
/// actually changed. Stops once `shutdown` fires or its sender is dropped.
pub async fn start_hero_slider(
    gallery: Arc<AppGalleryHandler>,
    frames: FrameSender<SlideView>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let (mut slides, source) = gallery.load_slides().await;
    tracing::info!("Hero slider started with {} slides ({:?})", slides.len(), source);

    loop {
        let carousel = Carousel::new(slides.clone(), gallery.carousel_config().clone());
        let mut replacement = None;

        let cycle = async {
            tokio::select! {
                _ = &mut shutdown => {},
                fresh = changed_slides(&gallery, &slides) => replacement = Some(fresh),
            }
        };
        drive_carousel(carousel, frames.clone(), cycle).await;

        match replacement {
            Some(fresh) => {
                tracing::info!("Hero slides changed, restarting carousel with {}", fresh.len());
                slides = fresh;
            }
            None => break,
        }
    }

    frames.send_replace(None);
    tracing::info!("Hero slider stopped");
}

async fn changed_slides(gallery: &AppGalleryHandler, current: &[SlideView]) -> Vec<SlideView> {
    loop {
        sleep(HERO_REFRESH_INTERVAL).await;
        let (fresh, _) = gallery.load_slides().await;
        if fresh.as_slice() != current {
            return fresh;
        }
    }
}

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::{
    entities::{admin_entity::AdminEntity, output::Output, session::{AuthEvent, Session}, slider::SliderItem},
    repositories::gateway::SharedGateway,
    use_cases::{admin::ListFormController, auth::AuthSubscription},
};

pub type AdminController<E> = ListFormController<E, SharedGateway>;

/// The admin screens of one signed-in session.
pub struct AdminDesk {
    pub outputs: Mutex<AdminController<Output>>,
    pub sliders: Mutex<AdminController<SliderItem>>,
}

impl AdminDesk {
    fn new(gateway: SharedGateway) -> Self {
        AdminDesk {
            outputs: Mutex::new(ListFormController::new(gateway.clone())),
            sliders: Mutex::new(ListFormController::new(gateway)),
        }
    }
}

/// Picks the controller of an entity type out of a desk.
pub trait DeskEntity: AdminEntity {
    fn controller(desk: &AdminDesk) -> &Mutex<AdminController<Self>>;
}

impl DeskEntity for Output {
    fn controller(desk: &AdminDesk) -> &Mutex<AdminController<Self>> {
        &desk.outputs
    }
}

impl DeskEntity for SliderItem {
    fn controller(desk: &AdminDesk) -> &Mutex<AdminController<Self>> {
        &desk.sliders
    }
}

/// Admin desks keyed by access token. A desk is created on first use and
/// discarded when its session signs out.
pub struct AdminWorkspace {
    gateway: SharedGateway,
    desks: DashMap<String, Arc<AdminDesk>>,
}

impl AdminWorkspace {
    pub fn new(gateway: SharedGateway) -> Self {
        AdminWorkspace {
            gateway,
            desks: DashMap::new(),
        }
    }

    pub fn desk(&self, session: &Session) -> Arc<AdminDesk> {
        self.desks
            .entry(session.access_token.clone())
            .or_insert_with(|| {
                tracing::debug!(user_id = %session.user.id, "Opening admin desk");
                Arc::new(AdminDesk::new(self.gateway.for_session(&session.access_token)))
            })
            .clone()
    }

    pub fn discard(&self, access_token: &str) -> bool {
        self.desks.remove(access_token).is_some()
    }

    pub fn len(&self) -> usize {
        self.desks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.desks.is_empty()
    }
}

/// Discards desks as their sessions sign out; ends when the session store goes away.
pub async fn watch_sign_outs(workspace: Arc<AdminWorkspace>, mut subscription: AuthSubscription) {
    while let Some(event) = subscription.recv().await {
        if let AuthEvent::SignedOut { access_token } = event {
            if workspace.discard(&access_token) {
                tracing::debug!("Discarded admin desk after sign-out");
            }
        }
    }
}

use std::sync::{atomic::{AtomicUsize, Ordering}, Arc};

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;
use validator::Validate;

use crate::{
    entities::session::{AuthEvent, LoginRequest, Session},
    errors::{AppError, RemoteError},
    repositories::gateway::AuthGateway,
};

const EVENT_CAPACITY: usize = 64;

/// How long a session verified only through its token stays cached.
const VERIFIED_SESSION_TTL_MINUTES: i64 = 5;

/// Receives session changes until dropped.
pub struct AuthSubscription {
    receiver: broadcast::Receiver<AuthEvent>,
    subscribers: Arc<AtomicUsize>,
}

impl AuthSubscription {
    /// Next event, or `None` once the session store is gone.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Auth subscriber lagged, {} events skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.subscribers.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Admin sign-in and session lookups backed by the remote auth service.
pub struct AuthHandler<A>
where
    A: AuthGateway,
{
    pub auth_gateway: A,
    sessions: DashMap<String, Session>,
    events: broadcast::Sender<AuthEvent>,
    subscribers: Arc<AtomicUsize>,
}

impl<A> AuthHandler<A>
where
    A: AuthGateway,
{
    pub fn new(auth_gateway: A) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        AuthHandler {
            auth_gateway,
            sessions: DashMap::new(),
            events,
            subscribers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Signs an admin in with email and password
    pub async fn sign_in(&self, request: &LoginRequest) -> Result<Session, AppError> {
        request.validate()?;

        let session = self.auth_gateway
            .sign_in_with_password(&request.email, &request.password)
            .await
            .map_err(|e| match e {
                RemoteError::Api { status: 400 | 401 | 422, message, .. } => {
                    tracing::warn!("Admin sign-in rejected");
                    AppError::InvalidCredentials(message)
                }
                other => {
                    tracing::error!("Admin sign-in failed: {}", other);
                    AppError::Remote(other)
                }
            })?;

        self.sessions.insert(session.access_token.clone(), session.clone());
        self.publish(AuthEvent::SignedIn { user_id: session.user.id.clone() });

        tracing::info!(user_id = %session.user.id, "Admin signed in");
        Ok(session)
    }

    /// Looks up the session behind `access_token`, asking the auth service on a cache miss.
    pub async fn get_session(&self, access_token: &str) -> Option<Session> {
        let now = Utc::now();

        if let Some(session) = self.sessions.get(access_token).map(|s| s.clone()) {
            if !session.is_expired(now) {
                return Some(session);
            }
            self.sessions.remove(access_token);
            return None;
        }

        match self.auth_gateway.get_user(access_token).await {
            Ok(user) => {
                let session = Session {
                    access_token: access_token.to_string(),
                    refresh_token: String::new(),
                    expires_at: now + Duration::minutes(VERIFIED_SESSION_TTL_MINUTES),
                    user,
                };
                self.sessions.insert(access_token.to_string(), session.clone());
                Some(session)
            }
            Err(RemoteError::Api { status: 401 | 403, .. }) => None,
            Err(e) => {
                tracing::warn!("Session lookup failed: {}", e);
                None
            }
        }
    }

    /// Ends the session locally even when the remote logout fails.
    pub async fn sign_out(&self, access_token: &str) {
        if let Err(e) = self.auth_gateway.sign_out(access_token).await {
            tracing::warn!("Remote sign-out failed: {}", e);
        }

        self.sessions.remove(access_token);
        self.publish(AuthEvent::SignedOut { access_token: access_token.to_string() });
        tracing::info!("Admin signed out");
    }

    pub fn subscribe(&self) -> AuthSubscription {
        self.subscribers.fetch_add(1, Ordering::SeqCst);
        AuthSubscription {
            receiver: self.events.subscribe(),
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Drops cached sessions past their expiry; returns how many went.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(now));
        before.saturating_sub(self.sessions.len())
    }

    fn publish(&self, event: AuthEvent) {
        // no receivers is fine, nobody is listening yet
        let _ = self.events.send(event);
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    entities::session::{Session, SessionUser},
    errors::RemoteError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Row selection: at most one equality filter, one ordering and a limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowQuery {
    pub filter: Option<(String, String)>,
    pub order_by: Option<(String, SortDirection)>,
    pub limit: Option<usize>,
}

impl RowQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filter = Some((column.to_string(), value.to_string()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { SortDirection::Ascending } else { SortDirection::Descending };
        self.order_by = Some((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Row and object storage operations of the hosted backend.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn fetch_rows(&self, table: &str, query: &RowQuery) -> Result<Vec<Value>, RemoteError>;
    async fn insert_row(&self, table: &str, record: &Value) -> Result<(), RemoteError>;
    async fn update_row(&self, table: &str, id: i64, record: &Value) -> Result<(), RemoteError>;
    async fn delete_row(&self, table: &str, id: i64) -> Result<(), RemoteError>;
    /// Stores `bytes` under `path` without overwriting; returns the stored path.
    async fn upload_file(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, RemoteError>;
    fn public_url(&self, bucket: &str, path: &str) -> String;
    /// A gateway acting with the rights of the given admin session.
    fn for_session(&self, access_token: &str) -> SharedGateway;
}

pub type SharedGateway = Arc<dyn RemoteGateway>;

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, RemoteError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), RemoteError>;
    async fn get_user(&self, access_token: &str) -> Result<SessionUser, RemoteError>;
}

pub type SharedAuthGateway = Arc<dyn AuthGateway>;

#[async_trait]
impl<T: RemoteGateway + ?Sized> RemoteGateway for Arc<T> {
    async fn fetch_rows(&self, table: &str, query: &RowQuery) -> Result<Vec<Value>, RemoteError> {
        (**self).fetch_rows(table, query).await
    }

    async fn insert_row(&self, table: &str, record: &Value) -> Result<(), RemoteError> {
        (**self).insert_row(table, record).await
    }

    async fn update_row(&self, table: &str, id: i64, record: &Value) -> Result<(), RemoteError> {
        (**self).update_row(table, id, record).await
    }

    async fn delete_row(&self, table: &str, id: i64) -> Result<(), RemoteError> {
        (**self).delete_row(table, id).await
    }

    async fn upload_file(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, RemoteError> {
        (**self).upload_file(bucket, path, bytes, content_type).await
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        (**self).public_url(bucket, path)
    }

    fn for_session(&self, access_token: &str) -> SharedGateway {
        (**self).for_session(access_token)
    }
}

#[async_trait]
impl<T: AuthGateway + ?Sized> AuthGateway for Arc<T> {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        (**self).sign_in_with_password(email, password).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), RemoteError> {
        (**self).sign_out(access_token).await
    }

    async fn get_user(&self, access_token: &str) -> Result<SessionUser, RemoteError> {
        (**self).get_user(access_token).await
    }
}

/// Decodes fetched rows, failing on the first row that does not match `T`.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, RemoteError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(RemoteError::from))
        .collect()
}

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE}, Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    entities::session::{Session, SessionUser},
    errors::RemoteError,
    repositories::gateway::{AuthGateway, RemoteGateway, RowQuery, SharedGateway},
    settings::AppConfig,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct Endpoint {
    base_url: String,
    api_key: String,
}

/// HTTP client for a Supabase project (PostgREST rows, Storage objects, GoTrue auth).
///
/// A client built from incomplete configuration is still usable as a value;
/// every call on it fails with [`RemoteError::NotConfigured`].
#[derive(Clone)]
pub struct SupabaseGateway {
    http: Client,
    endpoint: Option<Arc<Endpoint>>,
    access_token: Option<String>,
}

impl SupabaseGateway {
    pub fn new(config: &AppConfig) -> Self {
        let endpoint = match (config.remote_base_url(), config.supabase_anon_key.trim()) {
            (Some(url), key) if !key.is_empty() => Some(Arc::new(Endpoint {
                base_url: url.as_str().trim_end_matches('/').to_string(),
                api_key: key.to_string(),
            })),
            _ => None,
        };

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        SupabaseGateway { http, endpoint, access_token: None }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    fn endpoint(&self) -> Result<&Endpoint, RemoteError> {
        self.endpoint.as_deref().ok_or(RemoteError::NotConfigured)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, RemoteError> {
        self.build(method, path, self.access_token.as_deref())
    }

    fn request_as(&self, method: Method, path: &str, access_token: &str) -> Result<RequestBuilder, RemoteError> {
        self.build(method, path, Some(access_token))
    }

    /// Every call carries the project key; the bearer is the session token when there is one.
    fn build(&self, method: Method, path: &str, bearer: Option<&str>) -> Result<RequestBuilder, RemoteError> {
        let endpoint = self.endpoint()?;
        let bearer = bearer.unwrap_or(&endpoint.api_key);

        Ok(self.http
            .request(method, format!("{}{}", endpoint.base_url, path))
            .header("apikey", &endpoint.api_key)
            .header(AUTHORIZATION, format!("Bearer {bearer}")))
    }
}

fn encode_object_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn row_path(table: &str) -> String {
    format!("/rest/v1/{}", urlencoding::encode(table))
}

/// Turns a non-success response into the provider's own message.
async fn check(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = ["message", "error_description", "msg", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
    let hint = body.get("hint").and_then(Value::as_str).map(str::to_string);

    tracing::debug!(status = status.as_u16(), %message, "Remote request rejected");
    Err(RemoteError::Api { status: status.as_u16(), message, hint })
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: SessionUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self.expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| now + chrono::Duration::seconds(self.expires_in));

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

#[async_trait]
impl RemoteGateway for SupabaseGateway {
    async fn fetch_rows(&self, table: &str, query: &RowQuery) -> Result<Vec<Value>, RemoteError> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        if let Some((column, value)) = &query.filter {
            params.push((column.clone(), format!("eq.{value}")));
        }
        if let Some((column, direction)) = &query.order_by {
            params.push(("order".to_string(), format!("{column}.{}", direction.as_str())));
        }
        if let Some(limit) = query.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        let response = self.request(Method::GET, &row_path(table))?
            .query(&params)
            .send()
            .await?;

        Ok(check(response).await?.json::<Vec<Value>>().await?)
    }

    async fn insert_row(&self, table: &str, record: &Value) -> Result<(), RemoteError> {
        let response = self.request(Method::POST, &row_path(table))?
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await?;

        check(response).await.map(|_| ())
    }

    async fn update_row(&self, table: &str, id: i64, record: &Value) -> Result<(), RemoteError> {
        let response = self.request(Method::PATCH, &row_path(table))?
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        check(response).await.map(|_| ())
    }

    async fn delete_row(&self, table: &str, id: i64) -> Result<(), RemoteError> {
        let response = self.request(Method::DELETE, &row_path(table))?
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;

        check(response).await.map(|_| ())
    }

    async fn upload_file(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, RemoteError> {
        let object = format!("/storage/v1/object/{}/{}", urlencoding::encode(bucket), encode_object_path(path));
        let response = self.request(Method::POST, &object)?
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        check(response).await?;
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        let base = self.endpoint.as_deref().map(|e| e.base_url.as_str()).unwrap_or_default();
        format!(
            "{base}/storage/v1/object/public/{}/{}",
            urlencoding::encode(bucket),
            encode_object_path(path)
        )
    }

    fn for_session(&self, access_token: &str) -> SharedGateway {
        Arc::new(SupabaseGateway {
            http: self.http.clone(),
            endpoint: self.endpoint.clone(),
            access_token: Some(access_token.to_string()),
        })
    }
}

#[async_trait]
impl AuthGateway for SupabaseGateway {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let response = self.request(Method::POST, "/auth/v1/token")?
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        let token: TokenResponse = check(response).await?.json().await?;
        Ok(token.into_session(Utc::now()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), RemoteError> {
        let response = self.request_as(Method::POST, "/auth/v1/logout", access_token)?
            .send()
            .await?;

        check(response).await.map(|_| ())
    }

    async fn get_user(&self, access_token: &str) -> Result<SessionUser, RemoteError> {
        let response = self.request_as(Method::GET, "/auth/v1/user", access_token)?
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }
}

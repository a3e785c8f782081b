#![allow(dead_code)]

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use dh14th_archive::{
    admin_workspace::watch_sign_outs,
    entities::session::{Session, SessionUser},
    errors::RemoteError,
    middlewares::auth::AuthMiddleware,
    repositories::gateway::{AuthGateway, RemoteGateway, RowQuery, SharedGateway, SortDirection},
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    AppState,
};
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::{json, Value};
use std::{cmp::Ordering, collections::HashMap, net::TcpListener, sync::Arc, time::Duration};
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@dh14.test";
pub const ADMIN_PASSWORD: &str = "correct-horse";

#[derive(Default)]
struct Store {
    tables: HashMap<String, Vec<Value>>,
    next_id: i64,
    files: HashMap<String, Vec<u8>>,
    calls: Vec<String>,
    offline: bool,
    credentials: Vec<(String, String)>,
    tokens: HashMap<String, SessionUser>,
}

/// Rows, objects and sessions kept in memory; clones share the same store.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    store: Arc<Mutex<Store>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admin(email: &str, password: &str) -> Self {
        let gateway = Self::new();
        gateway.store.lock().credentials.push((email.to_string(), password.to_string()));
        gateway
    }

    /// Adds rows as-is; rows without an id get the next free one.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut store = self.store.lock();
        for mut row in rows {
            store.next_id += 1;
            let next = store.next_id;
            match row.get("id").and_then(Value::as_i64) {
                Some(id) => store.next_id = store.next_id.max(id),
                None => row["id"] = json!(next),
            }
            store.tables.entry(table.to_string()).or_default().push(row);
        }
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.store.lock().tables.get(table).cloned().unwrap_or_default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.store.lock().offline = offline;
    }

    pub fn calls(&self) -> Vec<String> {
        self.store.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.store.lock().calls.clear();
    }

    pub fn stored_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.store.lock().files.keys().cloned().collect();
        files.sort();
        files
    }

    pub fn shared(&self) -> SharedGateway {
        Arc::new(self.clone())
    }

    fn record(&self, call: String) -> Result<(), RemoteError> {
        let mut store = self.store.lock();
        store.calls.push(call);
        if store.offline {
            return Err(RemoteError::Transport("connection refused".into()));
        }
        Ok(())
    }
}

fn matches_filter(row: &Value, filter: &Option<(String, String)>) -> bool {
    let Some((column, expected)) = filter else {
        return true;
    };
    match row.get(column) {
        Some(Value::String(value)) => value == expected,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == *expected,
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or_default()
            .partial_cmp(&y.as_f64().unwrap_or_default())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl RemoteGateway for InMemoryGateway {
    async fn fetch_rows(&self, table: &str, query: &RowQuery) -> Result<Vec<Value>, RemoteError> {
        self.record(format!("fetch:{table}"))?;
        let store = self.store.lock();

        let mut rows: Vec<Value> = store
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|row| matches_filter(row, &query.filter)).cloned().collect())
            .unwrap_or_default();

        if let Some((column, direction)) = &query.order_by {
            rows.sort_by(|a, b| {
                let ordering = compare(&a[column.as_str()], &b[column.as_str()]);
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert_row(&self, table: &str, record: &Value) -> Result<(), RemoteError> {
        self.record(format!("insert:{table}"))?;
        let mut store = self.store.lock();
        store.next_id += 1;
        let id = store.next_id;

        let mut row = record.clone();
        row["id"] = json!(id);
        let created_at = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap() + ChronoDuration::seconds(id);
        row["created_at"] = json!(created_at.to_rfc3339());

        store.tables.entry(table.to_string()).or_default().push(row);
        Ok(())
    }

    async fn update_row(&self, table: &str, id: i64, record: &Value) -> Result<(), RemoteError> {
        self.record(format!("update:{table}:{id}"))?;
        let mut store = self.store.lock();
        let row = store
            .tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|row| row["id"].as_i64() == Some(id)));

        if let (Some(row), Some(fields)) = (row, record.as_object()) {
            for (key, value) in fields {
                row[key.as_str()] = value.clone();
            }
        }
        Ok(())
    }

    async fn delete_row(&self, table: &str, id: i64) -> Result<(), RemoteError> {
        self.record(format!("delete:{table}:{id}"))?;
        let mut store = self.store.lock();
        if let Some(rows) = store.tables.get_mut(table) {
            rows.retain(|row| row["id"].as_i64() != Some(id));
        }
        Ok(())
    }

    async fn upload_file(&self, bucket: &str, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String, RemoteError> {
        self.record(format!("upload:{bucket}:{path}"))?;
        let mut store = self.store.lock();
        let key = format!("{bucket}/{path}");
        if store.files.contains_key(&key) {
            return Err(RemoteError::Api {
                status: 409,
                message: "The resource already exists".into(),
                hint: None,
            });
        }
        store.files.insert(key, bytes);
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("https://storage.test/object/public/{bucket}/{path}")
    }

    fn for_session(&self, _access_token: &str) -> SharedGateway {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl AuthGateway for InMemoryGateway {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        self.record("auth:sign_in".into())?;
        let mut store = self.store.lock();
        let known = store.credentials.iter().any(|(e, p)| e == email && p == password);
        if !known {
            return Err(RemoteError::Api {
                status: 400,
                message: "Invalid login credentials".into(),
                hint: None,
            });
        }

        let user = SessionUser { id: Uuid::new_v4().to_string(), email: Some(email.to_string()) };
        let access_token = format!("token-{}", Uuid::new_v4());
        store.tokens.insert(access_token.clone(), user.clone());

        Ok(Session {
            access_token,
            refresh_token: format!("refresh-{}", Uuid::new_v4()),
            expires_at: Utc::now() + ChronoDuration::hours(1),
            user,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), RemoteError> {
        self.record("auth:sign_out".into())?;
        self.store.lock().tokens.remove(access_token);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<SessionUser, RemoteError> {
        self.record("auth:get_user".into())?;
        self.store.lock().tokens.get(access_token).cloned().ok_or(RemoteError::Api {
            status: 401,
            message: "invalid JWT".into(),
            hint: None,
        })
    }
}

pub fn output_row(title: &str, author: &str) -> Value {
    json!({
        "title": title,
        "description": format!("About {title}"),
        "image_url": format!("https://cdn.test/{title}.jpg"),
        "author": author,
        "category": "Poster",
    })
}

pub fn slide_row(id: i64, order: i32) -> Value {
    json!({
        "id": id,
        "title": format!("Slide {id}"),
        "image_url": format!("https://cdn.test/slide-{id}.jpg"),
        "link_url": "",
        "order": order,
    })
}

pub struct TestApp {
    pub state: Arc<AppState>,
    pub address: String,
    pub client: Client,
    pub config: AppConfig,
    pub gateway: InMemoryGateway,
}

impl TestApp {
    pub async fn spawn(gateway: InMemoryGateway) -> Self {
        let config = test_config();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let state = Arc::new(AppState::with_gateways(
            &config,
            gateway.shared(),
            Arc::new(gateway.clone()),
        ));

        tokio::spawn(watch_sign_outs(
            Arc::clone(&state.workspace),
            state.auth_handler.subscribe(),
        ));

        let state_clone = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::from(state_clone.clone()))
                .wrap(AuthMiddleware)
                .wrap(NormalizePath::trim())
                .configure(configure_routes)
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(config.worker_count)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(format!("{}/nav", address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            state,
            address,
            client,
            config,
            gateway,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "dh14th archive test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        worker_count: 1,
        cors_allowed_origins: vec!["*".to_string()],
        ..AppConfig::default()
    }
}

#[async_trait]
pub trait AdminTestHelpers: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> reqwest::Response;
    async fn login_admin(&self) -> String;
    async fn admin_get(&self, path: &str, token: &str) -> reqwest::Response;
    async fn admin_post(&self, path: &str, token: &str) -> reqwest::Response;
    async fn admin_patch(&self, path: &str, token: &str, body: &Value) -> reqwest::Response;
    async fn admin_delete(&self, path: &str, token: &str) -> reqwest::Response;
}

#[async_trait]
impl AdminTestHelpers for TestApp {
    async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/admin/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to send login request")
    }

    async fn login_admin(&self) -> String {
        let response = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            panic!("Login failed: ({}): {}", status, body);
        }

        let body: Value = response.json().await.expect("Failed to parse login response");
        body["access_token"].as_str().expect("access_token missing").to_string()
    }

    async fn admin_get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client.get(self.url(path)).bearer_auth(token).send().await.unwrap()
    }

    async fn admin_post(&self, path: &str, token: &str) -> reqwest::Response {
        self.client.post(self.url(path)).bearer_auth(token).send().await.unwrap()
    }

    async fn admin_patch(&self, path: &str, token: &str, body: &Value) -> reqwest::Response {
        self.client.patch(self.url(path)).bearer_auth(token).json(body).send().await.unwrap()
    }

    async fn admin_delete(&self, path: &str, token: &str) -> reqwest::Response {
        self.client.delete(self.url(path)).bearer_auth(token).send().await.unwrap()
    }
}

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};
use url::Url;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub supabase_url: String,

    #[serde(default)]
    pub supabase_anon_key: String,

    #[serde(default = "default_slider_autoplay_ms")]
    pub slider_autoplay_ms: u64,

    #[serde(default = "default_slider_transition_ms")]
    pub slider_transition_ms: u64,

    #[serde(default = "default_grid_limit")]
    pub grid_limit: usize,

    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "dh14th-archive".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_slider_autoplay_ms() -> u64 {
    2000
}
fn default_slider_transition_ms() -> u64 {
    700
}
fn default_grid_limit() -> usize {
    15
}
fn default_session_cookie_name() -> String {
    "dh14_admin_session".to_string()
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            cors_allowed_origins: default_cors_origins(),
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            slider_autoplay_ms: default_slider_autoplay_ms(),
            slider_transition_ms: default_slider_transition_ms(),
            grid_limit: default_grid_limit(),
            session_cookie_name: default_session_cookie_name(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true)
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Existing deployments export the same values under VITE_-prefixed names
        config.supabase_url = fill_from_env(config.supabase_url, &["SUPABASE_URL", "VITE_SUPABASE_URL"]);
        config.supabase_anon_key = fill_from_env(config.supabase_anon_key, &["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"]);

        config.validate()?;
        config.warn_on_missing_remote();
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.worker_count == 0 {
            errors.push("WORKER_COUNT must be at least 1");
        }
        if self.slider_autoplay_ms == 0 {
            errors.push("SLIDER_AUTOPLAY_MS must be greater than zero");
        }
        if self.slider_transition_ms >= self.slider_autoplay_ms {
            errors.push("SLIDER_TRANSITION_MS must be shorter than SLIDER_AUTOPLAY_MS");
        }
        if self.grid_limit == 0 {
            errors.push("GRID_LIMIT must be at least 1");
        }
        if self.session_cookie_name.trim().is_empty() {
            errors.push("SESSION_COOKIE_NAME cannot be empty");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    /// Missing remote credentials never stop the server; every gateway call
    /// reports the problem instead.
    fn warn_on_missing_remote(&self) {
        if self.supabase_url.trim().is_empty() || self.supabase_anon_key.trim().is_empty() {
            tracing::warn!("Supabase URL or anon key is missing, remote calls will fail");
        } else if self.remote_base_url().is_none() {
            tracing::warn!("Supabase URL {:?} is not a valid URL, remote calls will fail", self.supabase_url);
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn remote_base_url(&self) -> Option<Url> {
        let trimmed = self.supabase_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        Url::parse(trimmed).ok()
    }

    pub fn slider_autoplay(&self) -> Duration {
        Duration::from_millis(self.slider_autoplay_ms)
    }

    pub fn slider_transition(&self) -> Duration {
        Duration::from_millis(self.slider_transition_ms)
    }
}

fn fill_from_env(current: String, env_keys: &[&str]) -> String {
    if !current.trim().is_empty() {
        return current;
    }
    env_keys
        .iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_default()
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &self.supabase_anon_key.redact())
            .field("slider_autoplay_ms", &self.slider_autoplay_ms)
            .field("slider_transition_ms", &self.slider_transition_ms)
            .field("grid_limit", &self.grid_limit)
            .field("session_cookie_name", &self.session_cookie_name)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

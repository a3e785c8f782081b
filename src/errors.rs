use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    Remote(RemoteError),
    NotFound(String),
    Conflict(String),
    UnauthorizedAccess,
    InvalidCredentials(String),
    Upload(UploadError),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}", messages)
            }
            AppError::Remote(err) => write!(f, "{}", err),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::UnauthorizedAccess => write!(f, "Unauthorized access"),
            AppError::InvalidCredentials(msg) => write!(f, "{}", msg),
            AppError::Upload(err) => write!(f, "{}", err),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg)
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(errors) => {
                serde_json::json!({
                    "error": "Validation failed",
                    "message": self.to_string(),
                    "details": errors
                })
            }
            AppError::Remote(RemoteError::Api { message, hint, .. }) => {
                serde_json::json!({
                    "error": "Remote service error",
                    "message": message,
                    "hint": hint
                })
            }
            AppError::UnauthorizedAccess => {
                serde_json::json!({
                    "error": self.to_string(),
                    "redirect": crate::constants::LOGIN_ROUTE
                })
            }
            _ => {
                serde_json::json!({"error": self.to_string()})
            }
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Remote(RemoteError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Remote(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::UnauthorizedAccess | AppError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            AppError::Upload(UploadError::TooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(|e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                })
            })
            .collect();

        // field_errors() is backed by a map, keep the output stable
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::ValidationError(field_errors)
    }
}

impl From<RemoteError> for AppError {
    fn from(err: RemoteError) -> Self {
        AppError::Remote(err)
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::Upload(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(format!("IO error: {}", err))
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        AppError::Upload(UploadError::Malformed(err.to_string()))
    }
}

impl AppError {
    pub fn to_http_response(&self) -> HttpResponse {
        self.error_response()
    }

    /// Single-field validation failure raised before any remote call.
    pub fn required(field: &str, message: &str) -> Self {
        AppError::ValidationError(vec![FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }])
    }
}

/// Failures reported by the hosted data/auth/storage service.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum RemoteError {
    #[display("Remote service is not configured")]
    NotConfigured,

    #[display("Network error: {_0}")]
    Transport(String),

    #[display("{message}")]
    Api {
        status: u16,
        message: String,
        hint: Option<String>,
    },

    #[display("Unexpected response from remote service: {_0}")]
    Decode(String),
}

impl std::error::Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Decode(err.to_string())
    }
}

#[derive(Debug, Display)]
pub enum UploadError {
    #[display("No file was provided")]
    MissingFile,

    #[display("File is empty")]
    EmptyFile,

    #[display("File exceeds the {_0} byte limit")]
    TooLarge(usize),

    #[display("Only image files can be uploaded (detected {_0})")]
    NotAnImage(String),

    #[display("Malformed upload: {_0}")]
    Malformed(String),
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

use actix_multipart::form::MultipartFormConfig;
use actix_web::{
    web,
    http::StatusCode,
    ResponseError,
    HttpResponse,
    error::{JsonPayloadError, PathError, QueryPayloadError},
};
use serde_json::json;

/// Upper bound on a whole multipart body; single files are checked against the configured limit.
const MULTIPART_TOTAL_LIMIT: usize = 50 * 1024 * 1024;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        JsonError::from(err).into()
    }));
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        JsonError::from(err).into()
    }));
    cfg.app_data(web::PathConfig::default().error_handler(|err, _req| {
        JsonError::from(err).into()
    }));
    cfg.app_data(
        MultipartFormConfig::default()
            .total_limit(MULTIPART_TOTAL_LIMIT)
            .error_handler(|err, _req| JsonError {
                message: format!("Multipart error: {}", err),
                status: StatusCode::BAD_REQUEST,
            }.into())
    );
}

#[derive(Debug)]
pub struct JsonError {
    message: String,
    status: StatusCode
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status).json(json!({ "error": self.message }))
    }
}

impl From<JsonPayloadError> for JsonError {
    fn from(err: JsonPayloadError) -> Self {
        JsonError {
            message: format!("JSON payload error: {}", err),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl From<QueryPayloadError> for JsonError {
    fn from(err: QueryPayloadError) -> Self {
        JsonError {
            message: format!("Query error: {}", err),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl From<PathError> for JsonError {
    fn from(err: PathError) -> Self {
        JsonError {
            message: format!("Path error: {}", err),
            status: StatusCode::NOT_FOUND,
        }
    }
}

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file uploaded!")]
    NoFileUploaded,

    #[error("No file selected!")]
    NoFileSelected,

    #[error("Invalid file type! Please upload an image.")]
    InvalidFileType,

    #[error("Uploaded file exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Invalid image file")]
    InvalidImage(#[source] image::ImageError),

    #[error("Malformed multipart payload: {0}")]
    Multipart(String),

    #[error("model loading error ({path}): {message}")]
    ModelLoad { path: String, message: String },

    #[error("inference error: {0}")]
    Inference(String),

    #[error("model returned class index {index}, but only {classes} labels are known")]
    UnknownClass { index: usize, classes: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("blocking task failed")]
    Blocking,
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        Self::Multipart(err.to_string())
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(_: actix_web::error::BlockingError) -> Self {
        Self::Blocking
    }
}

impl AppError {
    pub fn model_load(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::ModelLoad {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn inference(err: impl std::fmt::Display) -> Self {
        Self::Inference(err.to_string())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoFileUploaded
            | AppError::NoFileSelected
            | AppError::InvalidFileType
            | AppError::InvalidImage(_)
            | AppError::Multipart(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::warn!("rejected request: {}", self);
        }
        HttpResponse::build(status).json(json!({ "error": self.to_string() }))
    }
}

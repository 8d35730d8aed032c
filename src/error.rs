use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Incorrect password")]
    IncorrectPassword,

    /// External tool finished but the expected output is missing,
    /// or the tool could not be started at all.
    #[error("Conversion failed")]
    ConversionFailed,

    #[error("{0}")]
    Conversion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl From<lopdf::Error> for AppError {
    fn from(err: lopdf::Error) -> Self {
        AppError::Conversion(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Conversion(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::IncorrectPassword => {
                (StatusCode::BAD_REQUEST, "Incorrect password".to_string())
            }
            AppError::Multipart(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::ConversionFailed => {
                tracing::error!("Conversion produced no output");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Conversion failed".to_string(),
                )
            }
            AppError::Conversion(msg) => {
                tracing::error!("Conversion error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

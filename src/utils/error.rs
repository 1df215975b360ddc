use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Model not loaded")]
    ModelUnavailable,

    #[error("File is not an image")]
    InvalidContentType,

    #[error("{0}")]
    Inference(String),

    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // 解码失败时直接透传底层信息
    #[error("{0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("{0}")]
    Ort(#[from] ort::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ClassifierError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClassifierError::InvalidContentType => StatusCode::BAD_REQUEST,
            ClassifierError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ClassifierError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ClassifierError::ModelUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ClassifierError::ModelUnavailable => "MODEL_UNAVAILABLE",
            ClassifierError::InvalidContentType => "INVALID_CONTENT_TYPE",
            ClassifierError::Inference(_) => "INFERENCE_ERROR",
            ClassifierError::ModelLoad(_) => "MODEL_LOAD_ERROR",
            ClassifierError::InvalidInput(_) => "INVALID_INPUT",
            ClassifierError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ClassifierError::Config(_) => "CONFIG_ERROR",
            ClassifierError::Io(_) => "IO_ERROR",
            ClassifierError::ImageDecode(_) => "IMAGE_DECODE_ERROR",
            ClassifierError::Ort(_) => "ORT_ERROR",
            ClassifierError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ClassifierError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.to_string();

        if status.is_server_error() {
            tracing::error!("Request failed: {} ({}, {})", detail, self.error_code(), status);
        } else {
            tracing::warn!("Request rejected: {} ({}, {})", detail, self.error_code(), status);
        }

        let body = serde_json::json!({ "detail": detail });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_messages() {
        assert_eq!(ClassifierError::ModelUnavailable.to_string(), "Model not loaded");
        assert_eq!(ClassifierError::InvalidContentType.to_string(), "File is not an image");
        assert_eq!(
            ClassifierError::Inference("bad tensor".to_string()).to_string(),
            "bad tensor"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ClassifierError::InvalidContentType.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ClassifierError::InvalidInput("missing".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ClassifierError::PayloadTooLarge("limit".into()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ClassifierError::ModelUnavailable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ClassifierError::Inference("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

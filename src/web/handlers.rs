use crate::{
    inference::{InferencePipeline, PredictionResult},
    utils::error::ClassifierError,
    web::AppState,
    Result,
};
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use std::time::Instant;

/// 上传字段名
const FILE_FIELD: &str = "file";

/// 存活检查
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Cataract Detection API is running" }))
}

/// 健康检查端点，模型缺失时仍返回200
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let stats = state.manager.get_stats();

    Json(json!({
        "status": "ok",
        "model_loaded": stats.model_loaded,
        "device": stats.device,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Multipart单文件分类
pub async fn predict_handler(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResult>> {
    let start_time = Instant::now();
    let mut multipart = multipart
        .map_err(|e| ClassifierError::InvalidInput(format!("Invalid multipart request: {}", e)))?;

    let mut upload: Option<(Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart field", e))?
    {
        let field_name = field.name().unwrap_or("unknown").to_string();

        if field_name != FILE_FIELD {
            tracing::debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        let content_type = field.content_type().map(|ct| ct.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read file data", e))?;

        tracing::debug!(
            "Received file: {} bytes, content_type={:?}",
            data.len(),
            content_type
        );
        upload = Some((content_type, data));
    }

    let (content_type, data) = upload.ok_or_else(|| {
        ClassifierError::InvalidInput("No image file provided".to_string())
    })?;

    let result =
        InferencePipeline::predict(state.manager.model(), content_type.as_deref(), data).await?;

    tracing::info!(
        "Prediction completed: prediction={}, confidence={:.2}, time={:.3}s",
        result.prediction,
        result.confidence,
        start_time.elapsed().as_secs_f32()
    );

    Ok(Json(result))
}

/// 读取multipart失败：超出请求体上限为413，其余为400
fn multipart_error(context: &str, e: MultipartError) -> ClassifierError {
    let message = format!("{}: {}", context, e.body_text());
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ClassifierError::PayloadTooLarge(message)
    } else {
        ClassifierError::InvalidInput(message)
    }
}

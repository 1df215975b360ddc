use crate::{
    image::{ImageLoader, ImagePreprocessor},
    inference::PredictionResult,
    models::{InferenceModel, SharedModel, NUM_CLASSES},
    utils::error::ClassifierError,
    Result,
};
use axum::body::Bytes;
use ndarray::{ArrayView1, Axis};
use std::time::Instant;

/// 图像媒体类型前缀
const IMAGE_MEDIA_PREFIX: &str = "image/";

/// 单图分类流水线
pub struct InferencePipeline;

impl InferencePipeline {
    /// 请求入口：依次检查模型、内容类型，然后在阻塞线程池中推理
    pub async fn predict(
        model: Option<SharedModel>,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> Result<PredictionResult> {
        let model = model.ok_or(ClassifierError::ModelUnavailable)?;
        Self::check_content_type(content_type)?;

        tokio::task::spawn_blocking(move || Self::predict_bytes(model.as_ref(), &bytes))
            .await
            .map_err(|e| ClassifierError::Inference(format!("Inference task failed: {}", e)))?
    }

    pub fn check_content_type(content_type: Option<&str>) -> Result<()> {
        match content_type {
            Some(ct) if ct.starts_with(IMAGE_MEDIA_PREFIX) => Ok(()),
            _ => Err(ClassifierError::InvalidContentType),
        }
    }

    /// 解码 -> 预处理 -> 前向 -> softmax
    pub fn predict_bytes(model: &dyn InferenceModel, bytes: &[u8]) -> Result<PredictionResult> {
        let start_time = Instant::now();

        let image = ImageLoader::from_bytes(bytes)?;
        let input = ImagePreprocessor::preprocess(&image).insert_axis(Axis(0));
        let preprocess_time = start_time.elapsed();

        let logits = model.forward(input)?;
        let probabilities = softmax(logits.row(0))?;

        tracing::debug!(
            "Inference on {}: logits={:?}, preprocess={:.3}s, total={:.3}s",
            model.device(),
            logits.row(0).to_vec(),
            preprocess_time.as_secs_f32(),
            start_time.elapsed().as_secs_f32()
        );

        Ok(PredictionResult::from_probabilities(probabilities))
    }
}

/// 数值稳定的softmax
pub fn softmax(logits: ArrayView1<f32>) -> Result<[f32; NUM_CLASSES]> {
    if logits.len() != NUM_CLASSES {
        return Err(ClassifierError::Inference(format!(
            "Expected {} logits, got {}",
            NUM_CLASSES,
            logits.len()
        )));
    }

    if logits.iter().any(|v| !v.is_finite()) {
        return Err(ClassifierError::Inference(
            "Model produced non-finite logits".to_string(),
        ));
    }

    let max = logits.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
    let exps = logits.mapv(|v| (v - max).exp());
    let sum = exps.sum();

    let mut probabilities = [0.0f32; NUM_CLASSES];
    for (slot, value) in probabilities.iter_mut().zip(exps.iter()) {
        *slot = value / sum;
    }

    Ok(probabilities)
}

use crate::models::{CLASS_NAMES, NUM_CLASSES, POSITIVE_CLASS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单张图像的分类结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// 预测类别
    pub prediction: String,
    /// 置信度 (0 - 100)
    pub confidence: f32,
    /// 是否为阳性类别
    pub has_cataract: bool,
    /// 每个类别的概率 (0.0 - 1.0)
    pub probabilities: BTreeMap<String, f32>,
}

impl PredictionResult {
    /// 由softmax概率构造结果，概率相同时取索引较小的类别
    pub fn from_probabilities(probabilities: [f32; NUM_CLASSES]) -> Self {
        let mut best_idx = 0;
        for (idx, &prob) in probabilities.iter().enumerate().skip(1) {
            if prob > probabilities[best_idx] {
                best_idx = idx;
            }
        }

        let prediction = CLASS_NAMES[best_idx];

        Self {
            prediction: prediction.to_string(),
            confidence: probabilities[best_idx] * 100.0,
            has_cataract: prediction == POSITIVE_CLASS,
            probabilities: CLASS_NAMES
                .iter()
                .zip(probabilities)
                .map(|(name, prob)| (name.to_string(), prob))
                .collect(),
        }
    }
}

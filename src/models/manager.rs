use crate::models::{Device, OnnxClassifier, SharedModel};
use crate::Config;
use serde::Serialize;
use std::sync::Arc;

/// 进程级模型句柄：启动时加载一次，之后只读共享
#[derive(Clone)]
pub struct ModelManager {
    model: Option<SharedModel>,
}

impl ModelManager {
    /// 加载模型。失败只记录日志，返回空模型，由请求端报告错误
    pub fn load(config: &Config) -> Self {
        tracing::info!("Initializing model manager...");
        tracing::info!("Model path: {}", config.model_path.display());

        let device = Device::select();
        let model = match OnnxClassifier::new(config, device) {
            Ok(classifier) => {
                tracing::info!("Model loaded successfully.");
                Some(Arc::new(classifier) as SharedModel)
            }
            Err(e) => {
                tracing::error!("Error loading model: {}", e);
                None
            }
        };

        Self { model }
    }

    /// 直接使用已构造的模型
    pub fn from_model(model: SharedModel) -> Self {
        Self { model: Some(model) }
    }

    /// 无模型，所有预测请求都会失败
    pub fn unloaded() -> Self {
        Self { model: None }
    }

    /// 获取模型引用（如果可用）
    pub fn model(&self) -> Option<SharedModel> {
        self.model.as_ref().map(Arc::clone)
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// 获取模型统计信息
    pub fn get_stats(&self) -> ModelStats {
        ModelStats {
            model_loaded: self.is_loaded(),
            device: self.model.as_ref().map(|m| m.device()),
        }
    }
}

/// 模型统计信息
#[derive(Debug, Clone, Serialize)]
pub struct ModelStats {
    pub model_loaded: bool,
    pub device: Option<Device>,
}

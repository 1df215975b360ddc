use crate::image::preprocessing::CROP_SIZE;
use crate::models::Device;
use crate::utils::error::ClassifierError;
use crate::{Config, Result};
use ndarray::{Array2, Array4, ArrayD, Ix2};
use ort::{
    inputs,
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

/// 分类头输出维度
pub const NUM_CLASSES: usize = 2;

/// 类别索引到名称的映射。
///
/// 顺序必须与生成权重时的训练标签一致（按目录名字母序：0=Cataract, 1=Normal）。
/// 该映射无法从权重文件中验证，部署前需与训练流程核对，否则所有预测都会反转。
pub const CLASS_NAMES: [&str; NUM_CLASSES] = ["Cataract", "Normal"];

/// 阳性类别
pub const POSITIVE_CLASS: &str = "Cataract";

/// 前向推理接口：输入 (N, 3, 224, 224)，输出 (N, 2) logits
pub trait InferenceModel: Send + Sync {
    fn forward(&self, batch: Array4<f32>) -> Result<Array2<f32>>;

    fn device(&self) -> Device;
}

pub type SharedModel = Arc<dyn InferenceModel>;

/// 基于ONNX Runtime的二分类网络（ResNet18主干 + 2类全连接头）
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    device: Device,
}

impl OnnxClassifier {
    pub fn new(config: &Config, device: Device) -> Result<Self> {
        let model_path = &config.model_path;

        if !model_path.exists() {
            return Err(ClassifierError::ModelLoad(format!(
                "Model file not found at {}",
                model_path.display()
            )));
        }

        tracing::info!("Loading model from {} on {}...", model_path.display(), device);

        let session = Self::build_session(config, device, model_path)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| ClassifierError::ModelLoad("Model has no inputs".to_string()))?;

        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| ClassifierError::ModelLoad("Model has no outputs".to_string()))?;

        tracing::info!("Model input: '{}', output: '{}'", input_name, output_name);
        for (i, output) in session.outputs.iter().enumerate() {
            tracing::debug!("Model output[{}]: '{}'", i, output.name);
        }

        let classifier = Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            device,
        };

        verify_head(&classifier)?;

        Ok(classifier)
    }

    fn build_session(config: &Config, device: Device, model_path: &Path) -> Result<Session> {
        let level = match config.onnx_config.optimization_level {
            i32::MIN..=0 => GraphOptimizationLevel::Disable,
            1 => GraphOptimizationLevel::Level1,
            2 => GraphOptimizationLevel::Level2,
            _ => GraphOptimizationLevel::Level3,
        };

        let mut builder = Session::builder()?
            .with_optimization_level(level)?
            .with_intra_threads(config.onnx_config.intra_threads)?;

        let providers = device.execution_providers();
        if !providers.is_empty() {
            builder = builder.with_execution_providers(providers)?;
        }

        Ok(builder.commit_from_file(model_path)?)
    }
}

/// 用全零输入跑一次，确认分类头输出为 (1, 2)，否则视为加载失败
pub fn verify_head(model: &dyn InferenceModel) -> Result<()> {
    let side = CROP_SIZE as usize;
    let zeros = Array4::<f32>::zeros((1, 3, side, side));

    let logits = model
        .forward(zeros)
        .and_then(|logits| check_logits_shape(logits.into_dyn(), 1))
        .map_err(|e| {
            ClassifierError::ModelLoad(format!("Classification head check failed: {}", e))
        })?;

    tracing::debug!("Classification head check passed: output shape {:?}", logits.shape());
    Ok(())
}

/// 输出必须是 (batch, 2)
fn check_logits_shape(logits: ArrayD<f32>, batch_size: usize) -> Result<Array2<f32>> {
    let logits = logits.into_dimensionality::<Ix2>().map_err(|e| {
        ClassifierError::Inference(format!("Expected 2D logits tensor: {}", e))
    })?;

    if logits.shape() != [batch_size, NUM_CLASSES] {
        return Err(ClassifierError::Inference(format!(
            "Expected logits of shape [{}, {}], got {:?}",
            batch_size,
            NUM_CLASSES,
            logits.shape()
        )));
    }

    Ok(logits)
}

impl InferenceModel for OnnxClassifier {
    fn forward(&self, batch: Array4<f32>) -> Result<Array2<f32>> {
        let batch_size = batch.shape()[0];
        let input_tensor = Tensor::from_array(batch)?;

        let logits = {
            let mut session = self.session.lock();
            let outputs = session.run(inputs![self.input_name.as_str() => input_tensor])?;

            match outputs.get(self.output_name.as_str()) {
                Some(output) => output.try_extract_array::<f32>()?.into_owned(),
                None => {
                    let available_outputs: Vec<String> =
                        outputs.keys().map(|s| s.to_string()).collect();
                    return Err(ClassifierError::Inference(format!(
                        "Model output '{}' not found. Available outputs: {:?}",
                        self.output_name, available_outputs
                    )));
                }
            }
        };

        check_logits_shape(logits, batch_size)
    }

    fn device(&self) -> Device {
        self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_contract() {
        assert_eq!(CLASS_NAMES.len(), NUM_CLASSES);
        assert_eq!(CLASS_NAMES[0], POSITIVE_CLASS);
        assert_eq!(CLASS_NAMES[1], "Normal");
    }

    /// 三分类头，模拟权重与拓扑不匹配
    struct ThreeClassHead;

    impl InferenceModel for ThreeClassHead {
        fn forward(&self, batch: Array4<f32>) -> Result<Array2<f32>> {
            Ok(Array2::zeros((batch.shape()[0], 3)))
        }

        fn device(&self) -> Device {
            Device::Cpu
        }
    }

    struct TwoClassHead;

    impl InferenceModel for TwoClassHead {
        fn forward(&self, batch: Array4<f32>) -> Result<Array2<f32>> {
            Ok(Array2::zeros((batch.shape()[0], NUM_CLASSES)))
        }

        fn device(&self) -> Device {
            Device::Cpu
        }
    }

    #[test]
    fn test_head_check_rejects_wrong_class_count() {
        let err = verify_head(&ThreeClassHead).unwrap_err();
        assert!(matches!(err, ClassifierError::ModelLoad(_)));
        assert!(err.to_string().contains("[1, 2]"));
    }

    #[test]
    fn test_head_check_accepts_two_classes() {
        assert!(verify_head(&TwoClassHead).is_ok());
    }

    #[test]
    fn test_logits_shape_guard() {
        let ok = check_logits_shape(ArrayD::zeros(vec![1, 2]), 1).unwrap();
        assert_eq!(ok.shape(), &[1, 2]);

        assert!(check_logits_shape(ArrayD::zeros(vec![1, 3]), 1).is_err());
        assert!(check_logits_shape(ArrayD::zeros(vec![2, 2]), 1).is_err());
        assert!(check_logits_shape(ArrayD::zeros(vec![2]), 1).is_err());
    }

    #[test]
    fn test_missing_weight_file() {
        let config = Config::with_model_path("/nonexistent/cataract_cnn_finetuned.onnx");
        let err = match OnnxClassifier::new(&config, Device::Cpu) {
            Ok(_) => panic!("loading a missing file must fail"),
            Err(e) => e,
        };

        assert!(matches!(err, ClassifierError::ModelLoad(_)));
        assert!(err.to_string().contains("not found"));
    }
}

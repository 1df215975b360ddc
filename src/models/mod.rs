pub mod classifier;
pub mod device;
pub mod manager;

pub use classifier::{
    InferenceModel, OnnxClassifier, SharedModel, CLASS_NAMES, NUM_CLASSES, POSITIVE_CLASS,
};
pub use device::Device;
pub use manager::{ModelManager, ModelStats};

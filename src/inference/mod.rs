pub mod pipeline;
pub mod types;

pub use pipeline::{softmax, InferencePipeline};
pub use types::PredictionResult;

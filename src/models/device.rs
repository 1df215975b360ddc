use once_cell::sync::OnceCell;
use ort::execution_providers::ExecutionProviderDispatch;
use serde::Serialize;
use std::fmt;

/// 推理设备
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cuda,
    Cpu,
}

static SELECTED_DEVICE: OnceCell<Device> = OnceCell::new();

impl Device {
    /// 自动选择设备：有加速器用加速器，否则CPU。进程内只检测一次
    pub fn select() -> Device {
        *SELECTED_DEVICE.get_or_init(|| {
            let device = Self::detect();
            tracing::info!("Selected compute device: {}", device);
            device
        })
    }

    #[cfg(feature = "cuda")]
    fn detect() -> Device {
        use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};

        match CUDAExecutionProvider::default().is_available() {
            Ok(true) => Device::Cuda,
            Ok(false) => {
                tracing::info!("CUDA execution provider not available, falling back to CPU");
                Device::Cpu
            }
            Err(e) => {
                tracing::warn!("Failed to query CUDA availability: {}", e);
                Device::Cpu
            }
        }
    }

    #[cfg(not(feature = "cuda"))]
    fn detect() -> Device {
        Device::Cpu
    }

    /// 对应的ONNX Runtime执行提供者
    pub fn execution_providers(&self) -> Vec<ExecutionProviderDispatch> {
        match self {
            #[cfg(feature = "cuda")]
            Device::Cuda => vec![ort::execution_providers::CUDAExecutionProvider::default()
                .build()
                .error_on_failure()],
            #[cfg(not(feature = "cuda"))]
            Device::Cuda => Vec::new(),
            Device::Cpu => Vec::new(),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cuda => write!(f, "cuda"),
            Device::Cpu => write!(f, "cpu"),
        }
    }
}

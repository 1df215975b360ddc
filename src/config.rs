use crate::utils::error::ClassifierError;
use crate::Result;
use std::path::{Path, PathBuf};

/// 默认权重文件名，位于可执行文件同级目录
pub const MODEL_FILE_NAME: &str = "cataract_cnn_finetuned.onnx";

/// 默认绑定地址
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone)]
pub struct Config {
    /// 服务器绑定地址
    pub bind_addr: String,

    /// 权重文件路径
    pub model_path: PathBuf,

    /// ONNX Runtime配置
    pub onnx_config: OnnxConfig,

    /// 服务器配置
    pub server_config: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct OnnxConfig {
    /// CPU线程数
    pub intra_threads: usize,

    /// 优化级别
    pub optimization_level: i32,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 最大请求体大小（字节）
    pub max_request_size: usize,
}

impl Default for OnnxConfig {
    fn default() -> Self {
        Self {
            intra_threads: (num_cpus::get() * 3 / 4).max(1), // 使用75%的CPU核心
            optimization_level: 3,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_request_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

impl Config {
    pub fn new(
        bind_addr: String,
        model_path: Option<PathBuf>,
        intra_threads: Option<usize>,
    ) -> Result<Self> {
        let model_path = match model_path {
            Some(path) => path,
            None => Self::default_model_path()?,
        };

        let mut onnx_config = OnnxConfig::default();
        if let Some(threads) = intra_threads {
            if threads == 0 {
                return Err(ClassifierError::Config(
                    "intra_threads must be at least 1".to_string(),
                ));
            }
            onnx_config.intra_threads = threads;
        }

        Ok(Self {
            bind_addr,
            model_path,
            onnx_config,
            server_config: ServerConfig::default(),
        })
    }

    /// 以指定权重路径构造默认配置
    pub fn with_model_path(model_path: impl AsRef<Path>) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            model_path: model_path.as_ref().to_path_buf(),
            onnx_config: OnnxConfig::default(),
            server_config: ServerConfig::default(),
        }
    }

    /// 获取默认权重路径：可执行文件所在目录下的权重文件
    pub fn default_model_path() -> Result<PathBuf> {
        let exe = std::env::current_exe()?;
        let base_dir = exe.parent().ok_or_else(|| {
            ClassifierError::Config(format!(
                "Cannot resolve installation directory of {}",
                exe.display()
            ))
        })?;

        Ok(base_dir.join(MODEL_FILE_NAME))
    }
}

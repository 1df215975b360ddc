use crate::utils::error::ClassifierError;
use crate::Result;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbImage};

/// 单边最大像素数
pub const MAX_DIMENSION: u32 = 8192;

pub struct ImageLoader;

impl ImageLoader {
    /// 从字节流加载图像并转换为RGB
    pub fn from_bytes(bytes: &[u8]) -> Result<RgbImage> {
        if bytes.is_empty() {
            return Err(ClassifierError::Inference("Empty image data".to_string()));
        }

        let image = image::load_from_memory(bytes)?;
        Self::validate_dimensions(&image)?;

        tracing::debug!(
            "Decoded image: {}x{}, format={:?}",
            image.width(),
            image.height(),
            Self::detect_format(bytes)
        );

        Ok(image.to_rgb8())
    }

    /// 检测图像格式
    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }

    /// 验证图像尺寸
    pub fn validate_dimensions(image: &DynamicImage) -> Result<()> {
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(ClassifierError::Inference(format!(
                "Image has empty dimensions: {}x{}",
                width, height
            )));
        }

        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ClassifierError::Inference(format!(
                "Image too large: {}x{}, maximum {}x{}",
                width, height, MAX_DIMENSION, MAX_DIMENSION
            )));
        }

        Ok(())
    }
}

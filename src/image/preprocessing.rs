use crate::image::ImageTransforms;
use image::RgbImage;
use ndarray::Array3;

/// 短边缩放目标
pub const RESIZE_SIZE: u32 = 256;

/// 模型输入边长
pub const CROP_SIZE: u32 = 224;

/// ImageNet归一化参数，需与训练时保持一致
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// 分类预处理流水线，输出CHW格式张量 (3, 224, 224)
    pub fn preprocess(image: &RgbImage) -> Array3<f32> {
        // 1. 短边缩放到256  2. 中心裁剪224x224
        let cropped = ImageTransforms::resize_and_center_crop(image, RESIZE_SIZE, CROP_SIZE);

        // 3. 转张量并归一化
        Self::to_normalized_tensor(&cropped)
    }

    /// HWC u8 -> CHW f32，缩放到[0,1]后按通道标准化
    pub fn to_normalized_tensor(image: &RgbImage) -> Array3<f32> {
        let (width, height) = image.dimensions();

        Array3::from_shape_fn((3, height as usize, width as usize), |(c, y, x)| {
            let value = image.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
            (value - MEAN[c]) / STD[c]
        })
    }
}

use image::imageops::{self, FilterType};
use image::RgbImage;

/// 缩放后长边上限，超过时只缩放会落入裁剪区域的源窗口
pub const MAX_RESIZED_LONG_SIDE: u32 = 2048;

/// 缩放结果及其中心裁剪起点
pub struct CropWindow {
    pub image: RgbImage,
    pub left: u32,
    pub top: u32,
}

/// 图像变换工具集
pub struct ImageTransforms;

impl ImageTransforms {
    /// 短边缩放到`size`后中心裁剪`crop`x`crop`
    pub fn resize_and_center_crop(image: &RgbImage, size: u32, crop: u32) -> RgbImage {
        let window = Self::resize_for_crop(image, size, crop);
        let crop_width = crop.min(window.image.width());
        let crop_height = crop.min(window.image.height());

        imageops::crop_imm(&window.image, window.left, window.top, crop_width, crop_height)
            .to_image()
    }

    /// 缩放并给出裁剪起点。
    ///
    /// 常规宽高比直接整图缩放；极端宽高比（如1x8192）下整图缩放会生成GB级缓冲区，
    /// 此时只取映射到裁剪区域的源窗口进行缩放。
    pub fn resize_for_crop(image: &RgbImage, size: u32, crop: u32) -> CropWindow {
        let (width, height) = image.dimensions();
        let (new_w, new_h) = Self::shorter_side_dims(width, height, size);
        let crop_width = crop.min(new_w);
        let crop_height = crop.min(new_h);
        let left = Self::crop_offset(new_w, crop_width);
        let top = Self::crop_offset(new_h, crop_height);

        if new_w.max(new_h) <= MAX_RESIZED_LONG_SIDE {
            return CropWindow {
                image: Self::resize_shorter_side(image, size),
                left,
                top,
            };
        }

        let (src_x, src_w, resized_w, inner_left) =
            Self::axis_window(width, new_w, left, crop_width);
        let (src_y, src_h, resized_h, inner_top) =
            Self::axis_window(height, new_h, top, crop_height);

        tracing::debug!(
            "Resizing source window {}x{}+{}+{} to {}x{} instead of {}x{}",
            src_w, src_h, src_x, src_y, resized_w, resized_h, new_w, new_h
        );

        let source = imageops::crop_imm(image, src_x, src_y, src_w, src_h);
        CropWindow {
            image: imageops::resize(&*source, resized_w, resized_h, FilterType::Triangle),
            left: inner_left,
            top: inner_top,
        }
    }

    /// 单轴窗口映射：(源起点, 源长度, 窗口缩放后长度, 窗口内裁剪起点)
    fn axis_window(src: u32, dst: u32, offset: u32, crop: u32) -> (u32, u32, u32, u32) {
        let (src, dst) = (src as u64, dst as u64);
        let (offset, crop) = (offset as u64, crop as u64);

        let start = offset * src / dst;
        let end = ((offset + crop) * src).div_ceil(dst).min(src).max(start + 1);
        let resized = ((end - start) * dst).div_ceil(src).max(crop);
        let inner = (offset - start * dst / src).min(resized - crop);

        (start as u32, (end - start) as u32, resized as u32, inner as u32)
    }

    /// 等比缩放，使短边等于`size`
    pub fn resize_shorter_side(image: &RgbImage, size: u32) -> RgbImage {
        let (width, height) = image.dimensions();
        let (new_w, new_h) = Self::shorter_side_dims(width, height, size);

        if (new_w, new_h) == (width, height) {
            return image.clone();
        }

        // 双线性插值
        imageops::resize(image, new_w, new_h, FilterType::Triangle)
    }

    /// 计算短边缩放后的尺寸，长边向下取整
    pub fn shorter_side_dims(width: u32, height: u32, size: u32) -> (u32, u32) {
        if width <= height {
            let long = (size as u64 * height as u64 / width.max(1) as u64) as u32;
            (size, long.max(size))
        } else {
            let long = (size as u64 * width as u64 / height.max(1) as u64) as u32;
            (long.max(size), size)
        }
    }

    /// 裁剪起点 round((dim - crop) / 2)，.5时取偶数
    fn crop_offset(dim: u32, crop: u32) -> u32 {
        let diff = dim - crop;
        let half = diff / 2;
        if diff % 2 == 1 && half % 2 == 1 {
            half + 1
        } else {
            half
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_shorter_side_dims() {
        assert_eq!(ImageTransforms::shorter_side_dims(224, 224, 256), (256, 256));
        assert_eq!(ImageTransforms::shorter_side_dims(640, 480, 256), (341, 256));
        assert_eq!(ImageTransforms::shorter_side_dims(480, 640, 256), (256, 341));
        assert_eq!(ImageTransforms::shorter_side_dims(1000, 500, 256), (512, 256));
    }

    #[test]
    fn test_resize_preserves_aspect() {
        let image = RgbImage::from_pixel(300, 150, Rgb([1, 2, 3]));
        let resized = ImageTransforms::resize_shorter_side(&image, 256);
        assert_eq!(resized.dimensions(), (512, 256));
        assert_eq!(resized.get_pixel(100, 100), &Rgb([1, 2, 3]));
    }

    #[test]
    fn test_extreme_aspect_ratio_stays_bounded() {
        let image = RgbImage::from_pixel(1, 8192, Rgb([200, 100, 50]));
        assert_eq!(
            ImageTransforms::shorter_side_dims(1, 8192, 256),
            (256, 2_097_152)
        );

        let window = ImageTransforms::resize_for_crop(&image, 256, 224);
        let (w, h) = window.image.dimensions();
        assert!(w <= 2 * 256 + 224 && h <= 2 * 256 + 224, "got {}x{}", w, h);
        assert!(window.left + 224 <= w);
        assert!(window.top + 224 <= h);

        let cropped = ImageTransforms::resize_and_center_crop(&image, 256, 224);
        assert_eq!(cropped.dimensions(), (224, 224));
        assert_eq!(cropped.get_pixel(112, 112), &Rgb([200, 100, 50]));
    }

    #[test]
    fn test_wide_strip_stays_bounded() {
        let image = RgbImage::from_pixel(8192, 3, Rgb([9, 9, 9]));
        let window = ImageTransforms::resize_for_crop(&image, 256, 224);
        assert!(window.image.width() <= MAX_RESIZED_LONG_SIDE);
        assert!(window.image.height() <= MAX_RESIZED_LONG_SIDE);

        let cropped = ImageTransforms::resize_and_center_crop(&image, 256, 224);
        assert_eq!(cropped.dimensions(), (224, 224));
    }

    #[test]
    fn test_regular_aspect_uses_full_resize() {
        let image = RgbImage::from_pixel(640, 480, Rgb([0, 0, 0]));
        let window = ImageTransforms::resize_for_crop(&image, 256, 224);
        assert_eq!(window.image.dimensions(), (341, 256));
        assert_eq!((window.left, window.top), (58, 16));
    }

    #[test]
    fn test_center_crop_offsets() {
        assert_eq!(ImageTransforms::crop_offset(256, 224), 16);
        // 33 / 2 = 16.5 -> 16
        assert_eq!(ImageTransforms::crop_offset(257, 224), 16);
        // 35 / 2 = 17.5 -> 18
        assert_eq!(ImageTransforms::crop_offset(259, 224), 18);
    }
}

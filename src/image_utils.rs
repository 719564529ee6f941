use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Primitive};

use crate::error::{CompareError, Result};

/// Single-channel raster with 16-bit unsigned samples.
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Builds a 16-bit raster from row-major samples.
///
/// The sample count must be exactly `width * height`; a shorter or longer
/// buffer means the declared dimensions and the storage disagree.
pub fn gray16_from_samples(width: u32, height: u32, samples: Vec<u16>) -> Result<Gray16Image> {
    let expected = width as usize * height as usize;
    let actual = samples.len();

    if actual != expected {
        return Err(CompareError::StorageMismatch {
            width,
            height,
            expected,
            actual,
        });
    }

    ImageBuffer::from_raw(width, height, samples).ok_or(CompareError::StorageMismatch {
        width,
        height,
        expected,
        actual,
    })
}

/// Borrows the 16-bit grayscale buffer behind a dynamic image.
///
/// `role` names the input in the error message ("first", "region", ...).
pub fn as_gray16<'a>(image: &'a DynamicImage, role: &str) -> Result<&'a Gray16Image> {
    match image {
        DynamicImage::ImageLuma16(buffer) => Ok(buffer),
        other => Err(CompareError::InvalidSampleDepth(format!(
            "{} image is {:?}, expected 16-bit grayscale",
            role,
            other.color()
        ))),
    }
}

/// The `width * height` samples of a single-channel raster in row-major order.
pub fn samples<T: Primitive>(raster: &ImageBuffer<Luma<T>, Vec<T>>) -> &[T] {
    let len = raster.width() as usize * raster.height() as usize;
    &raster.as_raw()[..len]
}

/// Linear stretch of a 16-bit raster onto 0..=255 using its own maximum.
pub fn stretch_to_u8(raster: &Gray16Image) -> GrayImage {
    let (width, height) = raster.dimensions();
    let max = samples(raster).iter().copied().max().unwrap_or(0);
    let mut stretched = GrayImage::new(width, height);

    if max == 0 {
        return stretched;
    }

    for (x, y, pixel) in raster.enumerate_pixels() {
        let value = (pixel[0] as u32 * 255 / max as u32) as u8;
        stretched.put_pixel(x, y, Luma([value]));
    }

    stretched
}

/// Binary mask with 255 where the sample equals `foreground` and 0 elsewhere.
pub fn foreground_mask<T>(raster: &ImageBuffer<Luma<T>, Vec<T>>, foreground: u16) -> GrayImage
where
    T: Primitive + Into<u32>,
{
    let (width, height) = raster.dimensions();
    let mut mask = GrayImage::new(width, height);

    for (x, y, pixel) in raster.enumerate_pixels() {
        let sample: u32 = pixel[0].into();
        if sample == foreground as u32 {
            mask.put_pixel(x, y, Luma([255]));
        }
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_samples_rejects_short_buffer() {
        let err = gray16_from_samples(3, 2, vec![0; 5]).unwrap_err();
        assert!(matches!(
            err,
            CompareError::StorageMismatch { expected: 6, actual: 5, .. }
        ));
    }

    #[test]
    fn test_from_samples_rejects_long_buffer() {
        assert!(gray16_from_samples(2, 2, vec![0; 5]).is_err());
    }

    #[test]
    fn test_from_samples_accepts_empty() {
        let raster = gray16_from_samples(0, 4, Vec::new()).unwrap();
        assert_eq!(raster.dimensions(), (0, 4));
    }

    #[test]
    fn test_as_gray16_rejects_color() {
        let rgb = DynamicImage::new_rgb8(2, 2);
        let err = as_gray16(&rgb, "first").unwrap_err();
        assert!(matches!(err, CompareError::InvalidSampleDepth(ref msg) if msg.contains("first")));
    }

    #[test]
    fn test_as_gray16_rejects_8bit() {
        let gray = DynamicImage::new_luma8(2, 2);
        assert!(as_gray16(&gray, "second").is_err());
    }

    #[test]
    fn test_stretch_to_u8() {
        let raster = gray16_from_samples(3, 1, vec![0, 500, 1000]).unwrap();
        let stretched = stretch_to_u8(&raster);
        assert_eq!(stretched.as_raw(), &vec![0, 127, 255]);
    }

    #[test]
    fn test_foreground_mask() {
        let raster = gray16_from_samples(2, 2, vec![255, 0, 7, 255]).unwrap();
        let mask = foreground_mask(&raster, 255);
        assert_eq!(mask.as_raw(), &vec![255, 0, 0, 255]);
    }
}

use std::path::Path;

use image::{DynamicImage, GenericImageView};
use log::debug;

use crate::{
    error::Result,
    image_utils::{Gray16Image, as_gray16},
};

pub fn load_raster<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let image = image::open(&path)?;
    let (width, height) = image.dimensions();
    debug!(
        "loaded {} ({}x{}, {:?})",
        path.as_ref().display(),
        width,
        height,
        image.color()
    );

    Ok(image)
}

/// Loads an image that must decode to 16-bit grayscale.
pub fn load_gray16<P: AsRef<Path>>(path: P) -> Result<Gray16Image> {
    let image = load_raster(&path)?;
    let role = path.as_ref().display().to_string();
    as_gray16(&image, &role)?;

    Ok(image.into_luma16())
}

/// Saves a 16-bit raster; the format follows the file extension (PNG or TIFF).
pub fn save_gray16<P: AsRef<Path>>(raster: &Gray16Image, path: P) -> Result<()> {
    raster.save(path)?;
    Ok(())
}

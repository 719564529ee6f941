use image::DynamicImage;
use log::debug;
use rayon::prelude::*;

use crate::{
    DifferenceRaster,
    error::{CompareError, Result},
    image_utils::{Gray16Image, as_gray16, gray16_from_samples, samples},
};

/// Pixel-wise absolute difference of two 16-bit grayscale rasters.
pub struct DifferenceEngine {
    parallel: bool,
}

impl DifferenceEngine {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates that both inputs are 16-bit grayscale, then differences them.
    pub fn compute(&self, first: &DynamicImage, second: &DynamicImage) -> Result<DifferenceRaster> {
        let first = as_gray16(first, "first")?;
        let second = as_gray16(second, "second")?;

        self.compute_gray16(first, second)
    }

    pub fn compute_gray16(&self, first: &Gray16Image, second: &Gray16Image) -> Result<DifferenceRaster> {
        if first.dimensions() != second.dimensions() {
            return Err(CompareError::DimensionMismatch {
                left: first.dimensions(),
                right: second.dimensions(),
            });
        }

        let (width, height) = first.dimensions();
        debug!("computing {}x{} difference (parallel: {})", width, height, self.parallel);

        let a = samples(first);
        let b = samples(second);
        let mut out = vec![0u16; a.len()];

        if self.parallel && width > 0 {
            let row = width as usize;
            out.par_chunks_mut(row)
                .zip(a.par_chunks(row).zip(b.par_chunks(row)))
                .for_each(|(dst, (ra, rb))| difference_row(ra, rb, dst));
        } else {
            difference_row(a, b, &mut out);
        }

        let image = gray16_from_samples(width, height, out)?;

        Ok(DifferenceRaster::new(image))
    }
}

impl Default for DifferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Difference of two equal-sized rasters with the default engine.
pub fn compute_difference(first: &DynamicImage, second: &DynamicImage) -> Result<DifferenceRaster> {
    DifferenceEngine::new().compute(first, second)
}

fn difference_row(a: &[u16], b: &[u16], dst: &mut [u16]) {
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = (x as i32 - y as i32).unsigned_abs() as u16;
    }
}

use std::{ops::Add, path::Path};

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::{
    analysis::{difference::DifferenceEngine, region::{DEFAULT_FOREGROUND, RegionMeasurer}},
    error::{CompareError, Result},
    image_utils::{Gray16Image, samples},
};

pub mod error;
pub mod image_utils;
pub mod analysis;
pub mod io;
pub mod report;

pub use analysis::difference::compute_difference;
pub use analysis::region::{NEIGHBOR_OFFSETS, measure_region};

#[derive(Debug, Clone)]
pub struct CompareConfig {
    pub foreground_value: u16,
    pub parallel: bool,
    pub label_components: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            foreground_value: DEFAULT_FOREGROUND,
            parallel: true,
            label_components: true,
        }
    }
}

/// Compares two 16-bit grayscale images and measures a segmented region image.
pub struct RasterComparator {
    first: DynamicImage,
    second: DynamicImage,
    config: CompareConfig,
}

impl RasterComparator {
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(first: P, second: Q) -> Result<Self> {
        let first = io::load_raster(first)?;
        let second = io::load_raster(second)?;

        Ok(Self::from_images(first, second))
    }

    pub fn from_images(first: DynamicImage, second: DynamicImage) -> Self {
        Self {
            first,
            second,
            config: CompareConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CompareConfig) -> Self {
        self.config = config;
        self
    }

    pub fn difference(&self) -> Result<DifferenceRaster> {
        let engine = DifferenceEngine::new().with_parallel(self.config.parallel);
        engine.compute(&self.first, &self.second)
    }

    pub fn measure(&self, region: &DynamicImage) -> Result<MeasurementResult> {
        self.measurer().measure_dynamic(region)
    }

    pub fn full_analysis(&self, region: &DynamicImage) -> Result<ComparisonReport> {
        let difference = self.difference()?;
        let measurement = self.measure(region)?;

        let components = if self.config.label_components {
            let measurer = self.measurer();
            match region {
                DynamicImage::ImageLuma8(buffer) => measurer.measure_components(buffer),
                DynamicImage::ImageLuma16(buffer) => measurer.measure_components(buffer),
                other => {
                    return Err(CompareError::InvalidSampleDepth(format!(
                        "region image is {:?}, expected 8- or 16-bit grayscale",
                        other.color()
                    )));
                }
            }
        } else {
            Vec::new()
        };

        Ok(ComparisonReport {
            difference_stats: difference.stats(),
            difference,
            measurement,
            components,
        })
    }

    fn measurer(&self) -> RegionMeasurer {
        RegionMeasurer::new(self.config.foreground_value).with_parallel(self.config.parallel)
    }
}

/// Per-pixel absolute difference of two 16-bit rasters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifferenceRaster {
    image: Gray16Image,
}

impl DifferenceRaster {
    pub(crate) fn new(image: Gray16Image) -> Self {
        Self { image }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn as_image(&self) -> &Gray16Image {
        &self.image
    }

    pub fn into_inner(self) -> Gray16Image {
        self.image
    }

    pub fn stats(&self) -> DifferenceStats {
        let data = samples(&self.image);
        if data.is_empty() {
            return DifferenceStats::default();
        }

        let values = data.iter().map(|&v| v as f64).collect::<Vec<_>>();

        DifferenceStats {
            max: data.iter().copied().max().unwrap_or(0),
            mean: values.iter().mean(),
            std_deviation: values.iter().population_std_dev(),
            changed_pixels: data.iter().filter(|&&v| v != 0).count() as u64,
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        io::save_gray16(&self.image, path)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DifferenceStats {
    pub max: u16,
    pub mean: f64,
    pub std_deviation: f64,
    pub changed_pixels: u64,
}

/// Foreground pixel count and summed foreground 4-adjacency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub area: u64,
    pub perimeter: u64,
}

impl Add for MeasurementResult {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            area: self.area + other.area,
            perimeter: self.perimeter + other.perimeter,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryMeasurement {
    pub area: u64,
    pub boundary_length: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentMeasurement {
    pub label: u32,
    pub area: u64,
    pub perimeter: u64,
    pub bounds: PixelRegion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRegion {
    /// Smallest region covering `self` and the pixel at (x, y).
    pub fn including(&self, x: u32, y: u32) -> Self {
        let x0 = self.x.min(x);
        let y0 = self.y.min(y);
        let x1 = (self.x + self.width).max(x + 1);
        let y1 = (self.y + self.height).max(y + 1);

        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub difference: DifferenceRaster,
    pub difference_stats: DifferenceStats,
    pub measurement: MeasurementResult,
    pub components: Vec<ComponentMeasurement>,
}

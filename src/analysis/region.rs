use std::collections::BTreeMap;

use image::{DynamicImage, ImageBuffer, Luma, Primitive};
use imageproc::region_labelling::{Connectivity, connected_components};
use log::{debug, warn};
use rayon::prelude::*;

use crate::{
    BoundaryMeasurement, ComponentMeasurement, MeasurementResult, PixelRegion,
    error::{CompareError, Result},
    image_utils::{foreground_mask, samples},
};

/// Left, right, up, down.
pub const NEIGHBOR_OFFSETS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Sample value the reference workflow treats as foreground (8-bit white).
pub const DEFAULT_FOREGROUND: u16 = 255;

/// Area and adjacency measurements over pixels equal to a foreground value.
///
/// `perimeter` in [`MeasurementResult`] is the number of foreground 4-neighbors
/// summed over all foreground pixels. It grows with the interior of a blob,
/// not with its outline. [`RegionMeasurer::measure_boundary`] gives the
/// geometric edge count instead.
pub struct RegionMeasurer {
    foreground_value: u16,
    parallel: bool,
}

impl RegionMeasurer {
    pub fn new(foreground_value: u16) -> Self {
        Self {
            foreground_value,
            parallel: true,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn foreground_value(&self) -> u16 {
        self.foreground_value
    }

    pub fn measure<T>(&self, raster: &ImageBuffer<Luma<T>, Vec<T>>) -> MeasurementResult
    where
        T: Primitive + Into<u32> + Send + Sync,
    {
        let (width, height) = raster.dimensions();
        let grid = Grid::new(samples(raster), width, height, self.foreground_value);

        let result = if self.parallel {
            (0..grid.height)
                .into_par_iter()
                .map(|y| grid.measure_row(y))
                .reduce(MeasurementResult::default, |a, b| a + b)
        } else {
            (0..grid.height)
                .map(|y| grid.measure_row(y))
                .fold(MeasurementResult::default(), |a, b| a + b)
        };

        debug!(
            "{}x{} raster: area {}, perimeter {}",
            width, height, result.area, result.perimeter
        );
        if result.area == 0 && width > 0 && height > 0 {
            warn!("no pixels equal foreground value {}", self.foreground_value);
        }

        result
    }

    /// Measures an 8- or 16-bit grayscale dynamic image.
    pub fn measure_dynamic(&self, image: &DynamicImage) -> Result<MeasurementResult> {
        match image {
            DynamicImage::ImageLuma8(buffer) => Ok(self.measure(buffer)),
            DynamicImage::ImageLuma16(buffer) => Ok(self.measure(buffer)),
            other => Err(CompareError::InvalidSampleDepth(format!(
                "region image is {:?}, expected 8- or 16-bit grayscale",
                other.color()
            ))),
        }
    }

    /// Geometric boundary length: foreground pixel sides facing background or
    /// the raster border.
    pub fn measure_boundary<T>(&self, raster: &ImageBuffer<Luma<T>, Vec<T>>) -> BoundaryMeasurement
    where
        T: Primitive + Into<u32>,
    {
        let (width, height) = raster.dimensions();
        let grid = Grid::new(samples(raster), width, height, self.foreground_value);
        let mut measurement = BoundaryMeasurement::default();

        for y in 0..grid.height {
            for x in 0..grid.width {
                if grid.is_foreground(x, y) {
                    measurement.area += 1;
                    measurement.boundary_length += 4 - grid.foreground_neighbors(x, y);
                }
            }
        }

        measurement
    }

    /// Per-component area, adjacency perimeter and bounding box for every
    /// 4-connected foreground component, ordered by label.
    pub fn measure_components<T>(&self, raster: &ImageBuffer<Luma<T>, Vec<T>>) -> Vec<ComponentMeasurement>
    where
        T: Primitive + Into<u32>,
    {
        let (width, height) = raster.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let mask = foreground_mask(raster, self.foreground_value);
        let labels = connected_components(&mask, Connectivity::Four, Luma([0u8]));
        let grid = Grid::new(samples(raster), width, height, self.foreground_value);

        let mut components: BTreeMap<u32, ComponentMeasurement> = BTreeMap::new();

        for (x, y, label) in labels.enumerate_pixels() {
            let label = label[0];
            if label == 0 {
                continue;
            }

            let neighbors = grid.foreground_neighbors(x as usize, y as usize);
            components
                .entry(label)
                .and_modify(|c| {
                    c.area += 1;
                    c.perimeter += neighbors;
                    c.bounds = c.bounds.including(x, y);
                })
                .or_insert(ComponentMeasurement {
                    label,
                    area: 1,
                    perimeter: neighbors,
                    bounds: PixelRegion {
                        x,
                        y,
                        width: 1,
                        height: 1,
                    },
                });
        }

        debug!("{} foreground components", components.len());

        components.into_values().collect()
    }
}

impl Default for RegionMeasurer {
    fn default() -> Self {
        Self::new(DEFAULT_FOREGROUND)
    }
}

/// Area and adjacency perimeter with the given foreground value.
pub fn measure_region<T>(raster: &ImageBuffer<Luma<T>, Vec<T>>, foreground_value: u16) -> MeasurementResult
where
    T: Primitive + Into<u32> + Send + Sync,
{
    RegionMeasurer::new(foreground_value).measure(raster)
}

struct Grid<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    foreground: u32,
}

impl<'a, T> Grid<'a, T>
where
    T: Primitive + Into<u32>,
{
    fn new(data: &'a [T], width: u32, height: u32, foreground: u16) -> Self {
        Self {
            data,
            width: width as usize,
            height: height as usize,
            foreground: foreground as u32,
        }
    }

    fn is_foreground(&self, x: usize, y: usize) -> bool {
        let sample: u32 = self.data[y * self.width + x].into();
        sample == self.foreground
    }

    fn foreground_neighbors(&self, x: usize, y: usize) -> u64 {
        let mut count = 0;

        for (dx, dy) in NEIGHBOR_OFFSETS {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;

            if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
                continue;
            }

            if self.is_foreground(nx as usize, ny as usize) {
                count += 1;
            }
        }

        count
    }

    fn measure_row(&self, y: usize) -> MeasurementResult {
        let mut result = MeasurementResult::default();

        for x in 0..self.width {
            if self.is_foreground(x, y) {
                result.area += 1;
                result.perimeter += self.foreground_neighbors(x, y);
            }
        }

        result
    }
}

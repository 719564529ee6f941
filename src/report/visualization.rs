use image::{GrayImage, Rgb, RgbImage};

use crate::{
    ComponentMeasurement, DifferenceRaster, PixelRegion,
    error::{CompareError, Result},
    image_utils::stretch_to_u8,
};

#[derive(Debug, Clone, Copy)]
pub enum ColorScheme {
    HeatMap,
    Grayscale,
    SingleColor(Rgb<u8>),
}

#[derive(Debug, Clone)]
pub struct VisualizationConfig {
    pub color_scheme: ColorScheme,
    pub border_color: Rgb<u8>,
    pub border_thickness: u32,
    /// Blend weight of the heat map over the stretched difference, 0..=1.
    pub overlay_opacity: f32,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::HeatMap,
            border_color: Rgb([255, 0, 255]),
            border_thickness: 1,
            overlay_opacity: 1.0,
        }
    }
}

pub struct Visualizer {
    config: VisualizationConfig,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            config: VisualizationConfig::default(),
        }
    }

    pub fn with_config(config: VisualizationConfig) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.overlay_opacity) {
            return Err(CompareError::InvalidParameter(format!(
                "overlay opacity must be within [0, 1], got {}",
                config.overlay_opacity
            )));
        }

        Ok(Self { config })
    }

    /// 8-bit view of the difference, stretched to its own maximum.
    pub fn preview(&self, difference: &DifferenceRaster) -> GrayImage {
        stretch_to_u8(difference.as_image())
    }

    pub fn create_heatmap(&self, difference: &DifferenceRaster) -> RgbImage {
        let gray = self.preview(difference);
        let (width, height) = gray.dimensions();
        let mut heatmap = RgbImage::new(width, height);
        let alpha = self.config.overlay_opacity;

        for (x, y, pixel) in gray.enumerate_pixels() {
            let base = pixel[0] as f32;
            let color = self.intensity_to_color(base / 255.0);
            let blended = Rgb([
                ((1.0 - alpha) * base + alpha * color[0] as f32) as u8,
                ((1.0 - alpha) * base + alpha * color[1] as f32) as u8,
                ((1.0 - alpha) * base + alpha * color[2] as f32) as u8,
            ]);
            heatmap.put_pixel(x, y, blended);
        }

        heatmap
    }

    /// Heat map with the bounding box of every component outlined.
    pub fn visualize_components(
        &self,
        difference: &DifferenceRaster,
        components: &[ComponentMeasurement],
    ) -> RgbImage {
        let mut vis = self.create_heatmap(difference);

        for component in components {
            self.draw_region_border(&mut vis, &component.bounds, self.config.border_color);
        }

        vis
    }

    fn intensity_to_color(&self, intensity: f32) -> Rgb<u8> {
        let intensity = intensity.clamp(0.0, 1.0);

        match self.config.color_scheme {
            ColorScheme::HeatMap => {
                let (r, g, b) = if intensity < 0.25 {
                    let t = intensity / 0.25;
                    (0.0, t, 1.0)
                } else if intensity < 0.5 {
                    let t = (intensity - 0.25) / 0.25;
                    (0.0, 1.0, 1.0 - t)
                } else if intensity < 0.75 {
                    let t = (intensity - 0.5) / 0.25;
                    (t, 1.0, 0.0)
                } else {
                    let t = (intensity - 0.75) / 0.25;
                    (1.0, 1.0 - t, 0.0)
                };
                Rgb([(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8])
            }
            ColorScheme::Grayscale => {
                let v = (intensity * 255.0) as u8;
                Rgb([v, v, v])
            }
            ColorScheme::SingleColor(base) => Rgb([
                (base[0] as f32 * intensity) as u8,
                (base[1] as f32 * intensity) as u8,
                (base[2] as f32 * intensity) as u8,
            ]),
        }
    }

    /// Outline drawn outside the region so the covered pixels stay visible.
    fn draw_region_border(&self, image: &mut RgbImage, region: &PixelRegion, color: Rgb<u8>) {
        let (width, height) = image.dimensions();

        for t in 1..=self.config.border_thickness {
            let x0 = region.x as i64 - t as i64;
            let y0 = region.y as i64 - t as i64;
            let x1 = (region.x + region.width) as i64 + t as i64 - 1;
            let y1 = (region.y + region.height) as i64 + t as i64 - 1;

            let mut put = |x: i64, y: i64| {
                if x >= 0 && y >= 0 && x < width as i64 && y < height as i64 {
                    image.put_pixel(x as u32, y as u32, color);
                }
            };

            for x in x0..=x1 {
                put(x, y0);
                put(x, y1);
            }
            for y in y0..=y1 {
                put(x0, y);
                put(x1, y);
            }
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_utils::gray16_from_samples;

    fn difference(width: u32, height: u32, values: Vec<u16>) -> DifferenceRaster {
        DifferenceRaster::new(gray16_from_samples(width, height, values).unwrap())
    }

    #[test]
    fn test_heatmap_extremes() {
        let diff = difference(2, 1, vec![0, 4000]);
        let heatmap = Visualizer::new().create_heatmap(&diff);

        assert_eq!(heatmap.get_pixel(0, 0), &Rgb([0, 0, 255]));
        assert_eq!(heatmap.get_pixel(1, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_grayscale_scheme() {
        let config = VisualizationConfig {
            color_scheme: ColorScheme::Grayscale,
            ..VisualizationConfig::default()
        };
        let diff = difference(2, 1, vec![0, 10]);
        let heatmap = Visualizer::with_config(config).unwrap().create_heatmap(&diff);

        assert_eq!(heatmap.get_pixel(1, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_rejects_bad_opacity() {
        let config = VisualizationConfig {
            overlay_opacity: 1.5,
            ..VisualizationConfig::default()
        };
        assert!(matches!(
            Visualizer::with_config(config),
            Err(CompareError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_component_border_surrounds_bounds() {
        let diff = difference(5, 5, vec![0; 25]);
        let component = ComponentMeasurement {
            label: 1,
            area: 1,
            perimeter: 0,
            bounds: PixelRegion { x: 2, y: 2, width: 1, height: 1 },
        };

        let vis = Visualizer::new().visualize_components(&diff, &[component]);
        let border = Rgb([255, 0, 255]);

        assert_eq!(vis.get_pixel(1, 1), &border);
        assert_eq!(vis.get_pixel(3, 3), &border);
        assert_ne!(vis.get_pixel(2, 2), &border);
        assert_ne!(vis.get_pixel(0, 0), &border);
    }

    #[test]
    fn test_border_clipped_at_image_edge() {
        let diff = difference(2, 2, vec![0; 4]);
        let component = ComponentMeasurement {
            label: 1,
            area: 4,
            perimeter: 8,
            bounds: PixelRegion { x: 0, y: 0, width: 2, height: 2 },
        };

        let vis = Visualizer::new().visualize_components(&diff, &[component]);
        assert_eq!(vis.dimensions(), (2, 2));
    }
}

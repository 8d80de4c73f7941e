use image::{Rgb, RgbImage};
use palette::{Gradient, LinSrgb};

use crate::TerrainError;
use crate::grid::{ElevationGrid, WaterMask};

const BEACH_THRESHOLD: f64 = 0.05;
const PLAIN_THRESHOLD: f64 = 0.30;
const ROCK_THRESHOLD: f64 = 0.60;

const BEACH: Rgb<u8> = Rgb([194, 178, 128]);
const PLAIN: Rgb<u8> = Rgb([80, 160, 60]);
const ROCK: Rgb<u8> = Rgb([120, 120, 120]);
const SNOW: Rgb<u8> = Rgb([240, 240, 240]);

// Shoreline cells keep 7/10 of their brightness
const SHORE_NUM: u16 = 7;
const SHORE_DEN: u16 = 10;

fn rgb8(r: u8, g: u8, b: u8) -> LinSrgb {
    LinSrgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

fn to_pixel(c: LinSrgb) -> Rgb<u8> {
    let c = c.into_format::<u8>();
    Rgb([c.red, c.green, c.blue])
}

// Colors for the flat map and for colored isometric tops
pub struct TerrainPalette {
    water: Gradient<LinSrgb>,
    relief: Gradient<LinSrgb>,
}

impl Default for TerrainPalette {
    fn default() -> Self {
        Self {
            // depth 0 (shallow) to depth 1 (deep)
            water: Gradient::with_domain(vec![
                (0.0, rgb8(40, 100, 240)),
                (1.0, rgb8(10, 40, 120)),
            ]),
            // deep water to beach to grass to rock to snow
            relief: Gradient::with_domain(vec![
                (0.00, LinSrgb::new(0.0, 0.0, 0.5)),
                (0.30, LinSrgb::new(0.8, 0.8, 0.5)),
                (0.50, LinSrgb::new(0.1, 0.6, 0.2)),
                (0.75, LinSrgb::new(0.5, 0.4, 0.3)),
                (1.00, LinSrgb::new(1.0, 1.0, 1.0)),
            ]),
        }
    }
}

impl TerrainPalette {
    // Map color: water is shaded by depth below `level`, land is banded
    pub fn cell_color(&self, v: f64, water: bool, level: f64) -> Rgb<u8> {
        if water {
            let depth = (level - v).clamp(0.0, 1.0);
            return to_pixel(self.water.get(depth as f32));
        }
        match v {
            x if x < BEACH_THRESHOLD => BEACH,
            x if x < PLAIN_THRESHOLD => PLAIN,
            x if x < ROCK_THRESHOLD => ROCK,
            _ => SNOW,
        }
    }

    // Continuous elevation color, used where there is no water mask
    pub fn elevation_color(&self, v: f64) -> Rgb<u8> {
        to_pixel(self.relief.get(v.clamp(0.0, 1.0) as f32))
    }

    // Color map of a whole grid. With a mask, cells whose 4-neighbour differs
    // in water status are darkened to outline the shore.
    pub fn render_map(
        &self,
        map: &ElevationGrid,
        water: Option<&WaterMask>,
        level: f64,
    ) -> Result<RgbImage, TerrainError> {
        if let Some(mask) = water {
            if mask.width() != map.width() || mask.height() != map.height() {
                return Err(TerrainError::InvalidDimension(format!(
                    "mask is {}×{} but elevation is {}×{}",
                    mask.width(),
                    mask.height(),
                    map.width(),
                    map.height()
                )));
            }
        }
        let w = u32::try_from(map.width())
            .map_err(|_| TerrainError::InvalidDimension("map too wide for an image".into()))?;
        let h = u32::try_from(map.height())
            .map_err(|_| TerrainError::InvalidDimension("map too tall for an image".into()))?;
        let mut img = crate::raster::blank_image(w, h, Rgb([0, 0, 0]))?;

        for y in 0..map.height() {
            for x in 0..map.width() {
                let wet = water.is_some_and(|m| m[(x, y)]);
                let mut px = self.cell_color(map[(x, y)], wet, level);
                if let Some(mask) = water {
                    if is_shore(mask, x, y) {
                        px = darken(px, SHORE_NUM, SHORE_DEN);
                    }
                }
                img.put_pixel(x as u32, y as u32, px);
            }
        }
        Ok(img)
    }
}

fn is_shore(mask: &WaterMask, x: usize, y: usize) -> bool {
    let here = mask[(x, y)];
    [(1, 0), (-1, 0), (0, 1), (0, -1)].iter().any(|&(dx, dy)| {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        mask.contains(nx, ny) && mask[(nx as usize, ny as usize)] != here
    })
}

// Integer scaling of every channel by num/den
pub fn darken(px: Rgb<u8>, num: u16, den: u16) -> Rgb<u8> {
    let Rgb([r, g, b]) = px;
    let scale = |c: u8| (c as u16 * num / den) as u8;
    Rgb([scale(r), scale(g), scale(b)])
}

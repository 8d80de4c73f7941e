use image::{Rgb, RgbImage};
use tracing::debug;

use crate::TerrainError;
use crate::colormap::{TerrainPalette, darken};
use crate::grid::ElevationGrid;
use crate::raster::{Point, blank_image, fill_quad, fill_triangle};
use crate::utils::clamp8;

pub const DEFAULT_TILE_W: u32 = 16;
pub const DEFAULT_TILE_H: u32 = 8;
pub const DEFAULT_VERTICAL_SCALE: u32 = 64;
pub const DEFAULT_BACKGROUND: Rgb<u8> = Rgb([16, 16, 24]);

// Side faces keep a fixed share of the top brightness:
// the left face is lit more than the right one.
const LEFT_SHADE: (u16, u16) = (80, 100);
const RIGHT_SHADE: (u16, u16) = (60, 100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shading {
    // Top gray level is the elevation itself
    #[default]
    Grayscale,
    // Top color comes from the elevation gradient
    Terrain,
}

// Screen-space geometry of one extruded cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoColumn {
    pub top: Point,
    pub left: Point,
    pub right: Point,
    pub bottom: Point,
    pub ground_left: Point,
    pub ground_right: Point,
    pub ground_bottom: Point,
}

// Colors of the three visible faces of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceColors {
    pub top: Rgb<u8>,
    pub left: Rgb<u8>,
    pub right: Rgb<u8>,
}

// Isometric renderer: every cell becomes a diamond-topped column, painted
// back to front so nearer columns cover farther ones.
#[derive(Debug, Clone)]
pub struct IsoRenderer {
    tile_w: u32,
    tile_h: u32,
    vertical_scale: u32,
    background: Rgb<u8>,
    shading: Shading,
}

impl Default for IsoRenderer {
    fn default() -> Self {
        Self {
            tile_w: DEFAULT_TILE_W,
            tile_h: DEFAULT_TILE_H,
            vertical_scale: DEFAULT_VERTICAL_SCALE,
            background: DEFAULT_BACKGROUND,
            shading: Shading::Grayscale,
        }
    }
}

impl IsoRenderer {
    pub fn new(tile_w: u32, tile_h: u32, vertical_scale: u32) -> Result<Self, TerrainError> {
        if tile_w == 0 {
            return Err(TerrainError::parameter("tile_w", "must be positive"));
        }
        if tile_h == 0 {
            return Err(TerrainError::parameter("tile_h", "must be positive"));
        }
        Ok(Self {
            tile_w,
            tile_h,
            vertical_scale,
            ..Self::default()
        })
    }

    pub fn with_background(mut self, background: Rgb<u8>) -> Self {
        self.background = background;
        self
    }

    pub fn with_shading(mut self, shading: Shading) -> Self {
        self.shading = shading;
        self
    }

    fn half_w(&self) -> i64 {
        (self.tile_w / 2) as i64
    }

    fn half_h(&self) -> i64 {
        (self.tile_h / 2) as i64
    }

    fn margin(&self) -> i64 {
        self.tile_w as i64
    }

    // Framebuffer size for a width×height grid: the full diagonal
    // projection, the tallest possible column and a margin all around.
    pub fn frame_size(&self, width: usize, height: usize) -> Result<(u32, u32), TerrainError> {
        let diag = width as i64 + height as i64;
        let fb_w = diag * self.half_w() + self.margin() * 2 + self.tile_w as i64;
        let fb_h = diag * self.half_h()
            + self.vertical_scale as i64
            + self.margin() * 2
            + self.tile_h as i64;
        match (u32::try_from(fb_w), u32::try_from(fb_h)) {
            (Ok(w), Ok(h)) => Ok((w, h)),
            _ => Err(TerrainError::InvalidDimension(format!(
                "{width}×{height} grid projects to a {fb_w}×{fb_h} image, which is too large"
            ))),
        }
    }

    // Geometry for cell (gx, gy) of a grid with `grid_height` rows
    pub fn column(&self, gx: usize, gy: usize, h: f64, grid_height: usize) -> IsoColumn {
        let (hw, hh) = (self.half_w(), self.half_h());
        let offset_x = self.margin() + grid_height as i64 * hw;
        let offset_y = self.margin() + self.vertical_scale as i64;

        let sx = offset_x + (gx as i64 - gy as i64) * hw;
        let sy = offset_y + (gx as i64 + gy as i64) * hh;
        // Round half up, as the column height is never negative
        let z = (h * self.vertical_scale as f64 + 0.5).floor() as i64;
        let cy = sy - z;

        IsoColumn {
            top: Point::new(sx, cy - hh),
            left: Point::new(sx - hw, cy),
            right: Point::new(sx + hw, cy),
            bottom: Point::new(sx, cy + hh),
            ground_left: Point::new(sx - hw, sy),
            ground_right: Point::new(sx + hw, sy),
            ground_bottom: Point::new(sx, sy + hh),
        }
    }

    pub fn face_colors(&self, h: f64, palette: &TerrainPalette) -> FaceColors {
        let top = match self.shading {
            Shading::Grayscale => {
                let g = clamp8((h * 255.0 + 0.5).floor() as i64);
                Rgb([g, g, g])
            }
            Shading::Terrain => palette.elevation_color(h),
        };
        FaceColors {
            top,
            left: darken(top, LEFT_SHADE.0, LEFT_SHADE.1),
            right: darken(top, RIGHT_SHADE.0, RIGHT_SHADE.1),
        }
    }

    // Render the whole grid. Cells go in increasing gx+gy, then increasing gx;
    // within a cell the side faces come before the top.
    pub fn render(&self, map: &ElevationGrid) -> Result<RgbImage, TerrainError> {
        let (fb_w, fb_h) = self.frame_size(map.width(), map.height())?;
        let mut img = blank_image(fb_w, fb_h, self.background)?;
        let palette = TerrainPalette::default();

        let w = map.width();
        let h = map.height();
        for s in 0..(w + h - 1) {
            // gy = s - gx must stay inside 0..h
            let gx_start = s.saturating_sub(h - 1);
            let gx_end = s.min(w - 1);
            for gx in gx_start..=gx_end {
                let gy = s - gx;
                let elevation = map[(gx, gy)].clamp(0.0, 1.0);
                self.paint_column(&mut img, gx, gy, elevation, h, &palette);
            }
        }

        debug!(
            cells = map.len(),
            width = fb_w,
            height = fb_h,
            shading = ?self.shading,
            "isometric frame rendered"
        );
        Ok(img)
    }

    fn paint_column(
        &self,
        img: &mut RgbImage,
        gx: usize,
        gy: usize,
        elevation: f64,
        grid_height: usize,
        palette: &TerrainPalette,
    ) {
        let c = self.column(gx, gy, elevation, grid_height);
        let colors = self.face_colors(elevation, palette);

        fill_quad(img, c.left, c.ground_left, c.ground_bottom, c.bottom, colors.left);
        fill_quad(img, c.right, c.bottom, c.ground_bottom, c.ground_right, colors.right);

        fill_triangle(img, c.top, c.left, c.right, colors.top);
        fill_triangle(img, c.bottom, c.right, c.left, colors.top);
    }
}

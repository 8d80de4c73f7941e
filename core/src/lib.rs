// core holds the terrain algorithms: synthesis, resampling, smoothing,
// water classification and the isometric rasterizer
pub mod colormap;
pub mod error;
pub mod fractal2;
pub mod grid;
pub mod hydrology2;
pub mod iso;
pub mod pipeline;
pub mod raster;
pub mod resample2;
pub mod smooth2;
pub mod utils;

pub use colormap::TerrainPalette;
pub use error::TerrainError;
pub use fractal2::{Displacement, Fractal2D, synthesis_side};
pub use grid::{ElevationGrid, Grid, WaterMask};
pub use hydrology2::{WaterPolicy, classify_water, flood_to_level};
pub use iso::{IsoRenderer, Shading};
pub use pipeline::{TerrainConfig, WaterConfig, generate_terrain};
pub use resample2::resample2;
pub use smooth2::BoxBlur;

// Re-exported so callers can name pixel types without their own `image` dependency
pub use image::{Rgb, RgbImage};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use relief_core::{
    BoxBlur, Displacement, IsoRenderer, Rgb, Shading, TerrainConfig, TerrainError, WaterConfig,
    WaterPolicy,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Result, StorageError, io_error, write_atomic};

// Window radius and repeat count of the box filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingParams {
    pub radius: usize,
    pub passes: usize,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self { radius: 1, passes: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterMode {
    #[default]
    EdgeFlood,
    FillAll,
}

impl From<WaterMode> for WaterPolicy {
    fn from(mode: WaterMode) -> Self {
        match mode {
            WaterMode::EdgeFlood => WaterPolicy::EdgeFlood,
            WaterMode::FillAll => WaterPolicy::FillAll,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterParams {
    // No water at all when unset
    pub sea_level: Option<f64>,
    pub mode: WaterMode,
    // Extra flood origin, clamped into the grid
    pub seed_point: Option<(i64, i64)>,
    // Replace water cells by the sea level in the value output
    pub flatten_values: bool,
}

impl WaterParams {
    // `None` when water is off. A sea level outside [0,1] is rejected, since
    // it would leak into the exported values.
    pub fn config(&self) -> std::result::Result<Option<WaterConfig>, TerrainError> {
        let Some(level) = self.sea_level else {
            return Ok(None);
        };
        if !(0.0..=1.0).contains(&level) {
            return Err(TerrainError::InvalidParameter {
                name: "sea_level",
                reason: format!("must be within [0, 1], got {level}"),
            });
        }
        Ok(Some(WaterConfig {
            level,
            policy: self.mode.into(),
            extra_seed: self.seed_point,
        }))
    }
}

// Every pipeline knob, as stored in a JSON parameter file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub amplitude: f64,
    pub roughness: f64,
    pub smoothing: SmoothingParams,
    pub gamma: f64,
    pub water: WaterParams,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            width: 64,
            height: 48,
            seed: 1,
            amplitude: 1.0,
            roughness: 0.65,
            smoothing: SmoothingParams::default(),
            gamma: 1.0,
            water: WaterParams::default(),
        }
    }
}

impl TerrainParams {
    // Starting point for the plasma flavor: gentler decay, no filter
    pub fn plasma() -> Self {
        Self {
            roughness: 0.6,
            smoothing: SmoothingParams { radius: 0, passes: 0 },
            ..Self::default()
        }
    }

    pub fn terrain_config(&self, displacement: Displacement) -> TerrainConfig {
        TerrainConfig {
            width: self.width,
            height: self.height,
            seed: self.seed,
            amplitude: self.amplitude,
            roughness: self.roughness,
            displacement,
            smoothing: BoxBlur::new(self.smoothing.radius, self.smoothing.passes),
            gamma: self.gamma,
        }
    }

    // Parameter files are checked on load so a bad file fails before any work
    pub fn load(path: &Path) -> Result<Self> {
        let params: Self = load_json(path)?;
        params.water.config()?;
        Ok(params)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(path, self)
    }
}

// Isometric renderer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsoParams {
    pub tile_w: u32,
    pub tile_h: u32,
    pub vertical_scale: u32,
    pub background: [u8; 3],
    pub terrain_colors: bool,
}

impl Default for IsoParams {
    fn default() -> Self {
        Self {
            tile_w: relief_core::iso::DEFAULT_TILE_W,
            tile_h: relief_core::iso::DEFAULT_TILE_H,
            vertical_scale: relief_core::iso::DEFAULT_VERTICAL_SCALE,
            background: relief_core::iso::DEFAULT_BACKGROUND.0,
            terrain_colors: false,
        }
    }
}

impl IsoParams {
    pub fn renderer(&self) -> std::result::Result<IsoRenderer, TerrainError> {
        let shading = if self.terrain_colors {
            Shading::Terrain
        } else {
            Shading::Grayscale
        };
        Ok(IsoRenderer::new(self.tile_w, self.tile_h, self.vertical_scale)?
            .with_background(Rgb(self.background))
            .with_shading(shading))
    }

    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(path, self)
    }
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| StorageError::Json {
        path: path.display().to_string(),
        source,
    })
}

pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, |w| {
        serde_json::to_writer_pretty(&mut *w, value).map_err(|source| StorageError::Json {
            path: path.display().to_string(),
            source,
        })?;
        w.write_all(b"\n").map_err(|e| io_error(path, e))
    })?;
    info!(path = %path.display(), "parameters saved");
    Ok(())
}

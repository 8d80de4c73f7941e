use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info_span};

use crate::TerrainError;
use crate::fractal2::{Displacement, Fractal2D, synthesis_side};
use crate::grid::{ElevationGrid, WaterMask};
use crate::hydrology2::{WaterPolicy, classify_water};
use crate::resample2::resample2;
use crate::smooth2::BoxBlur;
use crate::utils::{apply_gamma, normalize2};

// Everything needed to go from a seed to a finished elevation grid
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainConfig {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub amplitude: f64,
    pub roughness: f64,
    pub displacement: Displacement,
    pub smoothing: BoxBlur,
    // Only meaningful for the normalized flavor
    pub gamma: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self::geo(64, 48, 1)
    }
}

impl TerrainConfig {
    // Clamped synthesis, 3×3 smoothing passes (none by default)
    pub fn geo(width: usize, height: usize, seed: u64) -> Self {
        Self {
            width,
            height,
            seed,
            amplitude: 1.0,
            roughness: 0.65,
            displacement: Displacement::Clamped,
            smoothing: BoxBlur::three_by_three(0),
            gamma: 1.0,
        }
    }

    // Normalized synthesis with global normalization and gamma at the end
    pub fn plasma(width: usize, height: usize, seed: u64) -> Self {
        Self {
            width,
            height,
            seed,
            amplitude: 1.0,
            roughness: 0.6,
            displacement: Displacement::Normalized,
            smoothing: BoxBlur::new(0, 0),
            gamma: 1.0,
        }
    }
}

// Water settings for a pipeline run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterConfig {
    pub level: f64,
    pub policy: WaterPolicy,
    pub extra_seed: Option<(i64, i64)>,
}

impl WaterConfig {
    pub fn classify(&self, map: &ElevationGrid) -> Result<WaterMask, TerrainError> {
        classify_water(map, self.level, self.policy, self.extra_seed)
    }
}

// Synthesis, resampling, smoothing and (normalized flavor) final stretch.
pub fn generate_terrain(cfg: &TerrainConfig) -> Result<ElevationGrid, TerrainError> {
    let _span = info_span!("terrain", width = cfg.width, height = cfg.height, seed = cfg.seed)
        .entered();
    let start = Instant::now();

    let side = synthesis_side(cfg.width, cfg.height)?;
    let fractal = Fractal2D::new(side, cfg.amplitude, cfg.roughness, cfg.displacement)?;
    let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
    let square = fractal.generate(&mut rng)?;

    let resampled = resample2(&square, cfg.width, cfg.height)?;
    let mut map = cfg.smoothing.apply(resampled)?;

    if cfg.displacement == Displacement::Normalized {
        normalize2(&mut map);
        apply_gamma(&mut map, cfg.gamma);
    }

    debug!(
        side,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "terrain pipeline finished"
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smooth2::BoxBlur;

    #[test]
    fn pipeline_output_shape_and_range() {
        for cfg in [TerrainConfig::geo(37, 21, 9), TerrainConfig::plasma(20, 33, 9)] {
            let map = generate_terrain(&cfg).unwrap();
            assert_eq!((map.width(), map.height()), (cfg.width, cfg.height));
            assert!(map.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn pipeline_determinism() {
        let mut cfg = TerrainConfig::geo(40, 30, 2025);
        cfg.smoothing = BoxBlur::three_by_three(2);
        assert_eq!(generate_terrain(&cfg).unwrap(), generate_terrain(&cfg).unwrap());
    }

    #[test]
    fn pipeline_plasma_is_renormalized_after_smoothing() {
        let mut cfg = TerrainConfig::plasma(30, 30, 4);
        cfg.smoothing = BoxBlur::new(2, 3);
        let map = generate_terrain(&cfg).unwrap();
        let min = map.as_slice().iter().cloned().fold(f64::MAX, f64::min);
        let max = map.as_slice().iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!((min, max), (0.0, 1.0));
    }

    #[test]
    fn pipeline_rejects_empty_output() {
        let cfg = TerrainConfig::geo(0, 10, 1);
        assert!(matches!(
            generate_terrain(&cfg),
            Err(TerrainError::InvalidDimension(_))
        ));
    }

    #[test]
    fn water_config_classifies() {
        let map = generate_terrain(&TerrainConfig::geo(16, 16, 3)).unwrap();
        let water = WaterConfig {
            level: 1.0,
            policy: WaterPolicy::EdgeFlood,
            extra_seed: None,
        };
        let mask = water.classify(&map).unwrap();
        assert!(mask.as_slice().iter().all(|&w| w));
    }
}

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::TerrainError;
use crate::grid::{ElevationGrid, Grid};
use crate::utils::{clamp01, normalize2};

// How displaced values are kept in range.
// The two policies produce visibly different terrain statistics,
// so each pipeline flavor picks one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Displacement {
    // Corners drawn from [0,1), every written value clamped to [0,1]
    #[default]
    Clamped,
    // Corners drawn from [-amplitude, amplitude], no clamping while
    // generating, min-max normalization once the grid is complete
    Normalized,
}

// Smallest `2^n + 1` side (n >= 1) covering a width×height output
pub fn synthesis_side(width: usize, height: usize) -> Result<usize, TerrainError> {
    if width == 0 || height == 0 {
        return Err(TerrainError::InvalidDimension(format!(
            "output must be at least 1×1, got {width}×{height}"
        )));
    }
    let span = (width.max(height) - 1)
        .max(2)
        .checked_next_power_of_two()
        .ok_or_else(|| {
            TerrainError::InvalidDimension(format!("{width}×{height} is too large to synthesize"))
        })?;
    Ok(span + 1)
}

// Largest per-level scale and largest reachable magnitude (corners plus
// the sum of every level's scale) for a side of `size`
fn displacement_reach(size: usize, amplitude: f64, roughness: f64) -> (f64, f64) {
    let levels = (size - 1).trailing_zeros();
    let mut scale = amplitude.abs();
    let mut peak = scale;
    let mut reach = scale;
    for _ in 0..levels {
        peak = peak.max(scale);
        reach += scale;
        scale *= roughness;
    }
    (peak, reach)
}

// 2D fractal terrain generator using the Diamond–Square algorithm
#[derive(Debug, Clone)]
pub struct Fractal2D {
    size: usize, // must be 2^n + 1, e.g. 129, 257
    amplitude: f64,
    roughness: f64, // controls how much random offset decreases each step
    displacement: Displacement,
}

impl Fractal2D {
    pub fn new(
        size: usize,
        amplitude: f64,
        roughness: f64,
        displacement: Displacement,
    ) -> Result<Self, TerrainError> {
        if size < 3 || !(size - 1).is_power_of_two() {
            return Err(TerrainError::InvalidDimension(format!(
                "synthesis side must be 2^n+1 with n >= 1, got {size}"
            )));
        }
        if !amplitude.is_finite() {
            return Err(TerrainError::parameter("amplitude", "must be finite"));
        }
        if !roughness.is_finite() || roughness < 0.0 {
            return Err(TerrainError::parameter(
                "roughness",
                format!("must be finite and non-negative, got {roughness}"),
            ));
        }

        // Both policies need every level's scale to stay finite. The normalized
        // policy never clamps, so the four-cell sums of the largest reachable
        // values must stay finite as well.
        let (peak, reach) = displacement_reach(size, amplitude, roughness);
        let overflows = match displacement {
            Displacement::Clamped => !peak.is_finite(),
            Displacement::Normalized => !(reach * 4.0).is_finite(),
        };
        if overflows {
            return Err(TerrainError::parameter(
                "amplitude",
                format!(
                    "amplitude {amplitude} with roughness {roughness} overflows over {} levels",
                    (size - 1).trailing_zeros()
                ),
            ));
        }

        Ok(Self {
            size,
            amplitude,
            roughness,
            displacement,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    // Same grid as `generate` with a ChaCha8 stream seeded from `seed`
    pub fn generate_seeded(&self, seed: u64) -> Result<ElevationGrid, TerrainError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate(&mut rng)
    }

    // Generate a size×size height-map with values in [0,1].
    // Random draws happen in a fixed order (corners, then per level the
    // diamond cells and the square cells, both row-major), so a given
    // generator state always yields the same grid.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ElevationGrid, TerrainError> {
        let n = self.size;
        let last = n - 1;
        let mut map = Grid::filled(n, n, 0.0)?;

        // Initialize corners
        for corner in [(0, 0), (last, 0), (0, last), (last, last)] {
            map[corner] = self.corner_value(rng);
        }

        // Step is the current distance between 2 known points
        let mut step = last;
        // Scale is the amplitude of the random noise at this level
        let mut scale = self.amplitude;

        while step > 1 {
            // Distance to the center from a corner
            let half = step / 2;

            // Diamond step
            for y in (half..n).step_by(step) {
                for x in (half..n).step_by(step) {
                    let avg = (map[(x - half, y - half)]
                        + map[(x + half, y - half)]
                        + map[(x - half, y + half)]
                        + map[(x + half, y + half)])
                        * 0.25;
                    map[(x, y)] = self.displace(avg, scale, rng);
                }
            }

            // Square step: edge midpoints, rows alternate their starting column
            for y in (0..n).step_by(half) {
                let start = if (y / half) % 2 == 0 { half } else { 0 };
                for x in (start..n).step_by(step) {
                    let mut sum = 0.0;
                    let mut cnt = 0;
                    if x >= half {
                        sum += map[(x - half, y)];
                        cnt += 1;
                    }
                    if x + half < n {
                        sum += map[(x + half, y)];
                        cnt += 1;
                    }
                    if y >= half {
                        sum += map[(x, y - half)];
                        cnt += 1;
                    }
                    if y + half < n {
                        sum += map[(x, y + half)];
                        cnt += 1;
                    }
                    map[(x, y)] = self.displace(sum / cnt as f64, scale, rng);
                }
            }

            step = half;
            scale *= self.roughness;
        }

        if self.displacement == Displacement::Normalized {
            normalize2(&mut map);
        }

        debug!(
            size = n,
            amplitude = self.amplitude,
            roughness = self.roughness,
            displacement = ?self.displacement,
            "diamond-square grid generated"
        );
        Ok(map)
    }

    fn corner_value<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self.displacement {
            Displacement::Clamped => rng.gen_range(0.0..1.0),
            Displacement::Normalized => rng.gen_range(-1.0..=1.0) * self.amplitude,
        }
    }

    fn displace<R: Rng + ?Sized>(&self, avg: f64, scale: f64, rng: &mut R) -> f64 {
        let v = avg + rng.gen_range(-1.0..=1.0) * scale;
        match self.displacement {
            Displacement::Clamped => clamp01(v),
            Displacement::Normalized => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Displacement, Fractal2D, synthesis_side};
    use crate::TerrainError;

    #[test]
    fn fractal2_dimensions() {
        let f = Fractal2D::new(129, 1.0, 0.6, Displacement::Clamped).unwrap();
        let m = f.generate_seeded(0).unwrap();
        assert_eq!(m.width(), 129);
        assert_eq!(m.height(), 129);
    }

    #[test]
    fn fractal2_determinism() {
        for displacement in [Displacement::Clamped, Displacement::Normalized] {
            let f1 = Fractal2D::new(65, 1.0, 0.8, displacement).unwrap();
            let f2 = Fractal2D::new(65, 1.0, 0.8, displacement).unwrap();
            assert_eq!(f1.generate_seeded(42).unwrap(), f2.generate_seeded(42).unwrap());
        }
    }

    #[test]
    fn fractal2_seed_changes_output() {
        let f = Fractal2D::new(33, 1.0, 0.65, Displacement::Clamped).unwrap();
        assert_ne!(f.generate_seeded(1).unwrap(), f.generate_seeded(2).unwrap());
    }

    #[test]
    fn fractal2_value_range() {
        // Large amplitude pushes the clamped policy against both bounds
        for (amplitude, displacement) in [
            (1.0, Displacement::Clamped),
            (25.0, Displacement::Clamped),
            (3.0, Displacement::Normalized),
        ] {
            let f = Fractal2D::new(33, amplitude, 0.9, displacement).unwrap();
            for seed in 0..8 {
                let m = f.generate_seeded(seed).unwrap();
                for &v in m.as_slice() {
                    assert!((0.0..=1.0).contains(&v), "value {} out of range", v);
                }
            }
        }
    }

    #[test]
    fn fractal2_normalized_spans_unit_range() {
        let f = Fractal2D::new(17, 1.0, 0.6, Displacement::Normalized).unwrap();
        let m = f.generate_seeded(7).unwrap();
        let min = m.as_slice().iter().cloned().fold(f64::MAX, f64::min);
        let max = m.as_slice().iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(min, 0.0);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn fractal2_zero_amplitude_is_flat_between_corners() {
        // No displacement: every cell is an average of the corners
        let f = Fractal2D::new(9, 0.0, 0.5, Displacement::Clamped).unwrap();
        let m = f.generate_seeded(3).unwrap();
        let lo = [m[(0, 0)], m[(8, 0)], m[(0, 8)], m[(8, 8)]]
            .into_iter()
            .fold(f64::MAX, f64::min);
        let hi = [m[(0, 0)], m[(8, 0)], m[(0, 8)], m[(8, 8)]]
            .into_iter()
            .fold(f64::MIN, f64::max);
        for &v in m.as_slice() {
            assert!(v >= lo - 1e-12 && v <= hi + 1e-12);
        }
    }

    #[test]
    fn fractal2_rejects_bad_side() {
        for side in [0, 1, 2, 4, 10] {
            assert!(matches!(
                Fractal2D::new(side, 1.0, 0.5, Displacement::Clamped),
                Err(TerrainError::InvalidDimension(_))
            ));
        }
    }

    #[test]
    fn fractal2_rejects_bad_parameters() {
        assert!(Fractal2D::new(9, f64::NAN, 0.5, Displacement::Clamped).is_err());
        assert!(Fractal2D::new(9, 1.0, -0.1, Displacement::Clamped).is_err());
        assert!(Fractal2D::new(9, 1.0, f64::INFINITY, Displacement::Clamped).is_err());
        assert!(Fractal2D::new(9, -2.0, 0.0, Displacement::Normalized).is_ok());
    }

    #[test]
    fn fractal2_rejects_overflowing_roughness() {
        // 1e200² is already infinite on the third level
        for displacement in [Displacement::Clamped, Displacement::Normalized] {
            assert!(matches!(
                Fractal2D::new(33, 1.0, 1e200, displacement),
                Err(TerrainError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn fractal2_rejects_overflowing_amplitude() {
        assert!(matches!(
            Fractal2D::new(9, 1e308, 0.6, Displacement::Normalized),
            Err(TerrainError::InvalidParameter { .. })
        ));
        assert!(Fractal2D::new(9, -1e308, 0.6, Displacement::Normalized).is_err());
    }

    #[test]
    fn fractal2_large_finite_parameters_stay_in_range() {
        for (amplitude, roughness) in [(1e300, 0.5), (1.0, 1e100), (1e150, 10.0)] {
            let f = Fractal2D::new(17, amplitude, roughness, Displacement::Normalized).unwrap();
            for seed in 0..4 {
                let m = f.generate_seeded(seed).unwrap();
                assert!(
                    m.as_slice().iter().all(|v| (0.0..=1.0).contains(v)),
                    "amplitude {amplitude}, roughness {roughness}, seed {seed}"
                );
            }
        }
    }

    #[test]
    fn fractal2_clamped_tolerates_huge_amplitude() {
        let f = Fractal2D::new(9, 1e300, 0.5, Displacement::Clamped).unwrap();
        let m = f.generate_seeded(5).unwrap();
        assert!(m.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn synthesis_side_covers_output() {
        assert_eq!(synthesis_side(1, 1).unwrap(), 3);
        assert_eq!(synthesis_side(3, 2).unwrap(), 3);
        assert_eq!(synthesis_side(5, 5).unwrap(), 5);
        assert_eq!(synthesis_side(9, 4).unwrap(), 9);
        assert_eq!(synthesis_side(10, 4).unwrap(), 17);
        assert_eq!(synthesis_side(64, 48).unwrap(), 65);
        assert!(synthesis_side(0, 4).is_err());
    }
}

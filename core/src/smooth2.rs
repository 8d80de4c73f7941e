use crate::TerrainError;
use crate::grid::{ElevationGrid, Grid};
use crate::utils::clamp01;

// Repeated box filter over a (2·radius+1)² window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoxBlur {
    radius: usize,
    passes: usize,
}

impl BoxBlur {
    // radius - half-width of the window; 1 gives the classic 3×3 blur
    // passes - how many times the filter runs; more passes = smoother terrain.
    pub fn new(radius: usize, passes: usize) -> Self {
        Self { radius, passes }
    }

    // 3×3 window, as used by the geo flavor
    pub fn three_by_three(passes: usize) -> Self {
        Self::new(1, passes)
    }

    pub fn is_noop(&self) -> bool {
        self.radius == 0 || self.passes == 0
    }

    // Returns the blurred map. Window coordinates are clamped to the border,
    // so edge cells average with copies of themselves.
    pub fn apply(&self, map: ElevationGrid) -> Result<ElevationGrid, TerrainError> {
        if self.is_noop() {
            return Ok(map);
        }

        let w = map.width();
        let h = map.height();
        let r = self.radius as isize;
        let max_x = w as isize - 1;
        let max_y = h as isize - 1;

        // Ping-pong between two buffers; `src` always holds the latest pass
        let mut src = map;
        let mut dst = Grid::filled(w, h, 0.0)?;

        for _ in 0..self.passes {
            for y in 0..h {
                for x in 0..w {
                    let mut sum = 0.0;
                    let mut cnt = 0usize;
                    for dy in -r..=r {
                        let yy = (y as isize + dy).clamp(0, max_y) as usize;
                        for dx in -r..=r {
                            let xx = (x as isize + dx).clamp(0, max_x) as usize;
                            sum += src[(xx, yy)];
                            cnt += 1;
                        }
                    }
                    dst[(x, y)] = clamp01(sum / cnt as f64);
                }
            }
            std::mem::swap(&mut src, &mut dst);
        }

        Ok(src)
    }
}

#[cfg(test)]
mod tests {
    use super::BoxBlur;
    use crate::grid::Grid;

    fn spike() -> Grid<f64> {
        Grid::from_rows(vec![
            vec![0.0, 0.0, 0.0],
            vec![0.0, 0.9, 0.0],
            vec![0.0, 0.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn smooth2_zero_radius_or_passes_is_identity() {
        let map = spike();
        assert_eq!(BoxBlur::new(0, 5).apply(map.clone()).unwrap(), map);
        assert_eq!(BoxBlur::new(2, 0).apply(map.clone()).unwrap(), map);
    }

    #[test]
    fn smooth2_single_pass_spreads_peak() {
        let out = BoxBlur::three_by_three(1).apply(spike()).unwrap();
        // Every window contains the spike exactly once
        for &v in out.as_slice() {
            assert!((v - 0.1).abs() < 1e-12, "got {}", v);
        }
    }

    #[test]
    fn smooth2_border_clamps_instead_of_padding() {
        // A constant map stays constant: no zero padding leaks in at the edges
        let map = Grid::filled(4, 3, 0.6).unwrap();
        let out = BoxBlur::new(2, 3).apply(map).unwrap();
        for &v in out.as_slice() {
            assert!((v - 0.6).abs() < 1e-12);
        }
    }

    #[test]
    fn smooth2_passes_compose() {
        let twice = BoxBlur::three_by_three(2).apply(spike()).unwrap();
        let once = BoxBlur::three_by_three(1).apply(spike()).unwrap();
        let again = BoxBlur::three_by_three(1).apply(once).unwrap();
        assert_eq!(twice, again);
    }

    #[test]
    fn smooth2_determinism() {
        let map: Grid<f64> =
            Grid::from_rows((0..5).map(|i| vec![i as f64 / 5.0; 5]).collect()).unwrap();
        let a = BoxBlur::new(1, 3).apply(map.clone()).unwrap();
        let b = BoxBlur::new(1, 3).apply(map).unwrap();
        assert_eq!(a, b);
    }
}

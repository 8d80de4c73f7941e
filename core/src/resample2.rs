use crate::TerrainError;
use crate::grid::{ElevationGrid, Grid};
use crate::utils::clamp01;

// Bilinear resampling of `src` onto a width×height grid.
// Output corners land exactly on source corners, and when the output has
// the source's shape every sample falls on an integer coordinate, so the
// source comes back unchanged.
pub fn resample2(
    src: &ElevationGrid,
    width: usize,
    height: usize,
) -> Result<ElevationGrid, TerrainError> {
    let mut out = Grid::filled(width, height, 0.0)?;

    // Single-row or single-column outputs divide by 1
    let denom_x = (width.max(2) - 1) as f64;
    let denom_y = (height.max(2) - 1) as f64;
    let span_x = (src.width() - 1) as f64;
    let span_y = (src.height() - 1) as f64;

    for y in 0..height {
        let v = y as f64 * span_y / denom_y;
        for x in 0..width {
            let u = x as f64 * span_x / denom_x;
            out[(x, y)] = clamp01(sample_bilinear(src, u, v));
        }
    }
    Ok(out)
}

// Sample `src` at continuous coordinates (u, v), border-clamped
fn sample_bilinear(src: &ElevationGrid, u: f64, v: f64) -> f64 {
    let max_x = src.width() - 1;
    let max_y = src.height() - 1;

    let x0 = (u.floor().max(0.0) as usize).min(max_x);
    let y0 = (v.floor().max(0.0) as usize).min(max_y);
    let x1 = (x0 + 1).min(max_x);
    let y1 = (y0 + 1).min(max_y);

    let tx = u - x0 as f64;
    let ty = v - y0 as f64;

    let a = src[(x0, y0)];
    let b = src[(x1, y0)];
    let c = src[(x0, y1)];
    let d = src[(x1, y1)];

    let ab = a * (1.0 - tx) + b * tx;
    let cd = c * (1.0 - tx) + d * tx;
    ab * (1.0 - ty) + cd * ty
}

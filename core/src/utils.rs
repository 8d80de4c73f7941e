use crate::grid::ElevationGrid;

// Palette used for the plasma ASCII preview, lightest to darkest
pub const DEFAULT_ASCII_PALETTE: &str = " .:-=+*#%@";

// Ranges narrower than this are treated as flat during normalization
const FLAT_RANGE: f64 = 1e-12;

#[inline]
pub fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

// Clamp an integer channel value into 0..=255
#[inline]
pub fn clamp8(v: i64) -> u8 {
    v.clamp(0, 255) as u8
}

// Stretch the grid to exactly [0,1].
// A flat grid has no range to stretch, so every cell becomes 0.5.
pub fn normalize2(map: &mut ElevationGrid) {
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for &val in map.as_slice() {
        min = min.min(val);
        max = max.max(val);
    }

    let range = max - min;
    for val in map.as_mut_slice() {
        *val = if range <= FLAT_RANGE {
            0.5
        } else {
            (*val - min) / range
        };
    }
}

// Gamma curve `v^(1/gamma)`. Gamma of 1 (or a non-positive gamma) leaves the map as is.
pub fn apply_gamma(map: &mut ElevationGrid, gamma: f64) {
    if gamma <= 0.0 || (gamma - 1.0).abs() < FLAT_RANGE {
        return;
    }
    let exponent = 1.0 / gamma;
    for val in map.as_mut_slice() {
        *val = clamp01(*val).powf(exponent);
    }
}

// One character per cell, one line per row.
// An empty palette falls back to the default one.
pub fn render_ascii(map: &ElevationGrid, palette: &str) -> String {
    let chars: Vec<char> = if palette.is_empty() {
        DEFAULT_ASCII_PALETTE.chars().collect()
    } else {
        palette.chars().collect()
    };
    let last = (chars.len() - 1) as f64;

    let mut out = String::with_capacity((map.width() + 1) * map.height());
    for row in map.rows() {
        for &v in row {
            let idx = (v * last + 0.5).floor().clamp(0.0, last) as usize;
            out.push(chars[idx]);
        }
        out.push('\n');
    }
    out
}

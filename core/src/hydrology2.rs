use std::collections::VecDeque;

use tracing::debug;

use crate::TerrainError;
use crate::grid::{ElevationGrid, Grid, WaterMask};

const NEIGHBORS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

// Which low cells count as water
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaterPolicy {
    // Water enters from the map border (plus an optional seed point) and
    // spreads 4-connected through cells at or below the level.
    // Enclosed basins stay dry: oceans and bays.
    #[default]
    EdgeFlood,
    // Every cell at or below the level is water: lakes in closed depressions
    FillAll,
}

// Classify water cells for a given sea level.
// `extra_seed` is clamped into the grid and only used by `EdgeFlood`.
pub fn classify_water(
    map: &ElevationGrid,
    level: f64,
    policy: WaterPolicy,
    extra_seed: Option<(i64, i64)>,
) -> Result<WaterMask, TerrainError> {
    let mask = match policy {
        WaterPolicy::FillAll => map.map(|&h| h <= level),
        WaterPolicy::EdgeFlood => flood_from_edges(map, level, extra_seed)?,
    };

    debug!(
        ?policy,
        level,
        water = water_cells(&mask),
        cells = mask.len(),
        "water classified"
    );
    Ok(mask)
}

// Breadth-first flood; the mask doubles as the visited set, so a cell is
// queued at most once and the result does not depend on visiting order.
fn flood_from_edges(
    map: &ElevationGrid,
    level: f64,
    extra_seed: Option<(i64, i64)>,
) -> Result<WaterMask, TerrainError> {
    let w = map.width();
    let h = map.height();
    let mut mask = Grid::filled(w, h, false)?;

    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    queue
        .try_reserve(mask.len())
        .map_err(|_| TerrainError::AllocationFailure { cells: mask.len() })?;

    let mut enqueue = |x: usize, y: usize, mask: &mut WaterMask| {
        if !mask[(x, y)] && map[(x, y)] <= level {
            mask[(x, y)] = true;
            queue.push_back((x, y));
        }
    };

    for x in 0..w {
        enqueue(x, 0, &mut mask);
        enqueue(x, h - 1, &mut mask);
    }
    for y in 0..h {
        enqueue(0, y, &mut mask);
        enqueue(w - 1, y, &mut mask);
    }
    if let Some((sx, sy)) = extra_seed {
        let sx = sx.clamp(0, w as i64 - 1) as usize;
        let sy = sy.clamp(0, h as i64 - 1) as usize;
        enqueue(sx, sy, &mut mask);
    }

    while let Some((cx, cy)) = queue.pop_front() {
        for &(dx, dy) in &NEIGHBORS {
            let nx = cx as i64 + dx;
            let ny = cy as i64 + dy;
            if !map.contains(nx, ny) {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if !mask[(nx, ny)] && map[(nx, ny)] <= level {
                mask[(nx, ny)] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    Ok(mask)
}

pub fn water_cells(mask: &WaterMask) -> usize {
    mask.as_slice().iter().filter(|&&w| w).count()
}

pub fn water_fraction(mask: &WaterMask) -> f64 {
    water_cells(mask) as f64 / mask.len() as f64
}

// Raise water cells to exactly `level`, turning seas into flat plateaus
// (what the isometric renderer expects for "values with water").
pub fn flood_to_level(
    map: &ElevationGrid,
    mask: &WaterMask,
    level: f64,
) -> Result<ElevationGrid, TerrainError> {
    if map.width() != mask.width() || map.height() != mask.height() {
        return Err(TerrainError::InvalidDimension(format!(
            "mask is {}×{} but elevation is {}×{}",
            mask.width(),
            mask.height(),
            map.width(),
            map.height()
        )));
    }
    if !(0.0..=1.0).contains(&level) {
        return Err(TerrainError::parameter(
            "level",
            format!("flooded cells must stay within [0, 1], got {level}"),
        ));
    }
    let cells = map
        .as_slice()
        .iter()
        .zip(mask.as_slice())
        .map(|(&h, &wet)| if wet { level } else { h })
        .collect();
    Grid::from_vec(map.width(), map.height(), cells)
}

// Generate a geo terrain, export it as values, a color map and an
// isometric view, then read the values back.
//
//   cargo run -p relief-storage --example roundtrip2d -- [OUT_DIR]

use std::path::PathBuf;

use relief_core::{Displacement, TerrainPalette, generate_terrain};
use relief_storage::{
    IsoParams, TerrainParams, read_elevation_file, write_elevation_file, write_ppm,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("out"));

    let mut params = TerrainParams {
        width: 96,
        height: 64,
        seed: 2025,
        ..TerrainParams::default()
    };
    params.smoothing.passes = 2;
    params.water.sea_level = Some(0.35);

    let map = generate_terrain(&params.terrain_config(Displacement::Clamped))?;
    let water = params.water.config()?.map(|w| w.classify(&map)).transpose()?;
    let level = params.water.sea_level.unwrap_or(0.0);

    let values = out_dir.join("terrain.txt");
    write_elevation_file(&values, &map)?;
    write_ppm(
        &out_dir.join("map.ppm"),
        &TerrainPalette::default().render_map(&map, water.as_ref(), level)?,
    )?;
    write_ppm(&out_dir.join("iso.ppm"), &IsoParams::default().renderer()?.render(&map)?)?;
    params.save(&out_dir.join("params.json"))?;

    let back = read_elevation_file(&values, Some((map.width(), map.height())))?;
    let max_err = map
        .as_slice()
        .iter()
        .zip(back.as_slice())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    println!("wrote {} (max roundtrip error {max_err:.2e})", out_dir.display());
    Ok(())
}

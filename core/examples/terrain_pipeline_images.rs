// Saves one PNG per pipeline stage for a 160×120 geo terrain:
// raw elevation, smoothed elevation, water under both policies and the
// isometric view.

use image::{GrayImage, Luma};
use relief_core::{
    BoxBlur, ElevationGrid, IsoRenderer, Shading, TerrainConfig, TerrainPalette, WaterPolicy,
    classify_water, generate_terrain,
};

const SEA_LEVEL: f64 = 0.38;

fn save_grayscale(map: &ElevationGrid, filename: &str) -> Result<(), image::ImageError> {
    let img = GrayImage::from_fn(map.width() as u32, map.height() as u32, |x, y| {
        Luma([(map[(x as usize, y as usize)] * 255.0).round() as u8])
    });
    img.save(filename)?;
    println!("Saved {filename}");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = TerrainConfig::geo(160, 120, 2025);
    let raw = generate_terrain(&cfg)?;
    save_grayscale(&raw, "terrain_raw.png")?;

    cfg.smoothing = BoxBlur::three_by_three(3);
    let smooth = generate_terrain(&cfg)?;
    save_grayscale(&smooth, "terrain_smoothed.png")?;

    let palette = TerrainPalette::default();
    for (policy, name) in [
        (WaterPolicy::EdgeFlood, "terrain_water_edge.png"),
        (WaterPolicy::FillAll, "terrain_water_all.png"),
    ] {
        let mask = classify_water(&smooth, SEA_LEVEL, policy, None)?;
        palette.render_map(&smooth, Some(&mask), SEA_LEVEL)?.save(name)?;
        println!("Saved {name}");
    }

    let iso = IsoRenderer::new(8, 4, 48)?.with_shading(Shading::Terrain);
    iso.render(&smooth)?.save("terrain_iso.png")?;
    println!("Saved terrain_iso.png");
    Ok(())
}

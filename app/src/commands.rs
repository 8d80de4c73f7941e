use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use relief_core::hydrology2::water_fraction;
use relief_core::utils::render_ascii;
use relief_core::{Displacement, ElevationGrid, TerrainPalette, flood_to_level, generate_terrain};
use relief_storage::models::{SmoothingParams, WaterMode};
use relief_storage::{
    IsoParams, TerrainParams, read_elevation_file, write_elevation, write_ppm,
};
use tracing::{debug, info};

use crate::cli::{Command, GeoArgs, IsoArgs, PlasmaArgs, SynthesisArgs};

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Geo(args) => run_geo(&args),
        Command::Plasma(args) => run_plasma(&args),
        Command::Iso(args) => run_iso(&args),
    }
}

fn base_params(config: Option<&Path>, preset: fn() -> TerrainParams) -> Result<TerrainParams> {
    match config {
        Some(path) => TerrainParams::load(path)
            .with_context(|| format!("loading parameters from {}", path.display())),
        None => Ok(preset()),
    }
}

fn apply_synthesis(params: &mut TerrainParams, args: &SynthesisArgs) {
    if let Some(width) = args.width {
        params.width = width;
    }
    if let Some(height) = args.height {
        params.height = height;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    if let Some(amplitude) = args.amplitude {
        params.amplitude = amplitude;
    }
    if let Some(roughness) = args.roughness {
        params.roughness = roughness;
    }
}

// CLI flags over the parameter file over the geo defaults
pub fn resolve_geo(args: &GeoArgs) -> Result<TerrainParams> {
    let mut params = base_params(args.synthesis.config.as_deref(), TerrainParams::default)?;
    apply_synthesis(&mut params, &args.synthesis);

    if let Some(passes) = args.smooth {
        params.smoothing = SmoothingParams { radius: 1, passes };
    }
    if let Some(level) = args.sea {
        params.water.sea_level = Some(level);
    }
    if args.fill_all {
        params.water.mode = WaterMode::FillAll;
    } else if args.from_edge {
        params.water.mode = WaterMode::EdgeFlood;
    }
    if args.seed_point.is_some() {
        params.water.seed_point = args.seed_point;
    }
    if args.values_with_water {
        params.water.flatten_values = true;
    }
    Ok(params)
}

pub fn resolve_plasma(args: &PlasmaArgs) -> Result<TerrainParams> {
    let mut params = base_params(args.synthesis.config.as_deref(), TerrainParams::plasma)?;
    apply_synthesis(&mut params, &args.synthesis);

    if let Some((radius, passes)) = args.filter {
        params.smoothing = SmoothingParams { radius, passes };
    }
    if let Some(gamma) = args.gamma {
        params.gamma = gamma;
    }
    Ok(params)
}

pub fn resolve_iso(args: &IsoArgs) -> Result<IsoParams> {
    let mut params = match args.config.as_deref() {
        Some(path) => IsoParams::load(path)
            .with_context(|| format!("loading renderer parameters from {}", path.display()))?,
        None => IsoParams::default(),
    };
    if let Some(tile_w) = args.tile_w {
        params.tile_w = tile_w;
    }
    if let Some(tile_h) = args.tile_h {
        params.tile_h = tile_h;
    }
    if let Some(vertical_scale) = args.vertical_scale {
        params.vertical_scale = vertical_scale;
    }
    if let Some(background) = args.background {
        params.background = background;
    }
    if args.terrain_colors {
        params.terrain_colors = true;
    }
    Ok(params)
}

fn print_values(map: &ElevationGrid) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_elevation(&mut out, map).context("writing values to stdout")?;
    out.flush().context("writing values to stdout")
}

fn run_geo(args: &GeoArgs) -> Result<()> {
    let params = resolve_geo(args)?;
    if let Some(path) = &args.synthesis.save_params {
        params.save(path)?;
    }

    let start = Instant::now();
    let map = generate_terrain(&params.terrain_config(Displacement::Clamped))
        .context("generating terrain")?;

    let water_cfg = params.water.config().context("checking water settings")?;
    let mask = match &water_cfg {
        Some(cfg) => {
            let mask = cfg.classify(&map).context("classifying water")?;
            info!(
                level = cfg.level,
                policy = ?cfg.policy,
                water_pct = water_fraction(&mask) * 100.0,
                "water classified"
            );
            Some(mask)
        }
        None => None,
    };
    debug!(elapsed_ms = start.elapsed().as_secs_f64() * 1000.0, "geo terrain ready");

    if !args.no_values {
        match (&water_cfg, &mask) {
            (Some(cfg), Some(mask)) if params.water.flatten_values => {
                print_values(&flood_to_level(&map, mask, cfg.level)?)?;
            }
            _ => print_values(&map)?,
        }
    }

    if let Some(path) = &args.output {
        let level = water_cfg.map_or(0.0, |cfg| cfg.level);
        let img = TerrainPalette::default()
            .render_map(&map, mask.as_ref(), level)
            .context("coloring the map")?;
        write_ppm(path, &img).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn run_plasma(args: &PlasmaArgs) -> Result<()> {
    let params = resolve_plasma(args)?;
    if let Some(path) = &args.synthesis.save_params {
        params.save(path)?;
    }

    let map = generate_terrain(&params.terrain_config(Displacement::Normalized))
        .context("generating terrain")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if !args.only_values {
        let palette = args.palette.as_deref().unwrap_or_default();
        out.write_all(render_ascii(&map, palette).as_bytes())
            .context("writing preview to stdout")?;
    }
    if args.values || args.only_values {
        if !args.only_values {
            out.write_all(b"\n").context("writing values to stdout")?;
        }
        write_elevation(&mut out, &map).context("writing values to stdout")?;
    }
    out.flush().context("writing to stdout")
}

fn run_iso(args: &IsoArgs) -> Result<()> {
    let params = resolve_iso(args)?;
    if let Some(path) = &args.save_params {
        params.save(path)?;
    }

    let dims = args.width.zip(args.height);
    let map = read_elevation_file(&args.input, dims)
        .with_context(|| format!("reading elevation from {}", args.input.display()))?;

    let renderer = params.renderer().context("configuring the renderer")?;
    let start = Instant::now();
    let img = renderer.render(&map).context("rendering")?;
    debug!(elapsed_ms = start.elapsed().as_secs_f64() * 1000.0, "iso render finished");

    write_ppm(&args.output, &img).with_context(|| format!("writing {}", args.output.display()))
}

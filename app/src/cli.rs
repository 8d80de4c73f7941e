use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "relief", version)]
#[command(about = "Fractal terrain heightmaps, water maps and isometric renders")]
pub struct Cli {
    /// More logging on stderr (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Terrain with sea level, water classification and a color map
    Geo(GeoArgs),
    /// Normalized terrain with box filter, gamma and an ASCII preview
    Plasma(PlasmaArgs),
    /// Isometric render of an elevation text grid
    Iso(IsoArgs),
}

// Knobs shared by both synthesis flavors. Unset flags fall back to the
// parameter file given with --config, then to the flavor defaults.
#[derive(Args, Debug, Default)]
pub struct SynthesisArgs {
    /// Output width in cells
    #[arg(short = 'x', long)]
    pub width: Option<usize>,

    /// Output height in cells
    #[arg(short = 'y', long)]
    pub height: Option<usize>,

    /// Random seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Initial displacement amplitude
    #[arg(short, long)]
    pub amplitude: Option<f64>,

    /// Per-level decay of the displacement, in (0, 1]
    #[arg(short = 'k', long, visible_alias = "decay")]
    pub roughness: Option<f64>,

    /// Load parameters from a JSON file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Save the resolved parameters to a JSON file
    #[arg(long, value_name = "PATH")]
    pub save_params: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct GeoArgs {
    #[command(flatten)]
    pub synthesis: SynthesisArgs,

    /// Passes of the 3×3 smoothing filter
    #[arg(short = 'f', long = "smooth", value_name = "PASSES")]
    pub smooth: Option<usize>,

    /// Enable water at this level, in [0, 1]
    #[arg(long, value_name = "LEVEL", value_parser = parse_unit)]
    pub sea: Option<f64>,

    /// Water enters from the map border (default)
    #[arg(long, conflicts_with = "fill_all")]
    pub from_edge: bool,

    /// Every cell at or below the sea level is water
    #[arg(long)]
    pub fill_all: bool,

    /// Extra flood origin for --from-edge, clamped into the grid
    #[arg(long, value_name = "X,Y", value_parser = parse_point, allow_hyphen_values = true)]
    pub seed_point: Option<(i64, i64)>,

    /// Print water cells at the sea level in the value output
    #[arg(long)]
    pub values_with_water: bool,

    /// Write a color map as a binary PPM
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Do not print elevation values on stdout
    #[arg(long)]
    pub no_values: bool,
}

#[derive(Args, Debug, Default)]
pub struct PlasmaArgs {
    #[command(flatten)]
    pub synthesis: SynthesisArgs,

    /// Box filter radius and passes, e.g. 1,2
    #[arg(short = 'f', long, value_name = "R,P", value_parser = parse_filter)]
    pub filter: Option<(usize, usize)>,

    /// Characters from low to high elevation
    #[arg(short, long, value_name = "CHARS")]
    pub palette: Option<String>,

    /// Gamma correction, applied as v^(1/g)
    #[arg(short, long, value_parser = parse_gamma)]
    pub gamma: Option<f64>,

    /// Print the values after the ASCII preview
    #[arg(long)]
    pub values: bool,

    /// Print only the values
    #[arg(long)]
    pub only_values: bool,
}

#[derive(Args, Debug)]
pub struct IsoArgs {
    /// Grid width; inferred from the input lines when absent
    #[arg(short = 'x', long, requires = "height")]
    pub width: Option<usize>,

    /// Grid height; inferred from the input lines when absent
    #[arg(short = 'y', long, requires = "width")]
    pub height: Option<usize>,

    /// Elevation text grid, "-" for stdin
    #[arg(short, long, value_name = "PATH", default_value = "-")]
    pub input: PathBuf,

    /// Binary PPM output
    #[arg(short, long, value_name = "PATH", default_value = "iso.ppm")]
    pub output: PathBuf,

    /// Tile width in pixels
    #[arg(long = "tw", value_name = "N")]
    pub tile_w: Option<u32>,

    /// Tile height in pixels
    #[arg(long = "th", value_name = "N")]
    pub tile_h: Option<u32>,

    /// Pixel height of a column at elevation 1
    #[arg(long = "zs", value_name = "N")]
    pub vertical_scale: Option<u32>,

    /// Background color
    #[arg(long = "bg", value_name = "R,G,B", value_parser = parse_rgb)]
    pub background: Option<[u8; 3]>,

    /// Color tops by elevation instead of gray
    #[arg(long)]
    pub terrain_colors: bool,

    /// Load renderer parameters from a JSON file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Save the resolved renderer parameters to a JSON file
    #[arg(long, value_name = "PATH")]
    pub save_params: Option<PathBuf>,
}

fn split_pair(s: &str) -> Result<(&str, &str), String> {
    s.split_once(',')
        .map(|(a, b)| (a.trim(), b.trim()))
        .ok_or_else(|| format!("expected two comma-separated numbers, got `{s}`"))
}

pub fn parse_point(s: &str) -> Result<(i64, i64), String> {
    let (x, y) = split_pair(s)?;
    let x = x.parse().map_err(|_| format!("bad x coordinate `{x}`"))?;
    let y = y.parse().map_err(|_| format!("bad y coordinate `{y}`"))?;
    Ok((x, y))
}

pub fn parse_filter(s: &str) -> Result<(usize, usize), String> {
    let (r, p) = split_pair(s)?;
    let r = r.parse().map_err(|_| format!("bad radius `{r}`"))?;
    let p = p.parse().map_err(|_| format!("bad pass count `{p}`"))?;
    Ok((r, p))
}

pub fn parse_rgb(s: &str) -> Result<[u8; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let &[r, g, b] = parts.as_slice() else {
        return Err(format!("expected R,G,B, got `{s}`"));
    };
    let channel = |c: &str| {
        c.parse::<u8>()
            .map_err(|_| format!("color channel `{c}` is not in 0..=255"))
    };
    Ok([channel(r)?, channel(g)?, channel(b)?])
}

pub fn parse_unit(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(format!("{v} is outside [0, 1]"))
    }
}

pub fn parse_gamma(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if v > 0.0 && v.is_finite() {
        Ok(v)
    } else {
        Err(format!("gamma must be positive, got {v}"))
    }
}

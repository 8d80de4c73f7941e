use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use relief_core::{ElevationGrid, Grid};
use tracing::{debug, info};

use crate::{Result, StorageError, io_error, write_atomic};

// Path that stands for standard input
pub const STDIN_PATH: &str = "-";

// Write H lines of W space-separated values with six fractional digits
pub fn write_elevation<W: Write + ?Sized>(out: &mut W, map: &ElevationGrid) -> io::Result<()> {
    for row in map.rows() {
        let mut first = true;
        for v in row {
            if !first {
                out.write_all(b" ")?;
            }
            write!(out, "{:.6}", v)?;
            first = false;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

pub fn write_elevation_file(path: &Path, map: &ElevationGrid) -> Result<()> {
    write_atomic(path, |w| write_elevation(w, map).map_err(|e| io_error(path, e)))?;
    info!(path = %path.display(), width = map.width(), height = map.height(), "elevation values written");
    Ok(())
}

// Parse an elevation text grid. Values are clamped to [0,1].
// With `dims`, the input must hold exactly width×height numbers in any
// whitespace layout. Without it the shape comes from the lines themselves:
// every non-empty line is a row and all rows must have the same length.
pub fn read_elevation<R: Read>(mut input: R, dims: Option<(usize, usize)>) -> Result<ElevationGrid> {
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .map_err(|e| StorageError::MalformedInput(format!("cannot read input as text: {e}")))?;

    let map = match dims {
        Some((width, height)) => parse_with_dims(&text, width, height)?,
        None => parse_inferred(&text)?,
    };
    debug!(width = map.width(), height = map.height(), "elevation values parsed");
    Ok(map)
}

// Read from a file, or from stdin when the path is "-"
pub fn read_elevation_file(path: &Path, dims: Option<(usize, usize)>) -> Result<ElevationGrid> {
    if path.as_os_str() == STDIN_PATH {
        return read_elevation(io::stdin().lock(), dims);
    }
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    read_elevation(BufReader::new(file), dims)
}

fn parse_value(token: &str, x: usize, y: usize) -> Result<f64> {
    let v: f64 = token.parse().map_err(|_| {
        StorageError::MalformedInput(format!("`{token}` at row {y}, column {x} is not a number"))
    })?;
    if !v.is_finite() {
        return Err(StorageError::MalformedInput(format!(
            "`{token}` at row {y}, column {x} is not finite"
        )));
    }
    Ok(v.clamp(0.0, 1.0))
}

fn parse_with_dims(text: &str, width: usize, height: usize) -> Result<ElevationGrid> {
    if width == 0 || height == 0 {
        return Err(StorageError::InvalidDimension(format!(
            "grid must be at least 1×1, got {width}×{height}"
        )));
    }
    let mut map = Grid::filled(width, height, 0.0)?;
    let mut tokens = text.split_whitespace();

    for y in 0..height {
        for x in 0..width {
            let token = tokens.next().ok_or_else(|| {
                StorageError::MalformedInput(format!(
                    "input too short: expected {} values for {width}×{height}, ran out at row {y}, column {x}",
                    width * height
                ))
            })?;
            map[(x, y)] = parse_value(token, x, y)?;
        }
    }

    let extra = tokens.count();
    if extra > 0 {
        return Err(StorageError::InvalidDimension(format!(
            "input holds {} values but a {width}×{height} grid takes {}",
            width * height + extra,
            width * height
        )));
    }
    Ok(map)
}

fn parse_inferred(text: &str) -> Result<ElevationGrid> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let y = rows.len();
        let row = line
            .split_whitespace()
            .enumerate()
            .map(|(x, token)| parse_value(token, x, y))
            .collect::<Result<Vec<f64>>>()?;
        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(StorageError::MalformedInput(format!(
                    "row {y} has {} values, expected {}",
                    row.len(),
                    first.len()
                )));
            }
        }
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(StorageError::MalformedInput("input holds no values".into()));
    }
    Ok(Grid::from_rows(rows)?)
}

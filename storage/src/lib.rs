// storage holds the on-disk formats: elevation text grids, PPM images and
// JSON parameter files

pub mod models;
pub mod ppm;
pub mod values;

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use relief_core::TerrainError;
use tempfile::NamedTempFile;
use thiserror::Error;

pub use models::{IsoParams, TerrainParams, WaterParams};
pub use ppm::{encode_ppm, write_ppm};
pub use values::{read_elevation, read_elevation_file, write_elevation, write_elevation_file};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed elevation input: {0}")]
    MalformedInput(String),

    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("invalid parameter file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Terrain(#[from] TerrainError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub(crate) fn io_error(path: &Path, source: io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

// Write through a temporary file in the destination directory and rename it
// into place, so the target is either absent/unchanged or complete.
pub fn write_atomic<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

    let tmp = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        fill(&mut writer)?;
        writer.flush().map_err(|e| io_error(path, e))?;
    }
    tmp.as_file().sync_all().map_err(|e| io_error(path, e))?;
    tmp.persist(path).map_err(|e| io_error(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_leaves_no_file_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        let res = write_atomic(&target, |w| {
            w.write_all(b"partial").map_err(|e| io_error(Path::new("out.txt"), e))?;
            Err(StorageError::MalformedInput("boom".into()))
        });
        assert!(res.is_err());
        assert!(!target.exists());
        // The temporary file is cleaned up as well
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        fs::write(&target, "old").unwrap();
        write_atomic(&target, |w| {
            w.write_all(b"new").map_err(|e| io_error(Path::new("out.txt"), e))
        })
        .unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }
}

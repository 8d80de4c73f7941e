use std::io::Write;
use std::path::Path;

use image::RgbImage;
use tracing::info;

use crate::{Result, io_error, write_atomic};

// Binary P6 pixmap: "P6\nW H\n255\n" then rows top to bottom
pub fn encode_ppm<W: Write + ?Sized>(out: &mut W, img: &RgbImage) -> std::io::Result<()> {
    write!(out, "P6\n{} {}\n255\n", img.width(), img.height())?;
    out.write_all(img.as_raw())
}

pub fn write_ppm(path: &Path, img: &RgbImage) -> Result<()> {
    write_atomic(path, |w| encode_ppm(w, img).map_err(|e| io_error(path, e)))?;
    info!(path = %path.display(), width = img.width(), height = img.height(), "image written");
    Ok(())
}

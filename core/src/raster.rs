use image::{Rgb, RgbImage};

use crate::TerrainError;

// Integer screen position; i64 keeps edge-function products from overflowing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

// Image filled with `background`, allocated fallibly
pub fn blank_image(width: u32, height: u32, background: Rgb<u8>) -> Result<RgbImage, TerrainError> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or(TerrainError::AllocationFailure { cells: usize::MAX })?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| TerrainError::AllocationFailure { cells: len / 3 })?;
    for _ in 0..len / 3 {
        buf.extend_from_slice(&background.0);
    }
    RgbImage::from_raw(width, height, buf).ok_or(TerrainError::AllocationFailure { cells: len / 3 })
}

// Pixel write that silently drops anything outside the image
#[inline]
pub fn put_pixel_clipped(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    img.put_pixel(x as u32, y as u32, color);
}

// Solid triangle fill using edge functions over the clipped bounding box.
// A pixel is inside when all three edge functions agree in sign (zero counts
// for either side), so winding order does not matter and edges are included.
pub fn fill_triangle(img: &mut RgbImage, p0: Point, p1: Point, p2: Point, color: Rgb<u8>) {
    if img.width() == 0 || img.height() == 0 {
        return;
    }
    let min_x = p0.x.min(p1.x).min(p2.x).max(0);
    let max_x = p0.x.max(p1.x).max(p2.x).min(img.width() as i64 - 1);
    let min_y = p0.y.min(p1.y).min(p2.y).max(0);
    let max_y = p0.y.max(p1.y).max(p2.y).min(img.height() as i64 - 1);

    // Edge coefficients
    let (a01, b01) = (p0.y - p1.y, p1.x - p0.x);
    let (a12, b12) = (p1.y - p2.y, p2.x - p1.x);
    let (a20, b20) = (p2.y - p0.y, p0.x - p2.x);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let w0 = (x - p1.x) * a12 + (y - p1.y) * b12;
            let w1 = (x - p2.x) * a20 + (y - p2.y) * b20;
            let w2 = (x - p0.x) * a01 + (y - p0.y) * b01;

            let all_pos = w0 >= 0 && w1 >= 0 && w2 >= 0;
            let all_neg = w0 <= 0 && w1 <= 0 && w2 <= 0;
            if all_pos || all_neg {
                put_pixel_clipped(img, x, y, color);
            }
        }
    }
}

// Convex quad p0-p1-p2-p3, split along the p0–p2 diagonal
pub fn fill_quad(img: &mut RgbImage, p0: Point, p1: Point, p2: Point, p3: Point, color: Rgb<u8>) {
    fill_triangle(img, p0, p1, p2, color);
    fill_triangle(img, p0, p2, p3, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb<u8> = Rgb([0, 0, 0]);
    const INK: Rgb<u8> = Rgb([255, 0, 0]);

    fn count(img: &RgbImage, color: Rgb<u8>) -> usize {
        img.pixels().filter(|&&p| p == color).count()
    }

    #[test]
    fn triangle_fill_includes_edges_and_vertices() {
        let mut img = blank_image(8, 8, BG).unwrap();
        fill_triangle(&mut img, Point::new(0, 0), Point::new(4, 0), Point::new(0, 4), INK);
        assert_eq!(*img.get_pixel(0, 0), INK);
        assert_eq!(*img.get_pixel(4, 0), INK);
        assert_eq!(*img.get_pixel(0, 4), INK);
        assert_eq!(*img.get_pixel(2, 2), INK);
        assert_eq!(*img.get_pixel(3, 3), BG);
        // 5 + 4 + 3 + 2 + 1 lattice points on or inside x + y <= 4
        assert_eq!(count(&img, INK), 15);
    }

    #[test]
    fn triangle_fill_ignores_winding() {
        let mut cw = blank_image(10, 10, BG).unwrap();
        let mut ccw = blank_image(10, 10, BG).unwrap();
        let (a, b, c) = (Point::new(1, 1), Point::new(8, 3), Point::new(4, 8));
        fill_triangle(&mut cw, a, b, c, INK);
        fill_triangle(&mut ccw, a, c, b, INK);
        assert_eq!(cw, ccw);
    }

    #[test]
    fn triangle_fill_clips_to_image() {
        let mut img = blank_image(4, 4, BG).unwrap();
        fill_triangle(
            &mut img,
            Point::new(-20, -20),
            Point::new(40, -20),
            Point::new(-20, 40),
            INK,
        );
        assert_eq!(count(&img, INK), 16);
    }

    #[test]
    fn quad_fill_covers_rectangle() {
        let mut img = blank_image(6, 6, BG).unwrap();
        fill_quad(
            &mut img,
            Point::new(1, 1),
            Point::new(4, 1),
            Point::new(4, 3),
            Point::new(1, 3),
            INK,
        );
        assert_eq!(count(&img, INK), 4 * 3);
    }

    #[test]
    fn put_pixel_clipped_drops_outside_writes() {
        let mut img = blank_image(2, 2, BG).unwrap();
        put_pixel_clipped(&mut img, -1, 0, INK);
        put_pixel_clipped(&mut img, 2, 1, INK);
        put_pixel_clipped(&mut img, 1, 1, INK);
        assert_eq!(count(&img, INK), 1);
    }

    #[test]
    fn blank_image_uses_background() {
        let img = blank_image(3, 2, Rgb([16, 16, 24])).unwrap();
        assert!(img.pixels().all(|&p| p == Rgb([16, 16, 24])));
    }
}

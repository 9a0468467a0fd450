//! Shared test utilities: synthetic annotated pages and masks.
//!
//! Consolidated here so segmentation, extraction and detector tests draw
//! their fixtures the same way.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

/// Saturated annotation stroke color (thick-border profile).
pub(crate) const SOLID_RED: [u8; 3] = [220, 20, 20];

/// Pale annotation wash color (filled-area profile).
pub(crate) const PALE_RED: [u8; 3] = [255, 180, 180];

/// A white page of the given size.
pub(crate) fn blank_page(w: u32, h: u32) -> RgbImage {
    RgbImage::from_pixel(w, h, Rgb([255, 255, 255]))
}

/// Draw an axis-aligned rectangle outline with the given stroke width in
/// saturated red, outer corner at `(x, y)`, outer size `w`×`h`.
pub(crate) fn draw_thick_rect(img: &mut RgbImage, x: i64, y: i64, w: i64, h: i64, stroke: i64) {
    fill_rect(img, x, y, w, h, Rgb(SOLID_RED));
    fill_rect(
        img,
        x + stroke,
        y + stroke,
        w - 2 * stroke,
        h - 2 * stroke,
        Rgb([255, 255, 255]),
    );
}

/// Draw a filled convex polygon in pale red.
pub(crate) fn draw_filled_polygon(img: &mut RgbImage, vertices: &[(i32, i32)]) {
    let points: Vec<Point<i32>> = vertices.iter().map(|&(x, y)| Point::new(x, y)).collect();
    draw_polygon_mut(img, &points, Rgb(PALE_RED));
}

/// Set a solid foreground rectangle in a binary mask.
pub(crate) fn fill_mask_rect(mask: &mut GrayImage, x: u32, y: u32, w: u32, h: u32) {
    for yy in y..(y + h).min(mask.height()) {
        for xx in x..(x + w).min(mask.width()) {
            mask.put_pixel(xx, yy, Luma([255]));
        }
    }
}

fn fill_rect(img: &mut RgbImage, x: i64, y: i64, w: i64, h: i64, color: Rgb<u8>) {
    if w <= 0 || h <= 0 {
        return;
    }
    let (iw, ih) = img.dimensions();
    for yy in y.max(0)..(y + h).min(ih as i64) {
        for xx in x.max(0)..(x + w).min(iw as i64) {
            img.put_pixel(xx as u32, yy as u32, color);
        }
    }
}

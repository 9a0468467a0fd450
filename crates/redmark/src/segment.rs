//! Red-annotation color segmentation.
//!
//! Produces two binary masks from an RGB raster: one for saturated thick
//! red strokes, one for pale red filled washes. Red wraps around the hue
//! axis, so each profile is the union of a low-hue and a high-hue window.
//!
//! Hue/saturation/value use the OpenCV 8-bit convention (H in [0, 180],
//! S and V in [0, 255]); the window constants below assume those ranges.

use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, dilate, open};

/// Saturated stroke profile: strong saturation, mid-to-high value.
const THICK_S: (u8, u8) = (120, 255);
const THICK_V: (u8, u8) = (120, 255);

/// Pale wash profile: weak saturation, high value.
const FILLED_S: (u8, u8) = (30, 120);
const FILLED_V: (u8, u8) = (180, 255);

/// Red hue windows on the wrap-around axis.
const HUE_LOW_MAX: u8 = 10;
const HUE_HIGH_MIN: u8 = 170;

const FG: Luma<u8> = Luma([255u8]);

/// The two binary masks produced by segmentation, same dimensions as the
/// input raster. Foreground is 255, background 0.
#[derive(Debug, Clone)]
pub struct RedMasks {
    /// Thick-outline candidates.
    pub thick: GrayImage,
    /// Filled-region candidates.
    pub filled: GrayImage,
}

/// Segment red annotations into thick-stroke and pale-fill masks.
///
/// Morphology uses a 3×3 square structuring element, one iteration per
/// step. The thick mask is closed (bridges gaps in hand-drawn strokes),
/// opened (drops salt noise) and dilated once for contour continuity.
/// The filled mask is closed and opened only; dilation would merge
/// adjacent washes.
pub fn segment_red(rgb: &RgbImage) -> RedMasks {
    let (w, h) = rgb.dimensions();
    let mut thick = GrayImage::new(w, h);
    let mut filled = GrayImage::new(w, h);

    for (x, y, px) in rgb.enumerate_pixels() {
        let [r, g, b] = px.0;
        let (hue, s, v) = rgb_to_hsv(r, g, b);
        if hue > HUE_LOW_MAX && hue < HUE_HIGH_MIN {
            continue;
        }
        if in_window(s, THICK_S) && in_window(v, THICK_V) {
            thick.put_pixel(x, y, FG);
        }
        if in_window(s, FILLED_S) && in_window(v, FILLED_V) {
            filled.put_pixel(x, y, FG);
        }
    }

    let thick = dilate(&open(&close(&thick, Norm::LInf, 1), Norm::LInf, 1), Norm::LInf, 1);
    let filled = open(&close(&filled, Norm::LInf, 1), Norm::LInf, 1);

    tracing::debug!(
        thick_fg = count_foreground(&thick),
        filled_fg = count_foreground(&filled),
        "segmented red masks"
    );

    RedMasks { thick, filled }
}

fn in_window(v: u8, (lo, hi): (u8, u8)) -> bool {
    v >= lo && v <= hi
}

fn count_foreground(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p.0[0] > 0).count()
}

/// RGB → HSV in the OpenCV 8-bit convention: H in [0, 180), S and V in
/// [0, 255].
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let rf = r as f32 / 255.0;
    let gf = g as f32 / 255.0;
    let bf = b as f32 / 255.0;

    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };

    let mut h_deg = if delta <= f32::EPSILON {
        0.0
    } else if max == rf {
        60.0 * ((gf - bf) / delta)
    } else if max == gf {
        60.0 * ((bf - rf) / delta) + 120.0
    } else {
        60.0 * ((rf - gf) / delta) + 240.0
    };
    if h_deg < 0.0 {
        h_deg += 360.0;
    }

    let h = (h_deg / 2.0).round().min(180.0) as u8 % 180;
    let s = (s * 255.0).round() as u8;
    let v = (v * 255.0).round() as u8;
    (h, s, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{blank_page, PALE_RED, SOLID_RED};
    use image::Rgb;

    #[test]
    fn hsv_matches_opencv_convention() {
        // Pure primaries.
        assert_eq!(rgb_to_hsv(255, 0, 0), (0, 255, 255));
        assert_eq!(rgb_to_hsv(0, 255, 0), (60, 255, 255));
        assert_eq!(rgb_to_hsv(0, 0, 255), (120, 255, 255));
        // Greys have zero saturation.
        assert_eq!(rgb_to_hsv(128, 128, 128), (0, 0, 128));
        assert_eq!(rgb_to_hsv(0, 0, 0), (0, 0, 0));
        assert_eq!(rgb_to_hsv(255, 255, 255), (0, 0, 255));
    }

    #[test]
    fn hsv_high_hue_red_wraps() {
        // Slightly blue-ish red lands just below 180 rather than at 0.
        let (h, s, v) = rgb_to_hsv(255, 0, 30);
        assert!(h >= HUE_HIGH_MIN || h <= HUE_LOW_MAX, "hue {h} not red");
        assert!(s > 200);
        assert!(v > 200);
    }

    #[test]
    fn solid_red_lands_in_thick_mask_only() {
        let mut img = blank_page(32, 32);
        for y in 8..24 {
            for x in 8..24 {
                img.put_pixel(x, y, Rgb(SOLID_RED));
            }
        }
        let masks = segment_red(&img);
        assert!(masks.thick.get_pixel(16, 16).0[0] > 0);
        assert_eq!(masks.filled.get_pixel(16, 16).0[0], 0);
    }

    #[test]
    fn pale_red_lands_in_filled_mask_only() {
        let mut img = blank_page(32, 32);
        for y in 8..24 {
            for x in 8..24 {
                img.put_pixel(x, y, Rgb(PALE_RED));
            }
        }
        let masks = segment_red(&img);
        assert_eq!(masks.thick.get_pixel(16, 16).0[0], 0);
        assert!(masks.filled.get_pixel(16, 16).0[0] > 0);
    }

    #[test]
    fn white_and_black_pages_give_empty_masks() {
        for fill in [[255u8, 255, 255], [0u8, 0, 0]] {
            let mut img = blank_page(16, 16);
            for px in img.pixels_mut() {
                *px = Rgb(fill);
            }
            let masks = segment_red(&img);
            assert_eq!(count_foreground(&masks.thick), 0);
            assert_eq!(count_foreground(&masks.filled), 0);
        }
    }

    #[test]
    fn opening_removes_isolated_speckle() {
        let mut img = blank_page(32, 32);
        img.put_pixel(16, 16, Rgb(SOLID_RED));
        let masks = segment_red(&img);
        assert_eq!(count_foreground(&masks.thick), 0);
    }
}

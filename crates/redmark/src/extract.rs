//! Contour extraction and polygon simplification for one binary mask.

use geo::{LineString, Simplify};
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};

use crate::config::DetectParams;
use crate::geom;
use crate::{DetectedPolygon, DetectionKind, PixelPoint};

/// Source of opaque detection ids, unique within one pipeline invocation.
#[derive(Debug, Default)]
pub struct IdGen {
    next: usize,
}

impl IdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> String {
        let id = format!("ann-{:04}", self.next);
        self.next += 1;
        id
    }
}

/// Extract simplified polygons from a binary mask.
///
/// External contours only; holes are ignored. Each contour runs through
/// the gate sequence: perimeter ≥ `min_perimeter`, Douglas-Peucker with
/// tolerance `epsilon_frac`·perimeter, vertex count in
/// [`min_vertices`, `max_vertices`], |area| ≥ `min_area`, compactness
/// 4πA/P² ≥ `min_compactness`. Contours that simplify below 3 vertices
/// are dropped silently.
pub fn extract_polygons(
    mask: &GrayImage,
    kind: DetectionKind,
    params: &DetectParams,
    ids: &mut IdGen,
) -> Vec<DetectedPolygon> {
    let contours = find_contours::<i32>(mask);
    let n_outer = contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .count();

    let mut out = Vec::new();
    for contour in contours {
        if contour.border_type != BorderType::Outer {
            continue;
        }
        let trace: Vec<PixelPoint> = contour
            .points
            .iter()
            .map(|p| PixelPoint::new(p.x as f64, p.y as f64))
            .collect();

        let perimeter = geom::perimeter_closed(&trace);
        if perimeter < params.min_perimeter {
            continue;
        }

        let corners = simplify(&trace, params.epsilon_frac * perimeter);
        if corners.len() < params.min_vertices.max(3) || corners.len() > params.max_vertices {
            continue;
        }

        let area = geom::shoelace_area(&corners).abs();
        if area < params.min_area {
            continue;
        }

        let kappa = geom::compactness(area, perimeter);
        if kappa < params.min_compactness {
            tracing::trace!(area, perimeter, kappa, "rejected thin feature");
            continue;
        }

        out.push(DetectedPolygon {
            id: ids.fresh(),
            center: geom::vertex_mean(&corners),
            corners,
            kind,
        });
    }

    tracing::debug!(
        kind = ?kind,
        contours = n_outer,
        kept = out.len(),
        "extracted polygons"
    );
    out
}

/// Douglas-Peucker simplification of a closed contour trace.
///
/// Plain Douglas-Peucker pins both endpoints of an open polyline, which
/// would leave a spurious seam vertex where the contour traversal wraps.
/// The ring is therefore split at the point farthest from the traversal
/// start and each half simplified separately; both split points are
/// extreme points of the shape, so they are genuine vertices.
fn simplify(trace: &[PixelPoint], epsilon: f64) -> Vec<PixelPoint> {
    if trace.len() < 4 {
        return trace.to_vec();
    }

    let start = trace[0];
    let (far, _) = trace
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| start.distance(a).partial_cmp(&start.distance(b)).unwrap())
        .unwrap();
    if far == 0 {
        // All points coincide with the start.
        return vec![start];
    }

    let first = simplify_open(&trace[..=far], epsilon);
    let mut wrapped: Vec<PixelPoint> = trace[far..].to_vec();
    wrapped.push(start);
    let second = simplify_open(&wrapped, epsilon);

    // Join, dropping the duplicated split point and the closing start.
    let mut corners = first;
    if second.len() > 2 {
        corners.extend_from_slice(&second[1..second.len() - 1]);
    }
    corners
}

fn simplify_open(chain: &[PixelPoint], epsilon: f64) -> Vec<PixelPoint> {
    let coords: Vec<(f64, f64)> = chain.iter().map(|p| (p.x, p.y)).collect();
    LineString::from(coords)
        .simplify(&epsilon)
        .coords()
        .map(|c| PixelPoint::new(c.x, c.y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fill_mask_rect;
    use image::GrayImage;

    fn params() -> DetectParams {
        DetectParams::default()
    }

    #[test]
    fn empty_mask_yields_nothing() {
        let mask = GrayImage::new(64, 64);
        let mut ids = IdGen::new();
        let polys = extract_polygons(&mask, DetectionKind::ThickBorder, &params(), &mut ids);
        assert!(polys.is_empty());
    }

    #[test]
    fn filled_rectangle_extracts_four_corners() {
        let mut mask = GrayImage::new(200, 200);
        fill_mask_rect(&mut mask, 40, 50, 120, 100);
        let mut ids = IdGen::new();
        let polys = extract_polygons(&mask, DetectionKind::FilledArea, &params(), &mut ids);

        assert_eq!(polys.len(), 1);
        let p = &polys[0];
        assert_eq!(p.corners.len(), 4);
        assert_eq!(p.kind, DetectionKind::FilledArea);
        // Corners land on the drawn rectangle boundary within a pixel.
        for c in &p.corners {
            let near_x = (c.x - 40.0).abs() < 2.0 || (c.x - 159.0).abs() < 2.0;
            let near_y = (c.y - 50.0).abs() < 2.0 || (c.y - 149.0).abs() < 2.0;
            assert!(near_x && near_y, "corner {:?} off the rectangle", c);
        }
        // Center near the rectangle middle.
        assert!((p.center.x - 99.5).abs() < 2.0);
        assert!((p.center.y - 99.5).abs() < 2.0);
    }

    #[test]
    fn small_blob_fails_area_gate() {
        let mut mask = GrayImage::new(64, 64);
        // 15×15 = 225 px² < 500, perimeter 60 ≥ 50.
        fill_mask_rect(&mut mask, 10, 10, 15, 15);
        let mut ids = IdGen::new();
        let polys = extract_polygons(&mask, DetectionKind::ThickBorder, &params(), &mut ids);
        assert!(polys.is_empty());
    }

    #[test]
    fn short_contour_fails_perimeter_gate() {
        let mut mask = GrayImage::new(64, 64);
        // Perimeter 4·10 = 40 < 50.
        fill_mask_rect(&mut mask, 10, 10, 10, 10);
        let mut ids = IdGen::new();
        let polys = extract_polygons(&mask, DetectionKind::ThickBorder, &params(), &mut ids);
        assert!(polys.is_empty());
    }

    #[test]
    fn long_sliver_fails_compactness_gate() {
        let mut mask = GrayImage::new(1300, 16);
        // 1200×3 bar: area 3600, perimeter ≈ 2406, 4πA/P² ≈ 0.008 < 0.01.
        fill_mask_rect(&mut mask, 20, 6, 1200, 3);
        let mut ids = IdGen::new();
        let polys = extract_polygons(&mask, DetectionKind::ThickBorder, &params(), &mut ids);
        assert!(polys.is_empty());
    }

    #[test]
    fn kept_polygons_satisfy_all_invariants() {
        let mut mask = GrayImage::new(400, 400);
        fill_mask_rect(&mut mask, 20, 20, 100, 80);
        fill_mask_rect(&mut mask, 200, 150, 150, 180);
        let p = params();
        let mut ids = IdGen::new();
        let polys = extract_polygons(&mask, DetectionKind::FilledArea, &p, &mut ids);

        assert_eq!(polys.len(), 2);
        for poly in &polys {
            assert!(poly.corners.len() >= 3 && poly.corners.len() <= 50);
            let perimeter = crate::geom::perimeter_closed(&poly.corners);
            let area = crate::geom::shoelace_area(&poly.corners).abs();
            assert!(area >= p.min_area);
            assert!(perimeter >= p.min_perimeter);
            assert!(crate::geom::compactness(area, perimeter) >= p.min_compactness);
        }
    }

    #[test]
    fn ids_are_unique_across_a_run() {
        let mut mask = GrayImage::new(400, 200);
        fill_mask_rect(&mut mask, 20, 20, 80, 80);
        fill_mask_rect(&mut mask, 200, 20, 80, 80);
        let mut ids = IdGen::new();
        let polys = extract_polygons(&mask, DetectionKind::ThickBorder, &params(), &mut ids);
        assert_eq!(polys.len(), 2);
        assert_ne!(polys[0].id, polys[1].id);
    }
}

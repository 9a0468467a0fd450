//! Polygon measurements shared by extraction and deduplication.

use geo::{Area, BooleanOps, Contains, LineString, Point, Polygon};

use crate::PixelPoint;

/// Perimeter of the closed polygon through `pts`, including the segment
/// from the last vertex back to the first.
pub(crate) fn perimeter_closed(pts: &[PixelPoint]) -> f64 {
    if pts.len() < 2 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..pts.len() {
        let a = pts[i];
        let b = pts[(i + 1) % pts.len()];
        sum += a.distance(&b);
    }
    sum
}

/// Signed shoelace area. Positive for counter-clockwise winding in a
/// y-up frame; callers take the absolute value.
pub(crate) fn shoelace_area(pts: &[PixelPoint]) -> f64 {
    if pts.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..pts.len() {
        let a = pts[i];
        let b = pts[(i + 1) % pts.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    0.5 * sum
}

/// Isoperimetric compactness 4πA/P². Equals 1 for a circle and falls
/// toward 0 for elongated shapes.
pub(crate) fn compactness(area: f64, perimeter: f64) -> f64 {
    if perimeter <= 0.0 {
        return 0.0;
    }
    4.0 * std::f64::consts::PI * area / (perimeter * perimeter)
}

/// Arithmetic mean of the vertices. This matches the labeling convention
/// of the upstream detector; it is not the area centroid.
pub(crate) fn vertex_mean(pts: &[PixelPoint]) -> PixelPoint {
    let n = pts.len() as f64;
    let sx: f64 = pts.iter().map(|p| p.x).sum();
    let sy: f64 = pts.iter().map(|p| p.y).sum();
    PixelPoint::new(sx / n, sy / n)
}

/// Axis-aligned bounding box `[min_x, min_y, max_x, max_y]`.
pub(crate) fn bounding_box(pts: &[PixelPoint]) -> [f64; 4] {
    let mut bb = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
    for p in pts {
        bb[0] = bb[0].min(p.x);
        bb[1] = bb[1].min(p.y);
        bb[2] = bb[2].max(p.x);
        bb[3] = bb[3].max(p.y);
    }
    bb
}

pub(crate) fn boxes_overlap(a: &[f64; 4], b: &[f64; 4]) -> bool {
    a[0] <= b[2] && b[0] <= a[2] && a[1] <= b[3] && b[1] <= a[3]
}

/// Build a `geo` polygon from corner points. The ring is closed by the
/// constructor.
pub(crate) fn to_geo_polygon(pts: &[PixelPoint]) -> Polygon<f64> {
    let coords: Vec<(f64, f64)> = pts.iter().map(|p| (p.x, p.y)).collect();
    Polygon::new(LineString::from(coords), vec![])
}

/// Exact intersection-over-union of two polygons.
pub(crate) fn iou(a: &Polygon<f64>, b: &Polygon<f64>) -> f64 {
    let inter = a.intersection(b).unsigned_area();
    let union = a.unsigned_area() + b.unsigned_area() - inter;
    if union <= 0.0 {
        return 0.0;
    }
    inter / union
}

/// Whether `pt` lies strictly inside `poly` (boundary excluded).
pub(crate) fn contains_point(poly: &Polygon<f64>, pt: &PixelPoint) -> bool {
    poly.contains(&Point::new(pt.x, pt.y))
}

//! Overlap suppression between thick-border and filled-area candidates.
//!
//! A hand-drawn outline and its interior wash frequently detect twice;
//! the larger polygon wins. Candidates are ranked by area with original
//! insertion order as the tie-break, so results are reproducible.

use geo::Polygon;

use crate::geom;
use crate::DetectedPolygon;

struct Candidate {
    poly: DetectedPolygon,
    geo: Polygon<f64>,
    bbox: [f64; 4],
    area: f64,
    index: usize,
}

/// Keep a candidate only if, against every already-kept polygon: IoU is at
/// most `max_iou`, its centroid is outside, and none of its vertices are
/// inside. Bounding boxes prefilter the exact IoU computation.
pub(crate) fn dedup_polygons(
    polygons: Vec<DetectedPolygon>,
    max_iou: f64,
) -> Vec<DetectedPolygon> {
    if polygons.len() <= 1 {
        return polygons;
    }

    let mut candidates: Vec<Candidate> = polygons
        .into_iter()
        .enumerate()
        .map(|(index, poly)| {
            let geo = geom::to_geo_polygon(&poly.corners);
            let bbox = geom::bounding_box(&poly.corners);
            let area = geom::shoelace_area(&poly.corners).abs();
            Candidate {
                poly,
                geo,
                bbox,
                area,
                index,
            }
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.area
            .partial_cmp(&a.area)
            .unwrap()
            .then(a.index.cmp(&b.index))
    });

    let mut kept: Vec<Candidate> = Vec::new();
    for cand in candidates {
        if kept.iter().all(|k| !is_duplicate(&cand, k, max_iou)) {
            kept.push(cand);
        } else {
            tracing::debug!(id = %cand.poly.id, "suppressed overlapping detection");
        }
    }

    kept.into_iter().map(|c| c.poly).collect()
}

fn is_duplicate(cand: &Candidate, kept: &Candidate, max_iou: f64) -> bool {
    if !geom::boxes_overlap(&cand.bbox, &kept.bbox) {
        return false;
    }
    if geom::iou(&cand.geo, &kept.geo) > max_iou {
        return true;
    }
    if geom::contains_point(&kept.geo, &cand.poly.center) {
        return true;
    }
    cand.poly
        .corners
        .iter()
        .any(|v| geom::contains_point(&kept.geo, v))
}

//! Detection orchestration: segment → extract both kinds → deduplicate.

mod dedup;

use image::RgbImage;

use crate::config::DetectParams;
use crate::extract::{extract_polygons, IdGen};
use crate::segment::segment_red;
use crate::{DetectedPolygon, DetectionKind};

pub(crate) use dedup::dedup_polygons;

/// Detect red annotations in an RGB raster.
///
/// Never fails: a raster without red annotations yields an empty vec.
/// Thick-border candidates are extracted before filled-area candidates,
/// and that insertion order breaks equal-area ties during deduplication.
pub fn detect(rgb: &RgbImage, params: &DetectParams) -> Vec<DetectedPolygon> {
    let masks = segment_red(rgb);
    let mut ids = IdGen::new();

    let mut candidates = extract_polygons(&masks.thick, DetectionKind::ThickBorder, params, &mut ids);
    candidates.extend(extract_polygons(
        &masks.filled,
        DetectionKind::FilledArea,
        params,
        &mut ids,
    ));
    let n_candidates = candidates.len();

    let kept = dedup_polygons(candidates, params.dedup_iou);
    tracing::info!(
        candidates = n_candidates,
        kept = kept.len(),
        "detection finished"
    );
    kept
}

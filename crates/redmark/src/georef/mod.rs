//! Affine georeferencing: tie-point fitting, application, scale
//! estimation, and non-fatal validation warnings.

mod fit;
mod scale;
mod validate;

pub use fit::{apply, fit, Affine2D, GeorefError};
pub use scale::{scale, ScaleResult};
pub use validate::{validate, GeorefWarning};

use crate::config::GeorefParams;
use crate::{DetectedPolygon, GeoreferencedPolygon, TiePoint};

/// Everything the geographic half of the pipeline produces for one run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GeorefOutput {
    pub polygons: Vec<GeoreferencedPolygon>,
    pub affine: Affine2D,
    pub scale: ScaleResult,
    pub warnings: Vec<GeorefWarning>,
}

/// Fit, apply, estimate scale and validate in one pass.
///
/// `image_size` is the `[width, height]` of the raster the detections came
/// from; it anchors the tie-point spread warning.
pub fn georeference(
    tie_points: &[TiePoint],
    polygons: &[DetectedPolygon],
    image_size: [u32; 2],
    params: &GeorefParams,
) -> Result<GeorefOutput, GeorefError> {
    let affine = fit(tie_points)?;
    let transformed = apply(&affine, polygons);
    let scale = scale(tie_points, params.dpi)?;
    let warnings = validate(tie_points, &affine, &transformed, image_size);

    for w in &warnings {
        tracing::warn!("{}", w);
    }
    tracing::info!(
        polygons = transformed.len(),
        denominator = scale.denominator,
        "georeferencing finished"
    );

    Ok(GeorefOutput {
        polygons: transformed,
        affine,
        scale,
        warnings,
    })
}

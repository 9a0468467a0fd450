//! Non-fatal quality checks on a fitted georeference.
//!
//! Warnings accompany successful output; they never abort the pipeline.
//! The common user mistake of entering tie points with a flipped latitude
//! axis shows up here as a large residual rather than as a fit failure.

use crate::georef::scale::{haversine_m, median};
use crate::georef::Affine2D;
use crate::{GeoreferencedPolygon, TiePoint};

/// Fraction of the median pairwise ground distance above which the worst
/// tie-point residual triggers a warning.
const RESIDUAL_FRAC: f64 = 0.1;

/// Minimum fraction of the raster bounding box the tie points should span.
const MIN_SPREAD: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GeorefWarning {
    /// Worst back-projected tie-point residual exceeds the threshold
    /// derived from the tie-point spacing.
    HighResidual {
        tie_point_id: String,
        residual_m: f64,
        threshold_m: f64,
    },
    /// A transformed coordinate left the valid geographic ranges. Nothing
    /// is clamped; the value is reported as produced.
    OutOfRange { polygon_id: String, lat: f64, lon: f64 },
    /// Tie points cover too small a part of the raster for the affine to
    /// be trustworthy far away from them.
    PoorSpread { coverage: f64 },
}

impl std::fmt::Display for GeorefWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighResidual {
                tie_point_id,
                residual_m,
                threshold_m,
            } => write!(
                f,
                "tie point {} has residual {:.1} m (threshold {:.1} m); check its coordinates",
                tie_point_id, residual_m, threshold_m
            ),
            Self::OutOfRange {
                polygon_id,
                lat,
                lon,
            } => write!(
                f,
                "polygon {} transforms outside valid ranges (lat {:.6}, lon {:.6})",
                polygon_id, lat, lon
            ),
            Self::PoorSpread { coverage } => write!(
                f,
                "tie points cover only {:.0}% of the raster; spread them out",
                coverage * 100.0
            ),
        }
    }
}

/// Run all quality checks for one fitted georeference.
///
/// `image_size` is the raster `[width, height]` in pixels.
pub fn validate(
    tie_points: &[TiePoint],
    affine: &Affine2D,
    polygons: &[GeoreferencedPolygon],
    image_size: [u32; 2],
) -> Vec<GeorefWarning> {
    let mut warnings = Vec::new();

    if let Some(w) = residual_warning(tie_points, affine) {
        warnings.push(w);
    }
    warnings.extend(range_warnings(polygons));
    if let Some(w) = spread_warning(tie_points, image_size) {
        warnings.push(w);
    }

    warnings
}

fn residual_warning(tie_points: &[TiePoint], affine: &Affine2D) -> Option<GeorefWarning> {
    if tie_points.len() < 2 {
        return None;
    }

    let mut pairwise = Vec::new();
    for i in 0..tie_points.len() {
        for j in (i + 1)..tie_points.len() {
            pairwise.push(haversine_m(&tie_points[i].geo, &tie_points[j].geo));
        }
    }
    let threshold_m = RESIDUAL_FRAC * median(&mut pairwise);
    if threshold_m <= 0.0 {
        return None;
    }

    let worst = tie_points
        .iter()
        .map(|tp| {
            let predicted = affine.apply_point(tp.pixel);
            (tp, haversine_m(&predicted, &tp.geo))
        })
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())?;

    let (tp, residual_m) = worst;
    (residual_m > threshold_m).then(|| GeorefWarning::HighResidual {
        tie_point_id: tp.id.clone(),
        residual_m,
        threshold_m,
    })
}

fn range_warnings(polygons: &[GeoreferencedPolygon]) -> Vec<GeorefWarning> {
    polygons
        .iter()
        .filter_map(|poly| {
            poly.corners
                .iter()
                .chain(std::iter::once(&poly.center))
                .find(|g| !g.is_in_range())
                .map(|g| GeorefWarning::OutOfRange {
                    polygon_id: poly.id.clone(),
                    lat: g.lat,
                    lon: g.lon,
                })
        })
        .collect()
}

fn spread_warning(tie_points: &[TiePoint], image_size: [u32; 2]) -> Option<GeorefWarning> {
    let raster_area = image_size[0] as f64 * image_size[1] as f64;
    if tie_points.is_empty() || raster_area <= 0.0 {
        return None;
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for tp in tie_points {
        min_x = min_x.min(tp.pixel.x);
        min_y = min_y.min(tp.pixel.y);
        max_x = max_x.max(tp.pixel.x);
        max_y = max_y.max(tp.pixel.y);
    }

    let coverage = ((max_x - min_x) * (max_y - min_y)) / raster_area;
    (coverage < MIN_SPREAD).then_some(GeorefWarning::PoorSpread { coverage })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::georef::fit;
    use crate::{GeoPoint, PixelPoint};

    fn tie(id: &str, x: f64, y: f64, lat: f64, lon: f64) -> TiePoint {
        TiePoint {
            id: id.to_string(),
            pixel: PixelPoint::new(x, y),
            geo: GeoPoint::new(lat, lon),
        }
    }

    fn well_spread_ties() -> Vec<TiePoint> {
        vec![
            tie("a", 0.0, 0.0, 0.0, 0.0),
            tie("b", 1000.0, 0.0, 0.0, 0.01),
            tie("c", 0.0, 1000.0, -0.01, 0.0),
            tie("d", 1000.0, 1000.0, -0.01, 0.01),
        ]
    }

    #[test]
    fn consistent_tie_points_produce_no_warnings() {
        let ties = well_spread_ties();
        let affine = fit(&ties).unwrap();
        let warnings = validate(&ties, &affine, &[], [1000, 1000]);
        assert!(warnings.is_empty(), "unexpected: {warnings:?}");
    }

    #[test]
    fn one_misplaced_tie_point_raises_residual_warning() {
        let mut ties = well_spread_ties();
        // ~1.1 km of latitude error on one point.
        ties[3].geo.lat += 0.01;
        let affine = fit(&ties).unwrap();
        let warnings = validate(&ties, &affine, &[], [1000, 1000]);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, GeorefWarning::HighResidual { .. })));
    }

    #[test]
    fn out_of_range_output_is_reported_not_clamped() {
        let affine = Affine2D {
            a: 0.01,
            b: 0.0,
            c: 179.5,
            d: 0.0,
            e: -0.01,
            f: 0.0,
        };
        let poly = crate::DetectedPolygon {
            id: "ann-0000".into(),
            corners: vec![
                PixelPoint::new(10.0, 10.0),
                PixelPoint::new(100.0, 10.0),
                PixelPoint::new(100.0, 100.0),
            ],
            center: PixelPoint::new(70.0, 40.0),
            kind: crate::DetectionKind::ThickBorder,
        };
        let transformed = crate::georef::apply(&affine, &[poly]);
        // lon at x=100 is 180.5: outside the valid range, unclamped.
        assert!(transformed[0].corners[1].lon > 180.0);

        let warnings = range_warnings(&transformed);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            GeorefWarning::OutOfRange { polygon_id, .. } if polygon_id == "ann-0000"
        ));
    }

    #[test]
    fn clustered_tie_points_raise_spread_warning() {
        let ties = vec![
            tie("a", 450.0, 450.0, 0.0, 0.0),
            tie("b", 550.0, 450.0, 0.0, 0.001),
            tie("c", 450.0, 550.0, -0.001, 0.0),
        ];
        let affine = fit(&ties).unwrap();
        let warnings = validate(&ties, &affine, &[], [1000, 1000]);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, GeorefWarning::PoorSpread { coverage } if *coverage < 0.3)));
    }

    #[test]
    fn spread_coverage_uses_raster_fraction() {
        let w = spread_warning(
            &[
                tie("a", 0.0, 0.0, 0.0, 0.0),
                tie("b", 500.0, 500.0, 0.0, 0.001),
            ],
            [1000, 1000],
        );
        assert_eq!(w, Some(GeorefWarning::PoorSpread { coverage: 0.25 }));
    }
}

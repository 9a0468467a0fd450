//! Least-squares affine fit from pixel↔geographic tie points.

use nalgebra::DMatrix;

use crate::{DetectedPolygon, GeoPoint, GeoreferencedPolygon, PixelPoint, TiePoint};

/// Normalized-cross-product threshold below which three points count as
/// collinear.
const COLLINEAR_EPS: f64 = 1e-6;

/// Singular-value ratio below which the design matrix counts as
/// rank-deficient.
const RANK_EPS: f64 = 1e-10;

// ── Error type ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum GeorefError {
    /// Fewer usable tie points than the operation needs.
    InsufficientPoints { needed: usize, got: usize },
    /// Tie-point pixels are (nearly) collinear; the fit is rank-deficient.
    CollinearPoints,
    /// A supplied coordinate lies outside lat [-90, 90] / lon [-180, 180].
    InvalidGeoRange { lat: f64, lon: f64 },
}

impl std::fmt::Display for GeorefError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientPoints { needed, got } => {
                write!(f, "insufficient tie points: need {}, got {}", needed, got)
            }
            Self::CollinearPoints => write!(f, "tie points are collinear"),
            Self::InvalidGeoRange { lat, lon } => {
                write!(f, "coordinate out of range: lat {}, lon {}", lat, lon)
            }
        }
    }
}

impl std::error::Error for GeorefError {}

// ── Affine transform ─────────────────────────────────────────────────────

/// 2-D affine map from pixel space to geographic space:
///
/// ```text
/// lon = a·x + b·y + c
/// lat = d·x + e·y + f
/// ```
///
/// Image y grows downward while latitude grows northward; no flip is
/// hard-coded here. The signs of `b` and `e` are learned from the tie
/// points, so a user who enters tie points with the conventional
/// orientation gets a negative `e`. A sign mistake in the tie points
/// therefore surfaces as large residual warnings, not as a fit failure.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Affine2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine2D {
    /// Transform one pixel coordinate.
    pub fn apply_point(&self, p: PixelPoint) -> GeoPoint {
        GeoPoint {
            lon: self.a * p.x + self.b * p.y + self.c,
            lat: self.d * p.x + self.e * p.y + self.f,
        }
    }

    /// Row-major `[[a, b, c], [d, e, f]]` view for serialization and logs.
    pub fn rows(&self) -> [[f64; 3]; 2] {
        [[self.a, self.b, self.c], [self.d, self.e, self.f]]
    }
}

// ── Fit ──────────────────────────────────────────────────────────────────

/// Fit the affine map by ordinary least squares over all tie points.
///
/// Solves the overdetermined system `[xᵢ yᵢ 1]·params = [lonᵢ latᵢ]` via
/// SVD; both output axes share one design matrix. Requires at least three
/// tie points whose pixels are not collinear. With exactly three points
/// the normalized cross product of the two edge vectors is tested against
/// 1e-6; with more points rank deficiency of the design matrix governs,
/// so one degenerate triple among well-spread points does not refuse the
/// fit.
pub fn fit(tie_points: &[TiePoint]) -> Result<Affine2D, GeorefError> {
    let n = tie_points.len();
    if n < 3 {
        return Err(GeorefError::InsufficientPoints { needed: 3, got: n });
    }
    assert_geo_ranges(tie_points)?;

    if n == 3 && triple_is_collinear(&tie_points[0].pixel, &tie_points[1].pixel, &tie_points[2].pixel)
    {
        return Err(GeorefError::CollinearPoints);
    }

    let design = DMatrix::from_fn(n, 3, |i, j| match j {
        0 => tie_points[i].pixel.x,
        1 => tie_points[i].pixel.y,
        _ => 1.0,
    });
    let rhs = DMatrix::from_fn(n, 2, |i, j| {
        if j == 0 {
            tie_points[i].geo.lon
        } else {
            tie_points[i].geo.lat
        }
    });

    let svd = design.svd(true, true);
    let s_max = svd.singular_values.iter().cloned().fold(0.0, f64::max);
    let s_min = svd
        .singular_values
        .iter()
        .cloned()
        .fold(f64::INFINITY, f64::min);
    if s_max <= 0.0 || s_min < s_max * RANK_EPS {
        return Err(GeorefError::CollinearPoints);
    }

    let params = svd
        .solve(&rhs, s_max * RANK_EPS)
        .map_err(|_| GeorefError::CollinearPoints)?;

    let affine = Affine2D {
        a: params[(0, 0)],
        b: params[(1, 0)],
        c: params[(2, 0)],
        d: params[(0, 1)],
        e: params[(1, 1)],
        f: params[(2, 1)],
    };
    tracing::debug!(rows = ?affine.rows(), n, "affine fit");
    Ok(affine)
}

/// Transform every corner and the center of each polygon.
///
/// Never fails; coordinates outside the valid geographic ranges pass
/// through unclamped and are flagged by validation instead.
pub fn apply(affine: &Affine2D, polygons: &[DetectedPolygon]) -> Vec<GeoreferencedPolygon> {
    polygons
        .iter()
        .map(|p| GeoreferencedPolygon {
            id: p.id.clone(),
            corners: p.corners.iter().map(|&c| affine.apply_point(c)).collect(),
            center: affine.apply_point(p.center),
        })
        .collect()
}

pub(crate) fn assert_geo_ranges(tie_points: &[TiePoint]) -> Result<(), GeorefError> {
    for tp in tie_points {
        if !tp.geo.is_in_range() {
            return Err(GeorefError::InvalidGeoRange {
                lat: tp.geo.lat,
                lon: tp.geo.lon,
            });
        }
    }
    Ok(())
}

fn triple_is_collinear(p1: &PixelPoint, p2: &PixelPoint, p3: &PixelPoint) -> bool {
    let v1 = (p2.x - p1.x, p2.y - p1.y);
    let v2 = (p3.x - p1.x, p3.y - p1.y);
    let cross = v1.0 * v2.1 - v1.1 * v2.0;
    let norm = v1.0.hypot(v1.1) * v2.0.hypot(v2.1);
    if norm <= 0.0 {
        return true;
    }
    (cross / norm).abs() < COLLINEAR_EPS
}

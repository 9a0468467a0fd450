//! Nominal map-scale estimation from tie-point geometry.

use geo::{HaversineDistance, Point};

use crate::georef::fit::assert_geo_ranges;
use crate::georef::GeorefError;
use crate::{GeoPoint, TiePoint};

/// Meters per inch of paper.
const METERS_PER_INCH: f64 = 0.0254;

/// Nominal "1 : N" map scale.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScaleResult {
    /// The denominator N; always positive.
    pub denominator: f64,
}

/// Estimate the scale denominator from all tie-point pairs.
///
/// For every pair, the pixel distance is converted to a paper distance
/// through `dpi` and compared against the haversine ground distance (mean
/// Earth radius 6 371 008.8 m). The reported denominator is the median of
/// the per-pair ratios, which tolerates one badly placed tie point.
///
/// Pairs with coincident pixel locations contribute nothing; if no pair
/// has distinct pixels the error reports the distinct-location count.
/// `dpi` must be positive; the caller validates it at the boundary.
pub fn scale(tie_points: &[TiePoint], dpi: f64) -> Result<ScaleResult, GeorefError> {
    debug_assert!(dpi > 0.0, "dpi must be positive");
    let n = tie_points.len();
    if n < 2 {
        return Err(GeorefError::InsufficientPoints { needed: 2, got: n });
    }
    assert_geo_ranges(tie_points)?;

    let mut ratios = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let dp = tie_points[i].pixel.distance(&tie_points[j].pixel);
            if dp <= f64::EPSILON {
                continue;
            }
            let dg = haversine_m(&tie_points[i].geo, &tie_points[j].geo);
            let d_paper = dp * METERS_PER_INCH / dpi;
            ratios.push(dg / d_paper);
        }
    }

    if ratios.is_empty() {
        let distinct = distinct_pixel_count(tie_points);
        return Err(GeorefError::InsufficientPoints {
            needed: 2,
            got: distinct,
        });
    }

    let denominator = median(&mut ratios);
    tracing::debug!(pairs = ratios.len(), denominator, "scale estimate");
    Ok(ScaleResult { denominator })
}

/// Great-circle distance in meters.
pub(crate) fn haversine_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    Point::new(a.lon, a.lat).haversine_distance(&Point::new(b.lon, b.lat))
}

/// Median of an unsorted slice; averages the middle pair for even lengths.
pub(crate) fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        0.5 * (values[mid - 1] + values[mid])
    }
}

fn distinct_pixel_count(tie_points: &[TiePoint]) -> usize {
    let mut count = 0;
    for (i, tp) in tie_points.iter().enumerate() {
        let seen = tie_points[..i]
            .iter()
            .any(|other| tp.pixel.distance(&other.pixel) <= f64::EPSILON);
        if !seen {
            count += 1;
        }
    }
    count
}

//! redmark — detector and georeferencer for hand-drawn red map annotations.
//!
//! The input is a raster page rendered from a PDF map on which a user has
//! drawn annotations in red: thick outlines around areas of interest, or
//! pale red filled regions. The pipeline stages are:
//!
//! 1. **Segment** – HSV thresholding into two binary masks (thick-outline
//!    candidates and filled-region candidates) plus light morphology.
//! 2. **Extract** – external contours of each mask, simplified to polygons
//!    and filtered by perimeter, vertex count, area and compactness.
//! 3. **Detect** – both annotation kinds merged, overlapping detections
//!    suppressed by exact polygon IoU.
//! 4. **Georef** – a 2-D affine pixel→(lon, lat) map fitted by least squares
//!    from user-supplied tie points, validated, applied to the detections,
//!    with a nominal map-scale estimate alongside.
//! 5. **KML** – georeferenced polygons written as KML 2.2 placemarks.
//!
//! # Public API
//! - [`detect`] with [`DetectParams`] for the raster half
//! - [`fit`], [`apply`], [`scale`] and the [`georeference`] convenience
//!   wrapper for the geographic half
//! - [`write_kml`] for the output document
//!
//! The library holds no global state; every run is a pure function of its
//! inputs and an explicit parameter struct.

mod config;
mod detector;
mod extract;
mod geom;
mod georef;
mod kml;
mod segment;
#[cfg(test)]
mod test_utils;

pub use config::{DetectParams, GeorefParams};
pub use detector::detect;
pub use extract::{extract_polygons, IdGen};
pub use georef::{
    apply, fit, georeference, scale, validate, Affine2D, GeorefError, GeorefOutput, GeorefWarning,
    ScaleResult,
};
pub use kml::write_kml;
pub use segment::{segment_red, RedMasks};

/// Image-space coordinate in pixels. Sub-pixel values are allowed.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another pixel point.
    pub fn distance(&self, other: &PixelPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// WGS84 geographic coordinate in degrees (no elevation).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, valid range [-90, 90].
    pub lat: f64,
    /// Longitude in degrees, valid range [-180, 180].
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether the coordinate lies inside the valid WGS84 ranges.
    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// User-supplied correspondence between a pixel location and a geographic
/// location. The `id` is opaque; the core never interprets it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TiePoint {
    pub id: String,
    pub pixel: PixelPoint,
    pub geo: GeoPoint,
}

/// Which red-annotation profile produced a detection.
///
/// Purely informational downstream; both kinds flow through the same
/// georeferencing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionKind {
    /// Saturated red stroke outlining a region.
    ThickBorder,
    /// Pale red wash filling a region.
    FilledArea,
}

/// A detected annotation polygon in pixel space.
///
/// `corners` hold 3 to 50 vertices in contour order with a consistent
/// winding (not normalized to CW or CCW). `id` is an opaque token, unique
/// within one detection run; callers must not assume a particular scheme.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DetectedPolygon {
    pub id: String,
    pub corners: Vec<PixelPoint>,
    /// Arithmetic mean of `corners` (not the area centroid).
    pub center: PixelPoint,
    pub kind: DetectionKind,
}

/// A detected polygon after georeferencing.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoreferencedPolygon {
    pub id: String,
    pub corners: Vec<GeoPoint>,
    pub center: GeoPoint,
}

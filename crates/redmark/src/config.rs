//! Detection and georeferencing parameters.
//!
//! The source of these defaults is the annotation geometry of scanned map
//! pages at 300 DPI. All values are threaded explicitly; the library reads
//! no environment variables and keeps no process-wide state.

/// Filters applied to candidate polygons during extraction and
/// deduplication.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DetectParams {
    /// Minimum enclosed area of a kept polygon, px².
    pub min_area: f64,
    /// Minimum contour perimeter of a kept polygon, px.
    pub min_perimeter: f64,
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub epsilon_frac: f64,
    /// Minimum vertex count after simplification.
    pub min_vertices: usize,
    /// Maximum vertex count after simplification.
    pub max_vertices: usize,
    /// Minimum isoperimetric compactness 4πA/P². Rejects thin slivers.
    pub min_compactness: f64,
    /// Pairwise IoU above which the smaller detection is suppressed.
    pub dedup_iou: f64,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            min_area: 500.0,
            min_perimeter: 50.0,
            epsilon_frac: 0.01,
            min_vertices: 3,
            max_vertices: 50,
            min_compactness: 0.01,
            dedup_iou: 0.5,
        }
    }
}

/// Parameters of the geographic half of the pipeline.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GeorefParams {
    /// Resolution at which the page was rasterized, dots per inch.
    /// Carried end-to-end so the scale estimate reflects the true paper
    /// geometry rather than an assumed default.
    pub dpi: f64,
}

impl Default for GeorefParams {
    fn default() -> Self {
        Self { dpi: 300.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_params_defaults_are_stable() {
        let p = DetectParams::default();
        assert_eq!(p.min_area, 500.0);
        assert_eq!(p.min_perimeter, 50.0);
        assert_eq!(p.epsilon_frac, 0.01);
        assert_eq!(p.min_vertices, 3);
        assert_eq!(p.max_vertices, 50);
        assert_eq!(p.min_compactness, 0.01);
        assert_eq!(p.dedup_iou, 0.5);
    }

    #[test]
    fn georef_params_default_dpi() {
        assert_eq!(GeorefParams::default().dpi, 300.0);
    }
}

//! redmark CLI — detect red map annotations and georeference them to KML.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use redmark::{DetectParams, DetectedPolygon, GeorefParams, TiePoint};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "redmark")]
#[command(about = "Extract hand-drawn red map annotations from a rasterized PDF page and georeference them")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect red annotation polygons in an image.
    Detect {
        /// Path to the input raster (PNG/JPEG page render).
        #[arg(long)]
        image: PathBuf,

        /// Path to write detected polygons (JSON).
        #[arg(long)]
        out: PathBuf,

        /// Minimum polygon area in px².
        #[arg(long, default_value = "500.0")]
        min_area: f64,

        /// Minimum contour perimeter in px.
        #[arg(long, default_value = "50.0")]
        min_perimeter: f64,

        /// Douglas-Peucker tolerance as a fraction of the perimeter.
        #[arg(long, default_value = "0.01")]
        epsilon_frac: f64,
    },

    /// Georeference previously detected polygons and write KML.
    Georef {
        /// Detected polygons (JSON, as written by `detect`).
        #[arg(long)]
        detections: PathBuf,

        /// Tie points (JSON array of {id, pixel: {x, y}, geo: {lat, lon}}).
        #[arg(long)]
        tie_points: PathBuf,

        /// Raster width in pixels.
        #[arg(long)]
        width: u32,

        /// Raster height in pixels.
        #[arg(long)]
        height: u32,

        /// Rasterization resolution in DPI.
        #[arg(long, default_value = "300.0")]
        dpi: f64,

        /// Path to write the KML document.
        #[arg(long)]
        out: PathBuf,
    },

    /// Detect and georeference in one pass.
    Run {
        /// Path to the input raster.
        #[arg(long)]
        image: PathBuf,

        /// Tie points (JSON).
        #[arg(long)]
        tie_points: PathBuf,

        /// Rasterization resolution in DPI.
        #[arg(long, default_value = "300.0")]
        dpi: f64,

        /// Path to write the KML document.
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect {
            image,
            out,
            min_area,
            min_perimeter,
            epsilon_frac,
        } => run_detect(&image, &out, min_area, min_perimeter, epsilon_frac),

        Commands::Georef {
            detections,
            tie_points,
            width,
            height,
            dpi,
            out,
        } => run_georef(&detections, &tie_points, [width, height], dpi, &out),

        Commands::Run {
            image,
            tie_points,
            dpi,
            out,
        } => run_pipeline(&image, &tie_points, dpi, &out),
    }
}

// ── detect ───────────────────────────────────────────────────────────────

fn run_detect(
    image_path: &Path,
    out_path: &Path,
    min_area: f64,
    min_perimeter: f64,
    epsilon_frac: f64,
) -> CliResult<()> {
    let rgb = load_rgb(image_path)?;
    let params = DetectParams {
        min_area,
        min_perimeter,
        epsilon_frac,
        ..DetectParams::default()
    };

    let polygons = redmark::detect(&rgb, &params);
    tracing::info!("Detected {} annotations", polygons.len());

    let json = serde_json::to_string_pretty(&polygons)?;
    std::fs::write(out_path, &json)?;
    tracing::info!("Detections written to {}", out_path.display());
    Ok(())
}

// ── georef ───────────────────────────────────────────────────────────────

fn run_georef(
    detections_path: &Path,
    tie_points_path: &Path,
    image_size: [u32; 2],
    dpi: f64,
    out_path: &Path,
) -> CliResult<()> {
    let polygons: Vec<DetectedPolygon> =
        serde_json::from_str(&std::fs::read_to_string(detections_path)?)?;
    let ties = load_tie_points(tie_points_path)?;
    let params = positive_dpi(dpi)?;

    georeference_and_write(&ties, &polygons, image_size, &params, out_path)
}

// ── run ──────────────────────────────────────────────────────────────────

fn run_pipeline(
    image_path: &Path,
    tie_points_path: &Path,
    dpi: f64,
    out_path: &Path,
) -> CliResult<()> {
    let rgb = load_rgb(image_path)?;
    let (w, h) = rgb.dimensions();
    let ties = load_tie_points(tie_points_path)?;
    let params = positive_dpi(dpi)?;

    let polygons = redmark::detect(&rgb, &DetectParams::default());
    tracing::info!("Detected {} annotations", polygons.len());

    georeference_and_write(&ties, &polygons, [w, h], &params, out_path)
}

// ── shared ───────────────────────────────────────────────────────────────

fn load_rgb(path: &Path) -> CliResult<image::RgbImage> {
    let img = image::open(path)
        .map_err(|e| -> CliError { format!("failed to open image {}: {}", path.display(), e).into() })?;
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    tracing::info!("Loaded {} ({}x{})", path.display(), w, h);
    Ok(rgb)
}

fn load_tie_points(path: &Path) -> CliResult<Vec<TiePoint>> {
    let ties: Vec<TiePoint> = serde_json::from_str(&std::fs::read_to_string(path)?)
        .map_err(|e| -> CliError {
            format!("failed to parse tie points {}: {}", path.display(), e).into()
        })?;
    tracing::info!("Loaded {} tie points", ties.len());
    Ok(ties)
}

fn positive_dpi(dpi: f64) -> CliResult<GeorefParams> {
    if dpi <= 0.0 || !dpi.is_finite() {
        return Err(format!("--dpi must be positive, got {}", dpi).into());
    }
    Ok(GeorefParams { dpi })
}

fn georeference_and_write(
    ties: &[TiePoint],
    polygons: &[DetectedPolygon],
    image_size: [u32; 2],
    params: &GeorefParams,
    out_path: &Path,
) -> CliResult<()> {
    let output = redmark::georeference(ties, polygons, image_size, params)?;

    tracing::info!(
        "Map scale approximately 1:{:.0}; {} warning(s)",
        output.scale.denominator,
        output.warnings.len(),
    );

    let kml = redmark::write_kml(&output.polygons, "Red annotations");
    std::fs::write(out_path, &kml)?;
    tracing::info!("KML written to {}", out_path.display());
    Ok(())
}

//! Export render results: PNG images, sampled curves as CSV, snapshot bundles.
//!
//! The CSV export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use image::RgbImage;
use log::info;

use crate::app::pipeline::RenderResult;
use crate::domain::{CalibrationSet, CurveSet, LabConfig};
use crate::error::AppError;
use crate::io::curve::write_curve_json;

pub const SWATCH_FILE: &str = "swatch.png";
pub const GRADIENT_FILE: &str = "gradient.png";
pub const SAMPLES_FILE: &str = "curve_samples.csv";
pub const CURVE_FILE: &str = "curve.json";

/// Write an image as PNG.
pub fn write_png(path: &Path, img: &RgbImage) -> Result<(), AppError> {
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| AppError::io(format!("Failed to write PNG '{}': {e}", path.display())))?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Write the sampled curves to CSV (`ph,red,green,blue`).
pub fn write_samples_csv(path: &Path, curves: &CurveSet) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create samples CSV '{}': {e}", path.display())))?;

    writeln!(file, "ph,red,green,blue")
        .map_err(|e| AppError::io(format!("Failed to write samples CSV header: {e}")))?;

    let rows = curves
        .red
        .samples
        .iter()
        .zip(&curves.green.samples)
        .zip(&curves.blue.samples);
    for ((&(ph, r), &(_, g)), &(_, b)) in rows {
        writeln!(file, "{ph:.6},{r:.4},{g:.4},{b:.4}")
            .map_err(|e| AppError::io(format!("Failed to write samples CSV row: {e}")))?;
    }

    info!("wrote {}", path.display());
    Ok(())
}

/// Write the files a `render` run asks for into `config.out_dir`.
///
/// Returns the paths written, in order.
pub fn write_render_outputs(result: &RenderResult, config: &LabConfig) -> Result<Vec<PathBuf>, AppError> {
    let mut written = Vec::new();
    if !(config.write_images || config.write_samples) {
        return Ok(written);
    }

    create_dir_all(&config.out_dir).map_err(|e| {
        AppError::io(format!("Failed to create output dir '{}': {e}", config.out_dir.display()))
    })?;

    if config.write_images {
        let swatch = config.out_dir.join(SWATCH_FILE);
        write_png(&swatch, &result.swatch)?;
        written.push(swatch);

        let gradient = config.out_dir.join(GRADIENT_FILE);
        write_png(&gradient, &result.gradient)?;
        written.push(gradient);
    }
    if config.write_samples {
        let samples = config.out_dir.join(SAMPLES_FILE);
        write_samples_csv(&samples, &result.curves)?;
        written.push(samples);
    }

    Ok(written)
}

/// Write every artifact of `result` into a fresh timestamped directory under `base`.
pub fn write_snapshot_bundle(
    result: &RenderResult,
    calibration: &CalibrationSet,
    base: &Path,
) -> Result<PathBuf, AppError> {
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let dir = base.join(format!(
        "phlab_ph{:04.1}_{}_{ts}",
        result.request.ph,
        result.curves.mode.display_name().to_lowercase()
    ));
    create_dir_all(&dir)
        .map_err(|e| AppError::io(format!("Failed to create snapshot dir '{}': {e}", dir.display())))?;

    write_png(&dir.join(SWATCH_FILE), &result.swatch)?;
    write_png(&dir.join(GRADIENT_FILE), &result.gradient)?;
    write_samples_csv(&dir.join(SAMPLES_FILE), &result.curves)?;
    write_curve_json(&dir.join(CURVE_FILE), &result.curves, calibration)?;

    info!("wrote snapshot bundle {}", dir.display());
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::handle;
    use crate::domain::RenderRequest;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("phlab_{name}_{}", std::process::id()))
    }

    fn linear_result() -> RenderResult {
        let request = RenderRequest {
            use_sigmoid: false,
            ..RenderRequest::default()
        };
        handle(request, &LabConfig::default()).unwrap()
    }

    #[test]
    fn render_outputs_write_images_and_samples() {
        let out_dir = scratch_dir("render_outputs");
        let config = LabConfig {
            out_dir: out_dir.clone(),
            write_samples: true,
            ..LabConfig::default()
        };
        let written = write_render_outputs(&linear_result(), &config).unwrap();
        assert_eq!(written.len(), 3);

        let swatch = image::open(out_dir.join(SWATCH_FILE)).unwrap().to_rgb8();
        assert_eq!(swatch.dimensions(), (100, 300));
        assert_eq!(*swatch.get_pixel(50, 150), image::Rgb([80, 175, 255]));

        let csv = std::fs::read_to_string(out_dir.join(SAMPLES_FILE)).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("ph,red,green,blue"));
        assert_eq!(lines.next(), Some("0.000000,230.0000,20.0000,60.0000"));
        assert_eq!(csv.lines().count(), 301);

        let _ = std::fs::remove_dir_all(&out_dir);
    }

    #[test]
    fn nothing_requested_writes_nothing() {
        let config = LabConfig {
            out_dir: scratch_dir("nothing"),
            write_images: false,
            write_samples: false,
            ..LabConfig::default()
        };
        assert!(write_render_outputs(&linear_result(), &config).unwrap().is_empty());
        assert!(!config.out_dir.exists());
    }

    #[test]
    fn snapshot_bundle_contains_every_artifact() {
        let base = scratch_dir("bundle");
        let dir = write_snapshot_bundle(&linear_result(), &CalibrationSet::standard(), &base).unwrap();
        for name in [SWATCH_FILE, GRADIENT_FILE, SAMPLES_FILE, CURVE_FILE] {
            assert!(dir.join(name).is_file(), "missing {name}");
        }
        assert!(dir.file_name().unwrap().to_string_lossy().starts_with("phlab_ph07.0_linear_"));
        let _ = std::fs::remove_dir_all(&base);
    }
}

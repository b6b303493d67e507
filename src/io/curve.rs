//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a curve set:
//! - fit mode + per-channel logistic parameters and quality
//! - the calibration table the curves came from
//! - the sampled grid for quick plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;
use log::info;

use crate::domain::{CalibrationSet, ChannelSummary, CurveFile, CurveGrid, CurveSet};
use crate::error::AppError;

/// Build the serializable form of a curve set.
pub fn curve_file(curves: &CurveSet, calibration: &CalibrationSet) -> CurveFile {
    let column = |samples: &[(f64, f64)]| samples.iter().map(|&(_, y)| y).collect::<Vec<f64>>();

    CurveFile {
        tool: "phlab".to_string(),
        generated_at: Utc::now(),
        mode: curves.mode,
        calibration: calibration.points().to_vec(),
        channels: curves
            .iter()
            .map(|c| ChannelSummary {
                channel: c.channel,
                params: c.params,
                quality: c.quality.clone(),
            })
            .collect(),
        grid: CurveGrid {
            ph: curves.red.samples.iter().map(|&(x, _)| x).collect(),
            red: column(&curves.red.samples),
            green: column(&curves.green.samples),
            blue: column(&curves.blue.samples),
        },
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curves: &CurveSet, calibration: &CalibrationSet) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &curve_file(curves, calibration))
        .map_err(|e| AppError::io(format!("Failed to write curve JSON: {e}")))?;

    info!("wrote curve JSON {}", path.display());
    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::io(format!("Invalid curve JSON: {e}")))?;

    let n = curve.grid.ph.len();
    if curve.grid.red.len() != n || curve.grid.green.len() != n || curve.grid.blue.len() != n {
        return Err(AppError::io(format!(
            "Invalid curve JSON: grid columns differ in length (ph has {n} samples)."
        )));
    }
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitMode, LabConfig};
    use crate::fit::{SigmoidFit, fit_curve_set, ph_grid};

    #[test]
    fn curve_json_survives_a_save_and_load() {
        let calibration = CalibrationSet::standard();
        let grid = ph_grid(&LabConfig::default()).unwrap();
        let curves = fit_curve_set(&SigmoidFit::default(), &calibration, &grid).unwrap();

        let path = std::env::temp_dir().join(format!("phlab_curve_{}.json", std::process::id()));
        write_curve_json(&path, &curves, &calibration).unwrap();
        let loaded = read_curve_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.mode, FitMode::Sigmoid);
        assert_eq!(loaded.grid.ph.len(), 300);
        assert_eq!(loaded.calibration.len(), 7);
        let saved = loaded.channels[0].params.unwrap().to_array();
        let fitted = curves.red.params.unwrap().to_array();
        for (a, b) in saved.iter().zip(fitted.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn mismatched_grid_is_rejected() {
        let path = std::env::temp_dir().join(format!("phlab_bad_curve_{}.json", std::process::id()));
        let json = r#"{
            "tool": "phlab",
            "generated_at": "2026-01-01T00:00:00Z",
            "mode": "linear",
            "calibration": [],
            "channels": [],
            "grid": { "ph": [0.0, 1.0], "red": [1.0], "green": [1.0, 2.0], "blue": [1.0, 2.0] }
        }"#;
        std::fs::write(&path, json).unwrap();
        let err = read_curve_json(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(err.to_string().contains("differ in length"));
    }
}

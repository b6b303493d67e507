//! Text formatting for render results.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - the CLI and TUI show identical wording

use crate::app::pipeline::RenderResult;
use crate::domain::{CurveSet, Rgb};

/// The color readout line: `RGB: (r, g, b)  #rrggbb`.
pub fn format_rgb_line(rgb: Rgb) -> String {
    format!("RGB: {rgb}  {}", rgb.hex())
}

/// Header + fit diagnostics for a full result.
pub fn format_run_summary(result: &RenderResult) -> String {
    let mut out = String::new();

    out.push_str("=== phlab - pH color lab ===\n");
    out.push_str(&format!("pH: {:.1}\n", result.request.ph));
    out.push_str(&format!("Fit: {}\n", result.curves.mode.display_name()));
    out.push_str(&format!(
        "Data points: {}\n",
        if result.request.show_points { "shown" } else { "hidden" }
    ));
    out.push_str(&format_rgb_line(result.rgb));
    out.push('\n');

    out.push_str("\nChannel curves:\n");
    out.push_str(&format_curve_table(&result.curves));

    out
}

/// One row per channel: logistic parameters and quality, or the sample range
/// for interpolated curves.
pub fn format_curve_table(curves: &CurveSet) -> String {
    let mut out = String::new();
    for curve in curves.iter() {
        let name = curve.channel.display_name();
        match (&curve.params, &curve.quality) {
            (Some(p), Some(q)) => {
                out.push_str(&format!(
                    "  {name:<6} L={:>9.3} x0={:>7.3} k={:>7.4} b={:>9.3} | RMSE={:.3} evals={}\n",
                    p.l, p.x0, p.k, p.b, q.rmse, q.evaluations
                ));
            }
            _ => {
                let (lo, hi) = value_range(&curve.samples);
                out.push_str(&format!(
                    "  {name:<6} linear, {} samples, range [{lo:.1}, {hi:.1}]\n",
                    curve.samples.len()
                ));
            }
        }
    }
    out
}

fn value_range(samples: &[(f64, f64)]) -> (f64, f64) {
    samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CalibrationSet, LabConfig};
    use crate::fit::{LinearInterp, fit_curve_set, ph_grid};

    #[test]
    fn rgb_line_has_tuple_and_hex() {
        assert_eq!(format_rgb_line(Rgb::new(255, 0, 31)), "RGB: (255, 0, 31)  #ff001f");
    }

    #[test]
    fn linear_table_lists_every_channel() {
        let grid = ph_grid(&LabConfig::default()).unwrap();
        let curves = fit_curve_set(&LinearInterp, &CalibrationSet::standard(), &grid).unwrap();
        let table = format_curve_table(&curves);
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("Red    linear, 300 samples, range [20.0, 230.0]"));
        assert!(table.contains("Blue   linear, 300 samples, range [60.0, "));
    }
}

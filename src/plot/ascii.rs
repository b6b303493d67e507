//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - channel curves: `r`, `g`, `b`
//! - calibration points: `R`, `G`, `B`

use crate::app::pipeline::ScatterSeries;
use crate::domain::{Channel, CurveFile, CurveSet, PH_MAX, PH_MIN};

const LEGEND: &str = "Legend: r/g/b curve, R/G/B calibration point\n";

/// Render the curves (and optional scatter) of an in-memory result.
pub fn render_ascii_plot(curves: &CurveSet, points: &[ScatterSeries], width: usize, height: usize) -> String {
    let series: Vec<(char, &[(f64, f64)])> = curves
        .iter()
        .map(|c| (curve_char(c.channel), c.samples.as_slice()))
        .collect();
    let markers = scatter_markers(points.iter().map(|s| (s.channel, s.points.as_slice())));

    let (x_min, x_max) = x_range(&series).unwrap_or((PH_MIN, PH_MAX));
    let mut out = render_plot(&series, &markers, x_min, x_max, width, height);
    out.push_str(LEGEND);
    out
}

/// Render a saved curve file, optionally overlaying its calibration points.
pub fn render_ascii_plot_from_curve_file(
    curve: &CurveFile,
    show_points: bool,
    width: usize,
    height: usize,
) -> String {
    let owned: Vec<(Channel, Vec<(f64, f64)>)> = Channel::ALL
        .iter()
        .map(|&ch| {
            let samples = curve
                .grid
                .ph
                .iter()
                .zip(curve.grid.channel(ch))
                .map(|(&x, &y)| (x, y))
                .collect();
            (ch, samples)
        })
        .collect();
    let series: Vec<(char, &[(f64, f64)])> = owned
        .iter()
        .map(|(ch, samples)| (curve_char(*ch), samples.as_slice()))
        .collect();

    let scatter: Vec<(Channel, Vec<(f64, f64)>)> = if show_points {
        Channel::ALL
            .iter()
            .map(|&ch| {
                let pts = curve
                    .calibration
                    .iter()
                    .map(|p| (p.ph, f64::from(p.rgb.channel(ch))))
                    .collect();
                (ch, pts)
            })
            .collect()
    } else {
        Vec::new()
    };
    let markers = scatter_markers(scatter.iter().map(|(ch, pts)| (*ch, pts.as_slice())));

    let (x_min, x_max) = x_range(&series).unwrap_or((PH_MIN, PH_MAX));
    let mut out = render_plot(&series, &markers, x_min, x_max, width, height);
    out.push_str(LEGEND);
    out
}

fn curve_char(channel: Channel) -> char {
    match channel {
        Channel::Red => 'r',
        Channel::Green => 'g',
        Channel::Blue => 'b',
    }
}

fn point_char(channel: Channel) -> char {
    curve_char(channel).to_ascii_uppercase()
}

fn scatter_markers<'a>(series: impl Iterator<Item = (Channel, &'a [(f64, f64)])>) -> Vec<(char, f64, f64)> {
    series
        .flat_map(|(ch, pts)| pts.iter().map(move |&(x, y)| (point_char(ch), x, y)))
        .collect()
}

fn render_plot(
    series: &[(char, &[(f64, f64)])],
    markers: &[(char, f64, f64)],
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    // Determine y-range from markers and curve points.
    let (y_min, y_max) = y_range(series, markers).unwrap_or((0.0, 255.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curves first (so points can overlay).
    for &(ch, samples) in series {
        draw_curve(&mut grid, samples, ch, x_min, x_max, y_min, y_max);
    }

    for &(ch, x, y) in markers {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = ch;
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: pH=[{x_min:.1}, {x_max:.1}] | intensity=[{y_min:.1}, {y_max:.1}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn x_range(series: &[(char, &[(f64, f64)])]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &(_, samples) in series {
        for &(x, _) in samples {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
        }
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(series: &[(char, &[(f64, f64)])], markers: &[(char, f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(_, samples) in series {
        for &(_, y) in samples {
            if y.is_finite() {
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
    }
    for &(_, _, y) in markers {
        if y.is_finite() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    ch: char,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !(x.is_finite() && y.is_finite()) {
            prev = None;
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, ch);
        } else if grid[row][col] == ' ' {
            grid[row][col] = ch;
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish). Only fills empty cells, so the first
/// channel drawn wins where curves cross.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

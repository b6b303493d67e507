//! pH vs intensity chart for the TUI.
//!
//! Drawn with Plotters through `plotters-ratatui-backend`, which gives proper
//! axes and tick labels without hand-placing them on a ratatui canvas.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One colored series (curve or scatter).
pub struct ChartSeries<'a> {
    pub color: RGBColor,
    pub data: &'a [(f64, f64)],
    /// Legend entry; unlabelled series stay out of the legend.
    pub label: Option<String>,
}

/// Everything the chart draws, prepared by the caller.
pub struct ChannelChart<'a> {
    /// One fitted/interpolated line per channel.
    pub curves: &'a [ChartSeries<'a>],
    /// Calibration points per channel (empty when hidden).
    pub points: &'a [ChartSeries<'a>],
    /// Current slider position, drawn as a vertical line.
    pub marker_ph: Option<f64>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for ChannelChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out axes in a tiny area.
        if area.width < 20 || area.height < 8 {
            let hint = "Enlarge the terminal to see the chart.";
            buf.set_string(area.x, area.y, hint, Style::default().fg(Color::Yellow));
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        let bounds_ok = [x0, x1, y0, y1].iter().all(|v| v.is_finite()) && x0 < x1 && y0 < y1;
        if !bounds_ok {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 5)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("pH")
                .y_desc("RGB intensity")
                .x_labels(8)
                .y_labels(6)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Slider position first so the curves draw over it.
            if let Some(ph) = self.marker_ph {
                let marker = RGBColor(128, 128, 128);
                chart.draw_series(LineSeries::new([(ph, y0), (ph, y1)], &marker))?;
            }

            for series in self.curves {
                let drawn = chart.draw_series(LineSeries::new(series.data.iter().copied(), &series.color))?;
                if let Some(label) = &series.label {
                    let color = series.color;
                    drawn
                        .label(label.clone())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 8, y)], color));
                }
            }

            // `Pixel` rather than `Circle`: the ratatui backend maps circle
            // radii to canvas units incorrectly and draws huge rings.
            for series in self.points {
                let color = series.color;
                chart.draw_series(series.data.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
            }

            if self.curves.iter().any(|c| c.label.is_some()) {
                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::UpperRight)
                    .border_style(&WHITE)
                    .label_font(("sans-serif", 10).into_font().color(&WHITE))
                    .draw()?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

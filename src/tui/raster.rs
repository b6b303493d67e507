//! Draw an `RgbImage` into the terminal buffer.
//!
//! Each cell shows two vertically stacked image samples using the upper half
//! block `▀` (foreground = top sample, background = bottom sample), so a cell
//! covers a roughly square pair of "pixels".

use image::RgbImage;
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

pub struct RasterWidget<'a> {
    pub image: &'a RgbImage,
    /// Letterbox the image to keep its aspect ratio instead of stretching it.
    pub keep_aspect: bool,
}

impl<'a> Widget for RasterWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (img_w, img_h) = self.image.dimensions();
        if area.width == 0 || area.height == 0 || img_w == 0 || img_h == 0 {
            return;
        }

        let target = if self.keep_aspect {
            fit_rect(area, img_w, img_h)
        } else {
            area
        };
        if target.width == 0 || target.height == 0 {
            return;
        }

        let rows = u32::from(target.height) * 2;
        for cy in 0..target.height {
            for cx in 0..target.width {
                let ix = sample_index(u32::from(cx), u32::from(target.width), img_w);
                let top = sample_index(u32::from(cy) * 2, rows, img_h);
                let bottom = sample_index(u32::from(cy) * 2 + 1, rows, img_h);

                let fg = to_color(self.image.get_pixel(ix, top));
                let bg = to_color(self.image.get_pixel(ix, bottom));
                if let Some(cell) = buf.cell_mut((target.x + cx, target.y + cy)) {
                    cell.set_symbol("▀").set_fg(fg).set_bg(bg);
                }
            }
        }
    }
}

/// Largest centered sub-rectangle of `area` with the image's aspect ratio,
/// counting each cell as one pixel wide and two pixels tall.
pub fn fit_rect(area: Rect, img_w: u32, img_h: u32) -> Rect {
    let avail_w = f64::from(area.width);
    let avail_h = f64::from(area.height) * 2.0;
    let scale = (avail_w / f64::from(img_w)).min(avail_h / f64::from(img_h));

    let width = ((f64::from(img_w) * scale).floor() as u16).clamp(1, area.width);
    let height = ((f64::from(img_h) * scale / 2.0).floor() as u16).clamp(1, area.height);

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Nearest-neighbor source index for output position `pos` of `out_len`.
fn sample_index(pos: u32, out_len: u32, src_len: u32) -> u32 {
    let centered = (f64::from(pos) + 0.5) * f64::from(src_len) / f64::from(out_len);
    (centered as u32).min(src_len - 1)
}

fn to_color(px: &image::Rgb<u8>) -> Color {
    let [r, g, b] = px.0;
    Color::Rgb(r, g, b)
}

//! Raster images: the single-color swatch and the full-range gradient bar.
//!
//! Both images are pure functions of their inputs; rendering the same pH
//! twice produces byte-identical buffers.

use image::RgbImage;

use crate::color::{column_ph, ph_to_rgb};
use crate::domain::Rgb;

pub const SWATCH_WIDTH: u32 = 100;
pub const SWATCH_HEIGHT: u32 = 300;
pub const SWATCH_BACKGROUND: Rgb = Rgb::new(230, 230, 230);
pub const OUTLINE_COLOR: Rgb = Rgb::new(0, 0, 0);
pub const OUTLINE_WIDTH: u32 = 3;

/// Inclusive pixel bounds of the colored rectangle inside the swatch.
pub const SWATCH_RECT: PixelRect = PixelRect {
    left: 20,
    top: 20,
    right: 80,
    bottom: 280,
};

pub const GRADIENT_WIDTH: u32 = 256;
pub const GRADIENT_HEIGHT: u32 = 50;

/// Inclusive rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl PixelRect {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Whether `(x, y)` lies within `width` pixels of the inside edge.
    pub fn on_border(&self, x: u32, y: u32, width: u32) -> bool {
        if !self.contains(x, y) || width == 0 {
            return false;
        }
        x < self.left + width
            || y < self.top + width
            || x + width > self.right
            || y + width > self.bottom
    }
}

pub fn to_pixel(color: Rgb) -> image::Rgb<u8> {
    image::Rgb(color.to_array())
}

/// 100×300 image: neutral background, a rectangle filled with the pH color,
/// and a 3px black outline drawn inward from the rectangle edge.
pub fn render_swatch(ph: f64) -> RgbImage {
    let fill = to_pixel(ph_to_rgb(ph));
    let outline = to_pixel(OUTLINE_COLOR);
    let mut img = RgbImage::from_pixel(SWATCH_WIDTH, SWATCH_HEIGHT, to_pixel(SWATCH_BACKGROUND));

    for y in SWATCH_RECT.top..=SWATCH_RECT.bottom {
        for x in SWATCH_RECT.left..=SWATCH_RECT.right {
            let color = if SWATCH_RECT.on_border(x, y, OUTLINE_WIDTH) { outline } else { fill };
            img.put_pixel(x, y, color);
        }
    }

    img
}

/// 256×50 image; column `x` is colored with the pH `14·x/256`.
pub fn render_gradient_bar() -> RgbImage {
    RgbImage::from_fn(GRADIENT_WIDTH, GRADIENT_HEIGHT, |x, _| {
        to_pixel(ph_to_rgb(column_ph(x, GRADIENT_WIDTH)))
    })
}

/// The gradient column closest to `ph` (used for the slider marker).
pub fn gradient_column(ph: f64) -> u32 {
    let max_col = GRADIENT_WIDTH - 1;
    if !ph.is_finite() {
        return 0;
    }
    let col = (ph / crate::domain::PH_MAX * f64::from(GRADIENT_WIDTH)).round();
    (col.max(0.0) as u32).min(max_col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swatch_has_fixed_size_and_background() {
        let img = render_swatch(7.0);
        assert_eq!(img.dimensions(), (SWATCH_WIDTH, SWATCH_HEIGHT));
        assert_eq!(*img.get_pixel(0, 0), image::Rgb([230, 230, 230]));
        assert_eq!(*img.get_pixel(99, 299), image::Rgb([230, 230, 230]));
        assert_eq!(*img.get_pixel(19, 150), image::Rgb([230, 230, 230]));
        assert_eq!(*img.get_pixel(81, 150), image::Rgb([230, 230, 230]));
    }

    #[test]
    fn swatch_fill_matches_color_mapper() {
        let img = render_swatch(7.0);
        assert_eq!(*img.get_pixel(50, 150), image::Rgb([80, 175, 255]));
        // First pixel inside the outline.
        assert_eq!(*img.get_pixel(23, 23), image::Rgb([80, 175, 255]));
        assert_eq!(*img.get_pixel(77, 277), image::Rgb([80, 175, 255]));
    }

    #[test]
    fn swatch_outline_is_three_pixels_black() {
        let img = render_swatch(3.0);
        let black = image::Rgb([0, 0, 0]);
        for d in 0..3 {
            assert_eq!(*img.get_pixel(20 + d, 150), black);
            assert_eq!(*img.get_pixel(80 - d, 150), black);
            assert_eq!(*img.get_pixel(50, 20 + d), black);
            assert_eq!(*img.get_pixel(50, 280 - d), black);
        }
        assert_ne!(*img.get_pixel(23, 150), black);
    }

    #[test]
    fn swatch_is_deterministic() {
        assert_eq!(render_swatch(4.2), render_swatch(4.2));
    }

    #[test]
    fn gradient_columns_follow_ph_sweep() {
        let img = render_gradient_bar();
        assert_eq!(img.dimensions(), (GRADIENT_WIDTH, GRADIENT_HEIGHT));
        assert_eq!(*img.get_pixel(0, 0), to_pixel(ph_to_rgb(0.0)));
        assert_eq!(*img.get_pixel(128, 25), to_pixel(ph_to_rgb(7.0)));
        for x in 0..GRADIENT_WIDTH {
            let top = *img.get_pixel(x, 0);
            for y in 1..GRADIENT_HEIGHT {
                assert_eq!(*img.get_pixel(x, y), top);
            }
        }
    }

    #[test]
    fn gradient_is_deterministic() {
        let a = render_gradient_bar();
        let b = render_gradient_bar();
        for x in 0..GRADIENT_WIDTH {
            assert_eq!(a.get_pixel(x, 10), b.get_pixel(x, 10));
        }
    }

    #[test]
    fn gradient_column_maps_ph_to_marker() {
        assert_eq!(gradient_column(0.0), 0);
        assert_eq!(gradient_column(7.0), 128);
        assert_eq!(gradient_column(14.0), 255);
        assert_eq!(gradient_column(-1.0), 0);
        assert_eq!(gradient_column(f64::NAN), 0);
    }

    #[test]
    fn border_test_is_inclusive() {
        let r = PixelRect { left: 0, top: 0, right: 9, bottom: 9 };
        assert!(r.on_border(0, 5, 1));
        assert!(r.on_border(9, 5, 1));
        assert!(!r.on_border(1, 5, 1));
        assert!(!r.on_border(10, 5, 1));
    }
}

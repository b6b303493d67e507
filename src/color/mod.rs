//! pH → RGB color mapping.
//!
//! Each channel is a clamped linear function of pH:
//!
//! - `r = 255 - 25·pH`
//! - `g = 25·pH`
//! - `b = 255 - 32·|7 - pH|`
//!
//! Any real input is accepted. Values outside `[0, 14]` are not rejected; the
//! clamp alone keeps the output in range.

use crate::domain::{PH_MAX, PH_MIN, Rgb};

/// Map a pH value to its simulated color.
pub fn ph_to_rgb(ph: f64) -> Rgb {
    Rgb::new(
        clamp_channel(255.0 - 25.0 * ph),
        clamp_channel(25.0 * ph),
        clamp_channel(255.0 - 32.0 * (7.0 - ph).abs()),
    )
}

/// Clamp to `[0, 255]` and truncate toward zero.
///
/// NaN maps to 0.
pub fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0) as u8
}

/// The pH represented by column `x` of a `width`-wide horizontal sweep.
///
/// Column 0 is pH 0; the last column stops one step short of `PH_MAX`.
pub fn column_ph(x: u32, width: u32) -> f64 {
    if width == 0 {
        return PH_MIN;
    }
    PH_MAX * f64::from(x) / f64::from(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_ph_color() {
        assert_eq!(ph_to_rgb(7.0), Rgb::new(80, 175, 255));
    }

    #[test]
    fn acidic_end_color() {
        assert_eq!(ph_to_rgb(0.0), Rgb::new(255, 0, 31));
    }

    #[test]
    fn basic_end_saturates() {
        // r: 255 - 350 -> 0, g: 350 -> 255, b: 255 - 224 = 31
        assert_eq!(ph_to_rgb(14.0), Rgb::new(0, 255, 31));
    }

    #[test]
    fn fractional_values_truncate() {
        // g = 25 * 6.99 = 174.75
        assert_eq!(ph_to_rgb(6.99).g, 174);
    }

    #[test]
    fn out_of_domain_input_is_clamped_not_rejected() {
        assert_eq!(ph_to_rgb(-2.0), Rgb::new(255, 0, 0));
        assert_eq!(ph_to_rgb(20.0), Rgb::new(0, 255, 0));
        assert_eq!(ph_to_rgb(f64::NAN), Rgb::new(0, 0, 0));
    }

    #[test]
    fn whole_range_is_total() {
        // Every step of the slider maps without panicking; u8 already bounds
        // the channels, so the check here is on the formula's shape.
        let mut prev_r = u8::MAX;
        let mut prev_g = 0u8;
        for i in 0..=140 {
            let ph = i as f64 / 10.0;
            let c = ph_to_rgb(ph);
            assert!(c.r <= prev_r, "red should not increase with pH");
            assert!(c.g >= prev_g, "green should not decrease with pH");
            prev_r = c.r;
            prev_g = c.g;
        }
    }

    #[test]
    fn blue_peaks_at_neutral() {
        let peak = ph_to_rgb(7.0).b;
        for i in 0..=140 {
            let ph = i as f64 / 10.0;
            assert!(ph_to_rgb(ph).b <= peak);
        }
    }

    #[test]
    fn column_ph_spans_scale() {
        assert_eq!(column_ph(0, 256), 0.0);
        assert_eq!(column_ph(128, 256), 7.0);
        assert!(column_ph(255, 256) < 14.0);
        assert_eq!(column_ph(3, 0), 0.0);
    }
}

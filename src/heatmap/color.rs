//! Stage 7: Color Mapping
//!
//! Sequential scales for one-sided views, a diverging scale for net. Gradients
//! are small fixed arrays blended linearly in RGB.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{apply_contrast, ContrastConfig, ViewType};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear blend, `t = 0` is `self`, `t = 1` is `other`
    pub fn lerp(&self, other: &Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let v = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Full set of gradients for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Zero / no-range color
    pub neutral: Rgb,
    /// Net view, neutral to green
    pub net_positive: [Rgb; 5],
    /// Net view, neutral to red
    pub net_negative: [Rgb; 5],
    /// Calls view, low to max
    pub calls: [Rgb; 4],
    /// Puts view, low to max
    pub puts: [Rgb; 4],
}

impl Palette {
    pub fn for_mode(dark_mode: bool) -> &'static Palette {
        if dark_mode {
            &DARK_PALETTE
        } else {
            &LIGHT_PALETTE
        }
    }
}

const LIGHT_NEUTRAL: Rgb = Rgb::new(0xf3, 0xf4, 0xf6);
const DARK_NEUTRAL: Rgb = Rgb::new(0x1f, 0x29, 0x37);

pub const LIGHT_PALETTE: Palette = Palette {
    neutral: LIGHT_NEUTRAL,
    net_positive: [
        LIGHT_NEUTRAL,
        Rgb::new(0xd1, 0xfa, 0xe5),
        Rgb::new(0x6e, 0xe7, 0xb7),
        Rgb::new(0x10, 0xb9, 0x81),
        Rgb::new(0x04, 0x78, 0x57),
    ],
    net_negative: [
        LIGHT_NEUTRAL,
        Rgb::new(0xfe, 0xe2, 0xe2),
        Rgb::new(0xfc, 0xa5, 0xa5),
        Rgb::new(0xef, 0x44, 0x44),
        Rgb::new(0xb9, 0x1c, 0x1c),
    ],
    calls: [
        Rgb::new(0xec, 0xfd, 0xf5),
        Rgb::new(0x6e, 0xe7, 0xb7),
        Rgb::new(0x10, 0xb9, 0x81),
        Rgb::new(0x06, 0x5f, 0x46),
    ],
    puts: [
        Rgb::new(0xfe, 0xf2, 0xf2),
        Rgb::new(0xfc, 0xa5, 0xa5),
        Rgb::new(0xef, 0x44, 0x44),
        Rgb::new(0x99, 0x1b, 0x1b),
    ],
};

pub const DARK_PALETTE: Palette = Palette {
    neutral: DARK_NEUTRAL,
    net_positive: [
        DARK_NEUTRAL,
        Rgb::new(0x06, 0x4e, 0x3b),
        Rgb::new(0x04, 0x78, 0x57),
        Rgb::new(0x10, 0xb9, 0x81),
        Rgb::new(0x6e, 0xe7, 0xb7),
    ],
    net_negative: [
        DARK_NEUTRAL,
        Rgb::new(0x7f, 0x1d, 0x1d),
        Rgb::new(0xb9, 0x1c, 0x1c),
        Rgb::new(0xef, 0x44, 0x44),
        Rgb::new(0xfc, 0xa5, 0xa5),
    ],
    calls: [
        Rgb::new(0x02, 0x2c, 0x22),
        Rgb::new(0x06, 0x5f, 0x46),
        Rgb::new(0x10, 0xb9, 0x81),
        Rgb::new(0x6e, 0xe7, 0xb7),
    ],
    puts: [
        Rgb::new(0x45, 0x0a, 0x0a),
        Rgb::new(0x99, 0x1b, 0x1b),
        Rgb::new(0xef, 0x44, 0x44),
        Rgb::new(0xfc, 0xa5, 0xa5),
    ],
};

/// Blend across a gradient at position `t` in 0..1
///
/// The segment is picked from the scaled position, then blended within it.
pub fn interpolate_gradient(stops: &[Rgb], t: f64) -> Rgb {
    match stops {
        [] => Rgb::new(0, 0, 0),
        [only] => *only,
        _ => {
            let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
            let segments = stops.len() - 1;
            let pos = t * segments as f64;
            let idx = (pos.floor() as usize).min(segments - 1);
            stops[idx].lerp(&stops[idx + 1], pos - idx as f64)
        }
    }
}

/// Maps normalized display values onto palette colors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorMapper {
    contrast: ContrastConfig,
}

impl ColorMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contrast(contrast: ContrastConfig) -> Self {
        Self { contrast }
    }

    pub fn contrast(&self) -> &ContrastConfig {
        &self.contrast
    }

    /// Color for a display value given the grid's display range
    ///
    /// # Arguments
    /// * `value` - Normalized display value of the cell
    /// * `min_value`, `max_value` - Display range of the grid
    /// * `view` - Sequential (calls/puts) or diverging (net) scale
    /// * `dark_mode` - Palette selection
    pub fn color(
        &self,
        value: f64,
        min_value: f64,
        max_value: f64,
        view: ViewType,
        dark_mode: bool,
    ) -> Rgb {
        let palette = Palette::for_mode(dark_mode);
        if value == 0.0 || !value.is_finite() {
            return palette.neutral;
        }

        let exponent = self.contrast.exponent(view);
        match view {
            ViewType::Net => {
                let scale = min_value.abs().max(max_value.abs());
                if scale == 0.0 || !scale.is_finite() {
                    return palette.neutral;
                }
                let magnitude = apply_contrast((value / scale).abs(), exponent).min(1.0);
                if value > 0.0 {
                    interpolate_gradient(&palette.net_positive, magnitude)
                } else {
                    interpolate_gradient(&palette.net_negative, magnitude)
                }
            }
            ViewType::Calls | ViewType::Puts => {
                let span = max_value - min_value;
                if span == 0.0 || !span.is_finite() {
                    return palette.neutral;
                }
                let t = ((value - min_value) / span).clamp(0.0, 1.0);
                let stops: &[Rgb] = if view == ViewType::Calls {
                    &palette.calls
                } else {
                    &palette.puts
                };
                interpolate_gradient(stops, apply_contrast(t, exponent))
            }
        }
    }
}

/// Color with the default contrast exponents
pub fn heatmap_color(
    value: f64,
    min_value: f64,
    max_value: f64,
    view: ViewType,
    dark_mode: bool,
) -> Rgb {
    ColorMapper::new().color(value, min_value, max_value, view, dark_mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear() -> ColorMapper {
        ColorMapper::with_contrast(ContrastConfig {
            one_sided_exponent: 1.0,
            net_exponent: 1.0,
        })
    }

    #[test]
    fn test_zero_is_neutral() {
        for view in [ViewType::Calls, ViewType::Puts, ViewType::Net] {
            assert_eq!(heatmap_color(0.0, -3.0, 4.0, view, false), LIGHT_PALETTE.neutral);
            assert_eq!(heatmap_color(0.0, -3.0, 4.0, view, true), DARK_PALETTE.neutral);
        }
    }

    #[test]
    fn test_degenerate_sequential_range() {
        for (v, m) in [(1.0, 1.0), (3.7, 2.0), (-1.0, 0.5)] {
            assert_eq!(heatmap_color(v, m, m, ViewType::Calls, false).to_hex(), "#f3f4f6");
            assert_eq!(heatmap_color(v, m, m, ViewType::Puts, true).to_hex(), "#1f2937");
        }
    }

    #[test]
    fn test_degenerate_diverging_range() {
        assert_eq!(heatmap_color(2.0, 0.0, 0.0, ViewType::Net, false), LIGHT_PALETTE.neutral);
    }

    #[test]
    fn test_sequential_end_stops() {
        let mapper = ColorMapper::new();
        assert_eq!(mapper.color(4.0, 1.0, 4.0, ViewType::Calls, false).to_hex(), "#065f46");
        assert_eq!(mapper.color(1.0, 1.0, 4.0, ViewType::Calls, false).to_hex(), "#ecfdf5");
        assert_eq!(mapper.color(4.0, 1.0, 4.0, ViewType::Puts, false).to_hex(), "#991b1b");
        assert_eq!(mapper.color(4.0, 1.0, 4.0, ViewType::Calls, true).to_hex(), "#6ee7b7");
        assert_eq!(mapper.color(1.0, 1.0, 4.0, ViewType::Puts, true).to_hex(), "#450a0a");
    }

    #[test]
    fn test_sequential_middle_stop() {
        // linear curve: t = 1/3 lands exactly on the second stop
        let c = linear().color(2.0, 1.0, 4.0, ViewType::Calls, false);
        assert_eq!(c.to_hex(), "#6ee7b7");
    }

    #[test]
    fn test_diverging_stops() {
        let mapper = linear();
        assert_eq!(mapper.color(2.0, -4.0, 2.0, ViewType::Net, false).to_hex(), "#6ee7b7");
        assert_eq!(mapper.color(-4.0, -4.0, 2.0, ViewType::Net, false).to_hex(), "#b91c1c");
        assert_eq!(mapper.color(4.0, -4.0, 4.0, ViewType::Net, true).to_hex(), "#6ee7b7");
        assert_eq!(mapper.color(-1.0, -4.0, 4.0, ViewType::Net, true).to_hex(), "#7f1d1d");
    }

    #[test]
    fn test_diverging_uses_larger_side_for_scale() {
        let mapper = ColorMapper::new();
        let strong = mapper.color(3.0, -3.0, 3.0, ViewType::Net, false);
        let weak = mapper.color(3.0, -6.0, 3.0, ViewType::Net, false);
        assert_eq!(strong, LIGHT_PALETTE.net_positive[4]);
        assert_ne!(weak, strong);
    }

    #[test]
    fn test_interpolate_blends_within_segment() {
        let stops = [Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)];
        assert_eq!(interpolate_gradient(&stops, 0.5), Rgb::new(128, 128, 128));
        assert_eq!(interpolate_gradient(&stops, 1.5), Rgb::new(255, 255, 255));

        let three = [Rgb::new(0, 0, 0), Rgb::new(100, 0, 0), Rgb::new(100, 200, 0)];
        assert_eq!(interpolate_gradient(&three, 0.75), Rgb::new(100, 100, 0));
    }

    #[test]
    fn test_hex_display() {
        let c = Rgb::new(4, 120, 87);
        assert_eq!(c.to_hex(), "#047857");
        assert_eq!(c.to_string(), "#047857");
    }
}

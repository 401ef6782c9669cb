use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

fn linear(r: f32, g: f32, b: f32) -> LinSrgb {
    Srgb::new(r, g, b).into_linear()
}

/// Blend two sRGB stops in linear light.
fn blend(a: LinSrgb, b: LinSrgb, t: f32) -> Color32 {
    let mixed = a.mix(b, t.clamp(0.0, 1.0));
    to_color32(Srgb::from_linear(mixed))
}

// ---------------------------------------------------------------------------
// Continuous scales
// ---------------------------------------------------------------------------

/// Colour for a correlation coefficient: blue at -1, near-white at 0,
/// orange at +1. NaN maps to grey.
pub fn diverging(t: f64) -> Color32 {
    if t.is_nan() {
        return Color32::GRAY;
    }
    let t = t.clamp(-1.0, 1.0) as f32;
    let middle = linear(0.97, 0.97, 0.97);
    if t < 0.0 {
        blend(middle, linear(0.13, 0.40, 0.67), -t)
    } else {
        blend(middle, linear(0.84, 0.38, 0.08), t)
    }
}

/// Dark blue at 0 through teal to yellow at 1.
pub fn sequential(t: f64) -> Color32 {
    if t.is_nan() {
        return Color32::GRAY;
    }
    let t = t.clamp(0.0, 1.0) as f32;
    let low = linear(0.27, 0.00, 0.33);
    let mid = linear(0.13, 0.57, 0.55);
    let high = linear(0.99, 0.91, 0.14);
    if t < 0.5 {
        blend(low, mid, t * 2.0)
    } else {
        blend(mid, high, (t - 0.5) * 2.0)
    }
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels of a categorical column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given column from its labels.
    pub fn new<'a>(column: &str, labels: impl IntoIterator<Item = &'a String>) -> Self {
        let labels: Vec<&String> = labels.into_iter().collect();
        let palette = generate_palette(labels.len());
        let mapping = labels
            .into_iter()
            .zip(palette)
            .map(|(label, c)| (label.clone(), c))
            .collect();

        ColorMap {
            column: column.to_string(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Colour for a label; labels outside the column (such as the missing
    /// label) get the default grey.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(label, c)| (label.clone(), *c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let palette = generate_palette(5);
        let unique: BTreeSet<[u8; 4]> = palette.iter().map(|c| c.to_array()).collect();
        assert_eq!(unique.len(), 5);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_labels_fall_back_to_grey() {
        let labels: BTreeSet<String> = ["female".to_string(), "male".to_string()].into();
        let map = ColorMap::new("gender", &labels);
        assert_ne!(map.color_for("female"), map.color_for("male"));
        assert_eq!(map.color_for("(missing)"), Color32::GRAY);
        assert_eq!(map.legend_entries().len(), 2);
    }

    #[test]
    fn diverging_scale_ends() {
        let low = diverging(-1.0);
        let high = diverging(1.0);
        assert!(low.b() > low.r());
        assert!(high.r() > high.b());
        let mid = diverging(0.0);
        assert!(mid.r() > 240 && mid.g() > 240 && mid.b() > 240);
        assert_eq!(diverging(f64::NAN), Color32::GRAY);
        assert_eq!(diverging(5.0), high);
    }

    #[test]
    fn sequential_scale_is_clamped() {
        assert_eq!(sequential(-3.0), sequential(0.0));
        assert_eq!(sequential(7.0), sequential(1.0));
        assert_ne!(sequential(0.0), sequential(1.0));
    }
}

use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Blues for the favourite-brand pie, darkest last.
pub const PIE_BLUES: [Color32; 5] = [
    Color32::from_rgb(0x66, 0xB2, 0xFF),
    Color32::from_rgb(0x33, 0x99, 0xFF),
    Color32::from_rgb(0x00, 0x66, 0xCC),
    Color32::from_rgb(0x00, 0x33, 0x99),
    Color32::from_rgb(0x00, 0x1F, 0x4D),
];

pub const LINE_COLOR: Color32 = Color32::from_rgb(0x5C, 0xB0, 0xFF);
pub const WARNING_COLOR: Color32 = Color32::from_rgb(0xF7, 0xC8, 0x43);

// ---------------------------------------------------------------------------
// Color mapping: category name → Color32
// ---------------------------------------------------------------------------

/// Maps the names of one chart's categories to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Evenly spaced hues, assigned in the order `names` are given.
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let names: Vec<&str> = names.into_iter().collect();
        let palette = generate_palette(names.len());
        Self::with_colors(names, palette)
    }

    /// Fixed colours, cycled if there are more names than colours.
    pub fn with_palette<'a>(names: impl IntoIterator<Item = &'a str>, colors: &[Color32]) -> Self {
        let names: Vec<&str> = names.into_iter().collect();
        let cycled = colors.iter().copied().cycle().take(names.len()).collect();
        Self::with_colors(names, cycled)
    }

    fn with_colors(names: Vec<&str>, colors: Vec<Color32>) -> Self {
        let mapping = names
            .into_iter()
            .zip(colors)
            .map(|(n, c)| (n.to_string(), c))
            .collect();
        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a category name.
    pub fn color_for(&self, name: &str) -> Color32 {
        self.mapping
            .get(name)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(7).len(), 7);
    }

    #[test]
    fn generated_colours_are_distinct() {
        let cm = ColorMap::new(["Asus", "Acer", "Samsung"]);
        assert_ne!(cm.color_for("Asus"), cm.color_for("Acer"));
        assert_ne!(cm.color_for("Acer"), cm.color_for("Samsung"));
        assert_eq!(cm.color_for("Lenovo"), Color32::GRAY);
    }

    #[test]
    fn fixed_palette_is_used_in_order() {
        let cm = ColorMap::with_palette(["A", "B"], &PIE_BLUES);
        assert_eq!(cm.color_for("A"), PIE_BLUES[0]);
        assert_eq!(cm.color_for("B"), PIE_BLUES[1]);
    }
}

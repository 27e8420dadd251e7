//! The fixed color palette shared by the player and obstacles

/// A selectable color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColor {
    pub name: &'static str,
    /// CSS hex value (`#RRGGBB`)
    pub value: &'static str,
    /// Glyph shown in the HUD color indicator
    pub emoji: &'static str,
}

impl PaletteColor {
    /// Linear RGBA in 0..1 for GPU vertex colors
    pub fn rgba(&self) -> [f32; 4] {
        let hex = self.value.trim_start_matches('#');
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .map_or(0.0, |c| c as f32 / 255.0)
        };
        [channel(0), channel(2), channel(4), 1.0]
    }
}

/// Palette order is significant: cycling walks it front to back.
pub const PALETTE: [PaletteColor; 4] = [
    PaletteColor {
        name: "red",
        value: "#FF4757",
        emoji: "🔴",
    },
    PaletteColor {
        name: "blue",
        value: "#2E86DE",
        emoji: "🔵",
    },
    PaletteColor {
        name: "yellow",
        value: "#F1C40F",
        emoji: "🟡",
    },
    PaletteColor {
        name: "green",
        value: "#27AE60",
        emoji: "🟢",
    },
];

/// Number of palette colors
pub const PALETTE_SIZE: usize = PALETTE.len();

/// Look up a color by index, wrapping out-of-range indices
#[inline]
pub fn color(index: usize) -> &'static PaletteColor {
    &PALETTE[index % PALETTE_SIZE]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_parses_hex() {
        let [r, g, b, a] = PALETTE[0].rgba();
        assert!((r - 1.0).abs() < 1e-6);
        assert!((g - 0x47 as f32 / 255.0).abs() < 1e-6);
        assert!((b - 0x57 as f32 / 255.0).abs() < 1e-6);
        assert_eq!(a, 1.0);
    }

    #[test]
    fn test_color_wraps() {
        assert_eq!(color(PALETTE_SIZE).name, "red");
        assert_eq!(color(3).name, "green");
    }
}

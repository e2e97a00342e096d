//! Categorical color scales keyed by name.

use crate::core::Color;
use std::collections::HashMap;

/// `name -> color`, stable for a given name once assigned.
pub trait ColorScale: Send + Sync {
    fn color(&mut self, key: &str) -> Color;
}

const CATEGORY20: [Color; 20] = [
    Color::from_rgb8(0x1f, 0x77, 0xb4),
    Color::from_rgb8(0xae, 0xc7, 0xe8),
    Color::from_rgb8(0xff, 0x7f, 0x0e),
    Color::from_rgb8(0xff, 0xbb, 0x78),
    Color::from_rgb8(0x2c, 0xa0, 0x2c),
    Color::from_rgb8(0x98, 0xdf, 0x8a),
    Color::from_rgb8(0xd6, 0x27, 0x28),
    Color::from_rgb8(0xff, 0x98, 0x96),
    Color::from_rgb8(0x94, 0x67, 0xbd),
    Color::from_rgb8(0xc5, 0xb0, 0xd5),
    Color::from_rgb8(0x8c, 0x56, 0x4b),
    Color::from_rgb8(0xc4, 0x9c, 0x94),
    Color::from_rgb8(0xe3, 0x77, 0xc2),
    Color::from_rgb8(0xf7, 0xb6, 0xd2),
    Color::from_rgb8(0x7f, 0x7f, 0x7f),
    Color::from_rgb8(0xc7, 0xc7, 0xc7),
    Color::from_rgb8(0xbc, 0xbd, 0x22),
    Color::from_rgb8(0xdb, 0xdb, 0x8d),
    Color::from_rgb8(0x17, 0xbe, 0xcf),
    Color::from_rgb8(0x9e, 0xda, 0xe5),
];

/// Ordinal scale: the n-th distinct key gets the n-th palette entry, cycling.
#[derive(Clone, Debug)]
pub struct CategoricalScale {
    palette: Vec<Color>,
    assigned: HashMap<String, Color>,
}

impl Default for CategoricalScale {
    fn default() -> Self {
        Self::with_palette(CATEGORY20.to_vec())
    }
}

impl CategoricalScale {
    /// An empty palette falls back to the 20-color default.
    pub fn with_palette(palette: Vec<Color>) -> Self {
        let palette = if palette.is_empty() {
            CATEGORY20.to_vec()
        } else {
            palette
        };
        Self {
            palette,
            assigned: HashMap::new(),
        }
    }
}

impl ColorScale for CategoricalScale {
    fn color(&mut self, key: &str) -> Color {
        if let Some(c) = self.assigned.get(key) {
            return *c;
        }
        let c = self.palette[self.assigned.len() % self.palette.len()];
        self.assigned.insert(key.to_owned(), c);
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_keep_their_color() {
        let mut scale = CategoricalScale::default();
        let a = scale.color("a");
        let b = scale.color("b");
        assert_ne!(a, b);
        assert_eq!(scale.color("a"), a);
        assert_eq!(a.to_hex(), "#1f77b4");
    }

    #[test]
    fn custom_palette_cycles() {
        let red = Color::rgb(1.0, 0.0, 0.0);
        let blue = Color::rgb(0.0, 0.0, 1.0);
        let mut scale = CategoricalScale::with_palette(vec![red, blue]);
        assert_eq!(scale.color("x"), red);
        assert_eq!(scale.color("y"), blue);
        assert_eq!(scale.color("z"), red);
    }
}

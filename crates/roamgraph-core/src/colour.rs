//! Entity colour palette

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A 24-bit RGB colour (`0xRRGGBB`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Colour(pub u32);

impl std::fmt::Display for Colour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

/// Colours handed out to entities: seven main colours then five accents
pub const PALETTE: [Colour; 12] = [
    Colour(0x2196F3), // blue
    Colour(0x009688), // teal
    Colour(0x4CAF50), // green
    Colour(0xFF9800), // orange
    Colour(0xF44336), // red
    Colour(0x9C27B0), // purple
    Colour(0x3F51B5), // indigo
    Colour(0xE91E63), // pink
    Colour(0x00BCD4), // cyan
    Colour(0x673AB7), // deep purple
    Colour(0x03A9F4), // light blue
    Colour(0xFF5722), // deep orange
];

/// A random palette colour not in `exclude`, or the first colour if all are excluded
pub fn random_colour<R: Rng + ?Sized>(exclude: &[Colour], rng: &mut R) -> Colour {
    let available: Vec<Colour> = PALETTE
        .iter()
        .copied()
        .filter(|colour| !exclude.contains(colour))
        .collect();

    if available.is_empty() {
        return PALETTE[0];
    }
    available[rng.gen_range(0..available.len())]
}

/// `count` colours, all distinct until the palette runs out
///
/// Colours are drawn at random without replacement; past the palette size
/// they repeat in palette order.
pub fn distinct_colours<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Colour> {
    let mut remaining = PALETTE.to_vec();
    let mut result = Vec::with_capacity(count);

    while result.len() < count && !remaining.is_empty() {
        let index = rng.gen_range(0..remaining.len());
        result.push(remaining.swap_remove(index));
    }

    while result.len() < count {
        result.push(PALETTE[result.len() % PALETTE.len()]);
    }

    result
}

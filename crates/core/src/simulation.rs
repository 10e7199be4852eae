//! Color-vision-deficiency simulation.
//!
//! Dichromacies are simulated by projecting LMS cone responses onto the plane
//! the remaining two cone types can see (Viénot, Brettel & Mollon 1999). The
//! projection runs on linearized sRGB; results are clamped to [0, 1] in linear
//! space before re-encoding.

use crate::color::Color;
use crate::error::ValidationError;
use crate::metrics;
use crate::space;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const RGB_TO_LMS: [[f64; 3]; 3] = [
    [17.8824, 43.5161, 4.11935],
    [3.45565, 27.1554, 3.86714],
    [0.0299566, 0.184309, 1.46709],
];

const LMS_TO_RGB: [[f64; 3]; 3] = [
    [0.0809444479, -0.130504409, 0.116721066],
    [-0.0102485335, 0.0540193266, -0.113614708],
    [-0.000365296938, -0.00412161469, 0.693511405],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBlindness {
    /// Missing L cones (red-blind).
    Protanopia,
    /// Missing M cones (green-blind).
    Deuteranopia,
    /// Missing S cones (blue-blind).
    Tritanopia,
    /// No cone color vision; luminance only.
    Achromatopsia,
}

impl ColorBlindness {
    pub const ALL: [ColorBlindness; 4] = [
        ColorBlindness::Protanopia,
        ColorBlindness::Deuteranopia,
        ColorBlindness::Tritanopia,
        ColorBlindness::Achromatopsia,
    ];

    /// The three dichromacies checked by default.
    pub const DICHROMATS: [ColorBlindness; 3] = [
        ColorBlindness::Protanopia,
        ColorBlindness::Deuteranopia,
        ColorBlindness::Tritanopia,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorBlindness::Protanopia => "protanopia",
            ColorBlindness::Deuteranopia => "deuteranopia",
            ColorBlindness::Tritanopia => "tritanopia",
            ColorBlindness::Achromatopsia => "achromatopsia",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorBlindness::Protanopia => "Protanopia (Red-Blind)",
            ColorBlindness::Deuteranopia => "Deuteranopia (Green-Blind)",
            ColorBlindness::Tritanopia => "Tritanopia (Blue-Blind)",
            ColorBlindness::Achromatopsia => "Achromatopsia (Monochromacy)",
        }
    }
}

impl fmt::Display for ColorBlindness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorBlindness {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ColorBlindness::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| ValidationError::InvalidOption {
                option: "simulation".to_string(),
                value: s.to_string(),
                expected: "protanopia, deuteranopia, tritanopia or achromatopsia".to_string(),
            })
    }
}

fn mul(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    m.map(|row| row[0] * v[0] + row[1] * v[1] + row[2] * v[2])
}

/// How `color` appears to a viewer with `kind`.
pub fn simulate(color: Color, kind: ColorBlindness) -> Color {
    if kind == ColorBlindness::Achromatopsia {
        let y = metrics::relative_luminance(color);
        return space::from_linear_rgb([y, y, y]);
    }
    let [l, m, s] = mul(&RGB_TO_LMS, space::to_linear_rgb(color));
    let projected = match kind {
        ColorBlindness::Protanopia => [2.02344 * m - 2.52581 * s, m, s],
        ColorBlindness::Deuteranopia => [l, 0.494207 * l + 1.24827 * s, s],
        ColorBlindness::Tritanopia => [l, m, -0.395913 * l + 0.801109 * m],
        ColorBlindness::Achromatopsia => [l, m, s],
    };
    space::from_linear_rgb(mul(&LMS_TO_RGB, projected))
}

/// Simulates every color of `colors` under `kind`, preserving order.
pub fn simulate_all(colors: &[Color], kind: ColorBlindness) -> Vec<Color> {
    colors.iter().map(|&c| simulate(c, kind)).collect()
}

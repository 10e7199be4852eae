//! The canonical color value.
//!
//! A [`Color`] stores an 8-bit sRGB triple and nothing else. Every other
//! representation (HSL, HSV, LAB, XYZ, CMYK) is derived on demand by the
//! functions in [`crate::space`], so repeated conversions never accumulate
//! rounding drift: the triple is always the source of truth.
//!
//! Serializes as an uppercase hex string `"#RRGGBB"`, which is a lossless
//! encoding of the triple.

use crate::error::ParseError;
use crate::space::{self, Cmyk, ColorSpace, ColorSpaceValue, Hsl, Hsv, Lab, Xyz};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An immutable 8-bit sRGB color.
///
/// Equality and hashing are defined on the RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn r(self) -> u8 {
        self.r
    }

    pub const fn g(self) -> u8 {
        self.g
    }

    pub const fn b(self) -> u8 {
        self.b
    }

    /// The canonical `[r, g, b]` triple.
    pub const fn rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Parses any supported literal: hex, `rgb()` or `hsl()`.
    pub fn parse(text: &str) -> Result<Color, ParseError> {
        crate::parse::parse(text)
    }

    /// Parses a 3- or 6-digit hex color like `"#ff00aa"`, `"F0A"` (case insensitive).
    ///
    /// Returns `ParseError::InvalidFormat` for any other length or a non-hex digit.
    pub fn from_hex(hex: &str) -> Result<Color, ParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseError::invalid_format(hex));
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| ParseError::invalid_format(hex));
        match digits.len() {
            3 => {
                let r = channel(&digits[0..1])?;
                let g = channel(&digits[1..2])?;
                let b = channel(&digits[2..3])?;
                Ok(Color::new(r * 17, g * 17, b * 17))
            }
            6 => Ok(Color::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(ParseError::invalid_format(hex)),
        }
    }

    /// Converts the color to an uppercase hex string like `"#FF00AA"`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Builds a color from unit-range channels, clamping to [0, 1] and
    /// rounding to the nearest 8-bit value.
    pub fn from_unit_rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(unit_to_u8(r), unit_to_u8(g), unit_to_u8(b))
    }

    /// The channels scaled to [0, 1].
    pub fn to_unit_rgb(self) -> [f64; 3] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        ]
    }

    pub fn to_hsl(self) -> Hsl {
        space::rgb_to_hsl(self)
    }

    pub fn to_hsv(self) -> Hsv {
        space::rgb_to_hsv(self)
    }

    pub fn to_xyz(self) -> Xyz {
        space::rgb_to_xyz(self)
    }

    pub fn to_lab(self) -> Lab {
        space::rgb_to_lab(self)
    }

    pub fn to_cmyk(self) -> Cmyk {
        space::rgb_to_cmyk(self)
    }

    /// Derives the representation of this color in `target`.
    pub fn to_space(self, target: ColorSpace) -> ColorSpaceValue {
        ColorSpaceValue::from_color(self, target)
    }
}

fn unit_to_u8(c: f64) -> u8 {
    if c.is_nan() {
        return 0;
    }
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Hex parsing tests --

    #[test]
    fn from_hex_parses_red_with_hash() {
        assert_eq!(Color::from_hex("#ff0000").unwrap(), Color::new(255, 0, 0));
    }

    #[test]
    fn from_hex_parses_green_without_hash() {
        assert_eq!(Color::from_hex("00ff00").unwrap(), Color::new(0, 255, 0));
    }

    #[test]
    fn from_hex_is_case_insensitive() {
        assert_eq!(
            Color::from_hex("#FF00AA").unwrap(),
            Color::from_hex("#ff00aa").unwrap()
        );
    }

    #[test]
    fn from_hex_expands_short_form() {
        assert_eq!(Color::from_hex("#f0a").unwrap(), Color::new(255, 0, 170));
        assert_eq!(Color::from_hex("333").unwrap(), Color::new(0x33, 0x33, 0x33));
    }

    #[test]
    fn from_hex_returns_error_for_invalid_hex() {
        for bad in ["#gggggg", "#ffff", "", "#", "#ff00ff00", "+ff", "#ff 000", "#ffé00"] {
            assert!(
                matches!(Color::from_hex(bad), Err(ParseError::InvalidFormat { .. })),
                "expected InvalidFormat for {bad:?}"
            );
        }
    }

    #[test]
    fn from_hex_parses_arbitrary_color() {
        assert_eq!(Color::from_hex("#804020").unwrap(), Color::new(0x80, 0x40, 0x20));
    }

    // -- to_hex tests --

    #[test]
    fn to_hex_is_uppercase_with_hash() {
        assert_eq!(Color::new(255, 0, 170).to_hex(), "#FF00AA");
        assert_eq!(Color::BLACK.to_hex(), "#000000");
        assert_eq!(Color::WHITE.to_hex(), "#FFFFFF");
    }

    #[test]
    fn display_matches_to_hex() {
        let c = Color::new(0x12, 0xab, 0xef);
        assert_eq!(c.to_string(), c.to_hex());
    }

    #[test]
    fn from_unit_rgb_rounds_and_clamps() {
        assert_eq!(Color::from_unit_rgb(1.5, -0.1, 0.5), Color::new(255, 0, 128));
        assert_eq!(Color::from_unit_rgb(f64::NAN, 0.0, 1.0), Color::new(0, 0, 255));
    }

    #[test]
    fn to_unit_rgb_scales_channels() {
        let [r, g, b] = Color::new(255, 0, 51).to_unit_rgb();
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert!((b - 0.2).abs() < 1e-12);
    }

    #[test]
    fn from_str_accepts_functional_forms() {
        let c: Color = "rgb(10, 20, 30)".parse().unwrap();
        assert_eq!(c, Color::new(10, 20, 30));
    }

    // -- Serde tests --

    #[test]
    fn color_serializes_as_hex_string() {
        let json = serde_json::to_string(&Color::new(255, 0, 0)).unwrap();
        assert_eq!(json, "\"#FF0000\"");
    }

    #[test]
    fn color_deserializes_from_any_literal() {
        let green: Color = serde_json::from_str("\"#00ff00\"").unwrap();
        assert_eq!(green, Color::new(0, 255, 0));
        let cyan: Color = serde_json::from_str("\"hsl(180, 100%, 50%)\"").unwrap();
        assert_eq!(cyan, Color::new(0, 255, 255));
    }

    #[test]
    fn color_deserialize_rejects_invalid_literal() {
        let result: Result<Color, _> = serde_json::from_str("\"not-a-color\"");
        assert!(result.is_err());
    }

    // -- Property-based tests --

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn hex_round_trip_is_lossless(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
                let c = Color::new(r, g, b);
                prop_assert_eq!(Color::from_hex(&c.to_hex()).unwrap(), c);
            }

            #[test]
            fn json_round_trip_is_lossless(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
                let c = Color::new(r, g, b);
                let json = serde_json::to_string(&c).unwrap();
                let back: Color = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(back, c);
            }

            #[test]
            fn unit_round_trip_is_lossless(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
                let c = Color::new(r, g, b);
                let [ur, ug, ub] = c.to_unit_rgb();
                prop_assert_eq!(Color::from_unit_rgb(ur, ug, ub), c);
            }
        }
    }
}

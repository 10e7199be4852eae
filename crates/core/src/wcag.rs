//! WCAG 2.x contrast evaluation.
//!
//! The ratio comes from [`metrics::contrast_ratio`]; this module only decides
//! which conformance levels that ratio meets.

use crate::color::Color;
use crate::error::ValidationError;
use crate::metrics;
use crate::params::param_f64;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Conformance level a caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WcagLevel {
    #[default]
    AA,
    AAA,
}

impl FromStr for WcagLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AA" => Ok(WcagLevel::AA),
            "AAA" => Ok(WcagLevel::AAA),
            _ => Err(ValidationError::InvalidOption {
                option: "level".to_string(),
                value: s.to_string(),
                expected: "AA or AAA".to_string(),
            }),
        }
    }
}

impl fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WcagLevel::AA => "AA",
            WcagLevel::AAA => "AAA",
        })
    }
}

/// Text size class; large is 18pt regular or 14pt bold and up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    #[default]
    Normal,
    Large,
}

impl TextSize {
    pub fn from_large(is_large_text: bool) -> Self {
        if is_large_text {
            TextSize::Large
        } else {
            TextSize::Normal
        }
    }
}

impl FromStr for TextSize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(TextSize::Normal),
            "large" => Ok(TextSize::Large),
            _ => Err(ValidationError::InvalidOption {
                option: "text_size".to_string(),
                value: s.to_string(),
                expected: "normal or large".to_string(),
            }),
        }
    }
}

/// The highest standard a ratio meets for one text size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceLevel {
    AAA,
    AA,
    Fail,
}

impl fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComplianceLevel::AAA => "AAA",
            ComplianceLevel::AA => "AA",
            ComplianceLevel::Fail => "Fail",
        })
    }
}

/// Minimum contrast ratios per level and text size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WcagThresholds {
    pub aa_normal: f64,
    pub aaa_normal: f64,
    pub aa_large: f64,
    pub aaa_large: f64,
}

impl Default for WcagThresholds {
    fn default() -> Self {
        Self {
            aa_normal: 4.5,
            aaa_normal: 7.0,
            aa_large: 3.0,
            aaa_large: 4.5,
        }
    }
}

impl WcagThresholds {
    /// Reads `aa_normal`, `aaa_normal`, `aa_large` and `aaa_large` from an
    /// option map, keeping the WCAG value for every missing key.
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        Self {
            aa_normal: param_f64(params, "aa_normal", d.aa_normal),
            aaa_normal: param_f64(params, "aaa_normal", d.aaa_normal),
            aa_large: param_f64(params, "aa_large", d.aa_large),
            aaa_large: param_f64(params, "aaa_large", d.aaa_large),
        }
    }

    /// The ratio that must be met for `level` at `size`.
    pub fn required(&self, level: WcagLevel, size: TextSize) -> f64 {
        match (level, size) {
            (WcagLevel::AA, TextSize::Normal) => self.aa_normal,
            (WcagLevel::AAA, TextSize::Normal) => self.aaa_normal,
            (WcagLevel::AA, TextSize::Large) => self.aa_large,
            (WcagLevel::AAA, TextSize::Large) => self.aaa_large,
        }
    }
}

/// Outcome of one foreground/background evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContrastResult {
    ratio: f64,
    passes_aa_normal: bool,
    passes_aa_large: bool,
    passes_aaa_normal: bool,
    passes_aaa_large: bool,
    level: ComplianceLevel,
}

impl ContrastResult {
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn passes_aa_normal(&self) -> bool {
        self.passes_aa_normal
    }

    pub fn passes_aa_large(&self) -> bool {
        self.passes_aa_large
    }

    pub fn passes_aaa_normal(&self) -> bool {
        self.passes_aaa_normal
    }

    pub fn passes_aaa_large(&self) -> bool {
        self.passes_aaa_large
    }

    /// Highest level met for the text size that was evaluated.
    pub fn level(&self) -> ComplianceLevel {
        self.level
    }

    pub fn passes(&self, level: WcagLevel, size: TextSize) -> bool {
        match (level, size) {
            (WcagLevel::AA, TextSize::Normal) => self.passes_aa_normal,
            (WcagLevel::AAA, TextSize::Normal) => self.passes_aaa_normal,
            (WcagLevel::AA, TextSize::Large) => self.passes_aa_large,
            (WcagLevel::AAA, TextSize::Large) => self.passes_aaa_large,
        }
    }
}

/// Evaluates `fg` on `bg` against the standard WCAG thresholds.
pub fn evaluate(fg: Color, bg: Color, is_large_text: bool) -> ContrastResult {
    evaluate_with(
        fg,
        bg,
        TextSize::from_large(is_large_text),
        &WcagThresholds::default(),
    )
}

/// Evaluates `fg` on `bg` with explicit thresholds; `level` reflects `size`.
pub fn evaluate_with(
    fg: Color,
    bg: Color,
    size: TextSize,
    thresholds: &WcagThresholds,
) -> ContrastResult {
    let ratio = metrics::contrast_ratio(fg, bg);
    ContrastResult {
        ratio,
        passes_aa_normal: ratio >= thresholds.aa_normal,
        passes_aa_large: ratio >= thresholds.aa_large,
        passes_aaa_normal: ratio >= thresholds.aaa_normal,
        passes_aaa_large: ratio >= thresholds.aaa_large,
        level: compliance_level(ratio, size, thresholds),
    }
}

pub fn compliance_level(ratio: f64, size: TextSize, thresholds: &WcagThresholds) -> ComplianceLevel {
    if ratio >= thresholds.required(WcagLevel::AAA, size) {
        ComplianceLevel::AAA
    } else if ratio >= thresholds.required(WcagLevel::AA, size) {
        ComplianceLevel::AA
    } else {
        ComplianceLevel::Fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GRAY_777: Color = Color::new(0x77, 0x77, 0x77);

    #[test]
    fn black_on_white_is_aaa() {
        let result = evaluate(Color::BLACK, Color::WHITE, false);
        assert!((result.ratio() - 21.0).abs() < 0.01);
        assert_eq!(result.level(), ComplianceLevel::AAA);
        assert!(result.passes_aa_normal());
        assert!(result.passes_aaa_normal());
    }

    #[test]
    fn gray_777_fails_normal_text() {
        let result = evaluate(GRAY_777, Color::WHITE, false);
        assert!(result.ratio() < 4.5);
        assert_eq!(result.level(), ComplianceLevel::Fail);
        assert!(!result.passes_aa_normal());
        assert!(result.passes_aa_large());
    }

    #[test]
    fn gray_777_is_aa_for_large_text() {
        let result = evaluate(GRAY_777, Color::WHITE, true);
        assert_eq!(result.level(), ComplianceLevel::AA);
        assert!(!result.passes_aaa_large());
    }

    #[test]
    fn same_color_fails_everything() {
        let c = Color::new(200, 10, 10);
        let result = evaluate(c, c, true);
        assert_eq!(result.ratio(), 1.0);
        assert_eq!(result.level(), ComplianceLevel::Fail);
        assert!(!result.passes_aa_large());
    }

    #[test]
    fn evaluation_is_order_independent() {
        let a = Color::new(0x1e, 0x29, 0x3b);
        assert_eq!(evaluate(a, Color::WHITE, false), evaluate(Color::WHITE, a, false));
    }

    #[test]
    fn required_maps_level_and_size() {
        let t = WcagThresholds::default();
        assert_eq!(t.required(WcagLevel::AA, TextSize::Normal), 4.5);
        assert_eq!(t.required(WcagLevel::AAA, TextSize::Normal), 7.0);
        assert_eq!(t.required(WcagLevel::AA, TextSize::Large), 3.0);
        assert_eq!(t.required(WcagLevel::AAA, TextSize::Large), 4.5);
    }

    #[test]
    fn compliance_level_boundaries_are_inclusive() {
        let t = WcagThresholds::default();
        assert_eq!(compliance_level(7.0, TextSize::Normal, &t), ComplianceLevel::AAA);
        assert_eq!(compliance_level(4.5, TextSize::Normal, &t), ComplianceLevel::AA);
        assert_eq!(compliance_level(4.49, TextSize::Normal, &t), ComplianceLevel::Fail);
        assert_eq!(compliance_level(3.0, TextSize::Large, &t), ComplianceLevel::AA);
    }

    #[test]
    fn thresholds_from_json_override_selected_keys() {
        let t = WcagThresholds::from_json(&json!({"aa_normal": 5.0, "aaa_large": "x"}));
        assert_eq!(t.aa_normal, 5.0);
        assert_eq!(t.aaa_large, 4.5);
        assert_eq!(t.aaa_normal, 7.0);
    }

    #[test]
    fn evaluate_with_custom_thresholds() {
        let strict = WcagThresholds {
            aa_normal: 5.0,
            ..WcagThresholds::default()
        };
        let result = evaluate_with(Color::new(0x76, 0x76, 0x76), Color::WHITE, TextSize::Normal, &strict);
        assert!(!result.passes_aa_normal());
    }

    #[test]
    fn level_and_text_size_parse() {
        assert_eq!("aaa".parse::<WcagLevel>().unwrap(), WcagLevel::AAA);
        assert_eq!("Large".parse::<TextSize>().unwrap(), TextSize::Large);
        assert!(matches!(
            "AAAA".parse::<WcagLevel>(),
            Err(ValidationError::InvalidOption { .. })
        ));
        assert!(matches!(
            "huge".parse::<TextSize>(),
            Err(ValidationError::InvalidOption { .. })
        ));
    }

    #[test]
    fn contrast_result_serializes_all_fields() {
        let json = serde_json::to_value(evaluate(Color::BLACK, Color::WHITE, false)).unwrap();
        assert_eq!(json["level"], "AAA");
        assert_eq!(json["passes_aa_normal"], true);
        assert!(json["ratio"].as_f64().unwrap() > 20.9);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_color() -> impl Strategy<Value = Color> {
            (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Color::new(r, g, b))
        }

        proptest! {
            #[test]
            fn level_agrees_with_pass_flags(fg in any_color(), bg in any_color(), large in any::<bool>()) {
                let r = evaluate(fg, bg, large);
                let size = TextSize::from_large(large);
                let expected = if r.passes(WcagLevel::AAA, size) {
                    ComplianceLevel::AAA
                } else if r.passes(WcagLevel::AA, size) {
                    ComplianceLevel::AA
                } else {
                    ComplianceLevel::Fail
                };
                prop_assert_eq!(r.level(), expected);
            }

            #[test]
            fn aaa_implies_aa(fg in any_color(), bg in any_color()) {
                let r = evaluate(fg, bg, false);
                prop_assert!(!r.passes_aaa_normal() || r.passes_aa_normal());
                prop_assert!(!r.passes_aa_normal() || r.passes_aa_large());
            }
        }
    }
}

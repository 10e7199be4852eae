//! Harmony-based color generation.
//!
//! Each [`HarmonyType`] maps to a [`HarmonyRule`]; generation dispatches on the
//! rule, so adding a fixed-angle harmony is one table entry.

use crate::color::Color;
use crate::error::ValidationError;
use crate::params::{param_bool, param_positive};
use crate::space::{self, Hsl};
use crate::variation;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

pub const MIN_HARMONY_COUNT: usize = 2;
pub const MAX_HARMONY_COUNT: usize = 10;

/// Default lightness step, as a fraction of the LAB range, for expansion colors.
pub const DEFAULT_EXPANSION_INTENSITY: f64 = 0.1;

const COMPLEMENTARY: &[f64] = &[0.0, 180.0];
const SPLIT_COMPLEMENTARY: &[f64] = &[0.0, 150.0, 210.0];
const TRIADIC: &[f64] = &[0.0, 120.0, 240.0];
const TETRADIC: &[f64] = &[0.0, 60.0, 180.0, 240.0];
const SQUARE: &[f64] = &[0.0, 90.0, 180.0, 270.0];
const COMPOUND: &[f64] = &[0.0, 180.0, 30.0, 210.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmonyType {
    Monochromatic,
    Analogous,
    Complementary,
    SplitComplementary,
    Triadic,
    Tetradic,
    Square,
    Compound,
}

/// How a harmony type places its colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HarmonyRule {
    /// Fixed hue and saturation, lightness spread evenly over [0, 100].
    LightnessRamp,
    /// Hues spread evenly across `base ± half_width` degrees.
    HueWindow { half_width: f64 },
    /// One color per hue offset, in order.
    FixedAngles(&'static [f64]),
}

impl HarmonyType {
    pub const ALL: [HarmonyType; 8] = [
        HarmonyType::Monochromatic,
        HarmonyType::Analogous,
        HarmonyType::Complementary,
        HarmonyType::SplitComplementary,
        HarmonyType::Triadic,
        HarmonyType::Tetradic,
        HarmonyType::Square,
        HarmonyType::Compound,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HarmonyType::Monochromatic => "monochromatic",
            HarmonyType::Analogous => "analogous",
            HarmonyType::Complementary => "complementary",
            HarmonyType::SplitComplementary => "split_complementary",
            HarmonyType::Triadic => "triadic",
            HarmonyType::Tetradic => "tetradic",
            HarmonyType::Square => "square",
            HarmonyType::Compound => "compound",
        }
    }

    pub fn rule(self) -> HarmonyRule {
        match self {
            HarmonyType::Monochromatic => HarmonyRule::LightnessRamp,
            HarmonyType::Analogous => HarmonyRule::HueWindow { half_width: 30.0 },
            HarmonyType::Complementary => HarmonyRule::FixedAngles(COMPLEMENTARY),
            HarmonyType::SplitComplementary => HarmonyRule::FixedAngles(SPLIT_COMPLEMENTARY),
            HarmonyType::Triadic => HarmonyRule::FixedAngles(TRIADIC),
            HarmonyType::Tetradic => HarmonyRule::FixedAngles(TETRADIC),
            HarmonyType::Square => HarmonyRule::FixedAngles(SQUARE),
            HarmonyType::Compound => HarmonyRule::FixedAngles(COMPOUND),
        }
    }

    /// Number of colors the rule produces on its own, if it is fixed.
    pub fn natural_count(self) -> Option<usize> {
        match self.rule() {
            HarmonyRule::FixedAngles(angles) => Some(angles.len()),
            HarmonyRule::LightnessRamp | HarmonyRule::HueWindow { .. } => None,
        }
    }

    pub fn min_count(self) -> usize {
        self.natural_count().unwrap_or(MIN_HARMONY_COUNT)
    }
}

impl fmt::Display for HarmonyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HarmonyType {
    type Err = ValidationError;

    /// Accepts snake_case or kebab-case names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        HarmonyType::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| ValidationError::InvalidHarmonyType(s.to_string()))
    }
}

/// What to do when more colors are requested than a fixed rule yields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Expansion {
    pub enabled: bool,
    pub intensity: f64,
}

impl Default for Expansion {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: DEFAULT_EXPANSION_INTENSITY,
        }
    }
}

impl Expansion {
    /// Reads `expand` and `intensity`; the intensity must lie in (0, 1].
    pub fn from_json(params: &Value) -> Result<Self, ValidationError> {
        let d = Self::default();
        let intensity = param_positive(params, "intensity", d.intensity, 1.0)?;
        Ok(Self {
            enabled: param_bool(params, "expand", d.enabled),
            intensity,
        })
    }
}

fn invalid_count(harmony_type: HarmonyType, count: usize, reason: String) -> ValidationError {
    ValidationError::InvalidCount {
        harmony: harmony_type.to_string(),
        count,
        reason,
    }
}

/// Checks `count` against the global bounds and the rule's requirements.
pub fn validate_count(
    harmony_type: HarmonyType,
    count: usize,
    expansion: &Expansion,
) -> Result<(), ValidationError> {
    if !(MIN_HARMONY_COUNT..=MAX_HARMONY_COUNT).contains(&count) {
        return Err(invalid_count(
            harmony_type,
            count,
            format!("count must be between {MIN_HARMONY_COUNT} and {MAX_HARMONY_COUNT}"),
        ));
    }
    if let Some(natural) = harmony_type.natural_count() {
        if count < natural {
            return Err(invalid_count(
                harmony_type,
                count,
                format!("requires at least {natural} colors"),
            ));
        }
        if count > natural && !expansion.enabled {
            return Err(invalid_count(
                harmony_type,
                count,
                format!("produces exactly {natural} colors and expansion is disabled"),
            ));
        }
    }
    Ok(())
}

/// Generates `count` harmony colors from `base`, expanding fixed rules with
/// tint/shade variants when `count` exceeds their natural size.
pub fn generate(
    base: Hsl,
    harmony_type: HarmonyType,
    count: usize,
) -> Result<Vec<Color>, ValidationError> {
    generate_with(base, harmony_type, count, &Expansion::default())
}

pub fn generate_with(
    base: Hsl,
    harmony_type: HarmonyType,
    count: usize,
    expansion: &Expansion,
) -> Result<Vec<Color>, ValidationError> {
    validate_count(harmony_type, count, expansion)?;
    let at_hue = |offset: f64| {
        space::hsl_to_rgb(Hsl {
            h: space::normalize_hue(base.h + offset),
            ..base
        })
    };
    let span = (count - 1) as f64;

    let colors = match harmony_type.rule() {
        HarmonyRule::LightnessRamp => (0..count)
            .map(|i| {
                space::hsl_to_rgb(Hsl {
                    l: 100.0 * i as f64 / span,
                    ..base
                })
            })
            .collect(),
        HarmonyRule::HueWindow { half_width } => (0..count)
            .map(|i| at_hue(-half_width + 2.0 * half_width * i as f64 / span))
            .collect(),
        HarmonyRule::FixedAngles(angles) => {
            let natural: Vec<Color> = angles.iter().map(|&a| at_hue(a)).collect();
            expand(natural, count, expansion.intensity)
        }
    };
    Ok(colors)
}

/// Appends alternating tint/shade variants of the natural colors until `count` is reached.
///
/// Extra color `k` derives from `natural[k % n]`; round `k / n` alternates
/// tint, shade, tint, ... with the step growing every two rounds.
fn expand(natural: Vec<Color>, count: usize, intensity: f64) -> Vec<Color> {
    let n = natural.len();
    if n == 0 || count <= n {
        return natural;
    }
    let extras: Vec<Color> = (0..count - n)
        .map(|k| {
            let source = natural[k % n];
            let round = k / n;
            let step = round / 2 + 1;
            if round % 2 == 0 {
                variation::tint_step(source, step, intensity)
            } else {
                variation::shade_step(source, step, intensity)
            }
        })
        .collect();
    natural.into_iter().chain(extras).collect()
}

/// A validated-on-demand harmony generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonyRequest {
    pub base: Color,
    pub harmony_type: HarmonyType,
    pub count: usize,
    /// Option map; `expand` (bool) and `intensity` (number) are recognised.
    #[serde(default = "empty_options")]
    pub variation_options: Value,
}

fn empty_options() -> Value {
    json!({})
}

impl HarmonyRequest {
    pub fn new(base: Color, harmony_type: HarmonyType, count: usize) -> Self {
        Self {
            base,
            harmony_type,
            count,
            variation_options: empty_options(),
        }
    }

    pub fn with_options(mut self, variation_options: Value) -> Self {
        self.variation_options = variation_options;
        self
    }

    pub fn expansion(&self) -> Result<Expansion, ValidationError> {
        Expansion::from_json(&self.variation_options)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_count(self.harmony_type, self.count, &self.expansion()?)
    }

    pub fn generate(&self) -> Result<Vec<Color>, ValidationError> {
        let expansion = self.expansion()?;
        generate_with(self.base.to_hsl(), self.harmony_type, self.count, &expansion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(255, 0, 0);

    fn hues(colors: &[Color]) -> Vec<f64> {
        colors.iter().map(|c| c.to_hsl().h).collect()
    }

    fn assert_hues(colors: &[Color], expected: &[f64]) {
        let actual = hues(colors);
        assert_eq!(actual.len(), expected.len(), "{actual:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!(space::hue_delta(*a, *e).abs() < 1.0, "{actual:?} vs {expected:?}");
        }
    }

    // -- Fixed-angle rules --

    #[test]
    fn complementary_of_red_is_cyan() {
        let colors = generate(RED.to_hsl(), HarmonyType::Complementary, 2).unwrap();
        assert_eq!(colors, vec![RED, Color::new(0, 255, 255)]);
    }

    #[test]
    fn triadic_of_red_is_rgb_primaries() {
        let colors = generate(RED.to_hsl(), HarmonyType::Triadic, 3).unwrap();
        assert_eq!(
            colors,
            vec![RED, Color::new(0, 255, 0), Color::new(0, 0, 255)]
        );
    }

    #[test]
    fn split_complementary_angles() {
        let colors = generate(RED.to_hsl(), HarmonyType::SplitComplementary, 3).unwrap();
        assert_hues(&colors, &[0.0, 150.0, 210.0]);
    }

    #[test]
    fn tetradic_square_and_compound_angles() {
        let base = RED.to_hsl();
        assert_hues(
            &generate(base, HarmonyType::Tetradic, 4).unwrap(),
            &[0.0, 60.0, 180.0, 240.0],
        );
        assert_hues(
            &generate(base, HarmonyType::Square, 4).unwrap(),
            &[0.0, 90.0, 180.0, 270.0],
        );
        assert_hues(
            &generate(base, HarmonyType::Compound, 4).unwrap(),
            &[0.0, 180.0, 30.0, 210.0],
        );
    }

    #[test]
    fn base_color_is_always_first() {
        let base = Color::new(0x33, 0x66, 0x99);
        for t in HarmonyType::ALL {
            if t == HarmonyType::Monochromatic {
                continue;
            }
            let colors = generate(base.to_hsl(), t, t.min_count().max(3)).unwrap();
            let first = if t == HarmonyType::Analogous { colors[1] } else { colors[0] };
            assert_eq!(first, base, "{t}");
        }
    }

    // -- Ramp and window rules --

    #[test]
    fn monochromatic_spans_lightness() {
        let colors = generate(Color::new(0x33, 0x66, 0x99).to_hsl(), HarmonyType::Monochromatic, 5).unwrap();
        assert_eq!(colors.len(), 5);
        assert_eq!(colors[0], Color::BLACK);
        assert_eq!(colors[4], Color::WHITE);
        let l: Vec<f64> = colors.iter().map(|c| c.to_hsl().l).collect();
        assert!((l[2] - 50.0).abs() < 0.5, "{l:?}");
    }

    #[test]
    fn analogous_spreads_across_sixty_degrees() {
        let base = Color::new(0, 0, 255).to_hsl();
        let colors = generate(base, HarmonyType::Analogous, 3).unwrap();
        assert_hues(&colors, &[210.0, 240.0, 270.0]);
    }

    #[test]
    fn analogous_wraps_hue() {
        let colors = generate(RED.to_hsl(), HarmonyType::Analogous, 2).unwrap();
        assert_hues(&colors, &[330.0, 30.0]);
    }

    // -- Count policy --

    #[test]
    fn count_bounds_are_enforced() {
        for count in [0, 1, 11] {
            let err = generate(RED.to_hsl(), HarmonyType::Analogous, count).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidCount { .. }), "{count}");
        }
    }

    #[test]
    fn fixed_rules_reject_counts_below_natural() {
        let err = generate(RED.to_hsl(), HarmonyType::Triadic, 2).unwrap_err();
        match err {
            ValidationError::InvalidCount { harmony, count, reason } => {
                assert_eq!(harmony, "triadic");
                assert_eq!(count, 2);
                assert!(reason.contains("at least 3"));
            }
            other => panic!("expected InvalidCount, got {other:?}"),
        }
        assert!(generate(RED.to_hsl(), HarmonyType::Square, 3).is_err());
    }

    #[test]
    fn extra_counts_expand_with_tints_then_shades() {
        let colors = generate(RED.to_hsl(), HarmonyType::Complementary, 6).unwrap();
        assert_eq!(colors.len(), 6);
        let natural = [RED, Color::new(0, 255, 255)];
        assert_eq!(colors[2], variation::tint_step(natural[0], 1, 0.1));
        assert_eq!(colors[3], variation::tint_step(natural[1], 1, 0.1));
        assert_eq!(colors[4], variation::shade_step(natural[0], 1, 0.1));
        assert_eq!(colors[5], variation::shade_step(natural[1], 1, 0.1));
    }

    #[test]
    fn expansion_step_grows_every_two_rounds() {
        let colors = generate(RED.to_hsl(), HarmonyType::Complementary, 8).unwrap();
        assert_eq!(colors[6], variation::tint_step(RED, 2, 0.1));
    }

    #[test]
    fn generation_is_deterministic() {
        let base = Color::new(12, 200, 99).to_hsl();
        assert_eq!(
            generate(base, HarmonyType::Tetradic, 9).unwrap(),
            generate(base, HarmonyType::Tetradic, 9).unwrap()
        );
    }

    // -- Request --

    #[test]
    fn request_with_expand_false_rejects_extra_colors() {
        let request = HarmonyRequest::new(RED, HarmonyType::Triadic, 5).with_options(json!({"expand": false}));
        assert!(matches!(
            request.validate(),
            Err(ValidationError::InvalidCount { .. })
        ));
        let exact = HarmonyRequest::new(RED, HarmonyType::Triadic, 3).with_options(json!({"expand": false}));
        assert_eq!(exact.generate().unwrap().len(), 3);
    }

    #[test]
    fn request_intensity_controls_expansion() {
        let request = HarmonyRequest::new(RED, HarmonyType::Complementary, 3).with_options(json!({"intensity": 0.2}));
        let colors = request.generate().unwrap();
        assert_eq!(colors[2], variation::tint_step(RED, 1, 0.2));
    }

    #[test]
    fn request_rejects_bad_intensity() {
        let request = HarmonyRequest::new(RED, HarmonyType::Complementary, 3).with_options(json!({"intensity": 0}));
        assert!(matches!(
            request.validate(),
            Err(ValidationError::InvalidOption { .. })
        ));
    }

    #[test]
    fn request_deserializes_without_options() {
        let request: HarmonyRequest =
            serde_json::from_str(r##"{"base":"#ff0000","harmony_type":"split_complementary","count":3}"##).unwrap();
        assert_eq!(request.harmony_type, HarmonyType::SplitComplementary);
        assert_eq!(request.generate().unwrap().len(), 3);
    }

    // -- Names --

    #[test]
    fn harmony_type_parses_snake_and_kebab_case() {
        assert_eq!(
            "split_complementary".parse::<HarmonyType>().unwrap(),
            HarmonyType::SplitComplementary
        );
        assert_eq!(
            "Split-Complementary".parse::<HarmonyType>().unwrap(),
            HarmonyType::SplitComplementary
        );
        assert_eq!(
            "pentadic".parse::<HarmonyType>(),
            Err(ValidationError::InvalidHarmonyType("pentadic".into()))
        );
    }

    #[test]
    fn rules_carry_their_payload() {
        assert_eq!(HarmonyType::Monochromatic.rule(), HarmonyRule::LightnessRamp);
        assert_eq!(
            HarmonyType::Analogous.rule(),
            HarmonyRule::HueWindow { half_width: 30.0 }
        );
        assert_eq!(HarmonyType::Compound.natural_count(), Some(4));
        assert_eq!(HarmonyType::Analogous.natural_count(), None);
        assert_eq!(HarmonyType::Analogous.min_count(), 2);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_type() -> impl Strategy<Value = HarmonyType> {
            proptest::sample::select(HarmonyType::ALL.to_vec())
        }

        proptest! {
            #[test]
            fn valid_counts_produce_exactly_count_colors(
                r in any::<u8>(), g in any::<u8>(), b in any::<u8>(),
                t in any_type(),
                extra in 0usize..=8,
            ) {
                let count = (t.min_count() + extra).min(MAX_HARMONY_COUNT);
                let colors = generate(Color::new(r, g, b).to_hsl(), t, count).unwrap();
                prop_assert_eq!(colors.len(), count);
            }

            #[test]
            fn names_round_trip(t in any_type()) {
                prop_assert_eq!(t.as_str().parse::<HarmonyType>().unwrap(), t);
            }
        }
    }
}

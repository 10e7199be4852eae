//! Systematic tint, shade, tone and temperature variations in LAB.
//!
//! Step `i` of every family is computed from the original color, never from
//! step `i - 1`, so the families do not accumulate rounding error. Results are
//! clamped into the sRGB gamut on the way back to [`Color`].

use crate::color::Color;
use crate::error::ValidationError;
use crate::params::{param_bool, param_count, param_positive};
use crate::space::{self, Lab, Lch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Largest step count an option map may request for one family.
pub const MAX_VARIATION_STEPS: usize = 20;

const WARM_DELTA: [f64; 3] = [2.0, 5.0, -2.0];
const COOL_DELTA: [f64; 3] = [2.0, -5.0, 2.0];

/// Fraction of the hue gap closed by a semantic shift.
const SEMANTIC_SHIFT_STRENGTH: f64 = 0.7;
/// LCh chroma given to near-neutral inputs so a semantic shift is visible.
const SEMANTIC_MIN_CHROMA: f64 = 20.0;

fn map_lab(color: Color, f: impl FnOnce(Lab) -> Lab) -> Color {
    let lab = f(color.to_lab());
    space::lab_to_rgb(Lab {
        l: lab.l.clamp(0.0, 100.0),
        ..lab
    })
}

fn scale_chroma(lab: Lab, factor: f64) -> Lab {
    let factor = factor.max(0.0);
    Lab {
        l: lab.l,
        a: lab.a * factor,
        b: lab.b * factor,
    }
}

/// Non-negative fraction moved after `step` steps; negative or NaN intensity moves nothing.
fn step_amount(step: usize, intensity: f64) -> f64 {
    (step as f64 * intensity).max(0.0)
}

/// One tint step: lighter by `step * intensity * 100` L, chroma reduced by half that fraction.
pub fn tint_step(color: Color, step: usize, intensity: f64) -> Color {
    let amount = step_amount(step, intensity);
    map_lab(color, |lab| {
        let scaled = scale_chroma(lab, 1.0 - amount * 0.5);
        Lab {
            l: lab.l + amount * 100.0,
            ..scaled
        }
    })
}

/// One shade step: darker by `step * intensity * 100` L, chroma reduced by 0.3 of that fraction.
pub fn shade_step(color: Color, step: usize, intensity: f64) -> Color {
    let amount = step_amount(step, intensity);
    map_lab(color, |lab| {
        let scaled = scale_chroma(lab, 1.0 - amount * 0.3);
        Lab {
            l: lab.l - amount * 100.0,
            ..scaled
        }
    })
}

/// `factor` receives the amount moved after each step.
fn chroma_family(color: Color, steps: usize, intensity: f64, factor: impl Fn(f64) -> f64) -> Vec<Color> {
    (1..=steps)
        .map(|i| map_lab(color, |lab| scale_chroma(lab, factor(step_amount(i, intensity)))))
        .collect()
}

pub fn tint(color: Color, steps: usize, intensity: f64) -> Vec<Color> {
    (1..=steps).map(|i| tint_step(color, i, intensity)).collect()
}

pub fn shade(color: Color, steps: usize, intensity: f64) -> Vec<Color> {
    (1..=steps).map(|i| shade_step(color, i, intensity)).collect()
}

/// Chroma reduced toward gray at constant lightness.
pub fn tone(color: Color, steps: usize, intensity: f64) -> Vec<Color> {
    chroma_family(color, steps, intensity, |amount| 1.0 - amount)
}

pub fn saturate(color: Color, steps: usize, intensity: f64) -> Vec<Color> {
    chroma_family(color, steps, intensity, |amount| 1.0 + amount)
}

pub fn desaturate(color: Color, steps: usize, intensity: f64) -> Vec<Color> {
    chroma_family(color, steps, intensity, |amount| 1.0 - amount)
}

/// Chroma reduced 1.5 times faster than [`desaturate`].
pub fn neutrals(color: Color, steps: usize, intensity: f64) -> Vec<Color> {
    chroma_family(color, steps, intensity, |amount| 1.0 - amount * 1.5)
}

fn temperature(color: Color, steps: usize, delta: [f64; 3]) -> Vec<Color> {
    (1..=steps)
        .map(|i| {
            let k = i as f64;
            map_lab(color, |lab| Lab {
                l: lab.l + delta[0] * k,
                a: lab.a + delta[1] * k,
                b: lab.b + delta[2] * k,
            })
        })
        .collect()
}

/// Warmer variants: each step adds (+2 L, +5 a, -2 b).
pub fn warm(color: Color, steps: usize) -> Vec<Color> {
    temperature(color, steps, WARM_DELTA)
}

/// Cooler variants: each step adds (+2 L, -5 a, +2 b).
pub fn cool(color: Color, steps: usize) -> Vec<Color> {
    temperature(color, steps, COOL_DELTA)
}

/// Meaning a color should be nudged toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticRole {
    Success,
    Warning,
    Error,
    Info,
    Disabled,
}

impl SemanticRole {
    pub const ALL: [SemanticRole; 5] = [
        SemanticRole::Success,
        SemanticRole::Warning,
        SemanticRole::Error,
        SemanticRole::Info,
        SemanticRole::Disabled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SemanticRole::Success => "success",
            SemanticRole::Warning => "warning",
            SemanticRole::Error => "error",
            SemanticRole::Info => "info",
            SemanticRole::Disabled => "disabled",
        }
    }

    /// LCh hue the role rotates toward, or `None` for `Disabled`.
    pub fn target_hue(self) -> Option<f64> {
        match self {
            SemanticRole::Success => Some(120.0),
            SemanticRole::Warning => Some(45.0),
            SemanticRole::Error => Some(0.0),
            SemanticRole::Info => Some(200.0),
            SemanticRole::Disabled => None,
        }
    }
}

impl fmt::Display for SemanticRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        SemanticRole::ALL
            .into_iter()
            .find(|role| role.as_str() == lower)
            .ok_or_else(|| ValidationError::InvalidOption {
                option: "semantic_role".to_string(),
                value: s.to_string(),
                expected: "success, warning, error, info or disabled".to_string(),
            })
    }
}

/// Nudges `color` toward the meaning of `role`.
///
/// Hue roles rotate the LCh hue 70% of the shortest arc toward their target
/// and lift chroma to at least 20. `Disabled` halves chroma and closes a
/// quarter of the lightness gap to white.
pub fn semantic_shift(color: Color, role: SemanticRole) -> Color {
    let lch = space::lab_to_lch(color.to_lab());
    let shifted = match role.target_hue() {
        Some(target) => Lch {
            l: lch.l,
            c: lch.c.max(SEMANTIC_MIN_CHROMA),
            h: space::normalize_hue(lch.h + space::hue_delta(lch.h, target) * SEMANTIC_SHIFT_STRENGTH),
        },
        None => Lch {
            l: lch.l + (100.0 - lch.l) * 0.25,
            c: lch.c * 0.5,
            h: lch.h,
        },
    };
    map_lab(color, |_| space::lch_to_lab(shifted))
}

/// Step count and per-step intensity for one variation family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FamilyOptions {
    pub steps: usize,
    pub intensity: f64,
}

impl FamilyOptions {
    fn from_json(params: &Value, prefix: &str, default: FamilyOptions) -> Result<Self, ValidationError> {
        Ok(Self {
            steps: param_count(params, &format!("{prefix}_steps"), default.steps, MAX_VARIATION_STEPS)?,
            intensity: param_positive(params, &format!("{prefix}_intensity"), default.intensity, 1.0)?,
        })
    }
}

/// Settings for [`generate_variations`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariationOptions {
    pub tints: FamilyOptions,
    pub shades: FamilyOptions,
    pub tones: FamilyOptions,
    pub saturated: FamilyOptions,
    pub desaturated: FamilyOptions,
    pub neutrals: FamilyOptions,
    pub warm_steps: usize,
    pub cool_steps: usize,
    pub semantic: bool,
}

impl Default for VariationOptions {
    fn default() -> Self {
        let family = |steps, intensity| FamilyOptions { steps, intensity };
        Self {
            tints: family(5, 0.1),
            shades: family(5, 0.1),
            tones: family(5, 0.1),
            saturated: family(3, 0.15),
            desaturated: family(3, 0.15),
            neutrals: family(3, 0.2),
            warm_steps: 2,
            cool_steps: 2,
            semantic: false,
        }
    }
}

impl VariationOptions {
    /// Reads `<family>_steps` / `<family>_intensity` keys (`tint`, `shade`,
    /// `tone`, `saturated`, `desaturated`, `neutral`), `warm_steps`,
    /// `cool_steps` and `semantic`. Step counts must lie in
    /// `[0, MAX_VARIATION_STEPS]` and intensities in (0, 1].
    pub fn from_json(params: &Value) -> Result<Self, ValidationError> {
        let d = Self::default();
        Ok(Self {
            tints: FamilyOptions::from_json(params, "tint", d.tints)?,
            shades: FamilyOptions::from_json(params, "shade", d.shades)?,
            tones: FamilyOptions::from_json(params, "tone", d.tones)?,
            saturated: FamilyOptions::from_json(params, "saturated", d.saturated)?,
            desaturated: FamilyOptions::from_json(params, "desaturated", d.desaturated)?,
            neutrals: FamilyOptions::from_json(params, "neutral", d.neutrals)?,
            warm_steps: param_count(params, "warm_steps", d.warm_steps, MAX_VARIATION_STEPS)?,
            cool_steps: param_count(params, "cool_steps", d.cool_steps, MAX_VARIATION_STEPS)?,
            semantic: param_bool(params, "semantic", d.semantic),
        })
    }
}

/// Every variation family of one base color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variations {
    pub base: Color,
    pub tints: Vec<Color>,
    pub shades: Vec<Color>,
    pub tones: Vec<Color>,
    pub saturated: Vec<Color>,
    pub desaturated: Vec<Color>,
    pub neutrals: Vec<Color>,
    pub warm: Vec<Color>,
    pub cool: Vec<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<BTreeMap<SemanticRole, Color>>,
}

pub fn generate_variations(color: Color, options: &VariationOptions) -> Variations {
    let semantic = options.semantic.then(|| {
        SemanticRole::ALL
            .into_iter()
            .map(|role| (role, semantic_shift(color, role)))
            .collect()
    });
    Variations {
        base: color,
        tints: tint(color, options.tints.steps, options.tints.intensity),
        shades: shade(color, options.shades.steps, options.shades.intensity),
        tones: tone(color, options.tones.steps, options.tones.intensity),
        saturated: saturate(color, options.saturated.steps, options.saturated.intensity),
        desaturated: desaturate(color, options.desaturated.steps, options.desaturated.intensity),
        neutrals: neutrals(color, options.neutrals.steps, options.neutrals.intensity),
        warm: warm(color, options.warm_steps),
        cool: cool(color, options.cool_steps),
        semantic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const STEEL_BLUE: Color = Color::new(0x46, 0x82, 0xb4);

    fn lightness(c: Color) -> f64 {
        c.to_lab().l
    }

    fn chroma(c: Color) -> f64 {
        space::lab_to_lch(c.to_lab()).c
    }

    #[test]
    fn tint_of_black_step_one() {
        let tints = tint(Color::BLACK, 1, 0.2);
        assert_eq!(tints.len(), 1);
        let lab = tints[0].to_lab();
        assert!((lab.l - 20.0).abs() < 0.5, "L = {}", lab.l);
        assert!(lab.a.abs() < 0.5 && lab.b.abs() < 0.5);
        assert_eq!(tints[0], Color::new(0x30, 0x30, 0x30));
    }

    #[test]
    fn tints_get_strictly_lighter() {
        let tints = tint(STEEL_BLUE, 4, 0.1);
        let mut previous = lightness(STEEL_BLUE);
        for t in tints {
            let l = lightness(t);
            assert!(l > previous, "{t} not lighter: {l} <= {previous}");
            previous = l;
        }
    }

    #[test]
    fn shades_get_strictly_darker() {
        let shades = shade(STEEL_BLUE, 4, 0.1);
        let mut previous = lightness(STEEL_BLUE);
        for s in shades {
            let l = lightness(s);
            assert!(l < previous, "{s} not darker: {l} >= {previous}");
            previous = l;
        }
    }

    #[test]
    fn tint_lightness_clamps_at_white() {
        let tints = tint(Color::new(200, 200, 200), 5, 0.5);
        assert_eq!(tints.last().copied(), Some(Color::WHITE));
    }

    #[test]
    fn shade_lightness_clamps_at_black() {
        let shades = shade(Color::new(40, 40, 40), 5, 0.5);
        assert_eq!(shades.last().copied(), Some(Color::BLACK));
    }

    #[test]
    fn tones_keep_lightness_and_lose_chroma() {
        let tones = tone(STEEL_BLUE, 5, 0.1);
        let base_l = lightness(STEEL_BLUE);
        let base_c = chroma(STEEL_BLUE);
        for t in &tones {
            assert!((lightness(*t) - base_l).abs() < 1.5, "{t}");
            assert!(chroma(*t) < base_c, "{t}");
        }
    }

    #[test]
    fn full_tone_reaches_gray() {
        let tones = tone(Color::new(200, 40, 40), 1, 1.0);
        let lab = tones[0].to_lab();
        assert!(lab.a.abs() < 1.0 && lab.b.abs() < 1.0, "{lab:?}");
    }

    #[test]
    fn chroma_factor_floors_at_zero() {
        // intensity large enough to drive the factor negative must not flip hue
        let c = Color::new(200, 40, 40);
        let over = desaturate(c, 1, 3.0)[0];
        let exact = desaturate(c, 1, 1.0)[0];
        assert_eq!(over, exact);
    }

    #[test]
    fn saturate_increases_chroma() {
        let muted = Color::new(120, 140, 160);
        let sat = saturate(muted, 3, 0.15);
        assert!(chroma(sat[0]) > chroma(muted));
        assert!(chroma(sat[2]) > chroma(sat[0]));
    }

    #[test]
    fn neutrals_desaturate_faster() {
        let n = neutrals(STEEL_BLUE, 1, 0.2)[0];
        let d = desaturate(STEEL_BLUE, 1, 0.2)[0];
        assert!(chroma(n) < chroma(d));
    }

    #[test]
    fn warm_shifts_toward_red_and_cool_toward_green_blue() {
        let gray = Color::new(128, 128, 128);
        let w = warm(gray, 2);
        let c = cool(gray, 2);
        assert_eq!(w.len(), 2);
        assert!(w[1].to_lab().a > 5.0);
        assert!(c[1].to_lab().a < -5.0);
        assert!(c[1].to_lab().b > 0.0);
    }

    #[test]
    fn zero_steps_yield_empty_families() {
        assert!(tint(STEEL_BLUE, 0, 0.1).is_empty());
        assert!(warm(STEEL_BLUE, 0).is_empty());
    }

    // -- Semantic shift --

    #[test]
    fn success_shift_moves_hue_toward_green() {
        let red = Color::new(220, 30, 30);
        let before = space::lab_to_lch(red.to_lab()).h;
        let after = space::lab_to_lch(semantic_shift(red, SemanticRole::Success).to_lab()).h;
        let gap_before = space::hue_delta(before, 120.0).abs();
        let gap_after = space::hue_delta(after, 120.0).abs();
        assert!(gap_after < gap_before, "{before} -> {after}");
    }

    #[test]
    fn semantic_shift_gives_gray_a_hue() {
        let shifted = semantic_shift(Color::new(128, 128, 128), SemanticRole::Info);
        assert!(chroma(shifted) > 10.0, "{shifted}");
    }

    #[test]
    fn disabled_is_lighter_and_less_saturated() {
        let base = Color::new(30, 90, 200);
        let disabled = semantic_shift(base, SemanticRole::Disabled);
        assert!(lightness(disabled) > lightness(base));
        assert!(chroma(disabled) < chroma(base));
    }

    #[test]
    fn semantic_role_parses_and_rejects() {
        assert_eq!("Warning".parse::<SemanticRole>().unwrap(), SemanticRole::Warning);
        assert!(matches!(
            "urgent".parse::<SemanticRole>(),
            Err(ValidationError::InvalidOption { .. })
        ));
    }

    // -- Options and the combined generator --

    #[test]
    fn default_options_match_family_sizes() {
        let v = generate_variations(STEEL_BLUE, &VariationOptions::default());
        assert_eq!(v.base, STEEL_BLUE);
        assert_eq!(v.tints.len(), 5);
        assert_eq!(v.shades.len(), 5);
        assert_eq!(v.tones.len(), 5);
        assert_eq!(v.saturated.len(), 3);
        assert_eq!(v.desaturated.len(), 3);
        assert_eq!(v.neutrals.len(), 3);
        assert_eq!(v.warm.len(), 2);
        assert_eq!(v.cool.len(), 2);
        assert!(v.semantic.is_none());
    }

    #[test]
    fn options_from_json_override_keys() {
        let opts = VariationOptions::from_json(&json!({
            "tint_steps": 2,
            "shade_intensity": 0.2,
            "warm_steps": 0,
            "semantic": true
        }))
        .unwrap();
        assert_eq!(opts.tints.steps, 2);
        assert_eq!(opts.tints.intensity, 0.1);
        assert_eq!(opts.shades.intensity, 0.2);
        assert_eq!(opts.warm_steps, 0);
        assert!(opts.semantic);

        let v = generate_variations(STEEL_BLUE, &opts);
        assert_eq!(v.tints.len(), 2);
        assert!(v.warm.is_empty());
        assert_eq!(v.semantic.map(|m| m.len()), Some(5));
    }

    #[test]
    fn options_from_json_rejects_negative_intensity() {
        let err = VariationOptions::from_json(&json!({"tint_intensity": -5.0})).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidOption { ref option, .. } if option == "tint_intensity"
        ));
        assert!(VariationOptions::from_json(&json!({"neutral_intensity": 0})).is_err());
    }

    #[test]
    fn options_from_json_rejects_oversized_steps() {
        for key in ["tint_steps", "tone_steps", "warm_steps", "cool_steps"] {
            let mut params = json!({});
            params[key] = json!(4_000_000_000_u64);
            assert!(VariationOptions::from_json(&params).is_err(), "{key}");
        }
        let at_cap = VariationOptions::from_json(&json!({"shade_steps": MAX_VARIATION_STEPS})).unwrap();
        assert_eq!(at_cap.shades.steps, MAX_VARIATION_STEPS);
    }

    #[test]
    fn negative_intensity_never_inverts_a_tint() {
        let base = Color::new(0x33, 0x66, 0x99);
        let l = base.to_lab().l;
        for c in tint(base, 2, -0.3) {
            assert!(c.to_lab().l >= l - 0.5, "{c}");
        }
        for c in shade(base, 2, -0.3) {
            assert!(c.to_lab().l <= l + 0.5, "{c}");
        }
    }

    #[test]
    fn variations_serialize_as_hex_lists() {
        let v = generate_variations(Color::BLACK, &VariationOptions::default());
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["base"], "#000000");
        assert!(json["tints"][0].as_str().unwrap().starts_with('#'));
        assert!(json.get("semantic").is_none());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_color() -> impl Strategy<Value = Color> {
            (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Color::new(r, g, b))
        }

        proptest! {
            #[test]
            fn tint_never_darker(c in any_color(), step in 1usize..5) {
                let t = tint_step(c, step, 0.1);
                prop_assert!(lightness(t) >= lightness(c) - 1.0, "{c} -> {t}");
            }

            #[test]
            fn shade_never_lighter(c in any_color(), step in 1usize..5) {
                let s = shade_step(c, step, 0.1);
                prop_assert!(lightness(s) <= lightness(c) + 1.0, "{c} -> {s}");
            }

            #[test]
            fn family_lengths_match_steps(c in any_color(), steps in 0usize..8) {
                prop_assert_eq!(tint(c, steps, 0.1).len(), steps);
                prop_assert_eq!(tone(c, steps, 0.1).len(), steps);
                prop_assert_eq!(cool(c, steps).len(), steps);
            }
        }
    }
}

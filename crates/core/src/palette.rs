//! Palette assembly: harmony generation, contrast repair, variations, metadata.
//!
//! A [`Palette`] is built once by [`assemble`] and never mutated. Colors that
//! cannot reach the requested contrast do not fail the call; they are recorded
//! as [`ComplianceShortfall`]s and the palette is flagged as partial.

use crate::accessibility::{self, AdjustmentConfig, AdjustmentOutcome, ValidationOptions, ValidationReport};
use crate::color::Color;
use crate::error::{EngineError, ValidationError};
use crate::harmony::{self, Expansion, HarmonyType};
use crate::metrics::{self, BalanceMetrics};
use crate::params::{param_count, param_positive};
use crate::space;
use crate::variation;
use crate::wcag::{TextSize, WcagLevel};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Position-derived label of a palette color.
///
/// Serializes as its name: `primary`, `secondary`, `accent`, `tertiary`,
/// then `support_1`, `support_2`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Tertiary,
    Support(u8),
}

impl Role {
    /// The role of the `index`-th generated color.
    pub fn for_index(index: usize) -> Self {
        match index {
            0 => Role::Primary,
            1 => Role::Secondary,
            2 => Role::Accent,
            3 => Role::Tertiary,
            n => Role::Support(u8::try_from(n - 3).unwrap_or(u8::MAX)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Primary => f.write_str("primary"),
            Role::Secondary => f.write_str("secondary"),
            Role::Accent => f.write_str("accent"),
            Role::Tertiary => f.write_str("tertiary"),
            Role::Support(n) => write!(f, "support_{n}"),
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "primary" => Ok(Role::Primary),
            "secondary" => Ok(Role::Secondary),
            "accent" => Ok(Role::Accent),
            "tertiary" => Ok(Role::Tertiary),
            other => other
                .strip_prefix("support_")
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|&n| n >= 1)
                .map(Role::Support)
                .ok_or_else(|| ValidationError::InvalidOption {
                    option: "role".to_string(),
                    value: s.to_string(),
                    expected: "primary, secondary, accent, tertiary or support_N".to_string(),
                }),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleColor {
    pub role: Role,
    pub color: Color,
}

/// Requested palette size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Minimal,
    #[default]
    Standard,
    Extended,
    Complete,
}

impl SizeClass {
    pub const ALL: [SizeClass; 4] = [
        SizeClass::Minimal,
        SizeClass::Standard,
        SizeClass::Extended,
        SizeClass::Complete,
    ];

    pub fn count(self) -> usize {
        match self {
            SizeClass::Minimal => 3,
            SizeClass::Standard => 5,
            SizeClass::Extended => 7,
            SizeClass::Complete => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeClass::Minimal => "minimal",
            SizeClass::Standard => "standard",
            SizeClass::Extended => "extended",
            SizeClass::Complete => "complete",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        SizeClass::ALL
            .into_iter()
            .find(|size| size.as_str() == lower)
            .ok_or_else(|| ValidationError::InvalidOption {
                option: "size_class".to_string(),
                value: s.to_string(),
                expected: "minimal, standard, extended or complete".to_string(),
            })
    }
}

/// Everything [`assemble`] needs besides the base color, harmony and size.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyContext {
    pub validation: ValidationOptions,
    pub adjustment: AdjustmentConfig,
    /// Number of `shade_N` / `tint_N` entries per color.
    pub variation_steps: usize,
    pub variation_intensity: f64,
    pub expansion: Expansion,
    /// Fixed timestamp for reproducible output; `None` uses the clock.
    pub generated_at: Option<u64>,
}

impl Default for AssemblyContext {
    fn default() -> Self {
        Self {
            validation: ValidationOptions::default(),
            adjustment: AdjustmentConfig::default(),
            variation_steps: 4,
            variation_intensity: 0.1,
            expansion: Expansion::default(),
            generated_at: None,
        }
    }
}

impl AssemblyContext {
    /// Reads a flat option map: the validation keys, `max_attempts`,
    /// `lightness_step`, `variation_steps`, `variation_intensity`, `expand`,
    /// `intensity` and `generated_at`.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        let d = Self::default();
        Ok(Self {
            validation: ValidationOptions::from_json(params)?,
            adjustment: AdjustmentConfig::from_json(params)?,
            variation_steps: param_count(params, "variation_steps", d.variation_steps, variation::MAX_VARIATION_STEPS)?,
            variation_intensity: param_positive(params, "variation_intensity", d.variation_intensity, 1.0)?,
            expansion: Expansion::from_json(params)?,
            generated_at: params.get("generated_at").and_then(Value::as_u64),
        })
    }

    pub fn background(&self) -> Color {
        self.validation.background
    }
}

/// A color the assembler changed to meet contrast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorAdjustment {
    pub role: Role,
    pub original: Color,
    pub adjusted: Color,
    pub ratio: f64,
    pub attempts: usize,
}

/// A color that could not reach the required contrast within the attempt bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplianceShortfall {
    pub role: Role,
    pub original: Color,
    /// Best candidate found; this is the color used in the palette.
    pub best: Color,
    pub background: Color,
    pub ratio: f64,
    pub required: f64,
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteMetadata {
    pub base_color: Color,
    pub harmony_type: HarmonyType,
    pub size_class: SizeClass,
    pub color_count: usize,
    pub background: Color,
    pub level: WcagLevel,
    pub text_size: TextSize,
    /// Unix seconds.
    pub generated_at: u64,
    /// 1.0 minus the mean HSL hue drift (in half-turns) introduced by adjustment.
    pub harmony_score: f64,
    /// Share of contrast pairs passing in the final palette.
    pub accessibility_score: f64,
    pub distinctiveness: f64,
    pub balance: BalanceMetrics,
    pub validation: ValidationReport,
    pub adjustments: Vec<ColorAdjustment>,
    pub shortfalls: Vec<ComplianceShortfall>,
    pub is_partial: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<RoleColor>,
    variations: BTreeMap<Role, BTreeMap<String, Color>>,
    metadata: PaletteMetadata,
}

impl Palette {
    pub fn colors(&self) -> &[RoleColor] {
        &self.colors
    }

    pub fn color(&self, role: Role) -> Option<Color> {
        self.colors.iter().find(|rc| rc.role == role).map(|rc| rc.color)
    }

    pub fn variations(&self) -> &BTreeMap<Role, BTreeMap<String, Color>> {
        &self.variations
    }

    /// A named variation like `"shade_2"` of the color with `role`.
    pub fn variation(&self, role: Role, name: &str) -> Option<Color> {
        self.variations.get(&role)?.get(name).copied()
    }

    pub fn metadata(&self) -> &PaletteMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn hex_colors(&self) -> Vec<String> {
        self.colors.iter().map(|rc| rc.color.to_hex()).collect()
    }
}

/// Parses `base_color` and assembles a palette from it.
pub fn assemble(
    base_color: &str,
    harmony_type: HarmonyType,
    size_class: SizeClass,
    context: &AssemblyContext,
) -> Result<Palette, EngineError> {
    let base = Color::parse(base_color)?;
    assemble_color(base, harmony_type, size_class, context)
}

pub fn assemble_color(
    base: Color,
    harmony_type: HarmonyType,
    size_class: SizeClass,
    context: &AssemblyContext,
) -> Result<Palette, EngineError> {
    let count = size_class.count();
    let generated = harmony::generate_with(base.to_hsl(), harmony_type, count, &context.expansion)?;
    tracing::debug!(base = %base, harmony = %harmony_type, count, "generated harmony colors");

    let background = context.background();
    let required = context.validation.required_ratio();
    let mut colors = Vec::with_capacity(generated.len());
    let mut adjustments = Vec::new();
    let mut shortfalls = Vec::new();

    for (index, &original) in generated.iter().enumerate() {
        let role = Role::for_index(index);
        if !context.validation.check_contrast {
            colors.push(RoleColor { role, color: original });
            continue;
        }
        let outcome = accessibility::adjust_for_contrast(original, background, required, &context.adjustment);
        match outcome {
            AdjustmentOutcome::AlreadyCompliant { .. } => {}
            AdjustmentOutcome::Adjusted { color, ratio, attempts } => adjustments.push(ColorAdjustment {
                role,
                original,
                adjusted: color,
                ratio,
                attempts,
            }),
            AdjustmentOutcome::GaveUpAfterNAttempts { best, ratio, attempts } => shortfalls.push(ComplianceShortfall {
                role,
                original,
                best,
                background,
                ratio,
                required,
                attempts,
            }),
        }
        colors.push(RoleColor {
            role,
            color: outcome.color(),
        });
    }
    tracing::debug!(
        adjusted = adjustments.len(),
        shortfalls = shortfalls.len(),
        "contrast adjustment finished"
    );

    let variations = colors
        .iter()
        .map(|rc| (rc.role, variation_map(rc.color, context.variation_steps, context.variation_intensity)))
        .collect();

    let final_colors: Vec<Color> = colors.iter().map(|rc| rc.color).collect();
    let validation = accessibility::validate(&colors, &context.validation);
    tracing::debug!(
        is_valid = validation.is_valid,
        issues = validation.issues.len(),
        "validated final palette"
    );

    let metadata = PaletteMetadata {
        base_color: base,
        harmony_type,
        size_class,
        color_count: colors.len(),
        background,
        level: context.validation.level,
        text_size: context.validation.text_size,
        generated_at: context.generated_at.unwrap_or_else(unix_now),
        harmony_score: harmony_score(&generated, &final_colors),
        accessibility_score: validation.contrast_pass_rate(),
        distinctiveness: metrics::distinctiveness_score(&final_colors),
        balance: metrics::balance(&final_colors),
        validation,
        adjustments,
        is_partial: !shortfalls.is_empty(),
        shortfalls,
    };

    Ok(Palette {
        colors,
        variations,
        metadata,
    })
}

fn variation_map(color: Color, steps: usize, intensity: f64) -> BTreeMap<String, Color> {
    (1..=steps)
        .flat_map(|i| {
            [
                (format!("shade_{i}"), variation::shade_step(color, i, intensity)),
                (format!("tint_{i}"), variation::tint_step(color, i, intensity)),
            ]
        })
        .collect()
}

/// Saturation (percent) below which a color's HSL hue is not meaningful.
const ACHROMATIC_SATURATION: f64 = 1.0;

/// 1.0 minus the mean hue drift between generated and final colors, as a
/// fraction of the largest possible drift (180°). Achromatic colors never drift.
fn harmony_score(generated: &[Color], final_colors: &[Color]) -> f64 {
    if generated.is_empty() {
        return 1.0;
    }
    let total: f64 = generated
        .iter()
        .zip(final_colors)
        .map(|(g, f)| {
            let (gh, fh) = (g.to_hsl(), f.to_hsl());
            if gh.s < ACHROMATIC_SATURATION || fh.s < ACHROMATIC_SATURATION {
                0.0
            } else {
                space::hue_delta(gh.h, fh.h).abs() / 180.0
            }
        })
        .sum();
    (1.0 - total / generated.len() as f64).clamp(0.0, 1.0)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

//! Accessibility validation and explicit contrast remediation.
//!
//! [`validate`] only reports. Repairs go through [`adjust_for_contrast`] or
//! [`suggest_remediation`], which walk a bounded ladder of shades or tints.

use crate::color::Color;
use crate::error::{EngineError, ValidationError};
use crate::metrics;
use crate::palette::{Role, RoleColor};
use crate::params::{param_bool, param_color, param_count, param_f64, param_parsed, param_positive};
use crate::simulation::{self, ColorBlindness};
use crate::variation;
use crate::wcag::{TextSize, WcagLevel, WcagThresholds};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label given to [`ValidationOptions::background`] in reports.
pub const BACKGROUND_LABEL: &str = "background";

/// A declared foreground/background pairing of two palette roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RolePair {
    pub foreground: Role,
    pub background: Role,
}

impl RolePair {
    pub fn new(foreground: Role, background: Role) -> Self {
        Self {
            foreground,
            background,
        }
    }

    fn matches(&self, a: Role, b: Role) -> bool {
        (self.foreground == a && self.background == b) || (self.foreground == b && self.background == a)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOptions {
    pub background: Color,
    pub level: WcagLevel,
    pub text_size: TextSize,
    pub thresholds: WcagThresholds,
    /// Pairs to contrast-check; empty means every color against `background`.
    pub role_pairs: Vec<RolePair>,
    pub check_contrast: bool,
    pub check_distinguishability: bool,
    pub check_color_blindness: bool,
    /// Minimum CIEDE2000 distance between colors that are not a declared pair.
    pub min_distance: f64,
    /// Contrast every pair must keep under simulation.
    pub simulated_min_contrast: f64,
    pub simulations: Vec<ColorBlindness>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            level: WcagLevel::AA,
            text_size: TextSize::Normal,
            thresholds: WcagThresholds::default(),
            role_pairs: Vec::new(),
            check_contrast: true,
            check_distinguishability: true,
            check_color_blindness: true,
            min_distance: 20.0,
            simulated_min_contrast: 4.5,
            simulations: ColorBlindness::DICHROMATS.to_vec(),
        }
    }
}

fn invalid_list(option: &str, value: &Value, expected: &str) -> ValidationError {
    ValidationError::InvalidOption {
        option: option.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

fn parse_role_pairs(value: &Value) -> Result<Vec<RolePair>, ValidationError> {
    const EXPECTED: &str = "an array of [foreground, background] role names";
    let items = value
        .as_array()
        .ok_or_else(|| invalid_list("role_pairs", value, EXPECTED))?;
    items
        .iter()
        .map(|item| match item.as_array().map(Vec::as_slice) {
            Some([Value::String(fg), Value::String(bg)]) => Ok(RolePair::new(fg.parse()?, bg.parse()?)),
            _ => Err(invalid_list("role_pairs", item, EXPECTED)),
        })
        .collect()
}

fn parse_simulations(value: &Value) -> Result<Vec<ColorBlindness>, ValidationError> {
    const EXPECTED: &str = "an array of simulation names";
    let items = value
        .as_array()
        .ok_or_else(|| invalid_list("simulations", value, EXPECTED))?;
    items
        .iter()
        .map(|item| match item {
            Value::String(name) => name.parse(),
            other => Err(invalid_list("simulations", other, EXPECTED)),
        })
        .collect()
}

impl ValidationOptions {
    /// Reads options from a JSON map. Recognised keys: `background`, `level`,
    /// `text_size`, `thresholds` (object), `role_pairs`, `contrast`,
    /// `distinguishability`, `color_blindness`, `min_distance`,
    /// `simulated_min_contrast`, `simulations`.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        let d = Self::default();
        let role_pairs = match params.get("role_pairs") {
            None | Some(Value::Null) => d.role_pairs,
            Some(v) => parse_role_pairs(v)?,
        };
        let simulations = match params.get("simulations") {
            None | Some(Value::Null) => d.simulations,
            Some(v) => parse_simulations(v)?,
        };
        Ok(Self {
            background: param_color(params, "background", d.background)?,
            level: param_parsed(params, "level", d.level)?,
            text_size: param_parsed(params, "text_size", d.text_size)?,
            thresholds: params
                .get("thresholds")
                .map(WcagThresholds::from_json)
                .unwrap_or(d.thresholds),
            role_pairs,
            check_contrast: param_bool(params, "contrast", d.check_contrast),
            check_distinguishability: param_bool(params, "distinguishability", d.check_distinguishability),
            check_color_blindness: param_bool(params, "color_blindness", d.check_color_blindness),
            min_distance: param_f64(params, "min_distance", d.min_distance),
            simulated_min_contrast: param_f64(params, "simulated_min_contrast", d.simulated_min_contrast),
            simulations,
        })
    }

    /// Contrast ratio the chosen level and text size require.
    pub fn required_ratio(&self) -> f64 {
        self.thresholds.required(self.level, self.text_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    Contrast,
    Distinguishability,
    ColorBlindness,
}

/// A labelled color in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swatch {
    pub label: String,
    pub color: Color,
}

impl Swatch {
    fn of(role_color: &RoleColor) -> Self {
        Self {
            label: role_color.role.to_string(),
            color: role_color.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub check: Check,
    pub first: Swatch,
    pub second: Swatch,
    /// Contrast ratio or CIEDE2000 distance, depending on `check`.
    pub measured: f64,
    pub required: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<ColorBlindness>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<Issue>,
    pub checks_run: Vec<Check>,
    /// Contrast pairs evaluated by the contrast check.
    pub pairs_checked: usize,
    pub pairs_passed: usize,
    pub failing_simulations: Vec<ColorBlindness>,
}

impl ValidationReport {
    /// Share of contrast pairs meeting the requested level; 1.0 when none were checked.
    pub fn contrast_pass_rate(&self) -> f64 {
        if self.pairs_checked == 0 {
            1.0
        } else {
            self.pairs_passed as f64 / self.pairs_checked as f64
        }
    }

    pub fn issues_for(&self, check: Check) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.check == check)
    }
}

fn contrast_pairs(colors: &[RoleColor], options: &ValidationOptions) -> Vec<(Swatch, Swatch)> {
    if options.role_pairs.is_empty() {
        let background = Swatch {
            label: BACKGROUND_LABEL.to_string(),
            color: options.background,
        };
        return colors
            .iter()
            .map(|rc| (Swatch::of(rc), background.clone()))
            .collect();
    }
    let find = |role: Role| colors.iter().find(|rc| rc.role == role);
    options
        .role_pairs
        .iter()
        .filter_map(|pair| match (find(pair.foreground), find(pair.background)) {
            (Some(fg), Some(bg)) => Some((Swatch::of(fg), Swatch::of(bg))),
            _ => {
                tracing::debug!(
                    foreground = %pair.foreground,
                    background = %pair.background,
                    "skipping role pair with a role missing from the palette"
                );
                None
            }
        })
        .collect()
}

/// Runs every enabled check over `colors` and reports all failures.
pub fn validate(colors: &[RoleColor], options: &ValidationOptions) -> ValidationReport {
    let pairs = contrast_pairs(colors, options);
    let mut issues = Vec::new();
    let mut checks_run = Vec::new();
    let mut pairs_checked = 0;
    let mut pairs_passed = 0;
    let mut failing_simulations = Vec::new();

    if options.check_contrast {
        checks_run.push(Check::Contrast);
        let required = options.required_ratio();
        for (fg, bg) in &pairs {
            pairs_checked += 1;
            let ratio = metrics::contrast_ratio(fg.color, bg.color);
            if ratio >= required {
                pairs_passed += 1;
            } else {
                issues.push(Issue {
                    check: Check::Contrast,
                    first: fg.clone(),
                    second: bg.clone(),
                    measured: ratio,
                    required,
                    simulation: None,
                });
            }
        }
    }

    if options.check_distinguishability {
        checks_run.push(Check::Distinguishability);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                if options.role_pairs.iter().any(|p| p.matches(a.role, b.role)) {
                    continue;
                }
                let distance = metrics::perceptual_distance(a.color, b.color);
                if distance < options.min_distance {
                    issues.push(Issue {
                        check: Check::Distinguishability,
                        first: Swatch::of(a),
                        second: Swatch::of(b),
                        measured: distance,
                        required: options.min_distance,
                        simulation: None,
                    });
                }
            }
        }
    }

    if options.check_color_blindness {
        checks_run.push(Check::ColorBlindness);
        for &kind in &options.simulations {
            let mut failed = false;
            for (fg, bg) in &pairs {
                let ratio = metrics::contrast_ratio(
                    simulation::simulate(fg.color, kind),
                    simulation::simulate(bg.color, kind),
                );
                if ratio < options.simulated_min_contrast {
                    failed = true;
                    issues.push(Issue {
                        check: Check::ColorBlindness,
                        first: fg.clone(),
                        second: bg.clone(),
                        measured: ratio,
                        required: options.simulated_min_contrast,
                        simulation: Some(kind),
                    });
                }
            }
            if failed && !failing_simulations.contains(&kind) {
                failing_simulations.push(kind);
            }
        }
    }

    ValidationReport {
        is_valid: issues.is_empty(),
        issues,
        checks_run,
        pairs_checked,
        pairs_passed,
        failing_simulations,
    }
}

/// Largest `max_attempts` an option map may request.
pub const MAX_ADJUSTMENT_ATTEMPTS: usize = 100;

/// Bounds for the contrast adjustment loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentConfig {
    pub max_attempts: usize,
    /// LAB lightness change per attempt.
    pub lightness_step: f64,
}

impl Default for AdjustmentConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            lightness_step: 5.0,
        }
    }
}

impl AdjustmentConfig {
    /// Reads `max_attempts` (at most [`MAX_ADJUSTMENT_ATTEMPTS`]) and
    /// `lightness_step` (in (0, 100]).
    pub fn from_json(params: &Value) -> Result<Self, ValidationError> {
        let d = Self::default();
        Ok(Self {
            max_attempts: param_count(params, "max_attempts", d.max_attempts, MAX_ADJUSTMENT_ATTEMPTS)?,
            lightness_step: param_positive(params, "lightness_step", d.lightness_step, 100.0)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Darken,
    Lighten,
}

impl Direction {
    /// Darken against backgrounds that contrast at least as well with black as with white.
    pub fn against(background: Color) -> Self {
        if metrics::contrast_ratio(background, Color::BLACK)
            >= metrics::contrast_ratio(background, Color::WHITE)
        {
            Direction::Darken
        } else {
            Direction::Lighten
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdjustmentOutcome {
    AlreadyCompliant {
        color: Color,
        ratio: f64,
    },
    Adjusted {
        color: Color,
        ratio: f64,
        attempts: usize,
    },
    GaveUpAfterNAttempts {
        best: Color,
        ratio: f64,
        attempts: usize,
    },
}

impl AdjustmentOutcome {
    /// The color to use: the compliant one, or the best candidate found.
    pub fn color(&self) -> Color {
        match *self {
            AdjustmentOutcome::AlreadyCompliant { color, .. }
            | AdjustmentOutcome::Adjusted { color, .. } => color,
            AdjustmentOutcome::GaveUpAfterNAttempts { best, .. } => best,
        }
    }

    pub fn ratio(&self) -> f64 {
        match *self {
            AdjustmentOutcome::AlreadyCompliant { ratio, .. }
            | AdjustmentOutcome::Adjusted { ratio, .. }
            | AdjustmentOutcome::GaveUpAfterNAttempts { ratio, .. } => ratio,
        }
    }

    pub fn is_compliant(&self) -> bool {
        !matches!(self, AdjustmentOutcome::GaveUpAfterNAttempts { .. })
    }
}

/// Walks `color` away from `background` one lightness step at a time until
/// the contrast reaches `target` or `config.max_attempts` is exhausted.
pub fn adjust_for_contrast(
    color: Color,
    background: Color,
    target: f64,
    config: &AdjustmentConfig,
) -> AdjustmentOutcome {
    let initial = metrics::contrast_ratio(color, background);
    if initial >= target {
        return AdjustmentOutcome::AlreadyCompliant {
            color,
            ratio: initial,
        };
    }

    let direction = Direction::against(background);
    let intensity = config.lightness_step / 100.0;
    let (mut best, mut best_ratio) = (color, initial);
    for attempt in 1..=config.max_attempts {
        let candidate = match direction {
            Direction::Darken => variation::shade_step(color, attempt, intensity),
            Direction::Lighten => variation::tint_step(color, attempt, intensity),
        };
        let ratio = metrics::contrast_ratio(candidate, background);
        if ratio >= target {
            return AdjustmentOutcome::Adjusted {
                color: candidate,
                ratio,
                attempts: attempt,
            };
        }
        if ratio > best_ratio {
            best = candidate;
            best_ratio = ratio;
        }
    }

    tracing::warn!(
        color = %color,
        background = %background,
        target_ratio = target,
        best_ratio,
        attempts = config.max_attempts,
        "contrast target unreachable"
    );
    AdjustmentOutcome::GaveUpAfterNAttempts {
        best,
        ratio: best_ratio,
        attempts: config.max_attempts,
    }
}

/// A contrast fix proposal for one foreground/background pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Remediation {
    pub current_ratio: f64,
    pub target_ratio: f64,
    pub direction: Direction,
    pub outcome: AdjustmentOutcome,
}

pub fn suggest_remediation(
    foreground: Color,
    background: Color,
    target_ratio: f64,
    config: &AdjustmentConfig,
) -> Remediation {
    Remediation {
        current_ratio: metrics::contrast_ratio(foreground, background),
        target_ratio,
        direction: Direction::against(background),
        outcome: adjust_for_contrast(foreground, background, target_ratio, config),
    }
}

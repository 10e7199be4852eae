#![deny(unsafe_code)]
//! CLI binary for the chroma-engine color science library.
//!
//! Subcommands:
//! - `parse <color>`: canonical hex plus every (or one) color space
//! - `contrast <fg> <bg>`: WCAG ratio and compliance
//! - `distance <a> <b>`: CIEDE2000, CIE76 and W3C visibility
//! - `harmony <color> <type>`: harmony colors
//! - `variations <color>`: tint/shade/tone families
//! - `simulate <color>`: color-blindness simulation
//! - `validate <colors...>`: accessibility report
//! - `palette <color>`: full palette assembly
//! - `list`: print harmony types, size classes, spaces and simulations

mod error;

use chroma_engine_core::accessibility;
use chroma_engine_core::metrics;
use chroma_engine_core::palette;
use chroma_engine_core::simulation;
use chroma_engine_core::variation;
use chroma_engine_core::wcag::{self, WcagThresholds};
use chroma_engine_core::{
    AssemblyContext, Color, ColorBlindness, ColorSpace, HarmonyRequest, HarmonyType, Role,
    RoleColor, SemanticRole, SizeClass, TextSize, ValidationOptions, VariationOptions,
};
use clap::{Parser, Subcommand};
use error::CliError;
use serde_json::{json, Value};
use std::process;

#[derive(Parser)]
#[command(name = "chroma-engine", about = "Color science engine CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a color literal and show it in every color space.
    Parse {
        /// Color literal (#RGB, #RRGGBB, rgb(...), hsl(...)).
        color: String,

        /// Only show this space (rgb, hsl, hsv, lab, xyz, cmyk).
        #[arg(long)]
        space: Option<String>,
    },
    /// WCAG contrast ratio and compliance of a foreground/background pair.
    Contrast {
        foreground: String,
        background: String,

        /// Evaluate for large text.
        #[arg(long)]
        large: bool,

        /// Threshold overrides as a JSON string (aa_normal, aaa_large, ...).
        #[arg(long, default_value = "{}")]
        options: String,
    },
    /// Perceptual distance between two colors.
    Distance { first: String, second: String },
    /// Generate harmony colors from a base color.
    Harmony {
        color: String,

        /// Harmony type (e.g. "triadic", "split-complementary").
        harmony: String,

        /// Number of colors; defaults to the harmony's natural count.
        #[arg(short, long)]
        count: Option<usize>,

        /// Expansion options as a JSON string (expand, intensity).
        #[arg(long, default_value = "{}")]
        options: String,
    },
    /// Generate tint/shade/tone variation families.
    Variations {
        color: String,

        /// Variation options as a JSON string.
        #[arg(long, default_value = "{}")]
        options: String,
    },
    /// Show how a color appears under color-vision deficiencies.
    Simulate {
        color: String,

        /// Only this simulation (protanopia, deuteranopia, tritanopia, achromatopsia).
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// Validate a set of colors for accessibility, labelled by role in order.
    Validate {
        #[arg(required = true)]
        colors: Vec<String>,

        /// Validation options as a JSON string.
        #[arg(long, default_value = "{}")]
        options: String,
    },
    /// Assemble a complete, contrast-adjusted palette.
    Palette {
        color: String,

        #[arg(long, default_value = "complementary")]
        harmony: String,

        /// Size class (minimal, standard, extended, complete).
        #[arg(short, long, default_value = "standard")]
        size: String,

        /// Assembly options as a JSON string.
        #[arg(long, default_value = "{}")]
        options: String,
    },
    /// List harmony types, size classes, color spaces and simulations.
    List,
}

fn parse_options(options: &str) -> Result<Value, CliError> {
    let value: Value = serde_json::from_str(options)
        .map_err(|e| CliError::Input(format!("invalid --options JSON: {e}")))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(CliError::Input(format!(
            "invalid --options JSON: expected an object, got {value}"
        )))
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn hex_list(colors: &[Color]) -> String {
    colors
        .iter()
        .map(|c| c.to_hex())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every distance measure between two colors, computed once for both output modes.
#[derive(Debug, serde::Serialize)]
struct DistanceReport {
    first: Color,
    second: Color,
    ciede2000: f64,
    cie76: f64,
    brightness_difference: f64,
    color_difference: u32,
    sufficient_visibility: bool,
}

impl DistanceReport {
    fn new(first: Color, second: Color) -> Self {
        Self {
            first,
            second,
            ciede2000: metrics::perceptual_distance(first, second),
            cie76: metrics::cie76_distance(first, second),
            brightness_difference: metrics::brightness_difference(first, second),
            color_difference: metrics::color_difference(first, second),
            sufficient_visibility: metrics::has_sufficient_visibility(first, second),
        }
    }

    fn summary(&self) -> String {
        format!(
            "{} vs {}: ΔE00 {:.4}  ΔE76 {:.4}  visible {}",
            self.first, self.second, self.ciede2000, self.cie76, self.sufficient_visibility
        )
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let harmonies: Vec<&str> = HarmonyType::ALL.iter().map(|h| h.as_str()).collect();
            let sizes: Vec<String> = SizeClass::ALL
                .iter()
                .map(|s| format!("{s} ({})", s.count()))
                .collect();
            let spaces: Vec<&str> = ColorSpace::ALL.iter().map(|s| s.as_str()).collect();
            let simulations: Vec<&str> = ColorBlindness::ALL.iter().map(|k| k.as_str()).collect();
            let semantic: Vec<&str> = SemanticRole::ALL.iter().map(|r| r.as_str()).collect();
            if cli.json {
                print_json(&json!({
                    "harmony_types": harmonies,
                    "size_classes": SizeClass::ALL,
                    "color_spaces": spaces,
                    "simulations": simulations,
                    "semantic_roles": semantic,
                }))?;
            } else {
                println!("Harmony types:\n  {}", harmonies.join(", "));
                println!("Size classes:\n  {}", sizes.join(", "));
                println!("Color spaces:\n  {}", spaces.join(", "));
                println!("Simulations:\n  {}", simulations.join(", "));
                println!("Semantic roles:\n  {}", semantic.join(", "));
            }
        }
        Command::Parse { color, space } => {
            let color = Color::parse(&color)?;
            let spaces = match space {
                Some(name) => vec![name.parse::<ColorSpace>()?],
                None => ColorSpace::ALL.to_vec(),
            };
            let values: Vec<_> = spaces.iter().map(|&s| color.to_space(s)).collect();
            if cli.json {
                print_json(&json!({ "hex": color, "spaces": values }))?;
            } else {
                println!("{color}");
                for value in &values {
                    println!("  {:<5} {}", value.space().as_str(), serde_json::to_string(value)?);
                }
            }
        }
        Command::Contrast {
            foreground,
            background,
            large,
            options,
        } => {
            let thresholds = WcagThresholds::from_json(&parse_options(&options)?);
            let fg = Color::parse(&foreground)?;
            let bg = Color::parse(&background)?;
            let result = wcag::evaluate_with(fg, bg, TextSize::from_large(large), &thresholds);
            if cli.json {
                print_json(&result)?;
            } else {
                println!("{fg} on {bg}: {:.2}:1 ({})", result.ratio(), result.level());
                println!(
                    "  AA normal {}  AA large {}  AAA normal {}  AAA large {}",
                    result.passes_aa_normal(),
                    result.passes_aa_large(),
                    result.passes_aaa_normal(),
                    result.passes_aaa_large()
                );
            }
        }
        Command::Distance { first, second } => {
            let report = DistanceReport::new(Color::parse(&first)?, Color::parse(&second)?);
            if cli.json {
                print_json(&report)?;
            } else {
                println!("{}", report.summary());
            }
        }
        Command::Harmony {
            color,
            harmony,
            count,
            options,
        } => {
            let harmony_type: HarmonyType = harmony.parse()?;
            let count = count.unwrap_or_else(|| harmony_type.min_count());
            let request = HarmonyRequest::new(Color::parse(&color)?, harmony_type, count)
                .with_options(parse_options(&options)?);
            let colors = request.generate()?;
            if cli.json {
                print_json(&json!({ "request": request, "colors": colors }))?;
            } else {
                println!("{harmony_type} ({count}): {}", hex_list(&colors));
            }
        }
        Command::Variations { color, options } => {
            let options = VariationOptions::from_json(&parse_options(&options)?)?;
            let variations = variation::generate_variations(Color::parse(&color)?, &options);
            if cli.json {
                print_json(&variations)?;
            } else {
                println!("base        {}", variations.base);
                let families = [
                    ("tints", &variations.tints),
                    ("shades", &variations.shades),
                    ("tones", &variations.tones),
                    ("saturated", &variations.saturated),
                    ("desaturated", &variations.desaturated),
                    ("neutrals", &variations.neutrals),
                    ("warm", &variations.warm),
                    ("cool", &variations.cool),
                ];
                for (name, colors) in families {
                    println!("{name:<11} {}", hex_list(colors));
                }
                if let Some(semantic) = &variations.semantic {
                    for (role, c) in semantic {
                        println!("{:<11} {c}", role.as_str());
                    }
                }
            }
        }
        Command::Simulate { color, kind } => {
            let color = Color::parse(&color)?;
            let kinds = match kind {
                Some(name) => vec![name.parse::<ColorBlindness>()?],
                None => ColorBlindness::ALL.to_vec(),
            };
            let simulated: Vec<(ColorBlindness, Color)> = kinds
                .into_iter()
                .map(|k| (k, simulation::simulate(color, k)))
                .collect();
            if cli.json {
                let map: serde_json::Map<String, Value> = simulated
                    .iter()
                    .map(|(k, c)| (k.to_string(), json!(c)))
                    .collect();
                print_json(&json!({ "color": color, "simulations": map }))?;
            } else {
                println!("{color}");
                for (k, c) in simulated {
                    println!("  {:<28} {c}", k.label());
                }
            }
        }
        Command::Validate { colors, options } => {
            let options = ValidationOptions::from_json(&parse_options(&options)?)?;
            let role_colors = colors
                .iter()
                .enumerate()
                .map(|(i, text)| -> Result<RoleColor, CliError> {
                    Ok(RoleColor {
                        role: Role::for_index(i),
                        color: Color::parse(text)?,
                    })
                })
                .collect::<Result<Vec<_>, CliError>>()?;
            let report = accessibility::validate(&role_colors, &options);
            if cli.json {
                print_json(&report)?;
            } else {
                println!(
                    "{}: {}/{} contrast pairs pass",
                    if report.is_valid { "valid" } else { "invalid" },
                    report.pairs_passed,
                    report.pairs_checked
                );
                for issue in &report.issues {
                    let under = issue
                        .simulation
                        .map(|k| format!(" under {k}"))
                        .unwrap_or_default();
                    println!(
                        "  {:?}: {} {} vs {} {}{under}: {:.2} < {:.2}",
                        issue.check,
                        issue.first.label,
                        issue.first.color,
                        issue.second.label,
                        issue.second.color,
                        issue.measured,
                        issue.required
                    );
                }
            }
        }
        Command::Palette {
            color,
            harmony,
            size,
            options,
        } => {
            let context = AssemblyContext::from_json(&parse_options(&options)?)?;
            let harmony_type: HarmonyType = harmony.parse()?;
            let size_class: SizeClass = size.parse()?;
            let assembled = palette::assemble(&color, harmony_type, size_class, &context)?;
            if cli.json {
                print_json(&assembled)?;
            } else {
                let meta = assembled.metadata();
                for rc in assembled.colors() {
                    println!("{:<10} {}", rc.role.to_string(), rc.color);
                }
                println!(
                    "harmony {:.2}  accessibility {:.2}  distinctiveness {:.2}  balance {:.2}",
                    meta.harmony_score,
                    meta.accessibility_score,
                    meta.distinctiveness,
                    meta.balance.balance_score
                );
                for adj in &meta.adjustments {
                    eprintln!(
                        "adjusted {} {} -> {} ({:.2}:1 after {} attempts)",
                        adj.role, adj.original, adj.adjusted, adj.ratio, adj.attempts
                    );
                }
                for s in &meta.shortfalls {
                    eprintln!(
                        "shortfall {} {}: best {} reaches {:.2}:1 of {:.2}:1",
                        s.role, s.original, s.best, s.ratio, s.required
                    );
                }
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

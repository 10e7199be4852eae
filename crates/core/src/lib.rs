#![deny(unsafe_code)]
//! Core of the chroma-engine color science system.
//!
//! Provides the `Color` value and its literal parser, conversions between
//! RGB/HSL/HSV/XYZ/LAB/LCh/CMYK, perceptual metrics (WCAG luminance and
//! contrast, CIEDE2000), WCAG compliance, harmony generation, tint/shade/tone
//! variations, color-blindness simulation, accessibility validation and
//! palette assembly. Every operation is a pure function of its inputs.

pub mod accessibility;
pub mod color;
pub mod error;
pub mod harmony;
pub mod metrics;
pub mod palette;
pub mod params;
pub mod parse;
pub mod simulation;
pub mod space;
pub mod variation;
pub mod wcag;

pub use accessibility::{AdjustmentConfig, AdjustmentOutcome, ValidationOptions, ValidationReport};
pub use color::Color;
pub use error::{EngineError, ParseError, ValidationError};
pub use harmony::{HarmonyRequest, HarmonyType};
pub use palette::{AssemblyContext, Palette, Role, RoleColor, SizeClass};
pub use simulation::ColorBlindness;
pub use space::{ColorSpace, ColorSpaceValue};
pub use variation::{SemanticRole, VariationOptions, Variations};
pub use wcag::{ContrastResult, TextSize, WcagLevel};

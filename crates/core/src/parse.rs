//! Color literal parsing.
//!
//! Three grammars are accepted, all surrounding whitespace ignored:
//!
//! - hex: `#RGB` or `#RRGGBB`, the `#` optional, case-insensitive
//! - `rgb(r, g, b)` with integer components in 0..=255
//! - `hsl(h, s%, l%)` with any finite hue (wrapped modulo 360) and
//!   saturation/lightness in 0..=100, the `%` suffix optional
//!
//! Out-of-range components are rejected rather than clamped.

use crate::color::Color;
use crate::error::ParseError;
use crate::space::{self, Hsl};

/// Parses a color literal in any supported grammar.
pub fn parse(text: &str) -> Result<Color, ParseError> {
    let trimmed = text.trim();
    let lower = trimmed.to_ascii_lowercase();

    if let Some(args) = function_args(&lower, "rgb") {
        return parse_rgb(text, args);
    }
    if let Some(args) = function_args(&lower, "hsl") {
        return parse_hsl(text, args);
    }
    Color::from_hex(trimmed).map_err(|_| ParseError::invalid_format(text))
}

/// Returns the comma-separated argument text of `name(...)`, if `lower` has that shape.
fn function_args<'a>(lower: &'a str, name: &str) -> Option<&'a str> {
    lower
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn split_components<'a>(input: &str, args: &'a str) -> Result<[&'a str; 3], ParseError> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [a, b, c] if !a.is_empty() && !b.is_empty() && !c.is_empty() => Ok([*a, *b, *c]),
        _ => Err(ParseError::invalid_format(input)),
    }
}

fn parse_rgb(input: &str, args: &str) -> Result<Color, ParseError> {
    let [r, g, b] = split_components(input, args)?;
    let channel = |part: &str, component: &'static str| -> Result<u8, ParseError> {
        let out_of_range = |value: f64| ParseError::OutOfRange {
            input: input.to_string(),
            component,
            value,
            min: 0.0,
            max: 255.0,
        };
        match part.parse::<i64>() {
            Ok(value) => u8::try_from(value).map_err(|_| out_of_range(value as f64)),
            // an integer too long for i64 is still an integer
            Err(_) if is_integer(part) => Err(out_of_range(part.parse::<f64>().unwrap_or(f64::INFINITY))),
            Err(_) => Err(ParseError::invalid_format(input)),
        }
    };
    Ok(Color::new(
        channel(r, "red")?,
        channel(g, "green")?,
        channel(b, "blue")?,
    ))
}

/// An optionally signed, non-empty run of ASCII digits.
fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix(|c| c == '+' || c == '-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_hsl(input: &str, args: &str) -> Result<Color, ParseError> {
    let [h, s, l] = split_components(input, args)?;
    let number = |part: &str| -> Result<f64, ParseError> {
        part.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ParseError::invalid_format(input))
    };
    let percent = |part: &str, component: &'static str| -> Result<f64, ParseError> {
        let digits = part.strip_suffix('%').map(str::trim_end).unwrap_or(part);
        let value = number(digits)?;
        if !(0.0..=100.0).contains(&value) {
            return Err(ParseError::OutOfRange {
                input: input.to_string(),
                component,
                value,
                min: 0.0,
                max: 100.0,
            });
        }
        Ok(value)
    };

    let hue = space::normalize_hue(number(h)?);
    let saturation = percent(s, "saturation")?;
    let lightness = percent(l, "lightness")?;
    Ok(space::hsl_to_rgb(Hsl {
        h: hue,
        s: saturation,
        l: lightness,
    }))
}

//! Error types for the chroma-engine core.

use thiserror::Error;

/// Grammar description shown when a literal matches no supported format.
pub const EXPECTED_GRAMMAR: &str = "#RGB, #RRGGBB, rgb(r, g, b) or hsl(h, s%, l%)";

/// Errors produced while parsing a color literal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The literal matched none of the supported grammars.
    #[error("invalid color format '{input}': expected {expected}")]
    InvalidFormat {
        input: String,
        expected: &'static str,
    },

    /// A numeric component was syntactically valid but outside its bounds.
    #[error("{component} component {value} out of range [{min}, {max}] in '{input}'")]
    OutOfRange {
        input: String,
        component: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl ParseError {
    pub(crate) fn invalid_format(input: &str) -> Self {
        ParseError::InvalidFormat {
            input: input.to_string(),
            expected: EXPECTED_GRAMMAR,
        }
    }
}

/// Errors produced while validating a generation request or option map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The harmony type name is not one of the known harmony rules.
    #[error("invalid harmony type '{0}': expected one of monochromatic, analogous, complementary, split_complementary, triadic, tetradic, square, compound")]
    InvalidHarmonyType(String),

    /// The requested color count cannot be produced by the harmony rule.
    #[error("invalid count {count} for {harmony} harmony: {reason}")]
    InvalidCount {
        harmony: String,
        count: usize,
        reason: String,
    },

    /// An option held a value outside its enumerated set.
    #[error("invalid value '{value}' for option '{option}': expected {expected}")]
    InvalidOption {
        option: String,
        value: String,
        expected: String,
    },
}

/// Umbrella error for operations that both parse and validate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_format_includes_literal_and_grammar() {
        let err = ParseError::invalid_format("#12");
        let msg = format!("{err}");
        assert!(msg.contains("#12"), "missing literal in: {msg}");
        assert!(msg.contains("rgb(r, g, b)"), "missing grammar in: {msg}");
    }

    #[test]
    fn out_of_range_includes_component_value_and_bounds() {
        let err = ParseError::OutOfRange {
            input: "rgb(300, 0, 0)".into(),
            component: "red",
            value: 300.0,
            min: 0.0,
            max: 255.0,
        };
        let msg = format!("{err}");
        assert!(msg.contains("red"), "missing component in: {msg}");
        assert!(msg.contains("300"), "missing value in: {msg}");
        assert!(msg.contains("255"), "missing bound in: {msg}");
        assert!(msg.contains("rgb(300, 0, 0)"), "missing literal in: {msg}");
    }

    #[test]
    fn invalid_harmony_type_includes_name() {
        let err = ValidationError::InvalidHarmonyType("pentadic".into());
        let msg = format!("{err}");
        assert!(msg.contains("pentadic"), "missing name in: {msg}");
        assert!(msg.contains("triadic"), "missing alternatives in: {msg}");
    }

    #[test]
    fn invalid_count_includes_all_fields() {
        let err = ValidationError::InvalidCount {
            harmony: "triadic".into(),
            count: 1,
            reason: "requires at least 3 colors".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("triadic"), "missing harmony in: {msg}");
        assert!(msg.contains('1'), "missing count in: {msg}");
        assert!(msg.contains("at least 3"), "missing reason in: {msg}");
    }

    #[test]
    fn invalid_option_includes_option_and_value() {
        let err = ValidationError::InvalidOption {
            option: "level".into(),
            value: "AAAA".into(),
            expected: "AA or AAA".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("level"), "missing option in: {msg}");
        assert!(msg.contains("AAAA"), "missing value in: {msg}");
    }

    #[test]
    fn engine_error_is_transparent_over_sources() {
        let err: EngineError = ParseError::invalid_format("nope").into();
        assert!(format!("{err}").contains("nope"));
        let err: EngineError = ValidationError::InvalidHarmonyType("x".into()).into();
        assert!(format!("{err}").contains("'x'"));
    }

    #[test]
    fn errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParseError>();
        assert_send_sync::<ValidationError>();
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<ParseError>();
        assert_std_error::<ValidationError>();
        assert_std_error::<EngineError>();
    }
}

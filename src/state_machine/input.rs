//! Input normalization and validation helpers
//!
//! Parsing never panics. A bad value is reported as a `ValidationError`, which
//! the transition function turns into a re-prompt.

use std::num::IntErrorKind;
use thiserror::Error;

/// Why a customer's text was not accepted for the current step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("input is empty")]
    Empty,
    #[error("input is not a whole number")]
    NotAnInteger,
    #[error("number is out of range")]
    OutOfRange,
}

/// Strip surrounding whitespace; everything else is kept verbatim
pub fn normalize(raw: &str) -> &str {
    raw.trim()
}

/// Parse a whole number. Fractions, separators and trailing text are rejected.
pub fn parse_integer(input: &str) -> Result<i64, ValidationError> {
    let input = normalize(input);
    if input.is_empty() {
        return Err(ValidationError::Empty);
    }
    input.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ValidationError::OutOfRange,
        _ => ValidationError::NotAnInteger,
    })
}

/// A strictly positive integer that fits the quantity/selection width
pub fn parse_positive(input: &str) -> Result<u32, ValidationError> {
    let value = parse_integer(input)?;
    if value <= 0 {
        return Err(ValidationError::OutOfRange);
    }
    u32::try_from(value).map_err(|_| ValidationError::OutOfRange)
}

/// Non-empty free text
pub fn require_text(input: &str) -> Result<&str, ValidationError> {
    let input = normalize(input);
    if input.is_empty() {
        Err(ValidationError::Empty)
    } else {
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_accepts_whole_numbers() {
        assert_eq!(parse_integer("3"), Ok(3));
        assert_eq!(parse_integer("  42 "), Ok(42));
        assert_eq!(parse_integer("-7"), Ok(-7));
        assert_eq!(parse_integer("0"), Ok(0));
    }

    #[test]
    fn test_parse_integer_rejects_malformed() {
        assert_eq!(parse_integer("3.0"), Err(ValidationError::NotAnInteger));
        assert_eq!(parse_integer("1,000"), Err(ValidationError::NotAnInteger));
        assert_eq!(parse_integer("two"), Err(ValidationError::NotAnInteger));
        assert_eq!(parse_integer("3 bags"), Err(ValidationError::NotAnInteger));
        assert_eq!(parse_integer(""), Err(ValidationError::Empty));
        assert_eq!(parse_integer("   "), Err(ValidationError::Empty));
    }

    #[test]
    fn test_parse_integer_overflow_is_out_of_range() {
        assert_eq!(
            parse_integer("99999999999999999999"),
            Err(ValidationError::OutOfRange)
        );
    }

    #[test]
    fn test_parse_positive_bounds() {
        assert_eq!(parse_positive("1"), Ok(1));
        assert_eq!(parse_positive("0"), Err(ValidationError::OutOfRange));
        assert_eq!(parse_positive("-3"), Err(ValidationError::OutOfRange));
        assert_eq!(
            parse_positive("4294967296"),
            Err(ValidationError::OutOfRange)
        );
        assert_eq!(parse_positive("4294967295"), Ok(u32::MAX));
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("  Nairobi CBD "), Ok("Nairobi CBD"));
        assert_eq!(require_text("\t\n"), Err(ValidationError::Empty));
    }
}

//! Exact rational numbers used by every stage of the solver.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Num, One, Zero};
use thiserror::Error;

/// Arbitrary precision fraction, always kept in lowest terms.
pub type Rational = BigRational;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseRationalError {
    #[error("Empty number literal")]
    Empty,
    #[error("Invalid number: {0}")]
    Invalid(String),
    #[error("Zero denominator in {0}")]
    ZeroDenominator(String),
}

pub fn rational(value: i64) -> Rational {
    BigRational::from_integer(BigInt::from(value))
}

/// Builds `numer / denom`.
///
/// Panics if `denom` is zero.
pub fn ratio(numer: i64, denom: i64) -> Rational {
    BigRational::new(BigInt::from(numer), BigInt::from(denom))
}

/// Largest decimal exponent accepted, as in `1e4096`
const MAX_EXPONENT: u32 = 4096;

/// Parses `7`, `-3`, `3/4`, `-3/4`, a decimal such as `1.25`, or one with an
/// exponent such as `-1.5e-3`.
///
/// Decimals are converted exactly, so `0.1` is `1/10`.
pub fn parse_rational(text: &str) -> Result<Rational, ParseRationalError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseRationalError::Empty);
    }

    if let Some((numer, denom)) = text.split_once('/') {
        let numer = parse_decimal(numer.trim(), text)?;
        let denom = parse_decimal(denom.trim(), text)?;
        if denom.is_zero() {
            return Err(ParseRationalError::ZeroDenominator(text.to_string()));
        }
        return Ok(numer / denom);
    }

    parse_decimal(text, text)
}

fn parse_decimal(part: &str, whole: &str) -> Result<Rational, ParseRationalError> {
    let invalid = || ParseRationalError::Invalid(whole.to_string());

    let (part, exponent) = match part.find(['e', 'E']) {
        Some(at) => {
            let exponent: i32 = part[at + 1..].parse().map_err(|_| invalid())?;
            if exponent.unsigned_abs() > MAX_EXPONENT {
                return Err(invalid());
            }
            (&part[..at], exponent)
        }
        None => (part, 0),
    };

    let (negative, unsigned) = match part.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, part.strip_prefix('+').unwrap_or(part)),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }

    let digits = format!("{int_part}{frac_part}");
    let numer = BigInt::from_str_radix(&digits, 10).map_err(|_| invalid())?;
    let denom = num_traits::pow(BigInt::from(10), frac_part.len());
    let mut value = BigRational::new(numer, denom);

    let scale = BigRational::from_integer(num_traits::pow(BigInt::from(10), exponent.unsigned_abs() as usize));
    if exponent >= 0 {
        value *= scale;
    } else {
        value /= scale;
    }

    Ok(if negative { -value } else { value })
}

/// Renders `n` when the denominator is 1, otherwise `n/d`.
pub fn fraction_to_text(value: &Rational) -> String {
    if value.denom().is_one() {
        value.numer().to_string()
    } else {
        format!("{}/{}", value.numer(), value.denom())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integers_and_fractions() {
        assert_eq!(parse_rational("7").unwrap(), rational(7));
        assert_eq!(parse_rational("-3").unwrap(), rational(-3));
        assert_eq!(parse_rational("3/4").unwrap(), ratio(3, 4));
        assert_eq!(parse_rational(" -6/8 ").unwrap(), ratio(-3, 4));
        assert_eq!(parse_rational("3/-4").unwrap(), ratio(-3, 4));
    }

    #[test]
    fn test_parse_decimals_exactly() {
        assert_eq!(parse_rational("1.25").unwrap(), ratio(5, 4));
        assert_eq!(parse_rational("0.1").unwrap(), ratio(1, 10));
        assert_eq!(parse_rational("-.5").unwrap(), ratio(-1, 2));
        assert_eq!(parse_rational("2.").unwrap(), rational(2));
    }

    #[test]
    fn test_parse_exponents() {
        assert_eq!(parse_rational("1.5e3").unwrap(), rational(1500));
        assert_eq!(parse_rational("2E-2").unwrap(), ratio(1, 50));
        assert_eq!(parse_rational("-25e+1").unwrap(), rational(-250));
        assert_eq!(parse_rational("1e0").unwrap(), rational(1));
        assert!(matches!(parse_rational("1e"), Err(ParseRationalError::Invalid(_))));
        assert!(matches!(parse_rational("e5"), Err(ParseRationalError::Invalid(_))));
        assert!(matches!(parse_rational("1e1.5"), Err(ParseRationalError::Invalid(_))));
        assert!(matches!(parse_rational("1e99999"), Err(ParseRationalError::Invalid(_))));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_rational(""), Err(ParseRationalError::Empty));
        assert!(matches!(parse_rational("abc"), Err(ParseRationalError::Invalid(_))));
        assert!(matches!(parse_rational("."), Err(ParseRationalError::Invalid(_))));
        assert!(matches!(parse_rational("1/0"), Err(ParseRationalError::ZeroDenominator(_))));
        assert!(matches!(parse_rational("1.2.3"), Err(ParseRationalError::Invalid(_))));
    }

    #[test]
    fn test_fraction_to_text() {
        assert_eq!(fraction_to_text(&rational(6)), "6");
        assert_eq!(fraction_to_text(&ratio(7, 3)), "7/3");
        assert_eq!(fraction_to_text(&ratio(-4, 6)), "-2/3");
        assert_eq!(fraction_to_text(&ratio(0, 5)), "0");
    }
}

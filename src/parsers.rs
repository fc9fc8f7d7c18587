//! The `Parse` trait for attribute values, and utilities for parsers.

use cssparser::{Parser, ParserInput, Token};

use crate::element::AttributeId;
use crate::error::*;

/// Trait to parse values using `cssparser::Parser`.
pub trait Parse: Sized {
    /// Parses a value out of the `parser`.
    ///
    /// All value types should implement this for composability.
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>>;

    /// Convenience function to parse a value out of a `&str`.
    ///
    /// The whole string must be consumed; trailing garbage is an error.
    fn parse_str(s: &str) -> Result<Self, ParseError<'_>> {
        let mut input = ParserInput::new(s);
        let mut parser = Parser::new(&mut input);

        let res = Self::parse(&mut parser)?;
        parser.expect_exhausted()?;

        Ok(res)
    }
}

/// Consumes a comma if it exists, or does nothing.
pub fn optional_comma(parser: &mut Parser<'_, '_>) {
    let _ = parser.try_parse(|p| p.expect_comma());
}

pub trait ParseValue<T: Parse> {
    /// Parses a whole attribute `value` into a type `T`.
    fn parse(&self, value: &str) -> Result<T, ElementError>;
}

impl<T: Parse> ParseValue<T> for AttributeId {
    fn parse(&self, value: &str) -> Result<T, ElementError> {
        T::parse_str(value).attribute(*self)
    }
}

impl Parse for f64 {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        let loc = parser.current_source_location();
        let n = parser.expect_number()?;
        if n.is_finite() {
            Ok(f64::from(n))
        } else {
            Err(loc.new_custom_error(ValueErrorKind::value_error("expected finite number")))
        }
    }
}

/// A number or a percentage, clamped to `[0, 1]`.
///
/// Used for `opacity`, `fill-opacity`, `stroke-opacity`, `stop-opacity` and
/// stop `offset`.  `50%` and `0.5` are the same value; out-of-range values
/// are clamped instead of rejected.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct UnitInterval(pub f64);

impl UnitInterval {
    pub fn clamp(val: f64) -> UnitInterval {
        UnitInterval(val.clamp(0.0, 1.0))
    }
}

impl Parse for UnitInterval {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        let loc = parser.current_source_location();

        let v = match *parser.next()? {
            Token::Number { value, .. } => f64::from(value),
            Token::Percentage { unit_value, .. } => f64::from(unit_value),
            ref t => return Err(loc.new_unexpected_token_error(t.clone())),
        };

        if v.is_finite() {
            Ok(UnitInterval::clamp(v))
        } else {
            Err(loc.new_custom_error(ValueErrorKind::value_error("expected finite number")))
        }
    }
}

/// Parses up to `N` numbers separated by whitespace and optional commas.
///
/// Returns the numbers and how many were found.  Parsing stops at the first token that
/// is not a number, so the caller decides whether the count and the rest of the input
/// are acceptable.
pub fn parse_numbers<'i, const N: usize>(
    parser: &mut Parser<'i, '_>,
) -> Result<([f64; N], usize), ParseError<'i>> {
    let mut numbers = [0.0; N];

    if N == 0 {
        return Ok((numbers, 0));
    }

    numbers[0] = f64::parse(parser)?;
    let mut count = 1;

    while count < N {
        let next = parser.try_parse(|p| {
            optional_comma(p);
            f64::parse(p)
        });

        match next {
            Ok(n) => {
                numbers[count] = n;
                count += 1;
            }
            Err(_) => break,
        }
    }

    Ok((numbers, count))
}

/// Parses a list of identifiers from a `cssparser::Parser`
///
/// Keywords in SVG attributes are case-sensitive, so the identifiers must
/// match exactly.
///
/// # Example
///
/// ```
/// # #[macro_use] extern crate minisvg;
/// # use cssparser::{ParserInput, Parser};
/// # fn main() -> Result<(), cssparser::BasicParseError<'static>> {
/// # let mut input = ParserInput::new("true");
/// # let mut parser = Parser::new(&mut input);
/// let my_boolean = parse_identifiers!(
///     parser,
///     "true" => true,
///     "false" => false,
/// )?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! parse_identifiers {
    ($parser:expr,
     $($str:expr => $val:expr,)+) => {
        {
            let loc = $parser.current_source_location();
            let token = $parser.next()?;

            match token {
                $(cssparser::Token::Ident(ref cow) if cow.as_ref() == $str => Ok($val),)+

                _ => Err(loc.new_basic_unexpected_token_error(token.clone()))
            }
        }
    };
}

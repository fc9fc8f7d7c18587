//! Length values.
//!
//! [`CssLength`] is the struct we use to represent lengths in attributes like
//! `x`, `width` or `stroke-width`.
//!
//! A length needs to know whether it will be normalized with respect to the width,
//! height, or both dimensions of the current viewport, and whether it may be
//! negative.  So, a `CssLength` has two type parameters, [`Normalize`] and
//! [`Validate`]; the full type is `CssLength<N: Normalize, V: Validate>`.  We
//! provide [`Horizontal`], [`Vertical`], and [`Both`] implementations of
//! [`Normalize`], and [`Signed`] and [`Unsigned`] implementations of [`Validate`].
//!
//! For ease of use, we define two type aliases [`Length`] and [`ULength`]
//! corresponding to signed and unsigned.  For example, a circle has
//!
//! ```
//! # use minisvg::doctest_only::{Length,ULength,Horizontal,Vertical,Both};
//! pub struct Circle {
//!     cx: Length<Horizontal>,
//!     cy: Length<Vertical>,
//!     r: ULength<Both>,
//! }
//! ```
//!
//! Physical units are converted to pixels at a fixed 96 DPI.  Percentages are
//! resolved against the current viewport by [`CssLength::normalize`], or against
//! an arbitrary reference size by [`CssLength::resolve`].

use cssparser::{Parser, Token};
use std::f64::consts::*;
use std::marker::PhantomData;

use crate::drawing_ctx::ViewParams;
use crate::error::*;
use crate::parsers::Parse;

/// Units for length values.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum LengthUnit {
    /// `1.0` means 100%
    Percent,

    /// Pixels, or the default unit
    Px,

    /// Inches (25.4 mm)
    In,

    /// Centimeters
    Cm,

    /// Millimeters
    Mm,

    /// Points (1/72 inch)
    Pt,

    /// Picas (12 points)
    Pc,
}

/// Used for the `N` type parameter of `CssLength<N: Normalize, V: Validate>`.
pub trait Normalize {
    /// Computes an orientation-based scaling factor.
    ///
    /// Percentages are resolved with respect to the width, height, or
    /// [normalized diagonal][diag] of the current viewport.
    ///
    /// [diag]: https://www.w3.org/TR/SVG/coords.html#Units
    fn normalize(x: f64, y: f64) -> f64;
}

/// Allows declaring `CssLength<Horizontal>`.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Horizontal;

/// Allows declaring `CssLength<Vertical>`.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Vertical;

/// Allows declaring `CssLength<Both>`.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Both;

impl Normalize for Horizontal {
    #[inline]
    fn normalize(x: f64, _y: f64) -> f64 {
        x
    }
}

impl Normalize for Vertical {
    #[inline]
    fn normalize(_x: f64, y: f64) -> f64 {
        y
    }
}

impl Normalize for Both {
    #[inline]
    fn normalize(x: f64, y: f64) -> f64 {
        viewport_percentage(x, y)
    }
}

/// Used for the `V` type parameter of `CssLength<N: Normalize, V: Validate>`.
pub trait Validate {
    /// Checks if the specified value is acceptable
    ///
    /// This is used when parsing a length value
    fn validate(v: f64) -> Result<f64, ValueErrorKind> {
        Ok(v)
    }
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Signed;

impl Validate for Signed {}

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Unsigned;

impl Validate for Unsigned {
    fn validate(v: f64) -> Result<f64, ValueErrorKind> {
        if v >= 0.0 {
            Ok(v)
        } else {
            Err(ValueErrorKind::Value(
                "value must be non-negative".to_string(),
            ))
        }
    }
}

/// A length value with its unit.
///
/// This type will be normally used through the type aliases [`Length`] and [`ULength`].
///
/// ```
/// # use minisvg::doctest_only::{Length,ULength,LengthUnit,Horizontal,Vertical,Both};
/// # use minisvg::doctest_only::Parse;
/// // Explicit type
/// let width: Length<Horizontal> = Length::new(42.0, LengthUnit::Cm);
///
/// // Parsed
/// let radius = ULength::<Both>::parse_str("5px").unwrap();
/// ```
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct CssLength<N: Normalize, V: Validate> {
    /// Numeric part of the length
    pub length: f64,

    /// Unit part of the length
    pub unit: LengthUnit,

    /// Dummy; used internally for the type parameter `N`
    orientation: PhantomData<N>,

    /// Dummy; used internally for the type parameter `V`
    validation: PhantomData<V>,
}

impl<N: Normalize, V: Validate> Default for CssLength<N, V> {
    fn default() -> Self {
        CssLength::new(0.0, LengthUnit::Px)
    }
}

pub const DPI: f64 = 96.0;
pub const POINTS_PER_INCH: f64 = 72.0;
const CM_PER_INCH: f64 = 2.54;
const MM_PER_INCH: f64 = 25.4;
const PICA_PER_INCH: f64 = 6.0;

impl<N: Normalize, V: Validate> Parse for CssLength<N, V> {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<CssLength<N, V>, ParseError<'i>> {
        let l_value;
        let l_unit;

        let token = parser.next()?.clone();

        match token {
            Token::Number { value, .. } => {
                l_value = value;
                l_unit = LengthUnit::Px;
            }

            Token::Percentage { unit_value, .. } => {
                l_value = unit_value;
                l_unit = LengthUnit::Percent;
            }

            Token::Dimension {
                value, ref unit, ..
            } => {
                l_value = value;

                l_unit = match unit.as_ref() {
                    "px" => LengthUnit::Px,
                    "in" => LengthUnit::In,
                    "cm" => LengthUnit::Cm,
                    "mm" => LengthUnit::Mm,
                    "pt" => LengthUnit::Pt,
                    "pc" => LengthUnit::Pc,

                    _ => return Err(parser.new_unexpected_token_error(token)),
                };
            }

            _ => return Err(parser.new_unexpected_token_error(token)),
        }

        if !l_value.is_finite() {
            return Err(parser.new_custom_error(ValueErrorKind::value_error(
                "expected finite number",
            )));
        }

        <V as Validate>::validate(f64::from(l_value))
            .map_err(|e| parser.new_custom_error(e))
            .map(|l_value| CssLength::new(l_value, l_unit))
    }
}

impl<N: Normalize, V: Validate> CssLength<N, V> {
    pub fn new(l: f64, unit: LengthUnit) -> CssLength<N, V> {
        CssLength {
            length: l,
            unit,
            orientation: PhantomData,
            validation: PhantomData,
        }
    }

    /// A percentage; `1.0` means 100%.
    pub fn percent(l: f64) -> CssLength<N, V> {
        CssLength::new(l, LengthUnit::Percent)
    }

    pub fn is_zero(&self) -> bool {
        self.length == 0.0
    }

    /// Normalizes a specified length into a used value in the current viewport.
    pub fn normalize(&self, params: &ViewParams) -> f64 {
        match self.unit {
            LengthUnit::Percent => {
                self.length * <N as Normalize>::normalize(params.width, params.height)
            }

            _ => self.resolve(1.0),
        }
    }

    /// Resolves the length against an explicit reference size.
    ///
    /// A percentage is taken of `reference`; every other unit is converted to pixels.
    /// Gradients in `objectBoundingBox` units use a reference of `1.0`.
    pub fn resolve(&self, reference: f64) -> f64 {
        match self.unit {
            LengthUnit::Percent => self.length * reference,
            LengthUnit::Px => self.length,
            LengthUnit::In => self.length * DPI,
            LengthUnit::Cm => self.length * DPI / CM_PER_INCH,
            LengthUnit::Mm => self.length * DPI / MM_PER_INCH,
            LengthUnit::Pt => self.length * DPI / POINTS_PER_INCH,
            LengthUnit::Pc => self.length * DPI / PICA_PER_INCH,
        }
    }
}

fn viewport_percentage(x: f64, y: f64) -> f64 {
    // https://www.w3.org/TR/SVG/coords.html#Units
    // "For any other length value expressed as a percentage of the viewport, the
    // percentage is calculated as the specified percentage of
    // sqrt((actual-width)**2 + (actual-height)**2))/sqrt(2)."
    x.hypot(y) / SQRT_2
}

/// Alias for `CssLength` types that can have negative values
pub type Length<N> = CssLength<N, Signed>;

/// Alias for `CssLength` types that are non negative
pub type ULength<N> = CssLength<N, Unsigned>;

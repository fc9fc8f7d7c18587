//! Color values.
//!
//! Literal colors use the CSS color grammar from `cssparser`: named colors,
//! `#rgb`, `#rrggbb`, `rgb()`, `rgba()`, `hsl()` and `hsla()`.  The
//! `currentColor` keyword parses to [`Color::CurrentColor`] and is resolved at
//! render time by walking up the `color` attributes of the ancestors.

use cssparser::Parser;

use crate::error::*;
use crate::parsers::Parse;

pub use cssparser::{Color, RGBA};

impl Parse for cssparser::Color {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<cssparser::Color, ParseError<'i>> {
        Ok(cssparser::Color::parse(parser)?)
    }
}

impl Parse for cssparser::RGBA {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<cssparser::RGBA, ParseError<'i>> {
        let loc = parser.current_source_location();

        match cssparser::Color::parse(parser)? {
            cssparser::Color::RGBA(rgba) => Ok(rgba),
            cssparser::Color::CurrentColor => Err(loc.new_custom_error(ValueErrorKind::Value(
                "currentColor is not allowed here".to_string(),
            ))),
        }
    }
}

pub fn black() -> RGBA {
    RGBA::new(0, 0, 0, 255)
}

/// Multiplies the alpha channel of a color by an opacity in `[0, 1]`.
pub fn with_opacity(color: RGBA, opacity: f64) -> RGBA {
    let alpha = (f64::from(color.alpha) * opacity).round().clamp(0.0, 255.0) as u8;
    RGBA::new(color.red, color.green, color.blue, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literal_colors() {
        assert_eq!(
            Color::parse_str("#ff0000").unwrap(),
            Color::RGBA(RGBA::new(255, 0, 0, 255))
        );
        assert_eq!(
            Color::parse_str("rgba(0, 0, 255, 0.5)").unwrap(),
            Color::RGBA(RGBA::new(0, 0, 255, 128))
        );
        assert_eq!(
            Color::parse_str("green").unwrap(),
            Color::RGBA(RGBA::new(0, 128, 0, 255))
        );
    }

    #[test]
    fn parses_current_color() {
        assert_eq!(Color::parse_str("currentColor").unwrap(), Color::CurrentColor);
        assert!(RGBA::parse_str("currentColor").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(Color::parse_str("").is_err());
        assert!(Color::parse_str("#ff00").is_err());
        assert!(Color::parse_str("red blue").is_err());
    }

    #[test]
    fn multiplies_alpha() {
        assert_eq!(
            with_opacity(RGBA::new(1, 2, 3, 255), 0.5),
            RGBA::new(1, 2, 3, 128)
        );
        assert_eq!(with_opacity(black(), 0.0), RGBA::new(0, 0, 0, 0));
    }
}

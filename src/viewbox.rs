//! The `viewBox` attribute of `svg` and `symbol`.

use cssparser::Parser;

use crate::error::*;
use crate::parsers::{parse_numbers, Parse};
use crate::rect::Rect;

/// The user space rectangle that gets mapped onto a viewport.
///
/// Its size is always positive; `viewBox="0 0 0 10"` does not parse, and the element
/// behaves as if it had no `viewBox` at all.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewBox(Rect);

impl ViewBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Option<ViewBox> {
        if width > 0.0 && height > 0.0 {
            Some(ViewBox(Rect::from_xywh(x, y, width, height)))
        } else {
            None
        }
    }

    pub fn rect(&self) -> &Rect {
        &self.0
    }

    pub fn width(&self) -> f64 {
        self.0.width()
    }

    pub fn height(&self) -> f64 {
        self.0.height()
    }

    /// Width over height; used to derive a missing intrinsic dimension.
    pub fn aspect_ratio(&self) -> f64 {
        self.width() / self.height()
    }
}

impl Parse for ViewBox {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<ViewBox, ParseError<'i>> {
        let loc = parser.current_source_location();

        match parse_numbers::<4>(parser)? {
            ([x, y, w, h], 4) => ViewBox::new(x, y, w, h).ok_or_else(|| {
                loc.new_custom_error(ValueErrorKind::value_error(
                    "viewBox width and height must be positive",
                ))
            }),

            _ => Err(loc.new_custom_error(ValueErrorKind::parse_error(
                "viewBox needs four numbers",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_numbers() {
        let vbox = ViewBox::parse_str(" -1.5 -2.5e1,34,56e2  ").unwrap();
        assert_eq!(*vbox.rect(), Rect::new(-1.5, -25.0, 32.5, 5575.0));
        assert_eq!((vbox.width(), vbox.height()), (34.0, 5600.0));
    }

    #[test]
    fn wrong_number_of_values() {
        assert!(ViewBox::parse_str("").is_err());
        assert!(ViewBox::parse_str("0 0 10").is_err());
        assert!(ViewBox::parse_str("0 0 10 10 5").is_err());
        assert!(ViewBox::parse_str("0 0 10 foo").is_err());
    }

    #[test]
    fn needs_a_positive_area() {
        assert!(ViewBox::parse_str("0 0 0 10").is_err());
        assert!(ViewBox::parse_str("0 0 10 -1").is_err());
        assert!(ViewBox::new(0.0, 0.0, 10.0, 0.0).is_none());
    }

    #[test]
    fn aspect_ratio_is_width_over_height() {
        let vbox = ViewBox::parse_str("5 5 40 20").unwrap();
        assert_eq!(vbox.aspect_ratio(), 2.0);
    }
}

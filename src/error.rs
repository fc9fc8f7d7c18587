//! Error types.

use std::error;
use std::fmt;

use cssparser::{BasicParseError, BasicParseErrorKind, ParseErrorKind, ToCss};

use crate::element::AttributeId;

/// A short-lived error.
///
/// The lifetime of the error is the same as the `cssparser::ParserInput` that
/// was used to create a `cssparser::Parser`.  That is, it is the lifetime of
/// the string data that is being parsed, which for attribute values is the
/// lifetime of the document's source text.
pub type ParseError<'i> = cssparser::ParseError<'i, ValueErrorKind>;

/// A simple error which refers to an attribute's value
#[derive(Debug, Clone, PartialEq)]
pub enum ValueErrorKind {
    /// The value could not be parsed
    Parse(String),

    // The value could be parsed, but is invalid
    Value(String),
}

impl ValueErrorKind {
    pub fn parse_error(s: &str) -> ValueErrorKind {
        ValueErrorKind::Parse(s.to_string())
    }

    pub fn value_error(s: &str) -> ValueErrorKind {
        ValueErrorKind::Value(s.to_string())
    }
}

impl fmt::Display for ValueErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ValueErrorKind::Parse(ref s) => write!(f, "parse error: {}", s),

            ValueErrorKind::Value(ref s) => write!(f, "invalid value: {}", s),
        }
    }
}

impl<'a> From<BasicParseError<'a>> for ValueErrorKind {
    fn from(e: BasicParseError<'_>) -> ValueErrorKind {
        let BasicParseError { kind, .. } = e;

        let msg = match kind {
            BasicParseErrorKind::UnexpectedToken(_) => "unexpected token",
            BasicParseErrorKind::EndOfInput => "unexpected end of input",
            BasicParseErrorKind::AtRuleInvalid(_) => "invalid @-rule",
            BasicParseErrorKind::AtRuleBodyInvalid => "invalid @-rule body",
            BasicParseErrorKind::QualifiedRuleInvalid => "invalid qualified rule",
        };

        ValueErrorKind::parse_error(msg)
    }
}

/// A complete error for an attribute and its erroneous value
#[derive(Debug, Clone, PartialEq)]
pub struct ElementError {
    pub attr: AttributeId,
    pub err: ValueErrorKind,
}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.attr.name(), self.err)
    }
}

/// Helper for converting `Result<O, E>` into `Result<O, ElementError>`
///
/// The renderer never fails because of a bad attribute value; it logs the
/// `ElementError` and keeps the default.  This trait attaches the attribute
/// to the error so that the log line says which attribute was wrong.
pub trait AttributeResultExt<O> {
    fn attribute(self, attr: AttributeId) -> Result<O, ElementError>;
}

/// Turns a short-lived `ParseError` into a long-lived `ElementError`
impl<'i, O> AttributeResultExt<O> for Result<O, ParseError<'i>> {
    fn attribute(self, attr: AttributeId) -> Result<O, ElementError> {
        self.map_err(|e| {
            let ParseError {
                kind,
                location: _location,
            } = e;

            match kind {
                ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(tok)) => {
                    let mut s = String::from("unexpected token '");
                    // Writing to a String cannot fail.
                    let _ = tok.to_css(&mut s);
                    s.push('\'');

                    ElementError {
                        attr,
                        err: ValueErrorKind::Parse(s),
                    }
                }

                ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => ElementError {
                    attr,
                    err: ValueErrorKind::parse_error("unexpected end of input"),
                },

                ParseErrorKind::Basic(_) => ElementError {
                    attr,
                    err: ValueErrorKind::parse_error("invalid syntax"),
                },

                ParseErrorKind::Custom(err) => ElementError { attr, err },
            }
        })
    }
}

/// Errors that can happen while loading an SVG document.
///
/// All of these codes are for unrecoverable errors that keep an SVG document from being
/// loaded.  Note that the library is very lenient with respect to attribute values; a
/// value that does not parse never leads to a `LoadingError`.  To see those errors, you
/// may want to set the `MINISVG_LOG=1` environment variable.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum LoadingError {
    /// Structural markup error at the given byte offset.
    XmlParseError { position: usize, message: String },

    /// The first element is not `<svg>`, or there is no element at all.
    NoSvgRoot,

    /// The intrinsic width or height resolved to a non-positive value.
    InvalidSize,

    /// The input is not valid UTF-8.
    BadUtf8,

    /// Error while reading a file.
    Io(String),
}

impl error::Error for LoadingError {}

impl fmt::Display for LoadingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LoadingError::XmlParseError {
                position,
                ref message,
            } => write!(f, "XML parse error at byte {}: {}", position, message),
            LoadingError::NoSvgRoot => write!(f, "XML does not have <svg> root"),
            LoadingError::InvalidSize => write!(f, "document has a non-positive intrinsic size"),
            LoadingError::BadUtf8 => write!(f, "input is not valid UTF-8"),
            LoadingError::Io(ref s) => write!(f, "I/O error: {}", s),
        }
    }
}

impl From<std::io::Error> for LoadingError {
    fn from(e: std::io::Error) -> LoadingError {
        LoadingError::Io(format!("{}", e))
    }
}

/// Errors that can happen while rendering or measuring an SVG document.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum RenderingError {
    /// An error from the rendering backend.
    Rendering(String),

    /// Tried to reference an SVG element that does not exist.
    IdNotFound,

    /// The area to render has a non-positive width or height.
    InvalidSize,
}

impl error::Error for RenderingError {}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RenderingError::Rendering(ref s) => write!(f, "rendering error: {}", s),
            RenderingError::IdNotFound => write!(f, "element id not found"),
            RenderingError::InvalidSize => write!(f, "invalid size for rendering"),
        }
    }
}

impl From<cairo::Error> for RenderingError {
    fn from(e: cairo::Error) -> RenderingError {
        RenderingError::Rendering(format!("{:?}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::Parse;

    #[test]
    fn attribute_error_mentions_the_attribute() {
        let res = f64::parse_str("foo").attribute(AttributeId::StrokeWidth);
        let err = res.unwrap_err();
        assert_eq!(err.attr, AttributeId::StrokeWidth);
        assert!(format!("{}", err).starts_with("stroke-width: parse error"));
    }

    #[test]
    fn displays_loading_error_position() {
        let e = LoadingError::XmlParseError {
            position: 12,
            message: "unterminated comment".to_string(),
        };
        assert_eq!(
            format!("{}", e),
            "XML parse error at byte 12: unterminated comment"
        );
    }
}

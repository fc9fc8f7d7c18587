//! Values of the `fill` and `stroke` attributes.

use cssparser::{Parser, Token};

use crate::color::{Color, RGBA};
use crate::error::*;
use crate::parsers::Parse;

/// A paint, as written in the document.
///
/// References are resolved by the renderer, since they need the document's id index
/// and, for `var()`, the caller's palette.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintServer {
    /// `none`
    None,

    /// `url(#id)`, with an optional fallback color for when `id` does not exist.
    Iri { id: String, fallback: Color },

    /// `var(--name)`, with an optional fallback color for when the palette has no
    /// entry for `name`.
    Var { name: String, fallback: Color },

    SolidColor(Color),
}

fn transparent() -> Color {
    Color::RGBA(RGBA::new(0, 0, 0, 0))
}

impl Parse for PaintServer {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<PaintServer, ParseError<'i>> {
        if parser
            .try_parse(|i| i.expect_ident_matching("none"))
            .is_ok()
        {
            Ok(PaintServer::None)
        } else if let Ok(url) = parser.try_parse(|i| i.expect_url()) {
            let loc = parser.current_source_location();

            let id = match url.strip_prefix('#') {
                Some(id) => id.to_string(),
                None => {
                    return Err(loc.new_custom_error(ValueErrorKind::parse_error(
                        "only same-document references are supported",
                    )))
                }
            };

            let fallback = if !parser.is_exhausted() {
                Color::parse(parser)?
            } else {
                transparent()
            };

            Ok(PaintServer::Iri { id, fallback })
        } else if parser
            .try_parse(|i| i.expect_function_matching("var"))
            .is_ok()
        {
            parser.parse_nested_block(|p| {
                let loc = p.current_source_location();

                let name = match *p.next()? {
                    Token::Ident(ref ident) if ident.starts_with("--") => ident[2..].to_string(),
                    ref t => return Err(loc.new_unexpected_token_error(t.clone())),
                };

                let fallback = if p.try_parse(|i| i.expect_comma()).is_ok() {
                    Color::parse(p)?
                } else {
                    transparent()
                };

                Ok(PaintServer::Var { name, fallback })
            })
        } else {
            Ok(Color::parse(parser).map(PaintServer::SolidColor)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catches_invalid_syntax() {
        assert!(PaintServer::parse_str("").is_err());
        assert!(PaintServer::parse_str("42").is_err());
        assert!(PaintServer::parse_str("invalid").is_err());
        assert!(PaintServer::parse_str("none x").is_err());
        assert!(PaintServer::parse_str("url(#foo) bar").is_err());
        assert!(PaintServer::parse_str("var(foo)").is_err());
        assert!(PaintServer::parse_str("var(--foo, red) x").is_err());
    }

    #[test]
    fn parses_none() {
        assert_eq!(PaintServer::parse_str("none").unwrap(), PaintServer::None);
    }

    #[test]
    fn parses_solid_color() {
        assert_eq!(
            PaintServer::parse_str("rgb(255, 128, 64, 0.5)").unwrap(),
            PaintServer::SolidColor(Color::RGBA(RGBA::new(255, 128, 64, 128)))
        );

        assert_eq!(
            PaintServer::parse_str("currentColor").unwrap(),
            PaintServer::SolidColor(Color::CurrentColor)
        );
    }

    #[test]
    fn parses_iri() {
        assert_eq!(
            PaintServer::parse_str("url(#link)").unwrap(),
            PaintServer::Iri {
                id: "link".to_string(),
                fallback: transparent(),
            }
        );

        assert_eq!(
            PaintServer::parse_str("url( #link ) #ff8040").unwrap(),
            PaintServer::Iri {
                id: "link".to_string(),
                fallback: Color::RGBA(RGBA::new(255, 128, 64, 255)),
            }
        );

        assert_eq!(
            PaintServer::parse_str("url(#link) currentColor").unwrap(),
            PaintServer::Iri {
                id: "link".to_string(),
                fallback: Color::CurrentColor,
            }
        );

        assert!(PaintServer::parse_str("url(other.svg#link)").is_err());
    }

    #[test]
    fn parses_var() {
        assert_eq!(
            PaintServer::parse_str("var(--color0)").unwrap(),
            PaintServer::Var {
                name: "color0".to_string(),
                fallback: transparent(),
            }
        );

        assert_eq!(
            PaintServer::parse_str("var( --accent , blue )").unwrap(),
            PaintServer::Var {
                name: "accent".to_string(),
                fallback: Color::RGBA(RGBA::new(0, 0, 255, 255)),
            }
        );
    }
}

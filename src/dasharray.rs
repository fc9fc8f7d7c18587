//! Parser for the `stroke-dasharray` property.

use cssparser::Parser;

use crate::drawing_ctx::ViewParams;
use crate::error::*;
use crate::length::*;
use crate::parsers::{optional_comma, Parse};

/// Maximum number of entries in a dash array; entries after this are ignored.
pub const MAX_DASHES: usize = 128;

#[derive(Debug, Default, PartialEq, Clone)]
pub enum Dasharray {
    #[default]
    None,
    Array(Box<[ULength<Both>]>),
}

impl Parse for Dasharray {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Dasharray, ParseError<'i>> {
        if parser
            .try_parse(|p| p.expect_ident_matching("none"))
            .is_ok()
        {
            return Ok(Dasharray::None);
        }

        let mut dasharray = Vec::new();

        loop {
            let d = ULength::<Both>::parse(parser)?;

            if dasharray.len() < MAX_DASHES {
                dasharray.push(d);
            }

            if parser.is_exhausted() {
                break;
            }

            optional_comma(parser);
        }

        Ok(Dasharray::Array(dasharray.into_boxed_slice()))
    }
}

impl Dasharray {
    /// Resolves the dash lengths in the current viewport.
    ///
    /// Returns `None` when there is nothing to dash: `none`, or an array where every
    /// entry is zero, which would make the stroke disappear.
    pub fn normalize(&self, params: &ViewParams) -> Option<Vec<f64>> {
        match *self {
            Dasharray::None => None,

            Dasharray::Array(ref dashes) => {
                let dashes: Vec<f64> = dashes.iter().map(|l| l.normalize(params)).collect();

                if dashes.iter().all(|d| *d == 0.0) {
                    None
                } else {
                    Some(dashes)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dasharray(l: &[ULength<Both>]) -> Dasharray {
        Dasharray::Array(l.to_vec().into_boxed_slice())
    }

    #[test]
    fn parses_dash_array() {
        // helper to cut down boilderplate
        let length_parse = |s| ULength::<Both>::parse_str(s).unwrap();

        let expected = dasharray(&[
            length_parse("1"),
            length_parse("2in"),
            length_parse("3"),
            length_parse("4%"),
        ]);

        let sample_1 = dasharray(&[length_parse("10"), length_parse("6")]);
        let sample_2 = dasharray(&[length_parse("25"), length_parse("5"), length_parse("5")]);
        let sample_3 = dasharray(&[length_parse("2")]);

        assert_eq!(Dasharray::parse_str("none").unwrap(), Dasharray::None);
        assert_eq!(Dasharray::parse_str("1 2in,3 4%").unwrap(), expected);
        assert_eq!(Dasharray::parse_str("10,6").unwrap(), sample_1);
        assert_eq!(Dasharray::parse_str("25  5 , 5").unwrap(), sample_2);
        assert_eq!(Dasharray::parse_str("2").unwrap(), sample_3);

        // Negative numbers
        assert!(Dasharray::parse_str("20,40,-20").is_err());

        // Empty dash_array
        assert!(Dasharray::parse_str("").is_err());
        assert!(Dasharray::parse_str("\t  \n     ").is_err());
        assert!(Dasharray::parse_str(",,,").is_err());

        // No trailing commas allowed, parse error
        assert!(Dasharray::parse_str("10,").is_err());

        // A comma should be followed by a number
        assert!(Dasharray::parse_str("20,,10").is_err());
    }

    #[test]
    fn limits_number_of_dashes() {
        let ok = vec!["1"; MAX_DASHES].join(" ");
        assert!(Dasharray::parse_str(&ok).is_ok());

        let too_many = vec!["1"; MAX_DASHES + 10].join(" ");
        match Dasharray::parse_str(&too_many).unwrap() {
            Dasharray::Array(dashes) => assert_eq!(dashes.len(), MAX_DASHES),
            Dasharray::None => unreachable!(),
        }

        let bad_tail = format!("{} -1", vec!["1"; MAX_DASHES].join(" "));
        assert!(Dasharray::parse_str(&bad_tail).is_err());
    }

    #[test]
    fn normalizes_in_viewport() {
        let params = ViewParams::new(100.0, 100.0);

        assert_eq!(Dasharray::None.normalize(&params), None);
        assert_eq!(
            Dasharray::parse_str("0 0").unwrap().normalize(&params),
            None
        );
        assert_eq!(
            Dasharray::parse_str("1in 10").unwrap().normalize(&params),
            Some(vec![96.0, 10.0])
        );

        let dashes = Dasharray::parse_str("10%").unwrap().normalize(&params).unwrap();
        assert!((dashes[0] - 10.0).abs() < 1e-9);
    }
}

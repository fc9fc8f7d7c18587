//! The `gradientUnits` attribute.

use cssparser::Parser;

use crate::error::*;
use crate::parse_identifiers;
use crate::parsers::Parse;
use crate::rect::Rect;
use crate::transform::Transform;

/// Which coordinate system a gradient's geometry attributes are in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordUnits {
    /// The user space of the element that is being painted.
    UserSpaceOnUse,

    /// Fractions of the painted shape's extents, where `(0, 0)` is its top-left
    /// corner and `(1, 1)` its bottom-right one.
    ObjectBoundingBox,
}

impl CoordUnits {
    /// The matrix from these units to the user space of a shape with extents `bbox`.
    pub fn to_user_space(self, bbox: &Rect) -> Transform {
        match self {
            CoordUnits::UserSpaceOnUse => Transform::identity(),
            CoordUnits::ObjectBoundingBox => {
                Transform::new_translate(bbox.x0, bbox.y0).pre_scale(bbox.width(), bbox.height())
            }
        }
    }
}

impl Parse for CoordUnits {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "userSpaceOnUse" => CoordUnits::UserSpaceOnUse,
            "objectBoundingBox" => CoordUnits::ObjectBoundingBox,
        )?)
    }
}

/// Value of `gradientUnits`, which defaults to `objectBoundingBox`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GradientUnits(pub CoordUnits);

impl Default for GradientUnits {
    fn default() -> Self {
        GradientUnits(CoordUnits::ObjectBoundingBox)
    }
}

impl Parse for GradientUnits {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        CoordUnits::parse(parser).map(GradientUnits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(
            GradientUnits::parse_str(" userSpaceOnUse ").unwrap(),
            GradientUnits(CoordUnits::UserSpaceOnUse)
        );
        assert!(GradientUnits::parse_str("userspaceonuse").is_err());
        assert!(GradientUnits::parse_str("").is_err());
    }

    #[test]
    fn bounding_box_units_map_unit_square_onto_extents() {
        let bbox = Rect::new(10.0, 20.0, 50.0, 40.0);

        let t = CoordUnits::ObjectBoundingBox.to_user_space(&bbox);
        assert_eq!(t.transform_point(0.0, 0.0), (10.0, 20.0));
        assert_eq!(t.transform_point(1.0, 1.0), (50.0, 40.0));
        assert_eq!(t.transform_point(0.5, 0.5), (30.0, 30.0));

        let t = CoordUnits::UserSpaceOnUse.to_user_space(&bbox);
        assert_eq!(t, Transform::identity());
    }
}

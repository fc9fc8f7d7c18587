//! Definitions for presentation property types.
//!
//! This module defines the presentation properties that the renderer looks up on
//! elements.  Each property requires a Rust type that will hold its values, and that
//! type should implement a few traits, as follows.
//!
//! # Requirements for a property type
//!
//! You should call the [`make_property`] macro to take care of most of these requirements
//! automatically:
//!
//! * A name for the type.  For example, the `fill` property has a [`Fill`] type defined
//! in this module.
//!
//! * An initial value per the SVG specs, given through an implementation of the
//! [`Default`] trait.  This is also the value used when the attribute does not parse.
//!
//! * The attribute that holds the property, and whether the property inherits to child
//! elements, given through an implementation of the [`Property`] trait.
//!
//! * The actual underlying type.  For example, the [`make_property`] macro can generate a
//! field-less enum for properties like the `fill-rule` property, which just has
//! identifier-based values like `nonzero` and `evenodd`.  For general-purpose types like
//! [`Length`], the macro can wrap them in a newtype like `struct`
//! [`StrokeWidth`]`(`[`ULength`]`)`.
//!
//! * An implementation of the [`Parse`] trait for the underlying type.
//!
//! [`Property`]: crate::property_macros::Property

use crate::color::{Color, RGBA};
use crate::coord_units::GradientUnits;
use crate::dasharray::Dasharray;
use crate::impl_property;
use crate::length::*;
use crate::make_property;
use crate::paint_server::PaintServer;
use crate::parsers::UnitInterval;

make_property!(
    /// `display` property.
    ///
    /// Only `none` has an effect: the element and its subtree are not rendered.
    Display,
    attribute: Display,
    default: Inline,
    inherits_automatically: false,

    identifiers:
    "inline" => Inline,
    "none" => None,
);

make_property!(
    /// `fill` property.
    Fill,
    attribute: Fill,
    default: PaintServer::SolidColor(Color::RGBA(RGBA::new(0, 0, 0, 255))),
    inherits_automatically: true,
    newtype_parse: PaintServer,
);

make_property!(
    /// `fill-opacity` property.
    FillOpacity,
    attribute: FillOpacity,
    default: UnitInterval(1.0),
    inherits_automatically: true,
    newtype_parse: UnitInterval,
);

make_property!(
    /// `fill-rule` property.
    FillRule,
    attribute: FillRule,
    default: NonZero,
    inherits_automatically: true,

    identifiers:
    "nonzero" => NonZero,
    "evenodd" => EvenOdd,
);

make_property!(
    /// `opacity` property.
    ///
    /// Group opacity does not inherit; instead, the renderer multiplies it into the
    /// opacity it carries down the tree.
    Opacity,
    attribute: Opacity,
    default: UnitInterval(1.0),
    inherits_automatically: false,
    newtype_parse: UnitInterval,
);

make_property!(
    /// `spreadMethod` attribute of gradients.
    SpreadMethod,
    attribute: SpreadMethod,
    default: Pad,
    inherits_automatically: false,

    identifiers:
    "pad" => Pad,
    "reflect" => Reflect,
    "repeat" => Repeat,
);

make_property!(
    /// `stop-color` property.
    ///
    /// This may be `currentColor`, which is resolved with the stop's own `color`.
    StopColor,
    attribute: StopColor,
    default: Color::RGBA(RGBA::new(0, 0, 0, 255)),
    inherits_automatically: false,
    newtype_parse: Color,
);

make_property!(
    /// `stop-opacity` property.
    StopOpacity,
    attribute: StopOpacity,
    default: UnitInterval(1.0),
    inherits_automatically: false,
    newtype_parse: UnitInterval,
);

make_property!(
    /// `stroke` property.
    Stroke,
    attribute: Stroke,
    default: PaintServer::None,
    inherits_automatically: true,
    newtype_parse: PaintServer,
);

make_property!(
    /// `stroke-dasharray` property.
    StrokeDasharray,
    attribute: StrokeDasharray,
    default: Dasharray::default(),
    inherits_automatically: true,
    newtype_parse: Dasharray,
);

make_property!(
    /// `stroke-dashoffset` property.
    StrokeDashoffset,
    attribute: StrokeDashoffset,
    default: ULength::<Both>::default(),
    inherits_automatically: true,
    newtype_parse: ULength<Both>,
);

make_property!(
    /// `stroke-linecap` property.
    StrokeLinecap,
    attribute: StrokeLinecap,
    default: Butt,
    inherits_automatically: true,

    identifiers:
    "butt" => Butt,
    "round" => Round,
    "square" => Square,
);

make_property!(
    /// `stroke-linejoin` property.
    StrokeLinejoin,
    attribute: StrokeLinejoin,
    default: Miter,
    inherits_automatically: true,

    identifiers:
    "miter" => Miter,
    "round" => Round,
    "bevel" => Bevel,
);

make_property!(
    /// `stroke-miterlimit` property.
    StrokeMiterlimit,
    attribute: StrokeMiterlimit,
    default: 4.0,
    inherits_automatically: true,
    newtype_parse: f64,
);

make_property!(
    /// `stroke-opacity` property.
    StrokeOpacity,
    attribute: StrokeOpacity,
    default: UnitInterval(1.0),
    inherits_automatically: true,
    newtype_parse: UnitInterval,
);

make_property!(
    /// `stroke-width` property.
    StrokeWidth,
    attribute: StrokeWidth,
    default: ULength::<Both>::new(1.0, LengthUnit::Px),
    inherits_automatically: true,
    newtype_parse: ULength<Both>,
);

make_property!(
    /// `visibility` property.
    ///
    /// Anything other than `visible` hides shapes and images; groups are still walked.
    Visibility,
    attribute: Visibility,
    default: Visible,
    inherits_automatically: true,

    identifiers:
    "visible" => Visible,
    "hidden" => Hidden,
    "collapse" => Collapse,
);

impl_property!(GradientUnits, GradientUnits, false);

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }
}

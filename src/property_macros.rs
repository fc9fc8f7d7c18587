//! Macros to define presentation properties.

use crate::element::AttributeId;
use crate::parsers::Parse;

/// Trait which all presentation property types should implement.
///
/// Properties are not computed ahead of time.  The renderer looks up the attribute that
/// holds a property when it needs the value, parses it, and falls back to the
/// [`Default`] when the attribute is missing or invalid.
pub trait Property: Parse + Default {
    /// The attribute that holds the property's value, either as a markup attribute or
    /// as a declaration in `style`.
    fn attribute() -> AttributeId;

    /// Whether the property inherits from parent to child elements.
    ///
    /// For properties that inherit, a missing value or the keyword `inherit` makes the
    /// lookup continue with the parent element.  Otherwise, only the element itself is
    /// consulted, and `inherit` is just an invalid value.
    fn inherits_automatically() -> bool;
}

/// Generates a type for a presentation property.
///
/// Writing a property by hand takes a bit of boilerplate:
///
/// * Define a type to represent the property's values.
///
/// * A [`Parse`] implementation to parse the property.
///
/// * A [`Default`] implementation to define the property's *initial* value.
///
/// * A [`Property`] implementation to name the attribute that holds the property, and
/// whether the property inherits from the parent element.
///
/// # Simple identifiers
///
/// Many properties are just sets of identifiers and can be represented
/// by simple enums.  In this case, you can use the following:
///
/// ```text
/// make_property!(
///   /// Documentation here.
///   StrokeLinejoin,
///   attribute: StrokeLinejoin,
///   default: Miter,
///   inherits_automatically: true,
///
///   identifiers:
///     "miter" => Miter,
///     "round" => Round,
///     "bevel" => Bevel,
/// );
/// ```
///
/// This generates a simple enum like the following, with implementations of [`Parse`],
/// [`Default`], and [`Property`].
///
/// ```
/// pub enum StrokeLinejoin { Miter, Round, Bevel }
/// ```
///
/// # Properties from an existing, general-purpose type
///
/// For example, both the `fill-opacity` and `stop-opacity` properties can be represented
/// with a `UnitInterval`, but they live in different attributes and inherit differently.
/// In this case, the macro can generate a newtype around `UnitInterval` for each case:
///
/// ```text
/// make_property!(
///     /// Documentation here.
///     StopOpacity,
///     attribute: StopOpacity,
///     default: UnitInterval(1.0),
///     inherits_automatically: false,
///     newtype_parse: UnitInterval,
/// );
/// ```
///
/// [`Parse`]: crate::parsers::Parse
/// [`Property`]: crate::property_macros::Property
#[macro_export]
macro_rules! make_property {
    ($(#[$attr:meta])*
     $name: ident,
     attribute: $attribute: ident,
     default: $default: ident,
     inherits_automatically: $inherits_automatically: expr,
     identifiers:
     $($str_prop: expr => $variant: ident,)+
    ) => {
        $(#[$attr])*
        #[derive(Debug, Copy, Clone, PartialEq)]
        pub enum $name {
            $($variant),+
        }

        $crate::impl_default!($name, $name::$default);
        $crate::impl_property!($name, $attribute, $inherits_automatically);

        impl $crate::parsers::Parse for $name {
            fn parse<'i>(parser: &mut ::cssparser::Parser<'i, '_>) -> Result<$name, $crate::error::ParseError<'i>> {
                Ok($crate::parse_identifiers!(
                    parser,
                    $($str_prop => $name::$variant,)+
                )?)
            }
        }
    };

    ($(#[$attr:meta])*
     $name: ident,
     attribute: $attribute: ident,
     default: $default: expr,
     inherits_automatically: $inherits_automatically: expr,
     newtype_parse: $type: ty,
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(pub $type);

        $crate::impl_default!($name, $name($default));
        $crate::impl_property!($name, $attribute, $inherits_automatically);

        impl $crate::parsers::Parse for $name {
            fn parse<'i>(parser: &mut ::cssparser::Parser<'i, '_>) -> Result<$name, $crate::error::ParseError<'i>> {
                Ok($name(<$type as $crate::parsers::Parse>::parse(parser)?))
            }
        }
    };

    ($name: ident,
     attribute: $attribute: ident,
     default: $default: expr,
     inherits_automatically: $inherits_automatically: expr,
    ) => {
        $crate::impl_default!($name, $default);
        $crate::impl_property!($name, $attribute, $inherits_automatically);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! impl_default {
    ($name:ident, $default:expr) => {
        impl Default for $name {
            fn default() -> $name {
                $default
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! impl_property {
    ($name:ident, $attribute:ident, $inherits_automatically:expr) => {
        impl $crate::property_macros::Property for $name {
            fn attribute() -> $crate::element::AttributeId {
                $crate::element::AttributeId::$attribute
            }

            fn inherits_automatically() -> bool {
                $inherits_automatically
            }
        }
    };
}

//! Load and render a compact subset of SVG.
//!
//! This crate parses SVG documents made of shapes, paths, groups, `<use>` references,
//! embedded raster images, and linear or radial gradients, and either renders them to
//! a Cairo context (or any other [`Canvas`]) or measures their extents.  It is meant for
//! icons and for the SVG glyphs of color fonts, so it does not implement CSS
//! stylesheets, text, filters, masks or animation.
//!
//! # Basic usage
//!
//! * Create a [`Loader`] struct.
//! * Get a [`Document`] from the [`Loader`].
//! * Create a [`Renderer`] for the [`Document`] and render to a Cairo context, or to a
//! new image surface.
//!
//! This is the easiest way to render an SVG to a PNG file:
//!
//! ```
//! use cairo;
//! use minisvg;
//!
//! const SVG: &str = r##"<svg width="100" height="100" viewBox="0 0 10 10">
//!                        <circle cx="5" cy="5" r="4" fill="#0f0"/>
//!                      </svg>"##;
//!
//! let document = minisvg::Loader::new().read_data(SVG).unwrap();
//!
//! let surface = minisvg::Renderer::new(&document)
//!     .render_to_surface(None, None, None)
//!     .unwrap();
//!
//! let mut output = Vec::new();
//! surface.write_to_png(&mut output).unwrap();
//! assert_eq!((surface.width(), surface.height()), (100, 100));
//! ```
//!
//! # Measuring
//!
//! [`Document::extents`] computes the bounding box of the whole document or of a single
//! element, in the coordinates where the element is placed.  Strokes are included with
//! a conservative estimate.
//!
//! # Logging
//!
//! Attribute values that fail to parse are not errors; the library uses the default
//! values instead.  Set the `MINISVG_LOG` environment variable to print a message for
//! each of these, and for other problems like missing references.

#![allow(rustdoc::private_intra_doc_links)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::derive_partial_eq_without_eq)]
#![warn(nonstandard_style, rust_2018_idioms, unused)]
// Some lints no longer exist
#![warn(renamed_and_removed_lints)]
// Standalone lints
#![warn(trivial_casts, trivial_numeric_casts)]

// The public API is exported here
pub use crate::api::*;

mod api;
mod arena;
mod aspect_ratio;
mod canvas;
mod color;
mod coord_units;
mod dasharray;
mod document;
mod drawing_ctx;
mod element;
mod error;
mod float_eq_cairo;
mod glyph;
mod gradient;
mod id_index;
mod image;
mod length;
mod log;
mod node;
mod paint_server;
mod parsers;
mod path_builder;
mod path_parser;
mod property_defs;
mod property_macros;
mod rect;
mod session;
mod span;
mod transform;
mod viewbox;
mod xml;

#[doc(hidden)]
pub mod doctest_only {
    pub use crate::aspect_ratio::AspectRatio;
    pub use crate::error::ElementError;
    pub use crate::error::ValueErrorKind;
    pub use crate::length::{Both, CssLength, Horizontal, Length, LengthUnit, ULength, Vertical};
    pub use crate::parsers::{Parse, ParseValue};
}

#[doc(hidden)]
pub mod tests_only {
    pub use crate::path_parser::parse_path;
}

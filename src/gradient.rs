//! Gradient paint servers; the `linearGradient` and `radialGradient` elements.
//!
//! Gradients are not rendered by themselves.  When a `fill` or `stroke` refers to one,
//! the renderer resolves it into a [`Paint`] for the shape being drawn.
//!
//! A gradient may refer to another one through `href`.  Each attribute is inherited
//! separately along that chain: the first element in the chain that specifies
//! `gradientUnits` supplies the units, the first one that has `<stop>` children
//! supplies the stops, and so on.  Geometry attributes like `x1` or `cx` are only taken
//! from elements of the same kind as the gradient that is being resolved.

use crate::canvas::{GradientCommon, GradientStop, Paint};
use crate::color::{self, Color, RGBA};
use crate::coord_units::{CoordUnits, GradientUnits};
use crate::document::Document;
use crate::drawing_ctx::ViewParams;
use crate::element::{AttributeId, ElementName};
use crate::length::*;
use crate::minisvg_log;
use crate::node::NodeId;
use crate::parsers::UnitInterval;
use crate::property_defs::{SpreadMethod, StopColor, StopOpacity};
use crate::rect::Rect;
use crate::transform::Transform;

/// Maximum number of elements followed along an `href` chain.
pub const MAX_GRADIENT_DEPTH: usize = 128;

/// Stops beyond this number are ignored.
pub const MAX_STOPS: usize = 64;

/// The element that supplies each of the attributes shared by both kinds of gradient.
#[derive(Default)]
struct CommonSources {
    units: Option<NodeId>,
    spread: Option<NodeId>,
    transform: Option<NodeId>,
    stops: Option<NodeId>,
}

impl CommonSources {
    fn collect(&mut self, doc: &Document<'_>, node: NodeId) {
        take_first(&mut self.units, doc, node, AttributeId::GradientUnits);
        take_first(&mut self.spread, doc, node, AttributeId::SpreadMethod);
        take_first(&mut self.transform, doc, node, AttributeId::GradientTransform);

        if self.stops.is_none()
            && doc
                .children(node)
                .any(|child| doc.name(child) == ElementName::Stop)
        {
            self.stops = Some(node);
        }
    }
}

fn take_first(slot: &mut Option<NodeId>, doc: &Document<'_>, node: NodeId, attr: AttributeId) {
    if slot.is_none() && doc.has_attribute(node, attr) {
        *slot = Some(node);
    }
}

/// Walks the `href` chain starting at `node`.
///
/// Returns the sources of the common attributes, and of each of the `attrs` specific to
/// gradients of kind `kind`.  Slots that no element in the chain fills are left empty.
fn collect_sources(
    doc: &Document<'_>,
    node: NodeId,
    kind: ElementName,
    attrs: &[AttributeId],
) -> (CommonSources, Vec<Option<NodeId>>) {
    let mut common = CommonSources::default();
    let mut specific = vec![None; attrs.len()];

    let mut current = node;

    for _ in 0..MAX_GRADIENT_DEPTH {
        common.collect(doc, current);

        if doc.name(current) == kind {
            for (slot, attr) in specific.iter_mut().zip(attrs) {
                take_first(slot, doc, current, *attr);
            }
        }

        match doc.resolve_href(current) {
            Some(next) if doc.name(next).is_gradient() => current = next,
            _ => break,
        }
    }

    (common, specific)
}

/// Gradient attributes after following the chain, in gradient space.
struct Resolved {
    units: CoordUnits,
    common: GradientCommon,
}

/// Resolves the attributes shared by both kinds of gradient.
///
/// Returns `None` if no element in the chain has stops, in which case the gradient
/// paints nothing.
fn resolve_common(
    doc: &Document<'_>,
    node: NodeId,
    sources: &CommonSources,
    bbox: Option<Rect>,
    current_color: &dyn Fn(NodeId) -> RGBA,
) -> Option<Resolved> {
    let Some(stops_node) = sources.stops else {
        minisvg_log!(
            doc.session(),
            "(gradient {:?} has no stops; not painting)",
            node
        );
        return None;
    };

    let GradientUnits(units) = doc.property(sources.units.unwrap_or(node), None);
    let spread: SpreadMethod = doc.property(sources.spread.unwrap_or(node), None);

    let transform: Transform = doc.parse_attribute_or_default(
        sources.transform.unwrap_or(node),
        AttributeId::GradientTransform,
    );

    let transform = units
        .to_user_space(&bbox.unwrap_or_default())
        .pre_transform(&transform);

    let stops = collect_stops(doc, stops_node, current_color);

    Some(Resolved {
        units,
        common: GradientCommon {
            stops,
            spread,
            transform,
        },
    })
}

/// Reads the `<stop>` children of `node`.
fn collect_stops(
    doc: &Document<'_>,
    node: NodeId,
    current_color: &dyn Fn(NodeId) -> RGBA,
) -> Vec<GradientStop> {
    let mut stops: Vec<GradientStop> = Vec::new();

    for child in doc.children(node) {
        if stops.len() == MAX_STOPS {
            minisvg_log!(
                doc.session(),
                "(gradient {:?} has more than {} stops; ignoring the rest)",
                node,
                MAX_STOPS
            );
            break;
        }

        if doc.name(child) != ElementName::Stop {
            continue;
        }

        let UnitInterval(offset) = doc.parse_attribute_or_default(child, AttributeId::Offset);
        let StopOpacity(UnitInterval(opacity)) = doc.property(child, None);
        let StopColor(stop_color) = doc.property(child, None);

        let rgba = match stop_color {
            Color::RGBA(rgba) => rgba,
            Color::CurrentColor => current_color(child),
        };

        add_color_stop(&mut stops, offset, color::with_opacity(rgba, opacity));
    }

    stops
}

/// Appends a stop, keeping offsets in increasing order.
fn add_color_stop(stops: &mut Vec<GradientStop>, offset: f64, color: RGBA) {
    let last_offset = stops.last().map_or(0.0, |s| s.offset);

    let offset = if offset > last_offset {
        offset
    } else {
        last_offset
    };

    stops.push(GradientStop { offset, color });
}

fn resolve_length<N: Normalize, V: Validate>(
    length: &CssLength<N, V>,
    units: CoordUnits,
    view: &ViewParams,
) -> f64 {
    match units {
        CoordUnits::UserSpaceOnUse => length.normalize(view),
        CoordUnits::ObjectBoundingBox => length.resolve(1.0),
    }
}

fn resolve_linear(
    doc: &Document<'_>,
    node: NodeId,
    bbox: Option<Rect>,
    view: &ViewParams,
    current_color: &dyn Fn(NodeId) -> RGBA,
) -> Option<Paint> {
    const ATTRS: [AttributeId; 4] = [
        AttributeId::X1,
        AttributeId::Y1,
        AttributeId::X2,
        AttributeId::Y2,
    ];

    let (common, specific) = collect_sources(doc, node, ElementName::LinearGradient, &ATTRS);
    let Resolved { units, common } = resolve_common(doc, node, &common, bbox, current_color)?;

    let source = |i: usize| specific[i].unwrap_or(node);

    let x1: Length<Horizontal> = doc.parse_attribute_or_default(source(0), AttributeId::X1);
    let y1: Length<Vertical> = doc.parse_attribute_or_default(source(1), AttributeId::Y1);
    let x2: Length<Horizontal> = doc
        .parse_attribute(source(2), AttributeId::X2, false, None)
        .unwrap_or_else(|| Length::percent(1.0));
    let y2: Length<Vertical> = doc.parse_attribute_or_default(source(3), AttributeId::Y2);

    Some(Paint::LinearGradient {
        x1: resolve_length(&x1, units, view),
        y1: resolve_length(&y1, units, view),
        x2: resolve_length(&x2, units, view),
        y2: resolve_length(&y2, units, view),
        common,
    })
}

fn resolve_radial(
    doc: &Document<'_>,
    node: NodeId,
    bbox: Option<Rect>,
    view: &ViewParams,
    current_color: &dyn Fn(NodeId) -> RGBA,
) -> Option<Paint> {
    const ATTRS: [AttributeId; 5] = [
        AttributeId::Cx,
        AttributeId::Cy,
        AttributeId::R,
        AttributeId::Fx,
        AttributeId::Fy,
    ];

    let (common, specific) = collect_sources(doc, node, ElementName::RadialGradient, &ATTRS);
    let Resolved { units, common } = resolve_common(doc, node, &common, bbox, current_color)?;

    let source = |i: usize| specific[i].unwrap_or(node);

    let cx: Length<Horizontal> = doc
        .parse_attribute(source(0), AttributeId::Cx, false, None)
        .unwrap_or_else(|| Length::percent(0.5));
    let cy: Length<Vertical> = doc
        .parse_attribute(source(1), AttributeId::Cy, false, None)
        .unwrap_or_else(|| Length::percent(0.5));
    let r: ULength<Both> = doc
        .parse_attribute(source(2), AttributeId::R, false, None)
        .unwrap_or_else(|| ULength::percent(0.5));

    // Without fx or fy in the chain, the focus takes the cx or cy of the element that
    // supplied the center.
    let fx: Length<Horizontal> = match specific[3] {
        Some(n) => doc.parse_attribute(n, AttributeId::Fx, false, None),
        None => doc.parse_attribute(source(0), AttributeId::Cx, false, None),
    }
    .unwrap_or_else(|| Length::percent(0.5));

    let fy: Length<Vertical> = match specific[4] {
        Some(n) => doc.parse_attribute(n, AttributeId::Fy, false, None),
        None => doc.parse_attribute(source(1), AttributeId::Cy, false, None),
    }
    .unwrap_or_else(|| Length::percent(0.5));

    Some(Paint::RadialGradient {
        cx: resolve_length(&cx, units, view),
        cy: resolve_length(&cy, units, view),
        r: resolve_length(&r, units, view),
        fx: resolve_length(&fx, units, view),
        fy: resolve_length(&fy, units, view),
        common,
    })
}

/// Resolves the gradient element `node` into a paint for a shape.
///
/// `bbox` is the shape's bounding box in user space, used for `objectBoundingBox`
/// units; an empty shape gets a degenerate gradient that the canvas does not draw.
/// `current_color` resolves `currentColor` for a `<stop>` element.
///
/// Returns `None` if `node` is not a gradient or the gradient has no stops.
pub fn resolve_gradient(
    doc: &Document<'_>,
    node: NodeId,
    bbox: Option<Rect>,
    view: &ViewParams,
    current_color: &dyn Fn(NodeId) -> RGBA,
) -> Option<Paint> {
    match doc.name(node) {
        ElementName::LinearGradient => resolve_linear(doc, node, bbox, view, current_color),
        ElementName::RadialGradient => resolve_radial(doc, node, bbox, view, current_color),
        _ => None,
    }
}

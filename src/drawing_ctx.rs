//! The main context structure which drives the drawing process.
//!
//! Rendering and measuring are the same tree walk.  Each element that gets rendered
//! pushes a [`RenderState`] that knows its parent state, so the states form a chain
//! from the element being drawn back to the toplevel.  In painting mode, shapes emit
//! commands on a [`Canvas`].  In bounding mode, nothing is drawn; instead each state
//! accumulates the extents of its content, and passes them to its parent when it
//! ends, mapped into the parent's coordinate system.

use std::cell::Cell;

use crate::api::Palette;
use crate::aspect_ratio::AspectRatio;
use crate::canvas::{Canvas, ImagePlacement, Paint, StrokeStyle};
use crate::color::{self, Color, RGBA};
use crate::document::Document;
use crate::element::{AttributeId, ElementName};
use crate::error::RenderingError;
use crate::gradient;
use crate::image::load_data_url;
use crate::length::*;
use crate::minisvg_log;
use crate::node::{NodeId, Reparenting};
use crate::paint_server::PaintServer;
use crate::parsers::UnitInterval;
use crate::path_builder::PathBuilder;
use crate::path_parser;
use crate::property_defs::*;
use crate::rect::{combine_rects, Rect};
use crate::transform::Transform;
use crate::viewbox::ViewBox;

/// Elements nested deeper than this are not rendered.
///
/// This also bounds chains of `<use>` elements that refer to other `<use>` elements.
pub const MAX_RENDER_DEPTH: usize = 256;

/// Holds values that are required to normalize `CssLength` values to a current viewport.
///
/// This is the size of the current viewport in the user's coordinate system.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewParams {
    pub width: f64,
    pub height: f64,
}

impl ViewParams {
    pub fn new(width: f64, height: f64) -> ViewParams {
        ViewParams { width, height }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderMode {
    /// Draw on the canvas.
    Painting,

    /// Reserved for clip paths, which are parsed but not rendered.
    #[allow(dead_code)]
    Clipping,

    /// Compute extents without drawing.
    Bounding,
}

/// Per-element state during the tree walk.
pub struct RenderState<'a> {
    parent: Option<&'a RenderState<'a>>,

    /// Element being rendered.
    node: NodeId,

    /// `<use>` indirections in effect for this element and its descendants.
    reparenting: Option<&'a Reparenting<'a>>,

    mode: RenderMode,

    /// Group opacity, already multiplied with that of the ancestors.
    opacity: f64,

    view: ViewParams,

    /// From this element's user space to device space.
    transform: Transform,

    /// Extents of the content so far, in this element's user space.
    extents: Cell<Option<Rect>>,

    depth: usize,
}

impl RenderState<'static> {
    fn toplevel(node: NodeId, mode: RenderMode, transform: Transform, view: ViewParams) -> Self {
        RenderState {
            parent: None,
            node,
            reparenting: None,
            mode,
            opacity: 1.0,
            view,
            transform,
            extents: Cell::new(None),
            depth: 0,
        }
    }
}

impl<'a> RenderState<'a> {
    /// Whether `node` is already being rendered by this state or one of its ancestors.
    fn has_cycle_reference(&self, node: NodeId) -> bool {
        let mut state = Some(self);

        while let Some(s) = state {
            if s.node == node {
                return true;
            }

            state = s.parent;
        }

        false
    }
}

/// Context for one walk over the tree.
pub struct DrawingCtx<'a, 'src> {
    document: &'a Document<'src>,

    /// `None` when measuring.
    canvas: Option<&'a mut dyn Canvas>,

    /// Value of `currentColor` when no ancestor specifies a `color`.
    current_color: Option<RGBA>,

    palette: Option<&'a dyn Palette>,
}

/// The toplevel drawing routine.
///
/// This creates a `DrawingCtx` internally and draws `node` and its subtree on `canvas`.
pub fn draw_tree<'a>(
    document: &'a Document<'_>,
    node: NodeId,
    canvas: &'a mut dyn Canvas,
    current_color: Option<RGBA>,
    palette: Option<&'a dyn Palette>,
) -> Result<(), RenderingError> {
    let toplevel = RenderState::toplevel(
        document.root(),
        RenderMode::Painting,
        canvas.initial_transform(),
        ViewParams::new(document.width(), document.height()),
    );

    let mut ctx = DrawingCtx {
        document,
        canvas: Some(canvas),
        current_color,
        palette,
    };

    ctx.render_element(node, &toplevel)
}

/// Computes the extents of `node` and its subtree, in the coordinate system in which
/// the node is placed.
///
/// Returns `None` if there is nothing with a size under `node`.
pub fn measure_tree(document: &Document<'_>, node: NodeId) -> Result<Option<Rect>, RenderingError> {
    let toplevel = RenderState::toplevel(
        document.root(),
        RenderMode::Bounding,
        Transform::identity(),
        ViewParams::new(document.width(), document.height()),
    );

    let mut ctx = DrawingCtx {
        document,
        canvas: None,
        current_color: None,
        palette: None,
    };

    ctx.render_element(node, &toplevel)?;

    Ok(toplevel.extents.get())
}

impl<'a, 'src> DrawingCtx<'a, 'src> {
    /// Creates the state for `node` as a child of `parent`.
    ///
    /// The element's `transform` is applied only if the element has a parent, so the
    /// toplevel `<svg>` cannot transform itself.
    fn begin<'s>(
        &self,
        node: NodeId,
        parent: &'s RenderState<'s>,
        reparenting: Option<&'s Reparenting<'s>>,
    ) -> RenderState<'s> {
        let doc = self.document;

        let mut transform = parent.transform;

        if doc.effective_parent(node, reparenting).is_some() {
            if let Some(t) = doc.parse_attribute::<Transform>(
                node,
                AttributeId::Transform,
                false,
                reparenting,
            ) {
                transform = parent.transform.pre_transform(&t);
            }
        }

        let mut opacity = parent.opacity;

        if parent.mode == RenderMode::Painting {
            let Opacity(UnitInterval(o)) = doc.property(node, reparenting);
            opacity *= o;
        }

        RenderState {
            parent: Some(parent),
            node,
            reparenting,
            mode: parent.mode,
            opacity,
            view: parent.view,
            transform,
            extents: Cell::new(None),
            depth: parent.depth + 1,
        }
    }

    /// Adds the extents of `state` to those of its parent.
    fn end(&self, state: &RenderState<'_>) {
        if state.mode == RenderMode::Painting {
            return;
        }

        let (Some(extents), Some(parent)) = (state.extents.get(), state.parent) else {
            return;
        };

        let Some(inverse) = parent.transform.invert() else {
            minisvg_log!(
                self.document.session(),
                "(not measuring {} because its parent has a singular transform)",
                self.document.describe(state.node)
            );
            return;
        };

        let rect = inverse
            .pre_transform(&state.transform)
            .transform_rect(&extents);

        parent.extents.set(combine_rects(parent.extents.get(), Some(rect)));
    }

    fn is_display_none(&self, node: NodeId) -> bool {
        self.document.property::<Display>(node, None) == Display::None
    }

    fn is_visible(&self, node: NodeId, reparenting: Option<&Reparenting<'_>>) -> bool {
        self.document
            .property::<Visibility>(node, reparenting)
            .is_visible()
    }

    /// Parses a geometry attribute, which never inherits.
    fn attr<T>(&self, node: NodeId, attr: AttributeId) -> Option<T>
    where
        T: crate::parsers::Parse,
    {
        self.document.parse_attribute(node, attr, false, None)
    }

    pub fn render_element(
        &mut self,
        node: NodeId,
        parent: &RenderState<'_>,
    ) -> Result<(), RenderingError> {
        if parent.depth >= MAX_RENDER_DEPTH {
            minisvg_log!(
                self.document.session(),
                "(not rendering {} because it is nested too deeply)",
                self.document.describe(node)
            );
            return Ok(());
        }

        match self.document.name(node) {
            ElementName::Svg => self.render_svg(node, parent),
            ElementName::Use => self.render_use(node, parent),
            ElementName::G => self.render_g(node, parent),
            ElementName::Line => self.render_line(node, parent),
            ElementName::Ellipse => self.render_ellipse(node, parent),
            ElementName::Circle => self.render_circle(node, parent),
            ElementName::Rect => self.render_rect(node, parent),
            ElementName::Polyline | ElementName::Polygon => self.render_poly(node, parent),
            ElementName::Path => self.render_path(node, parent),
            ElementName::Image => self.render_image(node, parent),

            // Gradients are paint servers; the rest are containers that are only
            // rendered through a reference.
            ElementName::ClipPath
            | ElementName::Defs
            | ElementName::LinearGradient
            | ElementName::RadialGradient
            | ElementName::Stop
            | ElementName::Symbol
            | ElementName::Unknown => Ok(()),
        }
    }

    fn render_children(&mut self, state: &RenderState<'_>) -> Result<(), RenderingError> {
        let doc = self.document;

        for child in doc.children(state.node) {
            self.render_element(child, state)?;
        }

        Ok(())
    }

    /// Maps the `viewBox` of the state's element into a viewport of `width` by `height`.
    fn apply_view_transform(&self, state: &mut RenderState<'_>, width: f64, height: f64) {
        let Some(vbox) = self.attr::<ViewBox>(state.node, AttributeId::ViewBox) else {
            return;
        };

        let aspect: AspectRatio = self
            .attr(state.node, AttributeId::PreserveAspectRatio)
            .unwrap_or_default();

        state.transform = state
            .transform
            .pre_transform(&aspect.viewport_to_viewbox_transform(&vbox, width, height));
        state.view = ViewParams::new(vbox.width(), vbox.height());
    }

    /// Renders an `<svg>` or `<symbol>` as a new viewport.
    fn render_symbol(
        &mut self,
        node: NodeId,
        parent: &RenderState<'_>,
        viewport: Rect,
    ) -> Result<(), RenderingError> {
        let (width, height) = viewport.size();

        if width <= 0.0 || height <= 0.0 || self.is_display_none(node) {
            return Ok(());
        }

        let mut state = self.begin(node, parent, parent.reparenting);
        state.view = ViewParams::new(width, height);
        state.transform = state.transform.pre_translate(viewport.x0, viewport.y0);
        self.apply_view_transform(&mut state, width, height);

        let res = self.render_children(&state);
        self.end(&state);
        res
    }

    fn render_svg(&mut self, node: NodeId, parent: &RenderState<'_>) -> Result<(), RenderingError> {
        let doc = self.document;

        if doc.effective_parent(node, parent.reparenting).is_none() {
            let viewport = Rect::from_size(doc.width(), doc.height());
            return self.render_symbol(node, parent, viewport);
        }

        let x: Length<Horizontal> = self.attr(node, AttributeId::X).unwrap_or_default();
        let y: Length<Vertical> = self.attr(node, AttributeId::Y).unwrap_or_default();
        let w: ULength<Horizontal> = self
            .attr(node, AttributeId::Width)
            .unwrap_or_else(|| ULength::percent(1.0));
        let h: ULength<Vertical> = self
            .attr(node, AttributeId::Height)
            .unwrap_or_else(|| ULength::percent(1.0));

        let params = &parent.view;
        let viewport = Rect::from_xywh(
            x.normalize(params),
            y.normalize(params),
            w.normalize(params),
            h.normalize(params),
        );

        self.render_symbol(node, parent, viewport)
    }

    fn render_use(&mut self, node: NodeId, parent: &RenderState<'_>) -> Result<(), RenderingError> {
        let doc = self.document;

        if self.is_display_none(node) {
            return Ok(());
        }

        if parent.has_cycle_reference(node) {
            minisvg_log!(
                doc.session(),
                "(not rendering {} because it is part of a reference cycle)",
                doc.describe(node)
            );
            return Ok(());
        }

        let Some(target) = doc.resolve_href(node) else {
            minisvg_log!(
                doc.session(),
                "(not rendering {} because its href does not resolve)",
                doc.describe(node)
            );
            return Ok(());
        };

        let x: Length<Horizontal> = self.attr(node, AttributeId::X).unwrap_or_default();
        let y: Length<Vertical> = self.attr(node, AttributeId::Y).unwrap_or_default();

        // The target is rendered as if it were a child of the <use>.
        let reparenting = Reparenting {
            node: target,
            parent: node,
            outer: parent.reparenting,
        };

        let mut state = self.begin(node, parent, parent.reparenting);
        state.reparenting = Some(&reparenting);
        state.transform = state
            .transform
            .pre_translate(x.normalize(&parent.view), y.normalize(&parent.view));

        let res = match doc.name(target) {
            ElementName::Svg | ElementName::Symbol => self.render_svg(target, &state),
            _ => self.render_element(target, &state),
        };

        self.end(&state);
        res
    }

    fn render_g(&mut self, node: NodeId, parent: &RenderState<'_>) -> Result<(), RenderingError> {
        if self.is_display_none(node) {
            return Ok(());
        }

        let state = self.begin(node, parent, parent.reparenting);
        let res = self.render_children(&state);
        self.end(&state);
        res
    }

    fn should_render_shape(&self, node: NodeId, parent: &RenderState<'_>) -> bool {
        !self.is_display_none(node) && self.is_visible(node, parent.reparenting)
    }

    /// Builds a shape in the document's scratch path with `build`, which returns the
    /// shape's extents, and draws it.
    fn render_shape<F>(
        &mut self,
        node: NodeId,
        parent: &RenderState<'_>,
        build: F,
    ) -> Result<(), RenderingError>
    where
        F: FnOnce(&mut PathBuilder) -> Option<Rect>,
    {
        let doc = self.document;

        let mut path = doc.scratch_path().try_borrow_mut().map_err(|_| {
            RenderingError::Rendering("the document is already being rendered".to_string())
        })?;

        path.clear();
        let extents = build(&mut *path);

        let state = self.begin(node, parent, parent.reparenting);
        state.extents.set(extents);

        let res = self.draw_shape(&state, &path);
        self.end(&state);
        res
    }

    fn render_line(&mut self, node: NodeId, parent: &RenderState<'_>) -> Result<(), RenderingError> {
        if !self.should_render_shape(node, parent) {
            return Ok(());
        }

        let x1: Length<Horizontal> = self.attr(node, AttributeId::X1).unwrap_or_default();
        let y1: Length<Vertical> = self.attr(node, AttributeId::Y1).unwrap_or_default();
        let x2: Length<Horizontal> = self.attr(node, AttributeId::X2).unwrap_or_default();
        let y2: Length<Vertical> = self.attr(node, AttributeId::Y2).unwrap_or_default();

        let params = &parent.view;
        let (x1, y1) = (x1.normalize(params), y1.normalize(params));
        let (x2, y2) = (x2.normalize(params), y2.normalize(params));

        self.render_shape(node, parent, |path| {
            path.move_to(x1, y1);
            path.line_to(x2, y2);
            Some(Rect::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)))
        })
    }

    fn render_ellipse(
        &mut self,
        node: NodeId,
        parent: &RenderState<'_>,
    ) -> Result<(), RenderingError> {
        if !self.should_render_shape(node, parent) {
            return Ok(());
        }

        let rx: ULength<Horizontal> = self.attr(node, AttributeId::Rx).unwrap_or_default();
        let ry: ULength<Vertical> = self.attr(node, AttributeId::Ry).unwrap_or_default();

        if rx.is_zero() || ry.is_zero() {
            return Ok(());
        }

        let cx: Length<Horizontal> = self.attr(node, AttributeId::Cx).unwrap_or_default();
        let cy: Length<Vertical> = self.attr(node, AttributeId::Cy).unwrap_or_default();

        let params = &parent.view;
        let (cx, cy) = (cx.normalize(params), cy.normalize(params));
        let (rx, ry) = (rx.normalize(params), ry.normalize(params));

        self.render_shape(node, parent, |path| {
            path.add_ellipse(cx, cy, rx, ry);
            Some(Rect::new(cx - rx, cy - ry, cx + rx, cy + ry))
        })
    }

    fn render_circle(
        &mut self,
        node: NodeId,
        parent: &RenderState<'_>,
    ) -> Result<(), RenderingError> {
        if !self.should_render_shape(node, parent) {
            return Ok(());
        }

        let r: ULength<Both> = self.attr(node, AttributeId::R).unwrap_or_default();

        if r.is_zero() {
            return Ok(());
        }

        let cx: Length<Horizontal> = self.attr(node, AttributeId::Cx).unwrap_or_default();
        let cy: Length<Vertical> = self.attr(node, AttributeId::Cy).unwrap_or_default();

        let params = &parent.view;
        let (cx, cy, r) = (cx.normalize(params), cy.normalize(params), r.normalize(params));

        self.render_shape(node, parent, |path| {
            path.add_circle(cx, cy, r);
            Some(Rect::new(cx - r, cy - r, cx + r, cy + r))
        })
    }

    fn render_rect(&mut self, node: NodeId, parent: &RenderState<'_>) -> Result<(), RenderingError> {
        if !self.should_render_shape(node, parent) {
            return Ok(());
        }

        let w: ULength<Horizontal> = self.attr(node, AttributeId::Width).unwrap_or_default();
        let h: ULength<Vertical> = self.attr(node, AttributeId::Height).unwrap_or_default();

        if w.is_zero() || h.is_zero() {
            return Ok(());
        }

        let x: Length<Horizontal> = self.attr(node, AttributeId::X).unwrap_or_default();
        let y: Length<Vertical> = self.attr(node, AttributeId::Y).unwrap_or_default();

        let params = &parent.view;

        let rx = self
            .attr::<ULength<Horizontal>>(node, AttributeId::Rx)
            .map(|l| l.normalize(params));
        let ry = self
            .attr::<ULength<Vertical>>(node, AttributeId::Ry)
            .map(|l| l.normalize(params));

        // A missing radius takes the value of the other one.
        let (rx, ry) = match (rx, ry) {
            (None, None) => (0.0, 0.0),
            (Some(rx), None) => (rx, rx),
            (None, Some(ry)) => (ry, ry),
            (Some(rx), Some(ry)) => (rx, ry),
        };

        let (x, y) = (x.normalize(params), y.normalize(params));
        let (w, h) = (w.normalize(params), h.normalize(params));

        self.render_shape(node, parent, |path| {
            path.add_round_rect(x, y, w, h, rx, ry);
            Some(Rect::from_xywh(x, y, w, h))
        })
    }

    fn render_poly(&mut self, node: NodeId, parent: &RenderState<'_>) -> Result<(), RenderingError> {
        if !self.should_render_shape(node, parent) {
            return Ok(());
        }

        let doc = self.document;
        let close = doc.name(node) == ElementName::Polygon;
        let points = doc.attribute(node, AttributeId::Points, false, None);

        self.render_shape(node, parent, |path| {
            if let Some(points) = points {
                if let Err(e) = path_parser::parse_points(path, points, close) {
                    minisvg_log!(
                        doc.session(),
                        "(invalid points in {}: {})",
                        doc.describe(node),
                        e
                    );
                }
            }

            path.extents()
        })
    }

    fn render_path(&mut self, node: NodeId, parent: &RenderState<'_>) -> Result<(), RenderingError> {
        if !self.should_render_shape(node, parent) {
            return Ok(());
        }

        let doc = self.document;
        let data = doc.attribute(node, AttributeId::D, false, None);

        self.render_shape(node, parent, |path| {
            if let Some(data) = data {
                if let Err(e) = path.parse(data) {
                    minisvg_log!(
                        doc.session(),
                        "(invalid path data in {}: {})",
                        doc.describe(node),
                        e
                    );
                }
            }

            path.extents()
        })
    }

    fn render_image(
        &mut self,
        node: NodeId,
        parent: &RenderState<'_>,
    ) -> Result<(), RenderingError> {
        if !self.should_render_shape(node, parent) {
            return Ok(());
        }

        let w: ULength<Horizontal> = self.attr(node, AttributeId::Width).unwrap_or_default();
        let h: ULength<Vertical> = self.attr(node, AttributeId::Height).unwrap_or_default();

        if w.is_zero() || h.is_zero() {
            return Ok(());
        }

        let x: Length<Horizontal> = self.attr(node, AttributeId::X).unwrap_or_default();
        let y: Length<Vertical> = self.attr(node, AttributeId::Y).unwrap_or_default();

        let params = &parent.view;
        let rect = Rect::from_xywh(
            x.normalize(params),
            y.normalize(params),
            w.normalize(params),
            h.normalize(params),
        );

        let state = self.begin(node, parent, parent.reparenting);
        state.extents.set(Some(rect));

        let res = if state.mode == RenderMode::Painting {
            self.draw_image(&state, rect)
        } else {
            Ok(())
        };

        self.end(&state);
        res
    }

    fn draw_image(&mut self, state: &RenderState<'_>, rect: Rect) -> Result<(), RenderingError> {
        let doc = self.document;
        let node = state.node;

        let Some(href) = doc.attribute(node, AttributeId::Href, false, None) else {
            return Ok(());
        };

        let image = match load_data_url(href) {
            Ok(image) => image,
            Err(e) => {
                minisvg_log!(
                    doc.session(),
                    "(could not load image for {}: {})",
                    doc.describe(node),
                    e
                );
                return Ok(());
            }
        };

        let aspect: AspectRatio = self
            .attr(node, AttributeId::PreserveAspectRatio)
            .unwrap_or_default();

        let image_rect = Rect::from_size(f64::from(image.width()), f64::from(image.height()));
        let (dst, src) = aspect.fit_image(rect, image_rect);

        let sx = dst.width() / src.width();
        let sy = dst.height() / src.height();

        let placement = ImagePlacement {
            transform: state.transform.pre_translate(dst.x0, dst.y0),
            image_transform: Transform::new(
                sx,
                0.0,
                0.0,
                sy,
                -src.x0 * sx,
                -src.y0 * sy,
            ),
            width: dst.width(),
            height: dst.height(),
        };

        match self.canvas.as_deref_mut() {
            Some(canvas) => canvas.draw_image(&image, &placement, state.opacity),
            None => Ok(()),
        }
    }

    /// Fills and strokes the shape in `path`, or grows the state's extents by the
    /// stroke when measuring.
    fn draw_shape(&mut self, state: &RenderState<'_>, path: &PathBuilder) -> Result<(), RenderingError> {
        let doc = self.document;
        let node = state.node;
        let reparenting = state.reparenting;

        let Stroke(stroke) = doc.property(node, reparenting);
        let has_stroke = stroke != PaintServer::None;

        // Stroke parameters are only looked up when there is a stroke.
        let (width, line_cap, line_join, miter_limit) = if has_stroke {
            let StrokeWidth(width) = doc.property(node, reparenting);
            let line_cap: StrokeLinecap = doc.property(node, reparenting);
            let line_join: StrokeLinejoin = doc.property(node, reparenting);
            let StrokeMiterlimit(miter_limit) = doc.property(node, reparenting);
            (width, line_cap, line_join, miter_limit)
        } else {
            let StrokeWidth(width) = StrokeWidth::default();
            let StrokeMiterlimit(miter_limit) = StrokeMiterlimit::default();
            (
                width,
                StrokeLinecap::default(),
                StrokeLinejoin::default(),
                miter_limit,
            )
        };

        match state.mode {
            RenderMode::Painting => (),

            RenderMode::Clipping => return Ok(()),

            RenderMode::Bounding => {
                if has_stroke {
                    let half_width = width.normalize(&state.view) / 2.0;

                    let cap_limit = if line_cap == StrokeLinecap::Square {
                        half_width * std::f64::consts::SQRT_2
                    } else {
                        half_width
                    };

                    let join_limit = if line_join == StrokeLinejoin::Miter {
                        half_width * miter_limit
                    } else {
                        half_width
                    };

                    let delta = cap_limit.max(join_limit);
                    state.extents.set(state.extents.get().map(|r| r.inflate(delta)));
                }

                return Ok(());
            }
        }

        let Fill(fill) = doc.property(node, reparenting);

        if let Some(paint) = self.resolve_paint(&fill, state) {
            let FillOpacity(UnitInterval(fill_opacity)) = doc.property(node, reparenting);
            let fill_rule: FillRule = doc.property(node, reparenting);

            if let Some(canvas) = self.canvas.as_deref_mut() {
                canvas.fill(
                    path,
                    &state.transform,
                    &paint,
                    fill_opacity * state.opacity,
                    fill_rule,
                )?;
            }
        }

        if let Some(paint) = self.resolve_paint(&stroke, state) {
            let StrokeOpacity(UnitInterval(stroke_opacity)) = doc.property(node, reparenting);
            let StrokeDashoffset(dash_offset) = doc.property(node, reparenting);
            let StrokeDasharray(dasharray) = doc.property(node, reparenting);

            let params = &state.view;

            let style = StrokeStyle {
                width: width.normalize(params),
                line_cap,
                line_join,
                miter_limit,
                dashes: dasharray.normalize(params),
                dash_offset: dash_offset.normalize(params),
            };

            if let Some(canvas) = self.canvas.as_deref_mut() {
                canvas.stroke(
                    path,
                    &state.transform,
                    &paint,
                    stroke_opacity * state.opacity,
                    &style,
                )?;
            }
        }

        Ok(())
    }

    /// Turns a `fill` or `stroke` value into a paint for the state's element.
    ///
    /// Returns `None` when nothing should be painted.
    fn resolve_paint(&self, paint: &PaintServer, state: &RenderState<'_>) -> Option<Paint> {
        let doc = self.document;
        let node = state.node;
        let reparenting = state.reparenting;

        match *paint {
            PaintServer::None => None,

            PaintServer::SolidColor(color) => Some(Paint::Color(self.resolve_color(
                color,
                node,
                reparenting,
            ))),

            PaintServer::Var {
                ref name,
                fallback,
            } => {
                let color = self
                    .palette
                    .and_then(|palette| palette.lookup(name))
                    .unwrap_or(fallback);

                Some(Paint::Color(self.resolve_color(color, node, reparenting)))
            }

            PaintServer::Iri { ref id, fallback } => match doc.element_by_id(id) {
                None => {
                    minisvg_log!(
                        doc.session(),
                        "(paint server \"{}\" for {} does not exist; using the fallback)",
                        id,
                        doc.describe(node)
                    );

                    Some(Paint::Color(self.resolve_color(fallback, node, reparenting)))
                }

                Some(target) if doc.name(target).is_gradient() => gradient::resolve_gradient(
                    doc,
                    target,
                    state.extents.get(),
                    &state.view,
                    &|stop| self.resolve_current_color(stop, None),
                ),

                Some(target) => {
                    minisvg_log!(
                        doc.session(),
                        "(element {} referenced by {} is not a paint server)",
                        doc.describe(target),
                        doc.describe(node)
                    );

                    None
                }
            },
        }
    }

    fn resolve_color(
        &self,
        color: Color,
        node: NodeId,
        reparenting: Option<&Reparenting<'_>>,
    ) -> RGBA {
        match color {
            Color::RGBA(rgba) => rgba,
            Color::CurrentColor => self.resolve_current_color(node, reparenting),
        }
    }

    /// Finds the value of `currentColor` for `node`.
    ///
    /// This is the nearest `color` attribute, starting at the node and going up through
    /// its ancestors, that is a real color.  Past the root, it is the color the caller
    /// supplied, or black.
    fn resolve_current_color(&self, node: NodeId, reparenting: Option<&Reparenting<'_>>) -> RGBA {
        let doc = self.document;
        let mut current = Some(node);

        while let Some(n) = current {
            match doc.attribute(n, AttributeId::Color, false, None) {
                None | Some("inherit") => (),

                Some(_) => {
                    if let Some(Color::RGBA(rgba)) =
                        doc.parse_attribute(n, AttributeId::Color, false, None)
                    {
                        return rgba;
                    }
                }
            }

            current = doc.effective_parent(n, reparenting);
        }

        self.current_color.unwrap_or_else(color::black)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CanvasCommand, RecordingCanvas};
    use crate::document::Document;
    use crate::session::Session;
    use crate::span::Source;
    use cairo::PathSegment;
    use pretty_assertions::assert_eq;

    fn load(src: &str) -> Document<'_> {
        Document::load(
            Source::Borrowed(src),
            -1.0,
            -1.0,
            Session::new_for_test_suite(),
        )
        .unwrap()
    }

    fn draw(doc: &Document<'_>, current_color: Option<RGBA>) -> Vec<CanvasCommand> {
        let mut canvas = RecordingCanvas::new();
        draw_tree(doc, doc.root(), &mut canvas, current_color, None).unwrap();
        canvas.into_commands()
    }

    fn measure(doc: &Document<'_>, id: &str) -> Option<Rect> {
        measure_tree(doc, doc.element_by_id(id).unwrap()).unwrap()
    }

    fn fill_color(cmd: &CanvasCommand) -> RGBA {
        match *cmd {
            CanvasCommand::Fill {
                paint: Paint::Color(rgba),
                ..
            } => rgba,
            _ => panic!("expected a solid fill, got {:?}", cmd),
        }
    }

    #[test]
    fn default_fill_is_black_and_no_stroke() {
        let doc = load(r#"<svg width="10" height="10"><rect width="4" height="2"/></svg>"#);
        let cmds = draw(&doc, None);

        assert_eq!(cmds.len(), 1);
        assert_eq!(fill_color(&cmds[0]), RGBA::new(0, 0, 0, 255));
    }

    #[test]
    fn opacity_multiplies_down_the_tree() {
        let doc = load(
            r#"<svg width="10" height="10">
                 <g opacity="0.5">
                   <g opacity="50%">
                     <rect width="1" height="1" fill-opacity="0.5"/>
                   </g>
                 </g>
               </svg>"#,
        );

        match draw(&doc, None)[0] {
            CanvasCommand::Fill { opacity, .. } => assert_eq!(opacity, 0.125),
            ref c => panic!("unexpected {:?}", c),
        }
    }

    #[test]
    fn toplevel_transform_is_ignored() {
        let doc = load(
            r#"<svg width="10" height="10" transform="scale(2)">
                 <rect width="1" height="1" transform="translate(3, 4)"/>
               </svg>"#,
        );

        match draw(&doc, None)[0] {
            CanvasCommand::Fill { transform, .. } => {
                assert_eq!(transform, Transform::new_translate(3.0, 4.0))
            }
            ref c => panic!("unexpected {:?}", c),
        }
    }

    #[test]
    fn current_color_walks_ancestors() {
        let doc = load(
            r#"<svg width="10" height="10" color="red">
                 <g color="inherit">
                   <g color="currentColor">
                     <rect width="1" height="1" fill="currentColor"/>
                   </g>
                 </g>
                 <rect width="1" height="1" fill="currentColor" color="lime"/>
               </svg>"#,
        );

        let cmds = draw(&doc, None);
        assert_eq!(fill_color(&cmds[0]), RGBA::new(255, 0, 0, 255));
        assert_eq!(fill_color(&cmds[1]), RGBA::new(0, 255, 0, 255));
    }

    #[test]
    fn current_color_falls_back_to_caller() {
        let doc = load(
            r#"<svg width="10" height="10"><rect width="1" height="1" fill="currentColor"/></svg>"#,
        );

        let blue = RGBA::new(0, 0, 255, 255);
        assert_eq!(fill_color(&draw(&doc, Some(blue))[0]), blue);
        assert_eq!(fill_color(&draw(&doc, None)[0]), RGBA::new(0, 0, 0, 255));
    }

    #[test]
    fn missing_paint_server_uses_fallback() {
        let doc = load(
            r##"<svg width="10" height="10">
                  <rect width="1" height="1" fill="url(#nope) lime"/>
                  <rect width="1" height="1" fill="url(#r)"/>
                  <rect id="r" width="1" height="1" fill="none"/>
                </svg>"##,
        );

        let cmds = draw(&doc, None);
        assert_eq!(cmds.len(), 1);
        assert_eq!(fill_color(&cmds[0]), RGBA::new(0, 255, 0, 255));
    }

    #[test]
    fn hidden_and_undisplayed_elements_are_skipped() {
        let doc = load(
            r#"<svg width="10" height="10">
                 <g visibility="hidden"><rect width="1" height="1"/></g>
                 <g display="none"><rect width="1" height="1"/></g>
                 <rect width="1" height="1" style="display:none"/>
                 <rect width="0" height="1"/>
                 <circle r="0"/>
                 <ellipse rx="1"/>
               </svg>"#,
        );

        assert!(draw(&doc, None).is_empty());
    }

    #[test]
    fn stroke_uses_its_own_parameters() {
        let doc = load(
            r#"<svg width="10" height="10">
                 <line x2="5" stroke="red" stroke-width="2" stroke-linecap="round"
                       stroke-dasharray="1 2" stroke-opacity="0.5"/>
               </svg>"#,
        );

        let cmds = draw(&doc, None);
        assert_eq!(cmds.len(), 2);

        match cmds[1] {
            CanvasCommand::Stroke {
                ref path,
                opacity,
                ref style,
                ..
            } => {
                assert_eq!(
                    path,
                    &vec![
                        PathSegment::MoveTo((0.0, 0.0)),
                        PathSegment::LineTo((5.0, 0.0))
                    ]
                );
                assert_eq!(opacity, 0.5);
                assert_eq!(style.width, 2.0);
                assert_eq!(style.line_cap, StrokeLinecap::Round);
                assert_eq!(style.dashes, Some(vec![1.0, 2.0]));
            }
            ref c => panic!("unexpected {:?}", c),
        }
    }

    #[test]
    fn measures_shapes_through_transforms() {
        let doc = load(
            r#"<svg width="100" height="100">
                 <g id="g" transform="translate(10, 20)">
                   <rect x="1" y="2" width="3" height="4" transform="scale(2)"/>
                   <circle cx="50" cy="50" r="5"/>
                 </g>
               </svg>"#,
        );

        assert_eq!(
            measure(&doc, "g"),
            Some(Rect::new(12.0, 24.0, 65.0, 75.0))
        );
    }

    #[test]
    fn stroke_grows_extents() {
        let doc = load(
            r#"<svg width="100" height="100">
                 <rect id="miter" width="10" height="10" stroke="black" stroke-width="2"/>
                 <rect id="round" width="10" height="10" stroke="black" stroke-width="2"
                       stroke-linejoin="round"/>
                 <rect id="square" width="10" height="10" stroke="black" stroke-width="2"
                       stroke-linejoin="bevel" stroke-linecap="square"/>
               </svg>"#,
        );

        assert_eq!(measure(&doc, "miter"), Some(Rect::new(-4.0, -4.0, 14.0, 14.0)));
        assert_eq!(measure(&doc, "round"), Some(Rect::new(-1.0, -1.0, 11.0, 11.0)));

        let square = measure(&doc, "square").unwrap();
        assert!(square.approx_eq(&Rect::new(
            -std::f64::consts::SQRT_2,
            -std::f64::consts::SQRT_2,
            10.0 + std::f64::consts::SQRT_2,
            10.0 + std::f64::consts::SQRT_2,
        )));
    }

    #[test]
    fn use_translates_and_inherits_from_use() {
        let doc = load(
            r##"<svg width="100" height="100">
                  <defs><rect id="r" width="2" height="2"/></defs>
                  <use href="#r" x="5" y="6" fill="lime"/>
                </svg>"##,
        );

        let cmds = draw(&doc, None);
        assert_eq!(cmds.len(), 1);

        match cmds[0] {
            CanvasCommand::Fill {
                transform,
                paint: Paint::Color(rgba),
                ..
            } => {
                assert_eq!(transform, Transform::new_translate(5.0, 6.0));
                assert_eq!(rgba, RGBA::new(0, 255, 0, 255));
            }
            ref c => panic!("unexpected {:?}", c),
        }
    }

    #[test]
    fn use_cycles_are_skipped() {
        let doc = load(
            r##"<svg width="100" height="100">
                  <g id="a"><rect width="1" height="1"/><use href="#a"/></g>
                  <use id="self" href="#self"/>
                  <use id="b" href="#c"/>
                  <use id="c" href="#b"/>
                </svg>"##,
        );

        // the rectangle is drawn directly and once more through the first <use>
        assert_eq!(draw(&doc, None).len(), 2);
    }

    #[test]
    fn symbol_establishes_viewport() {
        let doc = load(
            r##"<svg width="100" height="100">
                  <symbol id="s" viewBox="0 0 10 10" width="20" height="10">
                    <rect width="10" height="10"/>
                  </symbol>
                  <use href="#s"/>
                  <symbol><rect width="1" height="1"/></symbol>
                </svg>"##,
        );

        let cmds = draw(&doc, None);
        assert_eq!(cmds.len(), 1);

        match cmds[0] {
            CanvasCommand::Fill { transform, .. } => assert_eq!(
                transform,
                Transform::new(1.0, 0.0, 0.0, 1.0, 5.0, 0.0)
            ),
            ref c => panic!("unexpected {:?}", c),
        }
    }

    #[test]
    fn nested_svg_resolves_percentages_against_viewport() {
        let doc = load(
            r#"<svg width="200" height="100">
                 <svg x="10" width="50%" height="50%">
                   <rect width="100%" height="100%"/>
                 </svg>
               </svg>"#,
        );

        assert_eq!(
            measure_tree(&doc, doc.root()).unwrap(),
            Some(Rect::new(10.0, 0.0, 110.0, 50.0))
        );
    }

    #[test]
    fn deep_use_chains_are_cut_off() {
        // Each group refers to the next one, so the tree is shallow but rendering
        // goes through hundreds of levels.
        let mut src = String::from(r#"<svg width="10" height="10"><defs>"#);
        for i in 0..300 {
            src.push_str(&format!(r##"<g id="g{}"><use href="#g{}"/></g>"##, i, i + 1));
        }
        src.push_str(r##"<rect id="g300" width="1" height="1"/></defs><use href="#g0"/></svg>"##);

        let doc = load(&src);
        assert!(draw(&doc, None).is_empty());
    }

    #[test]
    fn bad_path_data_keeps_prefix() {
        let doc = load(r#"<svg width="10" height="10"><path d="M1 2 L3 4 L oops"/></svg>"#);

        match draw(&doc, None)[0] {
            CanvasCommand::Fill { ref path, .. } => assert_eq!(
                path,
                &vec![PathSegment::MoveTo((1.0, 2.0)), PathSegment::LineTo((3.0, 4.0))]
            ),
            ref c => panic!("unexpected {:?}", c),
        }
    }
}

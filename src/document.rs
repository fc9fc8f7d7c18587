//! Main SVG document structure.

use std::cell::RefCell;
use std::fmt;

use crate::element::{AttributeId, ElementName};
use crate::error::{LoadingError, RenderingError};
use crate::id_index::IdIndex;
use crate::length::*;
use crate::minisvg_log;
use crate::node::{Children, NodeId, Reparenting, Tree};
use crate::parsers::{Parse, ParseValue};
use crate::path_builder::PathBuilder;
use crate::property_macros::Property;
use crate::rect::Rect;
use crate::session::Session;
use crate::span::Source;
use crate::viewbox::ViewBox;
use crate::{drawing_ctx, xml};

/// Intrinsic size used when the root has no usable `width`, with no `viewBox` to
/// derive it from.
const DEFAULT_WIDTH: f64 = 300.0;

/// Same as [`DEFAULT_WIDTH`], for the height.
const DEFAULT_HEIGHT: f64 = 150.0;

/// A loaded SVG file and its derived data.
///
/// The document refers to its source text instead of copying attribute values out of
/// it.  `'src` is the lifetime of that text when the document borrows it; a document
/// that owns its text is `Document<'static>`.
pub struct Document<'src> {
    source: Source<'src>,

    /// Tree of elements; the root is guaranteed to be an `<svg>` element.
    tree: Tree,

    /// Mapping from `id` attributes to elements.
    ids: IdIndex<NodeId>,

    root: NodeId,

    width: f64,
    height: f64,

    /// Scratch space for the geometry of the shape being rendered.
    ///
    /// Rendering borrows this mutably, so a document cannot be rendered from inside
    /// one of its own rendering callbacks.
    path: RefCell<PathBuilder>,

    session: Session,
}

impl fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("num_nodes", &self.tree.num_nodes())
            .field("num_ids", &self.ids.len())
            .finish()
    }
}

impl<'src> Document<'src> {
    /// Parses `source` and computes the document's intrinsic size.
    ///
    /// The container size is what percentages in the root's `width` and `height` refer
    /// to.  A negative container size means that it is unknown.
    pub(crate) fn load(
        source: Source<'src>,
        container_width: f64,
        container_height: f64,
        session: Session,
    ) -> Result<Document<'src>, LoadingError> {
        let xml::ParsedTree { tree, ids, root } = xml::parse_tree(source.as_str(), &session)?;

        let mut document = Document {
            source,
            tree,
            ids,
            root,
            width: 0.0,
            height: 0.0,
            path: RefCell::new(PathBuilder::new()),
            session,
        };

        let (width, height) = document.intrinsic_size(container_width, container_height);

        if width <= 0.0 || height <= 0.0 {
            minisvg_log!(
                document.session,
                "could not load SVG: intrinsic size is {}x{}",
                width,
                height
            );
            return Err(LoadingError::InvalidSize);
        }

        document.width = width;
        document.height = height;

        Ok(document)
    }

    /// Resolves the root's `width` and `height`, which default to 100%.
    ///
    /// When either is not positive, the `viewBox` supplies the missing dimension
    /// through its aspect ratio, or both dimensions when both are missing.  Without a
    /// `viewBox`, a dimension that resolved to exactly -1 (100% of an unknown
    /// container) takes the default of 300 by 150.
    fn intrinsic_size(&self, container_width: f64, container_height: f64) -> (f64, f64) {
        let root = self.root;

        let w: ULength<Horizontal> = self
            .parse_attribute(root, AttributeId::Width, false, None)
            .unwrap_or_else(|| ULength::percent(1.0));
        let h: ULength<Vertical> = self
            .parse_attribute(root, AttributeId::Height, false, None)
            .unwrap_or_else(|| ULength::percent(1.0));

        let mut width = w.resolve(container_width);
        let mut height = h.resolve(container_height);

        if width > 0.0 && height > 0.0 {
            return (width, height);
        }

        match self.parse_attribute::<ViewBox>(root, AttributeId::ViewBox, false, None) {
            Some(vbox) => {
                let ratio = vbox.aspect_ratio();

                if width <= 0.0 && height > 0.0 {
                    width = height * ratio;
                } else if width > 0.0 && height <= 0.0 {
                    height = width / ratio;
                } else {
                    width = vbox.width();
                    height = vbox.height();
                }
            }

            None => {
                if width == -1.0 {
                    width = DEFAULT_WIDTH;
                }

                if height == -1.0 {
                    height = DEFAULT_HEIGHT;
                }
            }
        }

        (width, height)
    }

    /// Intrinsic width, in pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Intrinsic height, in pixels.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// The toplevel `<svg>` element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Looks up an element by its `id`.
    ///
    /// If several elements have the same `id`, this returns the last one in the
    /// document.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }

        self.ids.get(self.source.as_str(), id)
    }

    /// The tag name of an element, like `"rect"`.
    pub fn element_name(&self, node: NodeId) -> &'static str {
        self.tree.name(node).name()
    }

    /// Computes the bounding box of an element and its subtree, or of the whole
    /// document when `id` is `None`.
    ///
    /// Strokes are included conservatively.  The result is in the coordinate system
    /// where the element is placed, so an element's own `transform` is part of it.  A
    /// document or element with nothing to measure yields an empty rectangle.
    pub fn extents(&self, id: Option<&str>) -> Result<Rect, RenderingError> {
        let node = self.lookup(id)?;

        Ok(drawing_ctx::measure_tree(self, node)?.unwrap_or_default())
    }

    /// The root, or the element with the given `id`.
    pub(crate) fn lookup(&self, id: Option<&str>) -> Result<NodeId, RenderingError> {
        match id {
            None => Ok(self.root),
            Some(id) => self.element_by_id(id).ok_or_else(|| {
                minisvg_log!(self.session, "element \"{}\" does not exist", id);
                RenderingError::IdNotFound
            }),
        }
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn scratch_path(&self) -> &RefCell<PathBuilder> {
        &self.path
    }

    pub(crate) fn name(&self, node: NodeId) -> ElementName {
        self.tree.name(node)
    }

    pub(crate) fn children(&self, node: NodeId) -> Children<'_> {
        self.tree.children(node)
    }

    pub(crate) fn effective_parent(
        &self,
        node: NodeId,
        reparenting: Option<&Reparenting<'_>>,
    ) -> Option<NodeId> {
        self.tree.effective_parent(node, reparenting)
    }

    pub(crate) fn has_attribute(&self, node: NodeId, attr: AttributeId) -> bool {
        self.tree.has_attribute(node, attr)
    }

    /// A short description of an element for log messages, like `rect#12`.
    pub(crate) fn describe(&self, node: NodeId) -> String {
        format!("{}{:?}", self.tree.name(node).name(), node)
    }

    /// The raw value of an attribute; see [`Tree::find_attribute`] for `inherit`.
    pub(crate) fn attribute(
        &self,
        node: NodeId,
        attr: AttributeId,
        inherit: bool,
        reparenting: Option<&Reparenting<'_>>,
    ) -> Option<&str> {
        let src = self.source.as_str();

        self.tree
            .find_attribute(node, attr, inherit, src, reparenting)
            .map(|span| span.as_str(src))
    }

    /// Looks up and parses an attribute.
    ///
    /// An invalid value is logged and treated as if the attribute were not there.
    pub(crate) fn parse_attribute<T: Parse>(
        &self,
        node: NodeId,
        attr: AttributeId,
        inherit: bool,
        reparenting: Option<&Reparenting<'_>>,
    ) -> Option<T> {
        let value = self.attribute(node, attr, inherit, reparenting)?;

        match attr.parse(value) {
            Ok(v) => Some(v),
            Err(e) => {
                minisvg_log!(
                    self.session,
                    "(ignoring invalid attribute on {}: {})",
                    self.describe(node),
                    e
                );
                None
            }
        }
    }

    /// Parses an attribute of the element itself, or returns the type's default.
    pub(crate) fn parse_attribute_or_default<T: Parse + Default>(
        &self,
        node: NodeId,
        attr: AttributeId,
    ) -> T {
        self.parse_attribute(node, attr, false, None)
            .unwrap_or_default()
    }

    /// Computes a presentation property, inheriting it from the ancestors if the
    /// property inherits.
    pub(crate) fn property<P: Property>(
        &self,
        node: NodeId,
        reparenting: Option<&Reparenting<'_>>,
    ) -> P {
        self.parse_attribute(
            node,
            P::attribute(),
            P::inherits_automatically(),
            reparenting,
        )
        .unwrap_or_default()
    }

    /// Finds the element referenced by the `href` of `node`.
    ///
    /// Only same-document references like `#foo` are supported.
    pub(crate) fn resolve_href(&self, node: NodeId) -> Option<NodeId> {
        let href = self.attribute(node, AttributeId::Href, false, None)?;

        match href.strip_prefix('#') {
            Some(id) if !id.is_empty() => self.element_by_id(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property_defs::{Fill, StrokeWidth};
    use crate::{assert_approx_eq_cairo, paint_server::PaintServer};
    use matches::matches;

    fn load_with_container(src: &str, w: f64, h: f64) -> Result<Document<'_>, LoadingError> {
        Document::load(Source::Borrowed(src), w, h, Session::new_for_test_suite())
    }

    fn size(src: &str, w: f64, h: f64) -> (f64, f64) {
        let doc = load_with_container(src, w, h).unwrap();
        (doc.width(), doc.height())
    }

    #[test]
    fn size_from_width_and_height() {
        assert_eq!(size(r#"<svg width="20" height="10"/>"#, -1.0, -1.0), (20.0, 10.0));
        assert_eq!(size(r#"<svg width="1in" height="10"/>"#, -1.0, -1.0), (96.0, 10.0));
    }

    #[test]
    fn percentages_refer_to_container() {
        assert_eq!(
            size(r#"<svg width="50%" height="50%"/>"#, 200.0, 100.0),
            (100.0, 50.0)
        );
        assert_eq!(size(r#"<svg/>"#, 200.0, 100.0), (200.0, 100.0));
    }

    #[test]
    fn size_from_view_box() {
        assert_eq!(size(r#"<svg viewBox="0 0 40 20"/>"#, -1.0, -1.0), (40.0, 20.0));
        assert_eq!(size(r#"<svg viewBox="0 0 40 20"/>"#, 80.0, -1.0), (80.0, 40.0));
        assert_eq!(size(r#"<svg viewBox="0 0 40 20"/>"#, -1.0, 10.0), (20.0, 10.0));
        assert_eq!(
            size(r#"<svg width="0" viewBox="0 0 40 20"/>"#, 100.0, 100.0),
            (200.0, 100.0)
        );
    }

    #[test]
    fn default_size_without_view_box() {
        assert_eq!(size(r#"<svg/>"#, -1.0, -1.0), (300.0, 150.0));
        assert_eq!(size(r#"<svg width="10"/>"#, -1.0, -1.0), (10.0, 150.0));
    }

    #[test]
    fn non_positive_size_fails() {
        assert!(matches!(
            load_with_container(r#"<svg width="0" height="10"/>"#, -1.0, -1.0),
            Err(LoadingError::InvalidSize)
        ));
        assert!(matches!(
            load_with_container(r#"<svg/>"#, -2.0, 10.0),
            Err(LoadingError::InvalidSize)
        ));
    }

    #[test]
    fn invalid_size_attribute_uses_default() {
        assert_eq!(
            size(r#"<svg width="-5" height="foo"/>"#, 100.0, 50.0),
            (100.0, 50.0)
        );
    }

    #[test]
    fn properties_inherit_and_fall_back_to_defaults() {
        let src = r#"<svg width="1" height="1" stroke-width="3"><g fill="bogus"><rect id="r"/></g></svg>"#;
        let doc = load_with_container(src, -1.0, -1.0).unwrap();
        let rect = doc.element_by_id("r").unwrap();

        let StrokeWidth(w) = doc.property(rect, None);
        assert_approx_eq_cairo!(w.length, 3.0);

        let Fill(fill) = doc.property(rect, None);
        assert_eq!(fill, Fill::default().0);
        assert!(matches!(fill, PaintServer::SolidColor(_)));
    }

    #[test]
    fn resolves_same_document_hrefs() {
        let src = r##"<svg width="1" height="1">
                        <rect id="a"/>
                        <use id="u1" href="#a"/>
                        <use id="u2" href="a"/>
                        <use id="u3" href="#"/>
                        <use id="u4" href="#missing"/>
                      </svg>"##;
        let doc = load_with_container(src, -1.0, -1.0).unwrap();

        let id = |s| doc.element_by_id(s).unwrap();

        assert_eq!(doc.resolve_href(id("u1")), Some(id("a")));
        assert_eq!(doc.resolve_href(id("u2")), None);
        assert_eq!(doc.resolve_href(id("u3")), None);
        assert_eq!(doc.resolve_href(id("u4")), None);
    }

    #[test]
    fn extents_of_missing_id_is_an_error() {
        let doc = load_with_container(r#"<svg width="1" height="1"/>"#, -1.0, -1.0).unwrap();

        assert_eq!(doc.extents(Some("nope")), Err(RenderingError::IdNotFound));
        assert_eq!(doc.extents(None), Ok(Rect::default()));
    }
}

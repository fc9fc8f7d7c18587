//! The markup parser.
//!
//! This is a single forward scan over the source text.  It understands the small part of
//! XML that SVG files actually use: the `<?xml ... ?>` declaration, comments, CDATA
//! sections, a `DOCTYPE` with an internal subset, and ordinary elements with quoted
//! attributes.  There is no text node model; character data between tags is skipped.
//! Entities are not expanded.
//!
//! Elements whose names are not in [`ElementName`] are skipped together with their
//! whole subtree.  The parser only counts nesting depth while skipping, so anything
//! inside a skipped subtree, including known elements, never reaches the tree.
//!
//! Any structural error makes the whole load fail; there is no partial document.

use crate::element::ElementName;
use crate::error::LoadingError;
use crate::id_index::IdIndex;
use crate::minisvg_log;
use crate::node::{NodeId, Tree};
use crate::session::Session;
use crate::span::Span;

mod attributes;

/// The tree built by the parser, before the document computes its size.
pub struct ParsedTree {
    pub tree: Tree,
    pub ids: IdIndex<NodeId>,
    pub root: NodeId,
}

/// A cursor over the source bytes.
///
/// All the delimiters we look for are ASCII, so positions where we stop are always
/// on character boundaries.
pub(crate) struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

pub(crate) fn is_ws(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_name_start_char(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b':'
}

fn is_name_char(c: u8) -> bool {
    is_name_start_char(c) || c.is_ascii_digit() || c == b'-' || c == b'.'
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Scanner<'a> {
        Scanner {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    /// A scanner over `span` of `src`; positions stay relative to the whole source.
    pub fn for_span(src: &'a str, span: Span) -> Scanner<'a> {
        Scanner {
            src,
            bytes: &src.as_bytes()[..span.end()],
            pos: span.start,
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Consumes `c` if it is the next byte.
    pub fn skip_delim(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes `s` if the input continues with it.
    pub fn skip_str(&mut self, s: &str) -> bool {
        if self.bytes[self.pos..].starts_with(s.as_bytes()) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Skips whitespace; returns whether there is input left.
    pub fn skip_ws(&mut self) -> bool {
        while matches!(self.peek(), Some(c) if is_ws(c)) {
            self.pos += 1;
        }

        !self.at_end()
    }

    pub fn skip_while(&mut self, f: impl Fn(u8) -> bool) {
        while matches!(self.peek(), Some(c) if f(c)) {
            self.pos += 1;
        }
    }

    /// Moves past the next occurrence of `s`.
    pub fn skip_past(&mut self, s: &str) -> bool {
        let needle = s.as_bytes();

        match self.bytes[self.pos..]
            .windows(needle.len())
            .position(|w| w == needle)
        {
            Some(offset) => {
                self.pos += offset + needle.len();
                true
            }

            None => {
                self.pos = self.bytes.len();
                false
            }
        }
    }

    /// Scans an XML name, if there is one at the cursor.
    pub fn name(&mut self) -> Option<Span> {
        match self.peek() {
            Some(c) if is_name_start_char(c) => {
                let start = self.pos;
                self.pos += 1;
                self.skip_while(is_name_char);
                Some(Span::new(start, self.pos))
            }

            _ => None,
        }
    }

    pub fn slice(&self, span: Span) -> &'a str {
        span.as_str(self.src)
    }

    pub fn error(&self, message: &str) -> LoadingError {
        LoadingError::XmlParseError {
            position: self.pos,
            message: message.to_string(),
        }
    }
}

/// Maximum nesting of supported elements, counting the root.
pub const MAX_TREE_DEPTH: usize = 256;

/// Builds the tree as the scanner reports elements.
struct XmlState<'a> {
    src: &'a str,
    session: &'a Session,
    tree: Tree,
    ids: IdIndex<NodeId>,
    root: Option<NodeId>,
    current: Option<NodeId>,

    /// Number of open elements in the tree.
    depth: usize,

    /// Depth inside a skipped subtree; 0 when not skipping.
    ignoring: usize,
}

/// What the caller should do with the attributes of a start tag.
#[derive(Copy, Clone)]
enum StartElement {
    /// The element was added to the tree.
    Node(NodeId),

    /// The element is being skipped; its attributes are checked for syntax only.
    Ignored,
}

impl<'a> XmlState<'a> {
    fn new(src: &'a str, session: &'a Session) -> XmlState<'a> {
        XmlState {
            src,
            session,
            tree: Tree::new(),
            ids: IdIndex::new(),
            root: None,
            current: None,
            depth: 0,
            ignoring: 0,
        }
    }

    fn start_element(&mut self, s: &Scanner<'_>, name: Span) -> Result<StartElement, LoadingError> {
        if self.ignoring > 0 {
            self.ignoring += 1;
            return Ok(StartElement::Ignored);
        }

        let element_name = ElementName::from_name(name.as_str(self.src));

        if element_name == ElementName::Unknown {
            minisvg_log!(
                self.session,
                "skipping unsupported element <{}>",
                name.as_str(self.src)
            );
            self.ignoring = 1;
            return Ok(StartElement::Ignored);
        }

        let node = match (self.root, self.current) {
            (None, _) => {
                if element_name != ElementName::Svg {
                    return Err(LoadingError::NoSvgRoot);
                }

                let root = self.tree.append_element(None, element_name);
                self.root = Some(root);
                root
            }

            (Some(_), None) => {
                return Err(s.error("more than one toplevel element"));
            }

            (Some(_), Some(parent)) => {
                if self.depth >= MAX_TREE_DEPTH {
                    return Err(s.error("elements are nested too deeply"));
                }

                self.tree.append_element(Some(parent), element_name)
            }
        };

        Ok(StartElement::Node(node))
    }

    /// The start tag ended with `>` instead of `/>`.
    fn enter_element(&mut self, start: &StartElement) {
        if let StartElement::Node(node) = *start {
            self.current = Some(node);
            self.depth += 1;
        }
    }

    /// The element ended with `/>`.
    fn empty_element(&mut self) {
        if self.ignoring > 0 {
            self.ignoring -= 1;
        }
    }

    fn end_element(&mut self, s: &Scanner<'_>, name: Span) -> Result<(), LoadingError> {
        if self.ignoring > 0 {
            self.ignoring -= 1;
            return Ok(());
        }

        let current = self
            .current
            .ok_or_else(|| s.error("closing tag without an open element"))?;

        if ElementName::from_name(name.as_str(self.src)) != self.tree.name(current) {
            return Err(s.error("closing tag does not match the open element"));
        }

        self.current = self.tree.get(current).parent;
        self.depth -= 1;
        Ok(())
    }

    /// Whether character data may appear at this point.  Text is only allowed inside
    /// the root element, even within a skipped subtree.
    fn accepts_text(&self) -> bool {
        self.current.is_some()
    }

    /// Whether there is an open element, supported or skipped, that a closing tag
    /// can match.
    fn in_element(&self) -> bool {
        self.current.is_some() || self.ignoring > 0
    }

    fn finish(self) -> Result<ParsedTree, LoadingError> {
        let root = self.root.ok_or(LoadingError::NoSvgRoot)?;

        if self.current.is_some() || self.ignoring > 0 {
            return Err(LoadingError::XmlParseError {
                position: self.src.len(),
                message: "unexpected end of input inside an element".to_string(),
            });
        }

        Ok(ParsedTree {
            tree: self.tree,
            ids: self.ids,
            root,
        })
    }
}

/// Parses `src` into a tree of supported elements.
pub fn parse_tree(src: &str, session: &Session) -> Result<ParsedTree, LoadingError> {
    let res = parse_tree_inner(src, session);

    if let Err(ref e) = res {
        minisvg_log!(session, "could not load SVG: {}", e);
    }

    res
}

fn parse_tree_inner(src: &str, session: &Session) -> Result<ParsedTree, LoadingError> {
    let mut s = Scanner::new(src);
    let mut state = XmlState::new(src, session);

    while !s.at_end() {
        if state.accepts_text() {
            s.skip_while(|c| c != b'<');
        } else if !s.skip_ws() {
            break;
        }

        if !s.skip_delim(b'<') {
            return Err(s.error("expected '<'"));
        }

        if s.skip_delim(b'?') {
            if !s.skip_str("xml") {
                return Err(s.error("unsupported processing instruction"));
            }

            s.skip_ws();
            attributes::parse_attributes(&mut s, None)?;

            if !s.skip_str("?>") {
                return Err(s.error("unterminated XML declaration"));
            }

            s.skip_ws();
            continue;
        }

        if s.skip_delim(b'!') {
            if s.skip_str("--") {
                if !s.skip_past("-->") {
                    return Err(s.error("unterminated comment"));
                }
            } else if s.skip_str("[CDATA[") {
                if !s.skip_past("]]>") {
                    return Err(s.error("unterminated CDATA section"));
                }
            } else if s.skip_str("DOCTYPE") {
                skip_doctype(&mut s)?;
            } else {
                return Err(s.error("unsupported markup declaration"));
            }

            s.skip_ws();
            continue;
        }

        if s.skip_delim(b'/') {
            if !state.in_element() {
                return Err(s.error("closing tag without an open element"));
            }

            let name = s.name().ok_or_else(|| s.error("expected element name"))?;
            s.skip_ws();

            if s.peek() != Some(b'>') {
                return Err(s.error("expected '>'"));
            }

            state.end_element(&s, name)?;
            s.advance();
            continue;
        }

        let name = s.name().ok_or_else(|| s.error("expected element name"))?;
        let start = state.start_element(&s, name)?;

        s.skip_ws();

        let element = match start {
            StartElement::Node(node) => Some((&mut state.tree, &mut state.ids, node)),
            StartElement::Ignored => None,
        };
        attributes::parse_attributes(&mut s, element)?;

        if s.skip_delim(b'>') {
            state.enter_element(&start);
        } else if s.skip_str("/>") {
            state.empty_element();
        } else {
            return Err(s.error("expected '>' or '/>'"));
        }
    }

    state.finish()
}

/// Skips a `DOCTYPE` declaration, including a bracketed internal subset.
fn skip_doctype(s: &mut Scanner<'_>) -> Result<(), LoadingError> {
    while let Some(c) = s.peek() {
        if c == b'>' {
            break;
        }

        s.advance();

        if c == b'[' {
            let mut depth = 1;

            while depth > 0 {
                match s.peek() {
                    Some(b'[') => depth += 1,
                    Some(b']') => depth -= 1,
                    Some(_) => (),
                    None => break,
                }

                s.advance();
            }
        }
    }

    if s.skip_delim(b'>') {
        Ok(())
    } else {
        Err(s.error("unterminated DOCTYPE"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::AttributeId;
    use matches::matches;

    fn parse(src: &str) -> Result<ParsedTree, LoadingError> {
        parse_tree(src, &Session::new_for_test_suite())
    }

    fn names(t: &ParsedTree, node: NodeId) -> Vec<ElementName> {
        t.tree.children(node).map(|c| t.tree.name(c)).collect()
    }

    #[test]
    fn parses_minimal_document() {
        let t = parse("<svg/>").unwrap();
        assert_eq!(t.tree.name(t.root), ElementName::Svg);
        assert_eq!(t.tree.num_nodes(), 1);
    }

    #[test]
    fn parses_prolog_and_misc() {
        let src = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- a comment -->
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" [
  <!ENTITY foo "[bar]">
]>
<svg>
  <![CDATA[ <rect/> ]]>
  <g><rect/>text<circle/></g>
</svg>
<!-- trailing -->
"#;
        let t = parse(src).unwrap();
        assert_eq!(names(&t, t.root), vec![ElementName::G]);

        let g = t.tree.get(t.root).first_child.unwrap();
        assert_eq!(names(&t, g), vec![ElementName::Rect, ElementName::Circle]);
    }

    #[test]
    fn skips_unknown_subtrees() {
        let src = r#"<svg>
  <metadata><rdf:RDF><rect/><foo></foo></rdf:RDF></metadata>
  <text x="1">hello <tspan>world</tspan></text>
  <rect/>
</svg>"#;
        let t = parse(src).unwrap();
        assert_eq!(names(&t, t.root), vec![ElementName::Rect]);
        assert_eq!(t.tree.num_nodes(), 2);
    }

    #[test]
    fn skipped_subtree_does_not_check_names() {
        let t = parse("<svg><foo><g></rect></foo><circle/></svg>").unwrap();
        assert_eq!(names(&t, t.root), vec![ElementName::Circle]);
    }

    #[test]
    fn skips_unknown_toplevel_elements() {
        let t = parse("<foo><bar/></foo>\n<svg/>\n<baz/>").unwrap();
        assert_eq!(t.tree.name(t.root), ElementName::Svg);
        assert_eq!(t.tree.num_nodes(), 1);
    }

    #[test]
    fn text_outside_the_root_is_an_error() {
        assert!(parse("<foo><bar/>text</foo><svg/>").is_err());
        assert!(parse("<svg><foo>text</foo></svg>").is_ok());
    }

    fn nested_groups(levels: usize) -> String {
        let mut src = String::from("<svg>");
        src.push_str(&"<g>".repeat(levels - 1));
        src.push_str("<rect/>");
        src.push_str(&"</g>".repeat(levels - 1));
        src.push_str("</svg>");
        src
    }

    #[test]
    fn limits_nesting_depth() {
        // The rect is at depth `levels + 1`, counting the root.
        assert!(parse(&nested_groups(MAX_TREE_DEPTH - 1)).is_ok());
        assert!(matches!(
            parse(&nested_groups(MAX_TREE_DEPTH)),
            Err(LoadingError::XmlParseError { .. })
        ));
    }

    #[test]
    fn depth_goes_back_down_when_elements_close() {
        let mut src = String::from("<svg>");
        for _ in 0..MAX_TREE_DEPTH * 2 {
            src.push_str("<g><g/></g>");
        }
        src.push_str("</svg>");

        assert!(parse(&src).is_ok());
    }

    #[test]
    fn skipped_subtrees_do_not_count_towards_depth() {
        let mut src = String::from("<svg>");
        src.push_str(&"<foo>".repeat(MAX_TREE_DEPTH * 2));
        src.push_str(&"</foo>".repeat(MAX_TREE_DEPTH * 2));
        src.push_str("</svg>");

        assert!(parse(&src).is_ok());
    }

    #[test]
    fn requires_svg_root() {
        assert!(matches!(parse(""), Err(LoadingError::NoSvgRoot)));
        assert!(matches!(parse("  \n "), Err(LoadingError::NoSvgRoot)));
        assert!(matches!(parse("<g/>"), Err(LoadingError::NoSvgRoot)));
        assert!(matches!(parse("<foo/>"), Err(LoadingError::NoSvgRoot)));
    }

    #[test]
    fn structural_errors_fail() {
        let bad = [
            "<svg>",
            "<svg></g>",
            "<svg/><svg/>",
            "<svg/><g/>",
            "text<svg/>",
            "<svg/>text",
            "<svg><!-- unterminated</svg>",
            "<svg><![CDATA[ unterminated</svg>",
            "<!DOCTYPE svg [ <svg/>",
            "<?foo?><svg/>",
            "<!ELEMENT svg><svg/>",
            "<svg><g></svg>",
            "<svg></svg></svg>",
            "<svg x=\"1></svg>",
            "<svg x></svg>",
            "<svg x=1></svg>",
            "<svg x=\"1\"",
            "<svg <g/>></svg>",
            "<svg><foo></svg>",
        ];

        for src in &bad {
            assert!(parse(src).is_err(), "{} should fail", src);
        }
    }

    #[test]
    fn reports_error_position() {
        match parse("<svg>\n<g></rect></svg>") {
            Err(LoadingError::XmlParseError { position, .. }) => assert_eq!(position, 15),
            other => panic!("unexpected result {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn indexes_ids() {
        let t = parse(r#"<svg id="root"><rect id="a"/><circle id="a"/></svg>"#).unwrap();
        let src = r#"<svg id="root"><rect id="a"/><circle id="a"/></svg>"#;

        assert_eq!(t.ids.get(src, "root"), Some(t.root));

        let circle = t.tree.get(t.root).last_child.unwrap();
        assert_eq!(t.ids.get(src, "a"), Some(circle));
        assert!(!t.tree.has_attribute(t.root, AttributeId::Id));
    }

    #[test]
    fn toplevel_close_tag_after_skipped_element() {
        assert!(parse("<foo></foo></foo><svg/>").is_err());
    }
}

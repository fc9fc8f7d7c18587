//! Attribute lists of start tags, and the declarations inside `style` attributes.

use crate::element::AttributeId;
use crate::error::LoadingError;
use crate::id_index::IdIndex;
use crate::node::{NodeId, Tree};
use crate::span::Span;

use super::{is_ws, Scanner};

/// Where the attributes of the current start tag go.  `None` for elements that are
/// being skipped.
pub(crate) type AttributeTarget<'t> = Option<(&'t mut Tree, &'t mut IdIndex<NodeId>, NodeId)>;

/// Removes trailing whitespace from a span.
fn rtrim(src: &str, span: Span) -> Span {
    let bytes = src.as_bytes();
    let mut end = span.end();

    while end > span.start && is_ws(bytes[end - 1]) {
        end -= 1;
    }

    Span::new(span.start, end)
}

/// Parses `name="value"` pairs until something that is not a name.
///
/// Values have their leading and trailing whitespace removed.  The `id` attribute
/// goes to the id index, `style` is split into declarations, and names that are
/// not known are dropped.
pub(crate) fn parse_attributes(
    s: &mut Scanner<'_>,
    mut target: AttributeTarget<'_>,
) -> Result<(), LoadingError> {
    while let Some(name) = s.name() {
        s.skip_ws();

        if !s.skip_delim(b'=') {
            return Err(s.error("expected '=' after attribute name"));
        }

        s.skip_ws();

        let quote = match s.peek() {
            Some(q @ b'"') | Some(q @ b'\'') => q,
            _ => return Err(s.error("expected quoted attribute value")),
        };

        s.advance();
        s.skip_ws();

        let start = s.pos;
        s.skip_while(|c| c != quote);

        if s.at_end() {
            return Err(s.error("unterminated attribute value"));
        }

        let value = rtrim(s.src, Span::new(start, s.pos));
        s.advance();

        if let Some((ref mut tree, ref mut ids, node)) = target {
            match AttributeId::from_attribute_name(s.slice(name)) {
                Some(AttributeId::Id) => ids.put(s.src, value, node),
                Some(AttributeId::Style) => parse_style(s.src, value, tree, node),
                Some(id) => tree.add_attribute(node, id, value),
                None => (),
            }
        }

        s.skip_ws();
    }

    Ok(())
}

/// Splits a `style` attribute into `property: value` declarations.
///
/// The first malformed declaration ends the list without an error; the
/// declarations before it are kept.
pub(crate) fn parse_style(src: &str, value: Span, tree: &mut Tree, node: NodeId) {
    let mut s = Scanner::for_span(src, value);

    s.skip_ws();

    while matches!(s.peek(), Some(c) if c.is_ascii_alphabetic() || c == b'_') {
        let start = s.pos;
        s.skip_while(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'-');
        let name = Span::new(start, s.pos);

        s.skip_ws();

        if !s.skip_delim(b':') {
            break;
        }

        s.skip_ws();

        let start = s.pos;
        s.skip_while(|c| c != b';');
        let decl_value = rtrim(src, Span::new(start, s.pos));

        if let Some(id) = AttributeId::from_property_name(name.as_str(src)) {
            tree.add_attribute(node, id, decl_value);
        }

        s.skip_ws();
        s.skip_delim(b';');
        s.skip_ws();
    }
}

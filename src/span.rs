//! Borrowed views into a document's source text.

use std::fmt;

/// A byte range into the document's source text.
///
/// Attribute values and id strings are never copied out of the source; the parser
/// stores a `Span` and the document turns it back into a `&str` on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Span {
        Span {
            start,
            len: end - start,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resolves the span against the text it was created from.
    pub fn as_str<'s>(&self, src: &'s str) -> &'s str {
        &src[self.start..self.end()]
    }
}

/// The text a document was parsed from.
///
/// A document either borrows the caller's buffer, in which case the buffer must
/// outlive the document (enforced by the `'src` lifetime), or owns it.  An owned
/// buffer is dropped together with the document; that drop is the release hook for
/// callers that hand over their data.
pub enum Source<'src> {
    Borrowed(&'src str),
    Owned(Box<dyn AsRef<str> + 'src>),
}

impl<'src> Source<'src> {
    pub fn as_str(&self) -> &str {
        match *self {
            Source::Borrowed(s) => s,
            Source::Owned(ref b) => (**b).as_ref(),
        }
    }
}

impl fmt::Debug for Source<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match *self {
            Source::Borrowed(_) => "Borrowed",
            Source::Owned(_) => "Owned",
        };

        write!(f, "Source::{}({} bytes)", kind, self.as_str().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn span_resolves_against_source() {
        let src = "<svg id=\"foo\"/>";
        let span = Span::new(9, 12);
        assert_eq!(span.as_str(src), "foo");
        assert_eq!(span.end(), 12);
        assert!(!span.is_empty());
    }

    struct Tracked(String, Rc<Cell<bool>>);

    impl AsRef<str> for Tracked {
        fn as_ref(&self) -> &str {
            &self.0
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.1.set(true);
        }
    }

    #[test]
    fn owned_source_is_released_on_drop() {
        let released = Rc::new(Cell::new(false));
        let source = Source::Owned(Box::new(Tracked("<svg/>".to_string(), released.clone())));
        assert_eq!(source.as_str(), "<svg/>");
        assert!(!released.get());

        drop(source);
        assert!(released.get());
    }
}

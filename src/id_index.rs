//! Map from element ids to elements.
//!
//! This is a small chained hash table whose entries live in an [`Arena`], like the rest
//! of the parse-time data.  Keys are [`Span`]s into the source text, so an id string is
//! never copied.  Keys compare by their exact bytes.
//!
//! Putting a key that is already present replaces its value, so when two elements share
//! an id, the one that was parsed last wins.
//!
//! Nothing is allocated until the first key is put; most icons have no ids at all.

use crate::arena::{Arena, Handle};
use crate::span::Span;

const INITIAL_CAPACITY: usize = 16;

struct Entry<V> {
    hash: usize,
    key: Span,
    value: V,
    next: Option<Handle<Entry<V>>>,
}

pub struct IdIndex<V> {
    entries: Arena<Entry<V>>,
    buckets: Vec<Option<Handle<Entry<V>>>>,
    size: usize,
}

impl<V: Copy> Default for IdIndex<V> {
    fn default() -> Self {
        IdIndex::new()
    }
}

/// Rolling hash seeded with the length of the key.
fn hash_bytes(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .fold(bytes.len(), |h, &b| h.wrapping_mul(31).wrapping_add(usize::from(b)))
}

impl<V: Copy> IdIndex<V> {
    pub fn new() -> IdIndex<V> {
        IdIndex {
            entries: Arena::new(),
            buckets: Vec::new(),
            size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Inserts `key`, which must be a span of `src`, or replaces its value.
    pub fn put(&mut self, src: &str, key: Span, value: V) {
        if self.buckets.is_empty() {
            self.buckets = vec![None; INITIAL_CAPACITY];
        }

        let key_bytes = key.as_str(src).as_bytes();
        let hash = hash_bytes(key_bytes);
        let index = hash & (self.capacity() - 1);

        let mut cursor = self.buckets[index];
        let mut last = None;

        while let Some(h) = cursor {
            let entry = self.entries.get_mut(h);
            if entry.hash == hash && entry.key.as_str(src).as_bytes() == key_bytes {
                entry.value = value;
                return;
            }

            last = Some(h);
            cursor = entry.next;
        }

        let new = self.entries.alloc(Entry {
            hash,
            key,
            value,
            next: None,
        });

        match last {
            Some(h) => self.entries.get_mut(h).next = Some(new),
            None => self.buckets[index] = Some(new),
        }

        self.size += 1;
        self.expand();
    }

    /// Looks up `key`; spans stored in the index are resolved against `src`.
    pub fn get(&self, src: &str, key: &str) -> Option<V> {
        if self.buckets.is_empty() {
            return None;
        }

        let key_bytes = key.as_bytes();
        let hash = hash_bytes(key_bytes);
        let index = hash & (self.capacity() - 1);

        let mut cursor = self.buckets[index];

        while let Some(h) = cursor {
            let entry = self.entries.get(h);
            if entry.hash == hash && entry.key.as_str(src).as_bytes() == key_bytes {
                return Some(entry.value);
            }

            cursor = entry.next;
        }

        None
    }

    fn expand(&mut self) {
        if self.size <= self.capacity() * 3 / 4 {
            return;
        }

        let new_capacity = self.capacity() << 1;
        let mut new_buckets = vec![None; new_capacity];

        for bucket in 0..self.buckets.len() {
            let mut cursor = self.buckets[bucket];

            while let Some(h) = cursor {
                let entry = self.entries.get_mut(h);
                cursor = entry.next;

                let index = entry.hash & (new_capacity - 1);
                entry.next = new_buckets[index];
                new_buckets[index] = Some(h);
            }
        }

        self.buckets = new_buckets;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_of(src: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut start = 0;
        for word in src.split(' ') {
            spans.push(Span::new(start, start + word.len()));
            start += word.len() + 1;
        }
        spans
    }

    #[test]
    fn puts_and_gets() {
        let src = "foo bar baz";
        let mut index = IdIndex::new();

        for (i, span) in spans_of(src).into_iter().enumerate() {
            index.put(src, span, i);
        }

        assert_eq!(index.get(src, "foo"), Some(0));
        assert_eq!(index.get(src, "bar"), Some(1));
        assert_eq!(index.get(src, "baz"), Some(2));
        assert_eq!(index.get(src, "qux"), None);
        assert_eq!(index.get(src, "Foo"), None);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn allocates_buckets_on_first_put() {
        let src = "foo";
        let mut index = IdIndex::new();

        assert_eq!(index.capacity(), 0);
        assert_eq!(index.get(src, "foo"), None);

        index.put(src, Span::new(0, 3), 1);
        assert_eq!(index.capacity(), INITIAL_CAPACITY);
        assert_eq!(index.get(src, "foo"), Some(1));
    }

    #[test]
    fn last_put_wins() {
        let src = "dup dup";
        let spans = spans_of(src);
        let mut index = IdIndex::new();

        index.put(src, spans[0], 'a');
        index.put(src, spans[1], 'b');

        assert_eq!(index.get(src, "dup"), Some('b'));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn grows_past_load_factor() {
        let src: String = (0..100).map(|i| format!("id{} ", i)).collect();
        let src = src.trim_end();
        let mut index = IdIndex::new();

        for (i, span) in spans_of(src).into_iter().enumerate() {
            index.put(src, span, i);
        }

        assert_eq!(index.len(), 100);
        assert_eq!(index.capacity(), 256);

        for i in 0..100 {
            assert_eq!(index.get(src, &format!("id{}", i)), Some(i));
        }
    }

    #[test]
    fn hash_is_seeded_with_length() {
        assert_eq!(hash_bytes(b""), 0);
        assert_eq!(hash_bytes(b"a"), 31 + 97);
    }
}

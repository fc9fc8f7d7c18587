//! Append-only storage for the nodes, attributes, and id index entries of a document.
//!
//! Everything the parser creates lives in an [`Arena`] owned by the [`Document`].  There
//! is no way to free an individual item; the whole arena goes away when the document is
//! dropped.  Items are addressed by a [`Handle`], which is just an index, so the tree
//! can have parent and sibling links without reference counting.
//!
//! Storage is split in chunks of about 4 KiB.  A chunk is allocated with its full
//! capacity up front and never grows, so adding items never moves the ones that are
//! already stored.
//!
//! [`Document`]: crate::document::Document

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem;

/// Size in bytes of each chunk of storage.
pub const CHUNK_SIZE: usize = 4096;

/// Index of an item inside an [`Arena`].
///
/// A handle is only meaningful for the arena that created it.
pub struct Handle<T> {
    index: usize,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: usize) -> Handle<T> {
        Handle {
            index,
            marker: PhantomData,
        }
    }

    pub fn index(self) -> usize {
        self.index
    }
}

// Derives would require T: Copy etc., which we don't need.

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// A chunked, append-only store of `T` values.
#[derive(Debug)]
pub struct Arena<T> {
    chunks: Vec<Vec<T>>,
    chunk_capacity: usize,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Arena<T> {
        let chunk_capacity = (CHUNK_SIZE / mem::size_of::<T>().max(1)).max(1);

        Arena {
            chunks: Vec::new(),
            chunk_capacity,
            len: 0,
        }
    }

    /// Stores `value` and returns its handle.
    ///
    /// Like any Rust allocation, running out of memory aborts the process.
    pub fn alloc(&mut self, value: T) -> Handle<T> {
        let needs_chunk = match self.chunks.last() {
            Some(chunk) => chunk.len() == self.chunk_capacity,
            None => true,
        };

        if needs_chunk {
            self.chunks.push(Vec::with_capacity(self.chunk_capacity));
        }

        let index = self.len;
        if let Some(chunk) = self.chunks.last_mut() {
            chunk.push(value);
        }
        self.len += 1;

        Handle::new(index)
    }

    pub fn get(&self, handle: Handle<T>) -> &T {
        let (chunk, offset) = self.locate(handle);
        &self.chunks[chunk][offset]
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> &mut T {
        let (chunk, offset) = self.locate(handle);
        &mut self.chunks[chunk][offset]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[cfg(test)]
    fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    fn locate(&self, handle: Handle<T>) -> (usize, usize) {
        (
            handle.index / self.chunk_capacity,
            handle.index % self.chunk_capacity,
        )
    }
}

//! Tree nodes, the representation of SVG elements.
//!
//! The whole tree lives in two arenas owned by a [`Tree`]: one for the elements, and one
//! for their attributes.  Nodes refer to each other through [`NodeId`] handles, so
//! parent, child and sibling links need no reference counting.  The tree is built once
//! by the parser and never changes afterwards.
//!
//! # Attribute lookup
//!
//! Each element has a singly-linked list of attributes where the newest attribute comes
//! first.  Looking up an attribute returns the first match in the list, so when an
//! attribute appears more than once, or is set both as a markup attribute and in
//! `style`, the last one in document order wins.
//!
//! Presentation attributes like `fill` inherit: when an element does not have the
//! attribute, or has it set to `inherit`, the lookup continues with the parent.
//!
//! # Effective parents
//!
//! A `<use>` element renders its referenced element as if that element were its
//! child.  Instead of changing the tree, the renderer passes a [`Reparenting`] chain
//! alongside each node; it overrides the parent of the referenced nodes for the
//! duration of the `<use>`.  All the lookups that walk up the tree go through
//! [`Tree::effective_parent`].

use crate::arena::{Arena, Handle};
use crate::element::{AttributeId, ElementName};
use crate::span::Span;

pub type NodeId = Handle<NodeData>;

pub type AttributeHandle = Handle<Attribute>;

/// Contents of a tree node.
#[derive(Debug)]
pub struct NodeData {
    pub name: ElementName,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub attributes: Option<AttributeHandle>,
}

/// An attribute value.  The value is not copied; it is a span into the document's source.
#[derive(Debug)]
pub struct Attribute {
    pub id: AttributeId,
    pub value: Span,
    pub next: Option<AttributeHandle>,
}

/// One `<use>` indirection: while rendering `node` on behalf of a `<use>`, its parent
/// is `parent` instead of the one in the tree.
///
/// Reparentings are chained from the innermost `<use>` outwards.
#[derive(Debug, Copy, Clone)]
pub struct Reparenting<'a> {
    pub node: NodeId,
    pub parent: NodeId,
    pub outer: Option<&'a Reparenting<'a>>,
}

#[derive(Debug, Default)]
pub struct Tree {
    nodes: Arena<NodeData>,
    attributes: Arena<Attribute>,
}

impl Tree {
    pub fn new() -> Tree {
        Tree::default()
    }

    pub fn get(&self, node: NodeId) -> &NodeData {
        self.nodes.get(node)
    }

    pub fn name(&self, node: NodeId) -> ElementName {
        self.get(node).name
    }

    /// Creates an element and appends it as the last child of `parent`.
    pub fn append_element(&mut self, parent: Option<NodeId>, name: ElementName) -> NodeId {
        let node = self.nodes.alloc(NodeData {
            name,
            parent,
            first_child: None,
            last_child: None,
            next_sibling: None,
            attributes: None,
        });

        if let Some(parent) = parent {
            let last_child = self.nodes.get(parent).last_child;

            match last_child {
                Some(last) => self.nodes.get_mut(last).next_sibling = Some(node),
                None => self.nodes.get_mut(parent).first_child = Some(node),
            }

            self.nodes.get_mut(parent).last_child = Some(node);
        }

        node
    }

    /// Adds an attribute at the front of the element's list.
    pub fn add_attribute(&mut self, node: NodeId, id: AttributeId, value: Span) {
        let next = self.nodes.get(node).attributes;
        let attr = self.attributes.alloc(Attribute { id, value, next });
        self.nodes.get_mut(node).attributes = Some(attr);
    }

    pub fn children(&self, node: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(node).first_child,
        }
    }

    pub fn attributes(&self, node: NodeId) -> Attributes<'_> {
        Attributes {
            tree: self,
            next: self.get(node).attributes,
        }
    }

    /// The parent of `node`, taking `<use>` indirections into account.
    pub fn effective_parent(
        &self,
        node: NodeId,
        reparenting: Option<&Reparenting<'_>>,
    ) -> Option<NodeId> {
        let mut link = reparenting;

        while let Some(r) = link {
            if r.node == node {
                return Some(r.parent);
            }

            link = r.outer;
        }

        self.get(node).parent
    }

    /// Looks up the value span of an attribute.
    ///
    /// With `inherit`, a missing attribute or a value of exactly `inherit` makes the
    /// lookup continue with the effective parent.
    pub fn find_attribute(
        &self,
        node: NodeId,
        id: AttributeId,
        inherit: bool,
        src: &str,
        reparenting: Option<&Reparenting<'_>>,
    ) -> Option<Span> {
        let mut current = Some(node);

        while let Some(n) = current {
            let found = self.attributes(n).find(|a| a.id == id);

            if let Some(attr) = found {
                if !(inherit && attr.value.as_str(src) == "inherit") {
                    return Some(attr.value);
                }
            }

            if !inherit {
                break;
            }

            current = self.effective_parent(n, reparenting);
        }

        None
    }

    /// Whether the element itself has the attribute, without inheritance.
    pub fn has_attribute(&self, node: NodeId, id: AttributeId) -> bool {
        self.attributes(node).any(|a| a.id == id)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }
}

pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.next?;
        self.next = self.tree.get(node).next_sibling;
        Some(node)
    }
}

/// Iterates over an element's attributes, newest first.
pub struct Attributes<'a> {
    tree: &'a Tree,
    next: Option<AttributeHandle>,
}

impl<'a> Iterator for Attributes<'a> {
    type Item = &'a Attribute;

    fn next(&mut self) -> Option<&'a Attribute> {
        let attr = self.tree.attributes.get(self.next?);
        self.next = attr.next;
        Some(attr)
    }
}

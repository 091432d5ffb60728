//! Markup tree types.
//!
//! This module provides `Fragment`, `Element`, `Node` and `Text`: a small
//! tree built from the flat token stream of [`crate::convert::html`]. Stages
//! rewrite the tree and [`crate::render`] serializes it back.
//!
//! # Key Features
//!
//! - Tags are case-folded `CompactString`s
//! - Text keeps its raw source form, entities are never decoded
//! - Children live in a `SmallVec`, most paragraphs have few children

mod element;
mod text;
mod document;

pub use element::{is_block_tag, is_flow_container_tag, is_structural_tag, is_void_tag, Element};
pub use text::{Text, TextKind};
pub use document::Fragment;

use smallvec::SmallVec;

/// Child node storage.
pub type Children = SmallVec<[Node; 8]>;

/// Node in a markup tree - either Element or Text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Box<Element>),
    Text(Text),
}

impl Node {
    /// Create a text node.
    #[inline]
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(Text::new(content))
    }

    /// Create an element node.
    #[inline]
    pub fn element(elem: Element) -> Self {
        Node::Element(Box::new(elem))
    }

    /// Check if this is an element node.
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Check if this is a text node.
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Get as element reference.
    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get as mutable element reference.
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get as text reference.
    #[inline]
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Check if this is an element with the given tag.
    #[inline]
    pub fn is_tag(&self, tag: &str) -> bool {
        self.as_element().is_some_and(|e| e.is(tag))
    }

    /// Check if this is a `<br>`.
    #[inline]
    pub fn is_break(&self) -> bool {
        self.is_tag("br")
    }

    /// Text node containing only whitespace.
    #[inline]
    pub fn is_whitespace(&self) -> bool {
        self.as_text().is_some_and(Text::is_whitespace)
    }

    /// Element whose tag starts a new block when rendered.
    #[inline]
    pub fn is_block(&self) -> bool {
        self.as_element().is_some_and(|e| is_block_tag(&e.tag))
    }

    /// Append this node's text content to `buf`.
    pub fn collect_text(&self, buf: &mut String) {
        match self {
            Node::Text(t) if !t.is_markup() => buf.push_str(&t.content),
            Node::Text(_) => {}
            Node::Element(e) => e.collect_text(buf),
        }
    }
}

impl From<Element> for Node {
    fn from(elem: Element) -> Self {
        Node::element(elem)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_predicates() {
        let br = Node::element(Element::new("br"));
        assert!(br.is_break());
        assert!(br.is_element());
        assert!(!br.is_block());

        let p = Node::element(Element::new("p"));
        assert!(p.is_block());
        assert!(p.is_tag("p"));

        let ws = Node::text(" \n ");
        assert!(ws.is_whitespace());
        assert!(ws.is_text());
    }
}

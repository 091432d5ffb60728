//! Fragment type and related utilities
//!
//! The root container for a markup tree. Email bodies are fragments, so
//! there is no `<html>` or wrapper element: the root is a node sequence.

use smallvec::SmallVec;

use super::{Children, Element, Node};

// =============================================================================
// Fragment
// =============================================================================

/// Root node sequence of a markup document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Top-level nodes
    pub children: Children,
}

impl Fragment {
    /// Create an empty fragment
    pub fn new() -> Self {
        Self {
            children: SmallVec::new(),
        }
    }

    /// Create a fragment from top-level nodes
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        Self {
            children: nodes.into_iter().collect(),
        }
    }

    /// Check if the fragment has no nodes
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query API
    // ─────────────────────────────────────────────────────────────────────────

    /// Find all elements matching predicate (document order)
    pub fn find_all<F>(&self, predicate: F) -> Vec<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        let mut results = Vec::new();
        Self::collect_elements(&self.children, &predicate, &mut results);
        results
    }

    fn collect_elements<'a, F>(nodes: &'a [Node], predicate: &F, results: &mut Vec<&'a Element>)
    where
        F: Fn(&Element) -> bool,
    {
        for node in nodes {
            if let Some(elem) = node.as_element() {
                if predicate(elem) {
                    results.push(elem);
                }
                Self::collect_elements(&elem.children, predicate, results);
            }
        }
    }

    /// Count elements with the given tag
    pub fn count_tag(&self, tag: &str) -> usize {
        self.find_all(|e| e.is(tag)).len()
    }

    /// Concatenated text content of the whole fragment
    pub fn text_content(&self) -> String {
        let mut buf = String::new();
        for node in &self.children {
            node.collect_text(&mut buf);
        }
        buf
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Closure-based traversal API
    // ─────────────────────────────────────────────────────────────────────────

    /// Visit all elements with a closure (mutable, pre-order)
    pub fn for_each_element_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Element),
    {
        Self::visit_elements_mut_recursive(&mut self.children, &mut f);
    }

    fn visit_elements_mut_recursive<F>(nodes: &mut [Node], f: &mut F)
    where
        F: FnMut(&mut Element),
    {
        for node in nodes {
            if let Some(elem) = node.as_element_mut() {
                f(elem);
                Self::visit_elements_mut_recursive(&mut elem.children, f);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Fragment {
        Fragment::from_nodes([
            Node::element(Element::new("p").with_children([Node::text("One")])),
            Node::element(Element::new("div").with_children([Node::element(
                Element::new("p").with_children([Node::text("Two")]),
            )])),
        ])
    }

    #[test]
    fn test_find_all_document_order() {
        let frag = sample();
        let paragraphs = frag.find_all(|e| e.is("p"));
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].text_content(), "One");
        assert_eq!(paragraphs[1].text_content(), "Two");
    }

    #[test]
    fn test_for_each_element_mut() {
        let mut frag = sample();
        frag.for_each_element_mut(|e| e.set_attr("data-seen", "1"));
        assert_eq!(frag.find_all(|e| e.get_attr("data-seen").is_some()).len(), 3);
        assert_eq!(frag.text_content(), "OneTwo");
    }
}

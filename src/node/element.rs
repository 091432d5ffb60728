//! Element type - markup elements with attributes and children

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::attr::{Attrs, AttrsExt};

use super::{Children, Node};

// =============================================================================
// Tag classification
// =============================================================================

/// Check if a tag is a void element (never has children).
pub fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Tags that start a new block; everything else is inline content.
pub fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "li"
            | "table"
            | "thead"
            | "tbody"
            | "tfoot"
            | "tr"
            | "td"
            | "th"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "main"
            | "aside"
            | "nav"
            | "form"
            | "figure"
            | "blockquote"
            | "pre"
            | "hr"
    )
}

/// Tags whose presence inside a `div` keeps it from becoming a paragraph.
pub fn is_structural_tag(tag: &str) -> bool {
    matches!(
        tag,
        "div"
            | "table"
            | "thead"
            | "tbody"
            | "tfoot"
            | "tr"
            | "td"
            | "th"
            | "ul"
            | "ol"
            | "li"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "main"
            | "aside"
            | "form"
            | "figure"
            | "blockquote"
            | "p"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
    )
}

/// Containers whose inline content may be split into paragraphs.
pub fn is_flow_container_tag(tag: &str) -> bool {
    matches!(
        tag,
        "div" | "blockquote" | "section" | "article" | "header" | "footer" | "main" | "aside" | "td" | "th"
    )
}

// =============================================================================
// Element
// =============================================================================

/// Markup element with attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Case-folded tag name
    pub tag: CompactString,
    /// Element attributes, in source order
    pub attrs: Attrs,
    /// Child nodes
    pub children: Children,
}

impl Element {
    /// Create an element without attributes or children
    pub fn new(tag: impl Into<CompactString>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attrs::new(),
            children: SmallVec::new(),
        }
    }

    /// Create an element with attributes
    pub fn with_attrs(tag: impl Into<CompactString>, attrs: Attrs) -> Self {
        Self {
            tag: tag.into(),
            attrs,
            children: SmallVec::new(),
        }
    }

    /// Builder: replace the children
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    /// Element carrying only a style attribute
    pub fn styled(tag: impl Into<CompactString>, style: &str) -> Self {
        let mut elem = Self::new(tag);
        elem.set_style(style);
        elem
    }

    /// Check the tag name
    #[inline]
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Void elements never hold children
    #[inline]
    pub fn is_void(&self) -> bool {
        is_void_tag(&self.tag)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Attribute access
    // ─────────────────────────────────────────────────────────────────────────

    /// Get attribute value by name
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get_attr(name)
    }

    /// Set attribute value (update if exists, add if not)
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.set_attr(name, value);
    }

    /// Remove attribute by name, returning the old value if it existed
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attrs.remove_attr(name)
    }

    /// Inline style attribute, if any
    pub fn style(&self) -> Option<&str> {
        self.get_attr("style")
    }

    /// Replace the inline style, removing the attribute when `style` is empty
    pub fn set_style(&mut self, style: &str) {
        if style.is_empty() {
            self.remove_attr("style");
        } else {
            self.set_attr("style", style);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Content helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Check if element has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// No element children and only whitespace text
    pub fn is_blank(&self) -> bool {
        self.children.iter().all(Node::is_whitespace)
    }

    /// Check if any descendant element matches predicate
    pub fn has_descendant<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Element) -> bool + Copy,
    {
        self.children.iter().any(|child| {
            child
                .as_element()
                .is_some_and(|e| predicate(e) || e.has_descendant(predicate))
        })
    }

    /// The only non-whitespace child, if there is exactly one
    pub fn sole_child(&self) -> Option<&Node> {
        let mut meaningful = self.children.iter().filter(|n| !n.is_whitespace());
        let first = meaningful.next()?;
        meaningful.next().is_none().then_some(first)
    }

    /// Get text content of this element (concatenated from all text nodes)
    pub fn text_content(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    pub(crate) fn collect_text(&self, buf: &mut String) {
        for child in &self.children {
            child.collect_text(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_basics() {
        let elem = Element::new("div");
        assert_eq!(elem.tag, "div");
        assert!(elem.is_empty());
        assert!(elem.is_blank());
        assert!(!elem.is_void());
        assert!(Element::new("br").is_void());
    }

    #[test]
    fn test_set_style_empty_removes_attribute() {
        let mut elem = Element::styled("p", "color:red;");
        assert_eq!(elem.style(), Some("color:red;"));
        elem.set_style("");
        assert_eq!(elem.style(), None);
    }

    #[test]
    fn test_sole_child_ignores_whitespace() {
        let elem = Element::new("span").with_children([
            Node::text(" "),
            Node::element(Element::new("br")),
            Node::text("\n"),
        ]);
        assert!(elem.sole_child().is_some_and(Node::is_break));

        let elem = Element::new("span").with_children([Node::text("a"), Node::text("b")]);
        assert!(elem.sole_child().is_none());
    }

    #[test]
    fn test_has_descendant_searches_deeply() {
        let elem = Element::new("div").with_children([Node::element(
            Element::new("span").with_children([Node::element(Element::new("ul"))]),
        )]);
        assert!(elem.has_descendant(|e| is_structural_tag(&e.tag)));
        assert!(!elem.has_descendant(|e| e.is("table")));
    }

    #[test]
    fn test_text_content() {
        let elem = Element::new("p").with_children([
            Node::text("Hello "),
            Node::element(Element::new("strong").with_children([Node::text("world")])),
        ]);
        assert_eq!(elem.text_content(), "Hello world");
    }
}

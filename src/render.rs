//! HTML Rendering for markup trees
//!
//! Serializes a [`Fragment`] back to a markup string. Text is emitted as-is:
//! it was never decoded, so escaping it again would double-encode entities.

use crate::attr::Attrs;
use crate::node::{Element, Fragment, Node};

// =============================================================================
// Fragment Rendering
// =============================================================================

/// Render a fragment to an HTML string.
pub fn render_fragment(fragment: &Fragment) -> String {
    let mut output = String::new();
    render_nodes(&fragment.children, &mut output);
    output
}

fn render_nodes(nodes: &[Node], output: &mut String) {
    for node in nodes {
        render_node(node, output);
    }
}

/// Render an element to HTML.
fn render_element(elem: &Element, output: &mut String) {
    output.push('<');
    output.push_str(&elem.tag);
    render_attrs(&elem.attrs, output);

    // Void elements
    if elem.is_void() {
        output.push_str(" />");
        return;
    }

    output.push('>');
    render_nodes(&elem.children, output);
    output.push_str("</");
    output.push_str(&elem.tag);
    output.push('>');
}

/// Render a node to HTML.
fn render_node(node: &Node, output: &mut String) {
    match node {
        Node::Element(elem) => render_element(elem, output),
        Node::Text(text) => output.push_str(&text.content),
    }
}

/// Render attributes to HTML.
fn render_attrs(attrs: &Attrs, output: &mut String) {
    for (name, value) in attrs.iter() {
        output.push(' ');
        output.push_str(name);
        output.push_str("=\"");
        output.push_str(&escape_attr(value));
        output.push('"');
    }
}

/// Escape HTML special characters for display of markup as text.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape attribute value delimiters. Values keep their source entities,
/// so `&` is left alone.
fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("&quot;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

// =============================================================================
// Tests
// =============================================================================

//! Line-break reconciliation.
//!
//! Editor output mixes raw newlines with `<br>` elements. This stage decides
//! what each run of them means:
//!
//! | Context | Single break | Blank line / double `<br>` |
//! |---------|--------------|----------------------------|
//! | fragment root | `<br />` inside a new paragraph | paragraph boundary |
//! | `<p>` | `<br />` | paragraph boundary |
//! | flow container (`div`, `td`, ...) | `<br />` | paragraph boundary |
//! | heading, list item | `<br />` | single `<br />` |
//! | `pre`, `script`, `style`, `textarea` | untouched | untouched |
//!
//! A newline next to an explicit `<br>` is source formatting and does not
//! count as an extra break.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::FormatResult;
use crate::node::{is_block_tag, is_flow_container_tag, Children, Element, Fragment, Node};
use crate::style::canonical;

use super::core::{push_merged, trim_nodes, Stage};
use super::paragraph::has_content;

/// A run of newlines, with the horizontal whitespace around them.
static NEWLINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*(?:\n[ \t]*)+").expect("newline run pattern is valid"));

/// Converts raw newlines and `<br>` runs into soft breaks or paragraph
/// boundaries, wrapping root-level inline content into paragraphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileLineBreaks;

impl Stage for ReconcileLineBreaks {
    fn name(&self) -> &'static str {
        "reconcile-line-breaks"
    }

    fn apply(&self, fragment: Fragment) -> FormatResult<Fragment> {
        let mut children = fragment.children;
        normalize_line_endings(&mut children);
        Ok(Fragment {
            children: reconcile_flow(children, true),
        })
    }
}

fn normalize_line_endings(nodes: &mut [Node]) {
    for node in nodes {
        match node {
            Node::Text(text) if !text.is_markup() && text.content.contains('\r') => {
                text.content = text.content.replace("\r\n", "\n").replace('\r', "\n");
            }
            Node::Element(elem) => normalize_line_endings(&mut elem.children),
            Node::Text(_) => {}
        }
    }
}

fn is_verbatim_tag(tag: &str) -> bool {
    matches!(tag, "pre" | "script" | "style" | "textarea")
}

// =============================================================================
// Block dispatch
// =============================================================================

/// Reconcile a flow of mixed inline and block content. Inline runs are split
/// at boundaries; with `wrap_all` every visible run becomes a paragraph,
/// otherwise only runs that actually split are wrapped.
fn reconcile_flow(nodes: Children, wrap_all: bool) -> Children {
    let mut out = Children::new();
    let mut run = Children::new();
    for node in nodes {
        match node {
            Node::Element(elem) if is_block_tag(&elem.tag) => {
                flush_flow_run(std::mem::take(&mut run), wrap_all, &mut out);
                out.extend(reconcile_block(*elem));
            }
            other => run.push(other),
        }
    }
    flush_flow_run(run, wrap_all, &mut out);
    out
}

fn flush_flow_run(mut run: Children, wrap_all: bool, out: &mut Children) {
    trim_nodes(&mut run);
    if run.is_empty() {
        return;
    }
    let mut segments = segment(lex(run));
    if !wrap_all && segments.len() == 1 {
        out.extend(segments.pop().unwrap_or_default());
        return;
    }
    for children in segments {
        let mut p = Element::styled("p", canonical::PARAGRAPH);
        p.children = children;
        out.push(Node::element(p));
    }
}

fn reconcile_block(mut elem: Element) -> Vec<Node> {
    let tag = elem.tag.clone();
    match tag.as_str() {
        t if is_verbatim_tag(t) => {}
        "p" => return split_paragraph(elem),
        t if is_flow_container_tag(t) => {
            elem.children = reconcile_flow(std::mem::take(&mut elem.children), false);
        }
        "ul" | "ol" | "table" | "thead" | "tbody" | "tfoot" | "tr" => {
            elem.children = reconcile_listing(std::mem::take(&mut elem.children));
        }
        _ => {
            elem.children = reconcile_soft(std::mem::take(&mut elem.children));
        }
    }
    vec![Node::element(elem)]
}

/// Paragraph split at its boundaries. The first part keeps the attributes,
/// later parts get the canonical paragraph style.
fn split_paragraph(mut p: Element) -> Vec<Node> {
    let mut children = std::mem::take(&mut p.children);
    trim_nodes(&mut children);
    let mut segments = segment(lex(children)).into_iter();
    p.children = segments.next().unwrap_or_default();

    let mut out = vec![Node::element(p)];
    for children in segments {
        let mut next = Element::styled("p", canonical::PARAGRAPH);
        next.children = children;
        out.push(Node::element(next));
    }
    out
}

/// Lists and tables: whitespace between rows/items is dropped, child blocks
/// are reconciled.
fn reconcile_listing(nodes: Children) -> Children {
    let mut out = Children::new();
    for node in nodes {
        match node {
            Node::Element(elem) if is_block_tag(&elem.tag) => out.extend(reconcile_block(*elem)),
            n if n.is_whitespace() => {}
            other => out.push(other),
        }
    }
    out
}

/// Headings and list items: every newline run becomes a single `<br />`,
/// edge whitespace next to blocks is trimmed.
fn reconcile_soft(nodes: Children) -> Children {
    let mut out = Children::new();
    let mut run = Children::new();
    for node in nodes {
        match node {
            Node::Element(elem) if is_block_tag(&elem.tag) => {
                flush_soft_run(std::mem::take(&mut run), &mut out);
                out.extend(reconcile_block(*elem));
            }
            other => run.push(other),
        }
    }
    flush_soft_run(run, &mut out);
    out
}

fn flush_soft_run(mut run: Children, out: &mut Children) {
    trim_nodes(&mut run);
    for node in run {
        match node {
            Node::Text(text) if !text.is_markup() => split_text(&text.content, 1, out),
            Node::Element(elem) => out.push(Node::element(soften_inline(*elem))),
            other => out.push(other),
        }
    }
}

/// Inside inline elements a boundary cannot be expressed, so newline runs
/// become one `<br />` per newline, at most two.
fn soften_inline(mut elem: Element) -> Element {
    if elem.is_void() || is_verbatim_tag(&elem.tag) {
        return elem;
    }
    let mut out = Children::new();
    for node in std::mem::take(&mut elem.children) {
        match node {
            Node::Text(text) if !text.is_markup() => split_text(&text.content, 2, &mut out),
            Node::Element(child) => out.push(Node::element(soften_inline(*child))),
            other => out.push(other),
        }
    }
    elem.children = out;
    elem
}

/// Replace newline runs in `text` with `<br />`s, `min(newlines, max_breaks)`
/// per run.
fn split_text(text: &str, max_breaks: usize, out: &mut Children) {
    let mut last = 0;
    for m in NEWLINE_RUN.find_iter(text) {
        if m.start() > last {
            push_merged(out, Node::text(&text[last..m.start()]));
        }
        let newlines = m.as_str().matches('\n').count();
        for _ in 0..newlines.min(max_breaks) {
            out.push(Node::element(Element::new("br")));
        }
        last = m.end();
    }
    if last < text.len() {
        push_merged(out, Node::text(&text[last..]));
    }
}

// =============================================================================
// Break lexing
// =============================================================================

enum Item {
    Inline(Node),
    /// `Some` for an explicit `<br>`, `None` for a raw newline.
    Break(Option<Node>),
    Boundary,
}

fn lex(nodes: Children) -> Vec<Item> {
    let mut items = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) if !text.is_markup() => lex_text(&text.content, &mut items),
            n if n.is_break() => items.push(Item::Break(Some(n))),
            Node::Element(elem) if is_block_tag(&elem.tag) => {
                items.extend(reconcile_block(*elem).into_iter().map(Item::Inline));
            }
            Node::Element(elem) => items.push(Item::Inline(Node::element(soften_inline(*elem)))),
            other => items.push(Item::Inline(other)),
        }
    }
    items
}

fn lex_text(text: &str, items: &mut Vec<Item>) {
    let mut last = 0;
    for m in NEWLINE_RUN.find_iter(text) {
        if m.start() > last {
            items.push(Item::Inline(Node::text(&text[last..m.start()])));
        }
        let newlines = m.as_str().matches('\n').count();
        items.push(if newlines >= 2 { Item::Boundary } else { Item::Break(None) });
        last = m.end();
    }
    if last < text.len() {
        items.push(Item::Inline(Node::text(&text[last..])));
    }
}

/// Consecutive break items, with the whitespace between them.
#[derive(Default)]
struct BreakRun {
    explicit: Vec<Node>,
    newlines: usize,
    boundary: bool,
    spacing: Vec<Node>,
}

impl BreakRun {
    /// Explicit breaks win over the newlines formatting them.
    fn count(&self) -> usize {
        if self.explicit.is_empty() { self.newlines } else { self.explicit.len() }
    }

    fn resolve(self, current: &mut Children, segments: &mut Vec<Children>) {
        if self.boundary || self.count() >= 2 {
            segments.push(std::mem::take(current));
            return;
        }
        let br = self
            .explicit
            .into_iter()
            .next()
            .unwrap_or_else(|| Node::element(Element::new("br")));
        current.push(br);
        for node in self.spacing {
            push_merged(current, node);
        }
    }
}

/// Group items into visible, edge-trimmed segments.
fn segment(items: Vec<Item>) -> Vec<Children> {
    let mut segments = Vec::new();
    let mut current = Children::new();
    let mut pending: Option<BreakRun> = None;

    for item in items {
        match item {
            Item::Break(Some(br)) => pending.get_or_insert_with(BreakRun::default).explicit.push(br),
            Item::Break(None) => pending.get_or_insert_with(BreakRun::default).newlines += 1,
            Item::Boundary => pending.get_or_insert_with(BreakRun::default).boundary = true,
            Item::Inline(node) => {
                if let Some(run) = pending.as_mut()
                    && node.is_whitespace()
                {
                    run.spacing.push(node);
                    continue;
                }
                if let Some(run) = pending.take() {
                    run.resolve(&mut current, &mut segments);
                }
                push_merged(&mut current, node);
            }
        }
    }
    if let Some(run) = pending.take() {
        run.resolve(&mut current, &mut segments);
    }
    segments.push(current);

    segments
        .into_iter()
        .filter_map(|mut seg| {
            trim_nodes(&mut seg);
            has_content(&seg).then_some(seg)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::from_html;
    use crate::render::render_fragment;

    fn reconcile(input: &str) -> String {
        let frag = from_html(input).unwrap();
        render_fragment(&ReconcileLineBreaks.apply(frag).unwrap())
    }

    fn p(content: &str) -> String {
        format!(r#"<p style="{}">{content}</p>"#, canonical::PARAGRAPH)
    }

    #[test]
    fn test_blank_lines_become_paragraphs() {
        let out = reconcile("Hi Luke,\n\nThank you for your enquiry.\n\nBest regards");
        assert_eq!(
            out,
            format!("{}{}{}", p("Hi Luke,"), p("Thank you for your enquiry."), p("Best regards"))
        );
        assert!(!out.contains("\n\n"));
    }

    #[test]
    fn test_crlf_is_normalized() {
        let out = reconcile("One\r\n\r\nTwo\rThree");
        assert_eq!(out, format!("{}{}", p("One"), p("Two<br />Three")));
    }

    #[test]
    fn test_single_newline_is_soft_break() {
        assert_eq!(reconcile("a\nb"), p("a<br />b"));
        assert_eq!(reconcile("a  \n\t b"), p("a<br />b"));
    }

    #[test]
    fn test_newline_next_to_break_is_formatting() {
        assert_eq!(reconcile("a<br>\nb"), p("a<br />b"));
        assert_eq!(reconcile("a\n<br>\nb"), p("a<br />b"));
        assert_eq!(reconcile("a<br>\n<br>\nb"), format!("{}{}", p("a"), p("b")));
    }

    #[test]
    fn test_double_break_splits_paragraph() {
        let out = reconcile(r#"<p class="intro">One<br><br>Two</p>"#);
        assert_eq!(out, format!(r#"<p class="intro">One</p>{}"#, p("Two")));
    }

    #[test]
    fn test_whitespace_between_blocks_dropped() {
        let out = reconcile("<h3>Title</h3>\n\n<p>Body</p>\n");
        assert_eq!(out, "<h3>Title</h3><p>Body</p>");
    }

    #[test]
    fn test_heading_and_list_item_get_single_breaks() {
        assert_eq!(reconcile("<h2>A\n\n\nB</h2>"), "<h2>A<br />B</h2>");
        let out = reconcile("<ul>\n  <li>\n one\n two\n </li>\n</ul>");
        assert_eq!(out, "<ul><li>one<br />two</li></ul>");
    }

    #[test]
    fn test_nested_flow_container_wraps_only_on_boundary() {
        assert_eq!(
            reconcile("<blockquote>\n quoted\n</blockquote>"),
            "<blockquote>quoted</blockquote>"
        );
        assert_eq!(
            reconcile("<blockquote>one\n\ntwo</blockquote>"),
            format!("<blockquote>{}{}</blockquote>", p("one"), p("two"))
        );
    }

    #[test]
    fn test_pre_is_untouched() {
        let input = "<pre>a\n\nb</pre>";
        assert_eq!(reconcile(input), input);
    }

    #[test]
    fn test_inline_element_newlines_soften() {
        assert_eq!(reconcile("<b>a\nb\n\n\nc</b>"), p("<b>a<br />b<br /><br />c</b>"));
    }

    #[test]
    fn test_stable_on_own_output() {
        let once = reconcile("Intro line\nsecond line\n\n<ul><li>x</li></ul>Outro");
        assert_eq!(reconcile(&once), once);
    }

    #[test]
    fn test_whitespace_only_input() {
        assert_eq!(reconcile(" \n\n \n"), "");
    }
}

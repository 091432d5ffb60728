//! Paragraph tidying and document edge spacing.

use crate::error::FormatResult;
use crate::node::{Children, Element, Fragment, Node};
use crate::style::{canonical, merge, sanitize_paragraph_style};

use super::core::{rewrite_elements, trim_nodes, Rewrite, Stage};

// =============================================================================
// TidyParagraphs
// =============================================================================

/// Strips edge breaks from paragraphs and deletes paragraphs left with
/// nothing but whitespace, non-breaking spaces and breaks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TidyParagraphs;

impl Stage for TidyParagraphs {
    fn name(&self) -> &'static str {
        "tidy-paragraphs"
    }

    fn apply(&self, fragment: Fragment) -> FormatResult<Fragment> {
        let children = rewrite_elements(fragment.children, &mut tidy_element);
        Ok(Fragment { children })
    }
}

fn tidy_element(mut elem: Element) -> Rewrite {
    if !elem.is("p") {
        return Rewrite::Keep(elem);
    }
    strip_edge_breaks(&mut elem.children);
    if is_hollow(&elem.children) {
        return Rewrite::Remove;
    }
    let style = merge(&[canonical::PARAGRAPH, &sanitize_paragraph_style(elem.style())]);
    elem.set_style(&style);
    Rewrite::Keep(elem)
}

fn strip_edge_breaks(children: &mut Children) {
    loop {
        trim_nodes(children);
        let edge_break = children.first().is_some_and(Node::is_break)
            || children.last().is_some_and(Node::is_break);
        if !edge_break {
            break;
        }
        if children.first().is_some_and(Node::is_break) {
            children.remove(0);
        }
        if children.last().is_some_and(Node::is_break) {
            children.pop();
        }
    }
}

/// Only whitespace, non-breaking spaces and breaks.
fn is_hollow(children: &[Node]) -> bool {
    children.iter().all(|node| match node {
        Node::Text(text) => text.is_blank_or_nbsp(),
        Node::Element(elem) => elem.is("br"),
    })
}

// =============================================================================
// TrimEdges
// =============================================================================

/// Canonical spacing on the first paragraph, flush margin on the last.
///
/// A single paragraph is both, and gets the flush margin.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimEdges;

impl Stage for TrimEdges {
    fn name(&self) -> &'static str {
        "trim-edges"
    }

    fn apply(&self, mut fragment: Fragment) -> FormatResult<Fragment> {
        let count = fragment.count_tag("p");
        if count == 0 {
            return Ok(fragment);
        }
        let last = count - 1;
        let mut index = 0;
        fragment.for_each_element_mut(|elem| {
            if !elem.is("p") {
                return;
            }
            let base = if index == last {
                canonical::FLUSH_MARGIN
            } else if index == 0 {
                canonical::PARAGRAPH
            } else {
                index += 1;
                return;
            };
            let style = merge(&[base, &sanitize_paragraph_style(elem.style())]);
            elem.set_style(&style);
            index += 1;
        });
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::from_html;
    use crate::render::render_fragment;

    fn run(stage: &dyn Stage, input: &str) -> String {
        let frag = from_html(input).unwrap();
        render_fragment(&stage.apply(frag).unwrap())
    }

    #[test]
    fn test_hollow_paragraphs_removed() {
        assert_eq!(run(&TidyParagraphs, "<p></p><p> &nbsp; </p><p><br><br /></p>"), "");
        assert_eq!(run(&TidyParagraphs, r#"<p style="color:red">&#160;<br></p>"#), "");
    }

    #[test]
    fn test_edge_breaks_stripped() {
        let out = run(&TidyParagraphs, "<p><br> Hello<br>world <br> <br></p>");
        assert_eq!(
            out,
            format!(r#"<p style="{}">Hello<br />world</p>"#, canonical::PARAGRAPH)
        );
    }

    #[test]
    fn test_paragraph_with_element_survives() {
        let out = run(&TidyParagraphs, r#"<p><img src="x.png"></p>"#);
        assert!(out.contains("<img"));
    }

    #[test]
    fn test_tidy_is_not_recursive_into_other_blocks() {
        assert_eq!(run(&TidyParagraphs, "<div><br></div>"), "<div><br /></div>");
    }

    #[test]
    fn test_trim_edges() {
        let out = run(&TrimEdges, "<p>a</p><p>b</p><p>c</p>");
        let frag = from_html(&out).unwrap();
        let styles: Vec<_> = frag
            .find_all(|e| e.is("p"))
            .iter()
            .map(|p| p.style().map(str::to_string))
            .collect();
        assert_eq!(styles[0].as_deref(), Some(canonical::PARAGRAPH));
        // interior paragraphs are left alone
        assert_eq!(styles[1], None);
        assert_eq!(styles[2].as_deref(), Some(canonical::FLUSH_MARGIN));
    }

    #[test]
    fn test_single_paragraph_gets_flush() {
        let out = run(&TrimEdges, r#"<p style="margin:9px;color:red">only</p>"#);
        assert_eq!(out, r#"<p style="margin:0 0 0 0;color:red;">only</p>"#);
    }

    #[test]
    fn test_last_paragraph_keeps_line_height() {
        let input = format!(r#"<p>a</p><p style="{}">b</p>"#, canonical::PARAGRAPH);
        let out = run(&TrimEdges, &input);
        assert!(out.ends_with(
            r#"<p style="margin:0 0 0 0;line-height:1.6;font-family:Raleway,Arial,sans-serif;">b</p>"#
        ));
    }
}

//! Paragraph stages: div-to-paragraph conversion, canonical paragraph
//! spacing, and splitting paragraphs on double breaks.

use crate::attr::AttrsExt;
use crate::error::FormatResult;
use crate::node::{is_structural_tag, Children, Element, Fragment, Node};
use crate::style::{canonical, merge, sanitize_paragraph_style};

use super::core::{rewrite_elements, trim_nodes, Rewrite, Stage};

/// Canonical paragraph style merged over the sanitized existing style.
fn paragraph_style(existing: Option<&str>) -> String {
    let cleaned = sanitize_paragraph_style(existing);
    merge(&[canonical::PARAGRAPH, &cleaned])
}

// =============================================================================
// ConvertParagraphs
// =============================================================================

/// Turns leaf `div`s (no structural descendants) into paragraphs.
///
/// The paragraph keeps the div's identity attributes and its non-spacing
/// style over the canonical paragraph style. Blank divs are removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertParagraphs;

impl Stage for ConvertParagraphs {
    fn name(&self) -> &'static str {
        "convert-paragraphs"
    }

    fn apply(&self, fragment: Fragment) -> FormatResult<Fragment> {
        let children = rewrite_elements(fragment.children, &mut convert_element);
        Ok(Fragment { children })
    }
}

fn convert_element(elem: Element) -> Rewrite {
    if !elem.is("div") {
        return Rewrite::Keep(elem);
    }
    if elem.is_blank() {
        return Rewrite::Remove;
    }
    if elem.has_descendant(|e| is_structural_tag(&e.tag)) {
        return Rewrite::Keep(elem);
    }
    Rewrite::Replace(vec![Node::element(div_to_paragraph(elem))])
}

fn div_to_paragraph(div: Element) -> Element {
    let style = paragraph_style(div.style());
    let mut p = Element::with_attrs("p", div.attrs.identity_attrs());
    p.set_style(&style);
    let mut children = div.children;
    trim_nodes(&mut children);
    p.children = children;
    p
}

// =============================================================================
// ParagraphStyle
// =============================================================================

/// Re-runs div conversion, then asserts canonical spacing on every paragraph.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphStyle;

impl Stage for ParagraphStyle {
    fn name(&self) -> &'static str {
        "paragraph-style"
    }

    fn apply(&self, fragment: Fragment) -> FormatResult<Fragment> {
        let mut fragment = ConvertParagraphs.apply(fragment)?;
        fragment.for_each_element_mut(|elem| {
            if elem.is("p") {
                let style = paragraph_style(elem.style());
                elem.set_style(&style);
            }
        });
        Ok(fragment)
    }
}

// =============================================================================
// SplitDoubleBreaks
// =============================================================================

/// Splits a paragraph at every run of two or more `<br>` (whitespace between
/// them allowed) into separate paragraphs.
///
/// Every part keeps the original attributes except `id`, which stays on the
/// first part only. Parts with no visible content are dropped. A paragraph
/// with at most one part is left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitDoubleBreaks;

impl Stage for SplitDoubleBreaks {
    fn name(&self) -> &'static str {
        "split-double-breaks"
    }

    fn apply(&self, fragment: Fragment) -> FormatResult<Fragment> {
        let children = rewrite_elements(fragment.children, &mut split_element);
        Ok(Fragment { children })
    }
}

fn split_element(elem: Element) -> Rewrite {
    if !elem.is("p") {
        return Rewrite::Keep(elem);
    }
    let segments = split_on_double_breaks(&elem.children);
    if segments.len() <= 1 {
        return Rewrite::Keep(elem);
    }

    let mut later_attrs = elem.attrs.clone();
    later_attrs.remove_attr("id");

    let parts = segments
        .into_iter()
        .enumerate()
        .map(|(i, children)| {
            let attrs = if i == 0 { elem.attrs.clone() } else { later_attrs.clone() };
            let mut p = Element::with_attrs("p", attrs);
            p.children = children;
            Node::element(p)
        })
        .collect();
    Rewrite::Replace(parts)
}

/// Visible segments of `nodes` between double-break runs, edge-trimmed.
fn split_on_double_breaks(nodes: &[Node]) -> Vec<Children> {
    let mut segments = Vec::new();
    let mut current = Children::new();
    // breaks and whitespace seen since the last content node
    let mut pending = Children::new();
    let mut breaks = 0usize;

    for node in nodes {
        if node.is_break() {
            breaks += 1;
            pending.push(node.clone());
        } else if breaks > 0 && node.is_whitespace() {
            pending.push(node.clone());
        } else {
            if breaks >= 2 {
                segments.push(std::mem::take(&mut current));
                pending.clear();
            } else {
                current.append(&mut pending);
            }
            breaks = 0;
            current.push(node.clone());
        }
    }
    if breaks >= 2 {
        segments.push(std::mem::take(&mut current));
    } else {
        current.append(&mut pending);
    }
    segments.push(current);

    segments
        .into_iter()
        .filter_map(|mut segment| {
            trim_nodes(&mut segment);
            has_content(&segment).then_some(segment)
        })
        .collect()
}

/// Anything other than breaks and whitespace.
pub(crate) fn has_content(nodes: &[Node]) -> bool {
    nodes.iter().any(|n| !n.is_break() && !n.is_whitespace())
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

    fn p(content: &str) -> String {
        format!(r#"<p style="{}">{content}</p>"#, canonical::PARAGRAPH)
    }

    #[test]
    fn test_leaf_div_becomes_paragraph() {
        assert_eq!(run(&ConvertParagraphs, "<div> Hello </div>"), p("Hello"));
    }

    #[test]
    fn test_converted_paragraph_keeps_identity_and_style() {
        let out = run(
            &ConvertParagraphs,
            r#"<div id="sig" title="x" style="margin:20px;color:red" data-k="v">Hi</div>"#,
        );
        let expected = format!(
            r#"<p id="sig" data-k="v" style="{}color:red;">Hi</p>"#,
            canonical::PARAGRAPH
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_structural_div_is_kept() {
        let out = run(&ConvertParagraphs, "<div><ul><li>a</li></ul></div>");
        assert_eq!(out, "<div><ul><li>a</li></ul></div>");
    }

    #[test]
    fn test_nested_divs_never_nest_paragraphs() {
        let out = run(&ConvertParagraphs, "<div><div>inner</div>tail</div>");
        assert_eq!(out, format!("<div>{}tail</div>", p("inner")));
        assert_eq!(out.matches("<p").count(), 1);
    }

    #[test]
    fn test_blank_div_removed() {
        assert_eq!(run(&ConvertParagraphs, "<div> </div><div>x</div>"), p("x"));
    }

    #[test]
    fn test_paragraph_style_replaces_spacing() {
        let out = run(&ParagraphStyle, r#"<p style="margin:30px;padding:4px;color:blue">x</p>"#);
        assert_eq!(out, format!(r#"<p style="{}color:blue;">x</p>"#, canonical::PARAGRAPH));
        // stable on a second pass
        assert_eq!(run(&ParagraphStyle, &out), out);
    }

    #[test]
    fn test_split_double_breaks() {
        let out = run(
            &SplitDoubleBreaks,
            r#"<p id="a" class="c">One<br><br>Two<br> <br /><br>Three</p>"#,
        );
        assert_eq!(
            out,
            r#"<p id="a" class="c">One</p><p class="c">Two</p><p class="c">Three</p>"#
        );
    }

    #[test]
    fn test_single_break_is_not_split() {
        let input = "<p>One<br />Two</p>";
        assert_eq!(run(&SplitDoubleBreaks, input), input);
    }

    #[test]
    fn test_split_drops_empty_parts() {
        let out = run(&SplitDoubleBreaks, "<p><br><br>One<br><br>&nbsp;x<br><br> </p>");
        assert_eq!(out, "<p>One</p><p>&nbsp;x</p>");
        // a single visible part leaves the paragraph alone
        let input = "<p>One<br /><br /></p>";
        assert_eq!(run(&SplitDoubleBreaks, input), input);
    }
}

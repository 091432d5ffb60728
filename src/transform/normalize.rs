//! Structural normalization: collapse empty wrappers left behind by editors.

use crate::error::FormatResult;
use crate::node::{Element, Fragment, Node};
use crate::style::is_meaningful_span;

use super::core::{rewrite_elements, Rewrite, Stage};

/// Removes blank `div`/`span` wrappers and unwraps spans that carry no
/// meaningful styling.
///
/// - whitespace-only `div` is removed
/// - empty `span` is removed, whitespace-only `span` is replaced by its text
/// - a `span` wrapping only a `<br>` becomes that `<br>`
/// - a `span` wrapping only a non-breaking space becomes `&nbsp;`
/// - a `span` without identity or significant style is unwrapped
///
/// Runs bottom-up, so wrappers emptied by inner removals collapse too.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeStructure;

impl Stage for NormalizeStructure {
    fn name(&self) -> &'static str {
        "normalize-structure"
    }

    fn apply(&self, fragment: Fragment) -> FormatResult<Fragment> {
        let children = rewrite_elements(fragment.children, &mut normalize_element);
        Ok(Fragment { children })
    }
}

fn normalize_element(elem: Element) -> Rewrite {
    match elem.tag.as_str() {
        "div" if elem.is_blank() => Rewrite::Remove,
        "span" => normalize_span(elem),
        _ => Rewrite::Keep(elem),
    }
}

fn normalize_span(elem: Element) -> Rewrite {
    if elem.is_empty() {
        return Rewrite::Remove;
    }
    if elem.is_blank() {
        return Rewrite::Replace(elem.children.into_vec());
    }
    if let Some(sole) = elem.sole_child() {
        if sole.is_break() {
            return Rewrite::Replace(vec![Node::element(Element::new("br"))]);
        }
        if sole.as_text().is_some_and(|t| t.is_single_nbsp()) {
            return Rewrite::Replace(vec![Node::text("&nbsp;")]);
        }
    }
    if is_meaningful_span(&elem.attrs) {
        Rewrite::Keep(elem)
    } else {
        Rewrite::Replace(elem.children.into_vec())
    }
}

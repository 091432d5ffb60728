//! Core stage trait and tree rewriting helpers.

use crate::error::FormatResult;
use crate::node::{Children, Element, Fragment, Node};

/// One step of the formatting pipeline: a whole-fragment rewrite.
///
/// Stages are pure: they consume a fragment and return a new one. Errors are
/// never handled inside a stage; the pipeline boundary decides what to do.
pub trait Stage: Send + Sync {
    /// Stable stage name, used in traces and errors.
    fn name(&self) -> &'static str;

    /// Rewrite the fragment.
    fn apply(&self, fragment: Fragment) -> FormatResult<Fragment>;
}

// =============================================================================
// WrapContainer
// =============================================================================

/// Reserved outer-container step. Email bodies are embedded as-is today, so
/// this returns the fragment unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct WrapContainer;

impl Stage for WrapContainer {
    fn name(&self) -> &'static str {
        "wrap-container"
    }

    #[inline]
    fn apply(&self, fragment: Fragment) -> FormatResult<Fragment> {
        Ok(fragment)
    }
}

// =============================================================================
// Rewriting helpers
// =============================================================================

/// What replaces an element during a bottom-up rewrite.
pub(crate) enum Rewrite {
    Keep(Element),
    Replace(Vec<Node>),
    Remove,
}

/// Rebuild `nodes` bottom-up: the children of every element are rewritten
/// before `f` decides what replaces the element itself. Text passes through.
pub(crate) fn rewrite_elements<F>(nodes: Children, f: &mut F) -> Children
where
    F: FnMut(Element) -> Rewrite,
{
    let mut out = Children::new();
    for node in nodes {
        match node {
            Node::Element(elem) => {
                let mut elem = *elem;
                if !elem.children.is_empty() {
                    let children = std::mem::take(&mut elem.children);
                    elem.children = rewrite_elements(children, f);
                }
                match f(elem) {
                    Rewrite::Keep(elem) => out.push(Node::element(elem)),
                    Rewrite::Replace(nodes) => {
                        for node in nodes {
                            push_merged(&mut out, node);
                        }
                    }
                    Rewrite::Remove => {}
                }
            }
            text => push_merged(&mut out, text),
        }
    }
    out
}

/// Push a node, merging adjacent plain text into one node.
pub(crate) fn push_merged(out: &mut Children, node: Node) {
    if let Node::Text(text) = &node
        && !text.is_markup()
        && let Some(Node::Text(prev)) = out.last_mut()
        && !prev.is_markup()
    {
        prev.content.push_str(&text.content);
        return;
    }
    out.push(node);
}

/// Trim leading whitespace of the first text node and trailing whitespace of
/// the last, dropping text nodes emptied by the trim.
pub(crate) fn trim_nodes(nodes: &mut Children) {
    while let Some(Node::Text(text)) = nodes.first_mut() {
        if text.is_markup() {
            break;
        }
        let trimmed = text.content.trim_start();
        if trimmed.is_empty() {
            nodes.remove(0);
            continue;
        }
        if trimmed.len() != text.content.len() {
            text.content = trimmed.to_string();
        }
        break;
    }
    while let Some(Node::Text(text)) = nodes.last_mut() {
        if text.is_markup() {
            break;
        }
        let trimmed = text.content.trim_end();
        if trimmed.is_empty() {
            nodes.pop();
            continue;
        }
        let keep = trimmed.len();
        text.content.truncate(keep);
        break;
    }
}

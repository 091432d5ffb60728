//! Numeric guard: protect money, percentages and large numbers from mail
//! client autoformatting (phone-number and smart-tag heuristics).

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::FormatResult;
use crate::node::{Children, Element, Fragment, Node};
use crate::style::{canonical, merge};

use super::core::{push_merged, Stage};

/// Bare numbers at or above this value are guarded.
pub const BARE_NUMBER_THRESHOLD: f64 = 100.0;

/// Currency, then percentage, then bare number. Alternation order decides
/// precedence where matches start at the same position.
static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?P<currency>[£$€](?:[0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)(?:\.[0-9]{1,2})?(?i:\s*\+\s*VAT\b)?)",
        r"|(?P<percent>\b[0-9]+(?:\.[0-9]+)?%)",
        r"|(?P<number>\b(?:[0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)(?:\.[0-9]+)?\b)",
    ))
    .expect("numeric pattern is valid")
});

/// Character entities and `[Placeholder]` tokens are never touched.
static PROTECTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#?[A-Za-z0-9]+;|\[[^\[\]]*\]").expect("protected pattern is valid")
});

/// Wraps numeric tokens in a span overriding weight and decoration.
#[derive(Debug, Clone, Copy)]
pub struct GuardNumbers {
    threshold: f64,
}

impl Default for GuardNumbers {
    fn default() -> Self {
        Self {
            threshold: BARE_NUMBER_THRESHOLD,
        }
    }
}

impl GuardNumbers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard bare numbers at or above `threshold` instead of the default.
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn guard_nodes(&self, nodes: Children) -> Children {
        let mut out = Children::new();
        for node in nodes {
            match node {
                Node::Text(text) if !text.is_markup() => self.guard_text(&text.content, &mut out),
                Node::Element(mut elem) => {
                    if !skips_guard(&elem) {
                        let children = std::mem::take(&mut elem.children);
                        elem.children = self.guard_nodes(children);
                    }
                    out.push(Node::Element(elem));
                }
                other => out.push(other),
            }
        }
        out
    }

    /// Split `text` around protected regions, guarding the gaps.
    fn guard_text(&self, text: &str, out: &mut Children) {
        let mut last = 0;
        for region in PROTECTED.find_iter(text) {
            self.guard_plain(&text[last..region.start()], out);
            push_merged(out, Node::text(region.as_str()));
            last = region.end();
        }
        self.guard_plain(&text[last..], out);
    }

    fn guard_plain(&self, text: &str, out: &mut Children) {
        let mut last = 0;
        for caps in NUMERIC.captures_iter(text) {
            let Some(token) = caps.get(0) else {
                continue;
            };
            if !self.should_guard(&caps) {
                continue;
            }
            if token.start() > last {
                push_merged(out, Node::text(&text[last..token.start()]));
            }
            out.push(guard_span(token.as_str()));
            last = token.end();
        }
        if last < text.len() {
            push_merged(out, Node::text(&text[last..]));
        }
    }

    fn should_guard(&self, caps: &Captures<'_>) -> bool {
        if caps.name("currency").is_some() || caps.name("percent").is_some() {
            return true;
        }
        caps.name("number")
            .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
            .is_some_and(|value| value >= self.threshold)
    }
}

impl Stage for GuardNumbers {
    fn name(&self) -> &'static str {
        "guard-numbers"
    }

    fn apply(&self, fragment: Fragment) -> FormatResult<Fragment> {
        Ok(Fragment {
            children: self.guard_nodes(fragment.children),
        })
    }
}

fn guard_span(token: &str) -> Node {
    Node::element(Element::styled("span", canonical::NUMERIC_GUARD).with_children([Node::text(token)]))
}

/// Links, code-like elements and spans already guarded are left alone.
fn skips_guard(elem: &Element) -> bool {
    match elem.tag.as_str() {
        "a" | "style" | "script" | "title" | "textarea" => true,
        "span" => elem
            .style()
            .is_some_and(|style| merge(&[style]) == canonical::NUMERIC_GUARD),
        _ => false,
    }
}

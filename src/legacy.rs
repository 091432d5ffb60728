//! The legacy (production) formatter.
//!
//! Two steps:
//!
//! 1. highlight cleanup: editor chrome is removed, highlight markers are
//!    stripped from user content
//! 2. double-break conversion: `<br />` runs and blank lines split the
//!    document into bare `<p>` paragraphs

use std::sync::LazyLock;

use regex::Regex;

use crate::attr::{has_class, remove_class, AttrsExt};
use crate::convert::from_html;
use crate::error::FormatResult;
use crate::node::{Element, Fragment};
use crate::render::render_fragment;
use crate::select::Formatter;
use crate::transform::{rewrite_elements, Rewrite};

/// Classes of editor controls removed together with their content.
const CHROME_CLASSES: &[&str] = &[
    "lock-toggle",
    "block-sidebar",
    "sentence-delete",
    "block-option-list",
    "option-bubble",
    "block-label",
    "block-label-display",
];

/// Attributes marking highlighted user content.
const MARKER_ATTRS: &[&str] = &["data-placeholder", "data-inserted", "data-link", "data-sentence"];

/// Class marking a highlighted block body.
const BLOCK_MAIN: &str = "block-main";

static BREAK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:<br />){2,}").expect("break run pattern is valid"));
static DIV_THEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</div>\s*<br />").expect("div break pattern is valid"));
static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("blank line pattern is valid"));

// =============================================================================
// LegacyFormatter
// =============================================================================

/// The legacy formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyFormatter {
    preserve_highlights: bool,
}

impl LegacyFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip highlight cleanup (editor previews keep their markers).
    pub fn preserving_highlights() -> Self {
        Self {
            preserve_highlights: true,
        }
    }

    /// Format `markup`.
    pub fn run(&self, markup: &str) -> FormatResult<String> {
        if self.preserve_highlights {
            return Ok(convert_double_breaks(markup));
        }
        let cleaned = remove_highlights(markup)?;
        Ok(convert_double_breaks(&cleaned))
    }
}

impl Formatter for LegacyFormatter {
    fn name(&self) -> &str {
        "legacy"
    }

    fn format(&self, markup: &str) -> FormatResult<String> {
        self.run(markup)
    }
}

// =============================================================================
// Steps
// =============================================================================

/// Remove editor chrome and strip highlight markers, keeping user content.
pub fn remove_highlights(markup: &str) -> FormatResult<String> {
    let fragment = from_html(markup)?;
    let children = rewrite_elements(fragment.children, &mut clean_element);
    Ok(render_fragment(&Fragment { children }))
}

fn clean_element(mut elem: Element) -> Rewrite {
    if CHROME_CLASSES.iter().any(|class| has_class(&elem.attrs, class)) {
        return Rewrite::Remove;
    }
    let highlighted =
        MARKER_ATTRS.iter().any(|name| elem.attrs.has_attr(name)) || has_class(&elem.attrs, BLOCK_MAIN);
    if highlighted {
        for name in MARKER_ATTRS.iter().chain(&["style", "contenteditable"]) {
            elem.remove_attr(name);
        }
        remove_class(&mut elem.attrs, BLOCK_MAIN);
    }
    Rewrite::Keep(elem)
}

/// Split on `<br />` runs and blank lines, wrapping each non-blank part in a
/// bare `<p>`.
pub fn convert_double_breaks(markup: &str) -> String {
    let normalized = markup.replace("\r\n", "\n");
    let normalized = BREAK_RUN.replace_all(&normalized, "\n\n");
    let normalized = DIV_THEN_BREAK.replace_all(&normalized, "</div>");

    BLANK_LINE
        .split(&normalized)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| format!("<p>{part}</p>"))
        .collect()
}

//! Text node type
//!
//! Raw text runs between tags. Entities stay encoded: `&nbsp;` is five
//! characters of content, not one.

/// Kind of text content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextKind {
    /// Character data between tags
    #[default]
    Plain,
    /// Comments, doctypes and processing instructions, emitted verbatim and
    /// ignored by every stage
    Markup,
}

/// Text content node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// Raw text content
    pub content: String,
    /// Plain text or pass-through markup
    pub kind: TextKind,
}

/// Spellings of a non-breaking space in editor output.
const NBSP_FORMS: [&str; 3] = ["&nbsp;", "&#160;", "\u{a0}"];

impl Text {
    /// Create a new text node
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: TextKind::Plain,
        }
    }

    /// Create a pass-through markup node (comment, doctype)
    pub fn markup(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: TextKind::Markup,
        }
    }

    /// Check if this is pass-through markup
    pub fn is_markup(&self) -> bool {
        self.kind == TextKind::Markup
    }

    /// Check if text content is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Get text length in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Check if text is only whitespace
    pub fn is_whitespace(&self) -> bool {
        !self.is_markup() && self.content.trim().is_empty()
    }

    /// Check if text is only whitespace and non-breaking spaces
    pub fn is_blank_or_nbsp(&self) -> bool {
        !self.is_markup() && strip_nbsp(&self.content).trim().is_empty()
    }

    /// Check if text is exactly one non-breaking space (surrounding whitespace allowed)
    pub fn is_single_nbsp(&self) -> bool {
        if self.is_markup() {
            return false;
        }
        let trimmed = self.content.trim_matches(|c: char| c.is_whitespace() && c != '\u{a0}');
        NBSP_FORMS
            .iter()
            .any(|form| trimmed.eq_ignore_ascii_case(form))
    }

    /// Get trimmed content
    pub fn trimmed(&self) -> &str {
        self.content.trim()
    }
}

/// Remove every non-breaking space spelling from `s`.
pub(crate) fn strip_nbsp(s: &str) -> String {
    let mut out = s.to_string();
    for form in NBSP_FORMS {
        if out.contains(form) {
            out = out.replace(form, "");
        }
    }
    // entity names are case-insensitive in editor output
    if out.contains("&NBSP;") {
        out = out.replace("&NBSP;", "");
    }
    out
}

//! Inline style declarations: merging, stripping and classification.
//!
//! Every stage that asserts a canonical style goes through [`merge`], so the
//! conflict rule is the same everywhere: the rightmost fragment wins per
//! property, and a property keeps the position where it was first seen.

use compact_str::CompactString;
use rustc_hash::FxHashMap;

use crate::attr::{Attrs, AttrsExt};

// =============================================================================
// Canonical styles
// =============================================================================

/// Fixed inline styles asserted by the formatting stages.
pub mod canonical {
    /// Font stack applied to every styled block.
    pub const FONT_FAMILY: &str = "Raleway,Arial,sans-serif";

    /// Paragraph style: top-flush, 8px bottom margin.
    pub const PARAGRAPH: &str = "margin:0 0 8px 0;line-height:1.6;font-family:Raleway,Arial,sans-serif;";

    /// Margin for the last paragraph of a document.
    pub const FLUSH_MARGIN: &str = "margin:0 0 0 0;";

    /// `<h1>`
    pub const H1: &str = "font-size:24px;font-weight:700;margin:4px 0 8px 0;font-family:Raleway,Arial,sans-serif;line-height:1.3;";
    /// `<h2>`
    pub const H2: &str = "font-size:20px;font-weight:700;margin:4px 0 8px 0;font-family:Raleway,Arial,sans-serif;line-height:1.3;";
    /// `<h3>`
    pub const H3: &str = "font-size:18px;font-weight:700;margin:4px 0 8px 0;font-family:Raleway,Arial,sans-serif;line-height:1.3;";

    /// `<ul>`
    pub const UNORDERED_LIST: &str =
        "margin:0 0 8px 20px;padding:0;list-style-type:disc;font-family:Raleway,Arial,sans-serif;";
    /// `<ol>`
    pub const ORDERED_LIST: &str =
        "margin:0 0 8px 20px;padding:0;list-style-type:decimal;font-family:Raleway,Arial,sans-serif;";
    /// `<li>`
    pub const LIST_ITEM: &str = "margin:0 0 4px 0;line-height:1.6;font-family:Raleway,Arial,sans-serif;";

    /// `<a>`
    pub const LINK: &str =
        "color:#3690CE!important;text-decoration:underline!important;font-family:Raleway,Arial,sans-serif;";

    /// Override span wrapped around numbers and currency.
    pub const NUMERIC_GUARD: &str = "font-weight:normal!important;text-decoration:none!important;";
}

// =============================================================================
// StyleDecls
// =============================================================================

/// Ordered style declaration map keyed by case-folded property name.
#[derive(Debug, Clone, Default)]
pub struct StyleDecls {
    decls: Vec<(CompactString, String)>,
    index: FxHashMap<CompactString, usize>,
}

impl StyleDecls {
    /// Create an empty declaration set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single style fragment.
    pub fn parse(fragment: &str) -> Self {
        let mut decls = Self::new();
        decls.extend_from(fragment);
        decls
    }

    /// Merge every rule of `fragment` into this set, overriding existing
    /// properties. Rules without a property or a value are ignored.
    pub fn extend_from(&mut self, fragment: &str) {
        for (property, value) in rules(fragment) {
            if !value.is_empty() {
                self.insert(&property, value);
            }
        }
    }

    /// Insert or override a declaration. Overrides keep the original position.
    pub fn insert(&mut self, property: &str, value: &str) {
        let key = CompactString::from(property.trim().to_ascii_lowercase());
        let value = value.trim().to_string();
        if key.is_empty() {
            return;
        }
        match self.index.get(&key) {
            Some(&pos) => self.decls[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.decls.len());
                self.decls.push((key, value));
            }
        }
    }

    /// Get a declaration value by (case-insensitive) property.
    pub fn get(&self, property: &str) -> Option<&str> {
        let key = property.to_ascii_lowercase();
        self.index.get(key.as_str()).map(|&pos| self.decls[pos].1.as_str())
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Check if there are no declarations.
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Iterate over `(property, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.decls.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize as `prop:value;prop:value;`, or `""` when empty.
    pub fn to_style_string(&self) -> String {
        let mut out = String::new();
        for (property, value) in &self.decls {
            out.push_str(property);
            out.push(':');
            out.push_str(value);
            out.push(';');
        }
        out
    }
}

/// Split a style string into trimmed `(property, value)` rules on the first
/// `:` of each `;`-separated rule. Rules without a `:` or a property are skipped.
fn rules(style: &str) -> impl Iterator<Item = (String, &str)> {
    style
        .split(';')
        .map(str::trim)
        .filter(|rule| !rule.is_empty())
        .filter_map(|rule| {
            let (property, value) = rule.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            (!property.is_empty()).then(|| (property, value.trim()))
        })
}

// =============================================================================
// Merge / strip
// =============================================================================

/// Merge style fragments left to right; later fragments override earlier ones
/// per property.
pub fn merge(fragments: &[&str]) -> String {
    let mut decls = StyleDecls::new();
    for fragment in fragments {
        decls.extend_from(fragment);
    }
    decls.to_style_string()
}

/// Remove the named properties (case-insensitive), keeping every other rule
/// verbatim. The result has no trailing `;`.
pub fn strip(style: &str, properties: &[&str]) -> String {
    style
        .split(';')
        .map(str::trim)
        .filter(|rule| !rule.is_empty())
        .filter(|rule| {
            let property = rule.split(':').next().unwrap_or_default().trim();
            !property.is_empty()
                && !properties
                    .iter()
                    .any(|p| p.eq_ignore_ascii_case(property))
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Drop `margin` and `padding` so a stage can reassert canonical spacing.
/// Non-empty results always end with `;`.
pub fn sanitize_paragraph_style(style: Option<&str>) -> String {
    let Some(style) = style else {
        return String::new();
    };
    let mut cleaned = strip(style, &["margin", "padding"]);
    if !cleaned.is_empty() && !cleaned.ends_with(';') {
        cleaned.push(';');
    }
    cleaned
}

// =============================================================================
// Redundant style classification
// =============================================================================

/// Properties carrying no layout information on a highlight span.
fn is_low_information_property(property: &str) -> bool {
    matches!(
        property,
        "font-family"
            | "font-size"
            | "font-style"
            | "font-weight"
            | "font-variant"
            | "font-variant-ligatures"
            | "font-variant-caps"
            | "color"
            | "background-color"
            | "line-height"
            | "letter-spacing"
    )
}

fn is_redundant_value(value: &str) -> bool {
    matches!(
        value,
        "" | "inherit" | "initial" | "unset" | "transparent" | "black" | "#000" | "#000000"
    )
}

/// Whether an inline wrapper with these attributes must be preserved.
///
/// Identity attributes always preserve. Otherwise the wrapper is meaningful
/// when its style carries a property outside the low-information set, or a
/// low-information property with a non-redundant value.
pub fn is_meaningful_span(attrs: &Attrs) -> bool {
    if attrs.has_identity() {
        return true;
    }
    let Some(style) = attrs.get_attr("style") else {
        return false;
    };
    rules(style).any(|(property, value)| {
        !is_low_information_property(&property) || !is_redundant_value(&value.to_ascii_lowercase())
    })
}

// =============================================================================
// Tests
// =============================================================================

//! Attribute system for markup elements
//!
//! Attributes are kept as an ordered `Vec<(String, String)>`. Names are
//! case-folded by the tokenizer, values keep their raw source text.

/// Element attributes as simple key-value pairs, in source order
pub type Attrs = Vec<(String, String)>;

/// Extension trait for attribute operations on Attrs
pub trait AttrsExt {
    /// Get an attribute value by name
    fn get_attr(&self, name: &str) -> Option<&str>;

    /// Check if an attribute exists
    fn has_attr(&self, name: &str) -> bool;

    /// Set an attribute value (insert or update in place)
    fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>);

    /// Remove an attribute by name, returning the old value if present
    fn remove_attr(&mut self, name: &str) -> Option<String>;

    /// Whether any attribute marks the element as carrying identity
    /// (`class`, `id`, `data-*`, `aria-*`).
    fn has_identity(&self) -> bool;

    /// Clone the identity-carrying attributes, `class` then `id` then
    /// `data-*`/`aria-*` in source order.
    fn identity_attrs(&self) -> Attrs;
}

impl AttrsExt for Attrs {
    fn get_attr(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn has_attr(&self, name: &str) -> bool {
        self.iter().any(|(k, _)| k == name)
    }

    fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(attr) = self.iter_mut().find(|(k, _)| k == &name) {
            attr.1 = value;
        } else {
            self.push((name, value));
        }
    }

    fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.iter()
            .position(|(k, _)| k == name)
            .map(|pos| self.remove(pos).1)
    }

    fn has_identity(&self) -> bool {
        self.iter().any(|(k, _)| is_identity_attr(k))
    }

    fn identity_attrs(&self) -> Attrs {
        let mut out = Attrs::new();
        for name in ["class", "id"] {
            if let Some(value) = self.get_attr(name) {
                out.push((name.to_string(), value.to_string()));
            }
        }
        out.extend(
            self.iter()
                .filter(|(k, _)| k.starts_with("data-") || k.starts_with("aria-"))
                .cloned(),
        );
        out
    }
}

/// `class`, `id`, `data-*` and `aria-*` mark an element as referenced by
/// scripts, stylesheets or placeholder substitution.
pub fn is_identity_attr(name: &str) -> bool {
    name == "class" || name == "id" || name.starts_with("data-") || name.starts_with("aria-")
}

/// Whether a space-separated `class` attribute contains `class_name`.
pub fn has_class(attrs: &Attrs, class_name: &str) -> bool {
    attrs
        .get_attr("class")
        .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
}

/// Remove one class from a `class` attribute, dropping the attribute when it
/// ends up empty.
pub fn remove_class(attrs: &mut Attrs, class_name: &str) {
    let Some(classes) = attrs.get_attr("class") else {
        return;
    };
    let remaining: Vec<&str> = classes
        .split_ascii_whitespace()
        .filter(|c| *c != class_name)
        .collect();
    if remaining.is_empty() {
        attrs.remove_attr("class");
    } else {
        let joined = remaining.join(" ");
        attrs.set_attr("class", joined);
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Canonical typography for headings, lists and links.
//!
//! Each enhancer merges a canonical style under the element's existing style,
//! so declarations the author set explicitly win.

use crate::error::FormatResult;
use crate::node::Fragment;
use crate::style::{canonical, merge};

use super::core::Stage;

/// Merge `(tag, canonical style)` rules into every matching element.
fn apply_rules(mut fragment: Fragment, rules: &[(&str, &str)]) -> Fragment {
    fragment.for_each_element_mut(|elem| {
        let Some((_, base)) = rules.iter().find(|(tag, _)| elem.is(tag)) else {
            return;
        };
        let style = merge(&[*base, elem.style().unwrap_or_default()]);
        elem.set_style(&style);
    });
    fragment
}

/// `h1`–`h3` typography.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnhanceHeadings;

impl Stage for EnhanceHeadings {
    fn name(&self) -> &'static str {
        "enhance-headings"
    }

    fn apply(&self, fragment: Fragment) -> FormatResult<Fragment> {
        Ok(apply_rules(
            fragment,
            &[("h1", canonical::H1), ("h2", canonical::H2), ("h3", canonical::H3)],
        ))
    }
}

/// `ul`, `ol` and `li` spacing and markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnhanceLists;

impl Stage for EnhanceLists {
    fn name(&self) -> &'static str {
        "enhance-lists"
    }

    fn apply(&self, fragment: Fragment) -> FormatResult<Fragment> {
        Ok(apply_rules(
            fragment,
            &[
                ("ul", canonical::UNORDERED_LIST),
                ("ol", canonical::ORDERED_LIST),
                ("li", canonical::LIST_ITEM),
            ],
        ))
    }
}

/// Link color and underline.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnhanceLinks;

impl Stage for EnhanceLinks {
    fn name(&self) -> &'static str {
        "enhance-links"
    }

    fn apply(&self, fragment: Fragment) -> FormatResult<Fragment> {
        Ok(apply_rules(fragment, &[("a", canonical::LINK)]))
    }
}

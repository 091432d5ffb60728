//! Prelude module for common imports.
//!
//! ```ignore
//! use mailmark::prelude::*;
//! ```

// Node types
pub use crate::node::{Children, Element, Fragment, Node, Text, TextKind};

// Conversion
pub use crate::convert::{from_html, tokenize, Token};

// Transform
pub use crate::transform::{
    default_stages, ConvertParagraphs, EnhanceHeadings, EnhanceLinks, EnhanceLists, GuardNumbers,
    NormalizeStructure, ParagraphStyle, Pipeline, ReconcileLineBreaks, SplitDoubleBreaks, Stage,
    TidyParagraphs, TrimEdges, WrapContainer,
};

// Selection
pub use crate::legacy::LegacyFormatter;
pub use crate::select::{ActiveFormatter, Comparing, Comparison, Formatter, Selector, Status};

// Configuration
pub use crate::config::{FormatConfig, SharedConfig};

// Attributes and styles
pub use crate::attr::{Attrs, AttrsExt};
pub use crate::style::{canonical, StyleDecls};

// Render
pub use crate::render::render_fragment;

// Error
pub use crate::error::{FormatError, FormatResult};

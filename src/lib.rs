//! mailmark - Rich-text to email-safe HTML
//!
//! ## Core Concepts
//!
//! **Staged formatting**: editor markup is parsed into a tolerant
//! [`Fragment`] tree, rewritten by an ordered list of [`Stage`]s and rendered
//! back. Every stage is a pure tree-to-tree function, so the whole pipeline
//! is deterministic and idempotent on its own output.
//!
//! **Guarded rollout**: the [`Selector`] chooses between the enhanced
//! [`Pipeline`] and the [`LegacyFormatter`] from a runtime [`FormatConfig`],
//! falling back to legacy output when the pipeline fails.
//!
//! ## Modules
//! - `node`: Fragment/Element/Node/Text types
//! - `convert`: tolerant HTML tokenizer and tree builder
//! - `transform`: stages and the pipeline
//! - `render`: tree to markup
//! - `legacy`: the legacy formatter
//! - `select`: formatter selection, fallback and comparison
//! - `harness`: side-by-side comparison corpus and reports
//!
//! ## Usage
//!
//! ```ignore
//! use mailmark::{FormatConfig, LegacyFormatter, Selector};
//!
//! let selector = Selector::new(FormatConfig::from_env());
//! let html = selector.select("Hi Luke,\n\nCost: £1,500 + VAT", &LegacyFormatter::new())?;
//! ```

// =============================================================================
// Core modules
// =============================================================================

/// Markup tree types: Fragment, Element, Node, Text
pub mod node;

/// Source converters: HTML tokenizer and tree builder
pub mod convert;

/// Stages and the enhanced pipeline
pub mod transform;

/// Attribute helpers
pub mod attr;

/// Inline style declarations and canonical email styles
pub mod style;

/// Markup rendering
pub mod render;

/// Error types
pub mod error;

/// Runtime configuration
pub mod config;

/// Output fingerprints
pub mod hash;

/// The legacy formatter
pub mod legacy;

/// Formatter selection and comparison
pub mod select;

/// Comparison harness
pub mod harness;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Node types
pub use node::{Children, Element, Fragment, Node, Text, TextKind};

// Conversion and rendering
pub use convert::from_html;
pub use render::render_fragment;

// Transform
pub use transform::{default_stages, Pipeline, Stage};

// Selection
pub use legacy::LegacyFormatter;
pub use select::{ActiveFormatter, Comparing, Comparison, Formatter, Selector, Status};

// Configuration
pub use config::{FormatConfig, SharedConfig};

// Attribute types
pub use attr::{Attrs, AttrsExt};

// Error types
pub use error::{FormatError, FormatResult};

/// Format `markup` with the default enhanced pipeline, returning the input
/// unchanged if a stage fails.
pub fn format(markup: &str) -> FormatResult<String> {
    Pipeline::default().process(markup)
}

// =============================================================================
// Tests
// =============================================================================

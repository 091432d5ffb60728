//! Formatting stages and the enhanced pipeline.
//!
//! # Module Structure
//!
//! - `Stage` - Core trait for whole-fragment rewrites
//! - `NormalizeStructure` - Empty wrapper cleanup
//! - `ConvertParagraphs` / `ParagraphStyle` / `SplitDoubleBreaks` - Paragraph structure
//! - `ReconcileLineBreaks` - Raw newlines and `<br>` runs
//! - `GuardNumbers` - Money, percentages and large numbers
//! - `TidyParagraphs` / `TrimEdges` - Paragraph cleanup and edge spacing
//! - `EnhanceHeadings` / `EnhanceLists` / `EnhanceLinks` - Canonical typography
//! - `Pipeline` - Fixed-order orchestrator with the failure boundary
//!
//! # Example
//!
//! ```ignore
//! use mailmark::transform::{Pipeline, NormalizeStructure, TidyParagraphs};
//! use mailmark::FormatConfig;
//!
//! // Full enhanced formatter
//! let html = Pipeline::new(FormatConfig::enhanced()).run("Hi,\n\nThanks")?;
//!
//! // Custom stage list
//! let cleanup = Pipeline::with_stages(
//!     FormatConfig::enhanced(),
//!     vec![Box::new(NormalizeStructure), Box::new(TidyParagraphs)],
//! );
//! ```

mod core;
mod enhance;
mod guard;
mod line_break;
mod normalize;
mod paragraph;
mod pipeline;
mod tidy;

pub use self::core::{Stage, WrapContainer};
pub(crate) use self::core::{rewrite_elements, Rewrite};
pub use enhance::{EnhanceHeadings, EnhanceLinks, EnhanceLists};
pub use guard::{GuardNumbers, BARE_NUMBER_THRESHOLD};
pub use line_break::ReconcileLineBreaks;
pub use normalize::NormalizeStructure;
pub use paragraph::{ConvertParagraphs, ParagraphStyle, SplitDoubleBreaks};
pub use pipeline::{default_stages, Pipeline};
pub use tidy::{TidyParagraphs, TrimEdges};

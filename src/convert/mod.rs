//! Source format converters to [`Fragment`](crate::node::Fragment)
//!
//! | Format | Module | Function |
//! |--------|--------|----------|
//! | HTML fragment | [`html`] | [`from_html()`] |
//!
//! The converter only needs to produce a balanced `Fragment`. The pipeline
//! (stages → renderer) handles the rest.

pub mod html;

pub use self::html::{from_html, from_tokens, tokenize, Token, MAX_DEPTH};

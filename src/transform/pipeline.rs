//! The enhanced formatting pipeline.
//!
//! `Pipeline` parses markup once, threads the fragment through an ordered
//! list of [`Stage`]s and renders the result. It is the single place where
//! stage failures are handled: stages themselves never catch.

use crate::config::{FormatConfig, SharedConfig};
use crate::convert::from_html;
use crate::error::FormatResult;
use crate::render::render_fragment;

use super::{
    ConvertParagraphs, EnhanceHeadings, EnhanceLinks, EnhanceLists, GuardNumbers, NormalizeStructure,
    ParagraphStyle, ReconcileLineBreaks, SplitDoubleBreaks, Stage, TidyParagraphs, TrimEdges, WrapContainer,
};

/// The fixed stage order of the enhanced formatter.
pub fn default_stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(NormalizeStructure),
        Box::new(ConvertParagraphs),
        Box::new(ReconcileLineBreaks),
        Box::new(GuardNumbers::default()),
        Box::new(ParagraphStyle),
        Box::new(SplitDoubleBreaks),
        Box::new(TidyParagraphs),
        Box::new(TrimEdges),
        Box::new(EnhanceHeadings),
        Box::new(EnhanceLists),
        Box::new(EnhanceLinks),
        Box::new(WrapContainer),
    ]
}

// =============================================================================
// Pipeline
// =============================================================================

/// Enhanced markup formatter.
///
/// # Example
///
/// ```ignore
/// use mailmark::{FormatConfig, Pipeline};
///
/// let pipeline = Pipeline::new(FormatConfig::enhanced());
/// let html = pipeline.process("Hi Luke,\n\nThanks!")?;
/// assert_eq!(html.matches("<p").count(), 2);
/// ```
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    config: SharedConfig,
}

impl Pipeline {
    /// Pipeline with the default stage order.
    pub fn new(config: impl Into<SharedConfig>) -> Self {
        Self::with_stages(config, default_stages())
    }

    /// Pipeline with a caller-supplied stage list.
    pub fn with_stages(config: impl Into<SharedConfig>, stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages,
            config: config.into(),
        }
    }

    /// Append a stage.
    pub fn pipe(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Configured stage names, in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Shared configuration handle.
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Format `markup`, propagating any stage failure. Nothing partial is
    /// ever returned.
    pub fn run(&self, markup: &str) -> FormatResult<String> {
        self.run_with(markup, &self.config.snapshot())
    }

    /// Format `markup` at the orchestrator boundary.
    ///
    /// On failure with `fallback_to_legacy` set, the original input is
    /// returned unchanged and the failure is logged; otherwise the error is
    /// returned.
    pub fn process(&self, markup: &str) -> FormatResult<String> {
        let config = self.config.snapshot();
        match self.run_with(markup, &config) {
            Ok(output) => Ok(output),
            Err(err) if config.fallback_to_legacy => {
                log::error!("enhanced formatting failed, returning input unchanged: {err}");
                Ok(markup.to_string())
            }
            Err(err) => Err(err),
        }
    }

    fn run_with(&self, markup: &str, config: &FormatConfig) -> FormatResult<String> {
        if markup.is_empty() {
            return Ok(String::new());
        }
        let mut fragment = from_html(markup)?;
        for stage in &self.stages {
            fragment = stage.apply(fragment)?;
            if config.log_operations {
                log::debug!(
                    "stage {} complete ({} top-level nodes)",
                    stage.name(),
                    fragment.children.len()
                );
            }
        }
        let output = render_fragment(&fragment);
        if config.log_operations {
            log::debug!("formatted {} bytes into {} bytes", markup.len(), output.len());
        }
        Ok(output)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(FormatConfig::enhanced())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("config", &self.config.snapshot())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::node::Fragment;
    use crate::style::canonical;

    struct Failing;

    impl Stage for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn apply(&self, _fragment: Fragment) -> FormatResult<Fragment> {
            Err(FormatError::stage("failing", "boom"))
        }
    }

    fn format(input: &str) -> String {
        Pipeline::default().run(input).unwrap()
    }

    fn visible_chars(markup: &str) -> String {
        from_html(markup)
            .unwrap()
            .text_content()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    const SAMPLES: &[&str] = &[
        "Hi Luke,\n\nThank you for your enquiry.\n\nBest regards",
        "<p>Cost: £1,500 + VAT, see also 50 items</p>",
        "<div>First</div><div>Second<br><br>Third</div><div> </div>",
        "<h3>Quote Summary</h3>\n<p>Dear Customer,</p>\n<ul>\n<li>Item one - £250</li>\n<li>Item two</li>\n</ul>\n<p>Kind regards,<br>The Team</p>",
        "<p><span style=\"color:#000000\">Plain</span> and <strong>bold</strong> with a <a href=\"https://example.com\">link</a>, 15% off.</p>",
        "Line one\nLine two\n\n\n<blockquote>quote\n\nmore</blockquote>Tail 2024",
    ];

    #[test]
    fn test_stage_order() {
        assert_eq!(
            Pipeline::default().stage_names(),
            [
                "normalize-structure",
                "convert-paragraphs",
                "reconcile-line-breaks",
                "guard-numbers",
                "paragraph-style",
                "split-double-breaks",
                "tidy-paragraphs",
                "trim-edges",
                "enhance-headings",
                "enhance-lists",
                "enhance-links",
                "wrap-container",
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format(""), "");
        assert_eq!(format(" \n\n "), "");
    }

    #[test]
    fn test_idempotent() {
        for sample in SAMPLES {
            let once = format(sample);
            assert_eq!(format(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_text_is_never_lost() {
        for sample in SAMPLES {
            assert_eq!(visible_chars(&format(sample)), visible_chars(sample), "text lost for {sample:?}");
        }
    }

    #[test]
    fn test_currency_protection() {
        let out = format("<p>Cost: £1,500 + VAT, see also 50 items</p>");
        let guarded = format!(r#"<span style="{}">£1,500 + VAT</span>"#, canonical::NUMERIC_GUARD);
        assert!(out.contains(&guarded));
        assert!(out.contains(", see also 50 items"));
    }

    #[test]
    fn test_small_number_exclusion() {
        let out = format("Billed in 6 minute units");
        assert!(out.contains("Billed in 6 minute units"));
        assert!(!out.contains("<span"));
    }

    #[test]
    fn test_blank_divs_yield_empty_output() {
        assert_eq!(format("<div></div><div> </div><div>\n</div>"), "");
        assert_eq!(format("<div><br></div>"), "");
    }

    #[test]
    fn test_last_paragraph_is_flush() {
        let out = format("One\n\nTwo\n\nThree");
        let frag = from_html(&out).unwrap();
        let paragraphs = frag.find_all(|e| e.is("p"));
        assert_eq!(paragraphs.len(), 3);
        assert!(paragraphs[2].style().unwrap().starts_with("margin:0 0 0 0;"));
        assert_eq!(paragraphs[0].style(), Some(canonical::PARAGRAPH));
        assert_eq!(paragraphs[1].style(), Some(canonical::PARAGRAPH));
    }

    #[test]
    fn test_blank_lines_become_paragraphs() {
        let out = format("Hi Luke,\n\nThank you for your enquiry.\n\nBest regards");
        assert_eq!(out.matches("<p ").count(), 3);
        assert!(!out.contains("\n\n"));
        let frag = from_html(&out).unwrap();
        let texts: Vec<_> = frag.find_all(|e| e.is("p")).iter().map(|p| p.text_content()).collect();
        assert_eq!(texts, ["Hi Luke,", "Thank you for your enquiry.", "Best regards"]);
    }

    #[test]
    fn test_mixed_content_is_styled() {
        let out = format(SAMPLES[3]);
        assert!(out.starts_with(&format!(r#"<h3 style="{}">Quote Summary</h3>"#, canonical::H3)));
        assert!(out.contains(&format!(r#"<ul style="{}">"#, canonical::UNORDERED_LIST)));
        assert!(out.contains(&format!(
            r#"<li style="{}">Item one - <span style="{}">£250</span></li>"#,
            canonical::LIST_ITEM,
            canonical::NUMERIC_GUARD
        )));
        assert!(out.contains("Kind regards,<br />The Team</p>"));
    }

    #[test]
    fn test_failure_is_atomic() {
        let pipeline = Pipeline::new(FormatConfig::enhanced().with_fallback(false)).pipe(Failing);
        let err = pipeline.run("Hello").unwrap_err();
        assert_eq!(err.stage_name(), Some("failing"));
        assert!(pipeline.process("Hello").is_err());
    }

    #[test]
    fn test_process_falls_back_to_input() {
        let pipeline = Pipeline::with_stages(FormatConfig::enhanced(), vec![Box::new(Failing)]);
        assert!(pipeline.run("<div>x</div>").is_err());
        assert_eq!(pipeline.process("<div>x</div>").unwrap(), "<div>x</div>");
    }

    #[test]
    fn test_nesting_limit_is_reported() {
        let input = "<span>".repeat(crate::convert::MAX_DEPTH + 1);
        let pipeline = Pipeline::new(FormatConfig::enhanced().with_fallback(false));
        assert!(matches!(pipeline.run(&input), Err(FormatError::NestingTooDeep { .. })));
        let pipeline = Pipeline::default();
        assert_eq!(pipeline.process(&input).unwrap(), input);
    }

    #[test]
    fn test_deepest_accepted_nesting_fits_default_stack() {
        let depth = crate::convert::MAX_DEPTH - 1;
        // spawned threads get the default stack size
        let worker = std::thread::spawn(move || {
            let pipeline = Pipeline::new(FormatConfig::enhanced().with_fallback(false));
            for tag in ["p", "div", "span", "blockquote"] {
                let input = format!("{}x{}", format!("<{tag}>").repeat(depth), format!("</{tag}>").repeat(depth));
                let out = pipeline.run(&input).unwrap();
                assert_eq!(visible_chars(&out), "x", "nested {tag}");
            }
        });
        worker.join().unwrap();
    }

    #[test]
    fn test_logging_does_not_change_output() {
        let quiet = Pipeline::default();
        let traced = Pipeline::new(FormatConfig::enhanced().with_logging(true));
        for sample in SAMPLES {
            assert_eq!(quiet.run(sample).unwrap(), traced.run(sample).unwrap());
        }
    }

    #[test]
    fn test_pipeline_is_send_sync() {
        static_assertions::assert_impl_all!(Pipeline: Send, Sync);
    }
}

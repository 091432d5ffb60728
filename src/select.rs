//! Formatter selection and legacy fallback.
//!
//! [`Selector`] decides per call which formatter produces the output, based
//! on a snapshot of the shared flags:
//!
//! | `enabled` | `test_mode` | Output |
//! |-----------|-------------|--------|
//! | false | - | legacy |
//! | true | true | legacy, with the enhanced result logged alongside; enhanced failures follow `fallback_to_legacy` |
//! | true | false | enhanced, or legacy on failure when `fallback_to_legacy` |

use std::fmt;

use crate::config::{FormatConfig, SharedConfig};
use crate::convert::{tokenize, Token};
use crate::error::FormatResult;
use crate::hash::fingerprint;
use crate::transform::Pipeline;

// =============================================================================
// Formatter
// =============================================================================

/// Anything that turns markup into formatted markup.
pub trait Formatter {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Format `markup`.
    fn format(&self, markup: &str) -> FormatResult<String>;
}

/// Infallible closures act as caller-supplied legacy transforms.
impl<F> Formatter for F
where
    F: Fn(&str) -> String,
{
    fn name(&self) -> &str {
        "custom"
    }

    fn format(&self, markup: &str) -> FormatResult<String> {
        Ok(self(markup))
    }
}

impl Formatter for Pipeline {
    fn name(&self) -> &str {
        "enhanced"
    }

    fn format(&self, markup: &str) -> FormatResult<String> {
        self.process(markup)
    }
}

// =============================================================================
// Comparing
// =============================================================================

/// Runs two formatters and returns the authoritative result.
///
/// The shadow output is only logged: its failures never change what the
/// caller gets back.
#[derive(Debug, Clone, Copy)]
pub struct Comparing<A, S> {
    pub authoritative: A,
    pub shadow: S,
}

impl<A, S> Comparing<A, S> {
    pub fn new(authoritative: A, shadow: S) -> Self {
        Self { authoritative, shadow }
    }
}

impl<A: Formatter, S: Formatter> Formatter for Comparing<A, S> {
    fn name(&self) -> &str {
        "comparing"
    }

    fn format(&self, markup: &str) -> FormatResult<String> {
        let output = self.authoritative.format(markup)?;
        match self.shadow.format(markup) {
            Ok(shadow) => {
                log_comparison(
                    self.authoritative.name(),
                    self.shadow.name(),
                    &Comparison::new(output.clone(), shadow),
                );
            }
            Err(err) => {
                log::warn!("shadow formatter {} failed: {err}", self.shadow.name());
            }
        }
        Ok(output)
    }
}

fn log_comparison(first: &str, second: &str, comparison: &Comparison) {
    log::info!(
        "{first} vs {second}: {} ({:+} bytes)",
        comparison.verdict(),
        comparison.length_delta()
    );
}

// =============================================================================
// Comparison
// =============================================================================

/// Side-by-side legacy and enhanced outputs for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub legacy: String,
    pub enhanced: String,
    /// Human-readable differences, empty when the outputs are identical.
    pub differences: Vec<String>,
}

impl Comparison {
    pub fn new(legacy: String, enhanced: String) -> Self {
        let differences = differences(&legacy, &enhanced);
        Self {
            legacy,
            enhanced,
            differences,
        }
    }

    pub fn is_identical(&self) -> bool {
        self.differences.is_empty()
    }

    /// Enhanced length minus legacy length, in bytes.
    pub fn length_delta(&self) -> i64 {
        self.enhanced.len() as i64 - self.legacy.len() as i64
    }

    /// One-line summary.
    pub fn verdict(&self) -> &'static str {
        match self.differences.len() {
            0 => "identical output",
            1 | 2 => "minor differences",
            _ => "significant differences",
        }
    }
}

/// Length, fingerprint and paragraph-count differences between two outputs.
pub fn differences(legacy: &str, enhanced: &str) -> Vec<String> {
    let mut out = Vec::new();
    if legacy.len() != enhanced.len() {
        out.push(format!("length: {} -> {}", legacy.len(), enhanced.len()));
    }
    if fingerprint(legacy) != fingerprint(enhanced) {
        out.push("content differs".to_string());
    }
    let (before, after) = (count_paragraphs(legacy), count_paragraphs(enhanced));
    if before != after {
        out.push(format!("paragraphs: {before} -> {after}"));
    }
    out
}

/// Number of `<p>` open tags in `markup`.
pub fn count_paragraphs(markup: &str) -> usize {
    tokenize(markup)
        .iter()
        .filter(|token| matches!(token, Token::Open { tag, .. } if tag.as_str() == "p"))
        .count()
}

// =============================================================================
// Status
// =============================================================================

/// Which formatter currently produces output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFormatter {
    Legacy,
    Enhanced,
    /// Legacy output, enhanced run in the shadow.
    Comparing,
}

impl ActiveFormatter {
    pub fn from_config(config: &FormatConfig) -> Self {
        match (config.enabled, config.test_mode) {
            (false, _) => Self::Legacy,
            (true, true) => Self::Comparing,
            (true, false) => Self::Enhanced,
        }
    }
}

impl fmt::Display for ActiveFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Legacy => "legacy",
            Self::Enhanced => "enhanced",
            Self::Comparing => "legacy (enhanced in comparison)",
        })
    }
}

/// Operator-facing snapshot of the selector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub active: ActiveFormatter,
    pub config: FormatConfig,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "active formatter: {}", self.active)?;
        writeln!(f, "  enabled:   {}", self.config.enabled)?;
        writeln!(f, "  fallback:  {}", self.config.fallback_to_legacy)?;
        writeln!(f, "  logging:   {}", self.config.log_operations)?;
        write!(f, "  test mode: {}", self.config.test_mode)
    }
}

// =============================================================================
// Selector
// =============================================================================

/// Chooses between the enhanced pipeline and a legacy formatter per call.
#[derive(Debug)]
pub struct Selector {
    config: SharedConfig,
    pipeline: Pipeline,
}

impl Selector {
    /// Selector over the default enhanced pipeline.
    pub fn new(config: impl Into<SharedConfig>) -> Self {
        let config = config.into();
        Self {
            pipeline: Pipeline::new(config.clone()),
            config,
        }
    }

    /// Selector over a custom pipeline, sharing its configuration.
    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self {
            config: pipeline.config().clone(),
            pipeline,
        }
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Format `markup` with whichever formatter the current flags select.
    pub fn select<L>(&self, markup: &str, legacy: &L) -> FormatResult<String>
    where
        L: Formatter + ?Sized,
    {
        let config = self.config.snapshot();
        match ActiveFormatter::from_config(&config) {
            ActiveFormatter::Legacy => legacy.format(markup),
            ActiveFormatter::Comparing => self.legacy_with_comparison(markup, legacy, config.fallback_to_legacy),
            ActiveFormatter::Enhanced => self.enhanced_or_fallback(markup, legacy, config.fallback_to_legacy),
        }
    }

    /// Test mode: the enhanced pipeline runs first and its failures follow
    /// the fallback flag; on success the legacy output is returned and the
    /// two are compared in the log.
    fn legacy_with_comparison<L>(&self, markup: &str, legacy: &L, fallback: bool) -> FormatResult<String>
    where
        L: Formatter + ?Sized,
    {
        let enhanced = match self.pipeline.run(markup) {
            Ok(output) => Some(output),
            Err(err) if fallback => {
                log::error!("enhanced formatting failed in test mode, using {}: {err}", legacy.name());
                None
            }
            Err(err) => return Err(err),
        };
        let output = legacy.format(markup)?;
        if let Some(enhanced) = enhanced {
            log_comparison(legacy.name(), "enhanced", &Comparison::new(output.clone(), enhanced));
        }
        Ok(output)
    }

    /// Run the enhanced pipeline regardless of `enabled`, falling back to
    /// legacy on failure. For development testing.
    pub fn select_forced<L>(&self, markup: &str, legacy: &L) -> FormatResult<String>
    where
        L: Formatter + ?Sized,
    {
        self.enhanced_or_fallback(markup, legacy, true)
    }

    fn enhanced_or_fallback<L>(&self, markup: &str, legacy: &L, fallback: bool) -> FormatResult<String>
    where
        L: Formatter + ?Sized,
    {
        match self.pipeline.run(markup) {
            Ok(output) => Ok(output),
            Err(err) if fallback => {
                log::error!("enhanced formatting failed, using {}: {err}", legacy.name());
                legacy.format(markup)
            }
            Err(err) => Err(err),
        }
    }

    /// Emergency kill switch: legacy output for every subsequent call.
    pub fn force_legacy_mode(&self) {
        self.config.force_legacy_mode();
    }

    pub fn status(&self) -> Status {
        let config = self.config.snapshot();
        Status {
            active: ActiveFormatter::from_config(&config),
            config,
        }
    }

    /// Format `markup` with both formatters and describe the differences.
    pub fn compare<L>(&self, markup: &str, legacy: &L) -> FormatResult<Comparison>
    where
        L: Formatter + ?Sized,
    {
        let legacy_output = legacy.format(markup)?;
        let enhanced_output = self.pipeline.process(markup)?;
        Ok(Comparison::new(legacy_output, enhanced_output))
    }

    /// Format many documents concurrently; results keep input order.
    #[cfg(feature = "parallel")]
    pub fn select_batch<L>(&self, documents: &[&str], legacy: &L) -> Vec<FormatResult<String>>
    where
        L: Formatter + Sync + ?Sized,
    {
        use rayon::prelude::*;

        documents
            .par_iter()
            .map(|markup| self.select(markup, legacy))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::FormatError;
    use crate::legacy::LegacyFormatter;
    use crate::node::Fragment;
    use crate::transform::{default_stages, Stage};

    struct Failing;

    impl Stage for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn apply(&self, _fragment: Fragment) -> FormatResult<Fragment> {
            Err(FormatError::stage("failing", "boom"))
        }
    }

    fn failing_selector(config: FormatConfig) -> Selector {
        let mut stages = default_stages();
        stages.insert(3, Box::new(Failing));
        Selector::with_pipeline(Pipeline::with_stages(config, stages))
    }

    fn upper(markup: &str) -> String {
        markup.to_uppercase()
    }

    #[test]
    fn test_disabled_uses_legacy() {
        let selector = Selector::new(FormatConfig::default());
        assert_eq!(selector.select("Hello", &upper).unwrap(), "HELLO");
    }

    #[test]
    fn test_enabled_uses_enhanced() {
        let selector = Selector::new(FormatConfig::enhanced());
        let out = selector.select("Hello", &upper).unwrap();
        assert!(out.starts_with("<p style="));
        assert!(out.contains(">Hello</p>"));
    }

    #[test]
    fn test_fallback_receives_untouched_input() {
        let seen = RefCell::new(Vec::new());
        let legacy = |markup: &str| {
            seen.borrow_mut().push(markup.to_string());
            format!("legacy:{markup}")
        };
        let input = "<div><span>£1,500</span>\n\nrest</div>";

        let selector = failing_selector(FormatConfig::enhanced());
        let out = selector.select(input, &legacy).unwrap();

        assert_eq!(out, format!("legacy:{input}"));
        assert_eq!(*seen.borrow(), [input]);
    }

    #[test]
    fn test_no_fallback_propagates() {
        let selector = failing_selector(FormatConfig::enhanced().with_fallback(false));
        let err = selector.select("x", &upper).unwrap_err();
        assert_eq!(err.stage_name(), Some("failing"));
    }

    #[test]
    fn test_select_forced_ignores_enabled_and_falls_back() {
        let selector = Selector::new(FormatConfig::default());
        assert!(selector.select_forced("Hello", &upper).unwrap().contains("<p"));

        let selector = failing_selector(FormatConfig::default().with_fallback(false));
        assert_eq!(selector.select_forced("Hello", &upper).unwrap(), "HELLO");
    }

    #[test]
    fn test_test_mode_returns_legacy() {
        let config = FormatConfig::enhanced().with_test_mode(true);
        assert_eq!(Selector::new(config).select("Hello", &upper).unwrap(), "HELLO");
        // enhanced failure with fallback: legacy output
        assert_eq!(failing_selector(config).select("Hello", &upper).unwrap(), "HELLO");
    }

    #[test]
    fn test_test_mode_propagates_enhanced_failure_without_fallback() {
        let calls = RefCell::new(0);
        let legacy = |markup: &str| {
            *calls.borrow_mut() += 1;
            markup.to_uppercase()
        };
        let config = FormatConfig::enhanced().with_test_mode(true).with_fallback(false);

        let err = failing_selector(config).select("Hello", &legacy).unwrap_err();
        assert_eq!(err.stage_name(), Some("failing"));
        assert_eq!(*calls.borrow(), 0);

        assert_eq!(Selector::new(config).select("Hello", &legacy).unwrap(), "HELLO");
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_force_legacy_mode_affects_later_calls() {
        let selector = Selector::new(FormatConfig::enhanced().with_fallback(false));
        assert_eq!(selector.status().active, ActiveFormatter::Enhanced);

        selector.force_legacy_mode();

        let status = selector.status();
        assert_eq!(status.active, ActiveFormatter::Legacy);
        assert!(status.config.fallback_to_legacy);
        assert_eq!(selector.select("Hello", &upper).unwrap(), "HELLO");
        assert!(status.to_string().starts_with("active formatter: legacy"));
    }

    #[test]
    fn test_compare() {
        let selector = Selector::new(FormatConfig::enhanced());
        let comparison = selector
            .compare("Hello world\n\nThis is a test.", &LegacyFormatter::new())
            .unwrap();
        assert_eq!(comparison.legacy, "<p>Hello world</p><p>This is a test.</p>");
        assert_eq!(count_paragraphs(&comparison.enhanced), 2);
        assert!(!comparison.is_identical());
        assert!(comparison.length_delta() > 0);

        let same = Comparison::new("<p>a</p>".into(), "<p>a</p>".into());
        assert!(same.is_identical());
        assert_eq!(same.verdict(), "identical output");
    }

    #[test]
    fn test_comparing_ignores_shadow_failure() {
        let failing = Pipeline::with_stages(FormatConfig::enhanced().with_fallback(false), vec![Box::new(Failing)]);
        let comparing = Comparing::new(upper, failing);
        assert_eq!(comparing.format("abc").unwrap(), "ABC");
        assert_eq!(comparing.name(), "comparing");
    }

    #[test]
    fn test_count_paragraphs() {
        assert_eq!(count_paragraphs("<p>a</p><P class=x>b</P><pre>c</pre>"), 2);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_select_batch_keeps_order() {
        let selector = Selector::new(FormatConfig::default());
        let docs = ["a", "b", "c"];
        let out: Vec<_> = selector
            .select_batch(&docs, &upper)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(out, ["A", "B", "C"]);
    }
}

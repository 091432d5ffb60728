//! Side-by-side comparison harness for the legacy and enhanced formatters.
//!
//! The harness runs a curated [`corpus`] through both formatters, flags
//! suspicious output with simple heuristics and summarizes whether the
//! enhanced formatter looks safe to ship.
//!
//! # Example
//!
//! ```ignore
//! use mailmark::harness::{report, Harness};
//! use mailmark::FormatConfig;
//!
//! let harness = Harness::standard(FormatConfig::enhanced());
//! let suite = harness.run_all_tests();
//! println!("{}", report::render_text(&suite));
//! ```

pub mod corpus;
pub mod report;

use std::fmt;

use crate::config::SharedConfig;
use crate::legacy::LegacyFormatter;
use crate::select::{differences, Formatter};
use crate::style::canonical;
use crate::transform::Pipeline;

use self::corpus::TestCase;

/// Name of the suite produced by [`Harness::run_all_tests`].
pub const SUITE_NAME: &str = "Enhanced vs legacy comparison";

/// Inputs longer than this (in characters) are expected to get width constraints.
const LONG_CONTENT_CHARS: usize = 200;

/// Output size change, relative to legacy, that raises a warning.
const SIZE_CHANGE_PERCENT: f64 = 50.0;

// =============================================================================
// Issues
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A heuristic finding about one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
}

impl Issue {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Heuristic checks on one input and its two outputs.
pub fn detect_issues(input: &str, legacy: &str, enhanced: &str) -> Vec<Issue> {
    let mut issues = Vec::new();

    if input.replace("\r\n", "\n").contains("\n\n") && !enhanced.contains("</p><p") {
        issues.push(Issue::new(Severity::Warning, "line breaks may not be properly preserved"));
    }
    if input.contains(['£', '$', '€']) && !enhanced.contains(canonical::NUMERIC_GUARD) {
        issues.push(Issue::new(
            Severity::Warning,
            "currency amounts may not be protected from client autoformatting",
        ));
    }
    if input.chars().count() > LONG_CONTENT_CHARS && !enhanced.contains("max-width") {
        issues.push(Issue::new(Severity::Warning, "no width constraints applied for long content"));
    }
    if !enhanced.contains("overflow-wrap:break-word") {
        issues.push(Issue::new(Severity::Info, "mobile wrapping could be improved"));
    }

    if legacy.is_empty() {
        if !enhanced.is_empty() {
            issues.push(Issue::new(Severity::Warning, "significant size difference (legacy output empty)"));
        }
    } else {
        let percent = legacy.len().abs_diff(enhanced.len()) as f64 / legacy.len() as f64 * 100.0;
        if percent > SIZE_CHANGE_PERCENT {
            issues.push(Issue::new(
                Severity::Warning,
                format!("significant size difference ({percent:.1}%)"),
            ));
        }
    }

    if enhanced.contains("undefined") || enhanced.contains("null") {
        issues.push(Issue::new(Severity::Critical, "enhanced output contains undefined/null values"));
    }
    issues
}

/// Fixed-threshold advice for one case.
pub fn recommendations(issues: &[Issue], differences: &[String]) -> Vec<String> {
    let critical = issues.iter().filter(|i| i.is_critical()).count();
    let warnings = issues.iter().filter(|i| i.severity == Severity::Warning).count();

    let safety = if critical > 0 {
        "Do not use the enhanced formatter in production - fix critical issues first"
    } else if warnings > 2 {
        "Use the enhanced formatter with caution - monitor closely in testing"
    } else if warnings > 0 {
        "Enhanced formatter appears safe but monitor the noted warnings"
    } else {
        "Enhanced formatter looks good for production use"
    };
    let migration = match differences.len() {
        0 => "Identical output - safe for migration",
        1 | 2 => "Minor differences - review before migration",
        _ => "Significant differences - detailed review required",
    };
    vec![safety.to_string(), migration.to_string()]
}

// =============================================================================
// Results
// =============================================================================

/// Outcome of one case.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub name: String,
    pub input: String,
    pub legacy_output: String,
    pub enhanced_output: String,
    pub differences: Vec<String>,
    /// No critical issue was found.
    pub passed: bool,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<String>,
    /// Improvements the corpus case expects; empty for ad-hoc inputs.
    pub expected_improvements: Vec<String>,
}

impl TestResult {
    /// A case where one of the formatters returned an error.
    fn failed(name: &str, input: &str, error: impl fmt::Display) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            legacy_output: "ERROR".to_string(),
            enhanced_output: "ERROR".to_string(),
            differences: vec![format!("ERROR: {error}")],
            passed: false,
            issues: vec![Issue::new(Severity::Critical, format!("test execution failed - {error}"))],
            recommendations: vec!["Fix enhanced formatter errors before proceeding".to_string()],
            expected_improvements: Vec::new(),
        }
    }
}

/// Aggregate over a suite.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub issues: Vec<Issue>,
    pub overall_recommendation: String,
}

impl Summary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = total - passed;
        let issues: Vec<Issue> = results.iter().flat_map(|r| r.issues.iter().cloned()).collect();

        let overall = if issues.iter().any(Issue::is_critical) {
            "Enhanced formatter has critical issues - not ready for production"
        } else if failed * 10 > total * 3 {
            "Multiple test failures - extensive review needed"
        } else if failed > 0 {
            "Some tests failed - review and fix before production"
        } else {
            "All tests passed - enhanced formatter appears ready for careful production testing"
        };

        Self {
            total,
            passed,
            failed,
            issues,
            overall_recommendation: overall.to_string(),
        }
    }
}

/// Results of a full run.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSuite {
    pub name: String,
    pub results: Vec<TestResult>,
    pub summary: Summary,
}

impl TestSuite {
    pub fn new(name: impl Into<String>, results: Vec<TestResult>) -> Self {
        let summary = Summary::from_results(&results);
        Self {
            name: name.into(),
            results,
            summary,
        }
    }
}

impl fmt::Display for TestSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&report::TextReport(self), f)
    }
}

/// Result of [`Harness::quick_safety_check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyCheck {
    pub safe: bool,
    /// `"<case>: <issues>"` for every failing case.
    pub issues: Vec<String>,
}

// =============================================================================
// Harness
// =============================================================================

/// Runs inputs through an enhanced and a legacy formatter.
#[derive(Debug, Clone)]
pub struct Harness<E, L> {
    enhanced: E,
    legacy: L,
}

impl Harness<Pipeline, LegacyFormatter> {
    /// The default pipeline against the built-in legacy formatter.
    pub fn standard(config: impl Into<SharedConfig>) -> Self {
        Self::new(Pipeline::new(config), LegacyFormatter::new())
    }
}

impl<E: Formatter, L: Formatter> Harness<E, L> {
    pub fn new(enhanced: E, legacy: L) -> Self {
        Self { enhanced, legacy }
    }

    /// Compare both formatters on one input.
    pub fn run_case(&self, name: &str, input: &str) -> TestResult {
        log::debug!("running comparison case {name}");
        let legacy_output = match self.legacy.format(input) {
            Ok(output) => output,
            Err(err) => {
                log::error!("case {name}: {} formatter failed: {err}", self.legacy.name());
                return TestResult::failed(name, input, err);
            }
        };
        let enhanced_output = match self.enhanced.format(input) {
            Ok(output) => output,
            Err(err) => {
                log::error!("case {name}: {} formatter failed: {err}", self.enhanced.name());
                return TestResult::failed(name, input, err);
            }
        };

        let issues = detect_issues(input, &legacy_output, &enhanced_output);
        let differences = differences(&legacy_output, &enhanced_output);
        let recommendations = recommendations(&issues, &differences);
        let passed = !issues.iter().any(Issue::is_critical);

        TestResult {
            name: name.to_string(),
            input: input.to_string(),
            legacy_output,
            enhanced_output,
            differences,
            passed,
            issues,
            recommendations,
            expected_improvements: Vec::new(),
        }
    }

    /// [`run_case`](Self::run_case) on a corpus case, carrying its expected
    /// improvements into the result.
    pub fn run_test_case(&self, case: &TestCase) -> TestResult {
        let mut result = self.run_case(case.name, case.input);
        result.expected_improvements = case.expected_improvements.iter().map(|s| s.to_string()).collect();
        result
    }

    /// Run a list of cases, in order.
    pub fn run_cases(&self, cases: &[TestCase]) -> Vec<TestResult> {
        cases.iter().map(|case| self.run_test_case(case)).collect()
    }

    /// Run the full corpus.
    pub fn run_all_tests(&self) -> TestSuite {
        let suite = TestSuite::new(SUITE_NAME, self.run_cases(corpus::FULL));
        log::info!(
            "comparison suite: {}/{} passed",
            suite.summary.passed,
            suite.summary.total
        );
        suite
    }

    /// Run the quick corpus; safe iff every case passed.
    pub fn quick_safety_check(&self) -> SafetyCheck {
        let issues: Vec<String> = self
            .run_cases(corpus::QUICK)
            .into_iter()
            .filter(|result| !result.passed)
            .map(|result| {
                let found: Vec<String> = result.issues.iter().map(Issue::to_string).collect();
                format!("{}: {}", result.name, found.join(", "))
            })
            .collect();
        SafetyCheck {
            safe: issues.is_empty(),
            issues,
        }
    }
}

#[cfg(feature = "parallel")]
impl<E: Formatter + Sync, L: Formatter + Sync> Harness<E, L> {
    /// [`run_cases`](Self::run_cases) on the rayon pool; results keep input order.
    pub fn run_cases_parallel(&self, cases: &[TestCase]) -> Vec<TestResult> {
        use rayon::prelude::*;

        cases
            .par_iter()
            .map(|case| self.run_test_case(case))
            .collect()
    }

    /// [`run_all_tests`](Self::run_all_tests) on the rayon pool.
    pub fn run_all_tests_parallel(&self) -> TestSuite {
        TestSuite::new(SUITE_NAME, self.run_cases_parallel(corpus::FULL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormatConfig;
    use crate::error::{FormatError, FormatResult};

    struct Broken;

    impl Formatter for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn format(&self, _markup: &str) -> FormatResult<String> {
            Err(FormatError::stage("broken", "boom"))
        }
    }

    #[test]
    fn test_standard_suite_passes() {
        let suite = Harness::standard(FormatConfig::enhanced()).run_all_tests();
        assert_eq!(suite.summary.total, corpus::FULL.len());
        assert_eq!(suite.summary.failed, 0, "{suite}");
        assert!(suite.summary.overall_recommendation.starts_with("All tests passed"));
        // every enhanced output differs from the bare legacy paragraphs
        assert!(suite.results.iter().all(|r| !r.differences.is_empty()));
        // corpus expectations travel with the results
        for (result, case) in suite.results.iter().zip(corpus::FULL) {
            assert_eq!(result.name, case.name);
            assert_eq!(result.expected_improvements, case.expected_improvements);
        }
    }

    #[test]
    fn test_currency_case_is_protected() {
        let harness = Harness::standard(FormatConfig::enhanced());
        let result = harness.run_case("Currency", "Cost: £1,500 + VAT");
        assert!(result.passed);
        assert!(!result.issues.iter().any(|i| i.message.starts_with("currency")));
    }

    #[test]
    fn test_quick_safety_check() {
        let check = Harness::standard(FormatConfig::enhanced()).quick_safety_check();
        assert!(check.safe);
        assert!(check.issues.is_empty());
    }

    #[test]
    fn test_formatter_error_is_critical() {
        let harness = Harness::new(Broken, LegacyFormatter::new());
        let result = harness.run_case("Broken", "Hello");
        assert!(!result.passed);
        assert_eq!(result.enhanced_output, "ERROR");
        assert_eq!(result.issues[0].severity, Severity::Critical);

        let check = harness.quick_safety_check();
        assert!(!check.safe);
        assert_eq!(check.issues.len(), corpus::QUICK.len());
        assert!(check.issues[0].starts_with("Basic Text: CRITICAL: test execution failed"));

        let suite = harness.run_all_tests();
        assert!(suite.summary.overall_recommendation.contains("critical issues"));
    }

    #[test]
    fn test_detect_issues() {
        let issues = detect_issues("a\n\nb £5", "<p>a</p>", "<p>a b £5</p>  null");
        let severities: Vec<_> = issues.iter().map(|i| i.severity).collect();
        assert_eq!(
            severities,
            [
                Severity::Warning,
                Severity::Warning,
                Severity::Info,
                Severity::Warning,
                Severity::Critical,
            ]
        );
        assert_eq!(issues[3].to_string(), "WARNING: significant size difference (150.0%)");

        // both outputs empty: no size issue
        let issues = detect_issues("", "", "");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Info);
    }

    #[test]
    fn test_recommendations_thresholds() {
        let warn = |n: usize| vec![Issue::new(Severity::Warning, "w"); n];
        let diffs = |n: usize| vec![String::new(); n];

        assert!(recommendations(&[Issue::new(Severity::Critical, "c")], &[])[0].starts_with("Do not use"));
        assert!(recommendations(&warn(3), &[])[0].contains("with caution"));
        assert!(recommendations(&warn(1), &[])[0].contains("appears safe"));
        assert!(recommendations(&[], &[])[0].contains("looks good"));

        assert!(recommendations(&[], &diffs(0))[1].starts_with("Identical"));
        assert!(recommendations(&[], &diffs(2))[1].starts_with("Minor"));
        assert!(recommendations(&[], &diffs(3))[1].starts_with("Significant"));
    }

    #[test]
    fn test_summary_failure_ratio() {
        let result = |passed: bool| TestResult {
            name: String::new(),
            input: String::new(),
            legacy_output: String::new(),
            enhanced_output: String::new(),
            differences: Vec::new(),
            passed,
            issues: Vec::new(),
            recommendations: Vec::new(),
            expected_improvements: Vec::new(),
        };
        let summary = Summary::from_results(&[result(true), result(true), result(true), result(false)]);
        assert!(summary.overall_recommendation.starts_with("Some tests failed"));
        let summary = Summary::from_results(&[result(true), result(false)]);
        assert!(summary.overall_recommendation.starts_with("Multiple test failures"));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let harness = Harness::standard(FormatConfig::enhanced());
        assert_eq!(harness.run_all_tests_parallel(), harness.run_all_tests());
    }
}

//! Suite report rendering (plain text and standalone HTML).
//!
//! Both reports are `Display` impls writing straight into the formatter;
//! [`render_text`] and [`render_html`] collect them into a `String`.

use std::fmt;

use crate::render::escape_html;
use crate::select::Status;

use super::{Severity, TestResult, TestSuite};

/// Plain-text report.
pub fn render_text(suite: &TestSuite) -> String {
    TextReport(suite).to_string()
}

/// Self-contained HTML report. Every piece of suite content is escaped.
pub fn render_html(suite: &TestSuite, status: &Status) -> String {
    HtmlReport { suite, status }.to_string()
}

// =============================================================================
// Text
// =============================================================================

/// Plain-text view of a suite; also backs `Display for TestSuite`.
pub(super) struct TextReport<'a>(pub(super) &'a TestSuite);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suite = self.0;
        let summary = &suite.summary;
        writeln!(f, "{}", suite.name)?;
        writeln!(
            f,
            "{} tests, {} passed, {} failed",
            summary.total, summary.passed, summary.failed
        )?;
        writeln!(f, "Overall: {}", summary.overall_recommendation)?;

        for result in &suite.results {
            let mark = if result.passed { "PASS" } else { "FAIL" };
            writeln!(f, "\n[{mark}] {}", result.name)?;
            if !result.expected_improvements.is_empty() {
                writeln!(f, "  expected: {}", result.expected_improvements.join(", "))?;
            }
            if result.differences.is_empty() {
                writeln!(f, "  no differences")?;
            }
            for diff in &result.differences {
                writeln!(f, "  diff: {diff}")?;
            }
            for issue in &result.issues {
                writeln!(f, "  {issue}")?;
            }
            for rec in &result.recommendations {
                writeln!(f, "  -> {rec}")?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// HTML
// =============================================================================

const STYLE: &str = "\
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 20px; }
.header { background: #f8f9fa; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
.summary { background: #e3f2fd; padding: 15px; border-radius: 8px; margin-bottom: 20px; }
.test-result { border: 1px solid #ddd; margin-bottom: 15px; border-radius: 8px; }
.test-header { padding: 15px; background: #f5f5f5; border-bottom: 1px solid #ddd; }
.test-content { padding: 15px; }
.passed { border-left: 4px solid #4caf50; }
.failed { border-left: 4px solid #f44336; }
.code-block { background: #f8f8f8; padding: 10px; border-radius: 4px; font-family: monospace; font-size: 12px; overflow-x: auto; white-space: pre-wrap; }
.issue { padding: 5px 10px; margin: 5px 0; border-radius: 4px; }
.critical { background: #ffebee; color: #c62828; }
.warning { background: #fff3e0; color: #ef6c00; }
.info { background: #e3f2fd; color: #1976d2; }
.recommendation { background: #f1f8e9; padding: 10px; border-radius: 4px; margin: 10px 0; }
";

fn severity_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "critical",
        Severity::Warning => "warning",
        Severity::Info => "info",
    }
}

struct HtmlReport<'a> {
    suite: &'a TestSuite,
    status: &'a Status,
}

impl fmt::Display for HtmlReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suite = self.suite;
        let summary = &suite.summary;

        f.write_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n")?;
        f.write_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n")?;
        writeln!(f, "<title>{}</title>", escape_html(&suite.name))?;
        writeln!(f, "<style>\n{STYLE}</style>\n</head>\n<body>")?;

        writeln!(
            f,
            "<div class=\"header\"><h1>{}</h1><p><strong>Active formatter:</strong> {}</p></div>",
            escape_html(&suite.name),
            escape_html(&self.status.active.to_string())
        )?;
        writeln!(
            f,
            "<div class=\"summary\"><h2>Summary</h2><p><strong>Total:</strong> {}</p>\
             <p><strong>Passed:</strong> {}</p><p><strong>Failed:</strong> {}</p>\
             <p><strong>Overall:</strong> {}</p></div>",
            summary.total,
            summary.passed,
            summary.failed,
            escape_html(&summary.overall_recommendation)
        )?;

        for result in &suite.results {
            write_result(f, result)?;
        }

        f.write_str("</body>\n</html>\n")
    }
}

fn write_result(f: &mut fmt::Formatter<'_>, result: &TestResult) -> fmt::Result {
    let outcome = if result.passed { "passed" } else { "failed" };
    writeln!(
        f,
        "<div class=\"test-result {outcome}\"><div class=\"test-header\"><h3>{} ({outcome})</h3></div>",
        escape_html(&result.name)
    )?;
    f.write_str("<div class=\"test-content\">\n")?;
    for (label, body) in [
        ("Input", &result.input),
        ("Legacy output", &result.legacy_output),
        ("Enhanced output", &result.enhanced_output),
    ] {
        writeln!(f, "<h4>{label}</h4><div class=\"code-block\">{}</div>", escape_html(body))?;
    }

    if !result.expected_improvements.is_empty() {
        write_list(f, "Expected improvements", &result.expected_improvements)?;
    }
    if result.differences.is_empty() {
        f.write_str("<p><em>No differences detected</em></p>\n")?;
    } else {
        write_list(f, "Differences", &result.differences)?;
    }

    if !result.issues.is_empty() {
        f.write_str("<h4>Issues</h4>\n")?;
        for issue in &result.issues {
            writeln!(
                f,
                "<div class=\"issue {}\">{}</div>",
                severity_class(issue.severity),
                escape_html(&issue.to_string())
            )?;
        }
    }
    for rec in &result.recommendations {
        writeln!(f, "<div class=\"recommendation\">{}</div>", escape_html(rec))?;
    }
    f.write_str("</div>\n</div>\n")
}

fn write_list(f: &mut fmt::Formatter<'_>, heading: &str, items: &[String]) -> fmt::Result {
    write!(f, "<h4>{heading}</h4><ul>")?;
    for item in items {
        write!(f, "<li>{}</li>", escape_html(item))?;
    }
    f.write_str("</ul>\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormatConfig;
    use crate::harness::{Issue, TestResult};
    use crate::select::ActiveFormatter;

    fn suite() -> TestSuite {
        let result = TestResult {
            name: "Script <b>".into(),
            input: "<script>alert(1)</script>".into(),
            legacy_output: "<p>x</p>".into(),
            enhanced_output: "<p style=\"a\">x</p>".into(),
            differences: vec!["length: 8 -> 18".into()],
            passed: true,
            issues: vec![Issue::new(Severity::Info, "mobile wrapping could be improved")],
            recommendations: vec!["Minor differences - review before migration".into()],
            expected_improvements: vec!["Better <p> spacing".into()],
        };
        TestSuite::new("Suite", vec![result])
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&suite());
        assert!(text.starts_with("Suite\n1 tests, 1 passed, 0 failed\n"));
        assert!(text.contains("[PASS] Script <b>\n  expected: Better <p> spacing\n"));
        assert!(text.contains("  INFO: mobile wrapping could be improved"));
        assert_eq!(suite().to_string(), text);
    }

    #[test]
    fn test_render_html_escapes_content() {
        let status = Status {
            active: ActiveFormatter::Legacy,
            config: FormatConfig::default(),
        };
        let html = render_html(&suite(), &status);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Script &lt;b&gt; (passed)"));
        assert!(html.contains("&lt;p style=&quot;a&quot;&gt;x&lt;/p&gt;"));
        assert!(html.contains("<div class=\"issue info\">INFO: mobile wrapping could be improved</div>"));
        assert!(html.contains("<h4>Expected improvements</h4><ul><li>Better &lt;p&gt; spacing</li></ul>"));
        assert!(!html.contains("<script>"));
    }
}

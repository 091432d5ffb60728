//! Curated comparison cases covering the production formatting problems.

/// One curated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestCase {
    pub name: &'static str,
    pub input: &'static str,
    /// What the enhanced formatter is expected to improve on this input.
    pub expected_improvements: &'static [&'static str],
}

/// The full comparison corpus.
pub const FULL: &[TestCase] = &[
    TestCase {
        name: "Line Break Preservation",
        input: "Hi Luke,\n\nThank you for your enquiry.\n\nThe purpose of this email is to briefly follow up on our conversation.\n\nBest regards",
        expected_improvements: &["Better paragraph spacing", "Preserved line breaks"],
    },
    TestCase {
        name: "Currency Formatting",
        input: "<p>Our estimated fee for this matter is £1,500 + VAT.</p><p>Initial consultation: £250</p><p>Hourly rate: £450 + VAT</p>",
        expected_improvements: &["No autoformatted numbers", "Explicit numeric styling"],
    },
    TestCase {
        name: "Long Content",
        input: "<p>This is a very long line of text that might cause horizontal scrolling in email clients if not properly wrapped and formatted with appropriate width constraints and responsive design principles.</p>",
        expected_improvements: &["Mobile responsive", "Width constraints", "Word wrapping"],
    },
    TestCase {
        name: "Rich Text Formatting",
        input: "<h2>Proposal Summary</h2><p><strong>Matter:</strong> Property Transaction</p><ul><li>Due diligence review</li><li>Contract preparation</li><li>Completion assistance</li></ul><p><em>Timeline: 2-3 weeks</em></p>",
        expected_improvements: &["Enhanced headings", "Better list formatting", "Consistent spacing"],
    },
    TestCase {
        name: "Links and Contact Information",
        input: "<p>Please review our proposal and <a href=\"https://example.com/pitch/ABC123\">instruct us</a> if you wish to proceed.</p><p>Contact: solicitor@example.com</p>",
        expected_improvements: &["Better link styling", "Email client compatibility"],
    },
    TestCase {
        name: "Mixed Content with Manual Formatting",
        input: "<h3>Service Overview</h3>\n\n<p>Our services include:</p>\n\n<ul>\n<li>Initial consultation (£250)</li>\n<li>Document review</li>\n<li>Legal advice and guidance</li>\n</ul>\n\n<p>Total estimated cost: £1,750 + VAT</p>\n\n\n<p>Kind regards,<br>The Team</p>",
        expected_improvements: &["Preserved spacing", "Protected numbers", "Better structure"],
    },
];

/// Fast subset used by the production safety check.
pub const QUICK: &[TestCase] = &[
    TestCase {
        name: "Basic Text",
        input: "Hello world\n\nThis is a test.",
        expected_improvements: &[],
    },
    TestCase {
        name: "Currency",
        input: "Cost: £1,500 + VAT",
        expected_improvements: &[],
    },
    TestCase {
        name: "Rich Text",
        input: "<p><strong>Bold</strong> and <em>italic</em> text</p>",
        expected_improvements: &[],
    },
];

//! Chat formatting. Rich-text body → plain structured lines.
//!
//! The tag stripper is a permissive regex pass, not a markup parser: it
//! handles the internally generated report bodies, not arbitrary HTML.

use crate::domain::entities::{FormattedMessage, TabularReport, TrendType};
use crate::domain::trend::BodyProcessor;
use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("<[^<]+?>").expect("valid tag regex"));

const SEPARATOR_WIDTH: usize = 30;

/// Strip markup tags and decode `&nbsp;`, `&lt;` and `&gt;`.
pub fn html_to_text(html: &str) -> String {
    TAG_RE
        .replace_all(html, "")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

/// Build the chat message for a notification: header, processed body, optional report.
pub fn format_for_chat(
    subject: &str,
    body: &str,
    report: Option<&TabularReport>,
) -> FormattedMessage {
    let mut msg = FormattedMessage::default();
    msg.push(format!("📊 {}", subject));
    msg.push("=".repeat(SEPARATOR_WIDTH));

    let text = html_to_text(body);
    let mut processor = BodyProcessor::new();
    for line in text.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
        processor.feed(line);
    }
    msg.extend(processor.finish());

    if let Some(report) = report {
        msg.extend(render_report(report));
    }
    msg
}

/// Render the detailed report section. Empty keyword/type groups are skipped.
pub fn render_report(report: &TabularReport) -> Vec<String> {
    let mut out = vec![String::new(), "📌 Detailed report:".to_string()];
    for keyword in report.keywords() {
        out.push(String::new());
        out.push(format!("🔍 {}", keyword));
        for trend_type in TrendType::ALL {
            let mut rows = report.rows_for(keyword, trend_type).peekable();
            if rows.peek().is_none() {
                continue;
            }
            out.push(match trend_type {
                TrendType::Rising => "  ↗️ Rising trends:".to_string(),
                TrendType::Top => "  ⭐ Top trends:".to_string(),
            });
            for row in rows {
                out.push(format!("    • {} ({})", row.related_keywords, row.value));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ReportRow;

    fn row(keyword: &str, kind: &str, related: &str, value: &str) -> ReportRow {
        ReportRow {
            keyword: keyword.into(),
            trend_type: kind.into(),
            related_keywords: related.into(),
            value: value.into(),
        }
    }

    #[test]
    fn strips_tags_and_decodes_entities() {
        let text = html_to_text("<p>a&nbsp;<b>b</b> &lt;c&gt;</p>");
        assert_eq!(text, "a b <c>");
    }

    #[test]
    fn empty_body_yields_header_only() {
        let msg = format_for_chat("Daily", "", None);
        assert_eq!(msg.lines, vec!["📊 Daily".to_string(), "=".repeat(30)]);
    }

    #[test]
    fn plain_text_passes_through_verbatim() {
        let msg = format_for_chat("S", "first line\n\n  second line  \nthird", None);
        assert_eq!(
            &msg.lines[2..],
            &["first line", "second line", "third"].map(String::from)
        );
    }

    #[test]
    fn annotates_fields_and_sections() {
        let body = "<h2>Summary:</h2>\n<p>Time Range: now 7-d</p>\n<p>Region: US</p>\n\
                    <p>Total keywords: 3</p>\n<p>Successful: 2</p>\n<p>Failed: 1</p>";
        let msg = format_for_chat("S", body, None);
        assert_eq!(
            &msg.lines[2..],
            &[
                "",
                "📌 Summary:",
                "🕒 Time Range: now 7-d",
                "🌍 Region: US",
                "📝 Total keywords: 3",
                "✅ Successful: 2",
                "❌ Failed: 1",
            ]
            .map(String::from)
        );
    }

    #[test]
    fn growth_lines_are_grouped_before_next_plain_line() {
        let body = "kw1: queryA (Growth: 120%)\nkw2: queryB (Growth: 80%)\nend";
        let msg = format_for_chat("S", body, None);
        assert_eq!(msg.lines.len(), 2 + 6 + 1);
        assert_eq!(msg.lines[2], "↗️ Keyword: kw1");
        assert_eq!(msg.lines[5], "↗️ Keyword: kw2");
        assert_eq!(msg.lines[8], "end");
    }

    #[test]
    fn renders_report_groups() {
        let report = TabularReport::new(vec![row("x", "rising", "y", "5")]);
        let msg = format_for_chat("S", "", Some(&report));
        let text = msg.to_string();
        assert!(text.contains("📌 Detailed report:"));
        assert!(text.contains("🔍 x"));
        assert!(text.contains("↗️ Rising trends:"));
        assert!(text.contains("    • y (5)"));
        assert!(!text.contains("Top trends"));
    }

    #[test]
    fn report_orders_rising_before_top_per_keyword() {
        let report = TabularReport::new(vec![
            row("a", "top", "t1", "100"),
            row("b", "rising", "r2", "Breakout"),
            row("a", "rising", "r1", "250"),
            row("a", "other", "ignored", "0"),
        ]);
        let lines = render_report(&report);
        assert_eq!(
            lines,
            [
                "",
                "📌 Detailed report:",
                "",
                "🔍 a",
                "  ↗️ Rising trends:",
                "    • r1 (250)",
                "  ⭐ Top trends:",
                "    • t1 (100)",
                "",
                "🔍 b",
                "  ↗️ Rising trends:",
                "    • r2 (Breakout)",
            ]
            .map(String::from)
        );
    }
}

//! Domain entities. Pure data structures for the core business.
//!
//! No SMTP/Telegram types here — adapters map to and from these.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One notification to dispatch. Read-only for the duration of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub subject: String,
    /// Rich-text (HTML) body.
    pub body: String,
    pub attachments: Vec<PathBuf>,
}

impl NotificationRequest {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = PathBuf>) -> Self {
        self.attachments = attachments.into_iter().collect();
        self
    }

    /// First `.csv` attachment. Rendered as a report on chat instead of being transferred.
    pub fn report_csv(&self) -> Option<&Path> {
        self.attachments
            .iter()
            .find(|p| is_csv(p))
            .map(PathBuf::as_path)
    }

    /// Attachments transferred as files over chat (everything except CSV reports).
    pub fn file_attachments(&self) -> impl Iterator<Item = &Path> {
        self.attachments
            .iter()
            .filter(|p| !is_csv(p))
            .map(PathBuf::as_path)
    }
}

fn is_csv(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".csv")
}

/// Which channels a dispatch uses.
///
/// Unrecognized names enable no channel; such a dispatch trivially succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum DeliveryMethod {
    #[default]
    Email,
    Chat,
    Both,
    None,
}

impl From<String> for DeliveryMethod {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "email" => DeliveryMethod::Email,
            "chat" | "telegram" => DeliveryMethod::Chat,
            "both" => DeliveryMethod::Both,
            _ => DeliveryMethod::None,
        }
    }
}

impl DeliveryMethod {
    pub fn sends_email(self) -> bool {
        matches!(self, DeliveryMethod::Email | DeliveryMethod::Both)
    }

    pub fn sends_chat(self) -> bool {
        matches!(self, DeliveryMethod::Chat | DeliveryMethod::Both)
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeliveryMethod::Email => "email",
            DeliveryMethod::Chat => "chat",
            DeliveryMethod::Both => "both",
            DeliveryMethod::None => "none",
        };
        f.write_str(s)
    }
}

/// Chat recipient resolved from a display name by the session provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientId {
    pub id: i64,
    pub display_name: String,
}

/// Message text after formatting for chat: ordered lines, transient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedMessage {
    pub lines: Vec<String>,
}

impl FormattedMessage {
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }
}

impl fmt::Display for FormattedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Trend type column of the tabular report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendType {
    Rising,
    Top,
}

impl TrendType {
    /// Rendering order.
    pub const ALL: [TrendType; 2] = [TrendType::Rising, TrendType::Top];

    pub fn as_str(self) -> &'static str {
        match self {
            TrendType::Rising => "rising",
            TrendType::Top => "top",
        }
    }
}

/// One row of the trends report CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub keyword: String,
    #[serde(rename = "type")]
    pub trend_type: String,
    pub related_keywords: String,
    pub value: String,
}

impl ReportRow {
    pub fn is(&self, trend_type: TrendType) -> bool {
        self.trend_type.trim() == trend_type.as_str()
    }
}

/// Row-oriented trends report, usually parsed from a CSV attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularReport {
    pub rows: Vec<ReportRow>,
}

impl TabularReport {
    pub fn new(rows: Vec<ReportRow>) -> Self {
        Self { rows }
    }

    /// Unique keywords in the order first encountered.
    pub fn keywords(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.keyword.as_str()) {
                seen.push(&row.keyword);
            }
        }
        seen
    }

    pub fn rows_for<'a>(
        &'a self,
        keyword: &'a str,
        trend_type: TrendType,
    ) -> impl Iterator<Item = &'a ReportRow> + 'a {
        self.rows
            .iter()
            .filter(move |r| r.keyword == keyword && r.is(trend_type))
    }
}

/// Result of a sign-in attempt on the chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInResult {
    Success,
    PasswordRequired { hint: Option<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_report_csv_from_file_attachments() {
        let req = NotificationRequest::new("s", "b").with_attachments([
            PathBuf::from("/tmp/chart.png"),
            PathBuf::from("/tmp/report.csv"),
            PathBuf::from("/tmp/other.csv"),
        ]);
        assert_eq!(req.report_csv(), Some(Path::new("/tmp/report.csv")));
        let files: Vec<_> = req.file_attachments().collect();
        assert_eq!(files, vec![Path::new("/tmp/chart.png")]);
    }

    #[test]
    fn delivery_method_flags() {
        assert!(DeliveryMethod::Both.sends_email() && DeliveryMethod::Both.sends_chat());
        assert!(!DeliveryMethod::Email.sends_chat());
        assert!(!DeliveryMethod::Chat.sends_email());
    }

    #[test]
    fn unknown_delivery_method_enables_no_channel() {
        assert_eq!(DeliveryMethod::from("Telegram".to_string()), DeliveryMethod::Chat);
        assert_eq!(DeliveryMethod::from(" both ".to_string()), DeliveryMethod::Both);
        for name in ["none", "wechat", "emial", ""] {
            let method = DeliveryMethod::from(name.to_string());
            assert_eq!(method, DeliveryMethod::None);
            assert!(!method.sends_email() && !method.sends_chat());
        }
    }

    #[test]
    fn keywords_keep_first_seen_order() {
        let row = |k: &str| ReportRow {
            keyword: k.into(),
            trend_type: "top".into(),
            related_keywords: "r".into(),
            value: "1".into(),
        };
        let report = TabularReport::new(vec![row("b"), row("a"), row("b")]);
        assert_eq!(report.keywords(), vec!["b", "a"]);
    }
}

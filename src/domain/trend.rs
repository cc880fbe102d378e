//! Growth-metric lines: classification and the buffering state machine.
//!
//! Body lines are fed one at a time. Growth lines are held back in a buffer
//! so consecutive metrics can be rendered as one block; the buffer is flushed
//! when a section header or a plain line arrives, and at end of stream.

use thiserror::Error;
use tracing::warn;

const GROWTH_MARKER: &str = "Growth:";
const GROWTH_MARKER_PAREN: &str = "(Growth:";

/// Recognized field labels and the icon each one gets.
const FIELD_LABELS: &[(&str, &str)] = &[
    ("Time Range:", "🕒"),
    ("Region:", "🌍"),
    ("Total keywords", "📝"),
    ("Successful", "✅"),
    ("Failed", "❌"),
];

/// Classification of one trimmed, non-empty body line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    SectionHeader,
    /// Field line; carries the icon for its label.
    Field(&'static str),
    Growth,
    Plain,
}

/// Classify a line. Priority: section header, field label, growth metric, plain.
pub fn classify(line: &str) -> LineKind {
    if line.ends_with(':') {
        return LineKind::SectionHeader;
    }
    if let Some((_, icon)) = FIELD_LABELS
        .iter()
        .find(|(label, _)| line.starts_with(label))
    {
        return LineKind::Field(*icon);
    }
    if line.contains(GROWTH_MARKER) || (line.contains("AI:") && line.contains("Growth")) {
        return LineKind::Growth;
    }
    LineKind::Plain
}

/// A growth line split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendEntry {
    pub keyword: String,
    pub query: String,
    pub growth: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TrendLineError {
    #[error("no `Growth:` marker")]
    NoGrowthMarker,
    #[error("no `keyword:` prefix before the growth marker")]
    NoKeywordPrefix,
}

/// Split `keyword: query (Growth: value)` into its parts.
///
/// `(Growth:` is the primary delimiter; a bare `Growth:` is accepted when the
/// parenthesized form is absent.
pub fn decompose(line: &str) -> Result<TrendEntry, TrendLineError> {
    if !line.contains(GROWTH_MARKER) {
        return Err(TrendLineError::NoGrowthMarker);
    }
    let (keyword, rest) = line
        .split_once(':')
        .ok_or(TrendLineError::NoKeywordPrefix)?;
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(TrendLineError::NoKeywordPrefix);
    }
    let (query, growth) = rest
        .split_once(GROWTH_MARKER_PAREN)
        .or_else(|| rest.split_once(GROWTH_MARKER))
        .ok_or(TrendLineError::NoKeywordPrefix)?;

    Ok(TrendEntry {
        keyword: keyword.to_string(),
        query: query.trim().to_string(),
        growth: growth
            .trim_matches(|c| c == '(' || c == ')' || c == ' ')
            .to_string(),
    })
}

/// Render buffered growth lines. Undecomposable lines are kept, indented.
pub fn format_trend_data(lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len() * 3);
    for line in lines {
        match decompose(line) {
            Ok(entry) => {
                out.push(format!("↗️ Keyword: {}", entry.keyword));
                out.push(format!("   Related query: {}", entry.query));
                out.push(format!("   Growth: {}", entry.growth));
            }
            Err(e) => {
                warn!(line = %line, error = %e, "could not format trend line");
                out.push(format!("   {}", line));
            }
        }
    }
    out
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Normal,
    Buffering(Vec<String>),
}

/// Single-pass line processor over the body of a message.
#[derive(Debug, Default)]
pub struct BodyProcessor {
    state: State,
    out: Vec<String>,
}

impl BodyProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether growth lines are currently held back.
    pub fn is_buffering(&self) -> bool {
        matches!(self.state, State::Buffering(_))
    }

    pub fn feed(&mut self, line: &str) {
        match classify(line) {
            LineKind::SectionHeader => {
                self.flush();
                self.out.push(String::new());
                self.out.push(format!("📌 {}", line));
            }
            LineKind::Field(icon) => self.out.push(format!("{} {}", icon, line)),
            LineKind::Growth => match &mut self.state {
                State::Buffering(buf) => buf.push(line.to_string()),
                State::Normal => self.state = State::Buffering(vec![line.to_string()]),
            },
            LineKind::Plain => {
                self.flush();
                self.out.push(line.to_string());
            }
        }
    }

    /// Flush anything still buffered and return the emitted lines.
    pub fn finish(mut self) -> Vec<String> {
        self.flush();
        self.out
    }

    fn flush(&mut self) {
        if let State::Buffering(buf) = std::mem::take(&mut self.state) {
            self.out.extend(format_trend_data(&buf));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_growth_line_yields_three_lines() {
        let out = format_trend_data(&["kw1: queryA (Growth: 120%)".to_string()]);
        assert_eq!(
            out,
            vec![
                "↗️ Keyword: kw1",
                "   Related query: queryA",
                "   Growth: 120%",
            ]
        );
    }

    #[test]
    fn bare_growth_marker_is_fallback_delimiter() {
        let entry = decompose("kw2: queryB Growth: +40%").unwrap();
        assert_eq!(entry.keyword, "kw2");
        assert_eq!(entry.query, "queryB");
        assert_eq!(entry.growth, "+40%");
    }

    #[test]
    fn undecomposable_line_does_not_abort_flush() {
        let lines = vec![
            "Growth: 50%".to_string(),
            "AI: model Growth pending".to_string(),
            "kw: q (Growth: 1%)".to_string(),
        ];
        let out = format_trend_data(&lines);
        assert_eq!(out[0], "   Growth: 50%");
        assert_eq!(out[1], "   AI: model Growth pending");
        assert_eq!(out[2], "↗️ Keyword: kw");
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn label_wins_over_growth_marker() {
        assert_eq!(classify("Region: US Growth: 5%"), LineKind::Field("🌍"));
        assert_eq!(classify("Time Range: today Growth: 1"), LineKind::Field("🕒"));
        assert_eq!(classify("Rising keywords:"), LineKind::SectionHeader);
        assert_eq!(classify("AI: chips (Growth 10)"), LineKind::Growth);
        assert_eq!(classify("just text"), LineKind::Plain);
    }

    #[test]
    fn plain_line_flushes_buffer_but_field_line_does_not() {
        let mut p = BodyProcessor::new();
        p.feed("kw: a (Growth: 1%)");
        assert!(p.is_buffering());
        p.feed("Region: US");
        assert!(p.is_buffering());
        p.feed("done");
        assert!(!p.is_buffering());
        let out = p.finish();
        assert_eq!(out[0], "🌍 Region: US");
        assert_eq!(out[1], "↗️ Keyword: kw");
        assert_eq!(out.last().map(String::as_str), Some("done"));
    }

    #[test]
    fn section_header_flushes_and_adds_spacer() {
        let mut p = BodyProcessor::new();
        p.feed("kw: a (Growth: 1%)");
        p.feed("Top keywords:");
        let out = p.finish();
        assert_eq!(out.len(), 5);
        assert_eq!(out[3], "");
        assert_eq!(out[4], "📌 Top keywords:");
    }

    #[test]
    fn end_of_stream_flushes() {
        let mut p = BodyProcessor::new();
        p.feed("kw: a (Growth: 1%)");
        p.feed("kw: b (Growth: 2%)");
        assert_eq!(p.finish().len(), 6);
    }
}

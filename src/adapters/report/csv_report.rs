//! CSV → `TabularReport`. Uses the `csv` crate with serde row mapping.
//!
//! Expected header: `keyword,type,related_keywords,value`; extra columns are
//! ignored.

use crate::domain::{DomainError, ReportRow, TabularReport};
use std::path::Path;

/// Parse report CSV bytes.
pub fn parse_report(bytes: &[u8]) -> Result<TabularReport, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let rows = rdr
        .deserialize::<ReportRow>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TabularReport::new(rows))
}

/// Read and parse a report file. Failures are `PartialContent`: callers drop the report.
pub async fn read_report(path: &Path) -> Result<TabularReport, DomainError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DomainError::PartialContent(format!("read {}: {}", path.display(), e)))?;
    parse_report(&bytes)
        .map_err(|e| DomainError::PartialContent(format!("parse {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_in_order() {
        let csv = "keyword,type,related_keywords,value\n\
                   rust,rising,rust async,250\n\
                   rust,top,rust book,100\n";
        let report = parse_report(csv.as_bytes()).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].keyword, "rust");
        assert_eq!(report.rows[0].trend_type, "rising");
        assert_eq!(report.rows[1].related_keywords, "rust book");
        assert_eq!(report.rows[1].value, "100");
    }

    #[test]
    fn ignores_extra_columns_and_keeps_text_values() {
        let csv = "timestamp,keyword,type,related_keywords,value\n\
                   2024-01-01,ai,rising,\"ai, agents\",Breakout\n";
        let report = parse_report(csv.as_bytes()).unwrap();
        assert_eq!(report.rows[0].related_keywords, "ai, agents");
        assert_eq!(report.rows[0].value, "Breakout");
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "keyword,type\nrust,top\n";
        assert!(parse_report(csv.as_bytes()).is_err());
    }

    #[tokio::test]
    async fn unreadable_file_is_partial_content() {
        let err = read_report(Path::new("/nonexistent/report.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PartialContent(_)));
    }
}

//! Streaming parsers that turn an uploaded file into a sequence of `RawRow`s.

pub mod csv;
pub mod xlsx;

use crate::row::RawRow;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("file has no header row")]
    MissingHeader,

    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// File formats accepted for ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
    Xls,
}

impl SourceFormat {
    pub fn from_extension(name: &str) -> Result<Self, ParseError> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Ok(Self::Csv)
        } else if lower.ends_with(".xlsx") {
            Ok(Self::Xlsx)
        } else if lower.ends_with(".xls") {
            Ok(Self::Xls)
        } else {
            Err(ParseError::UnsupportedExtension(name.to_string()))
        }
    }
}

/// A parser that yields header-keyed rows, 1-based over data rows.
pub trait RowSource {
    fn headers(&self) -> &[String];
    fn next_row(&mut self) -> Result<Option<RawRow>, ParseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_detection() {
        assert_eq!(SourceFormat::from_extension("data.csv").unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_extension("DATA.XLSX").unwrap(), SourceFormat::Xlsx);
        assert_eq!(SourceFormat::from_extension("legacy.xls").unwrap(), SourceFormat::Xls);
        assert!(SourceFormat::from_extension("data.json").is_err());
    }
}

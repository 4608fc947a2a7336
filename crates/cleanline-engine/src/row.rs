//! Row-level types produced by the rule engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single row as read off the wire by the streaming parser: header-keyed
/// raw string values, no normalization applied yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based row number over data rows (header is row 0).
    pub row_number: u64,
    /// Header-name -> raw cell value. Missing/empty cells are absent or `None`.
    pub fields: BTreeMap<String, Option<String>>,
}

impl RawRow {
    pub fn new(row_number: u64) -> Self {
        Self {
            row_number,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_deref())
    }

    pub fn is_empty_field(&self, field: &str) -> bool {
        match self.fields.get(field) {
            None => true,
            Some(None) => true,
            Some(Some(s)) => s.trim().is_empty(),
        }
    }
}

/// One rule-evaluation error attached to a field within a row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowError {
    pub field: String,
    pub rule_name: String,
    pub error_message: String,
    pub original_value: Option<String>,
}

/// The product of running one row through the rule engine: exactly one of
/// clean or exception, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RowOutcome {
    Clean {
        row_number: u64,
        normalized: BTreeMap<String, Option<String>>,
    },
    Exception {
        row_number: u64,
        original_data: BTreeMap<String, Option<String>>,
        errors: Vec<RowError>,
    },
}

impl RowOutcome {
    pub fn row_number(&self) -> u64 {
        match self {
            RowOutcome::Clean { row_number, .. } => *row_number,
            RowOutcome::Exception { row_number, .. } => *row_number,
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, RowOutcome::Clean { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_row_is_empty_field() {
        let mut row = RawRow::new(1);
        row.fields.insert("name".to_string(), Some("  ".to_string()));
        row.fields.insert("phone".to_string(), Some("138".to_string()));
        assert!(row.is_empty_field("name"));
        assert!(!row.is_empty_field("phone"));
        assert!(row.is_empty_field("missing"));
    }

    #[test]
    fn test_row_outcome_row_number() {
        let clean = RowOutcome::Clean {
            row_number: 3,
            normalized: BTreeMap::new(),
        };
        assert_eq!(clean.row_number(), 3);
        assert!(clean.is_clean());
    }
}

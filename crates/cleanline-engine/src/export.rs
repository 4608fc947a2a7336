//! Spreadsheet export of clean and exception row sets, for the download
//! endpoints.

use crate::row::RowOutcome;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::collections::BTreeSet;

/// Writes clean rows to a single-sheet workbook, one header row followed by
/// one row per clean record, columns in header order.
pub fn write_clean_workbook(headers: &[String], rows: &[RowOutcome]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    for (row_idx, outcome) in rows.iter().enumerate() {
        if let RowOutcome::Clean { normalized, .. } = outcome {
            for (col, header) in headers.iter().enumerate() {
                let value = normalized.get(header).and_then(|v| v.as_deref()).unwrap_or("");
                sheet.write_string((row_idx + 1) as u32, col as u16, value)?;
            }
        }
    }

    workbook.save_to_buffer()
}

/// Writes exception rows, appending an `errors` column summarizing every
/// validation failure for that row.
pub fn write_exception_workbook(headers: &[String], rows: &[RowOutcome]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }
    let errors_col = headers.len() as u16;
    sheet.write_string_with_format(0, errors_col, "errors", &header_format)?;

    for (row_idx, outcome) in rows.iter().enumerate() {
        if let RowOutcome::Exception {
            original_data,
            errors,
            ..
        } = outcome
        {
            for (col, header) in headers.iter().enumerate() {
                let value = original_data.get(header).and_then(|v| v.as_deref()).unwrap_or("");
                sheet.write_string((row_idx + 1) as u32, col as u16, value)?;
            }
            let summary = errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.error_message))
                .collect::<Vec<_>>()
                .join("; ");
            sheet.write_string((row_idx + 1) as u32, errors_col, &summary)?;
        }
    }

    workbook.save_to_buffer()
}

/// Header order for a workbook: the union of fields across all rows,
/// alphabetical, so exports are deterministic regardless of row order.
pub fn header_union(rows: &[RowOutcome]) -> Vec<String> {
    let mut fields = BTreeSet::new();
    for outcome in rows {
        match outcome {
            RowOutcome::Clean { normalized, .. } => fields.extend(normalized.keys().cloned()),
            RowOutcome::Exception { original_data, .. } => fields.extend(original_data.keys().cloned()),
        }
    }
    fields.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::RowError;
    use std::collections::BTreeMap;

    #[test]
    fn test_header_union_is_sorted_and_deduplicated() {
        let mut clean_fields = BTreeMap::new();
        clean_fields.insert("name".to_string(), Some("Alice".to_string()));
        clean_fields.insert("phone".to_string(), Some("13800138000".to_string()));
        let rows = vec![RowOutcome::Clean {
            row_number: 1,
            normalized: clean_fields,
        }];
        assert_eq!(header_union(&rows), vec!["name".to_string(), "phone".to_string()]);
    }

    #[test]
    fn test_write_clean_workbook_produces_nonempty_buffer() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), Some("Alice".to_string()));
        let rows = vec![RowOutcome::Clean {
            row_number: 1,
            normalized: fields,
        }];
        let headers = vec!["name".to_string()];
        let buffer = write_clean_workbook(&headers, &rows).unwrap();
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_write_exception_workbook_includes_error_summary() {
        let mut original = BTreeMap::new();
        original.insert("phone".to_string(), Some("bad".to_string()));
        let rows = vec![RowOutcome::Exception {
            row_number: 1,
            original_data: original,
            errors: vec![RowError {
                field: "phone".to_string(),
                rule_name: "phone-format".to_string(),
                error_message: "invalid phone".to_string(),
                original_value: Some("bad".to_string()),
            }],
        }];
        let headers = vec!["phone".to_string()];
        let buffer = write_exception_workbook(&headers, &rows).unwrap();
        assert!(!buffer.is_empty());
    }
}

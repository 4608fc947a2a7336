//! XLSX/XLS parser. `calamine` loads a worksheet into memory as a `Range`
//! rather than truly streaming it, so this wraps that range with a cursor to
//! satisfy the same `RowSource` contract as the CSV parser.

use super::{ParseError, RowSource};
use crate::row::RawRow;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::{Read, Seek};

pub struct XlsxRowSource {
    headers: Vec<String>,
    rows: Vec<Vec<Data>>,
    cursor: usize,
    next_row_number: u64,
}

impl XlsxRowSource {
    pub fn new<R: Read + Seek>(source: R) -> Result<Self, ParseError> {
        let mut workbook = open_workbook_auto_from_rs(source)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(ParseError::MissingHeader)?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows_iter = range.rows();
        let header_row = rows_iter.next().ok_or(ParseError::MissingHeader)?;
        let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();

        let rows: Vec<Vec<Data>> = rows_iter.map(|r| r.to_vec()).collect();

        Ok(Self {
            headers,
            rows,
            cursor: 0,
            next_row_number: 1,
        })
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format_float(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| dt.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERROR:{e:?}"),
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

impl RowSource for XlsxRowSource {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn next_row(&mut self) -> Result<Option<RawRow>, ParseError> {
        if self.cursor >= self.rows.len() {
            return Ok(None);
        }

        let cells = &self.rows[self.cursor];
        self.cursor += 1;

        let mut row = RawRow::new(self.next_row_number);
        self.next_row_number += 1;

        for (i, header) in self.headers.iter().enumerate() {
            let value = cells.get(i).map(cell_to_string).unwrap_or_default();
            let stored = if value.trim().is_empty() {
                None
            } else {
                Some(value)
            };
            row.fields.insert(header.clone(), stored);
        }

        Ok(Some(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float_strips_trailing_zero() {
        assert_eq!(format_float(35.0), "35");
        assert_eq!(format_float(35.5), "35.5");
    }

    #[test]
    fn test_cell_to_string_empty() {
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}

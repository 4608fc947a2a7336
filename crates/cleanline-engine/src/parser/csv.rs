//! CSV streaming parser: tolerant of a leading BOM, reads the header once and
//! yields one `RawRow` per subsequent record.

use super::{ParseError, RowSource};
use crate::row::RawRow;
use csv::ReaderBuilder;
use std::io::Read;

pub struct CsvRowSource<R: Read> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    next_row_number: u64,
}

impl<R: Read> CsvRowSource<R> {
    pub fn new(source: R) -> Result<Self, ParseError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);
        let headers = reader
            .headers()?
            .iter()
            .map(|h| strip_bom(h).to_string())
            .collect();
        Ok(Self {
            reader,
            headers,
            next_row_number: 1,
        })
    }
}

fn strip_bom(value: &str) -> &str {
    value.strip_prefix('\u{feff}').unwrap_or(value)
}

impl<R: Read> RowSource for CsvRowSource<R> {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn next_row(&mut self) -> Result<Option<RawRow>, ParseError> {
        let mut record = csv::StringRecord::new();
        if !self.reader.read_record(&mut record)? {
            return Ok(None);
        }

        let mut row = RawRow::new(self.next_row_number);
        self.next_row_number += 1;

        for (header, value) in self.headers.iter().zip(record.iter()) {
            let trimmed = value.trim();
            let stored = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
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
    fn test_parses_simple_rows() {
        let data = "name,phone\nAlice,13800138000\nBob,13900139000\n";
        let mut source = CsvRowSource::new(data.as_bytes()).unwrap();
        assert_eq!(source.headers(), &["name".to_string(), "phone".to_string()]);

        let row1 = source.next_row().unwrap().unwrap();
        assert_eq!(row1.row_number, 1);
        assert_eq!(row1.get("name"), Some("Alice"));

        let row2 = source.next_row().unwrap().unwrap();
        assert_eq!(row2.row_number, 2);
        assert_eq!(row2.get("phone"), Some("13900139000"));

        assert!(source.next_row().unwrap().is_none());
    }

    #[test]
    fn test_strips_bom_from_first_header() {
        let data = "\u{feff}name,phone\nAlice,13800138000\n";
        let source = CsvRowSource::new(data.as_bytes()).unwrap();
        assert_eq!(source.headers()[0], "name");
    }

    #[test]
    fn test_empty_cell_is_none() {
        let data = "name,phone\n,13800138000\n";
        let mut source = CsvRowSource::new(data.as_bytes()).unwrap();
        let row = source.next_row().unwrap().unwrap();
        assert_eq!(row.get("name"), None);
        assert!(row.is_empty_field("name"));
    }
}

//! In-memory CSV table: header row plus string records, kept verbatim.
//!
//! Short records are tolerated on read (`flexible`); missing cells read as
//! empty strings and are padded on write so every output row has the full
//! header width.

use csv::{ReaderBuilder, WriterBuilder};

use crate::IoResult;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        Self { headers, records }
    }

    /// Parse CSV bytes with a header row.
    pub fn from_csv_bytes(bytes: &[u8]) -> IoResult<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers = rdr
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect::<Vec<_>>();

        let mut records = Vec::new();
        for result in rdr.records() {
            let record = result?;
            records.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, records })
    }

    /// Serialize with a header row, comma-delimited, LF line endings.
    pub fn to_csv_bytes(&self) -> IoResult<Vec<u8>> {
        let width = self.headers.len();
        let mut wtr = WriterBuilder::new()
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        wtr.write_record(&self.headers)?;
        for rec in &self.records {
            if rec.len() >= width {
                wtr.write_record(rec)?;
            } else {
                let padded = rec
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::repeat("").take(width - rec.len()));
                wtr.write_record(padded)?;
            }
        }
        wtr.into_inner().map_err(|e| crate::IoError::Path(e.into_error()))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell value or "" when the record is short.
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.records
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Overwrite column `name` if present, else append it. `values` must have one entry per record.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.records.len());
        let col = match self.column_index(name) {
            Some(i) => i,
            None => {
                self.headers.push(name.to_string());
                self.headers.len() - 1
            }
        };
        for (rec, v) in self.records.iter_mut().zip(values) {
            if rec.len() <= col {
                rec.resize(col + 1, String::new());
            }
            rec[col] = v;
        }
    }
}

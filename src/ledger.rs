use std::collections::HashMap;
use std::io;
use std::path::Path;

use log::{debug, info, warn};

use crate::coerce::parse_number;

/// Columns that hold text and are never coerced to numbers
pub const LABEL_COLUMNS: [&str; 3] = ["user_id", "NAME", "DESIGNATION"];

/// Columns every savings ledger is expected to carry
pub const EXPECTED_COLUMNS: [&str; 8] = [
    "user_id",
    "NAME",
    "DESIGNATION",
    "2024_Credited",
    "total_FINE",
    "2024_balance",
    "2025_balance",
    "Total",
];

/// Possible errors to occur while reading or writing a ledger
///
/// Cell contents never cause an error, only the underlying source does.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The savings ledger
///
/// Columns are stored by name. Every numeric column holds one finite value
/// per row, label columns hold the cell text as it was read. Whether a column
/// exists at all has to be checked explicitly, see [`Ledger::column`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ledger {
    /// Column names in source order, trimmed
    headers: Vec<String>,
    labels: HashMap<String, Vec<String>>,
    numbers: HashMap<String, Vec<f64>>,
    rows: usize,
}

impl Ledger {
    /// Loads the ledger stored at `path`
    ///
    /// The file is read completely and closed before this returns.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let ledger = Self::from_reader(file)?;
        debug!("loaded {} rows from {}", ledger.len(), path.display());

        Ok(ledger)
    }

    /// Reads a ledger from CSV data with a header row
    ///
    /// Rows shorter than the header are padded with empty cells, cells
    /// beyond the header are ignored.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, LedgerError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let header_record = reader.byte_headers()?.clone();
        let positions = column_positions(&header_record);
        let mut headers: Vec<String> = Vec::new();
        for header in header_record.iter() {
            let header = String::from_utf8_lossy(header).trim().to_owned();
            if headers.contains(&header) {
                warn!("duplicate column `{}` is ignored", header);
                continue;
            }
            headers.push(header);
        }

        for expected in EXPECTED_COLUMNS {
            if !headers.iter().any(|header| header == expected) {
                warn!("ledger has no `{}` column", expected);
            }
        }

        let mut ledger = Self::default();
        for header in &headers {
            if is_label(header) {
                ledger.labels.insert(header.clone(), Vec::new());
            } else {
                ledger.numbers.insert(header.clone(), Vec::new());
            }
        }

        let mut record = csv::ByteRecord::new();
        while reader.read_byte_record(&mut record)? {
            for header in &headers {
                let cell = positions
                    .get(header.as_str())
                    .and_then(|&position| record.get(position));
                ledger.push_cell(header, cell);
            }
            ledger.rows += 1;
        }
        ledger.headers = headers;

        Ok(ledger)
    }

    /// Overwrites the file at `path` with the complete ledger
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), LedgerError> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        self.to_writer(file)?;
        info!("saved {} rows to {}", self.len(), path.display());

        Ok(())
    }

    /// Writes the ledger as CSV, header row first and columns in source order
    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<(), LedgerError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        if self.headers.is_empty() {
            return Ok(());
        }

        writer.write_record(&self.headers)?;
        for row in self.rows() {
            let record = self.headers
                .iter()
                .map(|header| match is_label(header) {
                    true => row.label(header).unwrap_or_default().to_owned(),
                    false => row.value(header).unwrap_or_default().to_string(),
                });
            writer.write_record(record)?;
        }
        writer.flush()?;

        Ok(())
    }

    /// The number of rows
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// The trimmed column names in source order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Whether the ledger has a column with this name, numeric or label
    pub fn has_column(&self, name: &str) -> bool {
        self.numbers.contains_key(name) || self.labels.contains_key(name)
    }

    /// The values of a numeric column, or `None` if the column does not exist
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.numbers.get(name).map(Vec::as_slice)
    }

    /// The cells of a label column, or `None` if the column does not exist
    pub fn labels(&self, name: &str) -> Option<&[String]> {
        self.labels.get(name).map(Vec::as_slice)
    }

    /// Iterates over all rows in source order
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows).map(move |index| Row { ledger: self, index })
    }

    fn push_cell(&mut self, header: &str, cell: Option<&[u8]>) {
        if let Some(labels) = self.labels.get_mut(header) {
            let text = cell.map(String::from_utf8_lossy).unwrap_or_default();
            labels.push(text.into_owned());
        } else if let Some(numbers) = self.numbers.get_mut(header) {
            let text = cell.and_then(|cell| std::str::from_utf8(cell).ok());
            let value = parse_number(text);
            if value.is_none() && !is_blank(cell) {
                debug!("column `{}` row {}: cell read as 0", header, self.rows + 1);
            }
            numbers.push(value.unwrap_or(0.0));
        }
    }
}

/// One row of a [`Ledger`]
#[derive(Clone, Copy, Debug)]
pub struct Row<'a> {
    ledger: &'a Ledger,
    index: usize,
}

impl<'a> Row<'a> {
    /// The text in a label column, or `None` if the column does not exist
    pub fn label(&self, column: &str) -> Option<&'a str> {
        self.ledger
            .labels
            .get(column)
            .and_then(|labels| labels.get(self.index))
            .map(String::as_str)
    }

    /// The value in a numeric column, or `None` if the column does not exist
    pub fn value(&self, column: &str) -> Option<f64> {
        self.ledger
            .numbers
            .get(column)
            .and_then(|values| values.get(self.index))
            .copied()
    }

    pub fn user_id(&self) -> Option<&'a str> {
        self.label("user_id")
    }
}

fn is_label(column: &str) -> bool {
    LABEL_COLUMNS.contains(&column)
}

fn column_positions(headers: &csv::ByteRecord) -> HashMap<String, usize> {
    let mut positions = HashMap::new();
    for (position, header) in headers.iter().enumerate() {
        let header = String::from_utf8_lossy(header).trim().to_owned();
        // the first occurrence of a duplicate column wins
        positions.entry(header).or_insert(position);
    }
    positions
}

fn is_blank(cell: Option<&[u8]>) -> bool {
    cell.map_or(true, |cell| cell.iter().all(u8::is_ascii_whitespace))
}

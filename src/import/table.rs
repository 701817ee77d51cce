use csv::ReaderBuilder;
use serde::Serialize;

use super::ImportError;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parses CSV text; the first record becomes the header row.
///
/// Quoted fields may hold commas and newlines. Rows of differing width are kept as-is.
pub fn parse_csv(text: &str) -> Result<ParsedTable, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let mut records = records.into_iter();
    let headers = records.next().unwrap_or_default();
    Ok(ParsedTable {
        headers,
        rows: records.collect(),
    })
}

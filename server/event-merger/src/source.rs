//! Read one region's record table from CSV.
//!
//! `date` and `event` columns are required; every other column becomes a
//! field. A column is numeric when all its non-empty cells parse as numbers,
//! otherwise text. Empty cells read as 0 in numeric columns and "" in text
//! columns, so every record of a region carries the same typed key set.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::error::EngineError;
use crate::types::{FieldValue, Fields, RawRecord};

pub const DATE_COLUMN: &str = "date";
pub const LABEL_COLUMN: &str = "event";

pub fn read_records(path: &Path) -> Result<Vec<RawRecord>, EngineError> {
  let file = File::open(path).map_err(|e| EngineError::io(path, e))?;
  read_records_from(file)
}

pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<RawRecord>, EngineError> {
  let mut csv_reader = csv::ReaderBuilder::new().flexible(false).from_reader(reader);
  let headers = csv_reader.headers()?.clone();
  if headers.is_empty() {
    return Ok(Vec::new());
  }

  let position = |name: &str| headers.iter().position(|h| h.trim() == name);
  let date_idx = position(DATE_COLUMN)
    .ok_or_else(|| EngineError::validation(DATE_COLUMN, "missing column"))?;
  let label_idx = position(LABEL_COLUMN)
    .ok_or_else(|| EngineError::validation(LABEL_COLUMN, "missing column"))?;

  let rows = csv_reader.records().collect::<Result<Vec<StringRecord>, _>>()?;

  let field_columns: Vec<(usize, String, bool)> = headers
    .iter()
    .enumerate()
    .filter(|(i, _)| *i != date_idx && *i != label_idx)
    .map(|(i, name)| (i, name.trim().to_string(), is_numeric_column(&rows, i)))
    .collect();

  Ok(
    rows
      .iter()
      .map(|row| {
        let fields: Fields = field_columns
          .iter()
          .map(|(i, name, numeric)| {
            let cell = row.get(*i).unwrap_or("").trim();
            (name.clone(), typed_cell(cell, *numeric))
          })
          .collect();
        let label = row.get(label_idx).map(str::trim).filter(|l| !l.is_empty());
        RawRecord {
          date: row.get(date_idx).unwrap_or("").to_string(),
          label: label.map(String::from),
          fields,
        }
      })
      .collect(),
  )
}

fn is_numeric_column(rows: &[StringRecord], idx: usize) -> bool {
  rows
    .iter()
    .filter_map(|r| r.get(idx).map(str::trim))
    .filter(|c| !c.is_empty())
    .all(|c| c.parse::<f64>().is_ok())
}

fn typed_cell(cell: &str, numeric: bool) -> FieldValue {
  if numeric {
    FieldValue::Number(cell.parse().unwrap_or(0.0))
  } else {
    FieldValue::Text(cell.to_string())
  }
}

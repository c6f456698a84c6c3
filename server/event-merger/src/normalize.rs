//! Validate raw rows into dated records.

use chrono::NaiveDate;

use crate::config::Config;
use crate::types::{RawRecord, Record};

/// Parse a `day/month/year` date. `None` for text that is not a real date.
pub fn parse_date(text: &str, config: &Config) -> Option<NaiveDate> {
  let trimmed = text.trim();
  if trimmed.is_empty() {
    return None;
  }
  NaiveDate::parse_from_str(trimmed, &config.date_format).ok()
}

/// Convert a raw row into a record, or `None` if its date is invalid.
pub fn normalize(raw: RawRecord, config: &Config) -> Option<Record> {
  let occurred_on = parse_date(&raw.date, config)?;
  let category_label = raw
    .label
    .map(|l| l.trim().to_string())
    .filter(|l| !l.is_empty());
  Some(Record {
    occurred_on,
    category_label,
    fields: raw.fields,
  })
}

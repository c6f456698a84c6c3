//! Core types for the event merger (input records, categories, output events).

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// One typed cell of a record. Numbers sum, text concatenates.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
  Number(f64),
  Text(String),
}

impl FieldValue {
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Number(_) => "number",
      Self::Text(_) => "text",
    }
  }

  /// Fold `other` into `self` with "+" semantics.
  pub fn combine(&mut self, key: &str, other: &FieldValue) -> Result<(), EngineError> {
    match (self, other) {
      (Self::Number(a), Self::Number(b)) => {
        *a += *b;
        Ok(())
      }
      (Self::Text(a), Self::Text(b)) => {
        a.push_str(b);
        Ok(())
      }
      (left, right) => Err(EngineError::FieldTypeMismatch {
        key: key.to_string(),
        left: left.kind(),
        right: right.kind(),
      }),
    }
  }
}

impl fmt::Display for FieldValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      // Integral counts print as "12", not "12.0".
      Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
      Self::Number(n) => write!(f, "{}", n),
      Self::Text(s) => f.write_str(s),
    }
  }
}

impl Serialize for FieldValue {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Self::Number(n) => serializer.serialize_f64(*n),
      Self::Text(s) => serializer.serialize_str(s),
    }
  }
}

/// Named attributes of a record, in source column order.
pub type Fields = IndexMap<String, FieldValue>;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One row as read from a region file, before date validation.
#[derive(Debug, Clone)]
pub struct RawRecord {
  pub date: String,
  pub label: Option<String>,
  pub fields: Fields,
}

/// A dated disaster observation. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  pub occurred_on: NaiveDate,
  pub category_label: Option<String>,
  pub fields: Fields,
}

impl Record {
  pub fn new(occurred_on: NaiveDate, category_label: Option<&str>) -> Self {
    Self {
      occurred_on,
      category_label: category_label.map(str::to_string),
      fields: Fields::new(),
    }
  }

  pub fn with_field(mut self, key: &str, value: FieldValue) -> Self {
    self.fields.insert(key.to_string(), value);
    self
  }

  pub fn label(&self) -> Option<&str> {
    self.category_label.as_deref()
  }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Canonical root disaster categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
  Earthquakes,
  Floods,
  Storms,
  Landslides,
}

impl Category {
  pub const ALL: [Category; 4] = [
    Category::Earthquakes,
    Category::Floods,
    Category::Storms,
    Category::Landslides,
  ];

  pub const TRIGGERS: [Category; 3] = [Category::Earthquakes, Category::Floods, Category::Storms];

  pub fn name(self) -> &'static str {
    match self {
      Self::Earthquakes => "EARTHQUAKES",
      Self::Floods => "FLOODS",
      Self::Storms => "STORMS",
      Self::Landslides => "LANDSLIDES",
    }
  }

  /// Landslides can join an event but never open or split one.
  pub fn is_trigger(self) -> bool {
    self != Self::Landslides
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// What a window is anchored on.
///
/// Windows opened normally carry a canonical category. A cascading reset
/// inside a fatal failure re-anchors on the conflicting record's raw label
/// instead, which then only matches a category whose name it spells exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
  Root(Category),
  RawLabel(String),
}

impl Anchor {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Root(c) => c.name(),
      Self::RawLabel(s) => s,
    }
  }

  pub fn matches(&self, category: Option<Category>) -> bool {
    category.is_some_and(|c| self.as_str() == c.name())
  }

  /// (primary, secondary) window lengths in days.
  pub fn durations(&self) -> (u64, u64) {
    match self.as_str() {
      "EARTHQUAKES" => (2, 3),
      "FLOODS" => (5, 5),
      "STORMS" => (5, 5),
      _ => (1, 1),
    }
  }
}

impl fmt::Display for Anchor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A closed event: aggregated member fields plus window metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
  #[serde(flatten)]
  pub aggregated_fields: Fields,
  #[serde(rename = "event", serialize_with = "serialize_anchor")]
  pub event_type: Anchor,
  pub start_date: NaiveDate,
  pub primary_end: NaiveDate,
  pub secondary_end: NaiveDate,
  /// Number of records folded into this event.
  #[serde(skip)]
  pub member_count: usize,
}

fn serialize_anchor<S: Serializer>(anchor: &Anchor, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_str(anchor.as_str())
}

/// Column names appended after the aggregated fields of every event row.
pub const EVENT_METADATA_COLUMNS: [&str; 4] = ["event", "start_date", "primary_end", "secondary_end"];

impl Event {
  /// Flatten into (column, cell) pairs: aggregated fields then metadata.
  pub fn to_row(&self) -> Vec<(String, String)> {
    let mut row: Vec<(String, String)> = self
      .aggregated_fields
      .iter()
      .map(|(k, v)| (k.clone(), v.to_string()))
      .collect();
    let meta = [
      self.event_type.to_string(),
      self.start_date.format("%Y-%m-%d").to_string(),
      self.primary_end.format("%Y-%m-%d").to_string(),
      self.secondary_end.format("%Y-%m-%d").to_string(),
    ];
    row.extend(
      EVENT_METADATA_COLUMNS
        .iter()
        .zip(meta)
        .map(|(k, v)| (k.to_string(), v)),
    );
    row
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numbers_sum_and_text_concatenates() {
    let mut n = FieldValue::Number(2.0);
    n.combine("deaths", &FieldValue::Number(3.5)).unwrap();
    assert_eq!(n, FieldValue::Number(5.5));

    let mut t = FieldValue::Text("a".into());
    t.combine("comment", &FieldValue::Text("b".into())).unwrap();
    assert_eq!(t, FieldValue::Text("ab".into()));
  }

  #[test]
  fn mixed_kinds_are_a_mismatch() {
    let mut n = FieldValue::Number(1.0);
    let err = n.combine("deaths", &FieldValue::Text("x".into())).unwrap_err();
    assert!(err.to_string().contains("deaths"));
  }

  #[test]
  fn integral_numbers_display_without_fraction() {
    assert_eq!(FieldValue::Number(12.0).to_string(), "12");
    assert_eq!(FieldValue::Number(1.25).to_string(), "1.25");
  }

  #[test]
  fn raw_label_anchor_only_matches_exact_category_name() {
    let raw = Anchor::RawLabel("Flood".into());
    assert!(!raw.matches(Some(Category::Floods)));
    assert_eq!(raw.durations(), (1, 1));

    let spelled = Anchor::RawLabel("FLOODS".into());
    assert!(spelled.matches(Some(Category::Floods)));
    assert_eq!(spelled.durations(), (5, 5));
  }

  #[test]
  fn duration_table() {
    assert_eq!(Anchor::Root(Category::Earthquakes).durations(), (2, 3));
    assert_eq!(Anchor::Root(Category::Floods).durations(), (5, 5));
    assert_eq!(Anchor::Root(Category::Storms).durations(), (5, 5));
    assert_eq!(Anchor::Root(Category::Landslides).durations(), (1, 1));
  }
}

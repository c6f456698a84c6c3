//! One event under construction: its date bounds and member records.

use chrono::{Days, NaiveDate};

use crate::config::Config;
use crate::error::EngineError;
use crate::types::{Anchor, Event, Fields, Record};

#[derive(Debug, Clone)]
pub struct EventWindow {
  anchor: Anchor,
  start_date: NaiveDate,
  primary_end: NaiveDate,
  secondary_end: NaiveDate,
  members: Vec<Record>,
}

impl EventWindow {
  /// Start a window at the seed's date with bounds from the duration table.
  pub fn open(seed: Record, anchor: Anchor) -> Self {
    let (primary, secondary) = anchor.durations();
    let start_date = seed.occurred_on;
    Self {
      primary_end: start_date + Days::new(primary),
      secondary_end: start_date + Days::new(secondary),
      start_date,
      anchor,
      members: vec![seed],
    }
  }

  pub fn anchor(&self) -> &Anchor {
    &self.anchor
  }

  pub fn start_date(&self) -> NaiveDate {
    self.start_date
  }

  pub fn members(&self) -> &[Record] {
    &self.members
  }

  pub fn in_primary(&self, record: &Record) -> bool {
    (self.start_date..=self.primary_end).contains(&record.occurred_on)
  }

  pub fn in_secondary(&self, record: &Record) -> bool {
    (self.start_date..=self.secondary_end).contains(&record.occurred_on)
  }

  /// Append a member. Panics if the record lies outside both intervals.
  pub fn fold(&mut self, record: Record) {
    assert!(
      self.in_primary(&record) || self.in_secondary(&record),
      "record dated {} folded into {} window {}..={}",
      record.occurred_on,
      self.anchor,
      self.start_date,
      self.secondary_end
    );
    self.members.push(record);
  }

  /// Close the window, summing numbers and concatenating text key by key.
  pub fn finalize(self, config: &Config) -> Result<Event, EngineError> {
    let mut aggregated = Fields::new();
    for member in &self.members {
      for (key, value) in member.fields.iter().filter(|(k, _)| !config.is_excluded(k)) {
        match aggregated.get_mut(key) {
          Some(acc) => acc.combine(key, value)?,
          None => {
            aggregated.insert(key.clone(), value.clone());
          }
        }
      }
    }
    Ok(Event {
      event_type: self.anchor,
      start_date: self.start_date,
      primary_end: self.primary_end,
      secondary_end: self.secondary_end,
      aggregated_fields: aggregated,
      member_count: self.members.len(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{Category, FieldValue};

  fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 3, d).unwrap()
  }

  fn quake(d: u32, deaths: f64, comment: &str) -> Record {
    Record::new(day(d), Some("Earthquake"))
      .with_field("serial", FieldValue::Text(format!("S{}", d)))
      .with_field("deaths", FieldValue::Number(deaths))
      .with_field("comment", FieldValue::Text(comment.into()))
      .with_field("latitude", FieldValue::Number(10.0))
  }

  #[test]
  fn bounds_follow_duration_table() {
    let w = EventWindow::open(quake(1, 0.0, ""), Anchor::Root(Category::Earthquakes));
    assert!(w.in_primary(&quake(3, 0.0, "")));
    assert!(!w.in_primary(&quake(4, 0.0, "")));
    assert!(w.in_secondary(&quake(4, 0.0, "")));
    assert!(!w.in_secondary(&quake(5, 0.0, "")));
  }

  #[test]
  fn records_before_start_are_outside() {
    let w = EventWindow::open(quake(5, 0.0, ""), Anchor::Root(Category::Earthquakes));
    assert!(!w.in_primary(&quake(4, 0.0, "")));
    assert!(!w.in_secondary(&quake(4, 0.0, "")));
  }

  #[test]
  fn finalize_sums_concatenates_and_strips_admin_keys() {
    let mut w = EventWindow::open(quake(1, 2.0, "a"), Anchor::Root(Category::Earthquakes));
    w.fold(quake(2, 3.0, "b"));
    w.fold(quake(4, 5.0, "c"));
    let event = w.finalize(&Config::default()).unwrap();

    assert_eq!(event.start_date, day(1));
    assert_eq!(event.primary_end, day(3));
    assert_eq!(event.secondary_end, day(4));
    assert_eq!(event.member_count, 3);
    assert_eq!(event.aggregated_fields["deaths"], FieldValue::Number(10.0));
    assert_eq!(event.aggregated_fields["comment"], FieldValue::Text("abc".into()));
    assert!(!event.aggregated_fields.contains_key("serial"));
    assert!(!event.aggregated_fields.contains_key("latitude"));
  }

  #[test]
  fn finalize_reports_type_mismatch() {
    let mut w = EventWindow::open(quake(1, 2.0, "a"), Anchor::Root(Category::Earthquakes));
    w.fold(Record::new(day(2), Some("Earthquake")).with_field("deaths", FieldValue::Text("x".into())));
    let err = w.finalize(&Config::default()).unwrap_err();
    assert!(matches!(err, EngineError::FieldTypeMismatch { .. }));
  }

  #[test]
  #[should_panic(expected = "folded into")]
  fn fold_outside_window_panics() {
    let mut w = EventWindow::open(quake(1, 0.0, ""), Anchor::Root(Category::Earthquakes));
    w.fold(quake(9, 0.0, ""));
  }
}

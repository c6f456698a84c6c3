//! Drive the assembler over one region's records.

use tracing::{debug, info};

use crate::assembler::EventAssembler;
use crate::classify::TypeClassifier;
use crate::config::Config;
use crate::error::EngineError;
use crate::normalize;
use crate::queue::RecordQueue;
use crate::types::{Event, RawRecord, Record};

/// Groups a region's records into events. Holds no state between runs.
pub struct Aggregator<'a> {
  classifier: &'a TypeClassifier,
  config: &'a Config,
}

impl<'a> Aggregator<'a> {
  pub fn new(classifier: &'a TypeClassifier, config: &'a Config) -> Self {
    Self { classifier, config }
  }

  /// Drop rows with invalid dates, then group the rest.
  pub fn run(&self, raw: Vec<RawRecord>) -> Result<Vec<Event>, EngineError> {
    let total = raw.len();
    let records: Vec<Record> = raw
      .into_iter()
      .filter_map(|r| normalize::normalize(r, self.config))
      .collect();
    let dropped = total - records.len();
    if dropped > 0 {
      debug!(dropped, total, "dropped records with invalid dates");
    }
    self.run_records(records)
  }

  /// Stable-sort by date and group into events, in order of their triggers.
  pub fn run_records(&self, mut records: Vec<Record>) -> Result<Vec<Event>, EngineError> {
    records.sort_by_key(|r| r.occurred_on);
    let mut queue: RecordQueue = records.into_iter().collect();
    let assembler = EventAssembler::new(self.classifier, self.config);
    let mut events = Vec::new();
    let mut discarded = 0usize;

    while let Some(record) = queue.pop_front() {
      if !self.classifier.is_trigger(record.label()) {
        continue;
      }
      match assembler.assemble(record, &mut queue)? {
        Some(event) => events.push(event),
        None => discarded += 1,
      }
    }

    info!(events = events.len(), discarded, "grouped records into events");
    Ok(events)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::classify::tests::sample_classifier;
  use crate::types::{Anchor, Category, FieldValue, Fields};
  use chrono::{Days, NaiveDate};

  fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 9, 1).unwrap()
  }

  fn rec(offset: u64, label: &str, deaths: f64) -> Record {
    Record::new(base() + Days::new(offset), Some(label)).with_field("deaths", FieldValue::Number(deaths))
  }

  fn raw(date: &str, label: &str) -> RawRecord {
    let mut fields = Fields::new();
    fields.insert("deaths".into(), FieldValue::Number(1.0));
    RawRecord {
      date: date.into(),
      label: Some(label.into()),
      fields,
    }
  }

  fn group(records: Vec<Record>) -> Vec<Event> {
    let classifier = sample_classifier();
    let config = Config::default();
    Aggregator::new(&classifier, &config).run_records(records).unwrap()
  }

  #[test]
  fn empty_input_yields_no_events() {
    assert!(group(vec![]).is_empty());
    let classifier = sample_classifier();
    let config = Config::default();
    let events = Aggregator::new(&classifier, &config)
      .run(vec![raw("31/02/2020", "Flood"), raw("garbage", "Storm")])
      .unwrap();
    assert!(events.is_empty());
  }

  #[test]
  fn fatal_failure_discards_first_trigger() {
    let events = group(vec![
      rec(0, "Earthquake", 1.0),
      rec(1, "Flood", 1.0),
      rec(40, "Storm", 1.0),
      rec(60, "Landslide", 1.0),
    ]);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, Anchor::Root(Category::Storms));
  }

  #[test]
  fn consecutive_events_are_all_collected() {
    let events = group(vec![
      rec(0, "Storm", 1.0),
      rec(2, "Storm", 2.0),
      rec(10, "Flood", 4.0),
      rec(12, "Landslide", 8.0),
      rec(30, "Earthquake", 16.0),
      rec(50, "Landslide", 0.0),
    ]);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].aggregated_fields["deaths"], FieldValue::Number(3.0));
    assert_eq!(events[1].aggregated_fields["deaths"], FieldValue::Number(12.0));
    assert_eq!(events[2].aggregated_fields["deaths"], FieldValue::Number(16.0));
  }

  #[test]
  fn input_is_sorted_before_grouping() {
    let events = group(vec![
      rec(3, "Storm", 2.0),
      rec(40, "Landslide", 0.0),
      rec(0, "Storm", 1.0),
    ]);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].start_date, base());
    assert_eq!(events[0].member_count, 2);
  }

  #[test]
  fn leading_landslides_never_open_events() {
    let events = group(vec![rec(0, "Landslide", 1.0), rec(1, "Landslide", 1.0)]);
    assert!(events.is_empty());
  }

  #[test]
  fn repeated_runs_are_identical() {
    let input = vec![
      rec(0, "Flood", 1.0),
      rec(1, "Epidemic", 1.0),
      rec(2, "Flood", 1.0),
      rec(3, "Earthquake", 1.0),
      rec(20, "Storm", 1.0),
      rec(21, "Storm", 1.0),
      rec(40, "Flood", 1.0),
    ];
    assert_eq!(group(input.clone()), group(input));
  }
}

//! Pending records, oldest first, with push-front to hand a record back.

use std::collections::VecDeque;

use crate::types::Record;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQueue {
  records: VecDeque<Record>,
}

impl RecordQueue {
  pub fn pop_front(&mut self) -> Option<Record> {
    self.records.pop_front()
  }

  /// Un-consume a record so the next pop returns it again.
  pub fn push_front(&mut self, record: Record) {
    self.records.push_front(record);
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Record> {
    self.records.iter()
  }
}

impl FromIterator<Record> for RecordQueue {
  fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
    Self {
      records: iter.into_iter().collect(),
    }
  }
}

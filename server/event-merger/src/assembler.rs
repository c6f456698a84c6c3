//! Record-by-record state machine that grows one event from a trigger.
//!
//! Starting from a trigger record, each following record is either folded
//! into the window, skipped, handed back to the queue (closing the event),
//! or found to be a conflicting trigger inside the primary interval. The
//! last case is a fatal failure: the event is discarded and the poisoned run
//! that follows is consumed without producing anything, so the queue is
//! positioned correctly for the next trigger scan.

use tracing::debug;

use crate::classify::TypeClassifier;
use crate::config::Config;
use crate::error::EngineError;
use crate::queue::RecordQueue;
use crate::types::{Anchor, Event, Record};
use crate::window::EventWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
  /// Folding records into the trigger's event.
  Scanning,
  /// The trigger's event is lost; consume records until the run ends.
  FatalFailure,
}

/// What to do with one popped record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
  Skip,
  Conflict,
  Close,
  Keep,
}

pub struct EventAssembler<'a> {
  classifier: &'a TypeClassifier,
  config: &'a Config,
}

impl<'a> EventAssembler<'a> {
  pub fn new(classifier: &'a TypeClassifier, config: &'a Config) -> Self {
    Self { classifier, config }
  }

  /// Build the event opened by `trigger`, consuming its records from `queue`.
  ///
  /// Returns `Ok(None)` when the event was discarded by a fatal failure, or
  /// when the queue ran out before the window closed (unless
  /// `Config::emit_open_events` is set). Whatever was not consumed stays in
  /// `queue`, front first.
  ///
  /// Panics if `trigger` is not a trigger-type record.
  pub fn assemble(&self, trigger: Record, queue: &mut RecordQueue) -> Result<Option<Event>, EngineError> {
    let category = match self.classifier.canonicalize(trigger.label()) {
      Some(c) if c.is_trigger() => c,
      _ => panic!("event assembly seeded with non-trigger label {:?}", trigger.category_label),
    };

    let mut mode = Mode::Scanning;
    let mut window = EventWindow::open(trigger, Anchor::Root(category));

    while let Some(record) = queue.pop_front() {
      match self.step(&window, &record) {
        Step::Skip => {
          self.skip_run(queue);
        }
        Step::Conflict => {
          window = match mode {
            Mode::Scanning => {
              debug!(
                anchor = %window.anchor(),
                start = %window.start_date(),
                conflict = ?record.category_label,
                on = %record.occurred_on,
                "fatal failure, discarding event"
              );
              // Conflict implies the record is a trigger, so it has a category.
              let anchor = self
                .classifier
                .canonicalize(record.label())
                .map(Anchor::Root)
                .unwrap_or_else(|| Anchor::RawLabel(record.label().unwrap_or_default().to_string()));
              EventWindow::open(record, anchor)
            }
            Mode::FatalFailure => {
              // Cascading reset re-anchors on the raw label, not its category.
              let anchor = Anchor::RawLabel(record.label().unwrap_or_default().to_string());
              debug!(anchor = %anchor, on = %record.occurred_on, "cascading reset");
              EventWindow::open(record, anchor)
            }
          };
          mode = Mode::FatalFailure;
        }
        Step::Close => {
          queue.push_front(record);
          return match mode {
            Mode::Scanning => self.close(window).map(Some),
            Mode::FatalFailure => Ok(None),
          };
        }
        Step::Keep => {
          if mode == Mode::Scanning {
            window.fold(record);
          }
        }
      }
    }

    match mode {
      Mode::Scanning if self.config.emit_open_events => self.close(window).map(Some),
      Mode::Scanning => {
        debug!(
          anchor = %window.anchor(),
          start = %window.start_date(),
          members = window.members().len(),
          "records exhausted with window still open, no event"
        );
        Ok(None)
      }
      Mode::FatalFailure => Ok(None),
    }
  }

  fn step(&self, window: &EventWindow, record: &Record) -> Step {
    let label = record.label();
    if !self.classifier.is_required(label) {
      return Step::Skip;
    }
    let category = self.classifier.canonicalize(label);
    let is_other_trigger = !window.anchor().matches(category) && self.classifier.is_trigger(label);
    let inside_primary = window.in_primary(record);

    if is_other_trigger && inside_primary {
      Step::Conflict
    } else if is_other_trigger || (!inside_primary && !window.in_secondary(record)) {
      Step::Close
    } else {
      Step::Keep
    }
  }

  /// Drop records up to the next required-type one, which stays queued.
  fn skip_run(&self, queue: &mut RecordQueue) {
    while let Some(record) = queue.pop_front() {
      if self.classifier.is_required(record.label()) {
        queue.push_front(record);
        break;
      }
    }
  }

  fn close(&self, window: EventWindow) -> Result<Event, EngineError> {
    let event = window.finalize(self.config)?;
    debug!(
      event = %event.event_type,
      start = %event.start_date,
      members = event.member_count,
      "event closed"
    );
    Ok(event)
  }
}

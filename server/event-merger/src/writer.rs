//! Serialize events as one flat CSV row each.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use indexmap::IndexSet;

use crate::error::EngineError;
use crate::types::{Event, EVENT_METADATA_COLUMNS};

/// Write `events` to `path`, replacing any existing file.
pub fn write_events(path: &Path, events: &[Event]) -> Result<(), EngineError> {
  let file = File::create(path).map_err(|e| EngineError::io(path, e))?;
  write_csv(file, path, events)
}

/// Columns: every aggregated key in first-seen order, then the metadata
/// columns. Keys an event lacks are left empty.
pub fn write_events_to<W: Write>(writer: W, events: &[Event]) -> Result<(), EngineError> {
  write_csv(writer, Path::new("<writer>"), events)
}

/// `target` names the destination in io errors.
fn write_csv<W: Write>(writer: W, target: &Path, events: &[Event]) -> Result<(), EngineError> {
  let mut columns: IndexSet<String> = IndexSet::new();
  for event in events {
    columns.extend(
      event
        .aggregated_fields
        .keys()
        .filter(|k| !EVENT_METADATA_COLUMNS.contains(&k.as_str()))
        .cloned(),
    );
  }
  columns.extend(EVENT_METADATA_COLUMNS.iter().map(|c| c.to_string()));

  let mut out = csv::Writer::from_writer(writer);
  if events.is_empty() {
    out.flush().map_err(|e| EngineError::io(target, e))?;
    return Ok(());
  }
  out.write_record(&columns)?;
  for event in events {
    let row = event.to_row();
    let cells = columns.iter().map(|col| {
      row
        .iter()
        .rev()
        .find(|(k, _)| k == col)
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
    });
    out.write_record(cells)?;
  }
  out.flush().map_err(|e| EngineError::io(target, e))?;
  Ok(())
}

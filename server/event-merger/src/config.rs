//! Merger configuration with sane defaults.

/// Tunables for reading records and closing events.
#[derive(Debug, Clone)]
pub struct Config {
  /// Finalize a window that is still open when the records run out.
  /// Off by default: an unterminated window yields no event.
  pub emit_open_events: bool,
  /// chrono format of the `date` column.
  pub date_format: String,
  /// Sub-folder of the data dir holding one record file per region.
  pub record_folder: String,
  /// Sub-folder the merged event files are written to.
  pub event_folder: String,
  /// Sub-folder holding the category vocabulary lists.
  pub vocabulary_folder: String,
  /// Administrative columns never aggregated or written out.
  pub excluded_keys: Vec<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      emit_open_events: false,
      date_format: "%d/%m/%Y".into(),
      record_folder: "records".into(),
      event_folder: "events".into(),
      vocabulary_folder: "categorizations".into(),
      excluded_keys: [
        "serial", "level0", "level1", "level2", "approved", "latitude", "longitude", "uuid",
        "name0", "name1", "name2", "location",
      ]
      .iter()
      .map(|k| k.to_string())
      .collect(),
    }
  }
}

impl Config {
  pub fn is_excluded(&self, key: &str) -> bool {
    self.excluded_keys.iter().any(|k| k == key)
  }
}

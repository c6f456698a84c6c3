//! Merge step: every region file under `records/` becomes an event file
//! under `events/`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::aggregator::Aggregator;
use crate::classify::{TypeClassifier, Vocabulary};
use crate::config::Config;
use crate::error::EngineError;
use crate::source;
use crate::types::{Category, Event};
use crate::writer;

/// Events produced for one region file.
#[derive(Debug, Clone)]
pub struct RegionEvents {
  pub region: String,
  pub events: Vec<Event>,
}

/// Read one region file and group its records.
pub fn merge_region(path: &Path, classifier: &TypeClassifier, config: &Config) -> Result<Vec<Event>, EngineError> {
  let raw = source::read_records(path)?;
  info!(region = %path.display(), records = raw.len(), "read region records");
  Aggregator::new(classifier, config).run(raw)
}

/// Region files in `dir`, sorted by file name.
pub fn region_files(dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
  let entries = fs::read_dir(dir).map_err(|e| EngineError::io(dir, e))?;
  let mut files = Vec::new();
  for entry in entries {
    let path = entry.map_err(|e| EngineError::io(dir, e))?.path();
    if path.is_file() {
      files.push(path);
    }
  }
  files.sort();
  Ok(files)
}

/// Group every region under `data_dir` without writing anything.
pub fn collect_all(data_dir: &Path, config: &Config) -> Result<Vec<RegionEvents>, EngineError> {
  let vocabulary = Vocabulary::load_dir(&data_dir.join(&config.vocabulary_folder))?;
  for category in Category::ALL {
    if vocabulary.subtype_count(category) == 0 {
      warn!(category = %category, "empty vocabulary, no label will map to this category");
    }
  }
  let classifier = TypeClassifier::new(vocabulary);
  region_files(&data_dir.join(&config.record_folder))?
    .into_iter()
    .map(|path| {
      let events = merge_region(&path, &classifier, config)?;
      let region = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
      Ok(RegionEvents { region, events })
    })
    .collect()
}

/// Group every region and write `<event_folder>/<region file name>`.
///
/// Returns the number of events written per region.
pub fn merge_all(data_dir: &Path, config: &Config) -> Result<Vec<(String, usize)>, EngineError> {
  let output_dir = data_dir.join(&config.event_folder);
  fs::create_dir_all(&output_dir).map_err(|e| EngineError::io(&output_dir, e))?;

  collect_all(data_dir, config)?
    .into_iter()
    .map(|r| {
      writer::write_events(&output_dir.join(&r.region), &r.events)?;
      info!(region = %r.region, events = r.events.len(), "wrote events");
      Ok((r.region, r.events.len()))
    })
    .collect()
}

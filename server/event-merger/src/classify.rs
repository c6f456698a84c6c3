//! Map free-text disaster labels onto canonical root categories.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::EngineError;
use crate::types::Category;

/// Uppercased subtype strings per root category.
///
/// Lookup walks categories in `Category::ALL` order; a subtype listed under
/// two categories resolves to the first.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
  subtypes: Vec<(Category, HashSet<String>)>,
}

impl Vocabulary {
  /// Build from in-memory lists. Entries are normalized like file lines.
  pub fn from_lists<I, S>(lists: I) -> Self
  where
    I: IntoIterator<Item = (Category, Vec<S>)>,
    S: AsRef<str>,
  {
    let mut subtypes: Vec<(Category, HashSet<String>)> = lists
      .into_iter()
      .map(|(category, entries)| {
        let set = entries
          .iter()
          .filter_map(|e| normalize_entry(e.as_ref()))
          .collect();
        (category, set)
      })
      .collect();
    subtypes.sort_by_key(|(c, _)| *c);
    Self { subtypes }
  }

  /// Load `<CATEGORY>.txt` for each of the four categories from `dir`.
  pub fn load_dir(dir: &Path) -> Result<Self, EngineError> {
    let mut lists = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
      let path = dir.join(format!("{}.txt", category.name()));
      if !path.is_file() {
        return Err(EngineError::MissingVocabulary(category));
      }
      let text = fs::read_to_string(&path).map_err(|e| EngineError::io(&path, e))?;
      let entries: Vec<String> = text.lines().map(str::to_string).collect();
      debug!(category = %category, subtypes = entries.len(), "loaded vocabulary");
      lists.push((category, entries));
    }
    Ok(Self::from_lists(lists))
  }

  pub fn subtype_count(&self, category: Category) -> usize {
    self
      .subtypes
      .iter()
      .find(|(c, _)| *c == category)
      .map(|(_, s)| s.len())
      .unwrap_or(0)
  }
}

/// One vocabulary line: text before the first '.', trimmed and uppercased.
fn normalize_entry(line: &str) -> Option<String> {
  let head = line.split('.').next().unwrap_or("").trim();
  if head.is_empty() {
    None
  } else {
    Some(head.to_uppercase())
  }
}

/// Answers category, trigger and required-type questions about labels.
#[derive(Debug, Clone)]
pub struct TypeClassifier {
  vocabulary: Vocabulary,
}

impl TypeClassifier {
  pub fn new(vocabulary: Vocabulary) -> Self {
    Self { vocabulary }
  }

  pub fn canonicalize(&self, label: Option<&str>) -> Option<Category> {
    let label = label?;
    if label.is_empty() {
      return None;
    }
    let key = label.to_uppercase();
    self
      .vocabulary
      .subtypes
      .iter()
      .find(|(_, set)| set.contains(&key))
      .map(|(c, _)| *c)
  }

  pub fn is_trigger(&self, label: Option<&str>) -> bool {
    self.canonicalize(label).is_some_and(Category::is_trigger)
  }

  pub fn is_required(&self, label: Option<&str>) -> bool {
    self.canonicalize(label).is_some()
  }
}

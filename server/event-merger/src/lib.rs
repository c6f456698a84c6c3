//! Disaster event merger: deterministic temporal grouping of disaster records.
//!
//! Reads chronologically ordered records for one region, canonicalizes their
//! free-text disaster labels, and folds runs of related records into events
//! anchored at a trigger record (earthquake, flood or storm). An event whose
//! primary interval is hit by a conflicting trigger is discarded.
//!
//! No DB, no network; pure computation over flat files.

pub mod aggregator;
pub mod assembler;
pub mod classify;
pub mod config;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod queue;
pub mod source;
pub mod types;
pub mod window;
pub mod writer;

pub use aggregator::Aggregator;
pub use classify::{TypeClassifier, Vocabulary};
pub use config::Config;
pub use error::EngineError;
pub use types::{Category, Event, FieldValue, RawRecord, Record};

//! event-slicer: split merged event tables per trigger category
//!
//! Usage:
//!   event-slicer --data-dir data              # trim first 5% of each table
//!   event-slicer --data-dir data --no-slice   # split only
//!
//! Reads `<data>/events/<region>.csv` and writes
//! `<data>/sliced_data_sheets/<region>/<CATEGORY>.csv` (or
//! `unsliced_data_sheets` with `--no-slice`), one file per trigger category.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use csv::StringRecord;
use event_merger::{Category, EngineError};
use tracing::{info, warn};

const EVENT_COLUMN: &str = "event";

#[derive(Parser, Debug)]
#[command(version, about = "Split merged event tables per trigger category")]
struct Args {
    /// Data directory holding `events/`.
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Keep every row instead of dropping the leading fraction.
    #[arg(long)]
    no_slice: bool,

    /// Leading share of each category table to drop.
    #[arg(long, default_value_t = 0.05)]
    fraction: f64,
}

struct Table {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

/// Read a merged event table; `None` for an empty file.
fn read_table(path: &Path) -> Result<Option<Table>, EngineError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Ok(None);
    }
    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
    Ok(Some(Table { headers, rows }))
}

/// Rows of `table` whose event column names `category`, minus the leading
/// `floor(len * fraction)` rows.
fn slice_category<'t>(table: &'t Table, category: Category, fraction: f64) -> Vec<&'t StringRecord> {
    let idx = table.headers.iter().position(|h| h == EVENT_COLUMN);
    let selected: Vec<&StringRecord> = table
        .rows
        .iter()
        .filter(|r| idx.and_then(|i| r.get(i)) == Some(category.name()))
        .collect();
    let skip = (selected.len() as f64 * fraction).floor() as usize;
    selected.into_iter().skip(skip).collect()
}

fn slice_region(path: &Path, output_dir: &Path, fraction: f64) -> Result<usize, EngineError> {
    let table = match read_table(path)? {
        Some(t) => t,
        None => {
            warn!(region = %path.display(), "empty event table, skipped");
            return Ok(0);
        }
    };
    let region = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .and_then(|n| n.split('.').next().map(str::to_string))
        .unwrap_or_default();
    let region_dir = output_dir.join(&region);
    fs::create_dir_all(&region_dir).map_err(|e| EngineError::io(&region_dir, e))?;

    let mut written = 0;
    for category in Category::TRIGGERS {
        let rows = slice_category(&table, category, fraction);
        let mut out = csv::Writer::from_path(region_dir.join(format!("{}.csv", category.name())))?;
        out.write_record(&table.headers)?;
        for row in &rows {
            out.write_record(*row)?;
        }
        out.flush().map_err(|e| EngineError::io(&region_dir, e))?;
        written += rows.len();
    }
    info!(region = %region, rows = written, "sliced region");
    Ok(written)
}

fn run(args: &Args) -> Result<(), EngineError> {
    let event_dir = args.data_dir.join("events");
    let output_dir = args.data_dir.join(if args.no_slice {
        "unsliced_data_sheets"
    } else {
        "sliced_data_sheets"
    });
    fs::create_dir_all(&output_dir).map_err(|e| EngineError::io(&output_dir, e))?;

    let fraction = if args.no_slice { 0.0 } else { args.fraction };
    for path in event_merger::merge::region_files(&event_dir)? {
        slice_region(&path, &output_dir, fraction)?;
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if !(0.0..1.0).contains(&args.fraction) {
        eprintln!("event-slicer: --fraction must be in [0, 1)");
        process::exit(2);
    }
    if let Err(e) = run(&args) {
        eprintln!("event-slicer: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(events: &[&str]) -> Table {
        Table {
            headers: StringRecord::from(vec!["deaths", "event", "start_date"]),
            rows: events
                .iter()
                .enumerate()
                .map(|(i, e)| StringRecord::from(vec![i.to_string(), e.to_string(), "2020-01-01".into()]))
                .collect(),
        }
    }

    #[test]
    fn selects_only_matching_category() {
        let t = table(&["STORMS", "FLOODS", "STORMS", "Storm"]);
        let rows = slice_category(&t, Category::Storms, 0.0);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get(0), Some("2"));
    }

    #[test]
    fn drops_leading_fraction_rounded_down() {
        let events: Vec<&str> = std::iter::repeat("FLOODS").take(40).collect();
        let t = table(&events);
        let rows = slice_category(&t, Category::Floods, 0.05);
        assert_eq!(rows.len(), 38);
        assert_eq!(rows[0].get(0), Some("2"));

        let small = table(&["FLOODS"; 19]);
        assert_eq!(slice_category(&small, Category::Floods, 0.05).len(), 19);
    }

    #[test]
    fn slice_region_writes_one_file_per_trigger_category() {
        let dir = tempfile::tempdir().unwrap();
        let events = dir.path().join("atlantis.csv");
        fs::write(
            &events,
            "deaths,event,start_date\n1,STORMS,2020-01-01\n2,FLOODS,2020-02-01\n",
        )
        .unwrap();
        let out = dir.path().join("sliced");
        assert_eq!(slice_region(&events, &out, 0.05).unwrap(), 2);

        for name in ["STORMS", "FLOODS", "EARTHQUAKES"] {
            assert!(out.join("atlantis").join(format!("{}.csv", name)).exists());
        }
        let floods = fs::read_to_string(out.join("atlantis/FLOODS.csv")).unwrap();
        let lines: Vec<&str> = floods.lines().collect();
        assert_eq!(lines, vec!["deaths,event,start_date", "2,FLOODS,2020-02-01"]);
    }

    #[test]
    fn empty_table_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let events = dir.path().join("empty.csv");
        fs::write(&events, "").unwrap();
        assert_eq!(slice_region(&events, &dir.path().join("out"), 0.05).unwrap(), 0);
        assert!(!dir.path().join("out/empty").exists());
    }
}

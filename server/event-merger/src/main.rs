//! Binary entrypoint: merge every region under a data directory.
//!
//! Expects `<data>/records/*.csv` and `<data>/categorizations/{STORMS,FLOODS,
//! EARTHQUAKES,LANDSLIDES}.txt`. Writes `<data>/events/<region>.csv`, or with
//! `--json` prints one JSON line per event to stdout instead.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use event_merger::{merge, Config, EngineError, Event};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(version, about = "Group per-region disaster records into events")]
struct Args {
  /// Data directory holding `records/` and `categorizations/`.
  #[arg(short, long, default_value = "data")]
  data_dir: PathBuf,

  /// Close windows still open when a region's records run out.
  #[arg(long)]
  emit_open_events: bool,

  /// Print events as JSON lines instead of writing event files.
  #[arg(long)]
  json: bool,
}

#[derive(Serialize)]
struct EventLine<'a> {
  region: &'a str,
  #[serde(flatten)]
  event: &'a Event,
}

fn main() {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .init();

  let args = Args::parse();
  let config = Config {
    emit_open_events: args.emit_open_events,
    ..Config::default()
  };

  if let Err(e) = run(&args, &config) {
    let _ = writeln!(io::stderr(), "event-merger: {}", e);
    std::process::exit(1);
  }
}

fn run(args: &Args, config: &Config) -> Result<(), EngineError> {
  if !args.json {
    merge::merge_all(&args.data_dir, config)?;
    return Ok(());
  }

  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  for region in merge::collect_all(&args.data_dir, config)? {
    for event in &region.events {
      let line = EventLine {
        region: &region.region,
        event,
      };
      serde_json::to_writer(&mut out, &line)?;
      writeln!(out).map_err(|e| EngineError::io("<stdout>", e))?;
    }
  }
  out.flush().map_err(|e| EngineError::io("<stdout>", e))?;
  Ok(())
}

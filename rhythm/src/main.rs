mod output;

use self::output::Output;
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use rhythm_lib::{Engine, Source, SourceEntry, SourceFrame, Stats, TouchSink, Touches};
use std::{path::PathBuf, time::Instant};
use tracing_subscriber::EnvFilter;

/// Frames decoded ahead of the encoder.
const LOAD_CHUNK: usize = 32;

/// Simulates rhythm on a folder of frames and saves the decoded frames,
/// the encoded captures and touch statistics.
#[derive(Debug, Parser)]
#[command(name = "rhythm", version)]
struct Args {
    /// Folder with the input frames, processed in file name order.
    #[arg(short, long)]
    input: PathBuf,

    /// Output folder; created if it doesn't exist.
    #[arg(short, long)]
    output: PathBuf,

    /// Folder with one region file per frame.
    #[arg(short, long)]
    region: PathBuf,

    /// Also write the synthetic address trace to `<output>/trace.txt`.
    #[arg(short, long)]
    trace: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let output = Output::create(&args.output)?;
    let source = Source::from_dirs(&args.input, &args.region)?;

    if source.is_empty() {
        tracing::warn!(input = %args.input.display(), "no frames found");
        return Ok(());
    }

    tracing::info!("Starting processing on {} frames", source.len());

    let start = Instant::now();

    let stats = if args.trace {
        let trace = output.trace_writer()?;
        let (stats, trace) = perform_run(Engine::new(trace), &source, &output)?;
        let records = trace.len();

        trace.finish().context("Couldn't write trace")?;
        tracing::info!(records, "trace written");
        stats
    } else {
        perform_run(Engine::default(), &source, &output)?.0
    };

    output.save_stats("total.csv", &stats.write, &stats.read)?;

    report("written", &stats.write, "in total");
    report("read", &stats.read, "in total");

    tracing::info!(
        "Completed in {:.2?}! Check {} for decoded/encoded frames and statistics",
        start.elapsed(),
        args.output.display()
    );

    Ok(())
}

/// Decodes the frames of `entries` in parallel.
fn load_frames(entries: &[SourceEntry]) -> Result<Vec<SourceFrame>> {
    entries.par_iter().map(|entry| entry.load()).collect()
}

/// Runs every frame of `source` through `engine`, loading at most
/// `LOAD_CHUNK` frames ahead.
fn perform_run<S: TouchSink>(
    mut engine: Engine<S>,
    source: &Source,
    output: &Output,
) -> Result<(Stats, S)> {
    let bar = ProgressBar::new(source.len() as u64);

    bar.set_style(
        ProgressStyle::default_bar().template("{bar:40} {pos}/{len} ({percent}%) {msg}"),
    );

    for entries in source.entries().chunks(LOAD_CHUNK) {
        bar.set_message("loading");

        for frame in load_frames(entries)? {
            let out = engine
                .add(&frame.image, &frame.regions)
                .with_context(|| format!("Couldn't process frame: {}", frame.name))?;

            output.save_frame(&frame, &out)?;

            report("written", &out.stats.write, "for this frame");
            report("read", &out.stats.read, "for this frame");

            bar.set_message(frame.name);
            bar.inc(1);
        }
    }

    bar.finish_and_clear();

    Ok(engine.finish())
}

fn report(verb: &str, touches: &Touches, scope: &str) {
    tracing::info!(
        "{:.2} MB estimated {} with {} pixel touches, {} bitmask touches, and {} row offset touches {}",
        touches.megabytes(),
        verb,
        touches.pixels,
        touches.bitmask,
        touches.row_offsets,
        scope,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhythm_lib::{AddressMap, Params, RgbImage};
    use std::fs;
    use tracing_test::traced_test;

    fn write_frames(count: usize) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();

        for idx in 0..count {
            RgbImage::new(2, 1)
                .save(dir.path().join(format!("{:03}.png", idx)))
                .unwrap();
        }

        dir
    }

    #[test]
    #[traced_test]
    fn runs_across_load_chunks() {
        let count = LOAD_CHUNK + 3;
        let frames = write_frames(count);
        let regions = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let source = Source::from_dirs(frames.path(), regions.path()).unwrap();
        let output = Output::create(out.path()).unwrap();
        let trace = output.trace_writer().unwrap();

        let (stats, trace) = perform_run(Engine::new(trace), &source, &output).unwrap();
        let records = trace.len();

        trace.finish().unwrap();

        assert_eq!(stats.frames, count);
        assert!(out.path().join(format!("{:03}.png", count - 1)).is_file());
        assert!(out.path().join("stats").join("000.csv").is_file());
        assert!(logs_contain("touches for this frame"));

        let written = fs::read_to_string(out.path().join("trace.txt")).unwrap();

        assert_eq!(written.lines().count(), records);

        let map = AddressMap::new(&Params::new(2, 1).unwrap());

        assert_eq!(
            written.lines().next(),
            Some(format!("{:#x} W", map.row_offset(0, 0)).as_str())
        );
    }
}

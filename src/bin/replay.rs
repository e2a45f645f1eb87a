use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use serde::Serialize;

use dermograph_tracker::export::{load_session, SessionFile};
use dermograph_tracker::logger::init_logger;
use dermograph_tracker::types::{TrajectoryPoint, Vec2};

#[derive(Parser, Debug)]
struct Args {
    /// Path to session_*.json[.gz]
    #[arg(long, conflicts_with = "dir")]
    session: Option<PathBuf>,

    /// Directory of sessions to summarize (processes session_*.json[.gz])
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    file: String,
    mode: String,
    points: usize,
    samples_processed: u64,
    time_span: f64,
    stored_distance: f64,
    recomputed_distance: f64,
    peak_speed: f64,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

fn path_length(points: &[TrajectoryPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| {
            Vec2::new(
                w[1].position.x - w[0].position.x,
                w[1].position.y - w[0].position.y,
            )
            .magnitude()
        })
        .sum()
}

fn summarize(path: &Path, session: &SessionFile) -> Summary {
    let points = session.points();
    let (min_x, max_x, min_y, max_y) = points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(min_x, max_x, min_y, max_y), p| {
            (
                min_x.min(p.position.x),
                max_x.max(p.position.x),
                min_y.min(p.position.y),
                max_y.max(p.position.y),
            )
        },
    );
    let time_span = match (points.first(), points.last()) {
        (Some(first), Some(last)) => last.timestamp - first.timestamp,
        _ => 0.0,
    };
    // stored distance includes travel before the oldest kept point
    let stored_distance = match (points.first(), points.last()) {
        (Some(first), Some(last)) => last.cumulative_distance - first.cumulative_distance,
        _ => 0.0,
    };

    Summary {
        file: path.display().to_string(),
        mode: session.metadata.mode.to_string(),
        points: points.len(),
        samples_processed: session.stats.samples_processed,
        time_span,
        stored_distance,
        recomputed_distance: path_length(&points),
        peak_speed: points
            .iter()
            .map(|p| p.velocity_magnitude)
            .fold(0.0, f64::max),
        min_x,
        max_x,
        min_y,
        max_y,
    }
}

fn print_summary(summary: &Summary) {
    println!("=== {} ===", summary.file);
    println!("  Mode: {}", summary.mode);
    println!(
        "  Points: {} (of {} samples)",
        summary.points, summary.samples_processed
    );
    println!("  Time span: {:.2} s", summary.time_span);
    println!(
        "  Distance: stored {:.4} m, recomputed {:.4} m",
        summary.stored_distance, summary.recomputed_distance
    );
    println!("  Peak speed: {:.4} m/s", summary.peak_speed);
    if summary.points > 0 {
        println!(
            "  Bounds: x [{:.4}, {:.4}] y [{:.4}, {:.4}]",
            summary.min_x, summary.max_x, summary.min_y, summary.max_y
        );
    }
}

fn session_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("session_") && (n.ends_with(".json") || n.ends_with(".json.gz")))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let files = match (&args.session, &args.dir) {
        (Some(path), _) => vec![path.clone()],
        (None, Some(dir)) => session_files(dir)?,
        (None, None) => anyhow::bail!("pass --session <file> or --dir <directory>"),
    };

    let mut summaries = Vec::new();
    for path in &files {
        match load_session(path) {
            Ok(session) => summaries.push(summarize(path, &session)),
            Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for summary in &summaries {
            print_summary(summary);
        }
        println!("{} session(s) summarized", summaries.len());
    }
    Ok(())
}

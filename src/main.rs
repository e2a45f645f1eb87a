use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::{Path, PathBuf};
use tokio::time::{sleep, sleep_until, Duration, Instant};

use dermograph_tracker::config::{AppConfig, TimeSource};
use dermograph_tracker::export::{
    save_session, save_trajectory_csv, session_filename, SessionFile,
};
use dermograph_tracker::live_status::{current_timestamp, LiveStatus};
use dermograph_tracker::logger::init_logger;
use dermograph_tracker::pipeline::{run_ticks, PipelineHandle};
use dermograph_tracker::simulator::SignalGenerator;
use dermograph_tracker::tracker::MotionTracker;
use dermograph_tracker::types::{SimulationMode, StateSnapshot};

#[derive(Parser, Debug)]
#[command(name = "dermograph_tracker")]
#[command(about = "Synthetic dermograph IMU stream with planar trajectory tracking", long_about = None)]
struct Args {
    /// TOML configuration file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Motion pattern (demo, random, replay)
    #[arg(long)]
    mode: Option<SimulationMode>,

    /// Pattern speed multiplier
    #[arg(long)]
    speed: Option<f64>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Low-pass coefficient in (0, 1]
    #[arg(long)]
    filter_alpha: Option<f64>,

    /// Trajectory points kept in memory
    #[arg(long)]
    capacity: Option<usize>,

    /// Noise seed
    #[arg(long)]
    seed: Option<u64>,

    /// Keep gravity in the z acceleration
    #[arg(long)]
    no_gravity_compensation: bool,

    /// Duration in seconds (0 = until Ctrl-C)
    #[arg(long, default_value = "0")]
    duration: u64,

    /// Run this many ticks back to back on a simulated clock, then exit
    #[arg(long)]
    ticks: Option<usize>,

    /// Output directory
    #[arg(long)]
    output_dir: Option<String>,

    /// Write the session as .json.gz
    #[arg(long)]
    gzip: bool,

    /// Also write the final trajectory as CSV next to the session
    #[arg(long)]
    csv: bool,
}

impl Args {
    fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => AppConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.generator.mode = mode;
        }
        if let Some(speed) = self.speed {
            config.generator.speed = speed;
        }
        if let Some(rate) = self.sample_rate {
            config.generator.sample_rate = rate;
        }
        if let Some(seed) = self.seed {
            config.generator.seed = Some(seed);
        }
        if let Some(alpha) = self.filter_alpha {
            config.tracker.filter_alpha = alpha;
        }
        if let Some(capacity) = self.capacity {
            config.tracker.max_trajectory_points = capacity;
        }
        if self.no_gravity_compensation {
            config.tracker.gravity_compensation = false;
        }
        if let Some(dir) = &self.output_dir {
            config.pipeline.output_dir = dir.clone();
        }
        if self.ticks.is_some() {
            config.generator.time_source = TimeSource::Simulated {
                start: current_timestamp(),
            };
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();
    let config = args.resolve_config()?;

    info!("Dermograph tracker starting");
    info!(
        "  Mode: {} at {:.2}x, {} Hz",
        config.generator.mode, config.generator.speed, config.generator.sample_rate
    );
    info!(
        "  Filter alpha: {}, capacity: {}, gravity compensation: {}",
        config.tracker.filter_alpha,
        config.tracker.max_trajectory_points,
        config.tracker.gravity_compensation
    );
    info!("  Output dir: {}", config.pipeline.output_dir);

    let output_dir = config.pipeline.output_path();
    std::fs::create_dir_all(&output_dir)?;

    let mut generator = SignalGenerator::new(config.generator)?;
    let mut tracker = MotionTracker::new(config.tracker)?;

    let (generator, tracker, uptime) = match args.ticks {
        Some(ticks) => {
            let start = Instant::now();
            run_ticks(&mut generator, &mut tracker, ticks);
            (generator, tracker, start.elapsed().as_secs())
        }
        None => run_realtime(generator, tracker, &config, args.duration).await?,
    };

    let session = SessionFile::capture(generator.config(), &tracker);
    let filename = session_filename(&output_dir, Some("final"), args.gzip);
    save_session(&session, &filename)?;
    if args.csv {
        let csv_path = session_filename(&output_dir, Some("final"), false).with_extension("csv");
        save_trajectory_csv(&session.trajectory, &csv_path)?;
    }

    let final_status = LiveStatus::from_state(
        &tracker.current_state(),
        tracker.samples_processed(),
        generator.mode(),
        generator.speed(),
        uptime,
    );
    write_status(&final_status, &output_dir.join("live_status_final.json"));

    print_stats(&tracker.current_state(), generator.samples_generated(), &filename);
    Ok(())
}

async fn run_realtime(
    generator: SignalGenerator,
    tracker: MotionTracker,
    config: &AppConfig,
    duration: u64,
) -> Result<(SignalGenerator, MotionTracker, u64)> {
    let output_dir = config.pipeline.output_path();
    let status_path = output_dir.join("live_status.json");
    let status_interval = Duration::from_secs_f64(config.pipeline.status_interval_secs);

    let handle = PipelineHandle::spawn(generator, tracker, &config.pipeline)?;
    let start = Instant::now();
    let deadline = (duration > 0).then(|| start + Duration::from_secs(duration));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, stopping");
                break;
            }
            _ = until(deadline) => {
                info!("Duration of {}s reached", duration);
                break;
            }
            _ = sleep(status_interval) => {
                let uptime = start.elapsed().as_secs();
                let view = handle.view();
                write_status(&LiveStatus::from_view(&view, uptime), &status_path);
                info!(
                    "t={}s samples={} pos=({:.3}, {:.3}) speed={:.3} m/s distance={:.3} m",
                    uptime,
                    view.samples_processed,
                    view.state.position.x,
                    view.state.position.y,
                    view.state.velocity_magnitude,
                    view.state.total_distance
                );
            }
        }

        if !handle.is_running() {
            warn!("Pipeline exited on its own");
            break;
        }
    }

    let uptime = start.elapsed().as_secs();
    let (generator, tracker) = handle.stop().await?;
    Ok((generator, tracker, uptime))
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn write_status(status: &LiveStatus, path: &Path) {
    if let Err(e) = status.save(path) {
        warn!("Failed to write {}: {}", path.display(), e);
    }
}

fn print_stats(state: &StateSnapshot, samples: u64, filename: &Path) {
    println!("\n=== Final Stats ===");
    println!("Samples generated: {}", samples);
    println!("Trajectory points: {}", state.trajectory_length);
    println!(
        "Final position: ({:.3}, {:.3}) m",
        state.position.x, state.position.y
    );
    println!("Peak velocity: {:.3} m/s", state.max_velocity);
    println!("Total distance: {:.3} m", state.total_distance);
    println!("Session: {}", filename.display());
}

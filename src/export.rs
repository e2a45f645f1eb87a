//! Session files: metadata, summary and the flat trajectory records.
//!
//! Written as pretty JSON; a `.gz` extension switches on gzip both ways.
//! The trajectory alone can also go to CSV, one `ExportRecord` per row.

use chrono::Utc;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{GeneratorConfig, TrackerConfig};
use crate::error::TrackResult;
use crate::tracker::MotionTracker;
use crate::types::{ExportRecord, SimulationMode, StateSnapshot, TrajectoryPoint, Vec2};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub created_at: String,
    pub mode: SimulationMode,
    pub speed: f64,
    pub sample_rate: f64,
    pub seed: Option<u64>,
    pub filter_alpha: f64,
    pub gravity_compensation: bool,
    pub max_trajectory_points: usize,
}

impl SessionMetadata {
    pub fn new(generator: &GeneratorConfig, tracker: &TrackerConfig) -> Self {
        SessionMetadata {
            created_at: Utc::now().to_rfc3339(),
            mode: generator.mode,
            speed: generator.speed,
            sample_rate: generator.sample_rate,
            seed: generator.seed,
            filter_alpha: tracker.filter_alpha,
            gravity_compensation: tracker.gravity_compensation,
            max_trajectory_points: tracker.max_trajectory_points,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub samples_processed: u64,
    pub stored_points: usize,
    /// Seconds between the first and last stored point
    pub duration: f64,
    pub total_distance: f64,
    pub max_velocity: f64,
    pub final_position: Vec2,
}

impl SessionStats {
    pub fn from_tracker(tracker: &MotionTracker) -> Self {
        let state: StateSnapshot = tracker.current_state();
        let points = tracker.get_trajectory(None);
        let duration = match (points.first(), points.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        };
        SessionStats {
            samples_processed: tracker.samples_processed(),
            stored_points: points.len(),
            duration,
            total_distance: state.total_distance,
            max_velocity: state.max_velocity,
            final_position: state.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    pub metadata: SessionMetadata,
    pub stats: SessionStats,
    pub trajectory: Vec<ExportRecord>,
}

impl SessionFile {
    pub fn capture(generator: &GeneratorConfig, tracker: &MotionTracker) -> Self {
        SessionFile {
            metadata: SessionMetadata::new(generator, tracker.config()),
            stats: SessionStats::from_tracker(tracker),
            trajectory: tracker.export_trajectory(),
        }
    }

    /// Reloaded points; angular velocity comes back as zero.
    pub fn points(&self) -> Vec<TrajectoryPoint> {
        records_to_points(&self.trajectory)
    }
}

pub fn records_to_points(records: &[ExportRecord]) -> Vec<TrajectoryPoint> {
    records.iter().copied().map(TrajectoryPoint::from).collect()
}

fn is_gzip(path: &Path) -> bool {
    path.extension().map(|e| e == "gz").unwrap_or(false)
}

pub fn save_session(session: &SessionFile, path: &Path) -> TrackResult<()> {
    let file = File::create(path)?;
    if is_gzip(path) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer_pretty(&mut encoder, session)?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, session)?;
        writer.flush()?;
    }
    info!(
        "Saved session with {} points to {}",
        session.trajectory.len(),
        path.display()
    );
    Ok(())
}

pub fn load_session(path: &Path) -> TrackResult<SessionFile> {
    let file = File::open(path)?;
    if is_gzip(path) {
        let reader = BufReader::new(GzDecoder::new(file));
        Ok(serde_json::from_reader(reader)?)
    } else {
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Header row from the `ExportRecord` field names, then one row per point.
pub fn save_trajectory_csv(records: &[ExportRecord], path: &Path) -> TrackResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!("Saved {} trajectory rows to {}", records.len(), path.display());
    Ok(())
}

pub fn load_trajectory_csv(path: &Path) -> TrackResult<Vec<ExportRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// `<dir>/session_<UTC timestamp>[_suffix].json[.gz]`
pub fn session_filename(dir: &Path, suffix: Option<&str>, gzip: bool) -> PathBuf {
    let mut name = format!("session_{}", Utc::now().format("%Y%m%d_%H%M%S"));
    if let Some(suffix) = suffix {
        name.push('_');
        name.push_str(suffix);
    }
    name.push_str(if gzip { ".json.gz" } else { ".json" });
    dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NoiseConfig, TimeSource};
    use crate::pipeline::run_ticks;
    use crate::simulator::SignalGenerator;
    use crate::types::Vec3;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dermograph_{}_{}", std::process::id(), name))
    }

    fn recorded_session(ticks: usize) -> (SessionFile, MotionTracker) {
        let generator_config = GeneratorConfig {
            time_source: TimeSource::Simulated { start: 0.0 },
            noise: NoiseConfig::noiseless(),
            ..GeneratorConfig::default()
        };
        let mut generator = SignalGenerator::new(generator_config).unwrap();
        let mut tracker = MotionTracker::new(TrackerConfig::default()).unwrap();
        run_ticks(&mut generator, &mut tracker, ticks);
        (SessionFile::capture(generator.config(), &tracker), tracker)
    }

    #[test]
    fn test_capture_summarizes_tracker() {
        let (session, tracker) = recorded_session(60);
        assert_eq!(session.trajectory.len(), 60);
        assert_eq!(session.stats.samples_processed, 60);
        assert_eq!(session.stats.total_distance, tracker.current_state().total_distance);
        // 59 intervals of 0.02 s
        assert!((session.stats.duration - 1.18).abs() < 1e-9);
        assert_eq!(session.metadata.mode, SimulationMode::Demo);
        assert_eq!(session.metadata.seed, Some(42));
    }

    #[test]
    fn test_json_round_trip_zeroes_angular_velocity() {
        let (session, tracker) = recorded_session(25);
        let path = temp_path("session.json");
        save_session(&session, &path).unwrap();
        let loaded = load_session(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, session);
        let original = tracker.get_trajectory(None);
        let points = loaded.points();
        assert_eq!(points.len(), original.len());
        for (reloaded, point) in points.iter().zip(&original) {
            assert_eq!(reloaded.position, point.position);
            assert_eq!(reloaded.orientation, point.orientation);
            assert_eq!(reloaded.angular_velocity, Vec3::ZERO);
        }
    }

    #[test]
    fn test_gzip_round_trip() {
        let (session, _) = recorded_session(40);
        let path = temp_path("session.json.gz");
        save_session(&session, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

        let loaded = load_session(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_csv_trajectory_round_trip() {
        let (session, _) = recorded_session(30);
        let path = temp_path("trajectory.csv");
        save_trajectory_csv(&session.trajectory, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "timestamp,x,y,vx,vy,velocity_magnitude,ax,ay,az,roll,pitch,yaw,total_distance"
        );
        assert_eq!(text.lines().count(), 31);

        let loaded = load_trajectory_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, session.trajectory);
    }

    #[test]
    fn test_csv_without_points_is_empty() {
        let path = temp_path("empty.csv");
        save_trajectory_csv(&[], &path).unwrap();
        let loaded = load_trajectory_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = load_session(&temp_path("does_not_exist.json"));
        assert!(matches!(result, Err(crate::error::MotionTrackerError::Io(_))));
    }

    #[test]
    fn test_session_filename() {
        let dir = Path::new("out");
        let plain = session_filename(dir, None, false);
        let final_gz = session_filename(dir, Some("final"), true);
        let plain = plain.to_string_lossy();
        let final_gz = final_gz.to_string_lossy();
        assert!(plain.starts_with("out/session_") && plain.ends_with(".json"));
        assert!(final_gz.ends_with("_final.json.gz"));

        let csv = session_filename(dir, Some("final"), false).with_extension("csv");
        assert!(csv.to_string_lossy().ends_with("_final.csv"));
    }
}

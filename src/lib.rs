//! Synthetic IMU stream and planar motion tracker for a handheld dermograph.
//!
//! `simulator` produces `SensorSample`s from a ground-truth motion model;
//! `tracker` reconstructs the drawing-plane trajectory from those samples
//! alone. `pipeline` runs the two as producer and consumer tasks.

pub mod config;
pub mod error;
pub mod export;
pub mod filters;
pub mod live_status;
pub mod logger;
pub mod orientation;
pub mod pipeline;
pub mod simulator;
pub mod tracker;
pub mod types;

pub use config::{AppConfig, GeneratorConfig, NoiseConfig, PipelineConfig, TimeSource, TrackerConfig};
pub use error::{MotionTrackerError, TrackResult};
pub use pipeline::{run_ticks, PipelineHandle, SharedView};
pub use simulator::SignalGenerator;
pub use tracker::MotionTracker;
pub use types::{
    EulerAngles, ExportRecord, Quaternion, SensorSample, SimulationMode, StateSnapshot,
    TrajectoryPoint, Vec2, Vec3,
};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::pipeline::SharedView;
use crate::types::{EulerAngles, SimulationMode, StateSnapshot, Vec2};

/// Status file rewritten periodically for external monitors.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LiveStatus {
    pub timestamp: f64,
    pub uptime_seconds: u64,
    pub samples_processed: u64,
    pub mode: SimulationMode,
    pub speed_multiplier: f64,
    // Tracker estimate
    pub position: Vec2,
    pub velocity_magnitude: f64,
    pub max_velocity: f64,
    pub total_distance: f64,
    pub orientation: EulerAngles,
    pub trajectory_length: usize,
}

impl LiveStatus {
    pub fn new() -> Self {
        Self {
            timestamp: current_timestamp(),
            uptime_seconds: 0,
            samples_processed: 0,
            mode: SimulationMode::Demo,
            speed_multiplier: 1.0,
            position: Vec2::ZERO,
            velocity_magnitude: 0.0,
            max_velocity: 0.0,
            total_distance: 0.0,
            orientation: EulerAngles::ZERO,
            trajectory_length: 0,
        }
    }

    pub fn from_view(view: &SharedView, uptime_seconds: u64) -> Self {
        Self::from_state(
            &view.state,
            view.samples_processed,
            view.mode,
            view.speed,
            uptime_seconds,
        )
    }

    pub fn from_state(
        state: &StateSnapshot,
        samples_processed: u64,
        mode: SimulationMode,
        speed_multiplier: f64,
        uptime_seconds: u64,
    ) -> Self {
        Self {
            timestamp: current_timestamp(),
            uptime_seconds,
            samples_processed,
            mode,
            speed_multiplier,
            position: state.position,
            velocity_magnitude: state.velocity_magnitude,
            max_velocity: state.max_velocity,
            total_distance: state.total_distance,
            orientation: state.orientation,
            trajectory_length: state.trajectory_length,
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl Default for LiveStatus {
    fn default() -> Self {
        Self::new()
    }
}

pub fn current_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

pub mod linalg;

pub use linalg::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MotionTrackerError;

/// Standard gravity as reported on the sensor z axis, m/s²
pub const GRAVITY: f64 = 9.81;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// Orientation quaternion as reported by the sensor, scalar last.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Roll/pitch/yaw in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl EulerAngles {
    pub const ZERO: EulerAngles = EulerAngles {
        roll: 0.0,
        pitch: 0.0,
        yaw: 0.0,
    };

    pub const fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }
}

/// Motion pattern driving the signal generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMode {
    #[default]
    Demo,
    Random,
    /// Playback is handled outside the generator; the raw signal is all zero.
    Replay,
}

impl SimulationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationMode::Demo => "demo",
            SimulationMode::Random => "random",
            SimulationMode::Replay => "replay",
        }
    }
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimulationMode {
    type Err = MotionTrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(SimulationMode::Demo),
            "random" => Ok(SimulationMode::Random),
            "replay" => Ok(SimulationMode::Replay),
            other => Err(MotionTrackerError::Configuration(format!(
                "unknown simulation mode '{}' (expected demo, random or replay)",
                other
            ))),
        }
    }
}

/// One synthetic IMU reading. This is everything the tracker gets to see.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    /// Seconds, monotonically increasing
    pub timestamp: f64,
    /// m/s², includes bias, noise and +9.81 on z
    pub linear_acceleration: Vec3,
    /// rad/s, includes bias and noise
    pub angular_velocity: Vec3,
    pub orientation: Quaternion,
    /// µT, informational only
    pub magnetic_field: Vec3,
}

/// Tracker output for a single processed sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub timestamp: f64,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Filtered acceleration, z gravity-compensated when enabled
    pub acceleration: Vec3,
    pub orientation: EulerAngles,
    /// Filtered angular velocity
    pub angular_velocity: Vec3,
    pub velocity_magnitude: f64,
    pub cumulative_distance: f64,
}

impl TrajectoryPoint {
    /// Pressure indication used by renderers (gravity-compensated z).
    pub fn z_acceleration(&self) -> f64 {
        self.acceleration.z
    }
}

/// Read-only view of the tracker's current estimate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec3,
    pub orientation: EulerAngles,
    pub angular_velocity: Vec3,
    pub velocity_magnitude: f64,
    pub max_velocity: f64,
    pub total_distance: f64,
    pub trajectory_length: usize,
}

/// Flat, persistence-ready form of a trajectory point.
///
/// Angular velocity is not part of the record; reloading yields zero rates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub velocity_magnitude: f64,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub total_distance: f64,
}

impl From<&TrajectoryPoint> for ExportRecord {
    fn from(p: &TrajectoryPoint) -> Self {
        Self {
            timestamp: p.timestamp,
            x: p.position.x,
            y: p.position.y,
            vx: p.velocity.x,
            vy: p.velocity.y,
            velocity_magnitude: p.velocity_magnitude,
            ax: p.acceleration.x,
            ay: p.acceleration.y,
            az: p.acceleration.z,
            roll: p.orientation.roll,
            pitch: p.orientation.pitch,
            yaw: p.orientation.yaw,
            total_distance: p.cumulative_distance,
        }
    }
}

impl From<ExportRecord> for TrajectoryPoint {
    fn from(r: ExportRecord) -> Self {
        Self {
            timestamp: r.timestamp,
            position: Vec2::new(r.x, r.y),
            velocity: Vec2::new(r.vx, r.vy),
            acceleration: Vec3::new(r.ax, r.ay, r.az),
            orientation: EulerAngles::new(r.roll, r.pitch, r.yaw),
            angular_velocity: Vec3::ZERO,
            velocity_magnitude: r.velocity_magnitude,
            cumulative_distance: r.total_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_point() -> TrajectoryPoint {
        TrajectoryPoint {
            timestamp: 12.5,
            position: Vec2::new(0.3, -0.2),
            velocity: Vec2::new(0.04, 0.03),
            acceleration: Vec3::new(0.1, -0.1, 0.02),
            orientation: EulerAngles::new(1.0, -2.0, 45.0),
            angular_velocity: Vec3::new(0.01, 0.02, 0.3),
            velocity_magnitude: 0.05,
            cumulative_distance: 1.75,
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("demo".parse::<SimulationMode>().unwrap(), SimulationMode::Demo);
        assert_eq!(" Random ".parse::<SimulationMode>().unwrap(), SimulationMode::Random);
        assert_eq!("replay".parse::<SimulationMode>().unwrap(), SimulationMode::Replay);
        assert!(matches!(
            "spiral".parse::<SimulationMode>(),
            Err(MotionTrackerError::Configuration(_))
        ));
    }

    #[test]
    fn test_vec2_magnitude() {
        assert_eq!(Vec2::new(3.0, -4.0).magnitude(), 5.0);
        assert_eq!(Vec2::ZERO.magnitude(), 0.0);
    }

    #[test]
    fn test_mode_serde_lowercase() {
        let json = serde_json::to_string(&SimulationMode::Random).unwrap();
        assert_eq!(json, "\"random\"");
    }

    #[test]
    fn test_export_record_drops_angular_velocity() {
        let point = sample_point();
        let record = ExportRecord::from(&point);
        assert_eq!(record.x, 0.3);
        assert_eq!(record.total_distance, 1.75);

        let reloaded = TrajectoryPoint::from(record);
        assert_eq!(reloaded.angular_velocity, Vec3::ZERO);
        assert_eq!(reloaded.position, point.position);
        assert_eq!(reloaded.orientation, point.orientation);
        assert_eq!(reloaded.cumulative_distance, point.cumulative_distance);
    }

    #[test]
    fn test_export_record_is_flat() {
        let record = ExportRecord::from(&sample_point());
        let value = serde_json::to_value(record).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 13);
        assert!(obj.values().all(|v| v.is_number()));
    }
}

//! Dead-reckoning estimator for the drawing plane.
//!
//! Consumes `SensorSample`s only. Attitude comes from the sample quaternion;
//! planar position is integrated twice from low-pass filtered acceleration,
//! with two heuristics against integration drift: a per-tick decay while
//! the device is slow, and a periodic velocity cut when the recent history
//! looks stationary.

pub mod ring_buffer;

use log::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::error::TrackResult;
use crate::filters::AxisLowPass;
use crate::orientation::decode_orientation;
use crate::types::{
    Axis3, EulerAngles, ExportRecord, Plane2, SensorSample, StateSnapshot, TrajectoryPoint,
    GRAVITY,
};
use ring_buffer::RingBuffer;

/// Velocity multiplier applied every tick below the velocity threshold.
const STATIONARY_DECAY: f64 = 0.9;

/// Points examined by drift compensation.
const DRIFT_WINDOW: usize = 50;
/// Fewer points than this and drift compensation does nothing.
const DRIFT_MIN_POINTS: usize = 10;
const DRIFT_VELOCITY_FACTOR: f64 = 0.7;

pub struct MotionTracker {
    config: TrackerConfig,
    accel_filter: AxisLowPass,
    gyro_filter: AxisLowPass,

    position: Plane2,
    velocity: Plane2,
    acceleration: Axis3,
    orientation: EulerAngles,

    dt: f64,
    last_timestamp: Option<f64>,
    last_drift_reset_time: f64,

    max_velocity: f64,
    total_distance: f64,

    trajectory: RingBuffer<TrajectoryPoint>,
    samples_processed: u64,
    drift_corrections: u64,
}

impl MotionTracker {
    pub fn new(config: TrackerConfig) -> TrackResult<Self> {
        config.validate()?;
        Ok(MotionTracker {
            accel_filter: AxisLowPass::new(config.filter_alpha)?,
            gyro_filter: AxisLowPass::new(config.filter_alpha)?,
            position: Plane2::zeros(),
            velocity: Plane2::zeros(),
            acceleration: Axis3::zeros(),
            orientation: EulerAngles::ZERO,
            dt: config.default_dt,
            last_timestamp: None,
            last_drift_reset_time: 0.0,
            max_velocity: 0.0,
            total_distance: 0.0,
            trajectory: RingBuffer::new(config.max_trajectory_points),
            samples_processed: 0,
            drift_corrections: 0,
            config,
        })
    }

    /// Apply a new configuration; nothing changes if it is invalid.
    ///
    /// Filter history and estimated motion are kept. Shrinking the capacity
    /// drops the oldest points.
    pub fn configure(&mut self, config: TrackerConfig) -> TrackResult<()> {
        config.validate()?;
        if config.filter_alpha != self.accel_filter.alpha() {
            debug!(
                "Filter alpha {} -> {}",
                self.accel_filter.alpha(),
                config.filter_alpha
            );
        }
        self.accel_filter.set_alpha(config.filter_alpha)?;
        self.gyro_filter.set_alpha(config.filter_alpha)?;
        self.trajectory.resize(config.max_trajectory_points);
        if self.last_timestamp.is_none() {
            self.dt = config.default_dt;
        }
        self.config = config;
        Ok(())
    }

    pub fn process_sample(&mut self, sample: &SensorSample) -> TrajectoryPoint {
        if let Some(last) = self.last_timestamp {
            self.dt = sample.timestamp - last;
        }
        self.last_timestamp = Some(sample.timestamp);
        let dt = self.dt;

        self.orientation = match decode_orientation(&sample.orientation) {
            Ok(euler) => euler,
            Err(e) => {
                warn!("{} at t={:.3}, using identity attitude", e, sample.timestamp);
                EulerAngles::ZERO
            }
        };

        let mut accel = self.accel_filter.apply(sample.linear_acceleration.into());
        let angular_velocity = self.gyro_filter.apply(sample.angular_velocity.into());
        if self.config.gravity_compensation {
            // body-frame z only, attitude is not applied
            accel.z -= GRAVITY;
        }
        self.acceleration = accel;

        self.velocity += accel.xy() * dt;

        // measured before decay and drift cut; stored on the point only
        let measured_speed = self.velocity.norm();
        if measured_speed < self.config.velocity_threshold {
            self.velocity *= STATIONARY_DECAY;
        }

        let previous = self.position;
        self.position += self.velocity * dt;
        self.total_distance += (self.position - previous).norm();

        if measured_speed > self.max_velocity {
            self.max_velocity = measured_speed;
        }

        if sample.timestamp - self.last_drift_reset_time > self.config.drift_reset_interval {
            self.compensate_drift();
            self.last_drift_reset_time = sample.timestamp;
        }

        let point = TrajectoryPoint {
            timestamp: sample.timestamp,
            position: self.position.into(),
            velocity: self.velocity.into(),
            acceleration: self.acceleration.into(),
            orientation: self.orientation,
            angular_velocity: angular_velocity.into(),
            velocity_magnitude: measured_speed,
            cumulative_distance: self.total_distance,
        };
        self.trajectory.push(point);
        self.samples_processed += 1;
        point
    }

    /// Cut velocity when the recent history says the device is at rest.
    fn compensate_drift(&mut self) {
        let window = self.trajectory.len().min(DRIFT_WINDOW);
        if window < DRIFT_MIN_POINTS {
            return;
        }
        let mean_speed = self
            .trajectory
            .recent(window)
            .map(|p| p.velocity_magnitude)
            .sum::<f64>()
            / window as f64;

        if mean_speed < 2.0 * self.config.velocity_threshold {
            self.velocity *= DRIFT_VELOCITY_FACTOR;
            self.drift_corrections += 1;
            debug!(
                "Drift compensation: mean speed {:.4} m/s over {} points, velocity scaled by {}",
                mean_speed, window, DRIFT_VELOCITY_FACTOR
            );
        }
    }

    /// Zero all estimated motion, clear the trajectory and filter history.
    pub fn reset(&mut self) {
        self.accel_filter.reset();
        self.gyro_filter.reset();
        self.position = Plane2::zeros();
        self.velocity = Plane2::zeros();
        self.acceleration = Axis3::zeros();
        self.orientation = EulerAngles::ZERO;
        self.dt = self.config.default_dt;
        self.last_timestamp = None;
        self.last_drift_reset_time = 0.0;
        self.max_velocity = 0.0;
        self.total_distance = 0.0;
        self.trajectory.clear();
        self.samples_processed = 0;
        self.drift_corrections = 0;
        info!("Motion tracker reset");
    }

    pub fn current_state(&self) -> StateSnapshot {
        StateSnapshot {
            position: self.position.into(),
            velocity: self.velocity.into(),
            acceleration: self.acceleration.into(),
            orientation: self.orientation,
            angular_velocity: self.gyro_filter.value().into(),
            velocity_magnitude: self.velocity.norm(),
            max_velocity: self.max_velocity,
            total_distance: self.total_distance,
            trajectory_length: self.trajectory.len(),
        }
    }

    /// Stored points in arrival order; `Some(n)` keeps only the newest n.
    pub fn get_trajectory(&self, limit: Option<usize>) -> Vec<TrajectoryPoint> {
        match limit {
            Some(n) => self.trajectory.recent(n).copied().collect(),
            None => self.trajectory.to_vec(),
        }
    }

    pub fn export_trajectory(&self) -> Vec<ExportRecord> {
        self.trajectory.iter().map(ExportRecord::from).collect()
    }

    /// Plot-ready x and y columns.
    pub fn trajectory_2d(&self, limit: Option<usize>) -> (Vec<f64>, Vec<f64>) {
        let n = limit.unwrap_or(self.trajectory.len());
        self.trajectory
            .recent(n)
            .map(|p| (p.position.x, p.position.y))
            .unzip()
    }

    pub fn velocity_magnitudes(&self, limit: Option<usize>) -> Vec<f64> {
        let n = limit.unwrap_or(self.trajectory.len());
        self.trajectory
            .recent(n)
            .map(|p| p.velocity_magnitude)
            .collect()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Step used for the most recent sample.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn samples_processed(&self) -> u64 {
        self.samples_processed
    }

    pub fn drift_corrections(&self) -> u64 {
        self.drift_corrections
    }
}

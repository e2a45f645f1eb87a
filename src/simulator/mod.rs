//! Synthetic IMU for a handheld marking device.
//!
//! Each tick derives a raw motion from the active pattern, integrates it
//! into a private ground-truth state, and emits what a real sensor would
//! report: biased, noisy accelerometer and gyroscope axes, the attitude as
//! a quaternion, and a nominal magnetometer reading.

pub mod noise;
pub mod patterns;

use log::debug;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{validate_sample_rate, validate_speed, GeneratorConfig, TimeSource};
use crate::error::TrackResult;
use crate::orientation::{euler_to_quaternion, normalize_angle};
use crate::types::{Axis3, EulerAngles, SensorSample, SimulationMode, Vec3, GRAVITY};
use noise::NoiseGenerator;
use patterns::{raw_motion, RawMotion};

/// Per-tick multiplicative velocity damping on the ground truth.
const VELOCITY_DAMPING: f64 = 0.99;

/// Ground truth the generator integrates. Never exposed through samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneratorState {
    pub position: Axis3,
    pub velocity: Axis3,
    /// Degrees, each axis in (-180, 180]
    pub orientation: EulerAngles,
    pub angular_velocity: Axis3,
}

impl Default for GeneratorState {
    fn default() -> Self {
        Self {
            position: Axis3::zeros(),
            velocity: Axis3::zeros(),
            orientation: EulerAngles::ZERO,
            angular_velocity: Axis3::zeros(),
        }
    }
}

pub struct SignalGenerator {
    config: GeneratorConfig,
    dt: f64,
    state: GeneratorState,
    pattern_time: f64,
    simulated_elapsed: f64,
    noise: NoiseGenerator,
    samples_generated: u64,
}

impl SignalGenerator {
    pub fn new(config: GeneratorConfig) -> TrackResult<Self> {
        config.validate()?;
        Ok(Self {
            dt: 1.0 / config.sample_rate,
            noise: NoiseGenerator::new(config.seed),
            config,
            state: GeneratorState::default(),
            pattern_time: 0.0,
            simulated_elapsed: 0.0,
            samples_generated: 0,
        })
    }

    /// Change the sample rate (and with it the integration step).
    pub fn configure(&mut self, sample_rate: f64) -> TrackResult<()> {
        validate_sample_rate(sample_rate)?;
        self.config.sample_rate = sample_rate;
        self.dt = 1.0 / sample_rate;
        Ok(())
    }

    /// Switch pattern and restart the pattern clock. Ground truth is kept.
    pub fn set_mode(&mut self, mode: SimulationMode, speed: f64) -> TrackResult<()> {
        validate_speed(speed)?;
        self.config.mode = mode;
        self.config.speed = speed;
        self.pattern_time = 0.0;
        debug!("Generator mode set to {} at {:.2}x", mode, speed);
        Ok(())
    }

    /// Zero the ground truth and the pattern clock. Configuration is kept.
    pub fn reset(&mut self) {
        self.state = GeneratorState::default();
        self.pattern_time = 0.0;
        debug!("Generator state reset");
    }

    /// One tick: derive, integrate, emit.
    pub fn generate_sample(&mut self) -> SensorSample {
        let timestamp = self.timestamp();
        let t = self.pattern_time * self.config.speed;

        let raw = raw_motion(self.config.mode, t, &mut self.noise);
        self.integrate(&raw);
        let sample = self.emit(timestamp, &raw);

        self.pattern_time += self.dt;
        self.simulated_elapsed += self.dt;
        self.samples_generated += 1;
        sample
    }

    fn timestamp(&self) -> f64 {
        match self.config.time_source {
            TimeSource::WallClock => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs_f64(),
            TimeSource::Simulated { start } => start + self.simulated_elapsed,
        }
    }

    fn integrate(&mut self, raw: &RawMotion) {
        let dt = self.dt;
        let state = &mut self.state;

        state.velocity += raw.acceleration * dt;
        state.position += state.velocity * dt;

        let rates = raw.angular_velocity;
        state.orientation = EulerAngles {
            roll: normalize_angle(state.orientation.roll + rates.x.to_degrees() * dt),
            pitch: normalize_angle(state.orientation.pitch + rates.y.to_degrees() * dt),
            yaw: normalize_angle(state.orientation.yaw + rates.z.to_degrees() * dt),
        };
        state.angular_velocity = rates;

        state.velocity *= VELOCITY_DAMPING;
    }

    fn emit(&mut self, timestamp: f64, raw: &RawMotion) -> SensorSample {
        let noise_cfg = self.config.noise;
        let accel_bias: Axis3 = noise_cfg.accel_bias.into();
        let gyro_bias: Axis3 = noise_cfg.gyro_bias.into();

        let accel = raw.acceleration + accel_bias + Axis3::new(0.0, 0.0, GRAVITY);
        let gyro = raw.angular_velocity + gyro_bias;
        let field = noise_cfg.magnetic_field;

        let linear_acceleration = Vec3::new(
            self.noise.apply(accel.x, noise_cfg.accel_std),
            self.noise.apply(accel.y, noise_cfg.accel_std),
            self.noise.apply(accel.z, noise_cfg.accel_std),
        );
        let angular_velocity = Vec3::new(
            self.noise.apply(gyro.x, noise_cfg.gyro_std),
            self.noise.apply(gyro.y, noise_cfg.gyro_std),
            self.noise.apply(gyro.z, noise_cfg.gyro_std),
        );
        let attitude = self.state.orientation;
        let orientation = euler_to_quaternion(attitude.roll, attitude.pitch, attitude.yaw);
        let magnetic_field = Vec3::new(
            self.noise.apply(field.x, noise_cfg.mag_std),
            self.noise.apply(field.y, noise_cfg.mag_std),
            self.noise.apply(field.z, noise_cfg.mag_std),
        );

        SensorSample {
            timestamp,
            linear_acceleration,
            angular_velocity,
            orientation,
            magnetic_field,
        }
    }

    /// Copy of the ground truth, for diagnostics only.
    pub fn ground_truth(&self) -> GeneratorState {
        self.state
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn mode(&self) -> SimulationMode {
        self.config.mode
    }

    pub fn speed(&self) -> f64 {
        self.config.speed
    }

    pub fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn pattern_time(&self) -> f64 {
        self.pattern_time
    }

    pub fn samples_generated(&self) -> u64 {
        self.samples_generated
    }
}

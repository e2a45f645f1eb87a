use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{invalid_config, TrackResult};
use crate::types::{SimulationMode, Vec3};

/// Where sample timestamps come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSource {
    /// UNIX seconds at the moment the sample is generated
    #[default]
    WallClock,
    /// `start` plus the accumulated integration step, one dt per tick
    Simulated { start: f64 },
}

/// Sensor imperfections injected into every emitted sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// m/s²
    pub accel_std: f64,
    /// rad/s
    pub gyro_std: f64,
    /// µT
    pub mag_std: f64,
    pub accel_bias: Vec3,
    pub gyro_bias: Vec3,
    /// Nominal Earth field reported by the magnetometer
    pub magnetic_field: Vec3,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            accel_std: 0.02,
            gyro_std: 0.01,
            mag_std: 0.1,
            accel_bias: Vec3::new(0.01, -0.005, 0.02),
            gyro_bias: Vec3::new(0.001, 0.002, -0.001),
            magnetic_field: Vec3::new(22.0, 5.0, -42.0),
        }
    }
}

impl NoiseConfig {
    /// Same biases, zero Gaussian noise.
    pub fn noiseless() -> Self {
        Self {
            accel_std: 0.0,
            gyro_std: 0.0,
            mag_std: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> TrackResult<()> {
        for (name, std) in [
            ("accel_std", self.accel_std),
            ("gyro_std", self.gyro_std),
            ("mag_std", self.mag_std),
        ] {
            if !std.is_finite() || std < 0.0 {
                return invalid_config(format!("{} must be finite and >= 0, got {}", name, std));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Hz; fixes the integration step dt = 1 / sample_rate
    pub sample_rate: f64,
    pub mode: SimulationMode,
    /// Time dilation applied to the pattern clock
    pub speed: f64,
    /// Fixed seed for a replayable stream; OS entropy when absent
    pub seed: Option<u64>,
    pub time_source: TimeSource,
    pub noise: NoiseConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 50.0,
            mode: SimulationMode::Demo,
            speed: 1.0,
            seed: Some(42),
            time_source: TimeSource::default(),
            noise: NoiseConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> TrackResult<()> {
        validate_sample_rate(self.sample_rate)?;
        validate_speed(self.speed)?;
        if let TimeSource::Simulated { start } = self.time_source {
            if !start.is_finite() {
                return invalid_config("simulated clock start must be finite");
            }
        }
        self.noise.validate()
    }
}

pub(crate) fn validate_sample_rate(sample_rate: f64) -> TrackResult<()> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return invalid_config(format!("sample rate must be > 0 Hz, got {}", sample_rate));
    }
    Ok(())
}

pub(crate) fn validate_speed(speed: f64) -> TrackResult<()> {
    if !speed.is_finite() || speed < 0.0 {
        return invalid_config(format!("speed multiplier must be >= 0, got {}", speed));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Low-pass coefficient in (0, 1]; lower = more smoothing
    pub filter_alpha: f64,
    pub max_trajectory_points: usize,
    /// m/s; below this the device is treated as stationary
    pub velocity_threshold: f64,
    /// Seconds between drift compensation passes
    pub drift_reset_interval: f64,
    pub gravity_compensation: bool,
    /// Step used until a second timestamp is seen
    pub default_dt: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            filter_alpha: 0.1,
            max_trajectory_points: 5000,
            velocity_threshold: 0.01,
            drift_reset_interval: 30.0,
            gravity_compensation: true,
            default_dt: 0.01,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> TrackResult<()> {
        if !(self.filter_alpha > 0.0 && self.filter_alpha <= 1.0) {
            return invalid_config(format!(
                "filter alpha must be in (0, 1], got {}",
                self.filter_alpha
            ));
        }
        if self.max_trajectory_points == 0 {
            return invalid_config("trajectory capacity must be positive");
        }
        if !self.velocity_threshold.is_finite() || self.velocity_threshold < 0.0 {
            return invalid_config(format!(
                "velocity threshold must be >= 0, got {}",
                self.velocity_threshold
            ));
        }
        if !self.drift_reset_interval.is_finite() || self.drift_reset_interval < 0.0 {
            return invalid_config(format!(
                "drift reset interval must be >= 0, got {}",
                self.drift_reset_interval
            ));
        }
        if !self.default_dt.is_finite() || self.default_dt <= 0.0 {
            return invalid_config(format!("default dt must be > 0, got {}", self.default_dt));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub channel_capacity: usize,
    /// Trajectory points copied into the shared view for readers
    pub view_points: usize,
    pub status_interval_secs: f64,
    pub output_dir: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            view_points: 500,
            status_interval_secs: 2.0,
            output_dir: "dermograph_sessions".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> TrackResult<()> {
        if self.channel_capacity == 0 {
            return invalid_config("channel capacity must be positive");
        }
        if !self.status_interval_secs.is_finite() || self.status_interval_secs <= 0.0 {
            return invalid_config(format!(
                "status interval must be > 0, got {}",
                self.status_interval_secs
            ));
        }
        Ok(())
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TrackResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> TrackResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> TrackResult<()> {
        self.generator.validate()?;
        self.tracker.validate()?;
        self.pipeline.validate()
    }
}

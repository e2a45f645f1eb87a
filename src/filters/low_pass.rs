use crate::error::{invalid_config, TrackResult};
use crate::types::Axis3;

/// Exponential low-pass step: `alpha * new + (1 - alpha) * old`.
///
/// Lower alpha means heavier smoothing.
#[inline]
pub fn low_pass(new_value: f64, old_value: f64, alpha: f64) -> f64 {
    alpha * new_value + (1.0 - alpha) * old_value
}

/// Independent exponential filter on each of three axes.
///
/// Starts from zero, so the first outputs ramp up toward the input.
#[derive(Clone, Debug)]
pub struct AxisLowPass {
    alpha: f64,
    value: Axis3,
}

impl AxisLowPass {
    pub fn new(alpha: f64) -> TrackResult<Self> {
        Self::check_alpha(alpha)?;
        Ok(Self {
            alpha,
            value: Axis3::zeros(),
        })
    }

    fn check_alpha(alpha: f64) -> TrackResult<()> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return invalid_config(format!("filter alpha must be in (0, 1], got {}", alpha));
        }
        Ok(())
    }

    /// Feed one measurement and return the filtered value.
    pub fn apply(&mut self, measurement: Axis3) -> Axis3 {
        self.value = Axis3::new(
            low_pass(measurement.x, self.value.x, self.alpha),
            low_pass(measurement.y, self.value.y, self.alpha),
            low_pass(measurement.z, self.value.z, self.alpha),
        );
        self.value
    }

    pub fn value(&self) -> Axis3 {
        self.value
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Change the coefficient without losing the filtered history.
    pub fn set_alpha(&mut self, alpha: f64) -> TrackResult<()> {
        Self::check_alpha(alpha)?;
        self.alpha = alpha;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.value = Axis3::zeros();
    }
}

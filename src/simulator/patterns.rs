//! Kinematic intent for each simulation mode, as a function of pattern time.

use super::noise::NoiseGenerator;
use crate::types::{Axis3, SimulationMode};

/// Seconds each demo phase lasts before the next one starts.
pub const PHASE_DURATION: f64 = 10.0;

const PHASE_COUNT: f64 = 4.0;

/// Noise-free acceleration (m/s²) and angular velocity (rad/s).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawMotion {
    pub acceleration: Axis3,
    pub angular_velocity: Axis3,
}

impl RawMotion {
    pub fn zero() -> Self {
        Self {
            acceleration: Axis3::zeros(),
            angular_velocity: Axis3::zeros(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemoPhase {
    StraightLines,
    Circles,
    FigureEight,
    Stippling,
}

impl DemoPhase {
    /// Phase active at pattern time `t`; the cycle repeats every 40 s.
    pub fn at(t: f64) -> Self {
        let phase = t.rem_euclid(PHASE_DURATION * PHASE_COUNT) / PHASE_DURATION;
        if phase < 1.0 {
            DemoPhase::StraightLines
        } else if phase < 2.0 {
            DemoPhase::Circles
        } else if phase < 3.0 {
            DemoPhase::FigureEight
        } else {
            DemoPhase::Stippling
        }
    }
}

pub fn raw_motion(mode: SimulationMode, t: f64, noise: &mut NoiseGenerator) -> RawMotion {
    match mode {
        SimulationMode::Demo => demo_motion(t, noise),
        SimulationMode::Random => random_motion(t, noise),
        SimulationMode::Replay => RawMotion::zero(),
    }
}

/// Four-phase tattoo-stroke cycle plus a needle pressure ripple on z.
pub fn demo_motion(t: f64, noise: &mut NoiseGenerator) -> RawMotion {
    let (accel_x, accel_y, yaw_rate) = match DemoPhase::at(t) {
        DemoPhase::StraightLines => (
            0.5 * (t * 2.0).sin(),
            0.1 * (t * 3.0).cos(),
            0.1 * t.sin(),
        ),
        DemoPhase::Circles => {
            let freq = 2.0;
            (
                (t * freq).cos() * freq,
                (t * freq).sin() * freq,
                freq,
            )
        }
        DemoPhase::FigureEight => {
            let freq = 1.5;
            (
                2.0 * (t * freq).cos() * freq,
                (t * freq * 2.0).sin() * freq * 2.0,
                0.5 * (t * freq).sin(),
            )
        }
        DemoPhase::Stippling => {
            // on/off bursts five times a second
            let (ax, ay) = if (t * 5.0).floor() as i64 % 2 == 0 {
                (2.0 * (noise.uniform() - 0.5), 2.0 * (noise.uniform() - 0.5))
            } else {
                (0.0, 0.0)
            };
            (ax, ay, 0.2 * (noise.uniform() - 0.5))
        }
    };

    let pressure = 0.3 * (t * 8.0).sin();

    RawMotion {
        acceleration: Axis3::new(accel_x, accel_y, pressure),
        angular_velocity: Axis3::new(0.05 * (t * 1.5).sin(), 0.03 * (t * 2.2).cos(), yaw_rate),
    }
}

/// Irregular but smooth motion from fixed sinusoids.
///
/// Only the z pressure term takes a fresh random phase each tick.
pub fn random_motion(t: f64, noise: &mut NoiseGenerator) -> RawMotion {
    let accel_x =
        0.8 * (t * 1.1 + 0.5).sin() + 0.3 * (t * 2.7 + 1.2).sin() + 0.1 * (t * 5.3 + 2.1).sin();
    let accel_y =
        0.7 * (t * 1.3 + 1.1).cos() + 0.4 * (t * 2.1 + 0.8).cos() + 0.15 * (t * 4.7 + 1.7).cos();
    let accel_z = 0.4 * (t * 3.5 + noise.uniform()).sin();

    RawMotion {
        acceleration: Axis3::new(accel_x, accel_y, accel_z),
        angular_velocity: Axis3::new(
            0.1 * (t * 1.7 + 0.3).sin(),
            0.08 * (t * 1.9 + 0.9).cos(),
            0.3 * (t * 1.5 + 0.6).sin(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_phase_cycle() {
        assert_eq!(DemoPhase::at(0.0), DemoPhase::StraightLines);
        assert_eq!(DemoPhase::at(9.99), DemoPhase::StraightLines);
        assert_eq!(DemoPhase::at(10.0), DemoPhase::Circles);
        assert_eq!(DemoPhase::at(25.0), DemoPhase::FigureEight);
        assert_eq!(DemoPhase::at(35.0), DemoPhase::Stippling);
        assert_eq!(DemoPhase::at(41.0), DemoPhase::StraightLines);
        assert_eq!(DemoPhase::at(75.0), DemoPhase::Stippling);
    }

    #[test]
    fn test_straight_line_values() {
        let mut noise = NoiseGenerator::new(Some(0));
        let t = 1.25;
        let m = demo_motion(t, &mut noise);
        assert_abs_diff_eq!(m.acceleration.x, 0.5 * (2.5f64).sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(m.acceleration.y, 0.1 * (3.75f64).cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(m.acceleration.z, 0.3 * (10.0f64).sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(m.angular_velocity.z, 0.1 * t.sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(m.angular_velocity.x, 0.05 * (1.875f64).sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_circle_yaw_rate_is_constant() {
        let mut noise = NoiseGenerator::new(Some(0));
        for t in [10.0, 12.3, 19.9] {
            let m = demo_motion(t, &mut noise);
            assert_eq!(m.angular_velocity.z, 2.0);
            let horizontal = m.acceleration.x.hypot(m.acceleration.y);
            assert_abs_diff_eq!(horizontal, 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_stippling_gate() {
        let mut noise = NoiseGenerator::new(Some(5));
        // floor(5 * 31.0) = 155 is odd: needle lifted
        let off = demo_motion(31.0, &mut noise);
        assert_eq!(off.acceleration.x, 0.0);
        assert_eq!(off.acceleration.y, 0.0);
        assert!(off.angular_velocity.z.abs() <= 0.1);

        // floor(5 * 30.05) = 150 is even: burst
        let on = demo_motion(30.05, &mut noise);
        assert!(on.acceleration.x.abs() <= 1.0);
        assert!(on.acceleration.y.abs() <= 1.0);
        assert!(on.acceleration.x != 0.0 || on.acceleration.y != 0.0);
    }

    #[test]
    fn test_random_mode_rates_are_deterministic() {
        let mut a = NoiseGenerator::new(Some(1));
        let mut b = NoiseGenerator::new(Some(2));
        let t = 3.7;
        let ma = random_motion(t, &mut a);
        let mb = random_motion(t, &mut b);
        assert_eq!(ma.acceleration.x, mb.acceleration.x);
        assert_eq!(ma.acceleration.y, mb.acceleration.y);
        assert_eq!(ma.angular_velocity, mb.angular_velocity);
        assert!(ma.acceleration.z.abs() <= 0.4);
    }

    #[test]
    fn test_replay_is_silent() {
        let mut noise = NoiseGenerator::new(Some(0));
        let m = raw_motion(SimulationMode::Replay, 12.0, &mut noise);
        assert_eq!(m, RawMotion::zero());
    }
}

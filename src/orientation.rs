//! Euler angle / quaternion conversion.
//!
//! Aerospace Z-Y-X (yaw, pitch, roll) convention, angles in degrees,
//! quaternions scalar-last. Near pitch ±90° only the difference (or sum) of
//! roll and yaw survives a round trip; that is gimbal lock, not an error.

use crate::error::{MotionTrackerError, TrackResult};
use crate::types::{EulerAngles, Quaternion};

/// Quaternions with a norm below this cannot be decoded.
const MIN_QUATERNION_NORM: f64 = 1e-9;

/// Encode roll, pitch, yaw (degrees) as a unit quaternion.
pub fn euler_to_quaternion(roll: f64, pitch: f64, yaw: f64) -> Quaternion {
    let (sr, cr) = (roll.to_radians() * 0.5).sin_cos();
    let (sp, cp) = (pitch.to_radians() * 0.5).sin_cos();
    let (sy, cy) = (yaw.to_radians() * 0.5).sin_cos();

    Quaternion {
        x: cy * cp * sr - sy * sp * cr,
        y: sy * cp * sr + cy * sp * cr,
        z: sy * cp * cr - cy * sp * sr,
        w: cy * cp * cr + sy * sp * sr,
    }
}

/// Decode a quaternion into roll, pitch, yaw (degrees).
///
/// The input is used as given. The pitch term is clamped to ±90° once
/// `|2(wy - zx)| >= 1` so arcsine never sees an out-of-domain value.
pub fn quaternion_to_euler(x: f64, y: f64, z: f64, w: f64) -> EulerAngles {
    let sinr_cosp = 2.0 * (w * x + y * z);
    let cosr_cosp = 1.0 - 2.0 * (x * x + y * y);
    let roll = sinr_cosp.atan2(cosr_cosp);

    let sinp = 2.0 * (w * y - z * x);
    let pitch = if sinp.abs() >= 1.0 {
        std::f64::consts::FRAC_PI_2.copysign(sinp)
    } else {
        sinp.asin()
    };

    let siny_cosp = 2.0 * (w * z + x * y);
    let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
    let yaw = siny_cosp.atan2(cosy_cosp);

    EulerAngles {
        roll: roll.to_degrees(),
        pitch: pitch.to_degrees(),
        yaw: yaw.to_degrees(),
    }
}

/// Checked decode used on live sensor data.
///
/// Renormalizes before decoding; a (near) zero quaternion is an
/// `Orientation` error so the caller can fall back to identity.
pub fn decode_orientation(q: &Quaternion) -> TrackResult<EulerAngles> {
    let norm = q.norm();
    if !norm.is_finite() || norm < MIN_QUATERNION_NORM {
        return Err(MotionTrackerError::Orientation(format!(
            "quaternion norm {:e} cannot be decoded",
            norm
        )));
    }
    Ok(quaternion_to_euler(
        q.x / norm,
        q.y / norm,
        q.z / norm,
        q.w / norm,
    ))
}

/// Wrap an angle in degrees into (-180, 180].
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

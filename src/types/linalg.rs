//! Linear algebra aliases for the estimator state.
//!
//! Internal state is kept in nalgebra vectors so integration steps read as
//! vector arithmetic; the serializable structs in `types` are what crosses
//! module and process boundaries.

use nalgebra::{Vector2, Vector3};

use super::{Vec2, Vec3};

/// Body-frame 3-axis quantity (acceleration, angular rate, position).
pub type Axis3 = Vector3<f64>;

/// Drawing-plane quantity (x, y only).
pub type Plane2 = Vector2<f64>;

impl From<Axis3> for Vec3 {
    fn from(v: Axis3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for Axis3 {
    fn from(v: Vec3) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl From<Plane2> for Vec2 {
    fn from(v: Plane2) -> Self {
        Vec2::new(v.x, v.y)
    }
}

impl From<Vec2> for Plane2 {
    fn from(v: Vec2) -> Self {
        Vector2::new(v.x, v.y)
    }
}

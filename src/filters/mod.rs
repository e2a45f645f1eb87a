pub mod low_pass;

pub use low_pass::{low_pass, AxisLowPass};

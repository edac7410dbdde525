pub mod clock;
pub mod easing;
pub mod vectors;

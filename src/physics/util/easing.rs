//! Progress curves for animated camera motion.

/// Cubic ease-in-out on a progress value.
/// Input is clamped to `[0, 1]`, and both branches meet at `0.5`.
pub fn ease_in_out_cubic(p: f32) -> f32 {
    let p = p.clamp(0.0, 1.0);
    if p < 0.5 {
        4.0 * p * p * p
    } else {
        1.0 - (-2.0 * p + 2.0).powi(3) / 2.0
    }
}

/// Fraction of the remaining distance covered in one step of length `dt`
/// by exponential smoothing with rate `k` per second.
pub fn exponential_smoothing_fraction(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}

/// The rate `k` that makes [`exponential_smoothing_fraction`] equal
/// `fraction` when stepped at `ticks_per_second`.
pub fn rate_from_per_tick_fraction(fraction: f32, ticks_per_second: f32) -> f32 {
    -(1.0 - fraction.clamp(0.0, 0.999_999)).ln() * ticks_per_second
}

//! Primitive type definitions and fixed simulation constants.
//!
//! The internal simulation always runs at [`SIM_FS`]; device presets decimate
//! down from it. Signal math is done in seconds/hertz/millivolts throughout
//! and converted to microvolt integers only at the output boundary.

/// Default floating point type for all signal math.
pub type Real = f64;

/// A duration or timestamp in seconds.
pub type Seconds = f64;

/// A frequency in hertz.
pub type Hertz = f64;

/// A voltage in millivolts (internal signal unit).
pub type Millivolts = f64;

/// Internal simulation sample rate in Hz.
///
/// All source, forward and noise modeling happens at this rate; device
/// presets may only decimate to rates that divide it.
pub const SIM_FS: u32 = 1000;

/// Microvolts per millivolt, the output-unit conversion factor.
pub const UV_PER_MV: Real = 1000.0;

/// Epsilon for floating point comparisons.
pub const EPSILON: Real = 1e-9;

/// Converts a time in seconds to a sample index at the simulation rate.
#[inline]
pub fn sim_index(t: Seconds) -> usize {
    (t * SIM_FS as Real) as usize
}

/// Number of simulation samples covering `duration_s` seconds.
#[inline]
pub fn sim_len(duration_s: Seconds) -> usize {
    (duration_s * SIM_FS as Real).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_len() {
        assert_eq!(sim_len(10.0), 10_000);
        assert_eq!(sim_len(0.5), 500);
        assert_eq!(sim_len(0.0), 0);
    }

    #[test]
    fn test_sim_index_rounds_down() {
        assert_eq!(sim_index(0.0015), 1);
        assert_eq!(sim_index(1.0), 1000);
    }
}

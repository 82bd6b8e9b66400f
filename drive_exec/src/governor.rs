//! # Speed governor
//!
//! A single scalar multiplier applied to all commanded drive efforts once per
//! cycle, after kinematics and before the demands reach the module drivers.
//! It never affects steer angles.
//!
//! The governor is adjusted in multiplicative steps by the operator. The
//! step controls can attenuate drive down to 10% but never to zero - only
//! [`SpeedGovernor::stop`] sets exactly zero, after which a `reset` or `set`
//! is needed to get moving again (a step up from zero stays at zero).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Multiplicative step applied by increase/decrease.
const STEP_FACTOR: f64 = 1.1;

/// Lowest value reachable by the step controls.
const MIN_STEPPED: f64 = 0.1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The speed governor state.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SpeedGovernor {
    modifier: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SpeedGovernor {
    fn default() -> Self {
        Self { modifier: 1.0 }
    }
}

impl SpeedGovernor {
    /// The current governor value, in [0, 1].
    pub fn value(&self) -> f64 {
        self.modifier
    }

    /// Increase the speed by one step, clamped to 1.0.
    pub fn increase(&mut self) {
        self.modifier = (self.modifier * STEP_FACTOR).min(1.0);
    }

    /// Decrease the speed by one step, clamped to 0.1.
    pub fn decrease(&mut self) {
        self.modifier = (self.modifier / STEP_FACTOR).max(MIN_STEPPED);
    }

    /// Reset the speed to full.
    pub fn reset(&mut self) {
        self.modifier = 1.0;
    }

    /// Stop - set the speed to exactly zero.
    pub fn stop(&mut self) {
        self.modifier = 0.0;
    }

    /// Set the speed directly.
    ///
    /// Values outside [0, 1] (including non-finite ones) are silently
    /// ignored, keeping the previous valid value.
    pub fn set(&mut self, value: f64) {
        if value >= 0.0 && value <= 1.0 {
            self.modifier = value;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_full_speed() {
        assert_eq!(SpeedGovernor::default().value(), 1.0);
    }

    #[test]
    fn test_step_bounds() {
        let mut gov = SpeedGovernor::default();

        // Stepping up from full speed stays at full speed
        gov.increase();
        assert_eq!(gov.value(), 1.0);

        // Any number of decreases never goes below 0.1, and never hits zero
        for _ in 0..100 {
            gov.decrease();
            assert!(gov.value() >= MIN_STEPPED);
            assert!(gov.value() > 0.0);
        }
        assert_eq!(gov.value(), MIN_STEPPED);

        // And back up, never exceeding 1.0
        for _ in 0..100 {
            gov.increase();
            assert!(gov.value() <= 1.0);
        }
        assert_eq!(gov.value(), 1.0);
    }

    #[test]
    fn test_stop_and_reset() {
        let mut gov = SpeedGovernor::default();
        gov.decrease();

        gov.stop();
        assert_eq!(gov.value(), 0.0);

        // Step controls can't recover from a stop
        gov.increase();
        assert_eq!(gov.value(), 0.0);

        gov.reset();
        assert_eq!(gov.value(), 1.0);
    }

    #[test]
    fn test_set_range_checked() {
        let mut gov = SpeedGovernor::default();

        gov.set(0.5);
        assert_eq!(gov.value(), 0.5);

        // Out of range and non-finite requests keep the previous value
        gov.set(1.5);
        assert_eq!(gov.value(), 0.5);
        gov.set(-0.1);
        assert_eq!(gov.value(), 0.5);
        gov.set(f64::NAN);
        assert_eq!(gov.value(), 0.5);

        gov.set(0.0);
        assert_eq!(gov.value(), 0.0);
        gov.set(1.0);
        assert_eq!(gov.value(), 1.0);
    }
}

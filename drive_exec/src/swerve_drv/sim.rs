//! Simulated swerve equipment.
//!
//! The sim equipment tracks its targets perfectly and instantly: a module's
//! sensed angle is its last target angle, and its sensed speed is the speed a
//! steady-state motor would reach at the last demanded voltage. The heading
//! sensor holds a constant angle until zeroed. No dynamics are modelled.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{HeadingSensor, SwerveModule};
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A perfectly-tracking simulated corner module.
pub struct SimModule {
    max_speed_ms: f64,
    max_voltage_v: f64,

    target_angle_rad: f64,
    target_effort_v: f64,
}

/// A simulated heading sensor holding a fixed angle.
#[derive(Default)]
pub struct SimHeading {
    angle_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimModule {
    pub fn new(max_speed_ms: f64, max_voltage_v: f64) -> Self {
        Self {
            max_speed_ms,
            max_voltage_v,
            target_angle_rad: 0.0,
            target_effort_v: 0.0,
        }
    }
}

impl SwerveModule for SimModule {
    fn get_angle_rad(&self) -> f64 {
        self.target_angle_rad
    }

    fn get_speed_ms(&self) -> f64 {
        lin_map(
            (-self.max_voltage_v, self.max_voltage_v),
            (-self.max_speed_ms, self.max_speed_ms),
            self.target_effort_v,
        )
    }

    fn set_target(&mut self, angle_rad: f64, effort_v: f64) {
        self.target_angle_rad = angle_rad;
        self.target_effort_v = effort_v;
    }
}

impl SimHeading {
    /// A sim heading sensor starting at the given angle.
    pub fn with_angle(angle_rad: f64) -> Self {
        Self { angle_rad }
    }
}

impl HeadingSensor for SimHeading {
    fn angle_rad(&self) -> f64 {
        self.angle_rad
    }

    fn zero(&mut self) {
        self.angle_rad = 0.0;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_module_tracks_targets() {
        let mut module = SimModule::new(4.0, 12.0);

        assert_eq!(module.get_angle_rad(), 0.0);
        assert_eq!(module.get_speed_ms(), 0.0);

        module.set_target(1.5, -6.0);
        assert_eq!(module.get_angle_rad(), 1.5);
        assert!((module.get_speed_ms() + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sim_heading_zeroes() {
        let mut heading = SimHeading::with_angle(0.7);
        assert_eq!(heading.angle_rad(), 0.7);

        heading.zero();
        assert_eq!(heading.angle_rad(), 0.0);
    }
}

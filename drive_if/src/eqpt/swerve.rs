//! # Swerve Equipment Commands
//!
//! Demand and sensing types exchanged with the four swerve module drivers.
//! Per-corner data is carried in fixed arrays indexed by [`Corner`], so that
//! no corner is privileged over another and no heap allocation is needed in
//! the control cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The number of swerve corner modules on the robot.
pub const NUM_CORNERS: usize = 4;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Identity of one swerve corner module.
///
/// The discriminant is the index into all per-corner arrays.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum Corner {
    FrontLeft = 0,
    FrontRight = 1,
    BackLeft = 2,
    BackRight = 3,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands sent to the swerve module drivers, one entry per corner.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SwerveDems {
    /// Steer axis absolute position demand.
    ///
    /// Units: radians, in [0, 2pi)
    pub str_abs_pos_rad: [f64; NUM_CORNERS],

    /// Drive effort demand, already scaled by the governor and the maximum
    /// voltage.
    ///
    /// Units: volts
    pub drv_effort_v: [f64; NUM_CORNERS],
}

/// Sensing data read back from the swerve module drivers, one entry per
/// corner.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default)]
pub struct SwerveSense {
    /// Measured steer axis absolute position.
    ///
    /// Units: radians
    pub str_abs_pos_rad: [f64; NUM_CORNERS],

    /// Measured drive velocity.
    ///
    /// Units: meters/second (physical, not normalised)
    pub drv_speed_ms: [f64; NUM_CORNERS],
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Corner {
    /// All corners in array index order.
    pub const ALL: [Corner; NUM_CORNERS] = [
        Corner::FrontLeft,
        Corner::FrontRight,
        Corner::BackLeft,
        Corner::BackRight,
    ];

    /// The index of this corner into per-corner arrays.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl Default for SwerveDems {
    fn default() -> Self {
        Self {
            str_abs_pos_rad: [0.0; NUM_CORNERS],
            drv_effort_v: [0.0; NUM_CORNERS],
        }
    }
}

impl SwerveDems {
    /// Return a copy of these demands with all drive efforts zeroed, keeping
    /// the steer positions. Used when inhibiting output in safe mode.
    pub fn with_zero_effort(&self) -> Self {
        Self {
            str_abs_pos_rad: self.str_abs_pos_rad,
            drv_effort_v: [0.0; NUM_CORNERS],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_corner_indices() {
        for (i, corner) in Corner::ALL.iter().enumerate() {
            assert_eq!(corner.index(), i);
        }
    }

    #[test]
    fn test_zero_effort() {
        let dems = SwerveDems {
            str_abs_pos_rad: [0.1, 0.2, 0.3, 0.4],
            drv_effort_v: [1.0, 2.0, 3.0, 4.0],
        };

        let safe = dems.with_zero_effort();
        assert_eq!(safe.str_abs_pos_rad, dems.str_abs_pos_rad);
        assert_eq!(safe.drv_effort_v, [0.0; NUM_CORNERS]);
    }
}

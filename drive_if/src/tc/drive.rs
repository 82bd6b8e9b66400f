//! # Drive telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use structopt::StructOpt;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A chassis drive command - the 3 degree of freedom motion intent for the
/// robot body, normalised to the drivetrain's maximum capability.
///
/// The command is a fresh value every cycle; it carries no state beyond the
/// three scalars.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize, StructOpt)]
pub struct DriveCmd {
    /// Forward velocity demand as a fraction of maximum linear velocity.
    ///
    /// Positive values are "forwards", negative values are "backwards".
    pub fwd: f64,

    /// Strafe (lateral) velocity demand as a fraction of maximum linear
    /// velocity.
    ///
    /// Follows the right hand rule about the robot's Z+ (upwards) axis, so
    /// that positive values move to the left.
    pub str: f64,

    /// Rotation rate demand as a fraction of maximum angular velocity.
    ///
    /// Follows the right hand grip rule about the robot's Z+ (upwards) axis,
    /// so that positive values rotate the robot to the left
    /// (counter-clockwise viewed from above).
    pub rot: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveCmd {
    /// Determine if the command is valid.
    ///
    /// All three components must be finite and within [-1, +1].
    pub fn is_valid(&self) -> bool {
        [self.fwd, self.str, self.rot]
            .iter()
            .all(|c| c.is_finite() && c.abs() <= 1.0)
    }

    /// True if the command demands no motion at all.
    pub fn is_zero(&self) -> bool {
        self.fwd == 0.0 && self.str == 0.0 && self.rot == 0.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(DriveCmd { fwd: 1.0, str: -1.0, rot: 0.5 }.is_valid());
        assert!(DriveCmd::default().is_valid());
        assert!(!DriveCmd { fwd: 1.1, str: 0.0, rot: 0.0 }.is_valid());
        assert!(!DriveCmd { fwd: f64::NAN, str: 0.0, rot: 0.0 }.is_valid());
        assert!(!DriveCmd { fwd: 0.0, str: f64::INFINITY, rot: 0.0 }.is_valid());
    }

    #[test]
    fn test_is_zero() {
        assert!(DriveCmd::default().is_zero());
        assert!(!DriveCmd { fwd: 0.0, str: 0.0, rot: 1e-9 }.is_zero());
    }
}

//! Parameters structure for Odometry

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::drive_ctrl::NUM_CORNERS;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Odometry.
///
/// Loaded from the shared chassis parameter file, so the geometry here is
/// always the one DriveCtrl commanded against.
#[derive(Debug, Default, Deserialize)]
pub struct Params {

    /// The position of each corner module in the robot body frame, as
    /// (forward, left) offsets from the chassis centroid.
    ///
    /// Order: FrontLeft, FrontRight, BackLeft, BackRight.
    ///
    /// Units: meters,
    /// Frame: Robot body
    pub corner_pos_m_rb: [[f64; 2]; NUM_CORNERS],

    /// Maximum linear velocity of the robot - the physical speed of a
    /// normalised wheel speed of 1.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_params_load() {
        let params: Params = util::params::load_from_path(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../params/chassis.toml"
        ))
        .unwrap();

        assert!(params.max_speed_ms > 0.0);
    }
}

//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use super::NUM_CORNERS;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Drive control.
///
/// Loaded from the shared chassis parameter file. Fields belonging to the
/// other drivetrain modules are ignored on deserialisation.
#[derive(Debug, Default, Deserialize)]
pub struct Params {

    // ---- GEOMETRY ----

    /// The position of each corner module in the robot body frame, as
    /// (forward, left) offsets from the chassis centroid.
    ///
    /// Order: FrontLeft, FrontRight, BackLeft, BackRight.
    ///
    /// Units: meters,
    /// Frame: Robot body
    pub corner_pos_m_rb: [[f64; 2]; NUM_CORNERS],

    // ---- CAPABILITIES ----

    /// Maximum voltage that may be demanded from a drive motor. Normalised
    /// drive speeds are scaled by this value on output.
    ///
    /// Units: volts
    pub max_voltage_v: f64,
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

        assert!(params.max_voltage_v > 0.0);
        for pos in params.corner_pos_m_rb.iter() {
            assert!(pos[0] != 0.0 || pos[1] != 0.0);
        }
    }
}

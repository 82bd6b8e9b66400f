//! # Telecommand module
//!
//! A telecommand is an instruction sent to the drivetrain executable, either
//! by an operator station or by a timed script. TCs are carried as JSON.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod drive;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
use drive::DriveCmd;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the drivetrain executable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Tc {
    /// Set the chassis drive command. The command remains in force until
    /// replaced by another `Mnvr` TC.
    Mnvr(DriveCmd),

    /// Emergency stop - latch safe mode, stop the speed governor and inhibit
    /// all demand output.
    MakeSafe,

    /// Release safe mode. The governor stays at zero until commanded back up.
    MakeUnsafe,

    /// Zero the heading sensor and reset the accumulated field pose to the
    /// origin.
    ZeroHeading,

    /// Increase the speed governor by one step.
    SpeedInc,

    /// Decrease the speed governor by one step.
    SpeedDec,

    /// Reset the speed governor to full speed.
    SpeedReset,

    /// Stop the speed governor (zero speed) without latching safe mode.
    SpeedStop,

    /// Set the speed governor directly. Values outside [0, 1] are ignored.
    SpeedSet { speed: f64 },
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC contains an invalid drive command: {0:?}")]
    InvalidDriveCmd(DriveCmd),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet.
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        let tc: Tc = serde_json::from_str(json_str)
            .map_err(TcParseError::InvalidJson)?;

        // Range-check manoeuvre commands at the boundary so that downstream
        // modules can assume their inputs are finite and in range.
        if let Tc::Mnvr(cmd) = tc {
            if !cmd.is_valid() {
                return Err(TcParseError::InvalidDriveCmd(cmd));
            }
        }

        Ok(tc)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_mnvr() {
        let tc = Tc::from_json(
            r#"{"mnvr": {"fwd": 0.5, "str": -0.25, "rot": 0.0}}"#
        ).unwrap();

        match tc {
            Tc::Mnvr(cmd) => {
                assert_eq!(cmd.fwd, 0.5);
                assert_eq!(cmd.str, -0.25);
                assert_eq!(cmd.rot, 0.0);
            }
            _ => panic!("expected a Mnvr TC"),
        }
    }

    #[test]
    fn test_parse_simple_tcs() {
        assert_eq!(Tc::from_json(r#""zero_heading""#).unwrap(), Tc::ZeroHeading);
        assert_eq!(Tc::from_json(r#""speed_inc""#).unwrap(), Tc::SpeedInc);
        assert_eq!(Tc::from_json(r#""make_safe""#).unwrap(), Tc::MakeSafe);
        assert_eq!(
            Tc::from_json(r#"{"speed_set": {"speed": 0.5}}"#).unwrap(),
            Tc::SpeedSet { speed: 0.5 }
        );
    }

    #[test]
    fn test_reject_out_of_range_mnvr() {
        let result = Tc::from_json(
            r#"{"mnvr": {"fwd": 1.5, "str": 0.0, "rot": 0.0}}"#
        );
        assert!(matches!(result, Err(TcParseError::InvalidDriveCmd(_))));
    }

    #[test]
    fn test_reject_bad_json() {
        assert!(matches!(
            Tc::from_json("not json"),
            Err(TcParseError::InvalidJson(_))
        ));
    }
}

//! # Drive control module
//!
//! Converts the chassis drive command into per-corner steer/drive demands
//! using the inverse swerve kinematics, resolves wheel flips against the
//! previously commanded wheel state, and applies the speed governor to the
//! drive efforts before they leave for the module drivers.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod kinematics;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

// Number of corner modules, re-exported so sibling modules don't need to
// reach into drive_if for it.
pub use drive_if::eqpt::swerve::NUM_CORNERS;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Recieved an invalid drive command: {0:?}")]
    InvalidCmd(drive_if::tc::drive::DriveCmd),

    #[error("DriveCtrl proc called before init")]
    NotInitialised,
}

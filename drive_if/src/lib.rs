//! # Drivetrain interface library
//!
//! This library defines the data passed across the boundaries of the
//! drivetrain executable: telecommands coming in from an operator station or
//! script, and equipment demands/sensing exchanged with the swerve module
//! drivers.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod eqpt;
pub mod tc;

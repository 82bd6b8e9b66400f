//! # Drivetrain library.
//!
//! This library allows other crates in the workspace (and the executable's own
//! tests) to access items defined inside the drivetrain crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Global data store - the per-cycle blackboard shared between modules
pub mod data_store;

/// Drive control module - converts chassis drive commands into individual wheel demands
pub mod drive_ctrl;

/// Speed governor - the scalar speed modifier applied to all drive demands
pub mod governor;

/// Odometry module - integrates measured wheel states into a field-relative pose
pub mod odom;

/// Swerve driver - the hardware boundary to the corner modules and heading sensor
pub mod swerve_drv;

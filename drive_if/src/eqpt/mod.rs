//! # Equipment interface module
//!
//! Defines the data exchanged with the drivetrain's equipment - the four
//! swerve modules and the heading sensor.

pub mod swerve;

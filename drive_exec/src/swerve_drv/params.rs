//! Parameters structure for the swerve driver

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the swerve driver.
///
/// Loaded from the shared chassis parameter file. Fields belonging to the
/// other drivetrain modules are ignored on deserialisation.
#[derive(Debug, Default, Deserialize, Clone, Copy)]
pub struct Params {
    /// Maximum linear velocity of the drivetrain - the physical speed of a
    /// normalised wheel speed of 1.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Maximum voltage which may be demanded of a drive motor.
    ///
    /// Units: volts
    pub max_voltage_v: f64,

    /// Gains for the steer axis position controllers.
    pub steer_gains: SteerGains,
}

/// Gains for a steer axis position controller.
///
/// These are passed through to the corner module drivers unmodified, the
/// control loop itself runs on the module.
#[derive(Debug, Default, Deserialize, Clone, Copy)]
pub struct SteerGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors from parameter validation.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("max_speed_ms must be finite and positive, got {0}")]
    InvalidMaxSpeed(f64),

    #[error("max_voltage_v must be finite and positive, got {0}")]
    InvalidMaxVoltage(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that the parameters describe a usable drivetrain.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        if !self.max_speed_ms.is_finite() || self.max_speed_ms <= 0.0 {
            return Err(ParamsError::InvalidMaxSpeed(self.max_speed_ms));
        }

        if !self.max_voltage_v.is_finite() || self.max_voltage_v <= 0.0 {
            return Err(ParamsError::InvalidMaxVoltage(self.max_voltage_v));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_params_load_and_validate() {
        let params: Params = util::params::load_from_path(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../params/chassis.toml"
        ))
        .unwrap();

        params.are_valid().unwrap();
        assert!(params.steer_gains.kp > 0.0);
    }
}

//! # Swerve driver module
//!
//! The hardware boundary of the drivetrain. The four corner modules and the
//! heading sensor are accessed through the [`SwerveModule`] and
//! [`HeadingSensor`] traits, so the executable is independent of the concrete
//! driver electronics - simulated implementations live in [`sim`].
//!
//! All reads and writes are fast, synchronous register-style accesses; no
//! call here blocks or performs bus transactions of unbounded length.
//!
//! Sensor readings are filtered at this boundary: a non-finite angle, speed
//! or heading reading is replaced by the last-known-good value for that
//! channel and a warning logged. Downstream modules may therefore assume
//! finite inputs.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod sim;

mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::warn;

// Internal
use drive_if::eqpt::swerve::{Corner, SwerveDems, SwerveSense, NUM_CORNERS};
pub use params::*;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Capability interface of one swerve corner module driver.
///
/// Four physically distinct but behaviourally identical drivers implement
/// this, one per corner.
pub trait SwerveModule {
    /// The measured steer axis absolute position.
    ///
    /// Units: radians
    fn get_angle_rad(&self) -> f64;

    /// The measured drive velocity.
    ///
    /// Units: meters/second
    fn get_speed_ms(&self) -> f64;

    /// Set the steer position and drive effort targets for this module.
    ///
    /// Units: radians, volts
    fn set_target(&mut self, angle_rad: f64, effort_v: f64);

    /// Hand the steer position controller gains to the module.
    ///
    /// Called once at initialisation and again whenever the tuning
    /// configuration is refreshed. Implementations without an onboard
    /// controller may ignore this.
    fn set_steer_gains(&mut self, _gains: &SteerGains) {}
}

/// Capability interface of the heading sensor.
pub trait HeadingSensor {
    /// The absolute yaw angle.
    ///
    /// Units: radians
    fn angle_rad(&self) -> f64;

    /// Zero the sensor - subsequent readings are relative to the current
    /// orientation.
    fn zero(&mut self);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The swerve driver - owns the four corner module drivers and the heading
/// sensor, and performs boundary filtering of their readings.
pub struct SwerveDriver {
    params: Params,

    modules: [Box<dyn SwerveModule>; NUM_CORNERS],
    heading: Box<dyn HeadingSensor>,

    last_good_sense: SwerveSense,
    last_good_heading_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while commanding the modules.
#[derive(Debug, thiserror::Error)]
pub enum CmdError {
    #[error("Demand for the {0:?} module is non-finite")]
    NonFiniteDemand(Corner),

    #[error("Demanded effort {0} V for the {1:?} module exceeds the {2} V limit")]
    EffortExceedsLimit(f64, Corner, f64),
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl SwerveDriver {
    /// Create a new driver from already-loaded parameters.
    ///
    /// Hands the steer gains down to the modules and takes the heading
    /// sensor's current reading as the first last-known-good value.
    pub fn new(
        params: Params,
        mut modules: [Box<dyn SwerveModule>; NUM_CORNERS],
        heading: Box<dyn HeadingSensor>,
    ) -> Result<Self, ParamsError> {
        params.are_valid()?;

        // Hand the steer gains down to the modules
        for module in modules.iter_mut() {
            module.set_steer_gains(&params.steer_gains);
        }

        let last_good_heading_rad = heading.angle_rad();

        Ok(Self {
            params,
            modules,
            heading,
            last_good_sense: SwerveSense::default(),
            last_good_heading_rad,
        })
    }

    /// Read the sensing data from all four modules.
    ///
    /// Non-finite readings are replaced by the last-known-good value for the
    /// corresponding channel.
    pub fn sense(&mut self) -> SwerveSense {
        let mut sense = self.last_good_sense;

        for corner in Corner::ALL.iter() {
            let i = corner.index();
            let module = &self.modules[i];

            let angle_rad = module.get_angle_rad();
            if angle_rad.is_finite() {
                sense.str_abs_pos_rad[i] = angle_rad;
            }
            else {
                warn!(
                    "Non-finite steer angle from the {:?} module, holding last good value",
                    corner
                );
            }

            let speed_ms = module.get_speed_ms();
            if speed_ms.is_finite() {
                sense.drv_speed_ms[i] = speed_ms;
            }
            else {
                warn!(
                    "Non-finite drive speed from the {:?} module, holding last good value",
                    corner
                );
            }
        }

        self.last_good_sense = sense;

        sense
    }

    /// Read the heading sensor.
    ///
    /// A non-finite reading is replaced by the last-known-good heading.
    pub fn heading_rad(&mut self) -> f64 {
        let angle_rad = self.heading.angle_rad();

        if angle_rad.is_finite() {
            self.last_good_heading_rad = angle_rad;
        }
        else {
            warn!("Non-finite heading reading, holding last good value");
        }

        self.last_good_heading_rad
    }

    /// Zero the heading sensor.
    pub fn zero_heading(&mut self) {
        self.heading.zero();
        self.last_good_heading_rad = self.heading.angle_rad();
    }

    /// Send the demands to the four modules.
    ///
    /// Demands are range-checked; an out-of-range demand rejects the whole
    /// set, leaving the modules on their previous targets.
    pub fn command(&mut self, dems: &SwerveDems) -> Result<(), CmdError> {
        for corner in Corner::ALL.iter() {
            let i = corner.index();

            if !dems.str_abs_pos_rad[i].is_finite()
                || !dems.drv_effort_v[i].is_finite()
            {
                return Err(CmdError::NonFiniteDemand(*corner));
            }

            if dems.drv_effort_v[i].abs() > self.params.max_voltage_v {
                return Err(CmdError::EffortExceedsLimit(
                    dems.drv_effort_v[i],
                    *corner,
                    self.params.max_voltage_v,
                ));
            }
        }

        for (i, module) in self.modules.iter_mut().enumerate() {
            module.set_target(dems.str_abs_pos_rad[i], dems.drv_effort_v[i]);
        }

        Ok(())
    }

    /// Maximum linear velocity of the drivetrain.
    pub fn max_speed_ms(&self) -> f64 {
        self.params.max_speed_ms
    }

    /// Maximum drive voltage of the drivetrain.
    pub fn max_voltage_v(&self) -> f64 {
        self.params.max_voltage_v
    }
}

#[cfg(test)]
mod test {
    use super::sim::{SimHeading, SimModule};
    use super::*;

    fn test_params() -> Params {
        Params {
            max_speed_ms: 4.0,
            max_voltage_v: 12.0,
            steer_gains: SteerGains { kp: 0.2, ki: 0.0, kd: 0.1 },
        }
    }

    fn sim_modules(params: &Params) -> [Box<dyn SwerveModule>; NUM_CORNERS] {
        [
            Box::new(SimModule::new(params.max_speed_ms, params.max_voltage_v)),
            Box::new(SimModule::new(params.max_speed_ms, params.max_voltage_v)),
            Box::new(SimModule::new(params.max_speed_ms, params.max_voltage_v)),
            Box::new(SimModule::new(params.max_speed_ms, params.max_voltage_v)),
        ]
    }

    /// A module whose sensing has gone bad.
    struct FaultyModule;

    impl SwerveModule for FaultyModule {
        fn get_angle_rad(&self) -> f64 {
            f64::NAN
        }

        fn get_speed_ms(&self) -> f64 {
            f64::INFINITY
        }

        fn set_target(&mut self, _angle_rad: f64, _effort_v: f64) {}
    }

    #[test]
    fn test_command_and_sense_round_trip() {
        let params = test_params();
        let mut driver = SwerveDriver::new(
            params,
            sim_modules(&params),
            Box::new(SimHeading::default()),
        )
        .unwrap();

        let dems = SwerveDems {
            str_abs_pos_rad: [0.1, 0.2, 0.3, 0.4],
            drv_effort_v: [6.0, -6.0, 12.0, 0.0],
        };

        driver.command(&dems).unwrap();

        let sense = driver.sense();
        assert_eq!(sense.str_abs_pos_rad, dems.str_abs_pos_rad);

        // Sim modules run at effort/max_voltage * max_speed
        assert!((sense.drv_speed_ms[0] - 2.0).abs() < 1e-12);
        assert!((sense.drv_speed_ms[1] + 2.0).abs() < 1e-12);
        assert!((sense.drv_speed_ms[2] - 4.0).abs() < 1e-12);
        assert_eq!(sense.drv_speed_ms[3], 0.0);
    }

    #[test]
    fn test_over_limit_demand_rejected() {
        let params = test_params();
        let mut driver = SwerveDriver::new(
            params,
            sim_modules(&params),
            Box::new(SimHeading::default()),
        )
        .unwrap();

        let dems = SwerveDems {
            str_abs_pos_rad: [0.0; NUM_CORNERS],
            drv_effort_v: [0.0, 13.0, 0.0, 0.0],
        };

        assert!(matches!(
            driver.command(&dems),
            Err(CmdError::EffortExceedsLimit(_, Corner::FrontRight, _))
        ));
    }

    #[test]
    fn test_non_finite_sense_held_at_last_good() {
        let params = test_params();

        let modules: [Box<dyn SwerveModule>; NUM_CORNERS] = [
            Box::new(FaultyModule),
            Box::new(SimModule::new(params.max_speed_ms, params.max_voltage_v)),
            Box::new(SimModule::new(params.max_speed_ms, params.max_voltage_v)),
            Box::new(SimModule::new(params.max_speed_ms, params.max_voltage_v)),
        ];

        let mut driver = SwerveDriver::new(
            params,
            modules,
            Box::new(SimHeading::default()),
        )
        .unwrap();

        // Corner 0's readings are garbage - it holds the default (zero)
        // last-good values while the healthy corners read through
        let sense = driver.sense();
        assert_eq!(sense.str_abs_pos_rad[0], 0.0);
        assert_eq!(sense.drv_speed_ms[0], 0.0);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = Params {
            max_speed_ms: 0.0,
            ..test_params()
        };

        let modules = sim_modules(&params);
        assert!(matches!(
            SwerveDriver::new(params, modules, Box::new(SimHeading::default())),
            Err(ParamsError::InvalidMaxSpeed(_))
        ));
    }
}

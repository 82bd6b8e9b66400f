//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::kinematics::{self, Geometry, WheelState};
use super::{DriveCtrlError, Params, NUM_CORNERS};
use drive_if::eqpt::swerve::SwerveDems;
use drive_if::tc::drive::DriveCmd;
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
#[derive(Default)]
pub struct DriveCtrl {
    pub(crate) params: Params,

    /// Geometry derived from the params, `None` until init.
    geometry: Option<Geometry>,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    /// The drive command currently in force. Kept between cycles so that the
    /// robot continues the last manoeuvre until told otherwise.
    pub(crate) current_cmd: Option<DriveCmd>,

    /// The wheel state commanded on the previous cycle. Flip resolution and
    /// angle holding both work against this, not against sensed positions.
    wheels_dem: WheelState,

    pub(crate) output: Option<SwerveDems>,
    arch_output: Archiver,
}

/// Input data to Drive Control.
#[derive(Default)]
pub struct InputData {
    /// The drive command to be executed, or `None` if there is no new command
    /// on this cycle.
    pub cmd: Option<DriveCmd>,

    /// The speed governor value for this cycle, in [0, 1].
    pub governor: f64,
}

/// Status report for DriveCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the demanded corner speeds had to be rescaled to stay within
    /// the drivetrain's capability.
    pub saturated: bool,

    /// The governor value that was applied to the drive efforts.
    pub governor: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DriveCtrl {
    type InitData = &'static str;
    type InitError = InitError;

    type InputData = InputData;
    type OutputData = SwerveDems;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the DriveCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = params::load(init_data)?;

        self.geometry = Some(Geometry::from_params(&self.params.corner_pos_m_rb)?);

        // Create the arch folder for drive_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("drive_ctrl");
        std::fs::create_dir_all(arch_path)
            .map_err(InitError::ArchDirCreateError)?;

        // Initialise the archivers
        self.arch_report = Archiver::from_path(
            session, "drive_ctrl/status_report.csv"
        ).map_err(|_| InitError::ArchiverInitError)?;
        self.arch_output = Archiver::from_path(
            session, "drive_ctrl/output.csv"
        ).map_err(|_| InitError::ArchiverInitError)?;

        Ok(())
    }

    /// Perform cyclic processing of Drive Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();
        self.report.governor = input_data.governor;

        // Check to see if there's a new command
        if let Some(cmd) = input_data.cmd {
            if !cmd.is_valid() {
                return Err(DriveCtrlError::InvalidCmd(cmd));
            }

            self.current_cmd = Some(cmd);
        }

        // With no command yet recieved a zero command is used - all speeds
        // zero, all angles held, which is the defined idle behaviour.
        let cmd = self.current_cmd.unwrap_or_default();

        let geometry = match self.geometry {
            Some(ref g) => g,
            None => return Err(DriveCtrlError::NotInitialised),
        };

        let (wheels, saturated) =
            kinematics::cmd_to_wheel_state(&cmd, &self.wheels_dem, geometry);

        self.report.saturated = saturated;
        self.wheels_dem = wheels;

        // Scale the normalised speeds into voltage demands, applying the
        // governor. The governor never affects the steer angles.
        let mut output = SwerveDems {
            str_abs_pos_rad: wheels.str_abs_pos_rad,
            ..SwerveDems::default()
        };

        for i in 0..NUM_CORNERS {
            output.drv_effort_v[i] = wheels.drv_speed_norm[i]
                * self.params.max_voltage_v
                * input_data.governor;
        }

        if !cmd.is_zero() {
            trace!(
                "DriveCtrl output:\n    str: {:?}\n    drv: {:?}",
                output.str_abs_pos_rad,
                output.drv_effort_v
            );
        }

        self.output = Some(output);

        Ok((output, self.report))
    }
}

/// Flat per-cycle record of the status report, timestamped against the
/// session epoch.
#[derive(Serialize)]
struct ReportRecord {
    time_s: f64,
    saturated: bool,
    governor: f64,
}

/// Flat per-cycle record of the output demands. CSV rows cannot carry the
/// per-corner arrays directly, so each corner gets its own column.
#[derive(Serialize)]
struct OutputRecord {
    time_s: f64,
    str_fl_rad: f64,
    str_fr_rad: f64,
    str_bl_rad: f64,
    str_br_rad: f64,
    drv_fl_v: f64,
    drv_fr_v: f64,
    drv_bl_v: f64,
    drv_br_v: f64,
}

impl Archived for DriveCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let time_s = util::session::get_elapsed_seconds();

        self.arch_report.serialise(ReportRecord {
            time_s,
            saturated: self.report.saturated,
            governor: self.report.governor,
        })?;

        let dems = self.output.unwrap_or_default();
        self.arch_output.serialise(OutputRecord {
            time_s,
            str_fl_rad: dems.str_abs_pos_rad[0],
            str_fr_rad: dems.str_abs_pos_rad[1],
            str_bl_rad: dems.str_abs_pos_rad[2],
            str_br_rad: dems.str_abs_pos_rad[3],
            drv_fl_v: dems.drv_effort_v[0],
            drv_fr_v: dems.drv_effort_v[1],
            drv_bl_v: dems.drv_effort_v[2],
            drv_br_v: dems.drv_effort_v[3],
        })?;

        Ok(())
    }
}

impl DriveCtrl {
    /// The wheel state commanded on the most recent cycle.
    pub fn wheels_dem(&self) -> WheelState {
        self.wheels_dem
    }

    /// Bring the module to a safe state - drop the current command, so
    /// subsequent cycles demand zero speed with angles held.
    pub fn make_safe(&mut self) {
        self.current_cmd = None;
    }
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur during DriveCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(#[from] params::LoadError),

    #[error("Loaded geometry is invalid: {0}")]
    GeometryInvalid(#[from] kinematics::GeometryError),

    #[error("Could not create the archive directory: {0}")]
    ArchDirCreateError(std::io::Error),

    #[error("Could not initialise an archiver")]
    ArchiverInitError,
}

#[cfg(test)]
mod test {
    use super::*;

    /// A DriveCtrl ready for proc without going through file-based init.
    fn test_ctrl() -> DriveCtrl {
        let params = Params {
            corner_pos_m_rb: [
                [0.3, 0.3],
                [0.3, -0.3],
                [-0.3, 0.3],
                [-0.3, -0.3],
            ],
            max_voltage_v: 12.0,
        };

        let geometry = Geometry::from_params(&params.corner_pos_m_rb).unwrap();

        DriveCtrl {
            params,
            geometry: Some(geometry),
            ..DriveCtrl::default()
        }
    }

    #[test]
    fn test_governor_scales_effort_not_angle() {
        let mut ctrl = test_ctrl();

        let input = InputData {
            cmd: Some(DriveCmd { fwd: 1.0, str: 0.0, rot: 0.0 }),
            governor: 0.5,
        };

        let (dems, report) = ctrl.proc(&input).unwrap();

        for i in 0..NUM_CORNERS {
            assert!(dems.str_abs_pos_rad[i].abs() < 1e-12);
            assert!((dems.drv_effort_v[i] - 6.0).abs() < 1e-12);
        }
        assert!(!report.saturated);
        assert_eq!(report.governor, 0.5);
    }

    #[test]
    fn test_command_persists_between_cycles() {
        let mut ctrl = test_ctrl();

        let input = InputData {
            cmd: Some(DriveCmd { fwd: 0.5, str: 0.0, rot: 0.0 }),
            governor: 1.0,
        };
        ctrl.proc(&input).unwrap();

        // No new command - the previous manoeuvre continues
        let (dems, _) = ctrl
            .proc(&InputData { cmd: None, governor: 1.0 })
            .unwrap();

        for i in 0..NUM_CORNERS {
            assert!((dems.drv_effort_v[i] - 6.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_make_safe_zeroes_demands() {
        let mut ctrl = test_ctrl();

        ctrl.proc(&InputData {
            cmd: Some(DriveCmd { fwd: 1.0, str: 0.0, rot: 0.0 }),
            governor: 1.0,
        })
        .unwrap();

        ctrl.make_safe();

        let (dems, _) = ctrl
            .proc(&InputData { cmd: None, governor: 1.0 })
            .unwrap();

        assert_eq!(dems.drv_effort_v, [0.0; NUM_CORNERS]);
    }

    #[test]
    fn test_archive_records_lead_with_time() {
        // Archive rows must be relatable to the session timeline, so every
        // record carries the elapsed time as its first column.
        let mut writer = util::archive::Writer::from_writer(vec![]);
        writer
            .serialize(ReportRecord {
                time_s: 1.25,
                saturated: false,
                governor: 1.0,
            })
            .unwrap();

        let csv = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(csv.starts_with("time_s,"));
        assert!(csv.contains("\n1.25,"));
    }

    #[test]
    fn test_invalid_cmd_rejected() {
        let mut ctrl = test_ctrl();

        let result = ctrl.proc(&InputData {
            cmd: Some(DriveCmd { fwd: 2.0, str: 0.0, rot: 0.0 }),
            governor: 1.0,
        });

        assert!(matches!(result, Err(DriveCtrlError::InvalidCmd(_))));
    }
}

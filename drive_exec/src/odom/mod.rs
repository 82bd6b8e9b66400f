//! # Odometry module
//!
//! Dead-reckons the robot's field-relative pose from the measured wheel
//! states and the heading sensor.
//!
//! Translation comes from the wheels (via the forward kinematics), heading
//! comes exclusively from the heading sensor - the wheel-derived rotation
//! rate is discarded rather than integrated, since wheel slip would compound
//! into an unbounded heading error while the sensor's error stays bounded.
//!
//! Each interval's translation is rotated into the field frame using the
//! midpoint of the previous and current heading samples. Using the endpoint
//! heading instead would introduce a first-order error whenever the robot
//! rotates while translating.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

// Internal
use crate::drive_ctrl::kinematics::{self, Geometry, WheelState};
pub use params::*;
use util::{
    archive::{Archived, Archiver},
    maths::ang_shortest_dist,
    module::State,
    params as param_loader,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The accumulated field-relative pose of the robot.
///
/// Owned exclusively by the [`Odometry`] module - consumers get value
/// snapshots, never references into the module's state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position in the field map frame.
    ///
    /// Units: meters,
    /// Frame: Field map
    pub pos_m_fm: [f64; 2],

    /// Heading - the angle from the field map X+ axis to the robot's forward
    /// axis, positive counter-clockwise.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// Odometry module state
#[derive(Default)]
pub struct Odometry {
    params: Params,

    /// Geometry derived from the params, `None` until init.
    geometry: Option<Geometry>,

    pose: Pose,

    /// The heading sample from the previous cycle. `None` until the first
    /// proc after init or zeroing, in which case translation integration is
    /// skipped for one cycle.
    last_heading_rad: Option<f64>,

    /// The measured wheel state from the most recent proc, kept for
    /// archiving and telemetry.
    wheels: WheelState,

    report: StatusReport,

    arch_pose: Archiver,
    arch_wheels: Archiver,
}

/// Input data to Odometry.
#[derive(Default)]
pub struct InputData {
    /// The measured wheel state for this cycle.
    pub wheels: WheelState,

    /// The heading sensor reading for this cycle.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// Time elapsed since the previous cycle's sensing.
    ///
    /// Units: seconds
    pub dt_s: f64,
}

/// Status report for Odometry processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if translation integration was skipped this cycle (non-positive
    /// time delta or no previous heading sample). The heading is still
    /// updated on such cycles.
    pub translation_skipped: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur during Odometry initialisation.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(#[from] param_loader::LoadError),

    #[error("Loaded geometry is invalid: {0}")]
    GeometryInvalid(#[from] kinematics::GeometryError),

    #[error("Could not create the archive directory: {0}")]
    ArchDirCreateError(std::io::Error),

    #[error("Could not initialise an archiver")]
    ArchiverInitError,
}

/// Errors which can occur during Odometry processing.
#[derive(Debug, thiserror::Error)]
pub enum ProcError {
    #[error("Odometry proc called before init")]
    NotInitialised,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for Odometry {
    type InitData = &'static str;
    type InitError = InitError;

    type InputData = InputData;
    type OutputData = Pose;
    type StatusReport = StatusReport;
    type ProcError = ProcError;

    /// Initialise the Odometry module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = param_loader::load(init_data)?;

        self.geometry = Some(Geometry::from_params(&self.params.corner_pos_m_rb)?);

        let mut arch_path = session.arch_root.clone();
        arch_path.push("odom");
        std::fs::create_dir_all(arch_path)
            .map_err(InitError::ArchDirCreateError)?;

        self.arch_pose = Archiver::from_path(session, "odom/pose.csv")
            .map_err(|_| InitError::ArchiverInitError)?;
        self.arch_wheels = Archiver::from_path(session, "odom/wheels.csv")
            .map_err(|_| InitError::ArchiverInitError)?;

        Ok(())
    }

    /// Perform cyclic processing of Odometry - advance the pose estimate by
    /// one sensing interval.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.report = StatusReport::default();

        let geometry = match self.geometry {
            Some(ref g) => g,
            None => return Err(ProcError::NotInitialised),
        };

        self.wheels = input_data.wheels;

        // Recover the chassis-relative motion from the measured wheels. The
        // rotation component is discarded, see the module docs.
        let motion = kinematics::wheel_state_to_cmd(&input_data.wheels, geometry);

        let heading_now = input_data.heading_rad;

        match self.last_heading_rad {
            Some(last) if input_data.dt_s > 0.0 => {
                // Midpoint heading for the interval
                let mid_heading_rad =
                    last + 0.5 * ang_shortest_dist(last, heading_now);

                let vel_ms_fm = Rotation2::new(mid_heading_rad)
                    * Vector2::new(motion.fwd, motion.str)
                    * self.params.max_speed_ms;

                self.pose.pos_m_fm[0] += vel_ms_fm.x * input_data.dt_s;
                self.pose.pos_m_fm[1] += vel_ms_fm.y * input_data.dt_s;
            }
            // First cycle after init/zeroing, or a degenerate time delta -
            // legal, but nothing to integrate
            _ => self.report.translation_skipped = true,
        }

        self.pose.heading_rad = heading_now;
        self.last_heading_rad = Some(heading_now);

        trace!("Odometry pose: {:?}", self.pose);

        Ok((self.pose, self.report))
    }
}

/// Flat per-cycle record of the pose, one column per scalar, timestamped
/// against the session epoch.
#[derive(Serialize)]
struct PoseRecord {
    time_s: f64,
    x_m: f64,
    y_m: f64,
    heading_rad: f64,
}

/// Flat per-cycle record of the measured wheel state.
#[derive(Serialize)]
struct WheelsRecord {
    time_s: f64,
    str_fl_rad: f64,
    str_fr_rad: f64,
    str_bl_rad: f64,
    str_br_rad: f64,
    drv_fl_norm: f64,
    drv_fr_norm: f64,
    drv_bl_norm: f64,
    drv_br_norm: f64,
}

impl Archived for Odometry {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let time_s = util::session::get_elapsed_seconds();

        self.arch_pose.serialise(PoseRecord {
            time_s,
            x_m: self.pose.pos_m_fm[0],
            y_m: self.pose.pos_m_fm[1],
            heading_rad: self.pose.heading_rad,
        })?;

        self.arch_wheels.serialise(WheelsRecord {
            time_s,
            str_fl_rad: self.wheels.str_abs_pos_rad[0],
            str_fr_rad: self.wheels.str_abs_pos_rad[1],
            str_bl_rad: self.wheels.str_abs_pos_rad[2],
            str_br_rad: self.wheels.str_abs_pos_rad[3],
            drv_fl_norm: self.wheels.drv_speed_norm[0],
            drv_fr_norm: self.wheels.drv_speed_norm[1],
            drv_bl_norm: self.wheels.drv_speed_norm[2],
            drv_br_norm: self.wheels.drv_speed_norm[3],
        })?;

        Ok(())
    }
}

impl Odometry {
    /// Zero the pose estimate.
    ///
    /// `heading_now_rad` must be the sensor reading *after* any sensor-side
    /// zeroing, so that the next proc does not integrate the reference jump
    /// into the translation.
    pub fn zero(&mut self, heading_now_rad: f64) {
        self.pose = Pose::default();
        self.last_heading_rad = Some(heading_now_rad);
    }

    /// The current pose snapshot.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The measured wheel state from the most recent proc.
    pub fn wheels(&self) -> WheelState {
        self.wheels
    }
}

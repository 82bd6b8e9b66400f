//! # Data Store
//!
//! The global blackboard for the executable. All module state and per-cycle
//! module inputs/outputs live here, and only the single control thread ever
//! touches it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::Serialize;

// Internal
use crate::{drive_ctrl, drive_ctrl::kinematics::WheelState, governor::SpeedGovernor, odom};
use drive_if::eqpt::swerve::SwerveDems;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the drivetrain has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize)]
pub enum SafeModeCause {
    /// An operator MakeSafe telecommand
    MakeSafeTc,

    /// Too many consecutive cycle overruns
    CycleOverrunLimit,
}

/// A record of a safe mode entry, saved to the session directory.
#[derive(Debug, Serialize)]
struct SafeModeEvent {
    cause: SafeModeCause,
    num_cycles: u128,
    elapsed_time_s: f64,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time
    pub elapsed_time_s: f64,

    // Safe mode variables
    /// Determines if the drivetrain is in safe mode.
    pub safe: bool,

    /// Gives the reason for the drivetrain being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // DriveCtrl
    pub drive_ctrl: drive_ctrl::DriveCtrl,
    pub drive_ctrl_input: drive_ctrl::InputData,

    /// The demands most recently sent to the module drivers. Unlike the
    /// input and status report this is not cleared at cycle start, so a
    /// cycle on which DriveCtrl errors re-sends the previous demands rather
    /// than snapping every steer angle to the default zero.
    pub drive_ctrl_output: SwerveDems,

    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,

    // Odometry
    pub odom: odom::Odometry,
    pub odom_status_rpt: odom::StatusReport,

    /// Latest pose estimate, snapshotted after Odometry processing.
    pub pose: odom::Pose,

    /// The measured wheel state built from this cycle's module sensing.
    pub wheels_sense: WheelState,

    // Speed governor
    pub governor: SpeedGovernor,

    /// Set when a ZeroHeading TC arrives, consumed by the main loop before
    /// the next Odometry proc.
    pub zero_heading_req: bool,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the drivetrain into safe mode with the given cause.
    ///
    /// Besides latching the flag this stops the governor and drops the
    /// current drive command, so every later cycle demands zero effort with
    /// the steer angles held.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            self.governor.stop();
            self.drive_ctrl.make_safe();

            util::session::save_with_timestamp(
                "safe_mode_event.json",
                SafeModeEvent {
                    cause,
                    num_cycles: self.num_cycles,
                    elapsed_time_s: self.elapsed_time_s,
                },
            );
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned.
    ///
    /// Leaving safe mode does not restart the governor - a speed reset or set
    /// is needed before the drivetrain will move again.
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) => {
                if cause == root_cause {
                    self.safe = false;
                    self.safe_cause = None;
                    info!("Make unsafe requested, root cause match, safe mode disabled");
                    Ok(())
                } else {
                    Err(())
                }
            }
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;

        // The output demands are deliberately not cleared here, see the
        // field docs.
        self.drive_ctrl_input = drive_ctrl::InputData::default();
        self.drive_ctrl_status_rpt = drive_ctrl::StatusReport::default();
        self.odom_status_rpt = odom::StatusReport::default();

        self.elapsed_time_s = util::session::get_elapsed_seconds();
    }
}

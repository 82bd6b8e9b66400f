//! Main drivetrain executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - System input acquisition:
//!             - Corner module sensing
//!             - Heading sensing
//!         - Telecommand processing and handling
//!         - Odometry processing
//!         - Drive control processing
//!         - Swerve driver execution
//!
//! # Modules
//!
//! All modules (e.g. `drive_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use drive_if::eqpt::swerve::NUM_CORNERS;
use drive_if::tc::Tc;
use drive_lib::{
    data_store::{DataStore, SafeModeCause},
    drive_ctrl::kinematics::WheelState,
    swerve_drv::{
        sim::{SimHeading, SimModule},
        HeadingSensor, SwerveDriver, SwerveModule,
    },
};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

/// Limit of the number of consecutive cycle overruns before safe mode is
/// engaged.
const MAX_CYCLE_OVERRUN_LIMIT: u64 = 50;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("drive_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Triton Drivetrain Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE TC SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        return Err(eyre!(
            "Expected exactly one argument (the TC script path), found {}",
            args.len() - 1
        ));
    }

    info!("Loading script from \"{}\"", &args[1]);

    let mut script = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        script.get_duration(),
        script.get_num_tcs()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    // All drivetrain modules share the chassis parameter file, so the
    // geometry and capability figures cannot drift apart between them.
    ds.drive_ctrl
        .init("chassis.toml", &session)
        .wrap_err("Failed to initialise DriveCtrl")?;
    info!("DriveCtrl init complete");

    ds.odom
        .init("chassis.toml", &session)
        .wrap_err("Failed to initialise Odometry")?;
    info!("Odometry init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE EQUIPMENT ----

    // Only simulated equipment for now, real module drivers slot in behind
    // the same traits.
    let drv_params: drive_lib::swerve_drv::Params =
        util::params::load("chassis.toml").wrap_err("Could not load swerve_drv params")?;

    let modules: [Box<dyn SwerveModule>; NUM_CORNERS] = [
        Box::new(SimModule::new(drv_params.max_speed_ms, drv_params.max_voltage_v)),
        Box::new(SimModule::new(drv_params.max_speed_ms, drv_params.max_voltage_v)),
        Box::new(SimModule::new(drv_params.max_speed_ms, drv_params.max_voltage_v)),
        Box::new(SimModule::new(drv_params.max_speed_ms, drv_params.max_voltage_v)),
    ];
    let heading: Box<dyn HeadingSensor> = Box::new(SimHeading::default());

    let mut swerve_drv = SwerveDriver::new(drv_params, modules, heading)
        .wrap_err("Failed to initialise the swerve driver")?;

    info!("Swerve driver initialised (sim equipment)\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    // Instant of the previous cycle's sensing, `None` until the first cycle
    // has sensed.
    let mut last_sense_instant: Option<Instant> = None;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- TELECOMMAND PROCESSING ----

        match script.get_pending_tcs() {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    // In safe mode only the make unsafe TC is actioned
                    if ds.safe && !matches!(tc, Tc::MakeUnsafe) {
                        warn!("Cannot execute {:?} while in safe mode", tc);
                        continue;
                    }

                    tc_processor::exec(&mut ds, tc);
                }
            }
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of TC script reached, stopping");
                break;
            }
        }

        // ---- ZERO HEADING HANDLING ----

        // Zeroing happens before sensing so that this cycle's odometry
        // already works in the new heading reference.
        if ds.zero_heading_req {
            swerve_drv.zero_heading();
            ds.odom.zero(swerve_drv.heading_rad());
            ds.zero_heading_req = false;
            info!("Heading zeroed, pose estimate re-based");
        }

        // ---- DATA INPUT ----

        let sense = swerve_drv.sense();
        let heading_rad = swerve_drv.heading_rad();

        let sense_instant = Instant::now();
        let dt_s = match last_sense_instant {
            Some(last) => (sense_instant - last).as_secs_f64(),
            None => 0.0,
        };
        last_sense_instant = Some(sense_instant);

        // Snapshot the measured wheel state for telemetry and odometry
        ds.wheels_sense = WheelState::from_sense(&sense, swerve_drv.max_speed_ms());

        // ---- ODOMETRY PROCESSING ----

        match ds.odom.proc(&drive_lib::odom::InputData {
            wheels: ds.wheels_sense,
            heading_rad,
            dt_s,
        }) {
            Ok((pose, rpt)) => {
                ds.pose = pose;
                ds.odom_status_rpt = rpt;
            }
            Err(e) => warn!("Error during Odometry processing: {}", e),
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // The governor value is sampled once per cycle so that a mid-cycle
        // speed TC cannot produce mixed demands.
        ds.drive_ctrl_input.governor = ds.governor.value();

        match ds.drive_ctrl.proc(&ds.drive_ctrl_input) {
            Ok((o, r)) => {
                ds.drive_ctrl_output = o;
                ds.drive_ctrl_status_rpt = r;
            }
            Err(e) => {
                // DriveCtrl errors usually just mean you sent the wrong TC,
                // so just issue the warning and continue.
                warn!("Error during DriveCtrl processing: {}", e)
            }
        };

        // In safe mode the output stage is inhibited regardless of what the
        // control modules produced
        if ds.safe {
            ds.drive_ctrl_output = ds.drive_ctrl_output.with_zero_effort();
        }

        // Send demands to the module drivers
        if let Err(e) = swerve_drv.command(&ds.drive_ctrl_output) {
            warn!("Swerve driver rejected the demands: {}", e);
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = util::archive::Archived::write(&mut ds.drive_ctrl) {
            warn!("Could not archive DriveCtrl data: {}", e);
        }
        if let Err(e) = util::archive::Archived::write(&mut ds.odom) {
            warn!("Could not archive Odometry data: {}", e);
        }

        // ---- TELEMETRY ----

        if ds.is_1_hz_cycle {
            info!(
                "[{:.2} s] pose: ({:.3}, {:.3}) m, {:.3} rad; governor: {:.2}; safe: {}",
                ds.elapsed_time_s,
                ds.pose.pos_m_fm[0],
                ds.pose.pos_m_fm[1],
                ds.pose.heading_rad,
                ds.governor.value(),
                ds.safe
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;

                if ds.num_consec_cycle_overruns > MAX_CYCLE_OVERRUN_LIMIT {
                    ds.make_safe(SafeModeCause::CycleOverrunLimit);
                }
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    // Leave a final pose snapshot in the session directory
    session.save("final_pose.json", ds.pose);

    session.exit();

    Ok(())
}

//! # Telecommand processor module
//!
//! The telecommand processor handles various TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use drive_if::tc::Tc;
use drive_lib::data_store::{DataStore, SafeModeCause};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules.
pub(crate) fn exec(ds: &mut DataStore, tc: &Tc) {
    // Handle different Tcs
    match tc {
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc);
        }
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            ds.make_unsafe(SafeModeCause::MakeSafeTc).ok();
        }
        Tc::Mnvr(m) => ds.drive_ctrl_input.cmd = Some(*m),
        Tc::ZeroHeading => {
            debug!("Recieved ZeroHeading command");
            ds.zero_heading_req = true;
        }
        Tc::SpeedInc => ds.governor.increase(),
        Tc::SpeedDec => ds.governor.decrease(),
        Tc::SpeedReset => ds.governor.reset(),
        Tc::SpeedStop => ds.governor.stop(),
        Tc::SpeedSet { speed } => ds.governor.set(*speed),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use drive_if::tc::drive::DriveCmd;

    #[test]
    fn test_mnvr_sets_drive_ctrl_input() {
        let mut ds = DataStore::default();
        let cmd = DriveCmd { fwd: 0.5, str: 0.0, rot: -0.2 };

        exec(&mut ds, &Tc::Mnvr(cmd));

        assert_eq!(ds.drive_ctrl_input.cmd, Some(cmd));
    }

    #[test]
    fn test_speed_tcs_drive_the_governor() {
        let mut ds = DataStore::default();

        exec(&mut ds, &Tc::SpeedSet { speed: 0.5 });
        assert_eq!(ds.governor.value(), 0.5);

        exec(&mut ds, &Tc::SpeedStop);
        assert_eq!(ds.governor.value(), 0.0);

        exec(&mut ds, &Tc::SpeedReset);
        assert_eq!(ds.governor.value(), 1.0);
    }

    #[test]
    fn test_zero_heading_raises_request() {
        let mut ds = DataStore::default();

        exec(&mut ds, &Tc::ZeroHeading);
        assert!(ds.zero_heading_req);
    }
}

//! # Velocity command register
//!
//! The register holds the latest velocity command together with the
//! simulation time it was received at. It is shared between the command
//! client's worker thread (writer) and the control cycle (reader), so all
//! access goes through a mutex which is held only for the duration of the
//! scalar copy.
//!
//! Staleness policy: a command older than the configured timeout has no
//! effect (the effective command is zero), but the stored values are left
//! untouched. Age exactly equal to the timeout still counts as fresh.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use sim_if::cmd::VelCmd;
use std::sync::{Arc, Mutex};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Inner state of the register.
#[derive(Clone, Copy, Debug, Default)]
struct RegisterState {
    /// Latest command received.
    cmd: VelCmd,

    /// Simulation time the latest command was received at, or `None` if no
    /// command has ever been received.
    rx_time_s: Option<f64>,
}

/// A shared register holding the latest velocity command.
///
/// Cloning the register produces another handle onto the same shared state.
#[derive(Clone, Default)]
pub struct VelCmdRegister {
    state: Arc<Mutex<RegisterState>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VelCmdRegister {
    /// Create a new register with no command stored.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored command unconditionally, recording the receive
    /// time.
    pub fn set(&self, cmd: VelCmd, rx_time_s: f64) {
        let mut state = self.state.lock().expect("VelCmdRegister mutex poisoned");

        state.cmd = cmd;
        state.rx_time_s = Some(rx_time_s);
    }

    /// Get the effective command at the given simulation time.
    ///
    /// Returns the stored command and `false` while the command is fresh
    /// (`current_time_s - rx_time_s <= timeout_s`), or the zero command and
    /// `true` once it has gone stale. A register which has never received a
    /// command is always stale.
    pub fn effective(&self, current_time_s: f64, timeout_s: f64) -> (VelCmd, bool) {
        let state = self.state.lock().expect("VelCmdRegister mutex poisoned");

        match state.rx_time_s {
            Some(rx_time_s) if current_time_s - rx_time_s <= timeout_s => (state.cmd, false),
            _ => (VelCmd::default(), true),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const CMD: VelCmd = VelCmd {
        lin_x_ms: 1.0,
        lin_y_ms: -0.5,
        ang_z_rads: 0.2,
    };

    #[test]
    fn test_never_received_is_stale() {
        let register = VelCmdRegister::new();

        let (cmd, stale) = register.effective(0.5, 0.25);

        assert!(stale);
        assert_eq!(cmd, VelCmd::default());
    }

    #[test]
    fn test_fresh_command_passes_through() {
        let register = VelCmdRegister::new();
        register.set(CMD, 0.0);

        let (cmd, stale) = register.effective(0.1, 0.25);

        assert!(!stale);
        assert_eq!(cmd, CMD);
    }

    #[test]
    fn test_boundary_age_is_fresh() {
        let register = VelCmdRegister::new();
        register.set(CMD, 1.0);

        // Age exactly equal to the timeout counts as fresh
        let (cmd, stale) = register.effective(1.25, 0.25);

        assert!(!stale);
        assert_eq!(cmd, CMD);

        // Just over the timeout is stale
        let (cmd, stale) = register.effective(1.250001, 0.25);

        assert!(stale);
        assert_eq!(cmd, VelCmd::default());
    }

    #[test]
    fn test_staleness_leaves_storage_untouched() {
        let register = VelCmdRegister::new();
        register.set(CMD, 0.0);

        // Command received at t=0 with a 0.25 s timeout has no effect at
        // t=0.5
        let (cmd, stale) = register.effective(0.5, 0.25);
        assert!(stale);
        assert_eq!(cmd, VelCmd::default());

        // The stored values were not zeroed, only masked: querying within
        // the timeout window again returns them
        let (cmd, stale) = register.effective(0.2, 0.25);
        assert!(!stale);
        assert_eq!(cmd, CMD);
    }

    #[test]
    fn test_zero_timeout() {
        let register = VelCmdRegister::new();
        register.set(CMD, 2.0);

        // With a zero timeout only an exactly-simultaneous query is fresh
        let (_, stale) = register.effective(2.0, 0.0);
        assert!(!stale);

        let (_, stale) = register.effective(2.001, 0.0);
        assert!(stale);
    }
}

//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use sim_if::{cmd::VelCmd, phys::{BodyState, WrenchDems}};

use crate::{odom, vel_ctrl};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Simulation time at the start of this cycle, as reported by the
    /// latest body state
    pub sim_time_s: f64,

    // Body state
    /// Latest body state received from the simulation, if any
    pub body_state: Option<BodyState>,

    // Command state
    /// The effective velocity command for this cycle (zero if stale)
    pub vel_cmd_eff: VelCmd,

    /// True if the command register was stale this cycle
    pub vel_cmd_stale: bool,

    // VelCtrl
    pub vel_ctrl: vel_ctrl::VelCtrl,
    pub vel_ctrl_input: vel_ctrl::InputData,
    pub vel_ctrl_output: WrenchDems,
    pub vel_ctrl_status_rpt: vel_ctrl::StatusReport,

    // Odom
    pub odom: odom::Odom,
    pub odom_input: odom::InputData,
    pub odom_output: Option<odom::OutputData>,
    pub odom_status_rpt: odom::StatusReport,

    /// Simulation time of the last odometry publish, or `None` if none has
    /// happened yet. Owned here rather than by the scheduler, which is
    /// stateless.
    pub last_odom_publish_s: Option<f64>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive wrench demand send errors
    pub num_consec_wrench_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle.
    pub fn cycle_start(&mut self) {
        self.vel_ctrl_input = vel_ctrl::InputData::default();
        self.vel_ctrl_output = WrenchDems::default();
        self.vel_ctrl_status_rpt = vel_ctrl::StatusReport::default();

        self.odom_input = odom::InputData::default();
        self.odom_output = None;
        self.odom_status_rpt = odom::StatusReport::default();
    }
}

//! Implementations for the VelCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector3;
use serde::Serialize;

// Internal
use super::{LoadedParams, Params, VelCtrlError};
use sim_if::{cmd::VelCmd, phys::WrenchDems};
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Velocity control module state
#[derive(Default)]
pub struct VelCtrl {
    /// Resolved module parameters
    pub params: Params,

    pub(crate) report: StatusReport,
    arch_output: Archiver,

    /// Resolved name of the link wrenches are applied to
    link: String,

    pub(crate) output: Option<WrenchDems>,
}

/// Data required to initialise VelCtrl.
pub struct InitData {
    /// Name of the module's parameter file
    pub params_file: &'static str,

    /// Resolved name of the link wrenches are applied to
    pub link: String,
}

/// Input data to Velocity Control.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputData {
    /// The effective velocity command for this cycle (zero if the register
    /// was stale).
    pub vel_cmd: VelCmd,

    /// True if the command register was stale this cycle.
    pub cmd_stale: bool,

    /// Actual linear velocity of the base in the body frame.
    ///
    /// Units: meters/second
    pub lin_vel_ms_bf: Vector3<f64>,

    /// Actual angular velocity of the base.
    ///
    /// Units: radians/second
    pub ang_vel_rads: Vector3<f64>,
}

/// Status report for VelCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the command used this cycle was the stale-substituted zero
    /// command.
    pub cmd_stale: bool,
}

/// Flat record of one cycle's output, for the CSV archive.
#[derive(Serialize)]
struct OutputRecord {
    time_s: f64,
    force_x_n: f64,
    force_y_n: f64,
    torque_z_nm: f64,
    cmd_stale: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for VelCtrl {
    type InitData = InitData;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = WrenchDems;
    type StatusReport = StatusReport;
    type ProcError = VelCtrlError;

    /// Initialise the VelCtrl module.
    ///
    /// Expected init data is the module's parameter file name and the
    /// resolved link name.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters, resolving missing keys to defaults
        let loaded: LoadedParams = params::load(init_data.params_file)?;
        self.params = loaded.resolve();

        self.link = init_data.link;

        // Create the arch folder for vel_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("vel_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archiver
        self.arch_output = Archiver::from_path(
            session, "vel_ctrl/output.csv"
        ).unwrap();

        Ok(())
    }

    /// Perform cyclic processing of Velocity Control.
    ///
    /// Computes the proportional wrench from the velocity error. Runs every
    /// control cycle unconditionally; a stale command simply drives the base
    /// towards zero velocity.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        // Reject non-finite inputs, a NaN here would propagate into the
        // physics engine
        if !input_data.lin_vel_ms_bf.iter().all(|v| v.is_finite())
            || !input_data.ang_vel_rads.iter().all(|v| v.is_finite())
        {
            return Err(VelCtrlError::NonFiniteInput);
        }

        let cmd = input_data.vel_cmd;

        let force_x_n =
            (cmd.lin_x_ms - input_data.lin_vel_ms_bf[0]) * self.params.x_velocity_p_gain;
        let force_y_n =
            (cmd.lin_y_ms - input_data.lin_vel_ms_bf[1]) * self.params.y_velocity_p_gain;
        let torque_z_nm =
            (cmd.ang_z_rads - input_data.ang_vel_rads[2]) * self.params.yaw_velocity_p_gain;

        let output = WrenchDems {
            link: self.link.clone(),
            force_n_bf: Vector3::new(force_x_n, force_y_n, 0.0),
            torque_nm_bf: Vector3::new(0.0, 0.0, torque_z_nm),
        };

        self.report.cmd_stale = input_data.cmd_stale;

        trace!(
            "VelCtrl output:\n    force: ({:.3}, {:.3}) N\n    torque: {:.3} N m",
            force_x_n,
            force_y_n,
            torque_z_nm
        );

        // Update the output in self
        self.output = Some(output.clone());

        Ok((output, self.report))
    }
}

impl Archived for VelCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref output) = self.output {
            self.arch_output.serialise(OutputRecord {
                time_s: session::get_elapsed_seconds(),
                force_x_n: output.force_n_bf[0],
                force_y_n: output.force_n_bf[1],
                torque_z_nm: output.torque_nm_bf[2],
                cmd_stale: self.report.cmd_stale,
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Build a VelCtrl with default gains, bypassing file-based init.
    fn vel_ctrl() -> VelCtrl {
        VelCtrl {
            link: String::from("base_footprint"),
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_error_zero_wrench() {
        let mut ctrl = vel_ctrl();

        let input = InputData {
            vel_cmd: VelCmd {
                lin_x_ms: 0.7,
                lin_y_ms: -0.2,
                ang_z_rads: 0.5,
            },
            cmd_stale: false,
            lin_vel_ms_bf: Vector3::new(0.7, -0.2, 0.0),
            ang_vel_rads: Vector3::new(0.0, 0.0, 0.5),
        };

        let (output, _) = ctrl.proc(&input).unwrap();

        assert_eq!(output.force_n_bf, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(output.torque_nm_bf, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(output.link, "base_footprint");
    }

    #[test]
    fn test_proportional_wrench() {
        let mut ctrl = vel_ctrl();

        // Command 1 m/s forward issued against an actual 0.5 m/s gives
        // (1.0 - 0.5) * 10000 = 5000 N
        let input = InputData {
            vel_cmd: VelCmd {
                lin_x_ms: 1.0,
                lin_y_ms: 0.0,
                ang_z_rads: 0.0,
            },
            cmd_stale: false,
            lin_vel_ms_bf: Vector3::new(0.5, 0.0, 0.0),
            ang_vel_rads: Vector3::zeros(),
        };

        let (output, _) = ctrl.proc(&input).unwrap();

        assert!((output.force_n_bf[0] - 5000.0).abs() < 1e-9);
        assert_eq!(output.force_n_bf[1], 0.0);
        assert_eq!(output.torque_nm_bf[2], 0.0);
    }

    #[test]
    fn test_linearity_in_error() {
        let mut ctrl = vel_ctrl();

        let mut input = InputData {
            vel_cmd: VelCmd {
                lin_x_ms: 0.2,
                lin_y_ms: 0.1,
                ang_z_rads: -0.3,
            },
            ..Default::default()
        };

        let (single, _) = ctrl.proc(&input).unwrap();

        // Doubling every error doubles the wrench
        input.vel_cmd.lin_x_ms *= 2.0;
        input.vel_cmd.lin_y_ms *= 2.0;
        input.vel_cmd.ang_z_rads *= 2.0;

        let (double, _) = ctrl.proc(&input).unwrap();

        assert!((double.force_n_bf[0] - 2.0 * single.force_n_bf[0]).abs() < 1e-9);
        assert!((double.force_n_bf[1] - 2.0 * single.force_n_bf[1]).abs() < 1e-9);
        assert!((double.torque_nm_bf[2] - 2.0 * single.torque_nm_bf[2]).abs() < 1e-9);
    }

    #[test]
    fn test_stale_command_reported() {
        let mut ctrl = vel_ctrl();

        let input = InputData {
            vel_cmd: VelCmd::default(),
            cmd_stale: true,
            lin_vel_ms_bf: Vector3::new(0.1, 0.0, 0.0),
            ang_vel_rads: Vector3::zeros(),
        };

        let (output, report) = ctrl.proc(&input).unwrap();

        assert!(report.cmd_stale);
        // A stale (zero) command against forward motion brakes the base
        assert!(output.force_n_bf[0] < 0.0);
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let mut ctrl = vel_ctrl();

        let input = InputData {
            lin_vel_ms_bf: Vector3::new(f64::NAN, 0.0, 0.0),
            ..Default::default()
        };

        assert!(ctrl.proc(&input).is_err());
    }
}

//! Implementations for the Odom state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::{Isometry3, Matrix6, UnitQuaternion, Vector3};
use serde::Serialize;

// Internal
use super::{motion_delta, LoadedParams, OdomError, Params, ANG_VEL_EPS_RADS};
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Variance assigned to well-observed axes (planar position and velocity).
const OBSERVED_VAR: f64 = 0.001;

/// Variance assigned to unobservable axes (Z, roll, pitch) - the planar
/// model carries no information about them.
const UNOBSERVED_VAR: f64 = 1e12;

/// Yaw variance while the base is rotationally near-stationary.
const YAW_VAR_STATIONARY: f64 = 0.01;

/// Yaw variance while the base is rotating. Integrated yaw is only trusted
/// while the base is not turning.
const YAW_VAR_ROTATING: f64 = 100.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Odometry module state
pub struct Odom {
    /// Resolved module parameters
    pub params: Params,

    pub(crate) report: StatusReport,
    arch_output: Archiver,

    /// Accumulated pose of the base in the odometry frame.
    ///
    /// Identity at init and never reset afterwards. Each advance composes
    /// the incremental motion on the right, applying it in the base's
    /// current local frame.
    pose: Isometry3<f64>,

    pub(crate) output: Option<OutputData>,
}

/// Input data to the Odometry module.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputData {
    /// Simulation time of this advance.
    ///
    /// Units: seconds
    pub sim_time_s: f64,

    /// Time elapsed since the previous advance.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Actual linear velocity of the base in the body frame.
    ///
    /// Units: meters/second
    pub lin_vel_ms_bf: Vector3<f64>,

    /// Actual angular velocity of the base in the body frame.
    ///
    /// Units: radians/second
    pub ang_vel_rads_bf: Vector3<f64>,
}

/// Output data from the Odometry module: one odometry estimate.
#[derive(Clone, Debug, Serialize)]
pub struct OutputData {
    /// Simulation time of the sample.
    ///
    /// Units: seconds
    pub sim_time_s: f64,

    /// Accumulated position of the base in the odometry frame.
    ///
    /// Units: meters
    pub position_m: Vector3<f64>,

    /// Accumulated attitude of the base in the odometry frame.
    pub attitude_q: UnitQuaternion<f64>,

    /// Instantaneous body-relative linear velocity.
    ///
    /// Units: meters/second
    pub lin_vel_ms_bf: Vector3<f64>,

    /// Instantaneous body-relative angular velocity.
    ///
    /// Units: radians/second
    pub ang_vel_rads_bf: Vector3<f64>,

    /// Covariance of the pose estimate.
    pub pose_covariance: Matrix6<f64>,

    /// Covariance of the twist estimate.
    pub twist_covariance: Matrix6<f64>,
}

/// Status report for Odom processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if this advance took the straight-line branch of the
    /// integrator (angular rate below threshold).
    pub straight_line: bool,
}

/// Flat record of one sample, for the CSV archive.
#[derive(Serialize)]
struct OutputRecord {
    time_s: f64,
    sim_time_s: f64,
    x_m: f64,
    y_m: f64,
    yaw_rad: f64,
    lin_vel_x_ms: f64,
    lin_vel_y_ms: f64,
    ang_vel_z_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Odom {
    fn default() -> Self {
        Self {
            params: Params::default(),
            report: StatusReport::default(),
            arch_output: Archiver::default(),
            pose: Isometry3::identity(),
            output: None,
        }
    }
}

impl State for Odom {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = OdomError;

    /// Initialise the Odometry module.
    ///
    /// Expected init data is the name of the module's parameter file.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters, resolving missing keys to defaults
        let loaded: LoadedParams = params::load(init_data)?;
        self.params = loaded.resolve();

        // Create the arch folder for odom
        let mut arch_path = session.arch_root.clone();
        arch_path.push("odom");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archiver
        self.arch_output = Archiver::from_path(
            session, "odom/output.csv"
        ).unwrap();

        // The pose is already identity from Default and must not be touched
        // here: init is the only reset an odometry estimate ever gets.

        Ok(())
    }

    /// Advance the dead-reckoned pose and build an odometry sample.
    ///
    /// The accumulated pose is composed with the incremental transform on
    /// the right, so the motion is applied in the base's current local
    /// frame. Order matters at non-zero heading.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        if input_data.dt_s < 0.0 {
            return Err(OdomError::NegativeTimeStep(input_data.dt_s));
        }
        if !input_data.lin_vel_ms_bf.iter().all(|v| v.is_finite())
            || !input_data.ang_vel_rads_bf.iter().all(|v| v.is_finite())
        {
            return Err(OdomError::NonFiniteInput);
        }

        let ang_vel_z_rads = input_data.ang_vel_rads_bf[2];

        // Advance the accumulated pose
        let delta = motion_delta(
            input_data.lin_vel_ms_bf[0],
            input_data.lin_vel_ms_bf[1],
            ang_vel_z_rads,
            input_data.dt_s,
        );
        self.pose *= delta;

        self.report.straight_line = ang_vel_z_rads.abs() < ANG_VEL_EPS_RADS;

        // Integrated yaw is only trusted while the base is rotationally
        // near-stationary
        let yaw_var = if ang_vel_z_rads.abs() < ANG_VEL_EPS_RADS {
            YAW_VAR_STATIONARY
        }
        else {
            YAW_VAR_ROTATING
        };

        let mut pose_covariance = Matrix6::zeros();
        pose_covariance[(0, 0)] = OBSERVED_VAR;
        pose_covariance[(1, 1)] = OBSERVED_VAR;
        pose_covariance[(2, 2)] = UNOBSERVED_VAR;
        pose_covariance[(3, 3)] = UNOBSERVED_VAR;
        pose_covariance[(4, 4)] = UNOBSERVED_VAR;
        pose_covariance[(5, 5)] = yaw_var;

        let mut twist_covariance = Matrix6::zeros();
        twist_covariance[(0, 0)] = OBSERVED_VAR;
        twist_covariance[(1, 1)] = OBSERVED_VAR;
        twist_covariance[(2, 2)] = OBSERVED_VAR;
        twist_covariance[(3, 3)] = UNOBSERVED_VAR;
        twist_covariance[(4, 4)] = UNOBSERVED_VAR;
        twist_covariance[(5, 5)] = yaw_var;

        let output = OutputData {
            sim_time_s: input_data.sim_time_s,
            position_m: self.pose.translation.vector,
            attitude_q: self.pose.rotation,
            lin_vel_ms_bf: input_data.lin_vel_ms_bf,
            ang_vel_rads_bf: input_data.ang_vel_rads_bf,
            pose_covariance,
            twist_covariance,
        };

        trace!(
            "Odom pose: ({:.3}, {:.3}) m, yaw {:.3} rad",
            output.position_m[0],
            output.position_m[1],
            output.attitude_q.euler_angles().2
        );

        // Update the output in self
        self.output = Some(output.clone());

        Ok((output, self.report))
    }
}

impl Archived for Odom {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref output) = self.output {
            self.arch_output.serialise(OutputRecord {
                time_s: session::get_elapsed_seconds(),
                sim_time_s: output.sim_time_s,
                x_m: output.position_m[0],
                y_m: output.position_m[1],
                yaw_rad: output.attitude_q.euler_angles().2,
                lin_vel_x_ms: output.lin_vel_ms_bf[0],
                lin_vel_y_ms: output.lin_vel_ms_bf[1],
                ang_vel_z_rads: output.ang_vel_rads_bf[2],
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn input(
        sim_time_s: f64,
        dt_s: f64,
        lin_x_ms: f64,
        lin_y_ms: f64,
        ang_z_rads: f64,
    ) -> InputData {
        InputData {
            sim_time_s,
            dt_s,
            lin_vel_ms_bf: Vector3::new(lin_x_ms, lin_y_ms, 0.0),
            ang_vel_rads_bf: Vector3::new(0.0, 0.0, ang_z_rads),
        }
    }

    #[test]
    fn test_pose_accumulates_in_local_frame() {
        let mut odom = Odom::default();

        // Drive 1 m forward
        let (out, rpt) = odom.proc(&input(1.0, 1.0, 1.0, 0.0, 0.0)).unwrap();
        assert!(rpt.straight_line);
        assert!((out.position_m[0] - 1.0).abs() < 1e-9);
        assert!(out.position_m[1].abs() < 1e-9);

        // Turn a quarter turn on the spot
        let (out, rpt) = odom.proc(&input(2.0, 1.0, 0.0, 0.0, FRAC_PI_2)).unwrap();
        assert!(!rpt.straight_line);
        assert!((out.attitude_q.euler_angles().2 - FRAC_PI_2).abs() < 1e-9);
        assert!((out.position_m[0] - 1.0).abs() < 1e-9);

        // Drive 1 m forward again: at a quarter turn of heading the motion
        // lands along +Y, which is what right-composition must produce
        let (out, _) = odom.proc(&input(3.0, 1.0, 1.0, 0.0, 0.0)).unwrap();
        assert!((out.position_m[0] - 1.0).abs() < 1e-9);
        assert!((out.position_m[1] - 1.0).abs() < 1e-9);
        assert!((out.attitude_q.euler_angles().2 - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_pose_never_resets() {
        let mut odom = Odom::default();

        for i in 0..100 {
            odom.proc(&input(i as f64 * 0.05, 0.05, 1.0, 0.0, 0.0)).unwrap();
        }

        // 100 advances of 0.05 s at 1 m/s accumulate 5 m
        let out = odom.output.as_ref().unwrap();
        assert!((out.position_m[0] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_covariance_yaw_bimodal() {
        let mut odom = Odom::default();

        // Rotationally stationary: small yaw variance
        let (out, _) = odom.proc(&input(1.0, 0.1, 1.0, 0.0, 0.0)).unwrap();
        assert_eq!(out.pose_covariance[(5, 5)], 0.01);
        assert_eq!(out.twist_covariance[(5, 5)], 0.01);

        // Just below the threshold still counts as stationary
        let (out, _) = odom.proc(&input(1.1, 0.1, 1.0, 0.0, 0.99e-4)).unwrap();
        assert_eq!(out.pose_covariance[(5, 5)], 0.01);

        // Rotating: large yaw variance
        let (out, _) = odom.proc(&input(1.2, 0.1, 1.0, 0.0, 0.5)).unwrap();
        assert_eq!(out.pose_covariance[(5, 5)], 100.0);
        assert_eq!(out.twist_covariance[(5, 5)], 100.0);
    }

    #[test]
    fn test_covariance_fixed_axes() {
        let mut odom = Odom::default();

        let (out, _) = odom.proc(&input(1.0, 0.1, 0.3, 0.1, 0.0)).unwrap();

        // Planar position and velocity are well observed
        assert_eq!(out.pose_covariance[(0, 0)], 0.001);
        assert_eq!(out.pose_covariance[(1, 1)], 0.001);
        assert_eq!(out.twist_covariance[(0, 0)], 0.001);
        assert_eq!(out.twist_covariance[(2, 2)], 0.001);

        // Out-of-plane axes are unobservable
        assert_eq!(out.pose_covariance[(2, 2)], 1e12);
        assert_eq!(out.pose_covariance[(3, 3)], 1e12);
        assert_eq!(out.pose_covariance[(4, 4)], 1e12);
        assert_eq!(out.twist_covariance[(3, 3)], 1e12);
        assert_eq!(out.twist_covariance[(4, 4)], 1e12);

        // Off-diagonal terms stay zero
        assert_eq!(out.pose_covariance[(0, 1)], 0.0);
        assert_eq!(out.twist_covariance[(5, 0)], 0.0);
    }

    #[test]
    fn test_twist_is_actual_velocity() {
        let mut odom = Odom::default();

        let (out, _) = odom.proc(&input(1.0, 0.1, 0.4, -0.2, 0.3)).unwrap();

        assert_eq!(out.lin_vel_ms_bf, Vector3::new(0.4, -0.2, 0.0));
        assert_eq!(out.ang_vel_rads_bf, Vector3::new(0.0, 0.0, 0.3));
    }

    #[test]
    fn test_negative_dt_rejected() {
        let mut odom = Odom::default();

        assert!(odom.proc(&input(1.0, -0.1, 1.0, 0.0, 0.0)).is_err());
    }
}

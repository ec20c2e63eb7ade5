//! # Planar rigid body
//!
//! The simulated base: a single rigid body moving in the plane, driven by
//! the wrench demands it accepts and damped linearly in both translation
//! and rotation. Integration is semi-implicit Euler, which is stable for
//! this damped system at the rates the simulation runs at.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{UnitQuaternion, Vector2, Vector3};

use crate::params::SimExecParams;
use sim_if::phys::BodyState;
use util::maths::{clamp, wrap_to_pi};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Planar rigid body state
pub struct PlanarBody {
    params: SimExecParams,

    /// Position of the body origin in the world frame
    ///
    /// Units: meters
    pos_m_wf: Vector2<f64>,

    /// Heading of the body (angle from world X to body X)
    ///
    /// Units: radians
    yaw_rad: f64,

    /// Linear velocity in the world frame
    ///
    /// Units: meters/second
    lin_vel_ms_wf: Vector2<f64>,

    /// Angular velocity about the vertical axis
    ///
    /// Units: radians/second
    ang_vel_rads: f64,

    /// Latest accepted force, body frame
    ///
    /// Units: newtons
    force_n_bf: Vector2<f64>,

    /// Latest accepted torque about the vertical axis
    ///
    /// Units: newton-meters
    torque_nm: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PlanarBody {
    /// Create a new body at rest at the world origin.
    pub fn new(params: &SimExecParams) -> Self {
        Self {
            params: params.clone(),
            pos_m_wf: Vector2::zeros(),
            yaw_rad: 0.0,
            lin_vel_ms_wf: Vector2::zeros(),
            ang_vel_rads: 0.0,
            force_n_bf: Vector2::zeros(),
            torque_nm: 0.0,
        }
    }

    /// Accept a wrench, clamped to the body's actuation limits.
    ///
    /// The wrench is held and applied on every step until replaced.
    pub fn apply_wrench(&mut self, force_x_n: f64, force_y_n: f64, torque_z_nm: f64) {
        let force_lim_n = self.params.max_force_n;
        let torque_lim_nm = self.params.max_torque_nm;

        self.force_n_bf = Vector2::new(
            clamp(&force_x_n, &-force_lim_n, &force_lim_n),
            clamp(&force_y_n, &-force_lim_n, &force_lim_n),
        );
        self.torque_nm = clamp(&torque_z_nm, &-torque_lim_nm, &torque_lim_nm);
    }

    /// Zero the held wrench, bringing the body to a damped stop.
    pub fn clear_wrench(&mut self) {
        self.force_n_bf = Vector2::zeros();
        self.torque_nm = 0.0;
    }

    /// Advance the body by one step.
    pub fn step(&mut self, dt_s: f64) {
        let (sin_yaw, cos_yaw) = self.yaw_rad.sin_cos();

        // Rotate the held body-frame force into the world frame
        let force_n_wf = Vector2::new(
            self.force_n_bf[0] * cos_yaw - self.force_n_bf[1] * sin_yaw,
            self.force_n_bf[0] * sin_yaw + self.force_n_bf[1] * cos_yaw,
        );

        // Semi-implicit Euler: velocities first, then positions from the
        // new velocities
        let lin_accel_ms2 =
            (force_n_wf - self.lin_vel_ms_wf * self.params.lin_damping_ns_m)
                / self.params.body_mass_kg;
        self.lin_vel_ms_wf += lin_accel_ms2 * dt_s;
        self.pos_m_wf += self.lin_vel_ms_wf * dt_s;

        let ang_accel_rads2 = (self.torque_nm - self.ang_vel_rads * self.params.ang_damping_nms_rad)
            / self.params.body_inertia_zz_kgm2;
        self.ang_vel_rads += ang_accel_rads2 * dt_s;
        self.yaw_rad = wrap_to_pi(self.yaw_rad + self.ang_vel_rads * dt_s);
    }

    /// Build the body state message for the given simulation time.
    pub fn state(&self, sim_time_s: f64) -> BodyState {
        let (sin_yaw, cos_yaw) = self.yaw_rad.sin_cos();

        // World velocity expressed in the body frame
        let lin_vel_ms_bf = Vector2::new(
            self.lin_vel_ms_wf[0] * cos_yaw + self.lin_vel_ms_wf[1] * sin_yaw,
            -self.lin_vel_ms_wf[0] * sin_yaw + self.lin_vel_ms_wf[1] * cos_yaw,
        );

        // For a planar body the angular velocity is identical in both frames
        let ang_vel_rads = Vector3::new(0.0, 0.0, self.ang_vel_rads);

        BodyState {
            sim_time_s,
            position_m_wf: Vector3::new(self.pos_m_wf[0], self.pos_m_wf[1], 0.0),
            attitude_q_wf: UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.yaw_rad),
            lin_vel_ms_wf: Vector3::new(self.lin_vel_ms_wf[0], self.lin_vel_ms_wf[1], 0.0),
            lin_vel_ms_bf: Vector3::new(lin_vel_ms_bf[0], lin_vel_ms_bf[1], 0.0),
            ang_vel_rads_wf: ang_vel_rads,
            ang_vel_rads_bf: ang_vel_rads,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn params() -> SimExecParams {
        SimExecParams {
            cycle_rate_hz: 100.0,
            link_name: String::from("base_footprint"),
            dems_timeout_s: 0.5,
            body_mass_kg: 100.0,
            body_inertia_zz_kgm2: 10.0,
            lin_damping_ns_m: 50.0,
            ang_damping_nms_rad: 5.0,
            max_force_n: 500.0,
            max_torque_nm: 50.0,
        }
    }

    #[test]
    fn test_at_rest_stays_at_rest() {
        let mut body = PlanarBody::new(&params());

        for _ in 0..100 {
            body.step(0.01);
        }

        let state = body.state(1.0);
        assert_eq!(state.position_m_wf, Vector3::zeros());
        assert_eq!(state.lin_vel_ms_wf, Vector3::zeros());
        assert_eq!(state.ang_vel_rads_bf, Vector3::zeros());
    }

    #[test]
    fn test_forward_force_accelerates_forward() {
        let mut body = PlanarBody::new(&params());

        body.apply_wrench(100.0, 0.0, 0.0);
        for _ in 0..100 {
            body.step(0.01);
        }

        let state = body.state(1.0);
        assert!(state.lin_vel_ms_wf[0] > 0.0);
        assert!(state.position_m_wf[0] > 0.0);
        assert!(state.lin_vel_ms_wf[1].abs() < 1e-9);
        // At zero heading body and world frames agree
        assert!((state.lin_vel_ms_bf[0] - state.lin_vel_ms_wf[0]).abs() < 1e-9);
    }

    #[test]
    fn test_damping_limits_velocity() {
        let mut body = PlanarBody::new(&params());

        // Terminal velocity under constant force is force/damping
        body.apply_wrench(100.0, 0.0, 0.0);
        for _ in 0..10_000 {
            body.step(0.01);
        }

        let state = body.state(100.0);
        assert!((state.lin_vel_ms_wf[0] - 100.0 / 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_wrench_clamped_to_limits() {
        let mut body = PlanarBody::new(&params());

        body.apply_wrench(1e9, -1e9, 1e9);

        assert_eq!(body.force_n_bf, Vector2::new(500.0, -500.0));
        assert_eq!(body.torque_nm, 50.0);
    }

    #[test]
    fn test_body_frame_velocity_follows_heading() {
        let mut body = PlanarBody::new(&params());

        // Drive the body sideways in the world while facing +Y: the body
        // frame must see the motion on its own X axis
        body.yaw_rad = FRAC_PI_2;
        body.lin_vel_ms_wf = Vector2::new(0.0, 1.0);

        let state = body.state(0.0);
        assert!((state.lin_vel_ms_bf[0] - 1.0).abs() < 1e-9);
        assert!(state.lin_vel_ms_bf[1].abs() < 1e-9);
    }

    #[test]
    fn test_torque_spins_body() {
        let mut body = PlanarBody::new(&params());

        body.apply_wrench(0.0, 0.0, 10.0);
        for _ in 0..100 {
            body.step(0.01);
        }

        let state = body.state(1.0);
        assert!(state.ang_vel_rads_bf[2] > 0.0);
        assert!(state.attitude_q_wf.euler_angles().2 > 0.0);
    }

    #[test]
    fn test_clear_wrench_damps_to_stop() {
        let mut body = PlanarBody::new(&params());

        body.apply_wrench(100.0, 0.0, 10.0);
        for _ in 0..100 {
            body.step(0.01);
        }

        body.clear_wrench();
        for _ in 0..10_000 {
            body.step(0.01);
        }

        let state = body.state(100.0);
        assert!(state.lin_vel_ms_wf.norm() < 1e-6);
        assert!(state.ang_vel_rads_bf[2].abs() < 1e-6);
    }
}

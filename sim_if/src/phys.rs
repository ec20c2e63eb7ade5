//! # Body state and wrench demand definitions
//!
//! These messages form the contract with the physics engine: the simulation
//! server streams `BodyState` truth data, and the controller sends
//! `WrenchDems` which the server answers with a `WrenchDemsResponse`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The state of the controlled body as reported by the physics engine.
///
/// Velocities are provided in both the world frame (WF) and the body frame
/// (BF). The controller computes force errors against the body-relative
/// linear velocity and torque errors against the angular velocity; odometry
/// integrates the body-relative values only.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct BodyState {
    /// Simulation time at which this state was sampled.
    ///
    /// Units: seconds
    pub sim_time_s: f64,

    /// Position of the body origin in the world frame.
    ///
    /// Units: meters
    pub position_m_wf: Vector3<f64>,

    /// Attitude of the body in the world frame.
    pub attitude_q_wf: UnitQuaternion<f64>,

    /// Linear velocity in the world frame.
    ///
    /// Units: meters/second
    pub lin_vel_ms_wf: Vector3<f64>,

    /// Linear velocity in the body frame.
    ///
    /// Units: meters/second
    pub lin_vel_ms_bf: Vector3<f64>,

    /// Angular velocity in the world frame.
    ///
    /// Units: radians/second
    pub ang_vel_rads_wf: Vector3<f64>,

    /// Angular velocity in the body frame.
    ///
    /// Units: radians/second
    pub ang_vel_rads_bf: Vector3<f64>,
}

/// Wrench demands sent by the controller to the physics engine.
///
/// The force is applied in the body frame. The torque is applied about the
/// vertical axis; for a planar base the body and world vertical axes
/// coincide, so no frame tag is needed beyond the body convention.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WrenchDems {
    /// Name of the link the wrench is applied to.
    pub link: String,

    /// Force to apply at the link origin, body frame.
    ///
    /// Units: newtons
    pub force_n_bf: Vector3<f64>,

    /// Torque to apply about the link origin, body frame.
    ///
    /// Units: newton-meters
    pub torque_nm_bf: Vector3<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Response from the simulation server based on the demands sent by the
/// controller.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum WrenchDemsResponse {
    /// Demands were valid and will be applied on the next physics step
    DemsOk,

    /// Demands were invalid (non-finite values) and have been rejected
    DemsInvalid,

    /// The named link does not exist in the simulation
    UnknownLink,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WrenchDems {
    /// Determine if the demands contain only finite values.
    pub fn is_finite(&self) -> bool {
        self.force_n_bf.iter().all(|v| v.is_finite())
            && self.torque_nm_bf.iter().all(|v| v.is_finite())
    }
}

//! # Odometry sample and transform definitions
//!
//! The controller publishes one `OdomSample` per scheduled publish, and an
//! optional `TransformStamped` carrying the same pose as a frame transform.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Matrix6, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single odometry estimate: dead-reckoned pose plus instantaneous twist.
///
/// The pose expresses `child_frame_id` (the base) in `frame_id` (the
/// odometry frame). The twist is body-relative. Covariances are 6x6 over
/// (x, y, z, roll, pitch, yaw), row-major diagonal-dominant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OdomSample {
    /// Simulation time at which the sample was produced.
    ///
    /// Units: seconds
    pub sim_time_s: f64,

    /// Name of the frame the pose is expressed in.
    pub frame_id: String,

    /// Name of the frame the pose locates.
    pub child_frame_id: String,

    /// Position of the base in the odometry frame.
    ///
    /// Units: meters
    pub position_m: Vector3<f64>,

    /// Attitude of the base in the odometry frame.
    pub attitude_q: UnitQuaternion<f64>,

    /// Body-relative linear velocity at the sample time.
    ///
    /// Units: meters/second
    pub lin_vel_ms_bf: Vector3<f64>,

    /// Body-relative angular velocity at the sample time.
    ///
    /// Units: radians/second
    pub ang_vel_rads_bf: Vector3<f64>,

    /// Covariance of the pose estimate.
    pub pose_covariance: Matrix6<f64>,

    /// Covariance of the twist estimate.
    pub twist_covariance: Matrix6<f64>,
}

/// A stamped transform between two named frames.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransformStamped {
    /// Simulation time at which the transform was produced.
    ///
    /// Units: seconds
    pub sim_time_s: f64,

    /// Name of the parent frame.
    pub frame_id: String,

    /// Name of the child frame.
    pub child_frame_id: String,

    /// Translation from parent to child.
    ///
    /// Units: meters
    pub translation_m: Vector3<f64>,

    /// Rotation from parent to child.
    pub rotation_q: UnitQuaternion<f64>,
}

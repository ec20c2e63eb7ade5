//! Incremental motion integration

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

// Internal
use super::ANG_VEL_EPS_RADS;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the incremental transform produced by constant body-frame
/// velocity held over `dt_s`.
///
/// This is the exact arc traced under constant velocity, not a first-order
/// linearisation: the translation is the chord of the arc expressed in the
/// body frame at the start of the interval, and the rotation is the swept
/// yaw angle.
///
/// Angular rates below [`ANG_VEL_EPS_RADS`] are treated as straight-line
/// motion along the body X axis. Lateral velocity does not contribute in
/// that branch; the base is odometrically treated as non-strafing while it
/// is not turning.
pub fn motion_delta(
    lin_vel_x_ms: f64,
    lin_vel_y_ms: f64,
    ang_vel_rads: f64,
    dt_s: f64,
) -> Isometry3<f64> {
    let lin_x_m = lin_vel_x_ms * dt_s;
    let lin_y_m = lin_vel_y_ms * dt_s;
    let ang_rad = ang_vel_rads * dt_s;

    if ang_vel_rads.abs() < ANG_VEL_EPS_RADS {
        // Drive straight
        Isometry3::translation(lin_x_m, 0.0, 0.0)
    }
    else {
        let delta_x_m = lin_x_m * ang_rad.cos() - lin_y_m * ang_rad.sin();
        let delta_y_m = lin_x_m * ang_rad.sin() + lin_y_m * ang_rad.cos();

        Isometry3::from_parts(
            Translation3::new(delta_x_m, delta_y_m, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), ang_rad),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    /// Yaw of an isometry's rotation about the vertical axis.
    fn yaw_of(delta: &Isometry3<f64>) -> f64 {
        delta.rotation.euler_angles().2
    }

    #[test]
    fn test_straight_line() {
        let delta = motion_delta(1.5, 0.0, 0.0, 2.0);

        assert!((delta.translation.vector[0] - 3.0).abs() < 1e-12);
        assert_eq!(delta.translation.vector[1], 0.0);
        assert_eq!(delta.translation.vector[2], 0.0);
        assert_eq!(yaw_of(&delta), 0.0);
    }

    #[test]
    fn test_straight_line_drops_lateral() {
        // Below the angular threshold, lateral velocity does not translate
        let delta = motion_delta(1.0, 0.7, 0.0, 1.0);

        assert!((delta.translation.vector[0] - 1.0).abs() < 1e-12);
        assert_eq!(delta.translation.vector[1], 0.0);

        // Just under the threshold behaves the same way
        let delta = motion_delta(1.0, 0.7, 0.99e-4, 1.0);

        assert_eq!(delta.translation.vector[1], 0.0);
        assert_eq!(yaw_of(&delta), 0.0);
    }

    #[test]
    fn test_quarter_turn_arc() {
        // 1 m/s forward with a quarter turn per second over one second: the
        // chord ends at (0, 1) with a quarter turn of yaw
        let delta = motion_delta(1.0, 0.0, FRAC_PI_2, 1.0);

        assert!(delta.translation.vector[0].abs() < 1e-12);
        assert!((delta.translation.vector[1] - 1.0).abs() < 1e-12);
        assert!((yaw_of(&delta) - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_arc_with_lateral() {
        // With lateral velocity the chord is the rotated displacement
        let delta = motion_delta(1.0, 0.5, FRAC_PI_2, 1.0);

        // (lx cos - ly sin, lx sin + ly cos) with lx=1, ly=0.5, theta=pi/2
        assert!((delta.translation.vector[0] + 0.5).abs() < 1e-12);
        assert!((delta.translation.vector[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_dt() {
        let delta = motion_delta(1.0, 0.5, 1.0, 0.0);

        assert_eq!(delta.translation.vector, Vector3::zeros());
        assert_eq!(yaw_of(&delta), 0.0);
    }

    #[test]
    fn test_straight_line_interval_additivity() {
        // Straight-line deltas compose additively over split intervals.
        // This does NOT hold for arcs: the chord of an arc is not the sum of
        // the chords of its halves, so successive samples must be composed
        // as transforms, never added.
        let whole = motion_delta(1.2, 0.0, 0.0, 1.0);
        let split = motion_delta(1.2, 0.0, 0.0, 0.4) * motion_delta(1.2, 0.0, 0.0, 0.6);

        assert!((whole.translation.vector - split.translation.vector).norm() < 1e-12);
    }
}

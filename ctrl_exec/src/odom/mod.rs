//! Odometry module
//!
//! Dead-reckons the pose of the base in the odometry frame by integrating
//! the ACTUAL body velocity reported by the physics engine, never the
//! commanded one. The accumulated pose starts at identity and is never
//! reset, so it drifts over long sessions like any dead-reckoned estimate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod motion;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use motion::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Angular rates below this magnitude are treated as rotationally
/// stationary, both by the straight-line branch of the motion integrator and
/// by the yaw covariance heuristic.
///
/// Units: radians/second
pub const ANG_VEL_EPS_RADS: f64 = 1e-4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during Odom operation.
#[derive(Debug, thiserror::Error)]
pub enum OdomError {
    #[error("Negative integration time step ({0} s)")]
    NegativeTimeStep(f64),

    #[error("Input velocities contain non-finite values")]
    NonFiniteInput,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Determine if an odometry sample is due.
///
/// A non-positive rate disables publishing entirely. The scheduler is
/// stateless: the caller owns `last_publish_s` and must set it to the
/// current time after a publish.
pub fn should_publish(sim_time_s: f64, last_publish_s: f64, rate_hz: f64) -> bool {
    if rate_hz <= 0.0 {
        return false;
    }

    (sim_time_s - last_publish_s) > (1.0 / rate_hz)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_should_publish_disabled_rate() {
        assert!(!should_publish(100.0, 0.0, 0.0));
        assert!(!should_publish(100.0, 0.0, -20.0));
    }

    #[test]
    fn test_should_publish_boundary() {
        // 20 Hz -> 0.05 s period, elapsed must strictly exceed the period
        assert!(!should_publish(1.04, 1.0, 20.0));
        assert!(!should_publish(1.05, 1.0, 20.0));
        assert!(should_publish(1.0500001, 1.0, 20.0));
        assert!(should_publish(2.0, 1.0, 20.0));
    }
}

//! Velocity control module
//!
//! Converts the velocity error between the effective command and the actual
//! body velocity into force/torque demands using fixed proportional gains.
//! The wrench is computed in the body frame so the gains are independent of
//! the base's current heading.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during VelCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum VelCtrlError {
    #[error("Input velocities contain non-finite values")]
    NonFiniteInput,
}

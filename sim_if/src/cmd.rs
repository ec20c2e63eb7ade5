//! # Velocity command definitions
//!
//! A velocity command is the set-point for the base motion controller: the
//! desired planar body-frame velocity of the base.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A commanded planar velocity for the base.
///
/// All values are expressed in the base body frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VelCmd {
    /// Demanded velocity along the body X (forward) axis.
    ///
    /// Units: meters/second
    pub lin_x_ms: f64,

    /// Demanded velocity along the body Y (left) axis.
    ///
    /// Units: meters/second
    pub lin_y_ms: f64,

    /// Demanded yaw rate about the body Z (up) axis.
    ///
    /// Units: radians/second
    pub ang_z_rads: f64,
}

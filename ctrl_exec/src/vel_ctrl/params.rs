//! Parameters structure for VelCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::params::resolve_key;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Velocity Control as loaded from file.
///
/// Every key is optional; missing keys resolve to their defaults with a
/// warning.
#[derive(Debug, Default, Deserialize)]
pub struct LoadedParams {
    pub yaw_velocity_p_gain: Option<f64>,
    pub x_velocity_p_gain: Option<f64>,
    pub y_velocity_p_gain: Option<f64>,
}

/// Resolved parameters for Velocity Control.
#[derive(Debug, Clone, Serialize)]
pub struct Params {
    /// Proportional gain from yaw rate error to yaw torque.
    ///
    /// Units: newton-meter-seconds/radian
    pub yaw_velocity_p_gain: f64,

    /// Proportional gain from body X velocity error to body X force.
    ///
    /// Units: newton-seconds/meter
    pub x_velocity_p_gain: f64,

    /// Proportional gain from body Y velocity error to body Y force.
    ///
    /// Units: newton-seconds/meter
    pub y_velocity_p_gain: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            yaw_velocity_p_gain: 100.0,
            x_velocity_p_gain: 10000.0,
            y_velocity_p_gain: 10000.0,
        }
    }
}

impl LoadedParams {
    /// Resolve the loaded parameters against the defaults, warning for each
    /// substituted key.
    pub fn resolve(self) -> Params {
        let d = Params::default();

        Params {
            yaw_velocity_p_gain: resolve_key(
                self.yaw_velocity_p_gain,
                "yaw_velocity_p_gain",
                d.yaw_velocity_p_gain,
            ),
            x_velocity_p_gain: resolve_key(
                self.x_velocity_p_gain,
                "x_velocity_p_gain",
                d.x_velocity_p_gain,
            ),
            y_velocity_p_gain: resolve_key(
                self.y_velocity_p_gain,
                "y_velocity_p_gain",
                d.y_velocity_p_gain,
            ),
        }
    }
}

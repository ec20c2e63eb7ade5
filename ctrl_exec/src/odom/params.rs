//! Parameters structure for Odom

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::params::resolve_key;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the Odometry module as loaded from file.
///
/// Every key is optional; missing keys resolve to their defaults with a
/// warning.
#[derive(Debug, Default, Deserialize)]
pub struct LoadedParams {
    pub odometry_rate_hz: Option<f64>,
    pub odometry_frame: Option<String>,
    pub robot_base_frame: Option<String>,
    pub publish_odometry_tf: Option<bool>,
}

/// Resolved parameters for the Odometry module.
#[derive(Debug, Clone, Serialize)]
pub struct Params {
    /// Rate odometry samples are published at. A non-positive rate disables
    /// publishing entirely.
    ///
    /// Units: hertz
    pub odometry_rate_hz: f64,

    /// Name of the odometry frame (the frame samples are expressed in),
    /// before namespace resolution.
    pub odometry_frame: String,

    /// Name of the base frame (the frame samples locate, and the link
    /// wrenches are applied to), before namespace resolution.
    pub robot_base_frame: String,

    /// If true the accumulated pose is also broadcast as a frame transform
    /// on each publish.
    pub publish_odometry_tf: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            odometry_rate_hz: 20.0,
            odometry_frame: String::from("odom"),
            robot_base_frame: String::from("base_footprint"),
            publish_odometry_tf: true,
        }
    }
}

impl LoadedParams {
    /// Resolve the loaded parameters against the defaults, warning for each
    /// substituted key.
    pub fn resolve(self) -> Params {
        let d = Params::default();

        Params {
            odometry_rate_hz: resolve_key(
                self.odometry_rate_hz,
                "odometry_rate_hz",
                d.odometry_rate_hz,
            ),
            odometry_frame: resolve_key(self.odometry_frame, "odometry_frame", d.odometry_frame),
            robot_base_frame: resolve_key(
                self.robot_base_frame,
                "robot_base_frame",
                d.robot_base_frame,
            ),
            publish_odometry_tf: resolve_key(
                self.publish_odometry_tf,
                "publish_odometry_tf",
                d.publish_odometry_tf,
            ),
        }
    }
}

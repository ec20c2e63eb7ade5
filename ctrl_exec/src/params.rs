//! # Controller Executable Parameters
//!
//! This module provides parameters for the controller executable. Every key
//! recognised here is optional in the file: missing keys resolve to their
//! defaults with a warning, so an empty `ctrl_exec.toml` is a valid (if
//! noisy) configuration.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::params::resolve_key;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Controller executable parameters as loaded from file.
#[derive(Debug, Default, Deserialize)]
pub struct CtrlExecParams {
    /// Namespace prefix applied to topic and frame names
    pub robot_namespace: Option<String>,

    /// Topic velocity commands are received on
    pub command_topic: Option<String>,

    /// Topic odometry samples are published on
    pub odometry_topic: Option<String>,

    /// Velocity commands older than this are treated as zero
    pub cmd_vel_timeout_s: Option<f64>,

    /// Rate of the control cycle
    pub cycle_rate_hz: Option<f64>,

    /// Number of consecutive wrench demand failures tolerated before aborting
    pub max_consec_wrench_errors: Option<u64>,
}

/// Resolved controller executable parameters.
#[derive(Clone, Debug, Serialize)]
pub struct ResolvedParams {
    /// Namespace prefix applied to topic and frame names
    pub robot_namespace: String,

    /// Topic velocity commands are received on
    pub command_topic: String,

    /// Topic odometry samples are published on
    pub odometry_topic: String,

    /// Velocity commands older than this are treated as zero
    ///
    /// Units: seconds
    pub cmd_vel_timeout_s: f64,

    /// Rate of the control cycle
    ///
    /// Units: hertz
    pub cycle_rate_hz: f64,

    /// Number of consecutive wrench demand failures tolerated before aborting
    pub max_consec_wrench_errors: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ResolvedParams {
    fn default() -> Self {
        Self {
            robot_namespace: String::new(),
            command_topic: String::from("cmd_vel"),
            odometry_topic: String::from("odom"),
            cmd_vel_timeout_s: 0.25,
            cycle_rate_hz: 100.0,
            max_consec_wrench_errors: 5,
        }
    }
}

impl CtrlExecParams {
    /// Resolve the loaded parameters against the defaults, warning for each
    /// substituted key.
    pub fn resolve(self) -> ResolvedParams {
        let d = ResolvedParams::default();

        ResolvedParams {
            robot_namespace: resolve_key(self.robot_namespace, "robot_namespace", d.robot_namespace),
            command_topic: resolve_key(self.command_topic, "command_topic", d.command_topic),
            odometry_topic: resolve_key(self.odometry_topic, "odometry_topic", d.odometry_topic),
            cmd_vel_timeout_s: resolve_key(
                self.cmd_vel_timeout_s,
                "cmd_vel_timeout_s",
                d.cmd_vel_timeout_s,
            ),
            cycle_rate_hz: resolve_key(self.cycle_rate_hz, "cycle_rate_hz", d.cycle_rate_hz),
            max_consec_wrench_errors: resolve_key(
                self.max_consec_wrench_errors,
                "max_consec_wrench_errors",
                d.max_consec_wrench_errors,
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_resolve_fills_defaults() {
        let resolved = CtrlExecParams::default().resolve();

        assert_eq!(resolved.robot_namespace, "");
        assert_eq!(resolved.command_topic, "cmd_vel");
        assert_eq!(resolved.odometry_topic, "odom");
        assert_eq!(resolved.cmd_vel_timeout_s, 0.25);
        assert_eq!(resolved.cycle_rate_hz, 100.0);
        assert_eq!(resolved.max_consec_wrench_errors, 5);
    }

    #[test]
    fn test_resolve_keeps_present_keys() {
        let loaded = CtrlExecParams {
            robot_namespace: Some(String::from("triton")),
            cmd_vel_timeout_s: Some(0.5),
            ..Default::default()
        };

        let resolved = loaded.resolve();

        assert_eq!(resolved.robot_namespace, "triton");
        assert_eq!(resolved.cmd_vel_timeout_s, 0.5);
        // Untouched keys still fall back
        assert_eq!(resolved.command_topic, "cmd_vel");
    }
}

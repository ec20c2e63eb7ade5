//! # Controller library.
//!
//! This library allows other crates in the workspace to access items defined inside the
//! controller crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command client - receives velocity commands from the command transport
pub mod cmd_client;

/// Data store - cycle-scoped blackboard shared by the main loop and modules
pub mod data_store;

/// Odometry module - dead-reckons the pose of the base from its actual velocity
pub mod odom;

/// Odometry server - publishes odometry samples and frame transforms
pub mod odom_server;

/// Controller executable parameters
pub mod params;

/// Physics client - reads body state from and sends wrench demands to the simulation
pub mod phys_client;

/// Velocity command register - shared latest-command state with the staleness policy
pub mod vel_cmd;

/// Velocity control module - converts velocity error into force/torque demands
pub mod vel_ctrl;

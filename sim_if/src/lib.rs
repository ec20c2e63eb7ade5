//! # Simulation interface crate.
//!
//! Provides the common interfaces between the controller, the simulation
//! server, and the teleoperation tools.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Velocity command definitions
pub mod cmd;

/// Frame and topic name resolution
pub mod frames;

/// Network module
pub mod net;

/// Odometry sample and transform definitions
pub mod odom;

/// Body state and wrench demand definitions
pub mod phys;

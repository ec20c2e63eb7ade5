//! # Simulation Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the simulation executable.
///
/// Unlike the controller's parameters these are all required: a
/// half-configured body is not worth simulating.
#[derive(Clone, Debug, Deserialize)]
pub struct SimExecParams {
    /// Rate of the physics cycle
    ///
    /// Units: hertz
    pub cycle_rate_hz: f64,

    /// Name of the link wrench demands must address
    pub link_name: String,

    /// Zero the applied wrench after this long without valid demands
    ///
    /// Units: seconds
    pub dems_timeout_s: f64,

    // ---- BODY ----

    /// Mass of the base body
    ///
    /// Units: kilograms
    pub body_mass_kg: f64,

    /// Moment of inertia of the base body about the vertical axis
    ///
    /// Units: kilogram-meters squared
    pub body_inertia_zz_kgm2: f64,

    /// Linear damping coefficient
    ///
    /// Units: newton-seconds/meter
    pub lin_damping_ns_m: f64,

    /// Angular damping coefficient
    ///
    /// Units: newton-meter-seconds/radian
    pub ang_damping_nms_rad: f64,

    // ---- ACTUATION LIMITS ----

    /// Largest force magnitude the body will accept per axis
    ///
    /// Units: newtons
    pub max_force_n: f64,

    /// Largest torque magnitude the body will accept
    ///
    /// Units: newton-meters
    pub max_torque_nm: f64,
}

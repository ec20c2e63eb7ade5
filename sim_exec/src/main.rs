//! # Simulation Executable
//!
//! A planar rigid-body simulation standing in for the external physics
//! engine. The executable:
//!
//! - integrates a single damped rigid body under the wrench demands it
//!   accepts from the controller,
//! - streams the body's state (pose, velocities, simulation time),
//! - validates the link name addressed by each demand.
//!
//! The body's response to applied force is entirely this executable's
//! business: the controller only ever decides what wrench to request.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Planar rigid body integration.
mod body;

/// Physics server abstraction.
mod phys_server;

/// Parameters for the simulation executable.
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use body::PlanarBody;
use params::SimExecParams;
use phys_server::PhysServer;
use sim_if::{
    net::{zmq, NetParams},
    phys::WrenchDemsResponse,
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("sim_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Triton Base Simulation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- SIGNAL HANDLING ----

    let term = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, term.clone())
        .wrap_err("Failed to register SIGINT handler")?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, term.clone())
        .wrap_err("Failed to register SIGTERM handler")?;

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    let params: SimExecParams =
        util::params::load("sim_exec.toml").wrap_err("Could not load sim params")?;

    info!("Parameters loaded");
    info!(
        "Simulating link \"{}\": {} kg, {} kg m^2 at {} Hz",
        params.link_name, params.body_mass_kg, params.body_inertia_zz_kgm2, params.cycle_rate_hz
    );

    let cycle_period_s = 1.0 / params.cycle_rate_hz;

    // ---- SERVER INITIALISATION ----

    let zmq_ctx = zmq::Context::new();

    let mut server = PhysServer::new(&zmq_ctx, &net_params)
        .wrap_err("Failed to initialise the physics server")?;

    info!("Server initialised");

    // ---- BODY INITIALISATION ----

    let mut sim_body = PlanarBody::new(&params);
    let mut sim_time_s = 0.0f64;

    // Simulation time of the last accepted demand, used to zero the held
    // wrench when the controller goes quiet.
    let mut last_dems_time_s: Option<f64> = None;
    let mut dems_stale = false;

    info!("Initialisation complete, entering main loop\n");

    // ---- MAIN LOOP ----

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Check for termination requests
        if term.load(Ordering::Relaxed) {
            info!("Termination requested, stopping");
            break;
        }

        // ---- DEMAND PROCESSING ----

        if let Some(dems) = server.get_demands() {
            let response = if dems.link != params.link_name {
                warn!(
                    "Recieved demands for unknown link \"{}\" (simulating \"{}\")",
                    dems.link, params.link_name
                );
                WrenchDemsResponse::UnknownLink
            }
            else if !dems.is_finite() {
                warn!("Recieved non-finite wrench demands");
                WrenchDemsResponse::DemsInvalid
            }
            else {
                sim_body.apply_wrench(
                    dems.force_n_bf[0],
                    dems.force_n_bf[1],
                    dems.torque_nm_bf[2],
                );
                last_dems_time_s = Some(sim_time_s);

                if dems_stale {
                    info!("Demands resumed");
                    dems_stale = false;
                }

                WrenchDemsResponse::DemsOk
            };

            if let Err(e) = server.send_dems_response(&response) {
                warn!("Could not send response to controller: {}", e);
            }
        }

        // Zero the held wrench if the controller has gone quiet
        if let Some(t) = last_dems_time_s {
            if !dems_stale && sim_time_s - t > params.dems_timeout_s {
                warn!("No demands for {:.2} s, zeroing wrench", params.dems_timeout_s);
                sim_body.clear_wrench();
                dems_stale = true;
            }
        }

        // ---- PHYSICS STEP ----

        sim_body.step(cycle_period_s);
        sim_time_s += cycle_period_s;

        // ---- STATE PUBLISH ----

        if let Err(e) = server.send_state(&sim_body.state(sim_time_s)) {
            warn!("Could not publish body state: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match Duration::from_secs_f64(cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period_s
            ),
        }
    }

    // ---- SHUTDOWN ----

    session.exit();

    info!("End of execution");

    Ok(())
}

//! Main controller executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Body state acquisition from the simulation
//!         - Effective command evaluation (staleness policy)
//!         - Velocity control processing
//!         - Wrench demand dispatch to the simulation
//!         - Odometry processing and publishing, gated by the publish
//!           scheduler
//!
//! Velocity commands arrive asynchronously on the command client's worker
//! thread and are read here through the shared command register.
//!
//! # Modules
//!
//! All modules (e.g. `vel_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State`
//!        trait.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use ctrl_lib::{
    cmd_client::CmdClient,
    data_store::DataStore,
    odom,
    odom_server::{OdomServer, OdomServerConfig},
    params::CtrlExecParams,
    phys_client::PhysClient,
    vel_cmd::VelCmdRegister,
    vel_ctrl,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use sim_if::{
    frames,
    net::{zmq, NetParams},
    phys::{WrenchDems, WrenchDemsResponse},
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    raise_error,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("ctrl_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Triton Base Controller Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- SIGNAL HANDLING ----

    // SIGINT/SIGTERM raise a flag which the main loop observes, so shutdown
    // always runs the full handshake.
    let term = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, term.clone())
        .wrap_err("Failed to register SIGINT handler")?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, term.clone())
        .wrap_err("Failed to register SIGTERM handler")?;

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    let exec_params = util::params::load::<CtrlExecParams>("ctrl_exec.toml")
        .wrap_err("Could not load exec params")?
        .resolve();

    if exec_params.cycle_rate_hz <= 0.0 {
        return Err(eyre!(
            "cycle_rate_hz must be positive, got {}",
            exec_params.cycle_rate_hz
        ));
    }

    let cycle_period_s = 1.0 / exec_params.cycle_rate_hz;

    info!("Exec parameters loaded");
    session.save("resolved_ctrl_exec_params.json", exec_params.clone());

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    // Odom comes first since the frame names it owns are needed to
    // initialise VelCtrl's link target.
    ds.odom
        .init("odom.toml", &session)
        .wrap_err("Failed to initialise Odom")?;
    info!("Odom init complete");
    session.save("resolved_odom_params.json", ds.odom.params.clone());

    // Resolve topic and frame names against the robot namespace
    let cmd_topic = frames::resolve(&exec_params.robot_namespace, &exec_params.command_topic);
    let odom_topic = frames::resolve(&exec_params.robot_namespace, &exec_params.odometry_topic);
    let odom_frame = frames::resolve(&exec_params.robot_namespace, &ds.odom.params.odometry_frame);
    let base_frame = frames::resolve(
        &exec_params.robot_namespace,
        &ds.odom.params.robot_base_frame,
    );

    info!("Command topic: \"{}\"", cmd_topic);
    info!("Odometry topic: \"{}\"", odom_topic);
    info!("Odometry frame: \"{}\"", odom_frame);
    info!("Base frame: \"{}\"", base_frame);

    ds.vel_ctrl
        .init(
            vel_ctrl::InitData {
                params_file: "vel_ctrl.toml",
                link: base_frame.clone(),
            },
            &session,
        )
        .wrap_err("Failed to initialise VelCtrl")?;
    info!("VelCtrl init complete");
    session.save("resolved_vel_ctrl_params.json", ds.vel_ctrl.params.clone());

    info!(
        "VelCtrl using gains: yaw: {} x: {} y: {}",
        ds.vel_ctrl.params.yaw_velocity_p_gain,
        ds.vel_ctrl.params.x_velocity_p_gain,
        ds.vel_ctrl.params.y_velocity_p_gain
    );

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = zmq::Context::new();

    // The physics client blocks until the body state stream is connected.
    // Without the simulation there is no clock and no body to control, so a
    // failure here aborts initialisation.
    let mut phys_client = PhysClient::new(&zmq_ctx, &net_params)
        .wrap_err("Failed to initialise PhysClient, is the simulation server running?")?;
    info!("PhysClient initialised");

    let vel_cmd_register = VelCmdRegister::new();

    let mut cmd_client = CmdClient::new(
        &zmq_ctx,
        &net_params,
        cmd_topic,
        vel_cmd_register.clone(),
        phys_client.shared(),
    )
    .wrap_err("Failed to initialise CmdClient")?;
    info!("CmdClient initialised");

    let mut odom_server = OdomServer::new(
        &zmq_ctx,
        &net_params,
        OdomServerConfig {
            odometry_topic: odom_topic,
            frame_id: odom_frame,
            child_frame_id: base_frame.clone(),
            publish_tf: ds.odom.params.publish_odometry_tf,
        },
    )
    .wrap_err("Failed to initialise OdomServer")?;
    info!("OdomServer initialised");

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Check for termination requests
        if term.load(Ordering::Relaxed) {
            info!("Termination requested, stopping");
            break;
        }

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start();

        // ---- DATA INPUT ----

        ds.body_state = phys_client.body_state();

        match ds.body_state {
            Some(body_state) => {
                ds.sim_time_s = body_state.sim_time_s;

                // ---- COMMAND PROCESSING ----

                // Evaluate the staleness policy: a command older than the
                // timeout has no effect, without modifying the register.
                let (vel_cmd_eff, vel_cmd_stale) =
                    vel_cmd_register.effective(ds.sim_time_s, exec_params.cmd_vel_timeout_s);
                ds.vel_cmd_eff = vel_cmd_eff;
                ds.vel_cmd_stale = vel_cmd_stale;

                // ---- CONTROL ALGORITHM PROCESSING ----

                // VelCtrl processing, runs every cycle unconditionally
                ds.vel_ctrl_input = vel_ctrl::InputData {
                    vel_cmd: ds.vel_cmd_eff,
                    cmd_stale: ds.vel_cmd_stale,
                    lin_vel_ms_bf: body_state.lin_vel_ms_bf,
                    ang_vel_rads: body_state.ang_vel_rads_wf,
                };

                match ds.vel_ctrl.proc(&ds.vel_ctrl_input) {
                    Ok((o, r)) => {
                        ds.vel_ctrl_output = o;
                        ds.vel_ctrl_status_rpt = r;
                    }
                    Err(e) => {
                        // A processing error falls back to a zero wrench on
                        // the base link, the next cycle gets fresh inputs.
                        warn!("Error during VelCtrl processing: {}", e);
                        ds.vel_ctrl_output = WrenchDems {
                            link: base_frame.clone(),
                            ..Default::default()
                        };
                    }
                };

                // Send wrench demands to the simulation
                match phys_client.send_dems(&ds.vel_ctrl_output) {
                    Ok(WrenchDemsResponse::DemsOk) => {
                        ds.num_consec_wrench_errors = 0;
                    }
                    Ok(WrenchDemsResponse::DemsInvalid) => {
                        warn!("Simulation rejected wrench demands as invalid");
                    }
                    Ok(WrenchDemsResponse::UnknownLink) => {
                        // No point continuing: the configured base link does
                        // not exist in the simulation.
                        return Err(eyre!(
                            "Simulation does not know link \"{}\", check robot_base_frame",
                            ds.vel_ctrl_output.link
                        ));
                    }
                    Err(e) => {
                        ds.num_consec_wrench_errors += 1;
                        warn!("Could not send wrench demands: {}", e);

                        if ds.num_consec_wrench_errors > exec_params.max_consec_wrench_errors {
                            raise_error!(
                                "Maximum number of consecutive wrench demand errors ({}) has \
                                 been exceeded",
                                exec_params.max_consec_wrench_errors
                            );
                        }
                    }
                }

                // ---- ODOMETRY PROCESSING ----

                // The first cycle with a body state anchors the publish
                // clock without publishing.
                if ds.last_odom_publish_s.is_none() {
                    ds.last_odom_publish_s = Some(ds.sim_time_s);
                }

                if let Some(last_publish_s) = ds.last_odom_publish_s {
                    if odom::should_publish(
                        ds.sim_time_s,
                        last_publish_s,
                        ds.odom.params.odometry_rate_hz,
                    ) {
                        ds.odom_input = odom::InputData {
                            sim_time_s: ds.sim_time_s,
                            dt_s: ds.sim_time_s - last_publish_s,
                            lin_vel_ms_bf: body_state.lin_vel_ms_bf,
                            ang_vel_rads_bf: body_state.ang_vel_rads_bf,
                        };

                        match ds.odom.proc(&ds.odom_input) {
                            Ok((o, r)) => {
                                ds.odom_status_rpt = r;

                                if let Err(e) = odom_server.send(&o) {
                                    warn!("Could not publish odometry: {}", e);
                                }

                                ds.odom_output = Some(o);
                                ds.last_odom_publish_s = Some(ds.sim_time_s);
                            }
                            Err(e) => warn!("Error during Odom processing: {}", e),
                        }
                    }
                }

                // ---- WRITE ARCHIVES ----

                // Archive on publish cycles only, to keep the archive rate
                // at the odometry rate rather than the control rate.
                if ds.odom_output.is_some() {
                    if let Err(e) = ds.vel_ctrl.write() {
                        warn!("Could not write VelCtrl archives: {}", e);
                    }
                    if let Err(e) = ds.odom.write() {
                        warn!("Could not write Odom archives: {}", e);
                    }
                }
            }
            None => trace!("Waiting for first body state from the simulation"),
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period_s
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    // Stop accepting commands and join the worker before anything shared is
    // released.
    cmd_client.shutdown();
    info!("CmdClient shutdown complete");

    phys_client.shutdown();
    info!("PhysClient shutdown complete");

    session.exit();

    info!("End of execution");

    Ok(())
}

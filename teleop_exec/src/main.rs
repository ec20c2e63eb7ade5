//! # Teleoperation Executable
//!
//! Publishes a fixed velocity command to the base controller at a steady
//! rate for a set duration, then exits. Once publication stops the
//! controller's command timeout takes over and brings the base to a stop,
//! so a teleop run is also an end-to-end exercise of the staleness policy.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use color_eyre::{eyre::WrapErr, Report};
use structopt::StructOpt;

use sim_if::{
    cmd::VelCmd,
    frames,
    net::{zmq, MonitoredSocket, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Command line options
#[derive(Debug, StructOpt)]
#[structopt(
    name = "teleop_exec",
    about = "Publishes velocity commands to the base controller"
)]
struct Opt {
    /// Forward velocity demand in meters/second
    #[structopt(short = "x", long, default_value = "0.0")]
    lin_x_ms: f64,

    /// Lateral velocity demand in meters/second
    #[structopt(short = "y", long, default_value = "0.0")]
    lin_y_ms: f64,

    /// Yaw rate demand in radians/second
    #[structopt(short = "w", long, default_value = "0.0")]
    ang_z_rads: f64,

    /// Publish rate in hertz
    #[structopt(long, default_value = "10.0")]
    rate_hz: f64,

    /// How long to keep publishing, in seconds
    #[structopt(long, default_value = "5.0")]
    duration_s: f64,

    /// Robot namespace prefix applied to the topic
    #[structopt(long, default_value = "")]
    namespace: String,

    /// Command topic
    #[structopt(long, default_value = "cmd_vel")]
    topic: String,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    let opt = Opt::from_args();

    // Load the network parameters
    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    // Resolve the topic against the namespace
    let topic = frames::resolve(&opt.namespace, &opt.topic);

    // Create the publisher socket
    let ctx = zmq::Context::new();

    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        linger: 1,
        send_timeout: 10,
        ..Default::default()
    };

    let socket = MonitoredSocket::new(&ctx, zmq::PUB, socket_options, &net_params.cmd_endpoint)
        .wrap_err("Could not open the command publisher socket")?;

    let cmd = VelCmd {
        lin_x_ms: opt.lin_x_ms,
        lin_y_ms: opt.lin_y_ms,
        ang_z_rads: opt.ang_z_rads,
    };
    let cmd_str = serde_json::to_string(&cmd).wrap_err("Could not serialize the command")?;

    let num_sends = (opt.rate_hz * opt.duration_s).ceil() as u64;
    let period = std::time::Duration::from_secs_f64(1.0 / opt.rate_hz);

    println!(
        "Publishing ({}, {}) m/s, {} rad/s on \"{}\" at {} Hz for {} s",
        cmd.lin_x_ms, cmd.lin_y_ms, cmd.ang_z_rads, topic, opt.rate_hz, opt.duration_s
    );

    for _ in 0..num_sends {
        match socket.send(&format!("{} {}", topic, cmd_str), 0) {
            Ok(_) => (),
            Err(e) => println!("Failed to send command: {}", e),
        }

        std::thread::sleep(period);
    }

    println!("Done, the controller's command timeout will now stop the base");

    Ok(())
}

//! # Command Client
//!
//! The CmdClient receives velocity commands from the command transport and
//! writes them into the shared velocity command register. Reception happens
//! on a dedicated worker thread so that a burst of commands never blocks the
//! control cycle; the worker stamps each command with the current simulation
//! time read from the physics client's shared state.
//!
//! The worker's lifecycle is the explicit state machine
//! `Running -> Stopping -> Stopped`, owned by the client instance. Shutdown
//! requests `Stopping` and joins the thread, so no command can arrive after
//! the handshake completes.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace, warn};
use std::{
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
};

use sim_if::{
    cmd::VelCmd,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

use crate::{phys_client::PhysShared, vel_cmd::VelCmdRegister};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Lifecycle of the command worker thread.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WorkerLifecycle {
    /// The worker is draining the command socket.
    Running,

    /// A stop has been requested; the worker will exit at its next
    /// iteration.
    Stopping,

    /// The worker has exited.
    Stopped,
}

#[derive(Debug, thiserror::Error)]
pub enum CmdClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Command client owning the command worker thread.
pub struct CmdClient {
    lifecycle: Arc<Mutex<WorkerLifecycle>>,
    worker_jh: Option<JoinHandle<()>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CmdClient {
    /// Create a new instance of the command client and start its worker.
    ///
    /// `topic` is the resolved command topic. `register` is the shared
    /// command register written by the worker, and `phys` provides the
    /// simulation time commands are stamped with.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        topic: String,
        register: VelCmdRegister,
        phys: PhysShared,
    ) -> Result<Self, CmdClientError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            subscribe: Some(topic.clone()),
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::SUB, socket_options, &params.cmd_endpoint)
            .map_err(CmdClientError::SocketError)?;

        let lifecycle = Arc::new(Mutex::new(WorkerLifecycle::Running));
        let lifecycle_clone = lifecycle.clone();

        let worker_jh = Some(thread::spawn(move || {
            cmd_worker(socket, topic, lifecycle_clone, register, phys)
        }));

        Ok(Self {
            lifecycle,
            worker_jh,
        })
    }

    /// Get the current lifecycle state of the worker.
    pub fn lifecycle(&self) -> WorkerLifecycle {
        *self.lifecycle.lock().expect("CmdClient lifecycle mutex poisoned")
    }

    /// Perform the shutdown handshake: request the worker to stop, then
    /// join it. After this returns no further commands will be written into
    /// the register. Calling shutdown more than once is a no-op.
    pub fn shutdown(&mut self) {
        let jh = match self.worker_jh.take() {
            Some(jh) => jh,
            None => return,
        };

        {
            let mut lifecycle = self
                .lifecycle
                .lock()
                .expect("CmdClient lifecycle mutex poisoned");
            if *lifecycle == WorkerLifecycle::Running {
                *lifecycle = WorkerLifecycle::Stopping;
            }
        }

        if jh.join().is_err() {
            warn!("Command worker panicked before shutdown");
            *self
                .lifecycle
                .lock()
                .expect("CmdClient lifecycle mutex poisoned") = WorkerLifecycle::Stopped;
        }

        debug!("Command worker joined");
    }
}

impl Drop for CmdClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Command worker: drains the command socket into the register until asked
/// to stop.
fn cmd_worker(
    socket: MonitoredSocket,
    topic: String,
    lifecycle: Arc<Mutex<WorkerLifecycle>>,
    register: VelCmdRegister,
    phys: PhysShared,
) {
    loop {
        // Observe the lifecycle cooperatively
        {
            let lifecycle = lifecycle.lock().expect("CmdClient lifecycle mutex poisoned");
            if *lifecycle == WorkerLifecycle::Stopping {
                break;
            }
        }

        // Read from the socket, timing out quickly so the lifecycle stays
        // responsive
        let msg = match socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                warn!("Recieved non UTF-8 command message");
                continue;
            }
            Err(zmq::Error::EAGAIN) => continue,
            Err(e) => {
                warn!("Error recieving command: {}", e);
                continue;
            }
        };

        // Messages are "<topic> <json>", strip the topic
        let payload = match msg.splitn(2, ' ').nth(1) {
            Some(p) => p,
            None => {
                warn!("Recieved command message with no payload");
                continue;
            }
        };

        // Parse the command
        let cmd: VelCmd = match serde_json::from_str(payload) {
            Ok(c) => c,
            Err(e) => {
                warn!("Could not deserialize command on {}: {}", topic, e);
                continue;
            }
        };

        // Stamp with the current simulation time. Without a body state there
        // is no simulation clock, and a command stamped with anything else
        // would be junk, so discard it.
        match phys.sim_time_s() {
            Some(rx_time_s) => {
                register.set(cmd, rx_time_s);
                trace!(
                    "Command recieved: ({:.3}, {:.3}) m/s, {:.3} rad/s at t={:.3}",
                    cmd.lin_x_ms,
                    cmd.lin_y_ms,
                    cmd.ang_z_rads,
                    rx_time_s
                );
            }
            None => warn!("Command recieved before first body state, discarding"),
        }
    }

    *lifecycle.lock().expect("CmdClient lifecycle mutex poisoned") = WorkerLifecycle::Stopped;
    debug!("Command worker stopped");
}

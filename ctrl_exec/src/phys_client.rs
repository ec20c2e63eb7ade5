//! # Physics Client
//!
//! The PhysClient is the controller's handle on the external physics engine.
//! It serves two roles:
//!
//! - Body state truth (pose, velocities, simulation time) is streamed by the
//!   simulation server and drained by a background thread into a shared
//!   latest-state slot, which the control cycle reads without blocking.
//! - Wrench demands are sent over a request/reply socket, with the server
//!   acknowledging or rejecting each demand.
//!
//! If the body state stream cannot be connected at creation the controller
//! must abort its initialisation: without the simulation there is no clock
//! and no body to control.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::warn;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
};

use sim_if::{
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
    phys::{BodyState, WrenchDems, WrenchDemsResponse},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Shared latest-body-state slot.
///
/// Cloning produces another handle onto the same slot. The mutex is held
/// only for the duration of the copy in or out.
#[derive(Clone, Default)]
pub struct PhysShared {
    state: Arc<Mutex<Option<BodyState>>>,
}

/// The physics engine handle.
pub struct PhysClient {
    /// REQ socket for wrench demands
    dems_socket: MonitoredSocket,

    shared: PhysShared,

    bg_run: Arc<AtomicBool>,
    bg_jh: Option<JoinHandle<()>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PhysClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the simulation server")]
    NotConnected,

    #[error("Could not send demands to the server: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message from the server: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the demands: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the response from the server: {0}")]
    DeserializeError(serde_json::Error),

    #[error("The server sent a message which was not valid UTF-8")]
    NonUtf8Response,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PhysShared {
    /// Get a copy of the latest body state, or `None` if nothing has been
    /// received from the simulation yet.
    pub fn body_state(&self) -> Option<BodyState> {
        *self.state.lock().expect("PhysShared mutex poisoned")
    }

    /// Get the current simulation time, or `None` if nothing has been
    /// received from the simulation yet.
    pub fn sim_time_s(&self) -> Option<f64> {
        self.body_state().map(|s| s.sim_time_s)
    }

    fn set(&self, state: BodyState) {
        *self.state.lock().expect("PhysShared mutex poisoned") = Some(state);
    }
}

impl PhysClient {
    /// Create a new instance of the physics client.
    ///
    /// This function blocks until the body state stream is connected. If the
    /// simulation server is not reachable an error is returned and the
    /// controller must not start.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, PhysClientError> {
        // State stream socket options. Blocking on first connect here is
        // what makes a missing simulation fatal at init.
        let state_socket_options = SocketOptions {
            block_on_first_connect: true,
            subscribe: Some(String::new()),
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        let dems_socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 200,
            send_timeout: 10,
            // Relaxed REQ so a single missed reply does not wedge the
            // socket's send/recv alternation for the rest of the run
            req_correlate: true,
            req_relaxed: true,
            ..Default::default()
        };

        // Connect the sockets
        let state_socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            state_socket_options,
            &params.body_state_endpoint,
        )
        .map_err(PhysClientError::SocketError)?;

        let dems_socket =
            MonitoredSocket::new(ctx, zmq::REQ, dems_socket_options, &params.wrench_endpoint)
                .map_err(PhysClientError::SocketError)?;

        // Create the shared state slot
        let shared = PhysShared::default();

        // Create clones to pass to the bg thread
        let bg_run = Arc::new(AtomicBool::new(true));
        let bg_run_clone = bg_run.clone();
        let shared_clone = shared.clone();

        // Start BG thread
        let bg_jh = Some(thread::spawn(move || {
            bg_thread(state_socket, bg_run_clone, shared_clone)
        }));

        Ok(Self {
            dems_socket,
            shared,
            bg_run,
            bg_jh,
        })
    }

    /// Get a handle on the shared latest-body-state slot.
    pub fn shared(&self) -> PhysShared {
        self.shared.clone()
    }

    /// Get a copy of the latest body state, or `None` if nothing has been
    /// received from the simulation yet.
    pub fn body_state(&self) -> Option<BodyState> {
        self.shared.body_state()
    }

    /// Send wrench demands to the simulation server and wait for its
    /// response.
    pub fn send_dems(&self, dems: &WrenchDems) -> Result<WrenchDemsResponse, PhysClientError> {
        // Check the server is connected
        if !self.dems_socket.connected() {
            return Err(PhysClientError::NotConnected);
        }

        // Serialise the demands
        let dems_str =
            serde_json::to_string(dems).map_err(PhysClientError::SerializationError)?;

        // Send the demands
        self.dems_socket
            .send(&dems_str, 0)
            .map_err(PhysClientError::SendError)?;

        // Wait for the response
        let response_str = match self.dems_socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => return Err(PhysClientError::NonUtf8Response),
            Err(e) => return Err(PhysClientError::RecvError(e)),
        };

        // Parse the response
        serde_json::from_str(&response_str).map_err(PhysClientError::DeserializeError)
    }

    /// Stop the body state thread and wait for it to exit.
    pub fn shutdown(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);

        if let Some(jh) = self.bg_jh.take() {
            if jh.join().is_err() {
                warn!("Body state thread panicked before shutdown");
            }
        }
    }
}

impl Drop for PhysClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Background thread, updates the shared slot when the server publishes a
/// new body state.
fn bg_thread(socket: MonitoredSocket, run: Arc<AtomicBool>, shared: PhysShared) {
    // While instructed to run
    while run.load(Ordering::Relaxed) {
        // Read string from the socket, timing out quickly so the run flag
        // stays responsive
        let msg = match socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                warn!("Recieved non UTF-8 body state message");
                continue;
            }
            Err(zmq::Error::EAGAIN) => continue,
            Err(e) => {
                warn!("Error recieving body state: {}", e);
                continue;
            }
        };

        // Parse and store the state
        match serde_json::from_str::<BodyState>(&msg) {
            Ok(state) => shared.set(state),
            Err(e) => warn!("Could not deserialize body state: {}", e),
        }
    }
}

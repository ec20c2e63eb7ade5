//! # Physics Server Module
//!
//! This module abstracts over the networking side of the simulation
//! executable. The server streams body state to any number of subscribers
//! and answers wrench demands from the controller.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::warn;

use sim_if::{
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
    phys::{BodyState, WrenchDems, WrenchDemsResponse},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An abstraction over the networking part of the simulation executable.
pub struct PhysServer {
    /// REP socket which accepts wrench demands from the controller
    dems_socket: MonitoredSocket,

    /// PUB socket which streams body state
    state_socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the [`PhysServer`]
#[derive(Debug, thiserror::Error)]
pub enum PhysServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send data to the client: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the data: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PhysServer {
    /// Create a new instance of the physics server.
    ///
    /// This function will not wait for a connection from the controller
    /// before returning.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, PhysServerError> {
        // Create the socket options
        let dems_socket_options = SocketOptions {
            bind: true,
            block_on_first_connect: false,
            linger: 1,
            recv_timeout: 5,
            send_timeout: 10,
            ..Default::default()
        };
        let state_socket_options = SocketOptions {
            bind: true,
            block_on_first_connect: false,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        // Create the sockets
        let dems_socket = MonitoredSocket::new(
            ctx,
            zmq::REP,
            dems_socket_options,
            &params.wrench_endpoint,
        )
        .map_err(PhysServerError::SocketError)?;
        let state_socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            state_socket_options,
            &params.body_state_endpoint,
        )
        .map_err(PhysServerError::SocketError)?;

        // Create self
        Ok(Self {
            dems_socket,
            state_socket,
        })
    }

    /// Retrieve a set of wrench demands from the controller.
    ///
    /// The caller MUST call [`PhysServer::send_dems_response`] at the
    /// earliest opportunity after a demand is returned, the REP socket will
    /// not accept another request until then.
    ///
    /// `None` is returned if no valid demand arrived within the socket's
    /// receive timeout.
    pub fn get_demands(&mut self) -> Option<WrenchDems> {
        // Read from the socket
        let msg = match self.dems_socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                warn!("Recieved non UTF-8 wrench demands");
                // The REP socket owes a reply even for junk
                self.send_dems_response(&WrenchDemsResponse::DemsInvalid).ok();
                return None;
            }
            Err(_) => return None,
        };

        match serde_json::from_str(&msg) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!("Could not deserialize wrench demands: {}", e);
                self.send_dems_response(&WrenchDemsResponse::DemsInvalid).ok();
                None
            }
        }
    }

    /// Send the given response back to the controller.
    ///
    /// This function must be called after recieving demands.
    pub fn send_dems_response(
        &mut self,
        response: &WrenchDemsResponse,
    ) -> Result<(), PhysServerError> {
        let response_str =
            serde_json::to_string(response).map_err(PhysServerError::SerializationError)?;

        self.dems_socket
            .send(&response_str, 0)
            .map_err(PhysServerError::SendError)
    }

    /// Publish the current body state.
    pub fn send_state(&mut self, state: &BodyState) -> Result<(), PhysServerError> {
        let state_str =
            serde_json::to_string(state).map_err(PhysServerError::SerializationError)?;

        self.state_socket
            .send(&state_str, 0)
            .map_err(PhysServerError::SendError)
    }
}

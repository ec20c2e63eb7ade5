//! # Odometry Server
//!
//! Publishes odometry samples on the odometry topic and, if enabled, the
//! same pose as a frame transform on the `tf` topic. Both go out on one PUB
//! socket; subscribers filter by topic.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use sim_if::{
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
    odom::{OdomSample, TransformStamped},
};

use crate::odom;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Topic frame transforms are published on. Transforms are global by
/// convention, so the robot namespace is not applied here.
const TF_TOPIC: &str = "tf";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Odometry server configuration, resolved by the executable.
pub struct OdomServerConfig {
    /// Resolved topic to publish samples on
    pub odometry_topic: String,

    /// Resolved name of the odometry frame
    pub frame_id: String,

    /// Resolved name of the base frame
    pub child_frame_id: String,

    /// If true the pose is also broadcast as a transform
    pub publish_tf: bool,
}

/// Odometry server
pub struct OdomServer {
    socket: MonitoredSocket,
    config: OdomServerConfig,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum OdomServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the sample: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the sample: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OdomServer {
    /// Create a new instance of the odometry server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        config: OdomServerConfig,
    ) -> Result<Self, OdomServerError> {
        let socket_options = SocketOptions {
            bind: true,
            block_on_first_connect: false,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, &params.odom_endpoint)
            .map_err(OdomServerError::SocketError)?;

        Ok(Self { socket, config })
    }

    /// Publish one odometry output, and its transform if enabled.
    pub fn send(&mut self, output: &odom::OutputData) -> Result<(), OdomServerError> {
        let sample = OdomSample {
            sim_time_s: output.sim_time_s,
            frame_id: self.config.frame_id.clone(),
            child_frame_id: self.config.child_frame_id.clone(),
            position_m: output.position_m,
            attitude_q: output.attitude_q,
            lin_vel_ms_bf: output.lin_vel_ms_bf,
            ang_vel_rads_bf: output.ang_vel_rads_bf,
            pose_covariance: output.pose_covariance,
            twist_covariance: output.twist_covariance,
        };

        let sample_str =
            serde_json::to_string(&sample).map_err(OdomServerError::SerializationError)?;

        self.socket
            .send(
                &format!("{} {}", self.config.odometry_topic, sample_str),
                0,
            )
            .map_err(OdomServerError::SendError)?;

        if self.config.publish_tf {
            let transform = TransformStamped {
                sim_time_s: output.sim_time_s,
                frame_id: self.config.frame_id.clone(),
                child_frame_id: self.config.child_frame_id.clone(),
                translation_m: output.position_m,
                rotation_q: output.attitude_q,
            };

            let transform_str =
                serde_json::to_string(&transform).map_err(OdomServerError::SerializationError)?;

            self.socket
                .send(&format!("{} {}", TF_TOPIC, transform_str), 0)
                .map_err(OdomServerError::SendError)?;
        }

        Ok(())
    }
}

//! MQTT adapter error types.

use std::path::PathBuf;

use shadowhome_domain::error::ShadowError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client refused a request (queue full or event loop gone).
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// No live session with subscriptions in place; the publish was dropped.
    #[error("MQTT client not connected")]
    NotConnected,

    /// A TLS PEM file could not be read.
    #[error("failed to read TLS file {}", path.display())]
    Tls {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A domain-level error.
    #[error("domain error")]
    Domain(#[source] ShadowError),
}

impl MqttError {
    /// Convert into a [`ShadowError::Transport`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> ShadowError {
        match self {
            Self::Domain(err) => err,
            other => ShadowError::Transport(Box::new(other)),
        }
    }
}

impl From<MqttError> for ShadowError {
    fn from(err: MqttError) -> Self {
        err.into_domain()
    }
}

impl From<rumqttc::ClientError> for MqttError {
    fn from(err: rumqttc::ClientError) -> Self {
        Self::Client(err)
    }
}

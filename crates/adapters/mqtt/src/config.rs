//! MQTT connection configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rumqttc::{MqttOptions, TlsConfiguration};
use serde::Deserialize;

use crate::error::MqttError;

/// Configuration for the broker connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Name of the thing whose shadow is mirrored. Drives every topic name.
    pub thing_name: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Capacity of the outgoing request queue.
    pub request_capacity: usize,
    /// Mutual TLS material. Plain TCP when absent.
    pub tls: Option<TlsFiles>,
}

/// PEM files for a mutually authenticated TLS session.
#[derive(Debug, Clone, Deserialize)]
pub struct TlsFiles {
    /// Root CA used to verify the broker.
    pub ca_path: PathBuf,
    /// Client certificate.
    pub cert_path: PathBuf,
    /// Client private key.
    pub key_path: PathBuf,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "shadowhome".to_string(),
            thing_name: "MiCasa".to_string(),
            keep_alive_secs: 30,
            request_capacity: 64,
            tls: None,
        }
    }
}

impl MqttConfig {
    /// Build the rumqttc options, reading TLS material from disk if configured.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Tls`] if a PEM file cannot be read.
    pub fn mqtt_options(&self) -> Result<MqttOptions, MqttError> {
        let mut options = MqttOptions::new(
            self.client_id.clone(),
            self.broker_host.clone(),
            self.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(self.keep_alive_secs)));

        if let Some(tls) = &self.tls {
            let tls = TlsConfiguration::Simple {
                ca: read_pem(&tls.ca_path)?,
                alpn: None,
                client_auth: Some((read_pem(&tls.cert_path)?, read_pem(&tls.key_path)?)),
            };
            options.set_transport(rumqttc::Transport::tls_with_config(tls));
        }
        Ok(options)
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, MqttError> {
    std::fs::read(path).map_err(|source| MqttError::Tls {
        path: path.to_path_buf(),
        source,
    })
}

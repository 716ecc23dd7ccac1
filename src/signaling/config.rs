use std::time::Duration;

use clap::Parser;

use super::types::SignalingError;

pub const DEFAULT_SIGNALING_PORT: u16 = 3479;
const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_PONG_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_COMMAND_BUFFER: usize = 1024;

/// Duet signaling server
///
/// Pairs two WebRTC peers per room and relays their handshake.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct SignalingArgs {
    /// Address the WebSocket listener binds to
    #[arg(long, default_value = "0.0.0.0:3479", env = "DUET_BIND_ADDR")]
    pub bind_addr: String,

    /// Seconds between keepalive pings
    #[arg(long, default_value_t = 30, env = "DUET_PING_INTERVAL_SECS")]
    pub ping_interval_secs: u64,

    /// Seconds a client has to answer a ping
    #[arg(long, default_value_t = 10, env = "DUET_PONG_TIMEOUT_SECS")]
    pub pong_timeout_secs: u64,

    /// Capacity of the coordinator command queue
    #[arg(long, default_value_t = 1024, env = "DUET_COMMAND_BUFFER")]
    pub command_buffer: usize,
}

impl SignalingArgs {
    pub fn into_config(self) -> Result<SignalingConfig, SignalingError> {
        let config = SignalingConfig {
            bind_addr: self.bind_addr,
            ping_interval: Duration::from_secs(self.ping_interval_secs),
            pong_timeout: Duration::from_secs(self.pong_timeout_secs),
            command_buffer: self.command_buffer,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct SignalingConfig {
    pub bind_addr: String,
    /// How often the server pings each client
    pub ping_interval: Duration,
    /// How long a client may take to answer a ping before it is dropped
    pub pong_timeout: Duration,
    /// Capacity of the coordinator command queue
    pub command_buffer: usize,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{}", DEFAULT_SIGNALING_PORT),
            ping_interval: DEFAULT_PING_INTERVAL,
            pong_timeout: DEFAULT_PONG_TIMEOUT,
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

impl SignalingConfig {
    pub fn validate(&self) -> Result<(), SignalingError> {
        if self.ping_interval.is_zero() {
            return Err(SignalingError::Config("ping interval must be non-zero".to_string()));
        }
        if self.pong_timeout.is_zero() {
            return Err(SignalingError::Config("pong timeout must be non-zero".to_string()));
        }
        if self.command_buffer == 0 {
            return Err(SignalingError::Config("command buffer must be non-zero".to_string()));
        }
        Ok(())
    }
}

//! Listener Config

use clap::Args;

/// Where the HTTP listener binds.
#[derive(Debug, Args)]
pub struct ServerRuntimeConfig {
    /// Interface to bind; `0.0.0.0` for all
    #[arg(short = 'H', long = "host", env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// TCP port
    #[arg(short, long = "port", env = "SERVER_PORT", default_value_t = 8700)]
    pub port: u16,
}

impl ServerRuntimeConfig {
    /// `host:port`, bracketing IPv6 literals.
    #[must_use]
    pub fn socket_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

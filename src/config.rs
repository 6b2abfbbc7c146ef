use clap::Parser;
use std::net::SocketAddr;

/// Heuristic MMA bout win-probability service
#[derive(Parser, Debug, Clone)]
#[command(name = "bout-predictor", version, about)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "PREDICTOR_ADDR", default_value = "127.0.0.1:8001")]
    pub listen_addr: String,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "PREDICTOR_BODY_LIMIT", default_value = "65536")]
    pub body_limit_bytes: usize,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!(
                "listen_addr must be a socket address like 127.0.0.1:8001, got {:?}",
                self.listen_addr
            );
        }
        if self.body_limit_bytes == 0 {
            anyhow::bail!("body_limit_bytes must be positive");
        }
        Ok(())
    }
}

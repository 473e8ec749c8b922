use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key → value source. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        Ok(Self {
            server_host: optional("SERVER_HOST", "localhost"),
            server_port: optional("SERVER_PORT", "3000")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
        })
    }

    /// `host:port` suitable for `TcpListener::bind`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

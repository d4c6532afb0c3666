use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the listen port.
pub const PORT_ENV: &str = "SIMSTALKER_PORT";

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8888";

/// Runtime configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Control channel address.
    pub listen: String,
    /// Prefix of every simulator signal name.
    pub root_prefix: String,
    /// Interval of debug information store polling.
    pub store_poll_interval_ms: u64,
    /// Park simulation until the first client release.
    pub start_paused: bool,
    /// Send log records to the client as `output` events.
    pub forward_logs: bool,
    /// Log every control message.
    pub trace: bool,
    /// Symbol table to attach on start.
    pub database: Option<PathBuf>,
    /// Client source tree prefix.
    pub src_path: Option<String>,
    /// Build source tree prefix.
    pub dst_path: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            root_prefix: crate::debugger::symbol::DEFAULT_ROOT_PREFIX.to_string(),
            store_poll_interval_ms: 100,
            start_paused: true,
            forward_logs: false,
            trace: false,
            database: None,
            src_path: None,
            dst_path: None,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml(&data).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_toml(data: &str) -> anyhow::Result<Self> {
        Ok(toml::de::from_str(data)?)
    }

    /// Apply port override from [`PORT_ENV`] if it is set.
    pub fn with_env(self) -> Self {
        match std::env::var(PORT_ENV) {
            Ok(port) => self.with_port_override(&port),
            Err(_) => self,
        }
    }

    fn with_port_override(mut self, port: &str) -> Self {
        let Ok(port) = port.trim().parse::<u16>() else {
            log::warn!(target: "simstalker", "unable to set port to `{port}`");
            return self;
        };
        let host = self
            .listen
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        self.listen = format!("{host}:{port}");
        self
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listen
            .parse()
            .with_context(|| format!("invalid listen address `{}`", self.listen))
    }

    pub fn store_poll_interval(&self) -> Duration {
        Duration::from_millis(self.store_poll_interval_ms)
    }

    /// Client/build path pair, present only if both sides are set.
    pub fn path_map(&self) -> Option<(&str, &str)> {
        match (&self.src_path, &self.dst_path) {
            (Some(src), Some(dst)) if !src.is_empty() && !dst.is_empty() => {
                Some((src.as_str(), dst.as_str()))
            }
            _ => None,
        }
    }
}

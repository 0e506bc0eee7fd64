use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tipsync_store::Depth;
use tipsync_sync::SyncPolicy;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Push payloads whose encoded text exceeds this many bytes are refused.
    pub max_pack_size: u64,
    /// Refuse pushes whose `start_commit` is no longer the branch tip.
    pub verify_start_tip: bool,
    /// Maximum number of commits in a pull export. Unbounded when absent.
    pub export_depth: Option<u32>,
    /// `tracing_subscriber` env filter directive.
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 7420)),
            max_pack_size: 100 * 1024 * 1024,
            verify_start_tip: false,
            export_depth: None,
            log_filter: "info".into(),
        }
    }
}

impl ServerConfig {
    /// Read a TOML config file. Missing keys fall back to the defaults.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// The sync policy every session opened under this config runs with.
    pub fn policy(&self) -> SyncPolicy {
        SyncPolicy {
            verify_start_tip: self.verify_start_tip,
            max_payload_size: Some(usize::try_from(self.max_pack_size).unwrap_or(usize::MAX)),
            export_depth: self.export_depth.map_or(Depth::Unbounded, Depth::Limited),
        }
    }
}

//! Hosting surface for tipsync.
//!
//! Binds the sync coordinators to a running process: configuration,
//! credential mapping, per-connection sessions with their own tracing span,
//! and HTTP status endpoints. The XML stream transport plugs in through
//! [`SyncService::open_session`].

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod service;

pub use auth::Credentials;
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::SyncServer;
pub use service::{HostedSession, SyncService};

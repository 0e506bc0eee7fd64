use std::sync::Arc;

use tipsync_store::AccountResolver;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::service::SyncService;

/// tipsync host process.
pub struct SyncServer {
    config: ServerConfig,
    service: Arc<SyncService>,
}

impl SyncServer {
    pub fn new(config: ServerConfig, accounts: Arc<dyn AccountResolver>) -> Self {
        let service = Arc::new(SyncService::new(accounts, config.policy()));
        Self { config, service }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Shared session service; transports open their sessions here.
    pub fn service(&self) -> Arc<SyncService> {
        Arc::clone(&self.service)
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.service())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "tipsync server listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tipsync_store::{Depth, InMemoryAccounts};

    #[test]
    fn server_construction() {
        let config = ServerConfig {
            verify_start_tip: true,
            export_depth: Some(10),
            ..ServerConfig::default()
        };
        let server = SyncServer::new(config, Arc::new(InMemoryAccounts::new()));
        assert_eq!(server.config().bind_addr, "127.0.0.1:7420".parse().unwrap());
        assert!(server.service().policy().verify_start_tip);
        assert_eq!(server.service().policy().export_depth, Depth::Limited(10));
    }

    #[tokio::test]
    async fn serve_fails_on_bound_address() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let config = ServerConfig {
            bind_addr: taken.local_addr().unwrap(),
            ..ServerConfig::default()
        };
        let server = SyncServer::new(config, Arc::new(InMemoryAccounts::new()));
        assert!(matches!(server.serve().await, Err(ServerError::Io(_))));
    }
}

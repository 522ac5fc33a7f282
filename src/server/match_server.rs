use crate::config::Config;
use crate::matchmaking::MatchService;
use crate::model::ServerError;
use crate::server::create_router;
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{error, info};

pub struct MatchServer {
    service: MatchService,
    static_dir: Option<PathBuf>,
}

impl MatchServer {
    pub fn new(service: MatchService, static_dir: Option<PathBuf>) -> Self {
        MatchServer {
            service,
            static_dir,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            MatchService::new(config.match_config()),
            config.static_dir.clone(),
        )
    }

    pub fn router(&self) -> Router {
        create_router(self.service.clone(), self.static_dir.as_deref())
    }

    pub async fn run(self, address: SocketAddr) -> Result<(), ServerError> {
        let listener = TcpListener::bind(address).await?;
        self.serve(listener).await
    }

    /// Serves until Ctrl-C.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        info!(address = %listener.local_addr()?, "Match server listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Match server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

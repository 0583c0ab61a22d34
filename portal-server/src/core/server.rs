use std::net::SocketAddr;

use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{Config, ServerState};
use crate::api;

/// HTTP server wrapper: router assembly, middleware, graceful shutdown
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    /// Run the server until ctrl-c (or an external cancellation)
    pub async fn run(self) -> anyhow::Result<()> {
        self.state.start_background_tasks();

        let app = api::router()
            .with_state(self.state.clone())
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive()),
            );

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, environment = %self.config.environment, "HTTP server listening");

        let shutdown = self.state.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.cancelled() => {}
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown signal received");
                        shutdown.cancel();
                    }
                }
            })
            .await?;

        // Stop background tasks in case shutdown came from elsewhere
        self.state.shutdown.cancel();
        tracing::info!("Server stopped");
        Ok(())
    }
}

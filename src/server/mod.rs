//! HTTP server for the mini-app manifest.

mod routes;

pub use routes::{create_router, AppState};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::context::AppContext;
use crate::runtime::Shutdown;

/// Bind `0.0.0.0:<port>` and serve until shutdown.
pub async fn serve(ctx: Arc<AppContext>, shutdown: Shutdown) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], ctx.config().port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "serving manifest");

    let router = create_router(AppState::from_context(&ctx));
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await?;

    info!("server stopped");
    Ok(())
}

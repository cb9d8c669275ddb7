use ferrous_relay_api::{create_admin_routes, AdminState};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn start_web_server(
    bind_addr: SocketAddr,
    state: AdminState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    info!(
        bind_address = %bind_addr,
        metrics_url = format!("http://{}/metrics", bind_addr),
        "Starting admin HTTP server"
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, create_admin_routes(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Admin HTTP server stopped");
    Ok(())
}

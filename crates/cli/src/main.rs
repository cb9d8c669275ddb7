use clap::Parser;
use ferrous_relay_api::AdminState;
use ferrous_relay_domain::CliOverrides;
use ferrous_relay_jobs::JobRunner;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "ferrous-relay")]
#[command(version)]
#[command(about = "Ferrous Relay - DNS forwarding proxy with routing and upstream failover")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", env = "FERROUS_RELAY_CONFIG")]
    config: Option<String>,

    /// DNS listen address (host:port)
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Admin HTTP listen address (host:port)
    #[arg(long)]
    http: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        listen_addr: cli.listen.clone(),
        http_addr: cli.http.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        pools = config.pools.len(),
        routes = config.routes.len(),
        "Starting Ferrous Relay"
    );

    let shutdown = CancellationToken::new();
    let services = di::DnsServices::new(&config, &shutdown).await?;

    let mut runner = JobRunner::new().with_shutdown_token(shutdown.clone());
    for job in services.health_checks {
        runner = runner.with_health_check(job);
    }
    let job_handles = runner.start();

    let mut listeners =
        server::start_dns_listeners(&config.server, services.dispatcher.clone(), &shutdown)?;

    let admin_state = AdminState::new(services.metrics.clone(), services.upstream_status.clone());
    let http_addr: SocketAddr = config.server.http_addr.parse()?;
    let web_shutdown = shutdown.clone();
    let web = tokio::spawn(async move {
        if let Err(e) = server::start_web_server(http_addr, admin_state, web_shutdown).await {
            error!(error = %e, "Admin HTTP server error");
        }
    });

    wait_for_signal().await;
    info!("Shutdown signal received");
    shutdown.cancel();

    while listeners.join_next().await.is_some() {}
    for handle in job_handles {
        let _ = handle.await;
    }
    let _ = web.await;

    for client in &services.clients {
        client.close().await;
    }

    info!("Shutdown complete");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            error!(error = %e, "Failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

use ferrous_relay_application::use_cases::DispatchQueryUseCase;
use ferrous_relay_domain::ServerConfig;
use ferrous_relay_infrastructure::dns::{TcpListenerServer, UdpListenerServer};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Bind every listener the configured mode asks for. Binding happens up
/// front so a taken port fails startup instead of a background task.
pub fn start_dns_listeners(
    config: &ServerConfig,
    dispatcher: Arc<DispatchQueryUseCase>,
    shutdown: &CancellationToken,
) -> anyhow::Result<JoinSet<()>> {
    let addr: SocketAddr = config.listen_addr.parse()?;
    let mut listeners = JoinSet::new();

    if config.listen_net.serves_udp() {
        let server = UdpListenerServer::bind(addr, dispatcher.clone())?;
        info!(bind_address = %server.local_addr()?, "UDP DNS listener ready");
        listeners.spawn(server.run(shutdown.clone()));
    }

    if config.listen_net.serves_tcp() {
        let server = TcpListenerServer::bind(addr, dispatcher)?;
        info!(bind_address = %server.local_addr()?, "TCP DNS listener ready");
        listeners.spawn(server.run(shutdown.clone()));
    }

    Ok(listeners)
}

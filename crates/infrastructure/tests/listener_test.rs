mod helpers;

use ferrous_relay_application::ports::QueryHandler;
use ferrous_relay_application::services::{DownstreamPool, PoolMember, RouteTable};
use ferrous_relay_application::use_cases::DispatchQueryUseCase;
use ferrous_relay_domain::{RouteConfig, TransportMode, UpstreamAddr};
use ferrous_relay_infrastructure::dns::client::{UpstreamClient, UpstreamEndpoint};
use ferrous_relay_infrastructure::dns::{TcpListenerServer, UdpListenerServer};
use ferrous_relay_infrastructure::metrics::RelayMetrics;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, RecordType};
use helpers::MockDnsServer;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio_util::sync::CancellationToken;

fn query_bytes(name: &str, id: u16) -> Vec<u8> {
    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.metadata.recursion_desired = true;
    message.add_query(Query::query(Name::from_str(name).unwrap(), RecordType::A));
    message.to_vec().unwrap()
}

/// `blocked.test.` is dropped, everything else goes to the mock upstream.
async fn dispatcher(upstream: SocketAddr, shutdown: &CancellationToken) -> Arc<DispatchQueryUseCase> {
    let metrics = Arc::new(RelayMetrics::new().unwrap());
    let client = UpstreamClient::connect(
        UpstreamEndpoint {
            pool: Arc::from("main"),
            addr: UpstreamAddr::new(upstream.ip().to_string(), upstream.port()),
            mode: TransportMode::Udp,
            tls_name: String::new(),
            timeout: Duration::from_secs(2),
        },
        metrics,
        shutdown,
    )
    .await
    .unwrap();

    let mut pools: HashMap<String, Arc<dyn QueryHandler>> = HashMap::new();
    pools.insert(
        "main".to_string(),
        Arc::new(DownstreamPool::new(
            "main",
            vec![PoolMember::new(Arc::new(client), None)],
        )),
    );

    let routes = vec![
        RouteConfig {
            domain: Some("blocked.test.".to_string()),
            drop: true,
            ..Default::default()
        },
        RouteConfig {
            addr: Some("127.0.0.0/8".to_string()),
            pool: Some("main".to_string()),
            ..Default::default()
        },
    ];
    Arc::new(DispatchQueryUseCase::new(Arc::new(
        RouteTable::build(&routes, &pools).unwrap(),
    )))
}

async fn recv_response(socket: &UdpSocket) -> Message {
    let mut buf = vec![0u8; 4096];
    let len = tokio::time::timeout(Duration::from_secs(2), socket.recv(&mut buf))
        .await
        .expect("response expected")
        .unwrap();
    Message::from_vec(&buf[..len]).unwrap()
}

#[tokio::test]
async fn test_udp_listener_forwards_and_refuses() {
    let upstream = MockDnsServer::start().await;
    let shutdown = CancellationToken::new();
    let listener = UdpListenerServer::bind(
        "127.0.0.1:0".parse().unwrap(),
        dispatcher(upstream.addr(), &shutdown).await,
    )
    .unwrap();
    let listen_addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(listener.run(shutdown.clone()));

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.connect(listen_addr).await.unwrap();

    client.send(&query_bytes("www.example.com.", 11)).await.unwrap();
    let forwarded = recv_response(&client).await;
    assert_eq!(forwarded.id, 11);
    assert_eq!(forwarded.response_code, ResponseCode::NoError);
    assert_eq!(forwarded.answers.len(), 1);

    client.send(&query_bytes("blocked.test.", 12)).await.unwrap();
    let refused = recv_response(&client).await;
    assert_eq!(refused.id, 12);
    assert_eq!(refused.response_code, ResponseCode::Refused);
    assert_eq!(upstream.received(), 1);

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("listener should stop on shutdown")
        .unwrap();
}

#[tokio::test]
async fn test_udp_listener_drops_undecodable_datagrams() {
    let upstream = MockDnsServer::start().await;
    let shutdown = CancellationToken::new();
    let listener = UdpListenerServer::bind(
        "127.0.0.1:0".parse().unwrap(),
        dispatcher(upstream.addr(), &shutdown).await,
    )
    .unwrap();
    let listen_addr = listener.local_addr().unwrap();
    tokio::spawn(listener.run(shutdown.clone()));

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.connect(listen_addr).await.unwrap();

    client.send(&[0xde, 0xad]).await.unwrap();
    client.send(&query_bytes("blocked.test.", 21)).await.unwrap();

    let response = recv_response(&client).await;
    assert_eq!(response.id, 21);
    shutdown.cancel();
}

#[tokio::test]
async fn test_tcp_listener_answers_framed_queries() {
    let upstream = MockDnsServer::start().await;
    let shutdown = CancellationToken::new();
    let listener = TcpListenerServer::bind(
        "127.0.0.1:0".parse().unwrap(),
        dispatcher(upstream.addr(), &shutdown).await,
    )
    .unwrap();
    let listen_addr = listener.local_addr().unwrap();
    tokio::spawn(listener.run(shutdown.clone()));

    let mut stream = TcpStream::connect(listen_addr).await.unwrap();
    for (name, id) in [("www.example.com.", 31u16), ("blocked.test.", 32u16)] {
        let wire = query_bytes(name, id);
        stream
            .write_all(&(wire.len() as u16).to_be_bytes())
            .await
            .unwrap();
        stream.write_all(&wire).await.unwrap();
    }

    let mut codes = HashMap::new();
    for _ in 0..2 {
        let mut len_buf = [0u8; 2];
        stream.read_exact(&mut len_buf).await.unwrap();
        let mut frame = vec![0u8; u16::from_be_bytes(len_buf) as usize];
        stream.read_exact(&mut frame).await.unwrap();
        let response = Message::from_vec(&frame).unwrap();
        codes.insert(response.id, response.response_code);
    }

    assert_eq!(codes.get(&31), Some(&ResponseCode::NoError));
    assert_eq!(codes.get(&32), Some(&ResponseCode::Refused));
    shutdown.cancel();
}

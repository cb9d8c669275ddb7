use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;
use tokio_rustls::TlsAcceptor;

pub const MOCK_ANSWER: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);

/// NOERROR answer echoing the question with one A record.
pub fn answer_for(query: &[u8]) -> Option<Vec<u8>> {
    let query = Message::from_vec(query).ok()?;
    let mut response = Message::new(query.id, MessageType::Response, query.op_code);
    response.metadata.recursion_desired = query.recursion_desired;
    response.metadata.recursion_available = true;
    response.metadata.response_code = ResponseCode::NoError;
    response.add_queries(query.queries.iter().cloned());
    if let Some(question) = query.queries.first() {
        response.add_answer(Record::from_rdata(
            question.name().clone(),
            60,
            RData::A(A(MOCK_ANSWER)),
        ));
    }
    response.to_vec().ok()
}

pub struct MockDnsServer {
    addr: SocketAddr,
    received: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start() -> Self {
        Self::spawn(Duration::ZERO, false).await
    }

    /// Answers each query after `delay`, out of arrival order.
    pub async fn delayed(delay: Duration) -> Self {
        Self::spawn(delay, false).await
    }

    /// Receives but never answers.
    pub async fn silent() -> Self {
        Self::spawn(Duration::ZERO, true).await
    }

    async fn spawn(delay: Duration, silent: bool) -> Self {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let addr = socket.local_addr().unwrap();
        let received = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let counter = Arc::clone(&received);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        counter.fetch_add(1, Ordering::SeqCst);
                        if silent {
                            continue;
                        }
                        let Some(response) = answer_for(&buf[..len]) else { continue };
                        let socket = Arc::clone(&socket);
                        let jitter = Duration::from_millis(fastrand::u64(0..=delay.as_millis() as u64));
                        tokio::spawn(async move {
                            tokio::time::sleep(jitter).await;
                            let _ = socket.send_to(&response, peer).await;
                        });
                    }
                }
            }
        });

        Self {
            addr,
            received,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Length-framed TCP server. With `close_after`, each connection is closed
/// after answering that many queries.
pub struct MockTcpDnsServer {
    addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    answered: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockTcpDnsServer {
    pub async fn start(close_after: Option<usize>) -> Self {
        Self::spawn(close_after, Duration::ZERO).await
    }

    /// The first accepted connection is left unread for `pause`, so the
    /// client's socket buffers fill up and its writes block mid-frame.
    pub async fn stalled_first(pause: Duration) -> Self {
        Self::spawn(None, pause).await
    }

    async fn spawn(close_after: Option<usize>, first_pause: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let answered = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let counter = Arc::clone(&connections);
        let answered_total = Arc::clone(&answered);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = listener.accept() => {
                        let Ok((stream, _)) = result else { continue };
                        let pause = if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                            first_pause
                        } else {
                            Duration::ZERO
                        };
                        let answered_total = Arc::clone(&answered_total);
                        tokio::spawn(async move {
                            tokio::time::sleep(pause).await;
                            serve_framed(stream, close_after, answered_total).await;
                        });
                    }
                }
            }
        });

        Self {
            addr,
            connections,
            answered,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn answered(&self) -> usize {
        self.answered.load(Ordering::SeqCst)
    }
}

async fn serve_framed<S>(mut stream: S, close_after: Option<usize>, answered_total: Arc<AtomicUsize>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut answered = 0usize;
    loop {
        let mut len_buf = [0u8; 2];
        if stream.read_exact(&mut len_buf).await.is_err() {
            break;
        }
        let mut frame = vec![0u8; u16::from_be_bytes(len_buf) as usize];
        if stream.read_exact(&mut frame).await.is_err() {
            break;
        }
        let Some(response) = answer_for(&frame) else { break };
        let mut out = (response.len() as u16).to_be_bytes().to_vec();
        out.extend_from_slice(&response);
        if stream.write_all(&out).await.is_err() {
            break;
        }
        answered += 1;
        answered_total.fetch_add(1, Ordering::SeqCst);
        if close_after.is_some_and(|limit| answered >= limit) {
            break;
        }
    }
}

/// DNS-over-TLS server presenting a freshly generated self-signed
/// certificate for `localhost`, which no public root vouches for.
pub struct MockTlsDnsServer {
    addr: SocketAddr,
    handshakes: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockTlsDnsServer {
    pub async fn start() -> Self {
        let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(certified.key_pair.serialize_der()));
        let config = rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(vec![certified.cert.der().clone()], key)
            .unwrap();
        let acceptor = TlsAcceptor::from(Arc::new(config));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handshakes = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let completed = Arc::clone(&handshakes);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = listener.accept() => {
                        let Ok((stream, _)) = result else { continue };
                        let acceptor = acceptor.clone();
                        let completed = Arc::clone(&completed);
                        tokio::spawn(async move {
                            let Ok(tls) = acceptor.accept(stream).await else { return };
                            completed.fetch_add(1, Ordering::SeqCst);
                            serve_framed(tls, None, Arc::new(AtomicUsize::new(0))).await;
                        });
                    }
                }
            }
        });

        Self {
            addr,
            handshakes,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn handshakes(&self) -> usize {
        self.handshakes.load(Ordering::SeqCst)
    }
}

impl Drop for MockTlsDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockTcpDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

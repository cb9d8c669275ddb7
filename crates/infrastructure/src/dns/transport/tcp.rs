use ferrous_relay_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::map_io_error;

pub(crate) async fn connect_tcp(
    addr: SocketAddr,
    server: &str,
    timeout: Duration,
) -> Result<TcpStream, DomainError> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| DomainError::TransportTimeout {
            server: server.to_string(),
        })?
        .map_err(|e| map_io_error(server, e))?;

    stream
        .set_nodelay(true)
        .map_err(|e| map_io_error(server, e))?;

    Ok(stream)
}

/// Write one 2-byte length-prefixed DNS frame.
pub(crate) async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
    server: &str,
) -> Result<(), DomainError>
where
    S: AsyncWriteExt + Unpin + ?Sized,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        DomainError::Encode(format!(
            "DNS message too large for stream framing: {} bytes",
            message_bytes.len()
        ))
    })?;

    let mut frame = Vec::with_capacity(message_bytes.len() + 2);
    frame.extend_from_slice(&length.to_be_bytes());
    frame.extend_from_slice(message_bytes);

    stream
        .write_all(&frame)
        .await
        .map_err(|e| map_io_error(server, e))?;
    stream.flush().await.map_err(|e| map_io_error(server, e))?;

    Ok(())
}

/// Read one 2-byte length-prefixed DNS frame.
pub(crate) async fn read_with_length_prefix<S>(
    stream: &mut S,
    server: &str,
) -> Result<Vec<u8>, DomainError>
where
    S: AsyncReadExt + Unpin + ?Sized,
{
    let mut len_buf = [0u8; 2];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| map_io_error(server, e))?;

    let frame_len = u16::from_be_bytes(len_buf) as usize;
    let mut frame = vec![0u8; frame_len];
    stream
        .read_exact(&mut frame)
        .await
        .map_err(|e| map_io_error(server, e))?;

    Ok(frame)
}

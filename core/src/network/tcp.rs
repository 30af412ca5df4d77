use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Result of a bounded TCP connect.
#[derive(Debug)]
pub enum Handshake {
    Connected(TcpStream),
    /// The peer answered with a reset, so its stack is alive.
    Refused,
    TimedOut,
    Failed(io::Error),
}

impl Handshake {
    /// Connected or refused: something at that address answered.
    pub fn is_answer(&self) -> bool {
        matches!(self, Handshake::Connected(_) | Handshake::Refused)
    }
}

pub async fn handshake(addr: SocketAddr, limit: Duration) -> Handshake {
    match timeout(limit, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => Handshake::Connected(stream),
        Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => Handshake::Refused,
        Ok(Err(e)) => Handshake::Failed(e),
        Err(_elapsed) => Handshake::TimedOut,
    }
}

/// Writes `probe` (if any) and reads one chunk of at most `max_len` bytes.
///
/// Both the write and the read are bounded by `limit`. A closed connection, an I/O
/// error or an expired deadline gives an empty banner.
/// The text is decoded lossily and trimmed.
pub async fn grab_banner(
    stream: &mut TcpStream,
    probe: &[u8],
    limit: Duration,
    max_len: usize,
) -> String {
    if !probe.is_empty() && !matches!(timeout(limit, stream.write_all(probe)).await, Ok(Ok(()))) {
        return String::new();
    }

    let mut buf = vec![0u8; max_len];
    match timeout(limit, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => String::from_utf8_lossy(&buf[..n]).trim().to_string(),
        _ => String::new(),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

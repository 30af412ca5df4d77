//! # Liveness Probing
//!
//! Decides whether one address is up. A fast TCP connect to a well-known port comes
//! first; a refused connection counts as an answer since only a live stack can send the
//! reset. When the connect times out or fails in any other way, a single ICMP echo is
//! tried through the system `ping` binary.
//!
//! Firewalled hosts that drop both probes are reported as down. That is an accepted
//! false negative, not an error.

use std::net::{IpAddr, SocketAddr};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::trace;

use crate::network::tcp::{self, Handshake};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Liveness {
    pub alive: bool,
    /// Time from probe start to verdict.
    pub latency: Duration,
}

#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn probe(&self, ip: IpAddr) -> Liveness;
}

/// A single echo request/reply exchange.
#[async_trait]
pub trait EchoProbe: Send + Sync {
    async fn echo(&self, ip: IpAddr) -> bool;
}

/// Shells out to the platform `ping` with one packet.
pub struct SystemPing {
    wait: Duration,
}

impl SystemPing {
    pub fn new(wait: Duration) -> Self {
        Self { wait }
    }

    fn command(&self, ip: IpAddr) -> Command {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut cmd = Command::new("ping");
            cmd.args(["-n", "1", "-w", &self.wait.as_millis().to_string()]);
            cmd
        } else {
            let mut cmd = Command::new(if ip.is_ipv6() { "ping6" } else { "ping" });
            cmd.args(["-c", "1", "-W", &self.wait.as_secs().max(1).to_string()]);
            cmd
        };

        cmd.arg(ip.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl EchoProbe for SystemPing {
    async fn echo(&self, ip: IpAddr) -> bool {
        // the binary gets its own wait; this bound covers a hung process
        let hard_limit = self.wait + Duration::from_millis(500);
        match timeout(hard_limit, self.command(ip).status()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                trace!("ping {ip} could not run: {e}");
                false
            }
            Err(_elapsed) => false,
        }
    }
}

/// TCP connect first, echo as the fallback.
pub struct HybridProbe {
    port: u16,
    connect_timeout: Duration,
    echo: Box<dyn EchoProbe>,
}

impl HybridProbe {
    pub fn new(port: u16, connect_timeout: Duration, echo: Box<dyn EchoProbe>) -> Self {
        Self {
            port,
            connect_timeout,
            echo,
        }
    }
}

#[async_trait]
impl LivenessProbe for HybridProbe {
    async fn probe(&self, ip: IpAddr) -> Liveness {
        let started = Instant::now();

        let outcome = tcp::handshake(SocketAddr::new(ip, self.port), self.connect_timeout).await;
        if outcome.is_answer() {
            return Liveness {
                alive: true,
                latency: started.elapsed(),
            };
        }
        if let Handshake::Failed(e) = &outcome {
            trace!("connect {ip}:{} failed: {e}", self.port);
        }

        let alive = self.echo.echo(ip).await;
        Liveness {
            alive,
            latency: started.elapsed(),
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    struct CountingEcho {
        answer: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EchoProbe for CountingEcho {
        async fn echo(&self, _ip: IpAddr) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    fn echo(answer: bool) -> (Box<dyn EchoProbe>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(CountingEcho {
                answer,
                calls: calls.clone(),
            }),
            calls,
        )
    }

    #[tokio::test]
    async fn open_port_is_live_without_echo() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (echo, calls) = echo(false);

        let probe = HybridProbe::new(port, Duration::from_millis(500), echo);
        let verdict = probe.probe(IpAddr::V4(Ipv4Addr::LOCALHOST)).await;

        assert!(verdict.alive);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refused_port_is_live_without_echo() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let (echo, calls) = echo(false);

        let probe = HybridProbe::new(port, Duration::from_millis(500), echo);
        let verdict = probe.probe(IpAddr::V4(Ipv4Addr::LOCALHOST)).await;

        assert!(verdict.alive);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fallback_uses_echo_verdict() {
        // multicast destination: the connect fails or stalls, it never answers
        let ip = IpAddr::V4(Ipv4Addr::new(224, 0, 0, 1));

        for answer in [true, false] {
            let (echo, calls) = echo(answer);
            let probe = HybridProbe::new(80, Duration::from_millis(200), echo);
            let verdict = probe.probe(ip).await;

            assert_eq!(verdict.alive, answer);
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    #[ignore]
    async fn system_ping_reaches_public_resolver() {
        let ping = SystemPing::new(Duration::from_secs(1));
        assert!(ping.echo(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))).await);
    }
}

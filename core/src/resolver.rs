//! Reverse hostname lookups over plain UDP DNS.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, ensure};
use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::trace;
use vigil_protocols::dns;

const DNS_PORT: u16 = 53;
const RESOLV_CONF: &str = "/etc/resolv.conf";
const FALLBACK_NAMESERVER: IpAddr = IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1));

#[async_trait]
pub trait HostnameResolver: Send + Sync {
    /// `None` when the address has no name or the lookup failed.
    async fn resolve(&self, ip: IpAddr) -> Option<String>;
}

pub struct DnsPtrResolver {
    nameserver: SocketAddr,
    timeout: Duration,
}

impl DnsPtrResolver {
    pub fn new(nameserver: IpAddr, timeout: Duration) -> Self {
        Self {
            nameserver: SocketAddr::new(nameserver, DNS_PORT),
            timeout,
        }
    }

    /// Uses the first `nameserver` line of the system resolver config.
    pub fn from_system(timeout: Duration) -> Self {
        let nameserver = std::fs::read_to_string(RESOLV_CONF)
            .ok()
            .and_then(|conf| first_nameserver(&conf))
            .unwrap_or(FALLBACK_NAMESERVER);
        trace!("reverse lookups go to {nameserver}");
        Self::new(nameserver, timeout)
    }

    async fn query(&self, ip: IpAddr) -> anyhow::Result<String> {
        let bind_addr = if self.nameserver.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr)
            .await
            .context("binding dns socket")?;
        socket
            .connect(self.nameserver)
            .await
            .context("connecting dns socket")?;

        let id: u16 = rand::random();
        let packet = dns::create_ptr_packet(&ip, id)?;
        socket.send(&packet).await.context("sending PTR query")?;

        let mut buf = [0u8; 512];
        let n = socket.recv(&mut buf).await.context("reading PTR answer")?;
        let (response_id, hostname) = dns::parse_ptr_response(&buf[..n])?;
        ensure!(response_id == id, "transaction id mismatch");

        Ok(hostname)
    }
}

#[async_trait]
impl HostnameResolver for DnsPtrResolver {
    async fn resolve(&self, ip: IpAddr) -> Option<String> {
        match timeout(self.timeout, self.query(ip)).await {
            Ok(Ok(hostname)) => Some(hostname),
            Ok(Err(e)) => {
                trace!("no PTR for {ip}: {e:#}");
                None
            }
            Err(_elapsed) => None,
        }
    }
}

fn first_nameserver(conf: &str) -> Option<IpAddr> {
    conf.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let mut fields = line.split_whitespace();
            (fields.next() == Some("nameserver"))
                .then(|| fields.next())
                .flatten()
                .and_then(|addr| addr.split('%').next())
                .and_then(|addr| addr.parse().ok())
        })
}

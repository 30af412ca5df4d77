//! # Port Scanning
//!
//! [`TcpPortProber`] checks one port with a full connect and, when asked, reads a
//! banner after sending the greeting the service expects. [`scan_ports`] fans the
//! prober out over a port set for one host under its own concurrency cap.

use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{trace, warn};
use vigil_common::config::{PortSelection, ScanConfig};
use vigil_common::network::host::OpenPort;
use vigil_protocols::fingerprint;
use vigil_protocols::probe::Probe;
use vigil_protocols::services::{self, COMMON_PORTS};

use crate::network::tcp::{self, Handshake};

#[async_trait]
pub trait PortProber: Send + Sync {
    /// `None` for anything but a completed handshake.
    async fn probe(&self, ip: IpAddr, port: u16, grab_banner: bool) -> Option<OpenPort>;
}

pub struct TcpPortProber {
    connect_timeout: Duration,
    banner_timeout: Duration,
    max_banner_size: usize,
}

impl TcpPortProber {
    pub fn new(connect_timeout: Duration, banner_timeout: Duration, max_banner_size: usize) -> Self {
        Self {
            connect_timeout,
            banner_timeout,
            max_banner_size,
        }
    }

    pub fn from_config(cfg: &ScanConfig) -> Self {
        Self::new(cfg.connect_timeout, cfg.banner_timeout, cfg.max_banner_size)
    }
}

#[async_trait]
impl PortProber for TcpPortProber {
    async fn probe(&self, ip: IpAddr, port: u16, grab_banner: bool) -> Option<OpenPort> {
        let addr = SocketAddr::new(ip, port);
        let mut stream = match tcp::handshake(addr, self.connect_timeout).await {
            Handshake::Connected(stream) => stream,
            other => {
                trace!("{addr} closed: {other:?}");
                return None;
            }
        };

        let open = OpenPort::new(port, services::service_name(port));
        if !grab_banner {
            return Some(open);
        }

        let probe = Probe::for_port(port);
        let banner = tcp::grab_banner(
            &mut stream,
            probe.payload(),
            self.banner_timeout,
            self.max_banner_size,
        )
        .await;

        Some(open.with_banner(banner))
    }
}

/// Expands a port selection into the concrete candidate list.
pub fn candidate_ports(selection: &PortSelection) -> Vec<u16> {
    match selection {
        PortSelection::Common => COMMON_PORTS.to_vec(),
        PortSelection::All => (1..=u16::MAX).collect(),
        PortSelection::Custom(ports) => ports.clone(),
    }
}

/// Probes every port in `ports` on `ip` with at most `concurrency` probes in flight
/// and returns one record per open port, unsorted.
///
/// When `grab_banner` is set each record also gets a version from the fingerprint
/// extractor.
pub async fn scan_ports(
    ip: IpAddr,
    ports: &[u16],
    prober: Arc<dyn PortProber>,
    concurrency: usize,
    grab_banner: bool,
) -> Vec<OpenPort> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let open_ports: Arc<Mutex<Vec<OpenPort>>> = Arc::new(Mutex::new(Vec::new()));
    let mut tasks: JoinSet<()> = JoinSet::new();

    for &port in ports {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let prober = prober.clone();
        let open_ports = open_ports.clone();

        tasks.spawn(async move {
            let _permit = permit;
            let Some(mut open) = prober.probe(ip, port, grab_banner).await else {
                return;
            };
            if grab_banner {
                open.version = fingerprint::extract_version(&open.banner, port);
            }
            open_ports
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(open);
        });

        while let Some(result) = tasks.try_join_next() {
            log_join_error(ip, result);
        }
    }

    while let Some(result) = tasks.join_next().await {
        log_join_error(ip, result);
    }

    let mut guard = open_ports.lock().unwrap_or_else(PoisonError::into_inner);
    std::mem::take(&mut *guard)
}

fn log_join_error(ip: IpAddr, result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        warn!("Port worker for {ip} failed: {e}");
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

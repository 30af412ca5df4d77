//! # Audit Pipeline
//!
//! discovery → enrichment → per-host port scan → OS guess → classification → scoring.
//!
//! Hosts are scanned in parallel with one task each. The only bound on them is the
//! per-host port pool, so a /24 with many live hosts can have many port pools running
//! at once.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::task::JoinSet;
use vigil_common::config::ScanConfig;
use vigil_common::network::host::Host;
use vigil_common::network::range::IpRange;
use vigil_common::summary::NetworkSummary;
use vigil_common::{debug, info, success, warn};

use crate::classifier::{Classifier, HostSnapshot};
use crate::discovery::{DiscoveryService, HostCallback};
use crate::scanner::{self, PortProber, TcpPortProber};
use crate::{os, risk};

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    /// Sorted by descending risk score, then by address.
    pub hosts: Vec<Host>,
    pub summary: NetworkSummary,
}

pub struct AuditService {
    discovery: DiscoveryService,
    prober: Arc<dyn PortProber>,
    classifier: Arc<Classifier>,
    ports: Arc<[u16]>,
    port_concurrency: usize,
    grab_banners: bool,
}

impl AuditService {
    pub fn new(
        discovery: DiscoveryService,
        prober: Arc<dyn PortProber>,
        classifier: Classifier,
        cfg: &ScanConfig,
    ) -> Self {
        Self {
            discovery,
            prober,
            classifier: Arc::new(classifier),
            ports: scanner::candidate_ports(&cfg.ports).into(),
            port_concurrency: cfg.port_concurrency,
            grab_banners: cfg.grab_banners,
        }
    }

    pub fn from_config(cfg: &ScanConfig) -> Self {
        Self::new(
            DiscoveryService::from_config(cfg),
            Arc::new(TcpPortProber::from_config(cfg)),
            Classifier::default(),
            cfg,
        )
    }

    /// Live hosts only, enriched and sorted by address.
    pub async fn discover(&self, range: &IpRange, on_host_found: Option<HostCallback>) -> Vec<Host> {
        let mut hosts = self.discovery.perform_discovery(range, on_host_found).await;
        hosts.sort_by_key(|h| h.ip);
        hosts
    }

    /// Runs the full audit over `range`.
    pub async fn run(&self, range: &IpRange, on_host_found: Option<HostCallback>) -> AuditReport {
        let started = Instant::now();

        let hosts = self.discover(range, on_host_found).await;
        if hosts.is_empty() {
            info!("No live hosts found");
        } else {
            success!("Found {} live host(s)", hosts.len());
            info!("Scanning {} port(s) on each host", self.ports.len());
        }

        let mut hosts = self.assess_hosts(hosts).await;
        hosts.sort_by(|a, b| b.risk_score.cmp(&a.risk_score).then(a.ip.cmp(&b.ip)));

        let summary = risk::summarize(&hosts, started.elapsed());
        AuditReport { hosts, summary }
    }

    async fn assess_hosts(&self, hosts: Vec<Host>) -> Vec<Host> {
        let mut tasks: JoinSet<Host> = JoinSet::new();

        for host in hosts {
            let prober = self.prober.clone();
            let classifier = self.classifier.clone();
            let ports = self.ports.clone();
            let concurrency = self.port_concurrency;
            let grab_banners = self.grab_banners;

            tasks.spawn(async move {
                assess_host(host, &ports, prober, &classifier, concurrency, grab_banners).await
            });
        }

        let mut assessed = Vec::with_capacity(tasks.len());
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(host) => assessed.push(host),
                Err(e) => warn!("Host assessment failed: {e}"),
            }
        }
        assessed
    }
}

async fn assess_host(
    mut host: Host,
    ports: &[u16],
    prober: Arc<dyn PortProber>,
    classifier: &Classifier,
    concurrency: usize,
    grab_banners: bool,
) -> Host {
    let mut open_ports = scanner::scan_ports(host.ip, ports, prober, concurrency, grab_banners).await;
    open_ports.sort_by_key(|p| p.port);

    host.os_guess = os::guess_os(&open_ports);
    host.open_ports = open_ports;

    let snapshot = HostSnapshot::new(host.ip, &host.open_ports, &host.os_guess);
    let findings = classifier.classify(&snapshot);
    host.risk_score = risk::host_score(&findings);
    host.findings = findings;

    debug!(
        "{}: {} open port(s), {} finding(s), score {}",
        host.ip,
        host.open_ports.len(),
        host.findings.len(),
        host.risk_score
    );
    host
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

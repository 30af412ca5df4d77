use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use vigil_common::config::{PortSelection, ScanConfig};
use vigil_common::network::range::IpRange;
use vigil_common::security::{FindingKind, Severity};
use vigil_core::audit::AuditService;
use vigil_core::classifier::Classifier;
use vigil_core::discovery::DiscoveryService;
use vigil_core::liveness::HybridProbe;
use vigil_core::scanner::TcpPortProber;

use crate::support::{self, NoNeighbors, NoVendors, SilentEcho};

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

#[tokio::test]
async fn loopback_audit_end_to_end() {
    let ssh = support::banner_server(b"SSH-2.0-OpenSSH_7.2p2 Ubuntu-4ubuntu2.10\r\n").await;
    let quiet = support::banner_server(b"").await;
    let closed = support::closed_port().await;

    let cfg = ScanConfig {
        ports: PortSelection::Custom(vec![ssh, quiet, closed]),
        banner_timeout: Duration::from_millis(500),
        no_dns: true,
        ..ScanConfig::default()
    };
    let discovery = DiscoveryService::new(
        Arc::new(HybridProbe::new(ssh, cfg.liveness_timeout, Box::new(SilentEcho))),
        cfg.discovery_concurrency,
        Arc::new(NoNeighbors),
        Box::new(NoVendors),
    );
    let audit = AuditService::new(
        discovery,
        Arc::new(TcpPortProber::from_config(&cfg)),
        Classifier::default(),
        &cfg,
    );

    let report = audit.run(&IpRange::single(LOCALHOST), None).await;

    assert_eq!(report.hosts.len(), 1);
    let host = &report.hosts[0];
    assert_eq!(host.open_ports.len(), 2);
    assert!(host.open_ports.windows(2).all(|w| w[0].port < w[1].port));
    assert_eq!(host.os_guess, "Linux (Ubuntu)");

    let outdated = host
        .findings
        .iter()
        .find(|f| f.kind == FindingKind::OutdatedSoftware)
        .expect("OpenSSH 7.2 should be flagged");
    assert_eq!(outdated.severity, Severity::High);
    assert_eq!(outdated.port, Some(ssh));
    assert!(host.findings.iter().any(|f| f.kind == FindingKind::InformationDisclosure));

    // one High and one Low
    assert_eq!(host.risk_score, 17);
    assert_eq!(report.summary.total_hosts, 1);
    assert_eq!(report.summary.total_open_ports, 2);
    assert_eq!(report.summary.network_risk_score, 6);
    assert_eq!(report.summary.most_vulnerable, Some(LOCALHOST));
}

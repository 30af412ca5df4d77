use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use vigil_common::network::range::IpRange;
use vigil_core::discovery::{self, DiscoveryService};
use vigil_core::liveness::{HybridProbe, LivenessProbe};

use crate::support::{self, DeadProbe, NoNeighbors, NoVendors, SilentEcho};

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn hybrid(port: u16) -> HybridProbe {
    HybridProbe::new(port, Duration::from_millis(500), Box::new(SilentEcho))
}

#[tokio::test]
async fn listening_port_means_live_without_echo() {
    let port = support::banner_server(b"").await;
    let verdict = hybrid(port).probe(LOCALHOST).await;
    assert!(verdict.alive);
    assert!(verdict.latency < Duration::from_millis(500));
}

#[tokio::test]
async fn refused_port_still_means_live() {
    let port = support::closed_port().await;
    let verdict = hybrid(port).probe(LOCALHOST).await;
    assert!(verdict.alive, "a reset proves the stack is up");
}

#[tokio::test]
async fn documentation_range_with_dead_probes_is_empty() {
    let range: IpRange = "192.0.2.0/30".parse().unwrap();
    let hosts = discovery::discover(&range, Arc::new(DeadProbe), 100, None).await;
    assert!(hosts.is_empty());
}

#[tokio::test]
async fn discovery_single_loopback() {
    let port = support::banner_server(b"").await;
    let service = DiscoveryService::new(
        Arc::new(hybrid(port)),
        10,
        Arc::new(NoNeighbors),
        Box::new(NoVendors),
    );

    let hosts = service
        .perform_discovery(&IpRange::single(LOCALHOST), None)
        .await;

    assert_eq!(hosts.len(), 1, "No hosts found when scanning localhost");
    assert_eq!(hosts[0].ip, LOCALHOST);
    assert_eq!(hosts[0].hostname, None);
    assert_eq!(hosts[0].mac, None);
}

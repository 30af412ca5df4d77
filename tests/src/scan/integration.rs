use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::TcpListener;
use vigil_core::scanner::{self, TcpPortProber};

use crate::support;

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn prober(banner_timeout: Duration) -> Arc<TcpPortProber> {
    Arc::new(TcpPortProber::new(Duration::from_secs(2), banner_timeout, 4096))
}

#[tokio::test]
async fn ssh_banner_is_fingerprinted() {
    let port = support::banner_server(b"SSH-2.0-OpenSSH_8.9\r\n").await;

    let open = scanner::scan_ports(LOCALHOST, &[port], prober(Duration::from_secs(3)), 50, true).await;

    assert_eq!(open.len(), 1);
    assert_eq!(open[0].banner, "SSH-2.0-OpenSSH_8.9");
    assert_eq!(open[0].version, "openssh_8.9");
}

#[tokio::test]
async fn broken_ssh_banner_gets_generic_marker() {
    let port = support::banner_server(b"SSH-broken\r\n").await;
    let open = scanner::scan_ports(LOCALHOST, &[port], prober(Duration::from_secs(3)), 50, true).await;
    assert_eq!(open[0].version, "SSH detected");
}

#[tokio::test]
async fn only_open_ports_are_reported() {
    let open_a = support::banner_server(b"").await;
    let open_b = support::banner_server(b"").await;
    let closed = support::closed_port().await;

    let mut open = scanner::scan_ports(
        LOCALHOST,
        &[open_a, closed, open_b],
        prober(Duration::from_millis(200)),
        2,
        false,
    )
    .await;
    open.sort_by_key(|p| p.port);

    let mut expected = vec![open_a, open_b];
    expected.sort();
    assert_eq!(open.iter().map(|p| p.port).collect::<Vec<_>>(), expected);
}

#[tokio::test]
async fn silent_service_gives_empty_banner_within_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        // accept and hold the connection without writing
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let started = Instant::now();
    let open = scanner::scan_ports(LOCALHOST, &[port], prober(Duration::from_millis(300)), 50, true).await;

    assert_eq!(open.len(), 1);
    assert_eq!(open[0].banner, "");
    assert_eq!(open[0].version, "");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn mysql_port_reports_marker_version() {
    // needs the real port number; skip when something already holds it
    let Ok(listener) = TcpListener::bind("127.0.0.1:3306").await else {
        return;
    };
    support::serve(listener, b"J\0\0\0\n8.0.36\0");

    let open = scanner::scan_ports(LOCALHOST, &[3306], prober(Duration::from_secs(1)), 50, true).await;

    assert_eq!(open.len(), 1);
    assert_eq!(open[0].service, "MySQL");
    assert_eq!(open[0].version, "MySQL detected");
}

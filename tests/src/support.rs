//! Stand-ins for the system collaborators and small loopback servers.

use std::net::IpAddr;

use async_trait::async_trait;
use pnet::util::MacAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use vigil_core::liveness::{EchoProbe, Liveness, LivenessProbe};
use vigil_core::neighbors::NeighborTable;
use vigil_core::vendors::VendorRepository;

pub struct SilentEcho;

#[async_trait]
impl EchoProbe for SilentEcho {
    async fn echo(&self, _ip: IpAddr) -> bool {
        false
    }
}

pub struct DeadProbe;

#[async_trait]
impl LivenessProbe for DeadProbe {
    async fn probe(&self, _ip: IpAddr) -> Liveness {
        Liveness {
            alive: false,
            latency: Default::default(),
        }
    }
}

pub struct NoNeighbors;

#[async_trait]
impl NeighborTable for NoNeighbors {
    async fn lookup(&self, _ip: IpAddr) -> Option<MacAddr> {
        None
    }
}

pub struct NoVendors;

impl VendorRepository for NoVendors {
    fn get_vendor(&self, _mac: MacAddr) -> Option<String> {
        None
    }
}

/// Serves `banner` to every connection on an ephemeral loopback port.
pub async fn banner_server(banner: &'static [u8]) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    serve(listener, banner)
}

pub fn serve(listener: TcpListener, banner: &'static [u8]) -> u16 {
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = socket.write_all(banner).await;
            });
        }
    });
    port
}

/// A loopback port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

use std::net::IpAddr;
use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use pnet::util::MacAddr;
use tokio::process::Command;
use tokio::time::timeout;

const PROC_ARP: &str = "/proc/net/arp";

/// Source of IP to hardware address mappings, usually the kernel neighbor table.
#[async_trait]
pub trait NeighborTable: Send + Sync {
    async fn lookup(&self, ip: IpAddr) -> Option<MacAddr>;
}

/// Reads the ARP cache that discovery traffic has just populated.
pub struct ArpCache {
    timeout: Duration,
}

impl ArpCache {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn from_arp_command(&self, ip: IpAddr) -> Option<MacAddr> {
        let output = Command::new("arp")
            .args(["-n", &ip.to_string()])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();
        let output = timeout(self.timeout, output).await.ok()?.ok()?;
        parse_arp_output(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for ArpCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl NeighborTable for ArpCache {
    async fn lookup(&self, ip: IpAddr) -> Option<MacAddr> {
        if ip.is_ipv6() {
            return None;
        }
        if let Ok(table) = tokio::fs::read_to_string(PROC_ARP).await {
            return parse_proc_arp(&table, ip);
        }
        self.from_arp_command(ip).await
    }
}

/// Parses `/proc/net/arp`: IP, HW type, flags, HW address, mask, device.
fn parse_proc_arp(table: &str, ip: IpAddr) -> Option<MacAddr> {
    let wanted = ip.to_string();
    table.lines().skip(1).find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [addr, _hw_type, _flags, mac, ..] if *addr == wanted => usable_mac(mac),
            _ => None,
        }
    })
}

/// Finds the first MAC-looking token in `arp -n` output. BSD prints single-digit
/// octets (`0:1a:2b:...`), which `MacAddr` parses fine.
fn parse_arp_output(output: &str) -> Option<MacAddr> {
    output
        .split_whitespace()
        .find_map(|token| usable_mac(token.trim_matches(|c| c == '(' || c == ')')))
}

fn usable_mac(token: &str) -> Option<MacAddr> {
    let token = token.replace('-', ":");
    if token.split(':').count() != 6 {
        return None;
    }
    let mac = MacAddr::from_str(&token).ok()?;
    (mac != MacAddr::zero()).then_some(mac)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

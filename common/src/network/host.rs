use std::borrow::Cow;
use std::net::IpAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use pnet::util::MacAddr;
use serde::{Serialize, Serializer};

use crate::security::{Finding, RiskLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AddressFamily {
    #[serde(rename = "IPv4")]
    V4,
    #[serde(rename = "IPv6")]
    V6,
}

impl AddressFamily {
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::V4 => "IPv4",
            AddressFamily::V6 => "IPv6",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Tcp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Open,
}

/// An open TCP port. Closed and filtered ports never get a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenPort {
    pub port: u16,
    pub protocol: Transport,
    pub service: String,
    pub banner: String,
    pub version: String,
    pub state: PortState,
}

impl OpenPort {
    pub fn new(port: u16, service: impl Into<String>) -> Self {
        Self {
            port,
            protocol: Transport::Tcp,
            service: service.into(),
            banner: String::new(),
            version: String::new(),
            state: PortState::Open,
        }
    }

    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// First `limit` characters of the banner with line breaks flattened, for display.
    pub fn banner_preview(&self, limit: usize) -> Cow<'_, str> {
        let needs_flatten = self.banner.contains(['\r', '\n']);
        let too_long = self.banner.chars().count() > limit;
        if !needs_flatten && !too_long {
            return Cow::Borrowed(&self.banner);
        }

        let mut preview: String = self
            .banner
            .chars()
            .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
            .take(limit)
            .collect();
        if too_long {
            preview.push_str("...");
        }
        Cow::Owned(preview)
    }
}

/// One live address and everything learned about it during a run.
#[derive(Debug, Clone, Serialize)]
pub struct Host {
    pub ip: IpAddr,
    pub family: AddressFamily,
    #[serde(rename = "latency_ms", serialize_with = "serialize_millis")]
    pub latency: Duration,
    pub hostname: Option<String>,
    #[serde(serialize_with = "serialize_mac")]
    pub mac: Option<MacAddr>,
    pub vendor: Option<String>,
    pub os_guess: String,
    pub open_ports: Vec<OpenPort>,
    pub findings: Vec<Finding>,
    pub risk_score: u8,
    /// Seconds since the UNIX epoch.
    pub last_seen: u64,
}

impl Host {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            family: AddressFamily::of(&ip),
            latency: Duration::ZERO,
            hostname: None,
            mac: None,
            vendor: None,
            os_guess: "Unknown".to_string(),
            open_ports: Vec::new(),
            findings: Vec::new(),
            risk_score: 0,
            last_seen: unix_now(),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_mac(mut self, mac: MacAddr) -> Self {
        self.mac = Some(mac);
        self
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn serialize_millis<S: Serializer>(latency: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(latency.as_secs_f64() * 1000.0)
}

fn serialize_mac<S: Serializer>(mac: &Option<MacAddr>, serializer: S) -> Result<S::Ok, S::Error> {
    match mac {
        Some(mac) => serializer.serialize_some(&mac.to_string()),
        None => serializer.serialize_none(),
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

use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_DISCOVERY_CONCURRENCY: usize = 100;
pub const DEFAULT_PORT_CONCURRENCY: usize = 50;
pub const DEFAULT_LIVENESS_PORT: u16 = 80;
pub const DEFAULT_MAX_BANNER_SIZE: usize = 4096;

/// Which ports the port scanner should try on every live host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PortSelection {
    /// The curated list of well-known service ports.
    #[default]
    Common,
    /// Every port from 1 to 65535.
    All,
    /// An explicit, caller-supplied list.
    Custom(Vec<u16>),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortSpecError {
    #[error("invalid port '{0}'")]
    InvalidPort(String),
    #[error("port 0 cannot be scanned")]
    ZeroPort,
    #[error("invalid port range '{0}'")]
    InvalidRange(String),
    #[error("port list is empty")]
    Empty,
}

impl FromStr for PortSelection {
    type Err = PortSpecError;

    /// Parses `common`, `all` or a list such as `22,80,8000-8010`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "common" => return Ok(PortSelection::Common),
            "all" => return Ok(PortSelection::All),
            _ => {}
        }

        let mut ports: BTreeSet<u16> = BTreeSet::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((start_str, end_str)) => {
                    let start = parse_port(start_str)?;
                    let end = parse_port(end_str)?;
                    if start > end {
                        return Err(PortSpecError::InvalidRange(part.to_string()));
                    }
                    ports.extend(start..=end);
                }
                None => {
                    ports.insert(parse_port(part)?);
                }
            }
        }

        if ports.is_empty() {
            return Err(PortSpecError::Empty);
        }
        Ok(PortSelection::Custom(ports.into_iter().collect()))
    }
}

fn parse_port(s: &str) -> Result<u16, PortSpecError> {
    let port = s
        .trim()
        .parse::<u16>()
        .map_err(|_| PortSpecError::InvalidPort(s.trim().to_string()))?;
    if port == 0 {
        return Err(PortSpecError::ZeroPort);
    }
    Ok(port)
}

/// Everything the scanning engine needs from the outside world.
///
/// The engine never reads the environment or the command line itself; the CLI builds
/// one of these and passes it down.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Simultaneous liveness probes across the whole range.
    pub discovery_concurrency: usize,
    /// Simultaneous port probes for a single host.
    pub port_concurrency: usize,
    /// TCP port used by the fast liveness check.
    pub liveness_port: u16,
    pub liveness_timeout: Duration,
    pub echo_timeout: Duration,
    pub connect_timeout: Duration,
    pub banner_timeout: Duration,
    pub max_banner_size: usize,
    pub grab_banners: bool,
    pub ports: PortSelection,
    /// Disables reverse hostname lookups.
    ///
    /// MAC and vendor enrichment still run.
    pub no_dns: bool,
    pub verbose: bool,
    pub quiet: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            discovery_concurrency: DEFAULT_DISCOVERY_CONCURRENCY,
            port_concurrency: DEFAULT_PORT_CONCURRENCY,
            liveness_port: DEFAULT_LIVENESS_PORT,
            liveness_timeout: Duration::from_millis(500),
            echo_timeout: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(2),
            banner_timeout: Duration::from_secs(3),
            max_banner_size: DEFAULT_MAX_BANNER_SIZE,
            grab_banners: true,
            ports: PortSelection::Common,
            no_dns: false,
            verbose: false,
            quiet: 0,
        }
    }
}

impl ScanConfig {
    /// `-qq` and above: results are printed as bare addresses, one per line.
    pub fn ip_only(&self) -> bool {
        self.quiet >= 2
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

//! # Scan Target Model
//!
//! A target is either an explicit address range or the `lan` keyword, which is resolved
//! against the local interfaces at scan time.

use std::fmt;
use std::str::FromStr;

use crate::network::interface;
use crate::network::range::{IpRange, RangeError};
use crate::{info, success};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Target {
    /// The private IPv4 network of the best local interface.
    #[default]
    Lan,
    /// A CIDR block, single address or dash range.
    Range(IpRange),
}

impl FromStr for Target {
    type Err = RangeError;

    /// Parses `lan` (case-insensitive) or anything [`IpRange`] accepts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("lan") {
            return Ok(Target::Lan);
        }
        s.parse::<IpRange>().map(Target::Range)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Lan => write!(f, "local network"),
            Target::Range(range) => write!(f, "{range}"),
        }
    }
}

impl Target {
    /// Turns the target into the concrete range that will be swept.
    pub fn resolve(&self) -> anyhow::Result<IpRange> {
        let range = match self {
            Target::Lan => {
                let range = interface::detect_lan_range()?;
                info!("Detected local network {range}");
                range
            }
            Target::Range(range) => *range,
        };

        let len = range.len();
        let unit = if len == 1 { "address" } else { "addresses" };
        success!("{len} {unit} queued for discovery");

        Ok(range)
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

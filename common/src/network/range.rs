//! # Address Ranges
//!
//! An [`IpRange`] is an inclusive `[start, end]` span of addresses of one family.
//! Ranges are built from CIDR blocks, single addresses or IPv4 dash ranges, and are
//! walked lazily in ascending numeric order by [`AddressIter`].

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid address '{0}'")]
    InvalidAddress(String),
    #[error("invalid prefix '/{prefix}' (must be 0-{max})")]
    InvalidPrefix { prefix: String, max: u8 },
    #[error("range mixes IPv4 and IPv6 addresses")]
    MixedFamilies,
    #[error("range start {start} is greater than its end {end}")]
    Inverted { start: IpAddr, end: IpAddr },
    #[error("malformed range '{0}'")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpRange {
    start_addr: IpAddr,
    end_addr: IpAddr,
}

impl IpRange {
    /// Both ends must share an address family. A start above the end is accepted
    /// and simply iterates nothing.
    pub fn new(start_addr: IpAddr, end_addr: IpAddr) -> Result<Self, RangeError> {
        if start_addr.is_ipv4() != end_addr.is_ipv4() {
            return Err(RangeError::MixedFamilies);
        }
        Ok(Self {
            start_addr,
            end_addr,
        })
    }

    pub fn single(addr: IpAddr) -> Self {
        Self {
            start_addr: addr,
            end_addr: addr,
        }
    }

    pub fn start(&self) -> IpAddr {
        self.start_addr
    }

    pub fn end(&self) -> IpAddr {
        self.end_addr
    }

    pub fn is_ipv6(&self) -> bool {
        self.start_addr.is_ipv6()
    }

    /// Number of addresses in the range, saturating at `u128::MAX` for `::/0`.
    pub fn len(&self) -> u128 {
        let start = to_u128(self.start_addr);
        let end = to_u128(self.end_addr);
        if start > end {
            0
        } else {
            (end - start).saturating_add(1)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        addr.is_ipv6() == self.is_ipv6() && {
            let value = to_u128(addr);
            value >= to_u128(self.start_addr) && value <= to_u128(self.end_addr)
        }
    }

    pub fn iter(&self) -> AddressIter {
        let start = to_u128(self.start_addr);
        let end = to_u128(self.end_addr);
        AddressIter {
            next: (start <= end).then_some(start),
            end,
            v6: self.is_ipv6(),
        }
    }
}

impl IntoIterator for &IpRange {
    type Item = IpAddr;
    type IntoIter = AddressIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for IpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_addr == self.end_addr {
            write!(f, "{}", self.start_addr)
        } else {
            write!(f, "{} - {}", self.start_addr, self.end_addr)
        }
    }
}

/// Lazy walk over an [`IpRange`].
///
/// Works on the whole address as one integer so increments carry across octets and
/// hextets. The cursor becomes `None` after yielding `end`, which keeps the top of the
/// address space from overflowing.
#[derive(Debug, Clone)]
pub struct AddressIter {
    next: Option<u128>,
    end: u128,
    v6: bool,
}

impl Iterator for AddressIter {
    type Item = IpAddr;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current < self.end {
            Some(current + 1)
        } else {
            None
        };
        Some(from_u128(current, self.v6))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(current) => {
                let remaining = (self.end - current).saturating_add(1);
                match usize::try_from(remaining) {
                    Ok(n) => (n, Some(n)),
                    Err(_) => (usize::MAX, None),
                }
            }
            None => (0, Some(0)),
        }
    }
}

fn to_u128(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u32::from(v4) as u128,
        IpAddr::V6(v6) => u128::from(v6),
    }
}

fn from_u128(value: u128, v6: bool) -> IpAddr {
    if v6 {
        IpAddr::V6(Ipv6Addr::from(value))
    } else {
        IpAddr::V4(Ipv4Addr::from(value as u32))
    }
}

/// Masks `ip` down to its network address and spans to the last address of the block.
/// Network and broadcast addresses are both part of the range.
pub fn cidr_range(ip: IpAddr, prefix: u8) -> Result<IpRange, RangeError> {
    let bits: u8 = if ip.is_ipv4() { 32 } else { 128 };
    if prefix > bits {
        return Err(RangeError::InvalidPrefix {
            prefix: prefix.to_string(),
            max: bits,
        });
    }

    let full: u128 = if bits == 32 { u32::MAX as u128 } else { u128::MAX };
    let host_mask: u128 = if prefix == bits { 0 } else { full >> prefix };

    let value = to_u128(ip);
    let network = value & !host_mask & full;
    let last = network | host_mask;
    let v6 = ip.is_ipv6();

    Ok(IpRange {
        start_addr: from_u128(network, v6),
        end_addr: from_u128(last, v6),
    })
}

impl FromStr for IpRange {
    type Err = RangeError;

    /// Parses a range string.
    ///
    /// Supported formats:
    /// * **CIDR**: "192.168.1.0/24", "2001:db8::/126".
    /// * **Host**: a single IPv4/IPv6 address.
    /// * **Range**: "192.168.1.1-50", "192.168.1.1-2.10", "192.168.1.1-192.168.1.50".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RangeError::Malformed(s.to_string()));
        }

        if let Some((ip_str, prefix_str)) = s.split_once('/') {
            return parse_cidr(ip_str, prefix_str);
        }

        if let Ok(addr) = s.parse::<IpAddr>() {
            return Ok(IpRange::single(addr));
        }

        if let Some((start_str, end_str)) = s.split_once('-') {
            return parse_dash_range(start_str.trim(), end_str.trim(), s);
        }

        Err(RangeError::InvalidAddress(s.to_string()))
    }
}

fn parse_cidr(ip_str: &str, prefix_str: &str) -> Result<IpRange, RangeError> {
    let ip = ip_str
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| RangeError::InvalidAddress(ip_str.trim().to_string()))?;
    let max = if ip.is_ipv4() { 32 } else { 128 };
    let prefix = prefix_str
        .trim()
        .parse::<u8>()
        .map_err(|_| RangeError::InvalidPrefix {
            prefix: prefix_str.trim().to_string(),
            max,
        })?;
    cidr_range(ip, prefix)
}

fn parse_dash_range(start_str: &str, end_str: &str, input: &str) -> Result<IpRange, RangeError> {
    let start = start_str
        .parse::<IpAddr>()
        .map_err(|_| RangeError::InvalidAddress(start_str.to_string()))?;

    match start {
        IpAddr::V6(_) => {
            // no octet shorthand for IPv6, the end must be a full address
            let end = end_str
                .parse::<IpAddr>()
                .map_err(|_| RangeError::Malformed(input.to_string()))?;
            finish_range(start, end)
        }
        IpAddr::V4(start_v4) => {
            if end_str.parse::<Ipv6Addr>().is_ok() {
                return Err(RangeError::MixedFamilies);
            }
            let end = parse_range_end_addr(end_str, &start_v4, input)?;
            finish_range(start, IpAddr::V4(end))
        }
    }
}

fn finish_range(start: IpAddr, end: IpAddr) -> Result<IpRange, RangeError> {
    if start.is_ipv4() != end.is_ipv4() {
        return Err(RangeError::MixedFamilies);
    }
    if to_u128(start) > to_u128(end) {
        return Err(RangeError::Inverted { start, end });
    }
    IpRange::new(start, end)
}

/// Parses the end address of a dash range.
///
/// Handles abbreviated forms like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255".
fn parse_range_end_addr(
    end_str: &str,
    start_addr: &Ipv4Addr,
    input: &str,
) -> Result<Ipv4Addr, RangeError> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    if end_str.is_empty() {
        return Err(RangeError::Malformed(input.to_string()));
    }

    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(|octet_str| octet_str.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| RangeError::InvalidAddress(end_str.to_string()))?;

    if partial_octets.len() > 4 {
        return Err(RangeError::InvalidAddress(end_str.to_string()));
    }

    let mut end_octets = start_addr.octets();
    let start_index = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::security::{FindingKind, RiskLevel};

/// Network-wide roll-up of one audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkSummary {
    pub total_hosts: usize,
    pub total_open_ports: usize,
    pub total_findings: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Keyed by kind, serialized with the same names as a finding's `kind`.
    pub findings_by_kind: BTreeMap<FindingKind, usize>,
    /// Host with the most findings; the first one seen wins a tie.
    pub most_vulnerable: Option<IpAddr>,
    pub network_risk_score: u8,
    #[serde(rename = "scan_duration_secs", serialize_with = "serialize_secs")]
    pub scan_duration: Duration,
}

impl NetworkSummary {
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.network_risk_score)
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

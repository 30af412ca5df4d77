//! # Risk scoring
//!
//! Turns classifier findings into `0..=100` scores: a flat amount when anything is
//! critical, plus a per-finding weight for the rest. The network score uses lighter
//! weights since it sums over every host.
//! [`summarize`] builds the [`NetworkSummary`] written at the end of an audit.

use std::collections::BTreeMap;
use std::time::Duration;

use vigil_common::network::host::Host;
use vigil_common::security::{Finding, FindingKind, Severity};
use vigil_common::summary::NetworkSummary;

const MAX_SCORE: u32 = 100;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct SeverityCounts {
    critical: u32,
    high: u32,
    medium: u32,
    low: u32,
}

impl SeverityCounts {
    fn tally<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            let slot = match finding.severity {
                Severity::Critical => &mut counts.critical,
                Severity::High => &mut counts.high,
                Severity::Medium => &mut counts.medium,
                Severity::Low => &mut counts.low,
            };
            *slot = slot.saturating_add(1);
        }
        counts
    }

    /// `min(100, critical_flat * [any critical] + h*H + m*M + l*L)`
    fn weighted(&self, critical_flat: u32, h: u32, m: u32, l: u32) -> u8 {
        let flat = if self.critical > 0 { critical_flat } else { 0 };
        let score = flat
            .saturating_add(self.high.saturating_mul(h))
            .saturating_add(self.medium.saturating_mul(m))
            .saturating_add(self.low.saturating_mul(l));
        score.min(MAX_SCORE) as u8
    }
}

/// Score of a single host in `0..=100`.
pub fn host_score(findings: &[Finding]) -> u8 {
    SeverityCounts::tally(findings).weighted(50, 15, 7, 2)
}

/// Score of the whole network in `0..=100`, over the findings of every host.
///
/// Weighted lower than [`host_score`] since it aggregates many hosts.
pub fn network_score<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> u8 {
    SeverityCounts::tally(findings).weighted(40, 5, 2, 1)
}

/// Rolls scored hosts up into a [`NetworkSummary`].
pub fn summarize(hosts: &[Host], scan_duration: Duration) -> NetworkSummary {
    let all_findings = || hosts.iter().flat_map(|h| h.findings.iter());
    let counts = SeverityCounts::tally(all_findings());

    let mut findings_by_kind: BTreeMap<FindingKind, usize> = BTreeMap::new();
    for finding in all_findings() {
        *findings_by_kind.entry(finding.kind).or_default() += 1;
    }

    let mut most_vulnerable = None;
    let mut most_findings = 0;
    for host in hosts {
        if host.findings.len() > most_findings {
            most_findings = host.findings.len();
            most_vulnerable = Some(host.ip);
        }
    }

    NetworkSummary {
        total_hosts: hosts.len(),
        total_open_ports: hosts.iter().map(|h| h.open_ports.len()).sum(),
        total_findings: all_findings().count(),
        critical: counts.critical as usize,
        high: counts.high as usize,
        medium: counts.medium as usize,
        low: counts.low as usize,
        findings_by_kind,
        most_vulnerable,
        network_risk_score: network_score(all_findings()),
        scan_duration,
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

//! Findings produced by the heuristic classifier and the bands used to read scores.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FindingKind {
    CleartextProtocol,
    WeakProtocol,
    OutdatedSoftware,
    ExposedDatabase,
    RemoteAccess,
    FileSharing,
    LateralMovement,
    Misconfiguration,
    InformationDisclosure,
    AttackSurface,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::CleartextProtocol => "Cleartext Protocol",
            FindingKind::WeakProtocol => "Weak Protocol",
            FindingKind::OutdatedSoftware => "Outdated Software",
            FindingKind::ExposedDatabase => "Exposed Database",
            FindingKind::RemoteAccess => "Remote Access",
            FindingKind::FileSharing => "File Sharing",
            FindingKind::LateralMovement => "Lateral Movement",
            FindingKind::Misconfiguration => "Misconfiguration",
            FindingKind::InformationDisclosure => "Information Disclosure",
            FindingKind::AttackSurface => "Attack Surface",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single weakness attributed to one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub description: String,
    pub port: Option<u16>,
    pub cves: Vec<String>,
    pub remediation: String,
    pub impact: Option<String>,
}

impl Finding {
    pub fn new(severity: Severity, kind: FindingKind, description: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            description: description.into(),
            port: None,
            cves: Vec::new(),
            remediation: String::new(),
            impact: None,
        }
    }

    pub fn on_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_cves(mut self, cves: &[&str]) -> Self {
        self.cves = cves.iter().map(|cve| cve.to_string()).collect();
        self
    }

    pub fn remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = remediation.into();
        self
    }

    pub fn impact(mut self, impact: impl Into<String>) -> Self {
        self.impact = Some(impact.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => RiskLevel::Critical,
            60..=79 => RiskLevel::High,
            40..=59 => RiskLevel::Medium,
            20..=39 => RiskLevel::Low,
            _ => RiskLevel::Minimal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Minimal => "MINIMAL",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_critical_highest() {
        let mut severities = vec![Severity::High, Severity::Low, Severity::Critical, Severity::Medium];
        severities.sort();
        assert_eq!(
            severities,
            vec![Severity::Low, Severity::Medium, Severity::High, Severity::Critical]
        );
    }

    #[test]
    fn risk_level_bands() {
        assert_eq!(RiskLevel::from_score(100), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(80), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(79), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(20), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(19), RiskLevel::Minimal);
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Minimal);
    }

    #[test]
    fn finding_builder_and_serialization() {
        let finding = Finding::new(Severity::High, FindingKind::FileSharing, "SMB exposed")
            .on_port(445)
            .with_cves(&["CVE-2017-0144"])
            .remediation("Block 445 at the perimeter");
        assert_eq!(finding.port, Some(445));
        assert_eq!(finding.impact, None);

        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["severity"], "HIGH");
        assert_eq!(json["kind"], "FileSharing");
        assert_eq!(json["cves"][0], "CVE-2017-0144");
    }
}

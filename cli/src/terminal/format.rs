use std::net::{IpAddr, Ipv6Addr};

use colored::*;
use vigil_common::network::host::Host;
use vigil_common::security::{Finding, RiskLevel, Severity};

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

const BANNER_PREVIEW: usize = 70;

pub fn ipv6_to_type_str(ipv6_addr: &Ipv6Addr) -> &'static str {
    let first_byte = ipv6_addr.octets()[0];
    if (0x20..=0x3F).contains(&first_byte) {
        return "GUA";
    }
    if ipv6_addr.is_unique_local() {
        return "ULA";
    }
    if ipv6_addr.is_unicast_link_local() {
        return "LLA";
    }
    "IPv6"
}

pub fn ip_to_detail(ip: &IpAddr) -> Detail {
    match ip {
        IpAddr::V4(v4) => ("IPv4".to_string(), v4.to_string().color(colors::IPV4_ADDR)),
        IpAddr::V6(v6) => (
            ipv6_to_type_str(v6).to_string(),
            v6.to_string().color(colors::IPV6_ADDR),
        ),
    }
}

pub fn severity(severity: Severity) -> ColoredString {
    let color = match severity {
        Severity::Critical => colors::CRITICAL,
        Severity::High => colors::HIGH,
        Severity::Medium => colors::MEDIUM,
        Severity::Low => colors::LOW,
    };
    format!("[{severity}]").color(color).bold()
}

pub fn risk(score: u8) -> ColoredString {
    let level = RiskLevel::from_score(score);
    let color = match level {
        RiskLevel::Critical => colors::CRITICAL,
        RiskLevel::High => colors::HIGH,
        RiskLevel::Medium => colors::MEDIUM,
        RiskLevel::Low => colors::LOW,
        RiskLevel::Minimal => colors::MINIMAL,
    };
    format!("{score}/100 ({level})").color(color).bold()
}

/// Identity rows: address, MAC, hostname, vendor, OS and latency.
pub fn host_details(host: &Host) -> Vec<Detail> {
    let mut details = vec![ip_to_detail(&host.ip)];
    details.push(("Family".to_string(), host.family.as_str().normal()));

    if let Some(mac) = host.mac {
        details.push(("MAC".to_string(), mac.to_string().color(colors::MAC_ADDR)));
    }
    if let Some(hostname) = &host.hostname {
        details.push(("Hostname".to_string(), hostname.as_str().color(colors::TEXT_DEFAULT)));
    }
    if let Some(vendor) = &host.vendor {
        details.push(("Vendor".to_string(), vendor.as_str().color(colors::TEXT_DEFAULT)));
    }
    if host.os_guess != "Unknown" {
        details.push(("OS".to_string(), host.os_guess.as_str().color(colors::ACCENT)));
    }
    details.push((
        "Latency".to_string(),
        format!("{:.1} ms", host.latency.as_secs_f64() * 1000.0).dimmed(),
    ));
    details
}

pub fn port_details(host: &Host, show_banners: bool) -> Vec<Detail> {
    let mut details = Vec::new();
    for port in &host.open_ports {
        let mut line = format!(
            "{}/tcp {}",
            port.port.to_string().color(colors::ACCENT).bold(),
            port.service
        );
        if !port.version.is_empty() {
            line.push_str(&format!(" {}", port.version.dimmed()));
        }
        details.push(("Port".to_string(), line.normal()));

        if show_banners && !port.banner.is_empty() {
            let preview = port.banner_preview(BANNER_PREVIEW);
            details.push((String::new(), format!("\"{preview}\"").dimmed()));
        }
    }
    details
}

pub fn finding_details(findings: &[Finding], verbose: bool) -> Vec<Detail> {
    let mut details = Vec::new();
    for finding in findings {
        let mut line = format!("{} {}", severity(finding.severity), finding.description);
        if let Some(port) = finding.port {
            line.push_str(&format!(" {}", format!("(port {port})").dimmed()));
        }
        details.push(("Finding".to_string(), line.normal()));

        if !finding.cves.is_empty() {
            details.push((String::new(), finding.cves.join(", ").color(colors::CRITICAL)));
        }
        if verbose && !finding.remediation.is_empty() {
            details.push((String::new(), format!("→ {}", finding.remediation).italic()));
        }
    }
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_common::security::FindingKind;

    #[test]
    fn ipv6_types() {
        let gua: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let ula: Ipv6Addr = "fd00::1".parse().unwrap();
        let lla: Ipv6Addr = "fe80::1".parse().unwrap();
        assert_eq!(ipv6_to_type_str(&gua), "GUA");
        assert_eq!(ipv6_to_type_str(&ula), "ULA");
        assert_eq!(ipv6_to_type_str(&lla), "LLA");
        assert_eq!(ipv6_to_type_str(&Ipv6Addr::LOCALHOST), "IPv6");
    }

    #[test]
    fn host_details_skip_missing_fields() {
        let host = Host::new("192.0.2.4".parse().unwrap());
        let keys: Vec<String> = host_details(&host).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["IPv4", "Family", "Latency"]);
    }

    #[test]
    fn remediation_only_in_verbose() {
        let findings = vec![
            Finding::new(Severity::High, FindingKind::RemoteAccess, "RDP exposed")
                .on_port(3389)
                .with_cves(&["CVE-2019-0708"])
                .remediation("Use a VPN"),
        ];
        assert_eq!(finding_details(&findings, false).len(), 2);
        assert_eq!(finding_details(&findings, true).len(), 3);
    }
}

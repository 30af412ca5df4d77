//! # Heuristic Classifier
//!
//! A [`Classifier`] is a list of independent rules. Every rule is a plain function from
//! an immutable [`HostSnapshot`] to zero or more findings, so rules can be added,
//! removed or tested one at a time. [`Classifier::default`] carries the built-in
//! catalogue.

use std::net::IpAddr;

use vigil_common::network::host::OpenPort;
use vigil_common::security::{Finding, FindingKind, Severity};
use vigil_protocols::fingerprint;
use vigil_protocols::services::HTTP_PORTS;

/// What a rule gets to look at. Borrowed from the host record after its scan finished.
#[derive(Debug, Clone, Copy)]
pub struct HostSnapshot<'a> {
    pub ip: IpAddr,
    pub ports: &'a [OpenPort],
    pub os_guess: &'a str,
}

impl<'a> HostSnapshot<'a> {
    pub fn new(ip: IpAddr, ports: &'a [OpenPort], os_guess: &'a str) -> Self {
        Self { ip, ports, os_guess }
    }

    pub fn has_port(&self, port: u16) -> bool {
        self.ports.iter().any(|p| p.port == port)
    }

    pub fn is_windows(&self) -> bool {
        self.os_guess.starts_with("Windows")
    }

    fn lowercase_banners(&self) -> impl Iterator<Item = (&'a OpenPort, String)> + 'a {
        self.ports
            .iter()
            .filter(|p| !p.banner.is_empty())
            .map(|p| (p, p.banner.to_lowercase()))
    }
}

pub type Rule = fn(&HostSnapshot<'_>) -> Vec<Finding>;

pub struct Classifier {
    rules: Vec<(&'static str, Rule)>,
}

impl Classifier {
    /// A classifier with no rules at all.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn register(&mut self, name: &'static str, rule: Rule) -> &mut Self {
        self.rules.push((name, rule));
        self
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|(name, _)| *name)
    }

    pub fn classify(&self, host: &HostSnapshot<'_>) -> Vec<Finding> {
        self.rules.iter().flat_map(|(_, rule)| rule(host)).collect()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        let mut classifier = Self::empty();
        classifier
            .register("telnet", telnet)
            .register("ftp-cleartext", ftp_cleartext)
            .register("vsftpd-backdoor", vsftpd_backdoor)
            .register("ssh-v1", ssh_v1)
            .register("outdated-openssh", outdated_openssh)
            .register("outdated-apache", outdated_apache)
            .register("outdated-nginx", outdated_nginx)
            .register("exposed-database", exposed_database)
            .register("unauthenticated-store", unauthenticated_store)
            .register("remote-desktop", remote_desktop)
            .register("smb", smb)
            .register("netbios", netbios)
            .register("smb-lateral-movement", smb_lateral_movement)
            .register("snmp", snmp)
            .register("legacy-services", legacy_services)
            .register("cleartext-mail-directory", cleartext_mail_directory)
            .register("http-without-https", http_without_https)
            .register("version-disclosure", version_disclosure)
            .register("attack-surface", attack_surface);
        classifier
    }
}

// ----- cleartext and weak protocols -----

fn telnet(host: &HostSnapshot<'_>) -> Vec<Finding> {
    if !host.has_port(23) {
        return Vec::new();
    }
    vec![
        Finding::new(
            Severity::Critical,
            FindingKind::CleartextProtocol,
            "Telnet service exposed; credentials travel in cleartext",
        )
        .on_port(23)
        .remediation("Disable Telnet and use SSH for remote administration")
        .impact("Credentials and sessions can be captured by anyone on the path"),
    ]
}

fn ftp_cleartext(host: &HostSnapshot<'_>) -> Vec<Finding> {
    if !host.has_port(21) {
        return Vec::new();
    }
    vec![
        Finding::new(
            Severity::High,
            FindingKind::CleartextProtocol,
            "FTP service exposed; credentials and data are not encrypted",
        )
        .on_port(21)
        .remediation("Replace FTP with SFTP or FTPS"),
    ]
}

fn vsftpd_backdoor(host: &HostSnapshot<'_>) -> Vec<Finding> {
    host.lowercase_banners()
        .filter(|(_, banner)| banner.contains("vsftpd 2.3.4"))
        .map(|(port, _)| {
            Finding::new(
                Severity::Critical,
                FindingKind::OutdatedSoftware,
                "vsftpd 2.3.4 contains a known backdoor",
            )
            .on_port(port.port)
            .with_cves(&["CVE-2011-2523"])
            .remediation("Upgrade vsftpd immediately and audit the host for compromise")
            .impact("Remote root shell without authentication")
        })
        .collect()
}

fn ssh_v1(host: &HostSnapshot<'_>) -> Vec<Finding> {
    host.lowercase_banners()
        .filter(|(_, banner)| banner.contains("ssh-1.") && !banner.contains("ssh-1.99"))
        .map(|(port, _)| {
            Finding::new(
                Severity::High,
                FindingKind::WeakProtocol,
                "SSH protocol version 1 is offered",
            )
            .on_port(port.port)
            .remediation("Allow SSH protocol 2 only")
        })
        .collect()
}

// ----- outdated software -----

fn outdated_openssh(host: &HostSnapshot<'_>) -> Vec<Finding> {
    host.lowercase_banners()
        .filter_map(|(port, banner)| {
            let version = version_after(&banner, "openssh_")?;
            (version < (7, 4)).then(|| {
                Finding::new(
                    Severity::High,
                    FindingKind::OutdatedSoftware,
                    format!("Outdated OpenSSH {}.{}", version.0, version.1),
                )
                .on_port(port.port)
                .remediation("Upgrade OpenSSH to a supported release")
            })
        })
        .collect()
}

fn outdated_apache(host: &HostSnapshot<'_>) -> Vec<Finding> {
    host.lowercase_banners()
        .filter_map(|(port, banner)| {
            let version = version_after(&banner, "apache/")?;
            matches!(version, (2, 0) | (2, 2)).then(|| {
                Finding::new(
                    Severity::High,
                    FindingKind::OutdatedSoftware,
                    format!("End-of-life Apache httpd {}.{}", version.0, version.1),
                )
                .on_port(port.port)
                .remediation("Upgrade to Apache httpd 2.4")
            })
        })
        .collect()
}

fn outdated_nginx(host: &HostSnapshot<'_>) -> Vec<Finding> {
    host.lowercase_banners()
        .filter_map(|(port, banner)| {
            let version = version_after(&banner, "nginx/")?;
            (version < (1, 16)).then(|| {
                Finding::new(
                    Severity::Medium,
                    FindingKind::OutdatedSoftware,
                    format!("Outdated nginx {}.{}", version.0, version.1),
                )
                .on_port(port.port)
                .remediation("Upgrade nginx to a maintained release")
            })
        })
        .collect()
}

/// Reads `major.minor` right after `marker`, e.g. `openssh_7.2p2` gives `(7, 2)`.
fn version_after(banner: &str, marker: &str) -> Option<(u32, u32)> {
    let start = banner.find(marker)? + marker.len();
    let rest = &banner[start..];
    let major_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let major = rest[..major_len].parse().ok()?;
    // "7p1" has no minor
    let minor = rest[major_len..]
        .strip_prefix('.')
        .map(|tail| tail.chars().take_while(char::is_ascii_digit).collect::<String>())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0);
    Some((major, minor))
}

// ----- exposed services -----

fn exposed_database(host: &HostSnapshot<'_>) -> Vec<Finding> {
    const DATABASES: [(u16, &str); 5] = [
        (1433, "Microsoft SQL Server"),
        (1521, "Oracle"),
        (3306, "MySQL"),
        (5432, "PostgreSQL"),
        (50000, "IBM DB2"),
    ];
    DATABASES
        .iter()
        .filter(|(port, _)| host.has_port(*port))
        .map(|(port, name)| {
            Finding::new(
                Severity::High,
                FindingKind::ExposedDatabase,
                format!("{name} reachable from the network"),
            )
            .on_port(*port)
            .remediation("Bind the database to localhost or restrict access with a firewall")
        })
        .collect()
}

fn unauthenticated_store(host: &HostSnapshot<'_>) -> Vec<Finding> {
    const STORES: [(u16, &str); 2] = [(6379, "Redis"), (27017, "MongoDB")];
    STORES
        .iter()
        .filter(|(port, _)| host.has_port(*port))
        .map(|(port, name)| {
            Finding::new(
                Severity::Critical,
                FindingKind::ExposedDatabase,
                format!("{name} exposed; often runs without authentication"),
            )
            .on_port(*port)
            .remediation(format!("Enable authentication on {name} and firewall the port"))
            .impact("Data theft or remote code execution through the data store")
        })
        .collect()
}

fn remote_desktop(host: &HostSnapshot<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    if host.has_port(3389) {
        findings.push(
            Finding::new(
                Severity::High,
                FindingKind::RemoteAccess,
                "RDP exposed to the network",
            )
            .on_port(3389)
            .with_cves(&["CVE-2019-0708"])
            .remediation("Put RDP behind a VPN and enable Network Level Authentication"),
        );
    }
    if host.has_port(5900) {
        findings.push(
            Finding::new(
                Severity::High,
                FindingKind::RemoteAccess,
                "VNC exposed to the network",
            )
            .on_port(5900)
            .remediation("Tunnel VNC over SSH or a VPN and require a strong password"),
        );
    }
    findings
}

fn smb(host: &HostSnapshot<'_>) -> Vec<Finding> {
    if !host.has_port(445) {
        return Vec::new();
    }
    let finding = Finding::new(
        Severity::High,
        FindingKind::FileSharing,
        "SMB exposed; historically targeted by wormable exploits",
    )
    .on_port(445)
    .with_cves(&["CVE-2017-0144", "CVE-2020-0796"])
    .remediation("Patch SMB, disable SMBv1 and block 445 outside the LAN");

    // Samba is not affected by either CVE; Windows runs SMB in the kernel.
    if host.is_windows() {
        return vec![finding.impact("Remote code execution as SYSTEM without credentials")];
    }
    vec![finding]
}

fn netbios(host: &HostSnapshot<'_>) -> Vec<Finding> {
    if !host.has_port(139) {
        return Vec::new();
    }
    vec![
        Finding::new(
            Severity::Medium,
            FindingKind::FileSharing,
            "NetBIOS session service exposed",
        )
        .on_port(139)
        .remediation("Disable NetBIOS over TCP/IP if it is not needed"),
    ]
}

fn smb_lateral_movement(host: &HostSnapshot<'_>) -> Vec<Finding> {
    let cleartext_mgmt = [21, 23, 161].iter().any(|&p| host.has_port(p));
    if !(host.has_port(445) && cleartext_mgmt) {
        return Vec::new();
    }
    vec![
        Finding::new(
            Severity::Critical,
            FindingKind::LateralMovement,
            "SMB together with a cleartext management protocol",
        )
        .remediation("Remove the cleartext management service and segment this host")
        .impact("Captured credentials can be replayed over SMB to move through the network"),
    ]
}

fn snmp(host: &HostSnapshot<'_>) -> Vec<Finding> {
    if !host.has_port(161) {
        return Vec::new();
    }
    vec![
        Finding::new(
            Severity::Medium,
            FindingKind::Misconfiguration,
            "SNMP exposed; default community strings are common",
        )
        .on_port(161)
        .remediation("Use SNMPv3 with authentication or disable SNMP"),
    ]
}

fn legacy_services(host: &HostSnapshot<'_>) -> Vec<Finding> {
    const LEGACY: [(u16, &str); 4] = [
        (69, "TFTP"),
        (111, "RPC portmapper"),
        (1080, "SOCKS proxy"),
        (1723, "PPTP"),
    ];
    LEGACY
        .iter()
        .filter(|(port, _)| host.has_port(*port))
        .map(|(port, name)| {
            Finding::new(
                Severity::Medium,
                FindingKind::WeakProtocol,
                format!("Legacy service {name} exposed"),
            )
            .on_port(*port)
            .remediation(format!("Disable {name} or restrict it to trusted hosts"))
        })
        .collect()
}

fn cleartext_mail_directory(host: &HostSnapshot<'_>) -> Vec<Finding> {
    const PAIRS: [(u16, u16, &str); 3] = [(110, 995, "POP3"), (143, 993, "IMAP"), (389, 636, "LDAP")];
    PAIRS
        .iter()
        .filter(|(plain, tls, _)| host.has_port(*plain) && !host.has_port(*tls))
        .map(|(plain, tls, name)| {
            Finding::new(
                Severity::Low,
                FindingKind::CleartextProtocol,
                format!("{name} offered without its TLS counterpart"),
            )
            .on_port(*plain)
            .remediation(format!("Serve {name} over TLS on port {tls}"))
        })
        .collect()
}

fn http_without_https(host: &HostSnapshot<'_>) -> Vec<Finding> {
    let http = HTTP_PORTS.iter().copied().find(|&p| host.has_port(p));
    let https = host.has_port(443) || host.has_port(8443);
    match http {
        Some(port) if !https => vec![
            Finding::new(
                Severity::Low,
                FindingKind::CleartextProtocol,
                "Web service without HTTPS",
            )
            .on_port(port)
            .remediation("Serve the site over HTTPS and redirect plain HTTP"),
        ],
        _ => Vec::new(),
    }
}

fn version_disclosure(host: &HostSnapshot<'_>) -> Vec<Finding> {
    host.ports
        .iter()
        .filter(|p| !p.version.is_empty() && !fingerprint::is_generic_marker(&p.version))
        .map(|p| {
            Finding::new(
                Severity::Low,
                FindingKind::InformationDisclosure,
                format!("{} banner discloses version '{}'", p.service, p.version),
            )
            .on_port(p.port)
            .remediation("Hide version details from service banners")
        })
        .collect()
}

fn attack_surface(host: &HostSnapshot<'_>) -> Vec<Finding> {
    if host.ports.len() <= 15 {
        return Vec::new();
    }
    vec![
        Finding::new(
            Severity::Medium,
            FindingKind::AttackSurface,
            format!("{} open ports", host.ports.len()),
        )
        .remediation("Close services that are not required"),
    ]
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
    use std::net::Ipv4Addr;

    const IP: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10));

    fn port(port: u16, banner: &str) -> OpenPort {
        let open = OpenPort::new(port, "svc").with_banner(banner);
        let version = fingerprint::extract_version(banner, port);
        open.with_version(version)
    }

    fn classify(ports: &[OpenPort]) -> Vec<Finding> {
        Classifier::default().classify(&HostSnapshot::new(IP, ports, "Unknown"))
    }

    fn kinds_on(findings: &[Finding], port: u16) -> Vec<(Severity, FindingKind)> {
        findings
            .iter()
            .filter(|f| f.port == Some(port))
            .map(|f| (f.severity, f.kind))
            .collect()
    }

    #[test]
    fn no_ports_no_findings() {
        assert!(classify(&[]).is_empty());
    }

    #[test]
    fn empty_classifier_finds_nothing() {
        let ports = [port(23, "")];
        let findings = Classifier::empty().classify(&HostSnapshot::new(IP, &ports, "Unknown"));
        assert!(findings.is_empty());
    }

    #[test]
    fn custom_rules_can_be_registered() {
        fn everything_is_critical(host: &HostSnapshot<'_>) -> Vec<Finding> {
            host.ports
                .iter()
                .map(|p| {
                    Finding::new(Severity::Critical, FindingKind::Misconfiguration, "policy")
                        .on_port(p.port)
                })
                .collect()
        }

        let mut classifier = Classifier::empty();
        classifier.register("strict", everything_is_critical);
        let ports = [port(80, ""), port(443, "")];
        let findings = classifier.classify(&HostSnapshot::new(IP, &ports, "Unknown"));

        assert_eq!(findings.len(), 2);
        assert_eq!(classifier.rule_names().collect::<Vec<_>>(), vec!["strict"]);
    }

    #[test]
    fn telnet_is_critical() {
        let findings = classify(&[port(23, "")]);
        assert_eq!(
            kinds_on(&findings, 23),
            vec![(Severity::Critical, FindingKind::CleartextProtocol)]
        );
    }

    #[test]
    fn vsftpd_backdoor_carries_cve() {
        let findings = classify(&[port(21, "220 (vsFTPd 2.3.4)")]);
        let backdoor = findings
            .iter()
            .find(|f| f.kind == FindingKind::OutdatedSoftware)
            .unwrap();
        assert_eq!(backdoor.severity, Severity::Critical);
        assert_eq!(backdoor.cves, vec!["CVE-2011-2523"]);
        // plain FTP is flagged as well
        assert!(findings.iter().any(|f| f.severity == Severity::High
            && f.kind == FindingKind::CleartextProtocol));
    }

    #[test]
    fn ssh_versions() {
        let v1 = classify(&[port(22, "SSH-1.5-OpenSSH_3.0")]);
        assert!(v1.iter().any(|f| f.kind == FindingKind::WeakProtocol));
        assert!(v1.iter().any(|f| f.description == "Outdated OpenSSH 3.0"));

        let compat = classify(&[port(22, "SSH-1.99-OpenSSH_9.0")]);
        assert!(!compat.iter().any(|f| f.kind == FindingKind::WeakProtocol));
        assert!(!compat.iter().any(|f| f.kind == FindingKind::OutdatedSoftware));

        let old = classify(&[port(22, "SSH-2.0-OpenSSH_7.2p2 Ubuntu-4")]);
        assert!(old.iter().any(|f| f.description == "Outdated OpenSSH 7.2"));

        let current = classify(&[port(22, "SSH-2.0-OpenSSH_8.9p1")]);
        assert!(!current.iter().any(|f| f.kind == FindingKind::OutdatedSoftware));
    }

    #[test]
    fn web_server_versions() {
        let apache = classify(&[port(80, "Server: Apache/2.2.15 (CentOS)"), port(443, "")]);
        assert!(apache.iter().any(|f| f.severity == Severity::High
            && f.kind == FindingKind::OutdatedSoftware));

        let nginx = classify(&[port(443, "Server: nginx/1.14.0")]);
        assert!(nginx.iter().any(|f| f.severity == Severity::Medium
            && f.kind == FindingKind::OutdatedSoftware));

        let modern = classify(&[port(443, "Server: nginx/1.24.0")]);
        assert!(!modern.iter().any(|f| f.kind == FindingKind::OutdatedSoftware));
    }

    #[test]
    fn databases_and_stores() {
        let findings = classify(&[port(3306, ""), port(6379, ""), port(27017, "")]);
        assert_eq!(
            kinds_on(&findings, 3306),
            vec![(Severity::High, FindingKind::ExposedDatabase)]
        );
        assert_eq!(
            kinds_on(&findings, 6379),
            vec![(Severity::Critical, FindingKind::ExposedDatabase)]
        );
        assert_eq!(
            kinds_on(&findings, 27017),
            vec![(Severity::Critical, FindingKind::ExposedDatabase)]
        );
        // "MySQL detected" is not a version leak
        assert!(!findings.iter().any(|f| f.kind == FindingKind::InformationDisclosure));
    }

    #[test]
    fn smb_with_cleartext_management_enables_lateral_movement() {
        let findings = classify(&[port(445, ""), port(161, "")]);
        assert!(findings.iter().any(|f| f.kind == FindingKind::LateralMovement
            && f.severity == Severity::Critical));
        let smb = findings.iter().find(|f| f.kind == FindingKind::FileSharing).unwrap();
        assert_eq!(smb.cves, vec!["CVE-2017-0144", "CVE-2020-0796"]);

        let alone = classify(&[port(445, "")]);
        assert!(!alone.iter().any(|f| f.kind == FindingKind::LateralMovement));
    }

    #[test]
    fn smb_impact_depends_on_os_guess() {
        let ports = [port(445, "")];
        let smb_on = |os_guess: &'static str| {
            Classifier::default()
                .classify(&HostSnapshot::new(IP, &ports, os_guess))
                .into_iter()
                .find(|f| f.kind == FindingKind::FileSharing)
                .unwrap()
        };

        let windows = smb_on("Windows");
        assert_eq!(windows.severity, Severity::High);
        assert!(windows.impact.unwrap().contains("SYSTEM"));

        let linux = smb_on("Linux (Debian)");
        assert_eq!(linux.severity, Severity::High);
        assert_eq!(linux.impact, None);
    }

    #[test]
    fn cleartext_twins() {
        let findings = classify(&[port(110, ""), port(143, ""), port(993, "")]);
        assert_eq!(
            kinds_on(&findings, 110),
            vec![(Severity::Low, FindingKind::CleartextProtocol)]
        );
        assert!(kinds_on(&findings, 143).is_empty());
    }

    #[test]
    fn http_without_https_fires_once() {
        let findings = classify(&[port(80, ""), port(8080, "")]);
        let web: Vec<_> = findings
            .iter()
            .filter(|f| f.description == "Web service without HTTPS")
            .collect();
        assert_eq!(web.len(), 1);

        let with_tls = classify(&[port(80, ""), port(8443, "")]);
        assert!(!with_tls.iter().any(|f| f.description == "Web service without HTTPS"));
    }

    #[test]
    fn version_disclosure_per_port() {
        let findings = classify(&[port(22, "SSH-2.0-OpenSSH_8.9"), port(2222, "SSH-2.0-x")]);
        let leaks: Vec<_> = findings
            .iter()
            .filter(|f| f.kind == FindingKind::InformationDisclosure)
            .collect();
        assert_eq!(leaks.len(), 1);
        assert_eq!(leaks[0].port, Some(22));
    }

    #[test]
    fn attack_surface_threshold() {
        let fifteen: Vec<OpenPort> = (10000..10015).map(|p| port(p, "")).collect();
        assert!(!classify(&fifteen).iter().any(|f| f.kind == FindingKind::AttackSurface));

        let sixteen: Vec<OpenPort> = (10000..10016).map(|p| port(p, "")).collect();
        assert!(classify(&sixteen).iter().any(|f| f.kind == FindingKind::AttackSurface));
    }

    #[test]
    fn version_parsing() {
        assert_eq!(version_after("openssh_7.2p2", "openssh_"), Some((7, 2)));
        assert_eq!(version_after("openssh_7p1", "openssh_"), Some((7, 0)));
        assert_eq!(version_after("nginx/1.18.0", "nginx/"), Some((1, 18)));
        assert_eq!(version_after("nginx/", "nginx/"), None);
        assert_eq!(version_after("apache", "apache/"), None);
    }

    #[test]
    fn rules_do_not_mutate_input() {
        let ports = vec![port(23, ""), port(445, "")];
        let before = ports.clone();
        classify(&ports);
        assert_eq!(ports, before);
    }
}

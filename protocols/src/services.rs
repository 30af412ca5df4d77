/// Well-known TCP services, sorted by port.
pub static SERVICES: &[(u16, &str)] = &[
    (20, "FTP-Data"),
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (67, "DHCP-Server"),
    (68, "DHCP-Client"),
    (69, "TFTP"),
    (80, "HTTP"),
    (110, "POP3"),
    (111, "RPC"),
    (123, "NTP"),
    (135, "MSRPC"),
    (137, "NetBIOS-NS"),
    (138, "NetBIOS-DGM"),
    (139, "NetBIOS-SSN"),
    (143, "IMAP"),
    (161, "SNMP"),
    (162, "SNMP-Trap"),
    (389, "LDAP"),
    (443, "HTTPS"),
    (445, "SMB"),
    (465, "SMTPS"),
    (514, "Syslog"),
    (515, "LPD"),
    (587, "SMTP-Submission"),
    (636, "LDAPS"),
    (993, "IMAPS"),
    (995, "POP3S"),
    (1080, "SOCKS"),
    (1194, "OpenVPN"),
    (1433, "MSSQL"),
    (1521, "Oracle"),
    (1723, "PPTP"),
    (3306, "MySQL"),
    (3389, "RDP"),
    (5060, "SIP"),
    (5061, "SIP-TLS"),
    (5432, "PostgreSQL"),
    (5900, "VNC"),
    (6379, "Redis"),
    (8000, "HTTP-Alt"),
    (8080, "HTTP-Proxy"),
    (8443, "HTTPS-Alt"),
    (8888, "HTTP-Alt2"),
    (9000, "HTTP-Alt3"),
    (9090, "WebSM"),
    (27017, "MongoDB"),
    (50000, "DB2"),
];

/// The default candidate set for a port scan.
pub static COMMON_PORTS: [u16; 50] = [
    20, 21, 22, 23, 25, 53, 67, 68, 69, 80, 110, 111, 123, 135, 137, 138, 139, 143, 161, 162,
    389, 443, 445, 465, 514, 515, 587, 636, 993, 995, 1080, 1194, 1433, 1521, 1723, 3306, 3389,
    5060, 5061, 5432, 5900, 6379, 8000, 8080, 8443, 8888, 9000, 9090, 27017, 50000,
];

/// Ports that speak plain HTTP.
pub const HTTP_PORTS: [u16; 4] = [80, 8000, 8080, 8888];

pub fn service_name(port: u16) -> &'static str {
    SERVICES
        .binary_search_by_key(&port, |&(p, _)| p)
        .map(|idx| SERVICES[idx].1)
        .unwrap_or("unknown")
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
    fn table_is_sorted_for_binary_search() {
        assert!(SERVICES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn every_common_port_has_a_name() {
        assert!(COMMON_PORTS.iter().all(|&p| service_name(p) != "unknown"));
    }

    #[test]
    fn lookup() {
        assert_eq!(service_name(22), "SSH");
        assert_eq!(service_name(3306), "MySQL");
        assert_eq!(service_name(50000), "DB2");
        assert_eq!(service_name(31337), "unknown");
    }
}

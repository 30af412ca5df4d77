//! # OS guessing
//!
//! Best-effort guess from service banners, falling back to well-known port sets.

use vigil_common::network::host::OpenPort;

const WINDOWS_PORTS: [u16; 4] = [135, 139, 445, 3389];
const PRINTER_PORTS: [u16; 3] = [515, 631, 9100];

/// Coarse operating system guess from banners first, then from which ports are open.
pub fn guess_os(ports: &[OpenPort]) -> String {
    let banners = ports
        .iter()
        .map(|p| p.banner.to_lowercase())
        .collect::<Vec<_>>()
        .join("\n");

    let by_banner = [
        (&["ubuntu"][..], "Linux (Ubuntu)"),
        (&["debian"][..], "Linux (Debian)"),
        (&["centos", "red hat"][..], "Linux (RHEL/CentOS)"),
        (&["fedora"][..], "Linux (Fedora)"),
        (&["freebsd"][..], "FreeBSD"),
        (&["microsoft", "windows"][..], "Windows"),
    ];
    for (keywords, os) in by_banner {
        if keywords.iter().any(|k| banners.contains(k)) {
            return os.to_string();
        }
    }

    let has = |port: u16| ports.iter().any(|p| p.port == port);
    let windows = WINDOWS_PORTS.iter().any(|&p| has(p));

    let os = if windows {
        "Windows"
    } else if has(22) {
        "Linux/Unix"
    } else if PRINTER_PORTS.iter().any(|&p| has(p)) {
        "Network Printer"
    } else if (has(23) || has(161)) && ports.len() <= 3 {
        "Network Device"
    } else {
        "Unknown"
    };
    os.to_string()
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

    fn port(port: u16, banner: &str) -> OpenPort {
        OpenPort::new(port, "svc").with_banner(banner)
    }

    #[test]
    fn banner_keyword_wins() {
        let ports = vec![
            port(22, "SSH-2.0-OpenSSH_8.9p1 Ubuntu-3ubuntu0.6"),
            port(445, ""),
        ];
        assert_eq!(guess_os(&ports), "Linux (Ubuntu)");
        assert_eq!(
            guess_os(&[port(80, "Server: Microsoft-IIS/10.0")]),
            "Windows"
        );
    }

    #[test]
    fn port_signatures() {
        assert_eq!(guess_os(&[port(135, ""), port(22, "")]), "Windows");
        assert_eq!(guess_os(&[port(22, "SSH-2.0-dropbear")]), "Linux/Unix");
        assert_eq!(guess_os(&[port(9100, ""), port(80, "")]), "Network Printer");
        assert_eq!(guess_os(&[port(23, ""), port(80, "")]), "Network Device");
    }

    #[test]
    fn nothing_to_go_on() {
        assert_eq!(guess_os(&[]), "Unknown");
        assert_eq!(guess_os(&[port(8080, "")]), "Unknown");
        let busy: Vec<OpenPort> = [23, 80, 443, 8080].iter().map(|&p| port(p, "")).collect();
        assert_eq!(guess_os(&busy), "Unknown");
    }
}

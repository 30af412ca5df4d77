use crate::services::HTTP_PORTS;

/// Client-initiated greeting sent before reading a banner.
///
/// SSH and FTP servers talk first, so they get [`Probe::Silent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    HttpGet,
    SmtpEhlo,
    Pop3Capa,
    Silent,
}

impl Probe {
    pub fn for_port(port: u16) -> Self {
        match port {
            p if HTTP_PORTS.contains(&p) => Probe::HttpGet,
            25 | 587 => Probe::SmtpEhlo,
            110 => Probe::Pop3Capa,
            _ => Probe::Silent,
        }
    }

    pub fn payload(&self) -> &'static [u8] {
        match self {
            Probe::HttpGet => b"GET / HTTP/1.0\r\n\r\n",
            Probe::SmtpEhlo => b"EHLO vigil\r\n",
            Probe::Pop3Capa => b"CAPA\r\n",
            Probe::Silent => b"",
        }
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
    fn probe_selection() {
        assert_eq!(Probe::for_port(8080), Probe::HttpGet);
        assert_eq!(Probe::for_port(587), Probe::SmtpEhlo);
        assert_eq!(Probe::for_port(110), Probe::Pop3Capa);
        assert_eq!(Probe::for_port(22), Probe::Silent);
        assert_eq!(Probe::for_port(21), Probe::Silent);
        assert!(Probe::for_port(443).payload().is_empty());
        assert!(Probe::HttpGet.payload().ends_with(b"\r\n\r\n"));
    }
}

//! Coarse version extraction from service banners.
//!
//! The rules are ordered and the first match wins. Matching is done on a lowercased
//! copy of the banner, so extracted versions come back lowercased as well.

const SSH_VERSION_LEN: usize = 20;
const HTTP_VERSION_LEN: usize = 15;
const FTP_VERSION_LEN: usize = 50;

pub const MYSQL_MARKER: &str = "MySQL detected";
pub const POSTGRES_MARKER: &str = "PostgreSQL detected";
pub const SSH_MARKER: &str = "SSH detected";

pub fn extract_version(banner: &str, port: u16) -> String {
    match port {
        3306 => return MYSQL_MARKER.to_string(),
        5432 => return POSTGRES_MARKER.to_string(),
        _ => {}
    }

    let lower = banner.to_lowercase();

    if let Some(version) = anchored(&lower, "openssh", SSH_VERSION_LEN) {
        return version;
    }
    if lower.contains("ssh") {
        return SSH_MARKER.to_string();
    }
    if let Some(version) = ["apache/", "nginx/"]
        .iter()
        .find_map(|marker| anchored(&lower, marker, HTTP_VERSION_LEN))
    {
        return version;
    }
    if port == 21 && lower.contains("ftp") {
        return lower.chars().take(FTP_VERSION_LEN).collect();
    }

    String::new()
}

/// Up to `len` characters of `haystack`, starting at the first `marker`.
fn anchored(haystack: &str, marker: &str, len: usize) -> Option<String> {
    let idx = haystack.find(marker)?;
    Some(haystack[idx..].chars().take(len).collect::<String>().trim_end().to_string())
}

/// True for the fixed strings that name a protocol but carry no version.
pub fn is_generic_marker(version: &str) -> bool {
    [MYSQL_MARKER, POSTGRES_MARKER, SSH_MARKER].contains(&version)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

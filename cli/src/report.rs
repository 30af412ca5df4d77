//! File reports: JSON host list, JSON summary and a standalone HTML page.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use vigil_common::network::host::Host;
use vigil_common::summary::NetworkSummary;

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("writing {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

pub fn write_html(path: &Path, hosts: &[Host], summary: &NetworkSummary) -> anyhow::Result<()> {
    std::fs::write(path, render_html(hosts, summary))
        .with_context(|| format!("writing {}", path.display()))
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = "body{font-family:sans-serif;margin:2em;background:#fafafa;color:#222}\
table{border-collapse:collapse;margin:.5em 0}td,th{border:1px solid #ccc;padding:4px 8px;text-align:left}\
.host{background:#fff;border:1px solid #ddd;border-radius:6px;padding:1em;margin:1em 0}\
.CRITICAL{color:#c00;font-weight:bold}.HIGH{color:#d60}.MEDIUM{color:#a80}.LOW{color:#06a}.MINIMAL{color:#080}\
pre{white-space:pre-wrap;background:#f3f3f3;padding:4px}";

pub fn render_html(hosts: &[Host], summary: &NetworkSummary) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Vigil network audit</title>\
         <style>{STYLE}</style></head><body>\n<h1>Network audit</h1>\n"
    );

    let level = summary.risk_level();
    let most_vulnerable = summary
        .most_vulnerable
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "-".to_string());
    let _ = write!(
        html,
        "<h2>Summary</h2>\n<table>\
         <tr><th>Risk score</th><td class=\"{level}\">{} / 100 ({level})</td></tr>\
         <tr><th>Hosts</th><td>{}</td></tr>\
         <tr><th>Open ports</th><td>{}</td></tr>\
         <tr><th>Findings</th><td>{} (critical {}, high {}, medium {}, low {})</td></tr>\
         <tr><th>Most vulnerable</th><td>{most_vulnerable}</td></tr>\
         <tr><th>Duration</th><td>{:.2}s</td></tr></table>\n",
        summary.network_risk_score,
        summary.total_hosts,
        summary.total_open_ports,
        summary.total_findings,
        summary.critical,
        summary.high,
        summary.medium,
        summary.low,
        summary.scan_duration.as_secs_f64(),
    );

    for host in hosts {
        render_host(&mut html, host);
    }

    html.push_str("</body></html>\n");
    html
}

fn render_host(html: &mut String, host: &Host) {
    let level = host.risk_level();
    let _ = write!(
        html,
        "<div class=\"host\"><h3>{} <span class=\"{level}\">{} / 100 ({level})</span></h3>\n<p>",
        host.ip, host.risk_score
    );
    let optional = [
        ("Hostname", host.hostname.clone()),
        ("MAC", host.mac.map(|m| m.to_string())),
        ("Vendor", host.vendor.clone()),
        ("OS", Some(host.os_guess.clone())),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            let _ = write!(html, "<b>{label}:</b> {} ", escape_html(&value));
        }
    }
    html.push_str("</p>\n");

    if !host.open_ports.is_empty() {
        html.push_str("<table><tr><th>Port</th><th>Service</th><th>Version</th><th>Banner</th></tr>");
        for port in &host.open_ports {
            let _ = write!(
                html,
                "<tr><td>{}/tcp</td><td>{}</td><td>{}</td><td><pre>{}</pre></td></tr>",
                port.port,
                escape_html(&port.service),
                escape_html(&port.version),
                escape_html(&port.banner),
            );
        }
        html.push_str("</table>\n");
    }

    if !host.findings.is_empty() {
        html.push_str("<ul>");
        for finding in &host.findings {
            let _ = write!(
                html,
                "<li><span class=\"{0}\">[{0}]</span> {1}: {2}",
                finding.severity,
                finding.kind,
                escape_html(&finding.description),
            );
            if !finding.cves.is_empty() {
                let _ = write!(html, " ({})", escape_html(&finding.cves.join(", ")));
            }
            if !finding.remediation.is_empty() {
                let _ = write!(html, "<br><i>{}</i>", escape_html(&finding.remediation));
            }
            html.push_str("</li>");
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</div>\n");
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
    use vigil_common::network::host::OpenPort;
    use vigil_common::security::{Finding, FindingKind, Severity};

    fn sample_host() -> Host {
        let mut host = Host::new("192.0.2.8".parse().unwrap());
        host.open_ports = vec![OpenPort::new(80, "HTTP").with_banner("<script>alert(1)</script>")];
        host.findings = vec![
            Finding::new(Severity::Low, FindingKind::CleartextProtocol, "Web service without HTTPS")
                .on_port(80),
        ];
        host.risk_score = 2;
        host
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn html_report_escapes_banners() {
        let html = render_html(&[sample_host()], &NetworkSummary::default());
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("192.0.2.8"));
        assert!(html.contains("[LOW]"));
    }

    #[test]
    fn json_report_is_written() {
        let path = std::env::temp_dir().join(format!("vigil-report-{}.json", std::process::id()));
        write_json(&path, &[sample_host()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value[0]["ip"], "192.0.2.8");
        assert_eq!(value[0]["open_ports"][0]["port"], 80);
        assert_eq!(value[0]["findings"][0]["severity"], "LOW");
    }
}

use anyhow::Context;
use colored::*;
use tracing::{Instrument, info_span};
use vigil_common::config::ScanConfig;
use vigil_common::network::host::Host;
use vigil_common::security::{Finding, Severity};
use vigil_common::summary::NetworkSummary;
use vigil_common::info;
use vigil_core::audit::{AuditReport, AuditService};

use crate::commands::ScanArgs;
use crate::commands::discover::no_hosts_found;
use crate::report;
use crate::terminal::{colors, format, print, spinner};
use crate::vprint;

const TOP_RECOMMENDATIONS: usize = 5;

pub async fn scan(args: &ScanArgs, cfg: &ScanConfig) -> anyhow::Result<()> {
    let range = args.target.resolve()?;
    let audit = AuditService::from_config(cfg);

    let span = info_span!("audit");
    spinner::attach(&span, "Probing addresses...");
    let report = audit
        .run(&range, Some(spinner::host_counter(span.clone())))
        .instrument(span)
        .await;

    if report.hosts.is_empty() {
        no_hosts_found(cfg);
    } else {
        print_report(&report, cfg);
    }

    save_reports(args, &report)
}

fn save_reports(args: &ScanArgs, report: &AuditReport) -> anyhow::Result<()> {
    report::write_json(&args.output, &report.hosts).context("saving host list")?;
    info!("Host list saved to {}", args.output.display());

    report::write_json(&args.summary, &report.summary).context("saving summary")?;
    info!("Summary saved to {}", args.summary.display());

    if let Some(html) = &args.html {
        report::write_html(html, &report.hosts, &report.summary).context("saving HTML report")?;
        info!("HTML report saved to {}", html.display());
    }
    Ok(())
}

fn print_report(report: &AuditReport, cfg: &ScanConfig) {
    print::header("Security Audit", cfg.quiet);

    for (idx, host) in report.hosts.iter().enumerate() {
        if cfg.ip_only() {
            print::print(&format!("{} {}", host.ip, format::risk(host.risk_score)));
            continue;
        }
        print_host(idx, host, cfg);
        if idx + 1 != report.hosts.len() {
            vprint!();
        }
    }

    print_summary(&report.summary, cfg);
    print_recommendations(&report.hosts, cfg);
}

fn print_host(idx: usize, host: &Host, cfg: &ScanConfig) {
    let name = match &host.hostname {
        Some(hostname) => format!("{} ({hostname})", host.ip),
        None => host.ip.to_string(),
    };
    print::tree_head(idx, &name);

    let mut details = format::host_details(host);
    details.push(("Risk".to_string(), format::risk(host.risk_score)));
    if host.open_ports.is_empty() {
        details.push(("Ports".to_string(), "none open".dimmed()));
    }
    details.extend(format::port_details(host, cfg.grab_banners && cfg.quiet == 0));
    details.extend(format::finding_details(&host.findings, cfg.verbose));
    print::as_tree_one_level(&details);
}

fn print_summary(summary: &NetworkSummary, cfg: &ScanConfig) {
    if cfg.quiet > 0 {
        vprint!();
        print::print(&format!(
            "{} Audit complete: {} host(s), {} finding(s), network risk {}",
            "[+]".green().bold(),
            summary.total_hosts,
            summary.total_findings,
            format::risk(summary.network_risk_score)
        ));
        return;
    }

    print::header("Network Summary", cfg.quiet);
    const KEY_WIDTH: usize = 16;
    print::aligned_line("Hosts", summary.total_hosts, KEY_WIDTH);
    print::aligned_line("Open ports", summary.total_open_ports, KEY_WIDTH);
    print::aligned_line("Findings", summary.total_findings, KEY_WIDTH);
    for (severity, count) in [
        (Severity::Critical, summary.critical),
        (Severity::High, summary.high),
        (Severity::Medium, summary.medium),
        (Severity::Low, summary.low),
    ] {
        let label = format!("  {}", severity.as_str().to_lowercase());
        print::aligned_line(&label, format!("{} {count}", format::severity(severity)), KEY_WIDTH);
    }
    for (kind, count) in &summary.findings_by_kind {
        print::aligned_line(&format!("  {kind}"), count, KEY_WIDTH);
    }
    if let Some(ip) = summary.most_vulnerable {
        print::aligned_line("Most vulnerable", ip.to_string().color(colors::ACCENT), KEY_WIDTH);
    }
    print::aligned_line("Duration", format!("{:.2}s", summary.scan_duration.as_secs_f64()), KEY_WIDTH);

    print::fat_separator();
    print::centerln(&format!("Network risk: {}", format::risk(summary.network_risk_score)));
}

fn print_recommendations(hosts: &[Host], cfg: &ScanConfig) {
    let critical: Vec<(&Host, &Finding)> = hosts
        .iter()
        .flat_map(|host| host.findings.iter().map(move |f| (host, f)))
        .filter(|(_, f)| f.severity == Severity::Critical)
        .take(TOP_RECOMMENDATIONS)
        .collect();

    if critical.is_empty() || cfg.ip_only() {
        return;
    }

    vprint!();
    print::header("Critical Recommendations", cfg.quiet);
    for (idx, (host, finding)) in critical.iter().enumerate() {
        print::print(&format!(
            "{} {} {}",
            format!("{}.", idx + 1).color(colors::ACCENT),
            host.ip.to_string().color(colors::PRIMARY),
            finding.description
        ));
        if !finding.remediation.is_empty() {
            print::print(&format!("   {} {}", "→".bright_black(), finding.remediation.italic()));
        }
    }
}

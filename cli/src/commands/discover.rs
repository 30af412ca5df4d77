use std::time::{Duration, Instant};

use colored::*;
use tracing::{Instrument, info_span};
use vigil_common::config::ScanConfig;
use vigil_common::network::host::Host;
use vigil_common::network::target::Target;
use vigil_core::audit::AuditService;

use crate::terminal::{colors, format, print, spinner};
use crate::vprint;

pub async fn discover(target: &Target, cfg: &ScanConfig) -> anyhow::Result<()> {
    let range = target.resolve()?;
    let audit = AuditService::from_config(cfg);

    let start_time = Instant::now();
    let span = info_span!("discovery");
    spinner::attach(&span, "Probing addresses...");
    let hosts = audit
        .discover(&range, Some(spinner::host_counter(span.clone())))
        .instrument(span)
        .await;

    discovery_ends(&hosts, start_time.elapsed(), cfg);
    Ok(())
}

fn discovery_ends(hosts: &[Host], total_time: Duration, cfg: &ScanConfig) {
    if hosts.is_empty() {
        no_hosts_found(cfg);
        return;
    }

    if cfg.quiet > 0 {
        vprint!();
    }

    print::header("Network Discovery", cfg.quiet);
    print_hosts(hosts, cfg);
    print_summary(hosts.len(), total_time, cfg);
}

pub fn no_hosts_found(cfg: &ScanConfig) {
    print::header("zero hosts detected", cfg.quiet);
    if !cfg.ip_only() {
        print::no_results();
    }
}

fn print_hosts(hosts: &[Host], cfg: &ScanConfig) {
    for (idx, host) in hosts.iter().enumerate() {
        if cfg.ip_only() {
            print::print(&host.ip.to_string());
            continue;
        }
        let name = host.hostname.as_deref().unwrap_or("No hostname");
        print::tree_head(idx, name);
        print::as_tree_one_level(&format::host_details(host));
        if idx + 1 != hosts.len() {
            vprint!();
        }
    }
}

fn print_summary(hosts_len: usize, total_time: Duration, cfg: &ScanConfig) {
    let active_hosts = format!("{hosts_len} active host(s)").bold().green();
    let total_time = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output = format!("Discovery complete: {active_hosts} identified in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => {
            vprint!();
            print::print(&format!("{} {output}", "[+]".green().bold()));
        }
    }
}

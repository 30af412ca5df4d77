pub mod discover;
pub mod scan;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vigil_common::config::{DEFAULT_DISCOVERY_CONCURRENCY, DEFAULT_PORT_CONCURRENCY, PortSelection, ScanConfig};
use vigil_common::network::target::Target;

#[derive(Parser)]
#[command(name = "vigil")]
#[command(version, about = "Network discovery and security audit.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug output, including remediation advice for every finding
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Less output; repeat to print results only
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Skip reverse DNS lookups
    #[arg(long, global = true)]
    pub no_dns: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover live hosts in a network
    #[command(alias = "d")]
    Discover(DiscoverArgs),
    /// Discover hosts, scan their ports and assess their risk
    #[command(alias = "s")]
    Scan(ScanArgs),
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// CIDR block, address, dash range or `lan`
    #[arg(default_value = "lan")]
    pub target: Target,

    /// Liveness probes in flight at once
    #[arg(long, default_value_t = DEFAULT_DISCOVERY_CONCURRENCY)]
    pub discovery_concurrency: usize,
}

#[derive(Args)]
pub struct ScanArgs {
    /// CIDR block, address, dash range or `lan`
    #[arg(default_value = "lan")]
    pub target: Target,

    /// `common`, `all` or a list such as `22,80,8000-8010`
    #[arg(short, long, default_value = "common")]
    pub ports: PortSelection,

    /// Only check whether ports are open, no banners
    #[arg(long)]
    pub quick: bool,

    /// Scan all 65535 ports
    #[arg(long, conflicts_with = "ports")]
    pub deep: bool,

    /// JSON host list
    #[arg(short, long, default_value = "scan_results.json")]
    pub output: PathBuf,

    /// JSON network summary
    #[arg(long, default_value = "scan_summary.json")]
    pub summary: PathBuf,

    /// Also write an HTML report
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Liveness probes in flight at once
    #[arg(long, default_value_t = DEFAULT_DISCOVERY_CONCURRENCY)]
    pub discovery_concurrency: usize,

    /// Port probes in flight at once, per host
    #[arg(long, default_value_t = DEFAULT_PORT_CONCURRENCY)]
    pub port_concurrency: usize,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Engine settings from the global flags and the chosen subcommand.
    pub fn scan_config(&self) -> ScanConfig {
        let mut cfg = ScanConfig {
            no_dns: self.no_dns,
            verbose: self.verbose,
            quiet: self.quiet,
            ..ScanConfig::default()
        };

        match &self.command {
            Commands::Discover(args) => {
                cfg.discovery_concurrency = args.discovery_concurrency;
            }
            Commands::Scan(args) => {
                cfg.discovery_concurrency = args.discovery_concurrency;
                cfg.port_concurrency = args.port_concurrency;
                cfg.grab_banners = !args.quick;
                cfg.ports = if args.deep {
                    PortSelection::All
                } else {
                    args.ports.clone()
                };
            }
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CommandLine {
        CommandLine::try_parse_from(std::iter::once("vigil").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_to_lan() {
        let cli = parse(&["scan"]);
        let Commands::Scan(args) = &cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.target, Target::Lan);
        assert_eq!(args.output, PathBuf::from("scan_results.json"));

        let cfg = cli.scan_config();
        assert_eq!(cfg.ports, PortSelection::Common);
        assert!(cfg.grab_banners);
        assert_eq!(cfg.port_concurrency, 50);
    }

    #[test]
    fn scan_flags_reach_config() {
        let cli = parse(&["-q", "-q", "--no-dns", "s", "10.0.0.0/24", "--quick", "-p", "22,80-81"]);
        let cfg = cli.scan_config();
        assert_eq!(cfg.quiet, 2);
        assert!(cfg.no_dns);
        assert!(!cfg.grab_banners);
        assert_eq!(cfg.ports, PortSelection::Custom(vec![22, 80, 81]));
    }

    #[test]
    fn deep_scans_everything() {
        let cfg = parse(&["scan", "--deep", "--port-concurrency", "200"]).scan_config();
        assert_eq!(cfg.ports, PortSelection::All);
        assert_eq!(cfg.port_concurrency, 200);
    }

    #[test]
    fn discover_alias() {
        let cli = parse(&["d", "192.168.1.10-20", "--discovery-concurrency", "10"]);
        assert!(matches!(cli.command, Commands::Discover(_)));
        assert_eq!(cli.scan_config().discovery_concurrency, 10);
    }

    #[test]
    fn rejects_bad_target() {
        let result = CommandLine::try_parse_from(["vigil", "scan", "300.1.1.1"]);
        assert!(result.is_err());
    }
}

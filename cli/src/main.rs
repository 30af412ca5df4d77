mod commands;
mod report;
mod terminal;

use commands::{CommandLine, Commands, discover, scan};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose, commands.quiet);
    print::banner(commands.quiet);

    let cfg = commands.scan_config();

    match &commands.command {
        Commands::Discover(args) => {
            print::header("getting ready for discovery", cfg.quiet);
            discover::discover(&args.target, &cfg).await
        }
        Commands::Scan(args) => {
            print::header("starting security audit", cfg.quiet);
            scan::scan(args, &cfg).await
        }
    }
}

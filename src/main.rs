use anyhow::Result;
use clap::Parser;

use provision_cli::{cli, commands, logging};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let log = logging::Logger::new(args.verbose, args.command.log_name());

    match args.command {
        cli::Command::Install(opts) => commands::install::run(&args.global, &opts, &log),
        cli::Command::Update(opts) => commands::update::run(&args.global, &opts, &log),
        cli::Command::Uninstall(opts) => commands::uninstall::run(&args.global, &opts, &log),
        cli::Command::Backup(opts) => commands::backup::run(&args.global, &opts, &log),
        cli::Command::Doctor => commands::doctor::run(&args.global, &log),
        cli::Command::Version => {
            let version = option_env!("PROVISION_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("provision {version}");
            Ok(())
        }
    }
}

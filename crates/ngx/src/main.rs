mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ngx_core::SiteRepository;

use crate::cli::{Cli, Command};
use crate::commands::util;
use crate::error::CliError;

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        // The elevated child has already reported its own failure.
        if !matches!(err, CliError::Escalated { .. }) {
            eprintln!("{:?}", miette::Report::new(err));
        }
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands work without a settings file
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "ngx", &mut std::io::stdout());
            Ok(())
        }

        // Everything else operates on the site directories
        cmd => {
            let settings = util::ensure_settings(&cli.global)?;
            let repo = SiteRepository::new(settings.sites_config());
            let escalate = (cli.global.sudo || settings.sudo) && !util::is_elevated();

            tracing::debug!(command = ?cmd, "dispatching command");
            match commands::dispatch(cmd, &repo, &settings, &cli.global) {
                Err(err) if escalate && err.is_permission_denied() => {
                    tracing::debug!(error = %err, "escalating");
                    util::rerun_elevated(&util::settings_path(&cli.global), &cli.global)
                }
                result => result,
            }
        }
    }
}

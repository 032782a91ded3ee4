//! Command dispatch: routes each subcommand to its handler.

pub mod config_cmd;
pub mod sites;
pub mod templates;
pub mod util;

use ngx_config::Settings;
use ngx_core::SiteRepository;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Run a command that operates on the site directories.
///
/// `Config` and `Completions` never reach this point; they are handled
/// before settings are loaded.
pub fn dispatch(
    cmd: Command,
    repo: &SiteRepository,
    settings: &Settings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Ls => sites::list(repo, global),
        Command::Enable(args) => sites::enable(repo, &args, global),
        Command::Disable(args) => sites::disable(repo, &args, global),
        Command::New(args) => sites::create(repo, &args, global),
        Command::Rm(args) => sites::remove(repo, &args, global),
        Command::Open(args) => sites::open(repo, settings, &args),
        Command::Cp(args) => sites::copy(repo, settings, &args, global),
        Command::Reload => sites::reload(settings, global),
        Command::Templates(args) => templates::handle(repo.templates(), args, global),
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "not a site command".into(),
        }),
    }
}

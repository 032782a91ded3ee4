//! Site command handlers.

use tabled::Tabled;

use ngx_config::Settings;
use ngx_core::{LinkPolicy, SiteEntry, SiteRepository};

use crate::cli::{CopyArgs, EnableArgs, GlobalOpts, NewArgs, SiteArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Config")]
    config: String,
}

fn to_row(repo: &SiteRepository, entry: &SiteEntry) -> SiteRow {
    SiteRow {
        name: entry.name.clone(),
        state: entry.state.to_string(),
        config: repo
            .config()
            .sites_available
            .join(&entry.name)
            .display()
            .to_string(),
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn list(repo: &SiteRepository, global: &GlobalOpts) -> Result<(), CliError> {
    let entries = repo.list()?.entries();
    let color = output::should_color(global.color);
    let out = output::render_list(
        global.output,
        &entries,
        |e| to_row(repo, e),
        |e| output::paint_state(&e.name, e.state, color),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn enable(repo: &SiteRepository, args: &EnableArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let name = util::site_name(&args.name)?;
    let policy = if args.force {
        LinkPolicy::AllowDangling
    } else {
        LinkPolicy::RequireTarget
    };
    repo.enable(&name, policy)?;
    output::print_status(&format!("Enabled {name}"), global.quiet);
    Ok(())
}

pub fn disable(repo: &SiteRepository, args: &SiteArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let name = util::site_name(&args.name)?;
    let message = if repo.disable(&name)? {
        format!("Disabled {name}")
    } else {
        format!("{name} was not enabled")
    };
    output::print_status(&message, global.quiet);
    Ok(())
}

pub fn create(repo: &SiteRepository, args: &NewArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let name = util::site_name(&args.name)?;
    let root = match &args.root {
        Some(root) => std::path::absolute(root)?,
        None => std::env::current_dir()?,
    };
    repo.create(&name, &root, &args.template, &args.port)?;
    output::print_status(
        &format!(
            "Created {name} from template '{}' ({})",
            args.template,
            repo.available_path(&name).display()
        ),
        global.quiet,
    );
    Ok(())
}

pub fn remove(repo: &SiteRepository, args: &SiteArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let name = util::site_name(&args.name)?;
    if !util::confirm(&format!("Remove site '{name}'?"), "rm", global.yes)? {
        output::print_status("Aborted", global.quiet);
        return Ok(());
    }
    let message = if repo.remove(&name)? {
        format!("Removed {name}")
    } else {
        format!("{name} does not exist")
    };
    output::print_status(&message, global.quiet);
    Ok(())
}

pub fn open(repo: &SiteRepository, settings: &Settings, args: &SiteArgs) -> Result<(), CliError> {
    let name = util::site_name(&args.name)?;
    util::open_in_editor(settings, &repo.available_path(&name))
}

pub fn copy(
    repo: &SiteRepository,
    settings: &Settings,
    args: &CopyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let source = util::site_name(&args.source)?;
    let target = util::site_name(&args.target)?;
    repo.copy(&source, &target)?;
    output::print_status(&format!("Copied {source} to {target}"), global.quiet);

    if args.no_edit {
        return Ok(());
    }
    util::open_in_editor(settings, &repo.available_path(&target))
}

pub fn reload(settings: &Settings, global: &GlobalOpts) -> Result<(), CliError> {
    util::reload_server(settings, global.sudo || settings.sudo)?;
    output::print_status("Reloaded", global.quiet);
    Ok(())
}

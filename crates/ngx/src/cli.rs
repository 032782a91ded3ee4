//! Clap derive structures for the `ngx` CLI.
//!
//! Kept free of workspace types so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ngx -- manage nginx sites-available / sites-enabled
#[derive(Debug, Parser)]
#[command(
    name = "ngx",
    version,
    about = "Manage nginx sites from the command line",
    long_about = "Create, enable, disable and remove nginx sites.\n\n\
        Site configs live in a sites-available directory and are enabled by\n\
        symlinking them into sites-enabled. New sites are rendered from\n\
        templates.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Settings file to use instead of the per-user default
    #[arg(long, env = "NGX_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NGX_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Retry through sudo when a command hits a permission error
    #[arg(long, global = true)]
    pub sudo: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List sites: enabled, available only, and dangling links
    #[command(alias = "list")]
    Ls,

    /// Enable a site by linking its config into sites-enabled
    Enable(EnableArgs),

    /// Disable a site by removing its link
    Disable(SiteArgs),

    /// Render a template into a new site and enable it
    New(NewArgs),

    /// Disable a site and delete its config
    #[command(alias = "remove")]
    Rm(SiteArgs),

    /// Open a site config in the editor
    #[command(alias = "edit")]
    Open(SiteArgs),

    /// Copy a site config under a new name
    Cp(CopyArgs),

    /// Ask the web server to reload its configuration
    Reload,

    /// Inspect and install templates
    #[command(alias = "tpl")]
    Templates(TemplatesArgs),

    /// Manage ngx settings
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Site commands ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SiteArgs {
    /// Site name (file name under sites-available)
    pub name: String,
}

#[derive(Debug, Args)]
pub struct EnableArgs {
    /// Site name (file name under sites-available)
    pub name: String,

    /// Create the link even if the site has no config yet
    #[arg(long, short = 'f')]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Site name, also used as the server name
    pub name: String,

    /// Document root (defaults to the current directory)
    #[arg(long, short = 'r', value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Template to render
    #[arg(long, short = 't', default_value = "static")]
    pub template: String,

    /// Port to listen on or proxy to (repeatable)
    #[arg(long, short = 'p', value_name = "PORT")]
    pub port: Vec<u16>,
}

#[derive(Debug, Args)]
pub struct CopyArgs {
    /// Existing site to copy
    pub source: String,

    /// Name of the new site
    pub target: String,

    /// Do not open the copy in the editor
    #[arg(long)]
    pub no_edit: bool,
}

// ── Templates ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub command: TemplatesCommand,
}

#[derive(Debug, Subcommand)]
pub enum TemplatesCommand {
    /// List available templates
    #[command(alias = "ls")]
    List,

    /// Print the source of a template
    Show {
        /// Template name, without extension
        name: String,
    },

    /// Write the bundled templates into the templates directory
    Install {
        /// Overwrite templates that already exist
        #[arg(long, short = 'f')]
        force: bool,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or redo the settings file with guided setup
    #[command(alias = "reconfig")]
    Init,

    /// Display the resolved settings
    Show,

    /// Print the settings file path
    Path,

    /// Edit the settings file; changes are validated before saving
    Edit,

    /// Set a single settings value
    Set {
        /// Settings key (sites_enabled, sites_available, templates_path,
        /// server_bin, editor, sudo)
        key: String,

        /// Value to set; an empty string clears optional keys
        value: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

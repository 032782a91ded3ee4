//! Template command handlers.

use serde::Serialize;
use tabled::Tabled;

use ngx_core::TemplateStore;

use crate::cli::{GlobalOpts, TemplatesArgs, TemplatesCommand};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct TemplateInfo {
    name: String,
    path: String,
}

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "Template")]
    name: String,
    #[tabled(rename = "Path")]
    path: String,
}

pub fn handle(
    store: &TemplateStore,
    args: TemplatesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TemplatesCommand::List => {
            let templates = store
                .names()?
                .into_iter()
                .map(|name| -> Result<TemplateInfo, CliError> {
                    let path = store.path(&name)?.display().to_string();
                    Ok(TemplateInfo { name, path })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let out = output::render_list(
                global.output,
                &templates,
                |t| TemplateRow {
                    name: t.name.clone(),
                    path: t.path.clone(),
                },
                |t| t.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TemplatesCommand::Show { name } => {
            let source = store.load(&name)?;
            output::print_output(source.trim_end_matches('\n'), global.quiet);
            Ok(())
        }

        TemplatesCommand::Install { force } => {
            let written = store.install_bundled(force)?;
            let message = if written.is_empty() {
                format!(
                    "All bundled templates already present in {}",
                    store.root().display()
                )
            } else {
                format!(
                    "Installed {} into {}",
                    written.join(", "),
                    store.root().display()
                )
            };
            output::print_status(&message, global.quiet);
            Ok(())
        }
    }
}

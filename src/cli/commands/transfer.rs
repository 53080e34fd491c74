//! `tolstack import` / `tolstack export` commands - CSV row transfer

use std::io::IsTerminal;
use std::path::PathBuf;

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::Context;
use crate::store;

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file with a header row
    pub csv: PathBuf,

    /// Append to the existing contributors instead of replacing them
    #[arg(long, short = 'a')]
    pub append: bool,

    /// Replace existing contributors without asking
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Destination CSV file, or - for stdout
    pub csv: PathBuf,
}

pub fn run_import(args: ImportArgs, ctx: &Context) -> Result<()> {
    let mut stackup = ctx.load_or_new()?;
    let rows = store::import_rows(&args.csv)?;
    let existing = stackup.contributor_count();

    if !args.append && existing > 0 && !args.yes {
        if !std::io::stdin().is_terminal() {
            return Err(miette::miette!(
                help = "pass --yes to replace them or --append to keep them",
                "{} already has {} contributor(s)",
                ctx.path.display(),
                existing
            ));
        }
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Importing will replace all {} existing contributor(s). Continue?",
                existing
            ))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Import cancelled.");
            return Ok(());
        }
    }

    let imported = rows.len();
    if !args.append {
        stackup.stack_data.clear();
    }
    for row in rows {
        stackup.add_contributor(row);
    }
    ctx.save(&mut stackup)?;

    println!(
        "{} Imported {} contributor(s) from {} ({} total)",
        style("✓").green(),
        style(imported).cyan(),
        style(args.csv.display()).dim(),
        stackup.contributor_count()
    );
    Ok(())
}

pub fn run_export(args: ExportArgs, ctx: &Context) -> Result<()> {
    let stackup = ctx.load()?;

    if args.csv.as_os_str() == "-" {
        return store::write_rows(std::io::stdout().lock(), &stackup.stack_data).into_diagnostic();
    }

    store::export_rows(&args.csv, &stackup.stack_data)?;
    println!(
        "{} Exported {} contributor(s) to {}",
        style("✓").green(),
        style(stackup.contributor_count()).cyan(),
        style(args.csv.display()).dim()
    );
    Ok(())
}

//! `tolstack report` command - Markdown analysis report

use std::path::PathBuf;

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::Context;
use crate::report::ReportGenerator;

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Write the report to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ReportArgs, ctx: &Context) -> Result<()> {
    let stackup = ctx.load()?;
    let report = stackup.analyze();

    let generator = ReportGenerator::new(ctx.precision()).into_diagnostic()?;
    let text = generator.render(&stackup, &report).into_diagnostic()?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &text).into_diagnostic()?;
            tracing::debug!(path = %path.display(), bytes = text.len(), "wrote report");
            println!(
                "{} Wrote report {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => print!("{}", text),
    }
    Ok(())
}

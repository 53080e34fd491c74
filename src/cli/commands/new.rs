//! `tolstack new` command - create a stack file

use console::style;
use miette::Result;

use crate::cli::commands::Context;
use crate::cli::output::print_structured;
use crate::entities::stackup::Stackup;
use crate::store;

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Title (defaults to the file name)
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Seed the stack with ten demonstration contributors
    #[arg(long)]
    pub sample: bool,

    /// Start in advanced statistical mode (Cpk criteria)
    #[arg(long)]
    pub advanced: bool,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: NewArgs, ctx: &Context) -> Result<()> {
    let title = args.title.unwrap_or_else(|| ctx.default_title());
    let analyst = ctx.config.analyst();

    let mut stackup = if args.sample {
        Stackup::sample(title, analyst)
    } else {
        Stackup::new(title, analyst)
    };

    let advanced = args.advanced || ctx.config.advanced_mode.unwrap_or(false);
    let criterion = stackup.set_advanced_mode(advanced);

    store::create_stack(&ctx.path, &mut stackup, args.force)?;

    if print_structured(&stackup, ctx.format)? {
        return Ok(());
    }

    println!(
        "{} Created stack {}",
        style("✓").green(),
        style(stackup.title()).cyan()
    );
    println!("   {}", style(ctx.path.display()).dim());
    println!(
        "   Mode: {}  Criterion: {}  Contributors: {}",
        style(stackup.mode()).yellow(),
        style(criterion).yellow(),
        stackup.contributor_count()
    );

    Ok(())
}

//! `tolstack row` command - contributor editing

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::Context;
use crate::cli::output::print_structured;
use crate::core::tolerance::Tolerance;
use crate::entities::stackup::{Contributor, Direction, ToleranceType};

#[derive(Subcommand, Debug)]
pub enum RowCommands {
    /// Append a contributor
    Add(AddArgs),

    /// Change fields of a contributor
    Edit(EditArgs),

    /// Remove a contributor
    #[command(name = "rm")]
    Remove(RemoveArgs),

    /// Move a contributor to another position
    Move(MoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Description
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Nominal value
    #[arg(long, short = 'n', allow_hyphen_values = true, default_value_t = 0.0)]
    pub nominal: f64,

    /// Direction: + or -
    #[arg(long, short = 'D', default_value = "+", allow_hyphen_values = true)]
    pub direction: Direction,

    /// Tolerance: half-width (0.1) or asymmetric band ("10 +0.3/-0.1")
    #[arg(long, short = 't', default_value = "", allow_hyphen_values = true)]
    pub tol: String,

    /// Tolerance type: Linear, GD&T or Float
    #[arg(long, default_value = "Linear")]
    pub tol_type: ToleranceType,

    /// Process capability of this dimension (default 1.33)
    #[arg(long)]
    pub cpk: Option<f64>,

    /// Mark the contributor as float-shifted
    #[arg(long)]
    pub float_shifted: bool,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Item number (1-based)
    pub item: usize,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 'n', allow_hyphen_values = true)]
    pub nominal: Option<f64>,

    #[arg(long, short = 'D', allow_hyphen_values = true)]
    pub direction: Option<Direction>,

    #[arg(long, short = 't', allow_hyphen_values = true)]
    pub tol: Option<String>,

    #[arg(long)]
    pub tol_type: Option<ToleranceType>,

    #[arg(long, conflicts_with = "clear_cpk")]
    pub cpk: Option<f64>,

    /// Reset Cpk to the default
    #[arg(long)]
    pub clear_cpk: bool,

    #[arg(long)]
    pub float_shifted: Option<bool>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Item number (1-based)
    pub item: usize,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    /// Current item number
    pub from: usize,

    /// New item number
    pub to: usize,
}

pub fn run(cmd: RowCommands, ctx: &Context) -> Result<()> {
    match cmd {
        RowCommands::Add(args) => run_add(args, ctx),
        RowCommands::Edit(args) => run_edit(args, ctx),
        RowCommands::Remove(args) => run_remove(args, ctx),
        RowCommands::Move(args) => run_move(args, ctx),
    }
}

fn run_add(args: AddArgs, ctx: &Context) -> Result<()> {
    let mut stackup = ctx.load_or_new()?;

    let contributor = Contributor {
        description: args.description,
        nominal: args.nominal,
        direction: args.direction,
        tol: Tolerance::from_input(&args.tol),
        tol_type: args.tol_type,
        cpk: args.cpk,
        float_shifted: args.float_shifted,
    };
    let summary = describe(&contributor);
    stackup.add_contributor(contributor);
    let item = stackup.contributor_count();
    ctx.save(&mut stackup)?;

    if print_structured(&stackup.stack_data[item - 1], ctx.format)? {
        return Ok(());
    }
    println!(
        "{} Added item {} {}",
        style("✓").green(),
        style(item).cyan(),
        summary
    );
    Ok(())
}

fn run_edit(args: EditArgs, ctx: &Context) -> Result<()> {
    let mut stackup = ctx.load()?;
    let row = stackup.contributor_mut(args.item).into_diagnostic()?;

    if let Some(description) = args.description {
        row.description = description;
    }
    if let Some(nominal) = args.nominal {
        row.nominal = nominal;
    }
    if let Some(direction) = args.direction {
        row.direction = direction;
    }
    if let Some(tol) = args.tol {
        row.tol = Tolerance::from_input(&tol);
    }
    if let Some(tol_type) = args.tol_type {
        row.tol_type = tol_type;
    }
    if let Some(cpk) = args.cpk {
        row.cpk = Some(cpk);
    }
    if args.clear_cpk {
        row.cpk = None;
    }
    if let Some(float_shifted) = args.float_shifted {
        row.float_shifted = float_shifted;
    }
    let summary = describe(row);
    let updated = row.clone();

    ctx.save(&mut stackup)?;

    if print_structured(&updated, ctx.format)? {
        return Ok(());
    }
    println!(
        "{} Updated item {} {}",
        style("✓").green(),
        style(args.item).cyan(),
        summary
    );
    Ok(())
}

fn run_remove(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let mut stackup = ctx.load()?;
    let removed = stackup.remove_contributor(args.item).into_diagnostic()?;
    ctx.save(&mut stackup)?;

    if print_structured(&removed, ctx.format)? {
        return Ok(());
    }
    println!(
        "{} Removed item {} {}",
        style("✓").green(),
        style(args.item).cyan(),
        style(removed.display_name()).dim()
    );
    Ok(())
}

fn run_move(args: MoveArgs, ctx: &Context) -> Result<()> {
    let mut stackup = ctx.load()?;
    stackup.move_contributor(args.from, args.to).into_diagnostic()?;
    ctx.save(&mut stackup)?;

    println!(
        "{} Moved item {} to position {}",
        style("✓").green(),
        style(args.from).cyan(),
        style(args.to).cyan()
    );
    Ok(())
}

fn describe(c: &Contributor) -> String {
    let tol = c.tol.to_string();
    format!(
        "{} {}{}{}",
        c.display_name(),
        c.direction,
        c.nominal,
        if tol.is_empty() { String::new() } else { format!(" {}", tol) }
    )
}

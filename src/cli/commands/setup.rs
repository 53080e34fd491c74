//! `tolstack setup` command - analysis setup and settings

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::Result;

use crate::cli::commands::Context;
use crate::cli::helpers::{fmt_opt, parse_switch};
use crate::cli::output::print_structured;
use crate::core::acceptance::{AcceptanceCriterion, Mode};

#[derive(Subcommand, Debug)]
pub enum SetupCommands {
    /// Set the spec limits and nominal target
    Limits(LimitsArgs),

    /// Set the acceptance criterion
    Criterion(CriterionArgs),

    /// Switch between basic and advanced statistical mode
    Mode(ModeArgs),

    /// Edit title, project, part number and other metadata
    Meta(MetaArgs),

    /// Show or hide optional table columns
    Display(DisplayArgs),
}

#[derive(clap::Args, Debug)]
pub struct LimitsArgs {
    /// Lower specification limit
    #[arg(long, allow_hyphen_values = true)]
    pub lsl: Option<f64>,

    /// Upper specification limit
    #[arg(long, allow_hyphen_values = true)]
    pub usl: Option<f64>,

    /// Nominal target
    #[arg(long, allow_hyphen_values = true)]
    pub target: Option<f64>,

    /// Clear all limits before applying the given ones
    #[arg(long)]
    pub clear: bool,
}

#[derive(clap::Args, Debug)]
pub struct CriterionArgs {
    /// worst-case, rss, cpk-1, cpk-1.33, cpk-1.67 or cpk-2
    pub criterion: AcceptanceCriterion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Basic,
    Advanced,
}

#[derive(clap::Args, Debug)]
pub struct ModeArgs {
    pub mode: ModeArg,
}

#[derive(clap::Args, Debug)]
pub struct MetaArgs {
    #[arg(long, short = 't')]
    pub title: Option<String>,

    #[arg(long)]
    pub project: Option<String>,

    #[arg(long)]
    pub part_nr: Option<String>,

    #[arg(long)]
    pub analyst: Option<String>,

    /// Creation date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Name of the critical feature
    #[arg(long)]
    pub feature: Option<String>,

    /// Functional description of the stack
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DisplayArgs {
    /// Tolerance type column (on/off)
    #[arg(long, value_parser = parse_switch)]
    pub tol_type: Option<bool>,

    /// Float-shifted column (on/off)
    #[arg(long, value_parser = parse_switch)]
    pub float_shifted: Option<bool>,
}

pub fn run(cmd: SetupCommands, ctx: &Context) -> Result<()> {
    match cmd {
        SetupCommands::Limits(args) => run_limits(args, ctx),
        SetupCommands::Criterion(args) => run_criterion(args, ctx),
        SetupCommands::Mode(args) => run_mode(args, ctx),
        SetupCommands::Meta(args) => run_meta(args, ctx),
        SetupCommands::Display(args) => run_display(args, ctx),
    }
}

fn run_limits(args: LimitsArgs, ctx: &Context) -> Result<()> {
    let mut stackup = ctx.load()?;
    let limits = &mut stackup.analysis_setup.critical_requirement.limits;

    if args.clear {
        *limits = Default::default();
    }
    if args.lsl.is_some() {
        limits.lsl = args.lsl;
    }
    if args.usl.is_some() {
        limits.usl = args.usl;
    }
    if args.target.is_some() {
        limits.nominal_target = args.target;
    }
    let limits = *limits;

    if limits.is_inverted() {
        tracing::warn!(lsl = ?limits.lsl, usl = ?limits.usl, "LSL is above USL");
        eprintln!(
            "{} LSL ({}) is above USL ({}); every limit-based criterion will fail",
            style("!").yellow().bold(),
            fmt_opt(limits.lsl, ctx.precision()),
            fmt_opt(limits.usl, ctx.precision())
        );
    }

    ctx.save(&mut stackup)?;

    if print_structured(&limits, ctx.format)? {
        return Ok(());
    }
    let p = ctx.precision();
    println!(
        "{} Limits: target {} (LSL: {}, USL: {})",
        style("✓").green(),
        fmt_opt(limits.nominal_target, p),
        fmt_opt(limits.lsl, p),
        fmt_opt(limits.usl, p)
    );
    Ok(())
}

fn run_criterion(args: CriterionArgs, ctx: &Context) -> Result<()> {
    let mut stackup = ctx.load()?;
    let criterion = args.criterion;
    let mode = stackup.mode();

    if criterion.mode() != mode {
        return Err(miette::miette!(
            help = format!(
                "run `tolstack setup mode {}` first, or pick one of: {}",
                criterion.mode(),
                mode.criteria().iter().map(|c| c.key()).collect::<Vec<_>>().join(", ")
            ),
            "criterion {} is not available in {} mode",
            criterion,
            mode
        ));
    }

    stackup.analysis_setup.critical_requirement.acceptance_criteria = Some(criterion);
    ctx.save(&mut stackup)?;

    println!(
        "{} Criterion: {} ({})",
        style("✓").green(),
        style(criterion).yellow(),
        criterion.describe()
    );
    Ok(())
}

fn run_mode(args: ModeArgs, ctx: &Context) -> Result<()> {
    let mut stackup = ctx.load()?;
    let previous = stackup.effective_criterion();
    let criterion = stackup.set_advanced_mode(args.mode == ModeArg::Advanced);
    ctx.save(&mut stackup)?;

    let mode = stackup.mode();
    println!(
        "{} Mode: {}  Criterion: {}",
        style("✓").green(),
        style(mode).yellow(),
        style(criterion).yellow()
    );
    if previous != criterion {
        println!(
            "   {}",
            style(format!("criterion changed from {} to {}", previous, criterion)).dim()
        );
    }
    if mode == Mode::Advanced {
        println!(
            "   {}",
            style("contributors without a Cpk use 1.33").dim()
        );
    }
    Ok(())
}

fn run_meta(args: MetaArgs, ctx: &Context) -> Result<()> {
    let mut stackup = ctx.load()?;
    let setup = &mut stackup.analysis_setup;

    let updates = [
        (args.title, &mut setup.metadata.title),
        (args.project, &mut setup.metadata.project),
        (args.part_nr, &mut setup.metadata.part_nr),
        (args.analyst, &mut setup.metadata.analyst),
        (args.date, &mut setup.metadata.creation_date),
        (args.feature, &mut setup.critical_requirement.critical_feature),
        (args.description, &mut setup.assumptions_context.functional_description),
    ];
    let mut changed = 0;
    for (value, field) in updates {
        if let Some(value) = value {
            *field = value;
            changed += 1;
        }
    }

    if changed == 0 {
        return Err(miette::miette!(
            help = "pass at least one of --title, --project, --part-nr, --analyst, --date, --feature, --description",
            "nothing to update"
        ));
    }

    ctx.save(&mut stackup)?;

    if print_structured(&stackup.analysis_setup, ctx.format)? {
        return Ok(());
    }
    println!(
        "{} Updated {} field(s) of {}",
        style("✓").green(),
        changed,
        style(stackup.title()).cyan()
    );
    Ok(())
}

fn run_display(args: DisplayArgs, ctx: &Context) -> Result<()> {
    let mut stackup = ctx.load()?;
    if let Some(on) = args.tol_type {
        stackup.settings.show_tolerance_type = on;
    }
    if let Some(on) = args.float_shifted {
        stackup.settings.show_float_shifted = on;
    }
    ctx.save(&mut stackup)?;

    if print_structured(&stackup.settings, ctx.format)? {
        return Ok(());
    }
    let flag = |on: bool| if on { "on" } else { "off" };
    println!(
        "{} Tolerance type column: {}  Float-shifted column: {}",
        style("✓").green(),
        flag(stackup.settings.show_tolerance_type),
        flag(stackup.settings.show_float_shifted)
    );
    Ok(())
}

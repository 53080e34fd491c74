//! `tolstack show` command - stack setup and contributors

use console::style;
use miette::Result;

use crate::cli::commands::Context;
use crate::cli::helpers::fmt_opt;
use crate::cli::output::{delimiter, print_delimited, print_structured};
use crate::cli::table::contributor_table;
use crate::store::rows::COLUMNS;

pub fn run(ctx: &Context) -> Result<()> {
    let stackup = ctx.load()?;

    if print_structured(&stackup, ctx.format)? {
        return Ok(());
    }

    if let Some(delim) = delimiter(ctx.format) {
        let records = stackup.stack_data.iter().map(|c| {
            vec![
                c.description.clone(),
                c.nominal.to_string(),
                c.direction.to_string(),
                c.tol.cell_text(),
                c.tol_type.to_string(),
                c.cpk.map(|v| v.to_string()).unwrap_or_default(),
                c.float_shifted.to_string(),
            ]
        });
        return print_delimited(delim, &COLUMNS, records);
    }

    let p = ctx.precision();
    let setup = &stackup.analysis_setup;
    let meta = &setup.metadata;
    let req = &setup.critical_requirement;
    let limits = req.limits;

    println!("{}", style(stackup.title()).bold().cyan());
    for (label, value) in [
        ("Project", &meta.project),
        ("Part number", &meta.part_nr),
        ("Analyst", &meta.analyst),
        ("Created", &meta.creation_date),
    ] {
        if !value.trim().is_empty() {
            println!("   {}: {}", style(label).dim(), value);
        }
    }
    if let Some(ts) = stackup.timestamp {
        println!("   {}: {}", style("Saved").dim(), ts.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    println!();
    if !req.critical_feature.trim().is_empty() {
        println!("   Critical feature: {}", style(&req.critical_feature).yellow());
    }
    println!(
        "   Target: {} (LSL: {}, USL: {})",
        fmt_opt(limits.nominal_target, p),
        fmt_opt(limits.lsl, p),
        fmt_opt(limits.usl, p)
    );
    if limits.is_inverted() {
        println!(
            "   {} LSL is above USL",
            style("!").yellow().bold()
        );
    }
    let criterion = stackup.effective_criterion();
    println!(
        "   Mode: {}  Criterion: {} ({})",
        style(stackup.mode()).yellow(),
        style(criterion).yellow(),
        criterion.describe()
    );

    let description = setup.assumptions_context.functional_description.trim();
    if !description.is_empty() {
        println!();
        println!("   {}", style("Functional description").bold());
        for line in description.lines() {
            println!("     {}", line);
        }
    }

    println!();
    if stackup.stack_data.is_empty() {
        println!("   No contributors. Add one with `tolstack row add`.");
    } else {
        println!("{}", contributor_table(&stackup, p));
    }

    Ok(())
}

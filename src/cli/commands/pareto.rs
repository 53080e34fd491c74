//! `tolstack pareto` command - ranked variance contributions

use console::style;
use miette::Result;

use crate::cli::commands::Context;
use crate::cli::output::{delimiter, print_delimited, print_structured};
use crate::cli::viz;
use crate::core::pareto::{ParetoClass, VITAL_FEW_LIMIT};

/// Description column width in the bar chart
const NAME_WIDTH: usize = 24;

pub fn run(ctx: &Context) -> Result<()> {
    let stackup = ctx.load()?;
    let report = stackup.analyze();
    let pareto = &report.pareto;

    if print_structured(pareto, ctx.format)? {
        return Ok(());
    }

    if let Some(delim) = delimiter(ctx.format) {
        let records = pareto.entries().iter().enumerate().map(|(rank, e)| {
            vec![
                (rank + 1).to_string(),
                (e.original_index + 1).to_string(),
                e.description.clone(),
                e.percent.to_string(),
                e.cumulative_percent.to_string(),
                e.class.to_string(),
            ]
        });
        return print_delimited(
            delim,
            &["rank", "item", "description", "percent", "cumulative_percent", "class"],
            records,
        );
    }

    println!(
        "{} Pareto of {} ({} contributors)",
        style("⚙").cyan(),
        style(stackup.title()).cyan(),
        report.stack.count
    );
    println!();

    if pareto.is_empty() {
        println!("   No variance to rank. Add contributors with non-zero tolerances.");
        return Ok(());
    }

    let bars = viz::render_pareto_bars(pareto, NAME_WIDTH);
    for ((class, line), e) in bars.iter().zip(pareto.entries()) {
        let pct = format!("{:5.1}%  (cum {:5.1}%)", e.percent, e.cumulative_percent);
        match class {
            ParetoClass::VitalFew => println!("   {} {}", style(line).red(), style(pct).bold()),
            ParetoClass::TrivialMany => println!("   {} {}", style(line).dim(), pct),
        }
    }

    let vital: Vec<_> = pareto.vital_few().collect();
    println!();
    println!(
        "   {} {} of {} contributor(s) make up the first {:.0}% of variance",
        style("Vital few:").bold(),
        vital.len(),
        pareto.entries().len(),
        VITAL_FEW_LIMIT
    );

    if let Some(curve) = viz::render_cumulative_curve(pareto, viz::CURVE_WIDTH, viz::CURVE_HEIGHT) {
        println!();
        println!(
            "   {} (dotted line at {:.0}%):",
            style("Cumulative share").bold(),
            VITAL_FEW_LIMIT
        );
        for line in curve.lines() {
            println!("   {}", line);
        }
    }

    Ok(())
}

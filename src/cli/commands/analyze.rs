//! `tolstack analyze` command - worst-case, RSS and capability analysis

use console::style;
use miette::Result;

use crate::cli::commands::Context;
use crate::cli::helpers::{fmt_num, fmt_opt, styled_percent, styled_verdict, truncate_str};
use crate::cli::output::{delimiter, print_delimited, print_structured};
use crate::cli::viz;
use crate::core::acceptance::{Unjudged, Verdict};
use crate::core::analysis::AnalysisReport;
use crate::core::stack::{effective_cpk, row_variance};
use crate::entities::stackup::Stackup;

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Include the variance contribution of each contributor
    #[arg(long, short = 'p')]
    pub pareto: bool,

    /// Print a per-contributor calculation trace
    #[arg(long)]
    pub debug: bool,

    /// Exit with an error when the stack fails its acceptance criterion
    #[arg(long)]
    pub check: bool,
}

pub fn run(args: AnalyzeArgs, ctx: &Context) -> Result<()> {
    let stackup = ctx.load()?;
    let report = stackup.analyze();

    if args.debug && ctx.format == crate::cli::OutputFormat::Auto {
        print_trace(&stackup, ctx.precision());
    }

    if !print_structured(&report, ctx.format)? {
        if let Some(delim) = delimiter(ctx.format) {
            print_delimited(delim, &["metric", "value"], metric_rows(&report))?;
        } else {
            print_summary(&stackup, &report, args.pareto, ctx.precision());
        }
    }

    if args.check && report.judgement.verdict == Verdict::Fail {
        return Err(miette::miette!(
            "stack fails acceptance criterion {}",
            report.judgement.criterion
        ));
    }

    Ok(())
}

/// Flat metric/value pairs for delimited output
fn metric_rows(report: &AnalysisReport) -> Vec<[String; 2]> {
    let s = &report.stack;
    let c = &report.capability;
    let (wc_min, wc_max) = s.worst_case_range();
    let (rss_min, rss_max) = s.rss_range();
    let (s3_min, s3_max) = s.sigma_range(3.0);
    let (s6_min, s6_max) = s.sigma_range(6.0);
    let opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();

    vec![
        ["contributors".into(), s.count.to_string()],
        ["stack_mean".into(), s.stack_mean.to_string()],
        ["worst_case".into(), s.worst_case.to_string()],
        ["worst_case_min".into(), wc_min.to_string()],
        ["worst_case_max".into(), wc_max.to_string()],
        ["rss".into(), s.rss.to_string()],
        ["rss_min".into(), rss_min.to_string()],
        ["rss_max".into(), rss_max.to_string()],
        ["stack_sigma".into(), s.stack_sigma.to_string()],
        ["sigma3_min".into(), s3_min.to_string()],
        ["sigma3_max".into(), s3_max.to_string()],
        ["sigma6_min".into(), s6_min.to_string()],
        ["sigma6_max".into(), s6_max.to_string()],
        ["cp".into(), opt(c.cp)],
        ["cpk".into(), opt(c.cpk)],
        ["z_upper".into(), opt(c.z_upper)],
        ["z_lower".into(), opt(c.z_lower)],
        ["sigma_level".into(), opt(c.sigma_level)],
        ["percent_out_of_spec".into(), opt(c.percent_out_of_spec)],
        ["dpmo".into(), opt(c.dpmo)],
        ["criterion".into(), report.judgement.criterion.to_string()],
        ["verdict".into(), report.judgement.verdict.to_string()],
    ]
}

fn print_trace(stackup: &Stackup, p: usize) {
    println!("{}", style("=== Calculation Trace ===").yellow().bold());
    let mut running_mean = 0.0;
    for (i, c) in stackup.stack_data.iter().enumerate() {
        let n = c.normalized();
        let contribution = n.nominal_adj * c.direction.sign();
        running_mean += contribution;
        println!(
            "  [{}] {} | dir={} | nominal={} | adj_nominal={} | tol_adj={} | cpk={:.2} | variance={:.6e} | running_mean={}",
            i + 1,
            c.display_name(),
            c.direction,
            fmt_num(c.nominal, p),
            fmt_num(n.nominal_adj, p),
            fmt_num(n.tol_adj, p),
            effective_cpk(c.cpk),
            row_variance(&n, c.cpk),
            fmt_num(running_mean, p)
        );
    }
    println!("{}", style("=== End Trace ===").yellow().bold());
    println!();
}

fn print_summary(stackup: &Stackup, report: &AnalysisReport, show_pareto: bool, p: usize) {
    let s = &report.stack;
    let c = &report.capability;
    let limits = report.limits;

    println!(
        "{} Analysis of {} ({} contributors, {} mode)",
        style("⚙").cyan(),
        style(stackup.title()).cyan(),
        s.count,
        report.mode
    );
    println!();
    println!(
        "   Target: {} (LSL: {}, USL: {})",
        fmt_opt(limits.nominal_target, p),
        fmt_opt(limits.lsl, p),
        fmt_opt(limits.usl, p)
    );
    println!("   Stack mean: {}", style(fmt_num(s.stack_mean, p)).bold());

    let (wc_min, wc_max) = s.worst_case_range();
    println!();
    println!("   {}:", style("Worst-Case").bold());
    println!(
        "     ±{}  Range: {} to {}",
        fmt_num(s.worst_case, p),
        fmt_num(wc_min, p),
        fmt_num(wc_max, p)
    );
    println!("     {}", viz::render_range_bar(wc_min, wc_max, limits.lsl, limits.usl));

    let (rss_min, rss_max) = s.rss_range();
    println!();
    println!("   {}:", style("RSS").bold());
    println!(
        "     ±{}  Range: {} to {}",
        fmt_num(s.rss, p),
        fmt_num(rss_min, p),
        fmt_num(rss_max, p)
    );
    println!("     {}", viz::render_range_bar(rss_min, rss_max, limits.lsl, limits.usl));

    let (s3_min, s3_max) = s.sigma_range(3.0);
    let (s6_min, s6_max) = s.sigma_range(6.0);
    println!();
    println!("   {}:", style("Statistical (Cpk-weighted)").bold());
    println!("     σ: {}", fmt_num(s.stack_sigma, p));
    println!("     ±3σ: {} to {}", fmt_num(s3_min, p), fmt_num(s3_max, p));
    println!("     ±6σ: {} to {}", fmt_num(s6_min, p), fmt_num(s6_max, p));
    println!("     {}", viz::render_range_bar(s3_min, s3_max, limits.lsl, limits.usl));

    if c.cpk.is_some() {
        println!();
        println!("   {}:", style("Capability").bold());
        let centering = match (c.cp, c.cpk) {
            (Some(cp), Some(cpk)) if cp > 0.0 && (cp - cpk).abs() > 0.1 => {
                format!(" (centering loss: {:.0}%)", (1.0 - cpk / cp) * 100.0)
            }
            _ => String::new(),
        };
        println!(
            "     Cp={}, Cpk={}{}",
            c.cp.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "N/A".into()),
            c.cpk.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "N/A".into()),
            centering
        );
        println!(
            "     Z upper: {}  Z lower: {}  Sigma level: {}",
            fmt_opt(c.z_upper, 2),
            fmt_opt(c.z_lower, 2),
            fmt_opt(c.sigma_level, 2)
        );
        println!(
            "     Out of spec: {}%  DPMO: {}",
            fmt_opt(c.percent_out_of_spec, 4),
            fmt_opt(c.dpmo, 1)
        );
        if let Some(shifted) = c.shifted_mean {
            println!("     Shifted mean (1.5σ drift): {}", fmt_num(shifted, p));
        }
    }

    let judgement = report.judgement;
    println!();
    println!(
        "   {}: {} ({})",
        style("Acceptance").bold(),
        style(judgement.criterion).yellow(),
        judgement.criterion.describe()
    );
    println!("     Result: {}", styled_verdict(judgement.verdict));
    match judgement.reason {
        Some(Unjudged::MissingLimits) => println!(
            "     {}",
            style("Set spec limits with `tolstack setup limits`").dim()
        ),
        Some(Unjudged::ZeroSigma) => println!(
            "     {}",
            style("Stack sigma is zero, Cpk undefined. Add tolerances to the contributors").dim()
        ),
        None => {}
    }

    if show_pareto {
        println!();
        println!(
            "   {} (Variance Contribution):",
            style("Sensitivity Analysis").bold()
        );
        if report.pareto.is_empty() {
            println!("     No variance to rank.");
        }
        for e in report.pareto.entries() {
            let bar_len = ((e.percent / 100.0) * 30.0).round() as usize;
            println!(
                "     {} {} {}",
                styled_percent(e.percent),
                "█".repeat(bar_len),
                truncate_str(&e.description, 40)
            );
        }
    }
}

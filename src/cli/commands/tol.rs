//! `tolstack tol` command - normalize one tolerance entry

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::commands::Context;
use crate::cli::helpers::fmt_num;
use crate::cli::output::{delimiter, print_delimited, print_structured};
use crate::core::tolerance::{Normalized, Tolerance};

#[derive(clap::Args, Debug)]
pub struct TolArgs {
    /// Tolerance text, e.g. 0.1 or "10 +0.3/-0.1"
    #[arg(allow_hyphen_values = true)]
    pub text: String,

    /// Nominal the tolerance applies to
    #[arg(long, short = 'n', allow_hyphen_values = true, default_value_t = 0.0)]
    pub nominal: f64,
}

#[derive(Debug, Serialize)]
struct TolOutput<'a> {
    input: &'a str,
    kind: &'static str,
    nominal: f64,
    #[serde(flatten)]
    normalized: Normalized,
}

pub fn run(args: TolArgs, ctx: &Context) -> Result<()> {
    let tol = Tolerance::from_input(&args.text);
    let normalized = tol.normalize(args.nominal);
    let kind = match tol {
        Tolerance::Empty | Tolerance::Flag(_) => "empty",
        Tolerance::Numeric(_) => "symmetric",
        Tolerance::Asymmetric { .. } => "asymmetric",
        Tolerance::Raw { value: Some(_), .. } => "text",
        Tolerance::Raw { value: None, .. } => "unparseable",
    };

    let output = TolOutput {
        input: &args.text,
        kind,
        nominal: args.nominal,
        normalized,
    };
    if print_structured(&output, ctx.format)? {
        return Ok(());
    }
    if let Some(delim) = delimiter(ctx.format) {
        return print_delimited(
            delim,
            &["input", "kind", "nominal", "nominal_adj", "tol_adj"],
            [[
                args.text.clone(),
                kind.to_string(),
                args.nominal.to_string(),
                normalized.nominal_adj.to_string(),
                normalized.tol_adj.to_string(),
            ]],
        );
    }

    let p = ctx.precision();
    println!("   Input: {} ({})", style(&args.text).cyan(), kind);
    println!(
        "   Adjusted nominal: {}  Tolerance: ±{}",
        style(fmt_num(normalized.nominal_adj, p)).bold(),
        style(fmt_num(normalized.tol_adj, p)).bold()
    );
    if kind == "unparseable" {
        println!("   {}", style("no number found; counts as zero tolerance").yellow());
    }
    Ok(())
}

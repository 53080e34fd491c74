//! Shared helper functions for CLI commands

use console::{style, StyledObject};

use crate::core::acceptance::Verdict;

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a value with a fixed number of decimals
pub fn fmt_num(value: f64, precision: usize) -> String {
    format!("{:.*}", precision, value)
}

/// Format an optional value, showing "N/A" when absent
pub fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| fmt_num(v, precision))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Verdict styled for the terminal
pub fn styled_verdict(verdict: Verdict) -> StyledObject<&'static str> {
    match verdict {
        Verdict::Pass => style("PASS").green().bold(),
        Verdict::Fail => style("FAIL").red().bold(),
        Verdict::Indeterminate => style("N/A").yellow(),
    }
}

/// Percentage styled by how much of the variance it carries
pub fn styled_percent(pct: f64) -> StyledObject<String> {
    let text = format!("{:5.1}%", pct);
    if pct >= 50.0 {
        style(text).red().bold()
    } else if pct >= 25.0 {
        style(text).yellow()
    } else {
        style(text).dim()
    }
}

/// Parse an on/off style flag value
pub fn parse_switch(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected on or off, got '{}'", other)),
    }
}

//! Terminal visualization of stack results
//!
//! Range bars show a result band against the spec limits. The Pareto view
//! pairs horizontal share bars with a braille cumulative curve.

use drawille::Canvas;

use crate::cli::helpers::truncate_str;
use crate::core::pareto::{Pareto, ParetoClass, VITAL_FEW_LIMIT};

/// Width of a range bar in characters
pub const BAR_WIDTH: usize = 60;

/// Longest share bar, at 100%
pub const PARETO_BAR_WIDTH: usize = 30;

/// Canvas size for the cumulative curve, in braille dots
pub const CURVE_WIDTH: u32 = 120;
pub const CURVE_HEIGHT: u32 = 40;

/// Render a 1D range bar for `[min, max]` against optional spec limits
///
/// ```text
///   ──────│────[════════]─────│──────
/// ```
pub fn render_range_bar(min: f64, max: f64, lsl: Option<f64>, usl: Option<f64>) -> String {
    let width = BAR_WIDTH;

    // view spans the band and any limits, with 10% margin
    let mut low = min;
    let mut high = max;
    for limit in [lsl, usl].into_iter().flatten() {
        low = low.min(limit);
        high = high.max(limit);
    }
    let span = high - low;
    let margin = if span > 0.0 { span * 0.1 } else { low.abs().max(1.0) * 0.1 };
    let view_min = low - margin;
    let view_range = (high + margin) - view_min;

    let pos = |v: f64| -> usize {
        let p = ((v - view_min) / view_range * width as f64).round();
        if p.is_finite() && p > 0.0 {
            (p as usize).min(width - 1)
        } else {
            0
        }
    };

    let mut bar: Vec<char> = vec!['─'; width];

    let limit_positions: Vec<usize> = [lsl, usl].into_iter().flatten().map(pos).collect();
    for &p in &limit_positions {
        bar[p] = '│';
    }

    let (pos_min, pos_max) = (pos(min), pos(max));
    for cell in bar.iter_mut().take(pos_max + 1).skip(pos_min) {
        *cell = if *cell == '│' { '╋' } else { '═' };
    }
    bar[pos_min] = if limit_positions.contains(&pos_min) { '╟' } else { '[' };
    bar[pos_max] = if limit_positions.contains(&pos_max) { '╢' } else { ']' };

    bar.into_iter().collect()
}

/// Horizontal share bars, one line per ranked contributor
pub fn render_pareto_bars(pareto: &Pareto, name_width: usize) -> Vec<(ParetoClass, String)> {
    pareto
        .entries()
        .iter()
        .map(|e| {
            let bar_len = ((e.percent / 100.0) * PARETO_BAR_WIDTH as f64).round() as usize;
            let bar = format!(
                "{:<width$}",
                "█".repeat(bar_len.min(PARETO_BAR_WIDTH)),
                width = PARETO_BAR_WIDTH
            );
            let name = format!(
                "#{:<3} {:<w$}",
                e.original_index + 1,
                truncate_str(&e.description, name_width),
                w = name_width
            );
            (e.class, format!("{} {}", name, bar))
        })
        .collect()
}

/// Braille plot of the cumulative share, with the vital-few threshold dotted
pub fn render_cumulative_curve(pareto: &Pareto, width: u32, height: u32) -> Option<String> {
    let entries = pareto.entries();
    if entries.is_empty() {
        return None;
    }

    let mut canvas = Canvas::new(width, height);
    let max_y = height.saturating_sub(1) as f64;
    let to_y = |pct: f64| (max_y - (pct.clamp(0.0, 100.0) / 100.0) * max_y).round() as u32;

    // threshold line
    let threshold_y = to_y(VITAL_FEW_LIMIT);
    for x in (0..width).step_by(4) {
        canvas.set(x, threshold_y);
    }

    // axes
    for y in 0..height {
        canvas.set(0, y);
    }
    for x in 0..width {
        canvas.set(x, height.saturating_sub(1));
    }

    // curve from origin through each cumulative point
    let step = (width.saturating_sub(1)) as f64 / entries.len() as f64;
    let mut prev = (0.0, to_y(0.0) as f64);
    for (i, e) in entries.iter().enumerate() {
        let next = ((i + 1) as f64 * step, to_y(e.cumulative_percent) as f64);
        draw_line(&mut canvas, prev, next);
        prev = next;
    }

    Some(canvas.frame())
}

fn draw_line(canvas: &mut Canvas, from: (f64, f64), to: (f64, f64)) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as usize;
    for s in 0..=steps {
        let t = s as f64 / steps as f64;
        let x = from.0 + (to.0 - from.0) * t;
        let y = from.1 + (to.1 - from.1) * t;
        canvas.set(x.round().max(0.0) as u32, y.round().max(0.0) as u32);
    }
}

//! Pareto ranking of contributors by share of stack variance

use std::fmt;

use serde::Serialize;

use crate::core::stack::row_variance;
use crate::entities::stackup::Contributor;

/// Cumulative share up to which contributors count as the vital few
pub const VITAL_FEW_LIMIT: f64 = 80.0;

/// Pareto class of a ranked contributor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParetoClass {
    VitalFew,
    TrivialMany,
}

impl fmt::Display for ParetoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParetoClass::VitalFew => write!(f, "vital few"),
            ParetoClass::TrivialMany => write!(f, "trivial many"),
        }
    }
}

/// One ranked contributor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoEntry {
    pub description: String,

    /// Share of total variance, 0..=100
    pub percent: f64,

    /// Running total including this entry
    pub cumulative_percent: f64,

    /// Position in the contributor list (0-based)
    pub original_index: usize,

    pub class: ParetoClass,
}

/// Ranked contributions, or nothing to rank
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "entries", rename_all = "snake_case")]
pub enum Pareto {
    /// Total variance is zero; there is no contribution to show
    NoData,
    Ranked(Vec<ParetoEntry>),
}

impl Pareto {
    pub fn entries(&self) -> &[ParetoEntry] {
        match self {
            Pareto::NoData => &[],
            Pareto::Ranked(entries) => entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Entries classed as vital few
    pub fn vital_few(&self) -> impl Iterator<Item = &ParetoEntry> {
        self.entries()
            .iter()
            .filter(|e| e.class == ParetoClass::VitalFew)
    }
}

/// Rank contributors by variance share, largest first
///
/// Equal shares keep list order, so item numbers stay deterministic.
pub fn rank(contributors: &[Contributor], total_variance: f64) -> Pareto {
    if !(total_variance > 0.0 && total_variance.is_finite()) {
        return Pareto::NoData;
    }

    let mut entries: Vec<ParetoEntry> = contributors
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let percent = row_variance(&c.normalized(), c.cpk) / total_variance * 100.0;
            ParetoEntry {
                description: c.display_name().to_string(),
                percent: if percent.is_finite() { percent } else { 0.0 },
                cumulative_percent: 0.0,
                original_index: i,
                class: ParetoClass::TrivialMany,
            }
        })
        .collect();

    // sort_by is stable
    entries.sort_by(|a, b| b.percent.total_cmp(&a.percent));

    let mut cumulative = 0.0;
    for entry in &mut entries {
        cumulative += entry.percent;
        entry.cumulative_percent = cumulative;
        entry.class = if cumulative <= VITAL_FEW_LIMIT {
            ParetoClass::VitalFew
        } else {
            ParetoClass::TrivialMany
        };
    }

    Pareto::Ranked(entries)
}

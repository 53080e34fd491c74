//! Stack aggregation - worst-case, RSS and capability-weighted variance
//!
//! Every pass is a full recomputation over the contributor slice. Sums are
//! commutative, so row order only matters for display and Pareto tie-breaks.

use serde::Serialize;

use crate::core::tolerance::Normalized;
use crate::entities::stackup::Contributor;

/// Process capability assumed for a row with no usable Cpk
pub const DEFAULT_CPK: f64 = 1.33;

/// Cpk actually used for a row: the entered value when present, finite and
/// non-zero, otherwise [`DEFAULT_CPK`]
pub fn effective_cpk(cpk: Option<f64>) -> f64 {
    match cpk {
        Some(c) if c.is_finite() && c != 0.0 => c,
        _ => DEFAULT_CPK,
    }
}

/// Variance of one row: σ = tol_adj / (3·Cpk)
///
/// Shared by the aggregator and the Pareto ranker so both always agree.
pub fn row_variance(normalized: &Normalized, cpk: Option<f64>) -> f64 {
    let sigma = normalized.tol_adj / (3.0 * effective_cpk(cpk));
    sigma * sigma
}

/// Aggregated stack result
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StackResult {
    /// Signed sum of adjusted nominals
    pub stack_mean: f64,

    /// Sum of tolerance widths
    pub worst_case: f64,

    /// Root sum square of tolerance widths
    pub rss: f64,

    /// Square root of the capability-weighted variance
    pub stack_sigma: f64,

    /// Σσᵢ², the denominator for Pareto contributions
    pub total_variance: f64,

    /// Number of contributors aggregated
    pub count: usize,
}

impl StackResult {
    /// `mean ± k·σ`
    pub fn sigma_range(&self, k: f64) -> (f64, f64) {
        (
            self.stack_mean - k * self.stack_sigma,
            self.stack_mean + k * self.stack_sigma,
        )
    }

    /// `mean ± worst_case`
    pub fn worst_case_range(&self) -> (f64, f64) {
        (
            self.stack_mean - self.worst_case,
            self.stack_mean + self.worst_case,
        )
    }

    /// `mean ± rss`
    pub fn rss_range(&self) -> (f64, f64) {
        (self.stack_mean - self.rss, self.stack_mean + self.rss)
    }
}

/// Aggregate all contributors into a [`StackResult`]
pub fn aggregate(contributors: &[Contributor]) -> StackResult {
    let mut stack_mean = 0.0;
    let mut worst_case = 0.0;
    let mut rss_accum = 0.0;
    let mut variance = 0.0;

    for (i, contrib) in contributors.iter().enumerate() {
        let normalized = contrib.normalized();
        let contribution = normalized.nominal_adj * contrib.direction.sign();
        let row_var = row_variance(&normalized, contrib.cpk);

        stack_mean += contribution;
        worst_case += normalized.tol_adj;
        rss_accum += normalized.tol_adj * normalized.tol_adj;
        variance += row_var;

        tracing::debug!(
            item = i + 1,
            description = %contrib.description,
            direction = %contrib.direction,
            nominal_adj = normalized.nominal_adj,
            tol_adj = normalized.tol_adj,
            cpk = effective_cpk(contrib.cpk),
            contribution,
            running_mean = stack_mean,
            "aggregated row"
        );
    }

    let result = StackResult {
        stack_mean,
        worst_case,
        rss: rss_accum.sqrt(),
        stack_sigma: variance.sqrt(),
        total_variance: variance,
        count: contributors.len(),
    };

    tracing::debug!(
        mean = result.stack_mean,
        worst_case = result.worst_case,
        rss = result.rss,
        sigma = result.stack_sigma,
        "stack aggregated"
    );

    result
}

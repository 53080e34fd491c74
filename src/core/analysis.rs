//! Full analysis pass over a stack snapshot
//!
//! Aggregation, capability, acceptance and Pareto ranking run in sequence on
//! borrowed input. Nothing is cached between passes.

use serde::Serialize;

use crate::core::acceptance::{self, AcceptanceCriterion, Judgement, Mode};
use crate::core::capability::{self, Capability};
use crate::core::pareto::{self, Pareto};
use crate::core::stack::{self, StackResult};
use crate::entities::stackup::{Contributor, SpecLimits};

/// Everything computed for one stack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub mode: Mode,
    pub limits: SpecLimits,
    pub stack: StackResult,
    pub capability: Capability,
    pub judgement: Judgement,
    pub pareto: Pareto,
}

/// Run every stage of the analysis
pub fn analyze(
    contributors: &[Contributor],
    limits: &SpecLimits,
    criterion: Option<AcceptanceCriterion>,
    mode: Mode,
) -> AnalysisReport {
    let stack = stack::aggregate(contributors);
    let capability = capability::evaluate(stack.stack_mean, stack.stack_sigma, limits.lsl, limits.usl);
    let judgement = acceptance::judge(mode, criterion, &stack, &capability, limits.lsl, limits.usl);
    let pareto = pareto::rank(contributors, stack.total_variance);

    tracing::debug!(
        contributors = contributors.len(),
        criterion = %judgement.criterion,
        verdict = %judgement.verdict,
        "analysis complete"
    );

    AnalysisReport {
        mode,
        limits: *limits,
        stack,
        capability,
        judgement,
        pareto,
    }
}

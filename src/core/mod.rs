//! Core module - the stack-up engine and shared configuration

pub mod acceptance;
pub mod analysis;
pub mod capability;
pub mod config;
pub mod pareto;
pub mod stack;
pub mod tolerance;

pub use acceptance::{judge, reconcile, AcceptanceCriterion, Judgement, Mode, Unjudged, Verdict};
pub use analysis::{analyze, AnalysisReport};
pub use capability::{evaluate, normal_cdf, Capability};
pub use config::{Config, ConfigError};
pub use pareto::{rank, Pareto, ParetoClass, ParetoEntry};
pub use stack::{aggregate, effective_cpk, row_variance, StackResult, DEFAULT_CPK};
pub use tolerance::{normalize, Normalized, Tolerance};

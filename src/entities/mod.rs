//! Entity type definitions

pub mod stackup;

pub use stackup::{
    AnalysisSetup, Contributor, CriticalRequirement, Direction, Metadata, RowError, Settings,
    SpecLimits, Stackup, ToleranceType,
};

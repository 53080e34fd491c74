//! Acceptance judgement against the configured criterion
//!
//! Mode and criterion are stored independently, so the criterion is
//! reconciled with the mode on every judgement, not only when the mode flips.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::capability::Capability;
use crate::core::stack::StackResult;

/// Statistical mode of the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Worst-case / RSS criteria
    #[default]
    Basic,
    /// Cpk criteria
    Advanced,
}

impl Mode {
    pub fn from_advanced(advanced: bool) -> Self {
        if advanced {
            Mode::Advanced
        } else {
            Mode::Basic
        }
    }

    /// Criterion selected when the stored one does not fit this mode
    pub fn default_criterion(self) -> AcceptanceCriterion {
        match self {
            Mode::Basic => AcceptanceCriterion::WorstCase,
            Mode::Advanced => AcceptanceCriterion::Cpk133,
        }
    }

    /// Criteria offered in this mode, in menu order
    pub fn criteria(self) -> &'static [AcceptanceCriterion] {
        match self {
            Mode::Basic => &[AcceptanceCriterion::WorstCase, AcceptanceCriterion::Rss],
            Mode::Advanced => &[
                AcceptanceCriterion::Cpk1,
                AcceptanceCriterion::Cpk133,
                AcceptanceCriterion::Cpk167,
                AcceptanceCriterion::Cpk2,
            ],
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Basic => write!(f, "basic"),
            Mode::Advanced => write!(f, "advanced"),
        }
    }
}

/// Acceptance criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceCriterion {
    /// Worst-case band must sit inside the limits
    WorstCase,
    /// RSS band must sit inside the limits
    Rss,
    Cpk1,
    Cpk133,
    Cpk167,
    Cpk2,
}

impl AcceptanceCriterion {
    pub const ALL: [AcceptanceCriterion; 6] = [
        AcceptanceCriterion::WorstCase,
        AcceptanceCriterion::Rss,
        AcceptanceCriterion::Cpk1,
        AcceptanceCriterion::Cpk133,
        AcceptanceCriterion::Cpk167,
        AcceptanceCriterion::Cpk2,
    ];

    /// Stored key, as written to the stack file
    pub fn key(self) -> &'static str {
        match self {
            AcceptanceCriterion::WorstCase => "worst-case",
            AcceptanceCriterion::Rss => "rss",
            AcceptanceCriterion::Cpk1 => "cpk-1",
            AcceptanceCriterion::Cpk133 => "cpk-1.33",
            AcceptanceCriterion::Cpk167 => "cpk-1.67",
            AcceptanceCriterion::Cpk2 => "cpk-2",
        }
    }

    /// Mode this criterion belongs to
    pub fn mode(self) -> Mode {
        match self {
            AcceptanceCriterion::WorstCase | AcceptanceCriterion::Rss => Mode::Basic,
            _ => Mode::Advanced,
        }
    }

    /// Minimum Cpk for the advanced criteria
    pub fn cpk_threshold(self) -> Option<f64> {
        match self {
            AcceptanceCriterion::Cpk1 => Some(1.0),
            AcceptanceCriterion::Cpk133 => Some(1.33),
            AcceptanceCriterion::Cpk167 => Some(1.67),
            AcceptanceCriterion::Cpk2 => Some(2.0),
            _ => None,
        }
    }

    /// Human-readable requirement sentence
    pub fn describe(self) -> String {
        match self {
            AcceptanceCriterion::WorstCase => {
                "Worst Case tolerance must be within spec limits".to_string()
            }
            AcceptanceCriterion::Rss => "RSS tolerance must be within spec limits".to_string(),
            other => format!(
                "Must have a Cpk of at least {}",
                other.cpk_threshold().unwrap_or_default()
            ),
        }
    }
}

impl fmt::Display for AcceptanceCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for AcceptanceCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        AcceptanceCriterion::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown acceptance criterion '{}' (expected one of: {})",
                    s,
                    AcceptanceCriterion::ALL.map(|c| c.key()).join(", ")
                )
            })
    }
}

impl Serialize for AcceptanceCriterion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for AcceptanceCriterion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Lenient reader for a stored criterion: empty or unknown values load as unset
pub fn deserialize_criterion<'de, D>(deserializer: D) -> Result<Option<AcceptanceCriterion>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok()))
}

/// Outcome of a judgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
    /// The criterion needs inputs that are missing
    Indeterminate,
}

impl Verdict {
    fn from_bool(pass: bool) -> Self {
        if pass {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    /// `Some(pass)` when the criterion could be evaluated
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Verdict::Pass => Some(true),
            Verdict::Fail => Some(false),
            Verdict::Indeterminate => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Fail => write!(f, "fail"),
            Verdict::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

/// Why a criterion could not be evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Unjudged {
    /// LSL or USL is not set
    MissingLimits,
    /// Limits are set but the stack has no spread, so Cpk is undefined
    ZeroSigma,
}

impl Unjudged {
    pub fn describe(self) -> &'static str {
        match self {
            Unjudged::MissingLimits => "spec limits not set",
            Unjudged::ZeroSigma => "stack sigma is zero, Cpk undefined",
        }
    }
}

impl fmt::Display for Unjudged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Criterion actually applied and its verdict
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Judgement {
    pub criterion: AcceptanceCriterion,
    pub verdict: Verdict,

    /// Set only for an indeterminate verdict
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Unjudged>,
}

/// Bring a stored criterion in line with the active mode
pub fn reconcile(mode: Mode, criterion: Option<AcceptanceCriterion>) -> AcceptanceCriterion {
    match criterion {
        Some(c) if c.mode() == mode => c,
        stale => {
            let fallback = mode.default_criterion();
            if let Some(stale) = stale {
                tracing::debug!(%mode, from = %stale, to = %fallback, "criterion reset for mode");
            }
            fallback
        }
    }
}

/// Judge the stack against the (reconciled) criterion
pub fn judge(
    mode: Mode,
    criterion: Option<AcceptanceCriterion>,
    stack: &StackResult,
    capability: &Capability,
    lsl: Option<f64>,
    usl: Option<f64>,
) -> Judgement {
    let criterion = reconcile(mode, criterion);

    let within = |spread: f64| match (lsl, usl) {
        (Some(l), Some(u)) => Verdict::from_bool(
            stack.stack_mean + spread <= u && stack.stack_mean - spread >= l,
        ),
        _ => Verdict::Indeterminate,
    };

    let verdict = match criterion {
        AcceptanceCriterion::WorstCase => within(stack.worst_case),
        AcceptanceCriterion::Rss => within(stack.rss),
        cpk_criterion => match (capability.cpk, cpk_criterion.cpk_threshold()) {
            (Some(cpk), Some(min)) => Verdict::from_bool(cpk >= min),
            _ => Verdict::Indeterminate,
        },
    };

    let reason = match verdict {
        Verdict::Indeterminate if lsl.is_none() || usl.is_none() => Some(Unjudged::MissingLimits),
        Verdict::Indeterminate => Some(Unjudged::ZeroSigma),
        _ => None,
    };

    Judgement {
        criterion,
        verdict,
        reason,
    }
}

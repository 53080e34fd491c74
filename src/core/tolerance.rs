//! Tolerance entry parsing and normalization
//!
//! A contributor's tolerance cell is free-form, spreadsheet style. It can be a
//! number (symmetric half-width), blank, an asymmetric band written as
//! `"base +plus/-minus"`, or arbitrary text. The cell is classified once when
//! it is ingested; normalization afterwards is a plain match on the variant.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Asymmetric band grammar, e.g. `12.4+0.3/-0.1` or `0 +0.2/-0.1`
static ASYMMETRIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([-+]?[0-9]*\.?[0-9]+)\s*([+-][0-9]*\.?[0-9]+)/([+-][0-9]*\.?[0-9]+)")
        .expect("asymmetric tolerance pattern is valid")
});

/// Leading numeric prefix, read the way a lenient spreadsheet cell is read
static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][-+]?[0-9]+)?")
        .expect("leading number pattern is valid")
});

/// A tolerance cell, classified at ingestion
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Tolerance {
    /// Null or absent
    #[default]
    Empty,

    /// A boolean left in the cell; carries no tolerance
    Flag(bool),

    /// Symmetric half-width entered as a number
    Numeric(f64),

    /// Asymmetric band `base +plus/minus`
    Asymmetric {
        /// Text as entered
        text: String,
        base: f64,
        plus: f64,
        minus: f64,
    },

    /// Any other text; `value` is its leading number, if it has one
    Raw { text: String, value: Option<f64> },
}

/// Symmetric equivalent of a contributor's nominal and tolerance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Normalized {
    /// Nominal after recentring onto the tolerance band
    pub nominal_adj: f64,

    /// Absolute tolerance width, never negative
    pub tol_adj: f64,
}

impl Tolerance {
    /// Classify a text cell
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Tolerance::Empty;
        }

        if let Some(caps) = ASYMMETRIC.captures(trimmed) {
            let number = |i: usize| caps[i].parse::<f64>().ok();
            if let (Some(base), Some(plus), Some(minus)) = (number(1), number(2), number(3)) {
                return Tolerance::Asymmetric {
                    text: text.to_string(),
                    base,
                    plus,
                    minus,
                };
            }
        }

        Tolerance::Raw {
            text: text.to_string(),
            value: leading_number(trimmed),
        }
    }

    /// Classify typed input, keeping plain numbers numeric
    pub fn from_input(text: &str) -> Self {
        match text.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Tolerance::Numeric(v),
            _ => Tolerance::parse(text),
        }
    }

    /// Cell text as typed, without the ± used for display
    pub fn cell_text(&self) -> String {
        match self {
            Tolerance::Empty | Tolerance::Flag(false) => String::new(),
            Tolerance::Flag(true) => "true".to_string(),
            Tolerance::Numeric(v) => v.to_string(),
            Tolerance::Asymmetric { text, .. } | Tolerance::Raw { text, .. } => {
                text.trim().to_string()
            }
        }
    }

    /// True for null, blank or false cells
    pub fn is_empty(&self) -> bool {
        match self {
            Tolerance::Empty | Tolerance::Flag(false) => true,
            Tolerance::Raw { text, .. } => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Reduce to a symmetric equivalent around an adjusted nominal
    ///
    /// Never fails: text without a usable number degrades to zero tolerance.
    /// For the asymmetric form `tol_adj` is the full band `|plus| + |minus|`.
    pub fn normalize(&self, nominal: f64) -> Normalized {
        match self {
            Tolerance::Empty | Tolerance::Flag(_) => Normalized {
                nominal_adj: nominal,
                tol_adj: 0.0,
            },
            Tolerance::Numeric(tol) => Normalized {
                nominal_adj: nominal,
                tol_adj: finite_abs(*tol),
            },
            Tolerance::Asymmetric {
                base, plus, minus, ..
            } => Normalized {
                nominal_adj: base + (plus + minus) / 2.0,
                tol_adj: plus.abs() + minus.abs(),
            },
            Tolerance::Raw { value, .. } => Normalized {
                nominal_adj: nominal,
                tol_adj: value.map(finite_abs).unwrap_or(0.0),
            },
        }
    }
}

/// Normalize a tolerance against a nominal value
pub fn normalize(tol: &Tolerance, nominal: f64) -> Normalized {
    tol.normalize(nominal)
}

fn finite_abs(v: f64) -> f64 {
    if v.is_finite() {
        v.abs()
    } else {
        0.0
    }
}

fn leading_number(s: &str) -> Option<f64> {
    LEADING_NUMBER
        .find(s)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tolerance::Empty | Tolerance::Flag(false) => Ok(()),
            Tolerance::Flag(true) => write!(f, "true"),
            Tolerance::Numeric(v) => write!(f, "±{}", v),
            Tolerance::Asymmetric { text, .. } | Tolerance::Raw { text, .. } => {
                write!(f, "{}", text.trim())
            }
        }
    }
}

impl From<f64> for Tolerance {
    fn from(v: f64) -> Self {
        Tolerance::Numeric(v)
    }
}

impl From<&str> for Tolerance {
    fn from(s: &str) -> Self {
        Tolerance::parse(s)
    }
}

/// Wire shape of a tolerance cell as saved by the stack file
#[derive(Deserialize)]
#[serde(untagged)]
enum ToleranceCell {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl Serialize for Tolerance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tolerance::Empty => serializer.serialize_none(),
            Tolerance::Flag(b) => serializer.serialize_bool(*b),
            Tolerance::Numeric(v) => serializer.serialize_f64(*v),
            Tolerance::Asymmetric { text, .. } | Tolerance::Raw { text, .. } => {
                serializer.serialize_str(text)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Tolerance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let cell = Option::<ToleranceCell>::deserialize(deserializer)?;
        // blank text and booleans are kept as stored so a save writes them back
        Ok(match cell {
            None => Tolerance::Empty,
            Some(ToleranceCell::Number(v)) => Tolerance::Numeric(v),
            Some(ToleranceCell::Text(s)) if s.trim().is_empty() => Tolerance::Raw {
                text: s,
                value: None,
            },
            Some(ToleranceCell::Text(s)) => Tolerance::parse(&s),
            Some(ToleranceCell::Flag(b)) => Tolerance::Flag(b),
        })
    }
}

//! Stackup entity - the saved stack file
//!
//! A stackup is an ordered list of dimensional contributors plus the analysis
//! setup (metadata, critical requirement, acceptance criterion) and display
//! settings. It is stored as flat JSON with camelCase keys. Every field is
//! optional on load; loose cells (numbers typed as text, blank Cpk, unknown
//! criteria) degrade to their defaults instead of failing the load.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::core::acceptance::{deserialize_criterion, AcceptanceCriterion, Mode};
use crate::core::analysis::{self, AnalysisReport};
use crate::core::tolerance::{Normalized, Tolerance};

/// Format version written to new files
pub const FORMAT_VERSION: &str = "1.0";

/// Direction of contributor in stackup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Direction {
    /// Adds to the stack
    #[default]
    Positive,
    /// Subtracts from the stack
    Negative,
    /// Any other stored label, kept verbatim; adds to the stack
    Other(String),
}

impl Direction {
    /// +1.0 or -1.0
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Negative => -1.0,
            _ => 1.0,
        }
    }

    /// Read a stored cell: only a minus sign subtracts
    pub fn from_cell(text: &str) -> Self {
        match text.trim() {
            "" | "+" => Direction::Positive,
            "-" => Direction::Negative,
            _ => Direction::Other(text.to_string()),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Positive => write!(f, "+"),
            Direction::Negative => write!(f, "-"),
            Direction::Other(label) => f.write_str(label),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "+" | "positive" | "pos" => Ok(Direction::Positive),
            "-" | "~" | "negative" | "neg" => Ok(Direction::Negative),
            other => Err(format!("unknown direction '{}' (use + or -)", other)),
        }
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(Value::as_str)
            .map(Direction::from_cell)
            .unwrap_or_default())
    }
}

/// Tolerance type column (display only)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToleranceType {
    #[default]
    Linear,
    Gdt,
    Float,
    /// Unrecognised label from a loaded file, kept verbatim
    Other(String),
}

impl ToleranceType {
    /// Read a stored cell; blank means Linear
    pub fn from_cell(text: &str) -> Self {
        if text.trim().is_empty() {
            return ToleranceType::Linear;
        }
        text.parse()
            .unwrap_or_else(|_| ToleranceType::Other(text.to_string()))
    }
}

impl fmt::Display for ToleranceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToleranceType::Linear => write!(f, "Linear"),
            ToleranceType::Gdt => write!(f, "GD&T"),
            ToleranceType::Float => write!(f, "Float"),
            ToleranceType::Other(label) => f.write_str(label),
        }
    }
}

impl FromStr for ToleranceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(ToleranceType::Linear),
            "gd&t" | "gdt" => Ok(ToleranceType::Gdt),
            "float" => Ok(ToleranceType::Float),
            other => Err(format!(
                "unknown tolerance type '{}' (use Linear, GD&T or Float)",
                other
            )),
        }
    }
}

impl Serialize for ToleranceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ToleranceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(Value::as_str)
            .map(ToleranceType::from_cell)
            .unwrap_or_default())
    }
}

/// Read a number that may have been saved as text, blank or null
fn lenient_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn deserialize_opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(lenient_number(raw.as_ref()))
}

fn deserialize_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(deserialize_opt_f64(deserializer)?.unwrap_or(0.0))
}

fn deserialize_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(raw, Some(Value::Bool(true))))
}

/// Read a whole section, falling back to its default when it is null or
/// has the wrong shape
fn deserialize_section<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|v| T::deserialize(v).ok())
        .unwrap_or_default())
}

/// Read an array section, dropping entries that are not objects
fn deserialize_rows<'de, D>(deserializer: D) -> Result<Vec<Contributor>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = raw else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|v| Contributor::deserialize(v).ok())
        .collect())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc)))
}

/// A contributor to the tolerance stackup
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    /// Contributor name/description
    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: String,

    /// Nominal value
    #[serde(default, deserialize_with = "deserialize_f64")]
    pub nominal: f64,

    /// Direction of contribution
    #[serde(default)]
    pub direction: Direction,

    /// Tolerance cell
    #[serde(default)]
    pub tol: Tolerance,

    #[serde(default)]
    pub tol_type: ToleranceType,

    /// Process capability of this dimension; blank or zero means 1.33
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub cpk: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_flag")]
    pub float_shifted: bool,
}

impl Contributor {
    /// Create a contributor with a default tolerance type and capability
    pub fn new(
        description: impl Into<String>,
        nominal: f64,
        direction: Direction,
        tol: impl Into<Tolerance>,
        cpk: Option<f64>,
    ) -> Self {
        Self {
            description: description.into(),
            nominal,
            direction,
            tol: tol.into(),
            cpk,
            ..Default::default()
        }
    }

    /// Symmetric equivalent of this row's nominal and tolerance
    pub fn normalized(&self) -> Normalized {
        self.tol.normalize(self.nominal)
    }

    /// Description for display; blank rows show as "Unnamed"
    pub fn display_name(&self) -> &str {
        let trimmed = self.description.trim();
        if trimmed.is_empty() {
            "Unnamed"
        } else {
            trimmed
        }
    }
}

/// Spec limits of the critical requirement
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecLimits {
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub nominal_target: Option<f64>,

    /// Lower specification limit
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub lsl: Option<f64>,

    /// Upper specification limit
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub usl: Option<f64>,
}

impl SpecLimits {
    /// Both limits set with LSL above USL
    pub fn is_inverted(&self) -> bool {
        matches!((self.lsl, self.usl), (Some(l), Some(u)) if l > u)
    }
}

/// Analysis metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub project: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub part_nr: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub analyst: String,

    /// ISO date (YYYY-MM-DD)
    #[serde(default, deserialize_with = "deserialize_text")]
    pub creation_date: String,
}

/// The requirement the stack is checked against
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalRequirement {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub critical_feature: String,

    #[serde(flatten)]
    pub limits: SpecLimits,

    /// Stored criterion; unset or stale values are reconciled at analysis time
    #[serde(default, deserialize_with = "deserialize_criterion")]
    pub acceptance_criteria: Option<AcceptanceCriterion>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssumptionsContext {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub functional_description: String,
}

/// Analysis setup block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSetup {
    #[serde(default, deserialize_with = "deserialize_section")]
    pub metadata: Metadata,
    #[serde(default, deserialize_with = "deserialize_section")]
    pub critical_requirement: CriticalRequirement,
    #[serde(default, deserialize_with = "deserialize_section")]
    pub assumptions_context: AssumptionsContext,
}

/// Display and mode settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Cpk inputs and Cpk acceptance criteria
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub advanced_statistical_mode: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub show_float_shifted: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub show_tolerance_type: bool,
}

/// Errors from editing the contributor list
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("item {item} does not exist (stack has {count} contributor(s))")]
    ItemOutOfRange { item: usize, count: usize },
}

/// Stackup entity - contributors, setup and settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stackup {
    /// Format version, carried but never interpreted
    #[serde(default = "default_version", deserialize_with = "deserialize_text")]
    pub version: String,

    /// Last save time
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Contributors, in display order
    #[serde(default, deserialize_with = "deserialize_rows")]
    pub stack_data: Vec<Contributor>,

    /// Drawing annotations, carried through untouched
    #[serde(default, deserialize_with = "deserialize_section")]
    pub annotations: Vec<Value>,

    #[serde(default, deserialize_with = "deserialize_section")]
    pub analysis_setup: AnalysisSetup,

    #[serde(default, deserialize_with = "deserialize_section")]
    pub settings: Settings,

    /// Reference drawing as a data URL, carried through untouched
    #[serde(default, deserialize_with = "deserialize_section")]
    pub canvas_image: Option<String>,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

impl Default for Stackup {
    fn default() -> Self {
        Self {
            version: default_version(),
            timestamp: None,
            stack_data: Vec::new(),
            annotations: Vec::new(),
            analysis_setup: AnalysisSetup::default(),
            settings: Settings::default(),
            canvas_image: None,
        }
    }
}

impl Stackup {
    /// Create a new, empty stackup
    pub fn new(title: impl Into<String>, analyst: impl Into<String>) -> Self {
        let mut stackup = Self::default();
        stackup.analysis_setup.metadata.title = title.into();
        stackup.analysis_setup.metadata.analyst = analyst.into();
        stackup.analysis_setup.metadata.creation_date = Utc::now().format("%Y-%m-%d").to_string();
        stackup
    }

    /// Ten-row demonstration stack
    pub fn sample(title: impl Into<String>, analyst: impl Into<String>) -> Self {
        let mut stackup = Self::new(title, analyst);
        let rows: [(&str, f64, f64, ToleranceType, f64, bool); 10] = [
            ("Base Plate Thickness", 12.5, 0.15, ToleranceType::Linear, 1.33, false),
            ("Spacer Block", 8.3, 0.08, ToleranceType::Linear, 1.67, false),
            ("Housing Height", 25.0, 0.25, ToleranceType::Gdt, 1.33, false),
            ("Bearing Seat Depth", 15.7, 0.12, ToleranceType::Linear, 1.50, true),
            ("Retaining Ring Groove", 6.2, 0.05, ToleranceType::Float, 2.0, false),
            ("Shaft Length", 18.9, 0.18, ToleranceType::Linear, 1.33, false),
            ("Bearing Outer Race", 22.4, 0.22, ToleranceType::Gdt, 1.25, true),
            ("Washer Thickness", 9.6, 0.10, ToleranceType::Linear, 1.67, false),
            ("Cover Plate", 14.1, 0.14, ToleranceType::Float, 1.50, false),
            ("Overall Assembly Height", 30.5, 0.30, ToleranceType::Linear, 1.33, false),
        ];
        for (description, nominal, tol, tol_type, cpk, float_shifted) in rows {
            stackup.add_contributor(Contributor {
                description: description.to_string(),
                nominal,
                direction: Direction::Positive,
                tol: Tolerance::Numeric(tol),
                tol_type,
                cpk: Some(cpk),
                float_shifted,
            });
        }
        stackup
    }

    /// Title from the metadata, or "stack" when blank
    pub fn title(&self) -> &str {
        let title = self.analysis_setup.metadata.title.trim();
        if title.is_empty() {
            "stack"
        } else {
            title
        }
    }

    pub fn mode(&self) -> Mode {
        Mode::from_advanced(self.settings.advanced_statistical_mode)
    }

    pub fn limits(&self) -> SpecLimits {
        self.analysis_setup.critical_requirement.limits
    }

    /// Criterion that will be applied in the current mode
    pub fn effective_criterion(&self) -> AcceptanceCriterion {
        crate::core::acceptance::reconcile(
            self.mode(),
            self.analysis_setup.critical_requirement.acceptance_criteria,
        )
    }

    /// Switch statistical mode and reconcile the stored criterion with it
    pub fn set_advanced_mode(&mut self, advanced: bool) -> AcceptanceCriterion {
        self.settings.advanced_statistical_mode = advanced;
        let criterion = self.effective_criterion();
        self.analysis_setup.critical_requirement.acceptance_criteria = Some(criterion);
        criterion
    }

    /// Add a contributor to the stackup
    pub fn add_contributor(&mut self, contributor: Contributor) {
        self.stack_data.push(contributor);
    }

    /// Get number of contributors
    pub fn contributor_count(&self) -> usize {
        self.stack_data.len()
    }

    fn index_of(&self, item: usize) -> Result<usize, RowError> {
        if item == 0 || item > self.stack_data.len() {
            Err(RowError::ItemOutOfRange {
                item,
                count: self.stack_data.len(),
            })
        } else {
            Ok(item - 1)
        }
    }

    /// Contributor by 1-based item number
    pub fn contributor_mut(&mut self, item: usize) -> Result<&mut Contributor, RowError> {
        let idx = self.index_of(item)?;
        Ok(&mut self.stack_data[idx])
    }

    /// Remove a contributor by 1-based item number
    pub fn remove_contributor(&mut self, item: usize) -> Result<Contributor, RowError> {
        let idx = self.index_of(item)?;
        Ok(self.stack_data.remove(idx))
    }

    /// Move a contributor from one 1-based position to another
    pub fn move_contributor(&mut self, from: usize, to: usize) -> Result<(), RowError> {
        let from_idx = self.index_of(from)?;
        let to_idx = self.index_of(to)?;
        let row = self.stack_data.remove(from_idx);
        self.stack_data.insert(to_idx, row);
        Ok(())
    }

    /// Stamp the save time
    pub fn touch(&mut self) {
        self.timestamp = Some(Utc::now());
    }

    /// Run the full analysis on the current contents
    pub fn analyze(&self) -> AnalysisReport {
        analysis::analyze(
            &self.stack_data,
            &self.limits(),
            self.analysis_setup.critical_requirement.acceptance_criteria,
            self.mode(),
        )
    }
}

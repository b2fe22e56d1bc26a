use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monetary values in exact-arithmetic records.
pub type Money = Decimal;

/// Rates in exact-arithmetic records. Percent unless the field says fraction.
pub type Rate = Decimal;

/// Multiples (e.g., 8.5x EV/EBITDA)
pub type Multiple = Decimal;

/// How loud an advisory warning is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Warning,
}

/// Advisory annotation attached to a result. Never fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningItem {
    /// Dotted namespace, e.g. `loan.high_rate`
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
}

impl WarningItem {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        WarningItem {
            code: code.to_string(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

/// One line of a worked calculation: what was computed, how, and the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaStep {
    pub name: String,
    pub formula: String,
    pub value: f64,
}

/// The formulas behind a headline figure, with the computed values plugged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub summary: String,
    pub steps: Vec<FormulaStep>,
}

impl Explanation {
    pub fn new(summary: impl Into<String>) -> Self {
        Explanation {
            summary: summary.into(),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, name: &str, formula: &str, value: f64) -> Self {
        self.steps.push(FormulaStep {
            name: name.to_string(),
            formula: formula.to_string(),
            value,
        });
        self
    }

    /// Value of the first step called `name`.
    pub fn value_of(&self, name: &str) -> Option<f64> {
        self.steps.iter().find(|s| s.name == name).map(|s| s.value)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<WarningItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
    pub metadata: ComputationMetadata,
}

impl<T: Serialize> ComputationOutput<T> {
    /// Attach a worked explanation of the result.
    pub fn with_explanation(mut self, explanation: Explanation) -> Self {
        self.explanation = Some(explanation);
        self
    }
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

fn envelope<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<WarningItem>,
    elapsed_us: u64,
    precision: &str,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        explanation: None,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: precision.to_string(),
        },
    }
}

/// Wrap an exact-arithmetic (Decimal) result with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<WarningItem>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    envelope(
        methodology,
        assumptions,
        warnings,
        elapsed_us,
        "rust_decimal_128bit",
        result,
    )
}

/// Wrap a floating-point (solver / simulation) result with metadata
pub fn with_metadata_f64<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<WarningItem>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    envelope(
        methodology,
        assumptions,
        warnings,
        elapsed_us,
        "ieee754_f64",
        result,
    )
}

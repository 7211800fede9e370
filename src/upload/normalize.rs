//! Conversion of raw analysis reports into a stable display model.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use super::report::{value_as_f64, AnalysisReport, RawParameter, STATUS_SUCCESS};

/// Report type shown when the service does not name one.
pub const DEFAULT_REPORT_TYPE: &str = "Medical Report";

/// The report cannot be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Analysis failed: {reason}")]
pub struct NormalizationError {
    pub reason: String,
}

/// Presentation class of a parameter status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ok,
    High,
    Low,
    Unknown,
}

impl Severity {
    /// Map a service status string. Total: unrecognized input is `Unknown`.
    pub fn from_status(status: &str) -> Self {
        let status = status.trim();
        if status.eq_ignore_ascii_case("normal") {
            Self::Ok
        } else if status.eq_ignore_ascii_case("high") {
            Self::High
        } else if status.eq_ignore_ascii_case("low") {
            Self::Low
        } else {
            Self::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "Normal",
            Self::High => "High",
            Self::Low => "Low",
            Self::Unknown => "Unknown",
        }
    }

    pub fn is_abnormal(&self) -> bool {
        matches!(self, Self::High | Self::Low)
    }
}

/// Confidence of an extracted value.
///
/// `NotScored` means the service gave no score, which is not the same as
/// a score of 0%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum Confidence {
    /// Percentage in [0, 100].
    Scored(f64),
    NotScored,
}

impl Confidence {
    /// Build from a raw score, clamping to [0, 1] before scaling.
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if !s.is_nan() => Self::Scored(s.clamp(0.0, 1.0) * 100.0),
            _ => Self::NotScored,
        }
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            Self::Scored(p) => Some(*p),
            Self::NotScored => None,
        }
    }
}

/// A parameter ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayParameter {
    pub name: String,
    /// Value as display text; "-" when absent.
    pub value: String,
    pub unit: Option<String>,
    pub normal_range: Option<String>,
    /// Status exactly as the service sent it.
    pub status: Option<String>,
    pub severity: Severity,
    pub interpretation: Option<String>,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayCategory {
    pub name: String,
    pub parameters: Vec<DisplayParameter>,
}

/// Stable, render-ready view of a successful analysis.
///
/// Category and parameter order is the order the service sent. Consumers
/// must not assume alphabetical or severity ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayModel {
    pub filename: Option<String>,
    pub report_type: String,
    pub overall_status: Option<String>,
    pub extraction_quality: Option<String>,
    pub average_confidence: Confidence,
    pub total_parameters: u64,
    pub abnormal_parameters: u64,
    /// `total - abnormal`, never negative.
    pub normal_count: u64,
    pub categories: Vec<DisplayCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_info: Option<Value>,
}

impl DisplayModel {
    pub fn category(&self, name: &str) -> Option<&DisplayCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Iterate every parameter across categories, in display order.
    pub fn parameters(&self) -> impl Iterator<Item = (&DisplayCategory, &DisplayParameter)> {
        self.categories
            .iter()
            .flat_map(|c| c.parameters.iter().map(move |p| (c, p)))
    }
}

/// Convert a raw report into a display model.
///
/// Fails unless `status` is exactly "success"; the HTTP status of the
/// response is irrelevant here.
pub fn normalize(report: AnalysisReport) -> Result<DisplayModel, NormalizationError> {
    match report.status.as_deref() {
        Some(STATUS_SUCCESS) => {}
        Some(other) => {
            return Err(NormalizationError {
                reason: format!("service reported status \"{}\"", other),
            })
        }
        None => {
            return Err(NormalizationError {
                reason: "response has no status".to_string(),
            })
        }
    }

    let summary = report.summary.unwrap_or_default();
    let total_parameters = to_count(summary.total_parameters);
    let abnormal_parameters = to_count(summary.abnormal_parameters);

    let scores = report.confidence_scores.as_ref().and_then(Value::as_object);
    let categories = match report.categories {
        Some(Value::Object(categories)) => categories
            .into_iter()
            .map(|(name, params)| normalize_category(name, params, scores))
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            warn!("Ignoring categories of unexpected type: {}", json_kind(&other));
            Vec::new()
        }
    };

    Ok(DisplayModel {
        filename: report.filename,
        report_type: summary
            .report_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REPORT_TYPE.to_string()),
        overall_status: summary.overall_status,
        extraction_quality: summary.extraction_quality,
        average_confidence: Confidence::from_score(summary.average_confidence),
        total_parameters,
        abnormal_parameters,
        normal_count: total_parameters.saturating_sub(abnormal_parameters),
        categories,
        processing_info: report.processing_info,
    })
}

fn normalize_category(
    name: String,
    params: Value,
    scores: Option<&Map<String, Value>>,
) -> DisplayCategory {
    let parameters = match params {
        Value::Object(params) => params
            .into_iter()
            .filter_map(|(param_name, raw)| normalize_parameter(&name, param_name, raw, scores))
            .collect(),
        other => {
            warn!(
                "Category '{}' is not an object ({}), showing it empty",
                name,
                json_kind(&other)
            );
            Vec::new()
        }
    };

    DisplayCategory { name, parameters }
}

fn normalize_parameter(
    category: &str,
    name: String,
    raw: Value,
    scores: Option<&Map<String, Value>>,
) -> Option<DisplayParameter> {
    if !raw.is_object() {
        warn!(
            "Skipping parameter '{}' in '{}': expected object, got {}",
            name,
            category,
            json_kind(&raw)
        );
        return None;
    }

    let raw: RawParameter = match serde_json::from_value(raw) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Skipping parameter '{}' in '{}': {}", name, category, e);
            return None;
        }
    };

    let score = raw
        .confidence
        .or_else(|| scores.and_then(|s| s.get(&name)).and_then(value_as_f64));

    Some(DisplayParameter {
        value: display_value(raw.value.as_ref()),
        unit: raw.unit,
        normal_range: raw.normal_range,
        severity: raw
            .status
            .as_deref()
            .map(Severity::from_status)
            .unwrap_or(Severity::Unknown),
        status: raw.status,
        interpretation: raw.interpretation.filter(|i| !i.trim().is_empty()),
        confidence: Confidence::from_score(score),
        name,
    })
}

/// Floor a possibly missing, negative, or fractional count at zero.
fn to_count(value: Option<f64>) -> u64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.floor() as u64,
        _ => 0,
    }
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

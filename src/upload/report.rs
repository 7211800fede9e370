//! Wire model of the analysis service response.
//!
//! The service is not owned here and its payload has drifted between
//! releases (snake_case vs camelCase keys, numbers sent as strings). Every
//! field is therefore optional and leniently typed; the normalizer decides
//! what is renderable.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Status value the service sends for a renderable report.
pub const STATUS_SUCCESS: &str = "success";

/// Response body of `POST /analyze-report`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// "success" or "error". Anything else, or absence, is a failure.
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub filename: Option<String>,
    #[serde(default)]
    pub summary: Option<ReportSummary>,
    /// category name -> parameter name -> parameter object.
    ///
    /// Kept as raw JSON so one malformed entry cannot reject the whole
    /// payload. Key order is the order received.
    #[serde(default)]
    pub categories: Option<Value>,
    #[serde(default, alias = "processingInfo")]
    pub processing_info: Option<Value>,
    /// parameter name -> score in [0, 1].
    #[serde(default, alias = "confidenceScores")]
    pub confidence_scores: Option<Value>,
}

impl AnalysisReport {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }
}

/// Aggregate counts and labels for a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    #[serde(default, alias = "totalParameters", deserialize_with = "lenient_f64")]
    pub total_parameters: Option<f64>,
    #[serde(default, alias = "abnormalParameters", deserialize_with = "lenient_f64")]
    pub abnormal_parameters: Option<f64>,
    #[serde(default, alias = "reportType", deserialize_with = "lenient_string")]
    pub report_type: Option<String>,
    #[serde(default, alias = "overallStatus", deserialize_with = "lenient_string")]
    pub overall_status: Option<String>,
    #[serde(default, alias = "extractionQuality", deserialize_with = "lenient_string")]
    pub extraction_quality: Option<String>,
    #[serde(default, alias = "averageConfidence", deserialize_with = "lenient_f64")]
    pub average_confidence: Option<f64>,
}

/// One measured parameter as sent by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawParameter {
    /// Measured value; usually a number, sometimes text ("Positive").
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unit: Option<String>,
    #[serde(default, alias = "normalRange", deserialize_with = "lenient_string")]
    pub normal_range: Option<String>,
    /// Normal, High, Low, Unknown, or anything the service invents.
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub interpretation: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: Option<f64>,
}

/// Read a number that may arrive as a JSON number or a numeric string.
pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

//! Terminal rendering of analysis results.

use std::fmt::Write;

use console::{style, StyledObject};

use crate::upload::{Confidence, DisplayModel, DisplayParameter, Severity};

pub const DISCLAIMER: &str = "This analysis is for informational purposes only and should not \
replace professional medical advice. Please consult your healthcare provider for proper \
interpretation of your results and any necessary follow-up care.";

/// Icon for a parameter severity.
pub fn severity_icon(severity: Severity) -> StyledObject<&'static str> {
    match severity {
        Severity::Ok => style("✓").green(),
        Severity::High => style("▲").red(),
        Severity::Low => style("▼").yellow(),
        Severity::Unknown => style("?").dim(),
    }
}

fn severity_badge(param: &DisplayParameter) -> StyledObject<String> {
    let text = param
        .status
        .clone()
        .unwrap_or_else(|| param.severity.label().to_string());
    match param.severity {
        Severity::Ok => style(text).green(),
        Severity::High => style(text).red().bold(),
        Severity::Low => style(text).yellow().bold(),
        Severity::Unknown => style(text).dim(),
    }
}

/// Format a confidence for display: `92%`, or `not scored`.
pub fn format_confidence(confidence: Confidence) -> String {
    match confidence {
        Confidence::Scored(p) => format!("{:.0}%", p),
        Confidence::NotScored => "not scored".to_string(),
    }
}

fn with_unit(text: &str, unit: Option<&str>) -> String {
    match unit {
        Some(u) if !u.is_empty() => format!("{} {}", text, u),
        _ => text.to_string(),
    }
}

/// Render a display model as a multi-line report.
pub fn render_report(model: &DisplayModel) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", style("Medical Report Analysis").bold());
    if let Some(ref filename) = model.filename {
        let _ = writeln!(out, "  File: {}", filename);
    }
    let _ = writeln!(out, "  Report type: {}", model.report_type);
    if let Some(ref overall) = model.overall_status {
        let _ = writeln!(out, "  Overall status: {}", overall);
    }
    if let Some(ref quality) = model.extraction_quality {
        let _ = writeln!(out, "  Extraction quality: {}", quality);
    }
    if let Confidence::Scored(_) = model.average_confidence {
        let _ = writeln!(
            out,
            "  Average confidence: {}",
            format_confidence(model.average_confidence)
        );
    }
    let _ = writeln!(
        out,
        "  Parameters: {} analyzed, {} normal, {} abnormal",
        model.total_parameters,
        style(model.normal_count).green(),
        style(model.abnormal_parameters).yellow()
    );

    for category in &model.categories {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", style(&category.name).cyan().bold());
        if category.parameters.is_empty() {
            let _ = writeln!(out, "  {}", style("(no parameters)").dim());
        }
        for param in &category.parameters {
            let _ = write!(
                out,
                "  {} {:<12} {:<16} {}",
                severity_icon(param.severity),
                param.name,
                with_unit(&param.value, param.unit.as_deref()),
                severity_badge(param)
            );
            if let Some(ref range) = param.normal_range {
                let _ = write!(
                    out,
                    "  {}",
                    style(format!("(normal {})", with_unit(range, param.unit.as_deref()))).dim()
                );
            }
            if let Confidence::Scored(_) = param.confidence {
                let _ = write!(
                    out,
                    "  {}",
                    style(format!("conf {}", format_confidence(param.confidence))).dim()
                );
            }
            let _ = writeln!(out);
            if let Some(ref interpretation) = param.interpretation {
                let _ = writeln!(out, "      {}", style(interpretation).italic());
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} {}",
        style("Important Disclaimer:").yellow().bold(),
        DISCLAIMER
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::{normalize, AnalysisReport};
    use serde_json::json;

    fn model() -> DisplayModel {
        let report: AnalysisReport = serde_json::from_value(json!({
            "status": "success",
            "filename": "cbc.png",
            "summary": {
                "total_parameters": 3,
                "abnormal_parameters": 1,
                "report_type": "Complete Blood Count",
                "average_confidence": 0.874
            },
            "categories": {
                "Blood Counts": {
                    "Hb": {"value": 9.5, "unit": "g/dL", "normal_range": "12-16", "status": "Low",
                           "interpretation": "Possible anemia", "confidence": 0.95},
                    "WBC": {"value": 7000, "unit": "/uL", "status": "Normal"}
                },
                "Other": {
                    "CRP": {"value": 4, "status": "Borderline"}
                }
            }
        }))
        .unwrap();
        normalize(report).unwrap()
    }

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(Confidence::Scored(87.4)), "87%");
        assert_eq!(format_confidence(Confidence::Scored(0.0)), "0%");
        assert_eq!(format_confidence(Confidence::NotScored), "not scored");
    }

    #[test]
    fn test_render_report() {
        console::set_colors_enabled(false);
        let text = render_report(&model());

        assert!(text.contains("File: cbc.png"));
        assert!(text.contains("Report type: Complete Blood Count"));
        assert!(text.contains("Average confidence: 87%"));
        assert!(text.contains("3 analyzed, 2 normal, 1 abnormal"));
        assert!(text.contains("9.5 g/dL"));
        assert!(text.contains("(normal 12-16 g/dL)"));
        assert!(text.contains("conf 95%"));
        assert!(text.contains("Possible anemia"));
        assert!(text.contains("Borderline"));
        assert!(text.contains("Important Disclaimer:"));

        // Categories keep received order.
        let blood = text.find("Blood Counts").unwrap();
        let other = text.find("Other").unwrap();
        assert!(blood < other);
    }

    #[test]
    fn test_unscored_parameter_has_no_confidence() {
        console::set_colors_enabled(false);
        let text = render_report(&model());
        let wbc_line = text.lines().find(|l| l.contains("WBC")).unwrap();
        assert!(!wbc_line.contains("conf"));
    }
}

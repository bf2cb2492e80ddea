use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// One answered validation question.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// Verification record for a single checklist item.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckpointVerification {
    pub checkpoint: String,
    pub questions: Vec<String>,
    pub answers: Vec<QuestionAnswer>,
}

/// The two debate personas' arguments.
///
/// Both fields are always strings; a persona whose backend was disabled or
/// failed gets an explicit placeholder so the report stays auditable.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct Debate {
    pub pro_argument_ollama: String,
    pub against_argument_gemini: String,
}

/// Everything collected over one assessment run.
///
/// Created empty at process start, filled in strictly by step order: each
/// step appends its own fields and later steps only read earlier ones. The
/// whole record is serialized to the report file at process end regardless of
/// how far the run got.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ProjectState {
    pub industry: String,
    pub checklist_criteria: Vec<String>,
    pub verification_results: BTreeMap<String, CheckpointVerification>,
    pub gemini_analysis_report: String,
    pub debate: Debate,
    pub final_conclusion: String,
}

impl ProjectState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the collected state to `path` as pretty-printed JSON.
    pub fn save_report(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize project data")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to save project data to {}", path.display()))?;
        info!("Full project data saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_contains_all_top_level_keys() {
        let mut state = ProjectState::new();
        state.industry = "FinTech".to_string();
        state.checklist_criteria = vec!["Regulatory compliance check".to_string()];
        state.verification_results.insert(
            "Regulatory compliance check".to_string(),
            CheckpointVerification {
                checkpoint: "Regulatory compliance check".to_string(),
                questions: vec!["What is the status?".to_string()],
                answers: vec![QuestionAnswer {
                    question: "What is the status?".to_string(),
                    answer: "In progress".to_string(),
                }],
            },
        );
        state.gemini_analysis_report = "Looks fine.".to_string();
        state.debate = Debate {
            pro_argument_ollama: "Go.".to_string(),
            against_argument_gemini: "Wait.".to_string(),
        };
        state.final_conclusion = "CONCLUSION: PROCEED".to_string();

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string_pretty(&state).unwrap()).unwrap();
        for key in [
            "industry",
            "checklist_criteria",
            "verification_results",
            "gemini_analysis_report",
            "debate",
            "final_conclusion",
        ] {
            assert!(json.get(key).is_some(), "missing report key: {}", key);
        }
        assert_eq!(
            json["debate"]["pro_argument_ollama"],
            serde_json::json!("Go.")
        );
    }

    #[test]
    fn test_save_report_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let state = ProjectState::new();
        state.save_report(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains('\n'), "report should be pretty-printed");
        let json: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert!(json.get("final_conclusion").is_some());
    }
}

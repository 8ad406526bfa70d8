//! The structured clinical analysis produced for one note.
//!
//! A `ClinicalOutput` only exists once a raw model response has passed every
//! structural and semantic check; the verifier never hands out a partially
//! valid value.

use serde::{Deserialize, Serialize};

/// Inclusive bounds on the word count of [`ClinicalOutput::analysis`].
pub const ANALYSIS_WORDS: (usize, usize) = (40, 200);
/// Inclusive bounds on the length of [`ClinicalOutput::themes`].
pub const THEMES_LEN: (usize, usize) = (3, 6);
/// Inclusive bounds on the length of [`ClinicalOutput::signifiers`].
pub const SIGNIFIERS_LEN: (usize, usize) = (3, 8);
/// Inclusive bounds on the length of [`ClinicalOutput::hypotheses`].
pub const HYPOTHESES_LEN: (usize, usize) = (2, 4);
/// Inclusive bounds on the length of [`ClinicalOutput::questions`].
pub const QUESTIONS_LEN: (usize, usize) = (3, 6);

/// The validated payload for one clinical note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalOutput {
    /// Free-text analysis, 40–200 whitespace-separated words.
    pub analysis: String,
    pub themes: Vec<String>,
    pub signifiers: Vec<String>,
    pub hypotheses: Vec<String>,
    pub questions: Vec<String>,
    pub risk_assessment: RiskAssessment,
    pub clinical_report: ClinicalReport,
}

/// Risk level as written by the model. Matching is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "baixo")]
    Low,
    #[serde(rename = "médio")]
    Medium,
    #[serde(rename = "alto")]
    High,
}

impl RiskLevel {
    /// Every accepted wire value, in severity order.
    pub const WIRE_VALUES: [&'static str; 3] = ["baixo", "médio", "alto"];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "baixo",
            RiskLevel::Medium => "médio",
            RiskLevel::High => "alto",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub signals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalReport {
    /// Whether a formal clinical report should be produced.
    pub required: bool,
    pub summary: String,
}

/// Count whitespace-separated tokens, the unit used by the analysis bounds.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

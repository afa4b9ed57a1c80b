//! Detection Pipeline — AI-authorship assessment constrained to a fixed JSON schema.
//!
//! Flow: (PDF only) cached text extraction → detection prompt → one inference call →
//! fence stripping → JSON parse → schema validation.
//!
//! The schema is only requested by prompt; nothing on the remote side enforces it.
//! Parse failures are `DetectionParse`, structurally wrong records are `DetectionSchema`.
//! Neither is retried or repaired.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::evaluation::document::{DocumentInput, EvaluationRequest};
use crate::evaluation::ingest::ExtractionCache;
use crate::evaluation::prompts::build_detection_prompt;
use crate::llm_client::{strip_json_fences, InferenceClient, InferenceRequest, MessageContent};

/// Output budget for the detection call.
pub const DETECTION_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_DETECTOR_NAME: &str = "Claude AI Analysis";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Likely AI")]
    LikelyAi,
    #[serde(rename = "Possibly AI")]
    PossiblyAi,
    #[serde(rename = "Likely Human")]
    LikelyHuman,
    #[serde(rename = "Definitely Human")]
    DefinitelyHuman,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::LikelyAi => "Likely AI",
            Verdict::PossiblyAi => "Possibly AI",
            Verdict::LikelyHuman => "Likely Human",
            Verdict::DefinitelyHuman => "Definitely Human",
        })
    }
}

/// A validated detection record. Scores are 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub perplexity_score: f64,
    pub burstiness_score: f64,
    pub ai_probability: f64,
    pub ai_patterns: Vec<String>,
    pub human_indicators: Vec<String>,
    pub verdict: Verdict,
    pub explanation: String,
    #[serde(default = "default_detector_name")]
    pub detector_name: String,
}

fn default_detector_name() -> String {
    DEFAULT_DETECTOR_NAME.to_string()
}

impl DetectionReport {
    /// Range checks serde cannot express.
    fn validate(&self) -> Result<(), AppError> {
        for (field, score) in [
            ("perplexity_score", self.perplexity_score),
            ("burstiness_score", self.burstiness_score),
            ("ai_probability", self.ai_probability),
        ] {
            if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                return Err(AppError::DetectionSchema(format!(
                    "{field} = {score} is outside 0-100"
                )));
            }
        }
        Ok(())
    }
}

/// Strips fences, parses and validates the model's detection answer.
pub fn parse_detection(raw: &str) -> Result<DetectionReport, AppError> {
    let cleaned = strip_json_fences(raw);

    let value: Value = serde_json::from_str(&cleaned).map_err(|e| {
        warn!(
            "Detection output is not JSON ({e}): {:?}",
            cleaned.chars().take(120).collect::<String>()
        );
        AppError::DetectionParse(e.to_string())
    })?;

    if !value.is_object() {
        return Err(AppError::DetectionSchema(
            "detection output is not a JSON object".to_string(),
        ));
    }

    let report: DetectionReport = serde_json::from_value(value)
        .map_err(|e| AppError::DetectionSchema(format!("invalid detection record: {e}")))?;
    report.validate()?;
    Ok(report)
}

/// Runs detection. PDFs are always reduced to text first; detection never
/// sees a binary payload.
pub async fn detect(
    llm: &dyn InferenceClient,
    extractions: &ExtractionCache,
    request: &EvaluationRequest,
) -> Result<DetectionReport, AppError> {
    let content: Cow<'_, str> = match &request.input {
        DocumentInput::Text(text) => Cow::Borrowed(text.as_str()),
        DocumentInput::Pdf(pdf) => Cow::Owned(extractions.extract(llm, pdf).await?),
    };

    info!(
        "Requesting AI detection: type={} input={} chars={}",
        request.document_type,
        request.input.kind(),
        content.chars().count()
    );

    let prompt = build_detection_prompt(&content);
    let raw = llm
        .send(InferenceRequest::new(
            DETECTION_MAX_TOKENS,
            MessageContent::Text(prompt),
        ))
        .await
        .map_err(|e| match e.into_app_error("Detection failed") {
            AppError::Schema(detail) => AppError::DetectionSchema(detail),
            other => other,
        })?;

    let report = parse_detection(&raw)?;
    info!(
        "Detection verdict: {} (ai_probability={})",
        report.verdict, report.ai_probability
    );
    Ok(report)
}

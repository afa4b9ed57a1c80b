//! Critique Pipeline — template + document → one inference call → raw critique.
//!
//! PDFs are sent as document blocks directly, never extracted first: the model
//! needs to see the layout for the design review.

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::document::{DocumentInput, EvaluationRequest};
use crate::evaluation::prompts::{template_for, DESIGN_REVIEW_INSTRUCTION};
use crate::evaluation::segmenter::{segment, Section};
use crate::llm_client::{ContentBlock, InferenceClient, InferenceRequest, MessageContent};

/// Output budget for the critique call.
pub const CRITIQUE_MAX_TOKENS: u32 = 4000;

/// The model's critique, kept exactly as returned. Sections are derived on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CritiqueReport(String);

impl CritiqueReport {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn sections(&self) -> Vec<Section> {
        segment(self.as_str())
    }
}

/// Builds the user message for a critique.
pub fn build_critique_content(request: &EvaluationRequest) -> MessageContent {
    let template = template_for(request.document_type);
    let label = request.document_type.label();

    match &request.input {
        DocumentInput::Text(text) => {
            MessageContent::Text(format!("{template}\n\nAnalyze this {label}:\n\n{text}"))
        }
        DocumentInput::Pdf(pdf) => MessageContent::Blocks(vec![
            pdf.content_block(),
            ContentBlock::text(format!(
                "{template}\n\nAnalyze this {label}. {DESIGN_REVIEW_INSTRUCTION}"
            )),
        ]),
    }
}

/// Runs the critique. Any prose the model returns is accepted as the report.
pub async fn evaluate(
    llm: &dyn InferenceClient,
    request: &EvaluationRequest,
) -> Result<CritiqueReport, AppError> {
    info!(
        "Requesting critique: type={} input={}",
        request.document_type,
        request.input.kind()
    );

    let content = build_critique_content(request);
    let raw = llm
        .send(InferenceRequest::new(CRITIQUE_MAX_TOKENS, content))
        .await
        .map_err(|e| e.into_app_error("Invalid API key or request failed"))?;

    let report = CritiqueReport::new(raw);
    let titles: Vec<&str> = report.sections().iter().map(|s| s.kind.title()).collect();
    info!(
        "Critique received: type={} chars={} sections=[{}]",
        request.document_type,
        report.as_str().chars().count(),
        titles.join(", ")
    );

    Ok(report)
}

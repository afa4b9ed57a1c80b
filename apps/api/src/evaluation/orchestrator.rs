//! Evaluator — the one entry point handlers call per user action.
//!
//! Owns the inference client, the shared extraction cache and one
//! single-flight gate per pipeline. `review` runs both pipelines concurrently
//! and reports each outcome on its own: one failing never discards the other.

use std::sync::Arc;

use tracing::info;

use crate::errors::AppError;
use crate::evaluation::critique::{self, CritiqueReport};
use crate::evaluation::detection::{self, DetectionReport};
use crate::evaluation::document::EvaluationRequest;
use crate::evaluation::ingest::ExtractionCache;
use crate::evaluation::single_flight::SingleFlight;
use crate::llm_client::InferenceClient;

/// Both pipeline outcomes for one document.
#[derive(Debug)]
pub struct ReviewOutcome {
    pub critique: Result<CritiqueReport, AppError>,
    pub detection: Result<DetectionReport, AppError>,
}

pub struct Evaluator {
    llm: Arc<dyn InferenceClient>,
    extractions: ExtractionCache,
    critiques: SingleFlight<CritiqueReport>,
    detections: SingleFlight<DetectionReport>,
}

impl Evaluator {
    pub fn new(llm: Arc<dyn InferenceClient>, extraction_cache_capacity: usize) -> Self {
        Self {
            llm,
            extractions: ExtractionCache::new(extraction_cache_capacity),
            critiques: SingleFlight::new("critique"),
            detections: SingleFlight::new("detection"),
        }
    }

    pub async fn critique(&self, request: &EvaluationRequest) -> Result<CritiqueReport, AppError> {
        self.critiques
            .run(request.fingerprint(), || {
                critique::evaluate(self.llm.as_ref(), request)
            })
            .await
    }

    pub async fn detect(&self, request: &EvaluationRequest) -> Result<DetectionReport, AppError> {
        self.detections
            .run(request.fingerprint(), || {
                detection::detect(self.llm.as_ref(), &self.extractions, request)
            })
            .await
    }

    pub async fn review(&self, request: &EvaluationRequest) -> ReviewOutcome {
        let (critique, detection) = tokio::join!(self.critique(request), self.detect(request));
        info!(
            "Review finished: type={} critique_ok={} detection_ok={}",
            request.document_type,
            critique.is_ok(),
            detection.is_ok()
        );
        ReviewOutcome {
            critique,
            detection,
        }
    }
}

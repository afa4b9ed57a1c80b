//! Axum route handlers for the Evaluation API.
//!
//! All POST endpoints take the same multipart form:
//! `document_type` (required), plus either `text` or `file` (a PDF).

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::critique::CritiqueReport;
use crate::evaluation::detection::DetectionReport;
use crate::evaluation::document::{DocumentType, EvaluationRequest, UploadedFile};
use crate::evaluation::segmenter::{sections_for_display, Section};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DocumentTypeInfo {
    pub id: DocumentType,
    pub label: &'static str,
    /// Whether a PDF upload gets a formatting / ATS review.
    pub design_review: bool,
}

#[derive(Debug, Serialize)]
pub struct CritiqueBody {
    pub report: CritiqueReport,
    pub sections: Vec<Section>,
}

impl From<CritiqueReport> for CritiqueBody {
    fn from(report: CritiqueReport) -> Self {
        let sections = sections_for_display(report.as_str());
        Self { report, sections }
    }
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub evaluation_id: Uuid,
    pub document_type: DocumentType,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub critique: CritiqueBody,
}

#[derive(Debug, Serialize)]
pub struct DetectionResponse {
    pub evaluation_id: Uuid,
    pub document_type: DocumentType,
    pub created_at: DateTime<Utc>,
    pub detection: DetectionReport,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl From<AppError> for ErrorBody {
    fn from(err: AppError) -> Self {
        tracing::warn!("Review part failed: {err}");
        Self {
            code: err.code(),
            message: err.user_message(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub evaluation_id: Uuid,
    pub document_type: DocumentType,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critique: Option<CritiqueBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critique_error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<DetectionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_error: Option<ErrorBody>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/document-types
pub async fn handle_document_types() -> Json<Vec<DocumentTypeInfo>> {
    Json(
        DocumentType::ALL
            .into_iter()
            .map(|t| DocumentTypeInfo {
                id: t,
                label: t.label(),
                design_review: t.is_resume_type(),
            })
            .collect(),
    )
}

/// POST /api/v1/evaluations
///
/// Structured critique of the document, raw and segmented.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EvaluationResponse>, AppError> {
    let request = read_evaluation_request(multipart).await?;
    let report = state.evaluator.critique(&request).await?;

    Ok(Json(EvaluationResponse {
        evaluation_id: Uuid::new_v4(),
        document_type: request.document_type,
        created_at: Utc::now(),
        critique: report.into(),
    }))
}

/// POST /api/v1/detections
///
/// AI-authorship assessment. PDFs are reduced to text first.
pub async fn handle_detect(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DetectionResponse>, AppError> {
    let request = read_evaluation_request(multipart).await?;
    let detection = state.evaluator.detect(&request).await?;

    Ok(Json(DetectionResponse {
        evaluation_id: Uuid::new_v4(),
        document_type: request.document_type,
        created_at: Utc::now(),
        detection,
    }))
}

/// POST /api/v1/reviews
///
/// Critique and detection together. Partial success is still a 200; only
/// when both pipelines fail does the critique's error become the response.
pub async fn handle_review(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ReviewResponse>, AppError> {
    let request = read_evaluation_request(multipart).await?;
    let outcome = state.evaluator.review(&request).await;

    let (critique, critique_error) = match outcome.critique {
        Ok(report) => (Some(CritiqueBody::from(report)), None),
        Err(err) if outcome.detection.is_err() => return Err(err),
        Err(err) => (None, Some(ErrorBody::from(err))),
    };
    let (detection, detection_error) = match outcome.detection {
        Ok(report) => (Some(report), None),
        Err(err) => (None, Some(ErrorBody::from(err))),
    };

    Ok(Json(ReviewResponse {
        evaluation_id: Uuid::new_v4(),
        document_type: request.document_type,
        created_at: Utc::now(),
        critique,
        critique_error,
        detection,
        detection_error,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart decoding
// ────────────────────────────────────────────────────────────────────────────

/// Decodes the form into a validated request. Unknown fields are ignored.
/// A browser's empty file input (no name, no bytes) counts as "no file".
pub async fn read_evaluation_request(mut multipart: Multipart) -> Result<EvaluationRequest, AppError> {
    let mut document_type: Option<String> = None;
    let mut text: Option<String> = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(file_read_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "document_type" => document_type = Some(field.text().await.map_err(file_read_error)?),
            "text" => text = Some(field.text().await.map_err(file_read_error)?),
            "file" => {
                let file_name = field.file_name().map(String::from);
                let media_type = field.content_type().map(String::from);
                let bytes = field.bytes().await.map_err(file_read_error)?;
                if bytes.is_empty() && file_name.as_deref().map_or(true, str::is_empty) {
                    continue;
                }
                file = Some(UploadedFile {
                    file_name,
                    media_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    let document_type: DocumentType = document_type
        .ok_or_else(|| AppError::InputValidation("document_type is required".to_string()))?
        .parse()?;

    let request = EvaluationRequest::new(document_type, text, file)?;
    info!(
        "Accepted {} request for {}",
        request.input.kind(),
        request.document_type
    );
    Ok(request)
}

fn file_read_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(
            "The upload exceeds the maximum allowed size".to_string(),
        );
    }
    AppError::FileRead(format!("Failed to read upload: {}", e.body_text()))
}

//! Request-side data model: document types and the validated evaluation request.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::AppError;
use crate::evaluation::ingest::{prepare_document, prepare_text, PdfDocument};

/// The six document categories. Drives template selection and whether
/// a design/ATS review is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "academic-essay")]
    AcademicEssay,
    #[serde(rename = "university-essay")]
    UniversityEssay,
    #[serde(rename = "university-resume")]
    UniversityResume,
    #[serde(rename = "cover")]
    CoverLetter,
    #[serde(rename = "cv")]
    Cv,
    #[serde(rename = "resume")]
    JobResume,
}

impl DocumentType {
    pub const ALL: [DocumentType; 6] = [
        DocumentType::AcademicEssay,
        DocumentType::UniversityEssay,
        DocumentType::UniversityResume,
        DocumentType::CoverLetter,
        DocumentType::Cv,
        DocumentType::JobResume,
    ];

    /// Wire identifier, as sent by clients.
    pub fn id(self) -> &'static str {
        match self {
            DocumentType::AcademicEssay => "academic-essay",
            DocumentType::UniversityEssay => "university-essay",
            DocumentType::UniversityResume => "university-resume",
            DocumentType::CoverLetter => "cover",
            DocumentType::Cv => "cv",
            DocumentType::JobResume => "resume",
        }
    }

    /// Human-readable name, also interpolated into prompts ("Analyze this {label}").
    pub fn label(self) -> &'static str {
        match self {
            DocumentType::AcademicEssay => "Academic Essay",
            DocumentType::UniversityEssay => "University Application Essay",
            DocumentType::UniversityResume => "University Application Resume",
            DocumentType::CoverLetter => "Cover Letter",
            DocumentType::Cv => "CV",
            DocumentType::JobResume => "Job Resume",
        }
    }

    /// Resume-shaped documents get a formatting / ATS-compatibility review.
    pub fn is_resume_type(self) -> bool {
        matches!(
            self,
            DocumentType::UniversityResume | DocumentType::Cv | DocumentType::JobResume
        )
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DocumentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        DocumentType::ALL
            .into_iter()
            .find(|t| t.id() == s)
            .ok_or_else(|| AppError::InputValidation(format!("Unknown document type '{s}'")))
    }
}

/// A binary exactly as uploaded, before any validation.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub media_type: Option<String>,
    pub bytes: Bytes,
}

/// Validated input. Exactly one of text or PDF, never both, never empty.
#[derive(Debug, Clone)]
pub enum DocumentInput {
    Text(String),
    Pdf(PdfDocument),
}

impl DocumentInput {
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentInput::Text(_) => "text",
            DocumentInput::Pdf(_) => "pdf",
        }
    }
}

/// One user action's worth of input. Created per request, consumed once.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub document_type: DocumentType,
    pub input: DocumentInput,
}

impl EvaluationRequest {
    /// Enforces the input invariant. A non-PDF upload is rejected here,
    /// before anything reaches the inference client.
    pub fn new(
        document_type: DocumentType,
        text: Option<String>,
        file: Option<UploadedFile>,
    ) -> Result<Self, AppError> {
        let text = text.filter(|t| !t.trim().is_empty());

        let input = match (text, file) {
            (Some(_), Some(_)) => {
                return Err(AppError::InputValidation(
                    "Provide either text or a PDF file, not both".to_string(),
                ))
            }
            (Some(text), None) => DocumentInput::Text(prepare_text(text)),
            (None, Some(file)) => DocumentInput::Pdf(prepare_document(&file)?),
            (None, None) => {
                return Err(AppError::InputValidation(
                    "Please enter text or upload a PDF file".to_string(),
                ))
            }
        };

        Ok(Self {
            document_type,
            input,
        })
    }

    #[cfg(test)]
    pub fn text(document_type: DocumentType, text: impl Into<String>) -> Result<Self, AppError> {
        Self::new(document_type, Some(text.into()), None)
    }

    /// Identity of (document type, content). Used as the single-flight key.
    pub fn fingerprint(&self) -> String {
        let content_digest = match &self.input {
            DocumentInput::Text(text) => sha256_hex(text.as_bytes()),
            DocumentInput::Pdf(pdf) => pdf.fingerprint.clone(),
        };
        let mut hasher = Sha256::new();
        hasher.update(self.document_type.id().as_bytes());
        hasher.update([0u8]);
        hasher.update(content_digest.as_bytes());
        hex::encode(hasher.finalize())
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

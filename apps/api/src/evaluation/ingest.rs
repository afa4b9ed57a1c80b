//! Document Ingestion — turns raw text or an uploaded PDF into inference content.
//!
//! PDF text extraction is itself an inference round trip. It is memoized per
//! document fingerprint in `ExtractionCache`, so one upload costs at most one
//! extraction no matter how many pipelines need its text.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use base64::Engine as _;
use lru::LruCache;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::evaluation::document::{sha256_hex, UploadedFile};
use crate::llm_client::prompts::EXTRACTION_INSTRUCTION;
use crate::llm_client::{
    ContentBlock, DocumentSource, InferenceClient, InferenceRequest, MessageContent,
    PDF_MEDIA_TYPE,
};

/// Output budget for the extraction round trip.
pub const EXTRACTION_MAX_TOKENS: u32 = 2000;

/// A validated PDF, already base64-encoded for the wire.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub file_name: Option<String>,
    /// SHA-256 of the raw bytes, hex.
    pub fingerprint: String,
    pub byte_len: usize,
    base64: String,
}

impl PdfDocument {
    pub fn content_block(&self) -> ContentBlock {
        ContentBlock::Document {
            source: DocumentSource::pdf_base64(self.base64.clone()),
        }
    }

    pub fn short_id(&self) -> &str {
        &self.fingerprint[..12.min(self.fingerprint.len())]
    }
}

/// Plain text passes through unchanged.
pub fn prepare_text(raw_text: String) -> String {
    raw_text
}

/// Validates that the upload is a non-empty PDF and encodes it.
/// Never touches the network.
pub fn prepare_document(file: &UploadedFile) -> Result<PdfDocument, AppError> {
    if !is_pdf_media_type(file.media_type.as_deref()) {
        return Err(AppError::InputValidation(
            "Please upload a PDF file".to_string(),
        ));
    }
    if file.bytes.is_empty() {
        return Err(AppError::InputValidation(
            "The uploaded PDF is empty".to_string(),
        ));
    }

    Ok(PdfDocument {
        file_name: file.file_name.clone(),
        fingerprint: sha256_hex(&file.bytes),
        byte_len: file.bytes.len(),
        base64: base64::engine::general_purpose::STANDARD.encode(&file.bytes),
    })
}

/// `application/pdf`, ignoring case and any parameters.
fn is_pdf_media_type(media_type: Option<&str>) -> bool {
    media_type
        .and_then(|m| m.split(';').next())
        .map(|m| m.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
        .unwrap_or(false)
}

/// One extraction round trip: document block + "return only the text".
/// An empty answer is treated as a failed extraction, not as empty input.
pub async fn extract_text(
    llm: &dyn InferenceClient,
    pdf: &PdfDocument,
) -> Result<String, AppError> {
    info!(
        "Extracting text from PDF {} ({} bytes)",
        pdf.short_id(),
        pdf.byte_len
    );

    let content = MessageContent::Blocks(vec![
        pdf.content_block(),
        ContentBlock::text(EXTRACTION_INSTRUCTION),
    ]);

    let text = llm
        .send(InferenceRequest::new(EXTRACTION_MAX_TOKENS, content))
        .await
        .map_err(|e| e.into_app_error("Document extraction failed"))?;

    if text.trim().is_empty() {
        return Err(AppError::Schema(
            "Document extraction returned no text".to_string(),
        ));
    }

    Ok(text)
}

/// Bounded LRU of extraction results keyed by PDF fingerprint.
///
/// Each slot is a `OnceCell`: concurrent callers for the same document share
/// one in-flight extraction. Failures leave the cell empty, so a later call retries.
pub struct ExtractionCache {
    entries: Mutex<LruCache<String, Arc<OnceCell<String>>>>,
}

impl ExtractionCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn extract(
        &self,
        llm: &dyn InferenceClient,
        pdf: &PdfDocument,
    ) -> Result<String, AppError> {
        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries
                .get_or_insert(pdf.fingerprint.clone(), || Arc::new(OnceCell::new()))
                .clone()
        };

        let cached = cell.initialized();
        let text = cell.get_or_try_init(|| extract_text(llm, pdf)).await?.clone();
        if cached {
            debug!("Extraction cache hit for PDF {}", pdf.short_id());
        } else {
            debug!(
                "Extraction cache holds {} documents after {}",
                self.len(),
                pdf.short_id()
            );
        }
        Ok(text)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

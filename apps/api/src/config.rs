use anyhow::{Context, Result};

/// Default Messages API endpoint. Overridable so a local proxy can sit in front of it.
pub const DEFAULT_ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
///
/// Model id and token budgets are NOT configurable; they live as constants
/// next to the pipelines that use them.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_api_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on a multipart request body, in bytes.
    pub max_upload_bytes: usize,
    /// Number of distinct PDFs whose extracted text is kept in memory.
    pub extraction_cache_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let max_upload_mb = std::env::var("MAX_UPLOAD_MB")
            .unwrap_or_else(|_| "32".to_string())
            .parse::<usize>()
            .context("MAX_UPLOAD_MB must be a positive integer")?;

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            anthropic_api_url: std::env::var("ANTHROPIC_API_URL")
                .unwrap_or_else(|_| DEFAULT_ANTHROPIC_API_URL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            extraction_cache_capacity: std::env::var("EXTRACTION_CACHE_CAPACITY")
                .unwrap_or_else(|_| "64".to_string())
                .parse::<usize>()
                .context("EXTRACTION_CACHE_CAPACITY must be a positive integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

// Document evaluation: critique + AI-detection pipelines over the Messages API.
// All LLM calls go through llm_client — no direct HTTP calls here.

pub mod critique;
pub mod detection;
pub mod document;
pub mod handlers;
pub mod ingest;
pub mod orchestrator;
pub mod prompts;
pub mod segmenter;
pub mod single_flight;

pub use orchestrator::Evaluator;

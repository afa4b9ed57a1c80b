// Shared prompt fragments.
// Each pipeline that needs LLM calls defines its own prompts alongside it.
// This file contains cross-cutting instructions.

/// Appended after a document block to get verbatim text back.
pub const EXTRACTION_INSTRUCTION: &str =
    "Extract all the text content from this document. Return only the text, no analysis or commentary.";

/// Output-format rule for any prompt whose answer is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "CRITICAL: You must respond with ONLY a valid JSON object, \
no markdown formatting, no backticks, no preamble. Just pure JSON.";

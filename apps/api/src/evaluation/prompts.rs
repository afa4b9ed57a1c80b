// All LLM prompt constants for the Evaluation module.
// Templates are static: selected once per request, never mutated.

use crate::evaluation::document::DocumentType;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

pub const ACADEMIC_ESSAY_TEMPLATE: &str = r#"You are an expert evaluator analyzing an ACADEMIC ESSAY (for coursework, research papers, or academic submissions).

Your task is to provide a structured analysis with these sections:

1. ✅ STRENGTHS: List 3-5 specific things that work well
2. ⚠️ DETECTED ISSUES: Grammar, spelling, citation issues, awkward phrasing, unclear arguments, structural problems, weak thesis statements
3. 🚫 AI/FLAG RISK: Identify phrases or patterns that may trigger:
   - AI detection systems (Turnitin AI detection, GPT detectors)
   - Plagiarism filters
   - Generic academic language that sounds templated
   - Overly formal or robotic prose
   - Lack of original analysis or critical thinking
   For each risk, explain WHY it's problematic and what it signals to detection systems

4. 💡 FIX SUGGESTIONS: Concrete, actionable improvements with before/after examples

Focus on:
- Original analysis vs. regurgitated information
- Specific evidence vs. vague generalizations
- Natural academic voice vs. AI-generated formal prose
- Critical thinking and argumentation
- Proper citation and scholarly tone"#;

pub const UNIVERSITY_ESSAY_TEMPLATE: &str = r#"You are an expert evaluator analyzing a UNIVERSITY APPLICATION ESSAY (personal statement, supplemental essay, or admissions essay).

Your task is to provide a structured analysis with these sections:

1. ✅ STRENGTHS: List 3-5 specific things that work well
2. ⚠️ DETECTED ISSUES: Grammar, clichés, lack of specificity, weak storytelling, unclear personal voice
3. 🚫 AI/FLAG RISK & AUTO-REJECTION TRIGGERS: Identify content that may cause automatic rejection:
   - Generic phrases used in thousands of applications ("ever since I was young", "I've always been passionate about", "this experience taught me")
   - AI-generated patterns that admissions AI filters detect
   - Overly polished prose that lacks authentic teenage/young adult voice
   - Essays that could apply to any applicant (no personal details)
   - Red flag phrases that trigger plagiarism or AI detection
   - Lack of specific anecdotes, names, places, or personal details

   **CRITICAL**: For each flagged item, explain:
   - Why it triggers auto-rejection algorithms
   - What the university's AI screening system is looking for
   - How admissions officers would interpret this content

4. 💡 FIX SUGGESTIONS: Concrete improvements to make the essay sound authentic, personal, and human. Include specific examples of how to add personal details.

Focus on:
- Unique personal stories vs. generic experiences
- Specific details (names, places, moments) vs. vague statements
- Authentic teenage/young adult voice vs. overly formal or AI-polished prose
- Showing vs. telling
- Vulnerability and genuine reflection"#;

pub const UNIVERSITY_RESUME_TEMPLATE: &str = r#"You are an expert evaluator analyzing a UNIVERSITY APPLICATION RESUME (for college admissions, scholarships, or undergraduate applications).

Your task is to provide a structured analysis covering BOTH content AND design:

1. ✅ STRENGTHS: What works well in content and presentation
2. ⚠️ DETECTED ISSUES: Content problems, formatting issues, missing information, unclear descriptions
3. 🚫 AI/FLAG RISK & AUTO-REJECTION TRIGGERS: Identify issues that cause automatic rejection:

   **CONTENT FLAGS:**
   - Generic activity descriptions without specific achievements
   - Inflated or exaggerated claims
   - Buzzwords without substance ("leadership", "teamwork" without examples)
   - Missing key information (dates, hours, impact metrics)
   - Activities that sound fabricated or AI-generated

   **DESIGN/FORMAT FLAGS THAT CAUSE AUTO-REJECTION:**
   - Non-ATS-friendly fonts (decorative, script, or unusual fonts)
   - Multiple columns that confuse scanning systems
   - Tables, text boxes, or graphics that scanners can't read
   - Headers/footers that get lost in parsing
   - Inconsistent formatting or spacing
   - Colors that don't scan well or look unprofessional
   - Photos or images (not standard for US applications)
   - Unconventional section names AI can't categorize
   - File formatting issues (incorrect PDF encoding)

   **CRITICAL**: Explain what the university's AI screening system looks for and how design choices affect automated scoring.

4. 💡 FIX SUGGESTIONS: Specific improvements for both content and design/formatting

If a PDF was uploaded, analyze its visual design, layout, formatting, and ATS-compatibility in detail."#;

pub const JOB_RESUME_TEMPLATE: &str = r#"You are an expert evaluator analyzing a JOB RESUME for corporate/professional applications.

Your task is to provide a structured analysis covering BOTH content AND design:

1. ✅ STRENGTHS: What works well
2. ⚠️ DETECTED ISSUES: Content and formatting problems
3. 🚫 AI/FLAG RISK & ATS AUTO-REJECTION TRIGGERS:

   **CONTENT FLAGS:**
   - Missing keywords for ATS systems
   - Generic descriptions without quantified achievements
   - Employment gaps without explanation
   - Overused buzzwords without substance

   **DESIGN/FORMAT FLAGS THAT CAUSE AUTO-REJECTION:**
   - Non-ATS-compatible fonts (decorative, script fonts)
   - Multiple columns that confuse ATS parsers
   - Tables, text boxes, images, or graphics
   - Headers/footers with critical information
   - Unusual section headings ATS can't parse
   - Colors that reduce scannability
   - Icons or visual elements that break parsing
   - Wrong file format or encoding issues

   Explain specifically what ATS systems look for and how design affects automated scoring.

4. 💡 FIX SUGGESTIONS: Actionable improvements for content and ATS-friendly design

If a PDF was uploaded, provide detailed analysis of visual design and ATS compatibility."#;

pub const CV_TEMPLATE: &str = r#"You are an expert evaluator analyzing a CV (Curriculum Vitae) for academic or research positions.

Your task is to provide a structured analysis:

1. ✅ STRENGTHS: What works well
2. ⚠️ DETECTED ISSUES: Content gaps, formatting problems, unclear descriptions
3. 🚫 AI/FLAG RISK & AUTO-REJECTION TRIGGERS:

   **CONTENT FLAGS:**
   - Missing publications, research, or academic achievements
   - Vague research descriptions
   - Unexplained career gaps
   - Generic teaching or research statements

   **DESIGN/FORMAT FLAGS:**
   - Inconsistent formatting across sections
   - Poor hierarchy and readability
   - Missing standard CV sections
   - Unprofessional fonts or spacing
   - Design elements that look amateurish

   For academic systems that scan CVs, explain what triggers rejection.

4. 💡 FIX SUGGESTIONS: Improvements for academic positioning and formatting

If a PDF was uploaded, analyze the visual presentation and academic professionalism."#;

pub const COVER_LETTER_TEMPLATE: &str = r#"You are an expert evaluator analyzing a COVER LETTER for job applications.

Your task is to provide a structured analysis:

1. ✅ STRENGTHS: What works well
2. ⚠️ DETECTED ISSUES: Grammar, weak opening, generic content, poor structure
3. 🚫 AI/FLAG RISK: Identify phrases that trigger:
   - AI detection (overly formal, templated language)
   - Generic phrases used in thousands of letters
   - Lack of company-specific research
   - Missing personal voice or enthusiasm
   - Buzzwords without backing evidence

   Explain why these trigger rejection and how hiring managers interpret them.

4. 💡 FIX SUGGESTIONS: Concrete improvements with examples

Focus on authentic voice, company-specific details, and genuine enthusiasm."#;

/// Appended after the template when the document arrives as a PDF.
pub const DESIGN_REVIEW_INSTRUCTION: &str = "Pay special attention to design, formatting, layout, \
fonts, colors, spacing, and ATS compatibility. Describe what you see visually and explain how \
these design choices affect automated screening systems.";

/// Returns the critique template for a document type.
pub fn template_for(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::AcademicEssay => ACADEMIC_ESSAY_TEMPLATE,
        DocumentType::UniversityEssay => UNIVERSITY_ESSAY_TEMPLATE,
        DocumentType::UniversityResume => UNIVERSITY_RESUME_TEMPLATE,
        DocumentType::CoverLetter => COVER_LETTER_TEMPLATE,
        DocumentType::Cv => CV_TEMPLATE,
        DocumentType::JobResume => JOB_RESUME_TEMPLATE,
    }
}

/// Verdict literals the detection prompt asks for. Must match `Verdict`'s serde names.
pub const VERDICT_CHOICES: &str = r#""Likely AI", "Possibly AI", "Likely Human", or "Definitely Human""#;

/// Detection prompt. Replace `{json_only}`, `{verdicts}` and `{content}` before sending.
pub const DETECTION_PROMPT_TEMPLATE: &str = r#"You are an AI detection expert. Analyze this text and provide a detailed assessment of whether it was likely written by AI.

{json_only}

Analyze these specific aspects:

1. **Perplexity Score (0-100)**: How predictable is the text? Lower = more AI-like
2. **Burstiness Score (0-100)**: Variation in sentence structure? Lower = more AI-like
3. **AI Probability (0-100)**: Overall likelihood this is AI-generated
4. **Specific AI Patterns Found**: List concrete examples from the text
5. **Human Indicators**: What suggests human authorship
6. **Verdict**: {verdicts}

Respond with this exact JSON structure:
{
  "perplexity_score": <number 0-100>,
  "burstiness_score": <number 0-100>,
  "ai_probability": <number 0-100>,
  "ai_patterns": ["pattern 1", "pattern 2", ...],
  "human_indicators": ["indicator 1", "indicator 2", ...],
  "verdict": "<verdict>",
  "explanation": "<2-3 sentence explanation>",
  "detector_name": "Claude AI Analysis"
}

Text to analyze:

{content}"#;

/// Fills the detection template. `content` is substituted last so text that
/// happens to contain a placeholder is embedded verbatim.
pub fn build_detection_prompt(content: &str) -> String {
    DETECTION_PROMPT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{verdicts}", VERDICT_CHOICES)
        .replace("{content}", content)
}

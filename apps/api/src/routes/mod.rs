pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/document-types",
            get(handlers::handle_document_types),
        )
        .route("/api/v1/evaluations", post(handlers::handle_evaluate))
        .route("/api/v1/detections", post(handlers::handle_detect))
        .route("/api/v1/reviews", post(handlers::handle_review))
        .layer(body_limit)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::fake::{Reply, ScriptedInference};

    const BOUNDARY: &str = "evaluator-test-boundary";

    enum Part<'a> {
        Field(&'a str, &'a str),
        File {
            name: &'a str,
            file_name: &'a str,
            media_type: &'a str,
            data: &'a [u8],
        },
    }

    fn test_config() -> Config {
        Config {
            anthropic_api_key: "test-key".to_string(),
            anthropic_api_url: "http://127.0.0.1:9/v1/messages".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            max_upload_bytes: 1024 * 1024,
            extraction_cache_capacity: 4,
        }
    }

    fn app(llm: Arc<ScriptedInference>) -> Router {
        build_router(AppState::new(test_config(), llm))
    }

    fn app_with_limit(llm: Arc<ScriptedInference>, max_upload_bytes: usize) -> Router {
        let config = Config {
            max_upload_bytes,
            ..test_config()
        };
        build_router(AppState::new(config, llm))
    }

    fn multipart(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Field(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Part::File {
                    name,
                    file_name,
                    media_type,
                    data,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {media_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn detection_json() -> String {
        json!({
            "perplexity_score": 40,
            "burstiness_score": 45,
            "ai_probability": 55,
            "ai_patterns": ["Formulaic transitions"],
            "human_indicators": ["Named mentor"],
            "verdict": "Possibly AI",
            "explanation": "Mixed signals.",
            "detector_name": "Claude AI Analysis"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Arc::new(ScriptedInference::default()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_document_types_lists_all_six() {
        let response = app(Arc::new(ScriptedInference::default()))
            .oneshot(
                Request::get("/api/v1/document-types")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(response).await;
        let types = body.as_array().unwrap();
        assert_eq!(types.len(), 6);
        assert_eq!(types[0]["id"], "academic-essay");
        assert_eq!(types[5]["label"], "Job Resume");
        assert_eq!(types[5]["design_review"], true);
    }

    #[tokio::test]
    async fn test_non_pdf_upload_rejected_before_any_inference_call() {
        let llm = Arc::new(ScriptedInference::default());
        let response = app(llm.clone())
            .oneshot(multipart(
                "/api/v1/evaluations",
                &[
                    Part::Field("document_type", "resume"),
                    Part::File {
                        name: "file",
                        file_name: "resume.docx",
                        media_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                        data: b"PK\x03\x04",
                    },
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Please upload a PDF file");
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_payload_too_large() {
        let llm = Arc::new(ScriptedInference::default());
        let pdf = vec![b'%'; 8 * 1024];
        let response = app_with_limit(llm.clone(), 1024)
            .oneshot(multipart(
                "/api/v1/evaluations",
                &[
                    Part::Field("document_type", "resume"),
                    Part::File {
                        name: "file",
                        file_name: "resume.pdf",
                        media_type: "application/pdf",
                        data: &pdf,
                    },
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_document_type_is_validation_error() {
        let llm = Arc::new(ScriptedInference::default());
        let response = app(llm.clone())
            .oneshot(multipart(
                "/api/v1/detections",
                &[Part::Field("text", "Some essay")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_document_type_is_validation_error() {
        let response = app(Arc::new(ScriptedInference::default()))
            .oneshot(multipart(
                "/api/v1/evaluations",
                &[
                    Part::Field("document_type", "limerick"),
                    Part::Field("text", "There once was"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_browser_file_input_is_ignored() {
        let llm = Arc::new(ScriptedInference::new(vec![Reply::text("✅ STRENGTHS\nFine.")]));
        let response = app(llm.clone())
            .oneshot(multipart(
                "/api/v1/evaluations",
                &[
                    Part::Field("document_type", "cover"),
                    Part::Field("text", "Dear hiring manager"),
                    Part::File {
                        name: "file",
                        file_name: "",
                        media_type: "application/octet-stream",
                        data: b"",
                    },
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_evaluation_returns_raw_and_sections() {
        let raw = "✅ STRENGTHS\nGood clarity.\n⚠️ DETECTED ISSUES\nMinor typo.";
        let llm = Arc::new(ScriptedInference::new(vec![Reply::text(raw)]));
        let response = app(llm)
            .oneshot(multipart(
                "/api/v1/evaluations",
                &[
                    Part::Field("document_type", "academic-essay"),
                    Part::Field("text", "Essay text"),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["document_type"], "academic-essay");
        assert_eq!(body["report"], raw);
        assert_eq!(
            body["sections"],
            json!([
                {"kind": "strengths", "body": "Good clarity."},
                {"kind": "issues", "body": "Minor typo."}
            ])
        );
        assert!(body["evaluation_id"].is_string());
    }

    #[tokio::test]
    async fn test_evaluation_remote_error_is_bad_gateway() {
        let llm = Arc::new(ScriptedInference::new(vec![Reply::Remote(Some(
            "invalid x-api-key".to_string(),
        ))]));
        let response = app(llm)
            .oneshot(multipart(
                "/api/v1/evaluations",
                &[
                    Part::Field("document_type", "cv"),
                    Part::Field("text", "CV"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "REMOTE_ERROR");
        assert_eq!(body["error"]["message"], "API Error: invalid x-api-key");
    }

    #[tokio::test]
    async fn test_detection_on_pdf_upload() {
        let llm = Arc::new(ScriptedInference::new(vec![
            Reply::text("Extracted statement"),
            Reply::Text(detection_json()),
        ]));
        let response = app(llm.clone())
            .oneshot(multipart(
                "/api/v1/detections",
                &[
                    Part::Field("document_type", "university-essay"),
                    Part::File {
                        name: "file",
                        file_name: "statement.pdf",
                        media_type: "application/pdf",
                        data: b"%PDF-1.4 statement",
                    },
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["detection"]["verdict"], "Possibly AI");
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_detection_parse_failure_is_reported() {
        let llm = Arc::new(ScriptedInference::new(vec![Reply::text(
            "I'm unable to assess this text.",
        )]));
        let response = app(llm)
            .oneshot(multipart(
                "/api/v1/detections",
                &[
                    Part::Field("document_type", "cover"),
                    Part::Field("text", "Letter"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "DETECTION_PARSE_ERROR");
        assert_eq!(
            body["error"]["message"],
            "Failed to parse AI detection results. Please try again."
        );
    }

    #[tokio::test]
    async fn test_invalid_detection_record_gets_detection_message() {
        let mut record: Value = serde_json::from_str(&detection_json()).unwrap();
        record["verdict"] = json!("Maybe");
        let llm = Arc::new(ScriptedInference::new(vec![Reply::Text(record.to_string())]));
        let response = app(llm)
            .oneshot(multipart(
                "/api/v1/detections",
                &[
                    Part::Field("document_type", "cover"),
                    Part::Field("text", "Letter"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "SCHEMA_ERROR");
        assert_eq!(
            body["error"]["message"],
            "AI detection returned an incomplete result. Please try again."
        );
    }

    #[tokio::test]
    async fn test_review_reports_partial_success() {
        let llm = Arc::new(ScriptedInference::new(vec![
            Reply::text("✅ STRENGTHS\nClear."),
            Reply::text("not json"),
        ]));
        let response = app(llm)
            .oneshot(multipart(
                "/api/v1/reviews",
                &[
                    Part::Field("document_type", "university-essay"),
                    Part::Field("text", "Essay"),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["critique"]["sections"][0]["kind"], "strengths");
        assert_eq!(body["detection_error"]["code"], "DETECTION_PARSE_ERROR");
        assert!(body.get("detection").is_none());
        assert!(body.get("critique_error").is_none());
    }

    #[tokio::test]
    async fn test_review_fails_when_both_pipelines_fail() {
        let llm = Arc::new(ScriptedInference::new(vec![
            Reply::Remote(None),
            Reply::Remote(None),
        ]));
        let response = app(llm)
            .oneshot(multipart(
                "/api/v1/reviews",
                &[
                    Part::Field("document_type", "resume"),
                    Part::Field("text", "Resume"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(
            body["error"]["message"],
            "API Error: Invalid API key or request failed"
        );
    }
}

//! `fetch_content` and `evaluate` build their clients from the environment.
//! These tests point the base URLs at a mock server, so they run serially.

use judge_common::{evaluate, fetch_content, JudgeError, JudgeId};
use serde_json::{json, Value};
use serial_test::serial;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_evaluation() -> Value {
    let verdicts: Vec<Value> = JudgeId::ALL
        .iter()
        .map(|judge| {
            json!({
                "judgeId": judge.as_str(),
                "score": 8.0,
                "feedback": ["one", "two", "three"],
                "improvement": "Ship it.",
            })
        })
        .collect();
    json!({
        "verdicts": verdicts,
        "overallStrengths": ["a", "b", "c"],
        "overallWeaknesses": ["x", "y", "z"],
        "finalText": "Solid attempt.",
    })
}

#[tokio::test]
#[serial]
async fn fetch_content_uses_env_base_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(header("authorization", "Bearer fc-env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "markdown": "# Rules" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    std::env::set_var("FIRECRAWL_BASE_URL", format!("{}/v1/", server.uri()));
    let result = fetch_content("https://hack.example.com", "fc-env").await;
    std::env::remove_var("FIRECRAWL_BASE_URL");

    assert_eq!(result.expect("fetch failed"), "# Rules");
}

#[tokio::test]
#[serial]
async fn evaluate_uses_env_base_url_and_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .and(header("x-goog-api-key", "gm-env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": sample_evaluation().to_string() }] },
            }],
        })))
        .expect(1)
        .mount(&server)
        .await;

    std::env::set_var("GEMINI_BASE_URL", format!("{}/v1beta", server.uri()));
    std::env::set_var("GEMINI_MODEL", "gemini-test");
    let result = evaluate("Judge on originality.", "A todo app.", "gm-env").await;
    std::env::remove_var("GEMINI_BASE_URL");
    std::env::remove_var("GEMINI_MODEL");

    let result = result.expect("evaluation failed");
    assert_eq!(serde_json::to_value(&result).unwrap(), sample_evaluation());
}

#[tokio::test]
#[serial]
async fn evaluate_reports_parse_error_for_non_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "not json" }] } }],
        })))
        .mount(&server)
        .await;

    std::env::set_var("GEMINI_BASE_URL", format!("{}/v1beta", server.uri()));
    std::env::set_var("GEMINI_MODEL", "gemini-2.0-flash");
    let result = evaluate("rules", "solution", "gm-env").await;
    std::env::remove_var("GEMINI_BASE_URL");
    std::env::remove_var("GEMINI_MODEL");

    assert!(matches!(result, Err(JudgeError::Parse)));
}

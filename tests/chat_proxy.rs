mod common;

use serde_json::{json, Value};
use wiremock::matchers::{bearer_token, body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn chat_returns_the_upstream_reply() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(bearer_token("test-key"))
        .and(body_partial_json(json!({
            "stream": false,
            "messages": [{"role": "user", "content": "hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hi!"}}]
        })))
        .expect(1)
        .mount(&app.llm)
        .await;

    let response = reqwest::Client::new()
        .post(app.url("/api/chat"))
        .json(&json!({"messages": [{"role": "user", "content": "hello"}]}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": true, "reply": "Hi!"}));
}

#[tokio::test]
async fn empty_messages_are_rejected_without_calling_upstream() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.llm)
        .await;

    let response = reqwest::Client::new()
        .post(app.url("/api/chat"))
        .json(&json!({"messages": []}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Messages are required");
}

#[tokio::test]
async fn upstream_failure_is_a_bad_gateway() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached", "type": "requests"}
        })))
        .mount(&app.llm)
        .await;

    let response = reqwest::Client::new()
        .post(app.url("/api/chat"))
        .json(&json!({"messages": [{"role": "user", "content": "hello"}]}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Rate limit reached"));
}

#[tokio::test]
async fn missing_api_key_is_reported() {
    let app = common::spawn_app_with(|settings| settings.llm.api_key = None).await;

    let response = reqwest::Client::new()
        .post(app.url("/api/chat"))
        .json(&json!({"messages": [{"role": "user", "content": "hello"}]}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "LLM_API_KEY is not configured");
}

#[tokio::test]
async fn browse_summarizes_the_fetched_page() {
    let app = common::spawn_app().await;
    // the page is served by the same mock; only its text matters
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><h1>Rust 2.0</h1><script>track()</script></body></html>",
            "text/html",
        ))
        .mount(&app.llm)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"max_tokens": 512})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "A release announcement."}}]
        })))
        .expect(1)
        .mount(&app.llm)
        .await;

    let response = reqwest::Client::new()
        .post(app.url("/api/browse"))
        .json(&json!({"url": format!("{}/article", app.llm.uri())}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["reply"], "A release announcement.");

    let requests = app.llm.received_requests().await.unwrap();
    let completion = requests
        .iter()
        .find(|request| request.url.path() == "/chat/completions")
        .unwrap();
    let sent: Value = serde_json::from_slice(&completion.body).unwrap();
    let prompt = sent["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("summarize it"));
    assert!(prompt.contains("Rust 2.0"));
    assert!(!prompt.contains("track()"));
}

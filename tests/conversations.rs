mod common;

use serde_json::{json, Value};

#[tokio::test]
async fn conversation_lifecycle() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(app.url("/api/conversations"))
        .json(&json!({"title": "Groceries"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["item"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["item"]["title"], "Groceries");

    let response = client
        .post(app.url(&format!("/api/conversations/{}/messages", id)))
        .json(&json!({"role": "user", "content": "milk, eggs"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let renamed: Value = client
        .patch(app.url(&format!("/api/conversations/{}", id)))
        .json(&json!({"title": "Weekly shop"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(renamed["item"]["title"], "Weekly shop");

    let messages: Value = client
        .get(app.url(&format!("/api/conversations/{}/messages", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(messages["list"][0]["content"], "milk, eggs");
    assert_eq!(messages["list"][0]["status"], "complete");

    let response = client
        .delete(app.url(&format!("/api/conversations/{}", id)))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = client
        .get(app.url(&format!("/api/conversations/{}/messages", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn most_recently_used_conversation_is_listed_first() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for title in ["first", "second"] {
        let created: Value = client
            .post(app.url("/api/conversations"))
            .json(&json!({"title": title}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.push(created["item"]["id"].as_str().unwrap().to_string());
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    client
        .post(app.url(&format!("/api/conversations/{}/messages", ids[0])))
        .json(&json!({"role": "user", "content": "bump"}))
        .send()
        .await
        .unwrap();

    let listed: Value = client
        .get(app.url("/api/conversations"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let titles: Vec<&str> = listed["list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["first", "second"]);
}

#[tokio::test]
async fn unknown_conversation_is_not_found() {
    let app = common::spawn_app().await;

    let response = reqwest::Client::new()
        .delete(app.url(&format!("/api/conversations/{}", uuid::Uuid::new_v4())))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

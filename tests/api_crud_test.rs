// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::sync::Arc;

use newsroom::auth::SystemClock;
use newsroom::config::Config;
use newsroom::server::build_rocket_test_instance;
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::{Client, LocalResponse};
use serde_json::{json, Value};

async fn test_client(max_upload_size: u64) -> (Client, tempfile::TempDir) {
    let upload_dir = tempfile::tempdir().expect("temp dir");
    let mut config = Config::default();
    config.storage.upload_dir = upload_dir.path().display().to_string();
    config.storage.max_upload_size = max_upload_size;

    let (rocket, _handles) = build_rocket_test_instance(&config, Arc::new(SystemClock))
        .expect("valid test configuration");
    let client = Client::tracked(rocket)
        .await
        .expect("valid rocket instance");
    (client, upload_dir)
}

async fn json_body(response: LocalResponse<'_>) -> Value {
    serde_json::from_str(&response.into_string().await.expect("response body"))
        .expect("valid JSON response")
}

async fn admin_header(client: &Client) -> Header<'static> {
    let response = client
        .post("/api/login")
        .header(ContentType::JSON)
        .body(r#"{"username":"admin","password":"admin123"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let token = json_body(response).await["access_token"]
        .as_str()
        .expect("access token")
        .to_string();
    Header::new("Authorization", format!("Bearer {}", token))
}

#[rocket::async_test]
async fn test_news_lifecycle() {
    let (client, _dir) = test_client(1024).await;
    let auth = admin_header(&client).await;

    let response = client.get("/api/news").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(json_body(response).await, json!([]));

    let response = client
        .post("/api/news")
        .header(ContentType::JSON)
        .header(auth.clone())
        .body(json!({ "title": "Launch", "body": "We are live" }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let article = json_body(response).await;
    let id = article["id"].as_str().expect("article id").to_string();
    assert_eq!(article["title"], "Launch");

    // Reads are public
    let response = client.get(format!("/api/news/{}", id)).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(json_body(response).await["body"], "We are live");

    let response = client
        .put(format!("/api/news/{}", id))
        .header(ContentType::JSON)
        .header(auth.clone())
        .body(r#"{"body":"Updated"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let updated = json_body(response).await;
    assert_eq!(updated["title"], "Launch");
    assert_eq!(updated["body"], "Updated");

    let response = client
        .delete(format!("/api/news/{}", id))
        .header(auth.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NoContent);

    let response = client.get(format!("/api/news/{}", id)).dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(json_body(response).await["error"], "not_found");
}

#[rocket::async_test]
async fn test_news_writes_require_token() {
    let (client, _dir) = test_client(1024).await;

    let response = client
        .post("/api/news")
        .header(ContentType::JSON)
        .body(r#"{"title":"Nope","body":""}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client.delete("/api/news/anything").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn test_user_administration() {
    let (client, _dir) = test_client(1024).await;
    let auth = admin_header(&client).await;

    let response = client
        .post("/api/users")
        .header(ContentType::JSON)
        .header(auth.clone())
        .body(
            json!({
                "username": "editor",
                "password": "editor-pass",
                "is_admin": true,
                "email": "editor@example.com"
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let editor = json_body(response).await;
    let id = editor["id"].as_str().expect("user id").to_string();
    assert_eq!(editor["is_admin"], true);

    let response = client
        .put(format!("/api/users/{}", id))
        .header(ContentType::JSON)
        .header(auth.clone())
        .body(r#"{"is_admin":false,"name":"Ed"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let editor = json_body(response).await;
    assert_eq!(editor["is_admin"], false);
    assert_eq!(editor["name"], "Ed");
    assert_eq!(editor["email"], "editor@example.com");

    let response = client.get("/api/users").header(auth.clone()).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let handles: Vec<String> = json_body(response)
        .await
        .as_array()
        .expect("user list")
        .iter()
        .map(|u| u["username"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(handles, vec!["admin", "editor"]);

    let response = client
        .get("/api/users/does-not-exist")
        .header(auth.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn test_file_upload_and_download() {
    let (client, dir) = test_client(1024).await;
    let auth = admin_header(&client).await;

    let response = client
        .post("/api/files?name=notes/hello.txt")
        .header(ContentType::Plain)
        .header(auth.clone())
        .body("hello world")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let record = json_body(response).await;
    let id = record["id"].as_str().expect("file id").to_string();
    assert_eq!(record["filename"], "hello.txt");
    assert_eq!(record["size"], 11);
    assert!(dir.path().join(&id).exists());

    let response = client.get(format!("/api/files/{}", id)).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::Plain));
    assert_eq!(
        response.headers().get_one("Content-Disposition"),
        Some("attachment; filename=\"hello.txt\"")
    );
    assert_eq!(response.into_string().await.as_deref(), Some("hello world"));

    let response = client
        .delete(format!("/api/files/{}", id))
        .header(auth.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NoContent);
    assert!(!dir.path().join(&id).exists());

    let response = client.get("/api/files").dispatch().await;
    assert_eq!(json_body(response).await, json!([]));
}

#[rocket::async_test]
async fn test_upload_limit() {
    let (client, _dir) = test_client(8).await;
    let auth = admin_header(&client).await;

    let response = client
        .post("/api/files?name=big.bin")
        .header(ContentType::Binary)
        .header(auth)
        .body(vec![0u8; 64])
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::PayloadTooLarge);
    assert_eq!(json_body(response).await["error"], "payload_too_large");
}

#[rocket::async_test]
async fn test_spa_fallback() {
    let (client, _dir) = test_client(1024).await;

    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::HTML));

    let response = client.get("/news/2025/some-article").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::HTML));
    assert!(response
        .into_string()
        .await
        .unwrap_or_default()
        .contains("<title>Newsroom</title>"));

    let response = client.get("/api/unknown").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(json_body(response).await["error"], "not_found");
}

#[rocket::async_test]
async fn test_cors_headers() {
    let (client, _dir) = test_client(1024).await;

    let response = client.options("/api/news").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );
}

mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

fn book_payload() -> serde_json::Value {
    json!({
        "title": "Dune",
        "author": "Herbert",
        "isbn": "123",
        "availability": { "isAvailable": true }
    })
}

#[tokio::test]
async fn create_without_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/books", server.base_url))
        .json(&book_payload())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "Authorization token required");
    assert_eq!(body["code"], "UNAUTHORIZED");

    Ok(())
}

#[tokio::test]
async fn create_with_garbage_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/jobs", server.base_url))
        .bearer_auth("not-a-real-token")
        .json(&json!({}))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "Request is not authorized");

    Ok(())
}

#[tokio::test]
async fn create_with_basic_scheme_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/products", server.base_url))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .json(&json!({}))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn update_and_delete_without_token_are_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let url = format!(
        "{}/api/books/5d0c2aa2-8a32-4ad4-9e88-6b8babe9a7b2",
        server.base_url
    );

    let res = client.put(&url).json(&json!({"title": "x"})).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client.delete(&url).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn malformed_id_on_public_get_is_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/books/not-a-uuid", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "No such book");

    Ok(())
}

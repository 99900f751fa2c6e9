mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn register_returns_public_fields_only() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/register/", server.base_url))
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "wonderland",
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    // The password must never appear in a response, hashed or not
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_username_is_a_validation_error() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let res = client
            .post(format!("{}/register/", server.base_url))
            .json(&json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "builder",
            }))
            .send()
            .await?;

        if res.status() == StatusCode::CREATED {
            continue;
        }

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["field_errors"].get("username").is_some());
        return Ok(());
    }

    anyhow::bail!("second registration with a taken username unexpectedly succeeded")
}

#[tokio::test]
async fn missing_fields_are_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/register/", server.base_url))
        .json(&json!({ "username": "noemail" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn token_exchange_round_trip() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/register/", server.base_url))
        .json(&json!({
            "username": "carol",
            "email": "carol@example.com",
            "password": "correct-password",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Correct credentials yield a token
    let res = client
        .post(format!("{}/api/v1/api-token-auth/", server.base_url))
        .json(&json!({ "username": "carol", "password": "correct-password" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert!(!body["token"].as_str().unwrap_or_default().is_empty());

    // Wrong password is rejected without revealing which field was wrong
    let res = client
        .post(format!("{}/api/v1/api-token-auth/", server.base_url))
        .json(&json!({ "username": "carol", "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Unknown user gets the same rejection
    let res = client
        .post(format!("{}/api/v1/api-token-auth/", server.base_url))
        .json(&json!({ "username": "nobody", "password": "whatever" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

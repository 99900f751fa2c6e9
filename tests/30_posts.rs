mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn anonymous_post_creation_is_forbidden() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/posts/", server.base_url))
        .json(&json!({ "text": "drive-by" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn garbage_bearer_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/posts/", server.base_url))
        .bearer_auth("not-a-real-token")
        .json(&json!({ "text": "spoofed" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn author_can_create_read_update_and_delete() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::register_and_login(server, &client, "dana").await?;

    // Create
    let res = client
        .post(format!("{}/posts/", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "text": "first post" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let post = res.json::<serde_json::Value>().await?;
    assert_eq!(post["text"], "first post");
    assert_eq!(post["author"], "dana");
    assert!(post["group"].is_null());
    assert!(post.get("pub_date").is_some());
    let id = post["id"].as_i64().expect("post id");

    // Read back
    let res = client
        .get(format!("{}/posts/{}/", server.base_url, id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Partial update keeps unmentioned fields
    let res = client
        .patch(format!("{}/posts/{}/", server.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "image": "cats.png" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let patched = res.json::<serde_json::Value>().await?;
    assert_eq!(patched["text"], "first post");
    assert_eq!(patched["image"], "cats.png");
    // Author is read-only and untouched
    assert_eq!(patched["author"], "dana");

    // Full update resets absent optional fields
    let res = client
        .put(format!("{}/posts/{}/", server.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "text": "rewritten" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let replaced = res.json::<serde_json::Value>().await?;
    assert_eq!(replaced["text"], "rewritten");
    assert!(replaced["image"].is_null());

    // Delete
    let res = client
        .delete(format!("{}/posts/{}/", server.base_url, id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/posts/{}/", server.base_url, id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn non_author_cannot_mutate_a_post() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let owner = common::register_and_login(server, &client, "erin").await?;
    let other = common::register_and_login(server, &client, "frank").await?;

    let res = client
        .post(format!("{}/posts/", server.base_url))
        .bearer_auth(&owner)
        .json(&json!({ "text": "hello" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = res.json::<serde_json::Value>().await?["id"]
        .as_i64()
        .expect("post id");

    // PATCH by a non-author is forbidden
    let res = client
        .patch(format!("{}/posts/{}/", server.base_url, id))
        .bearer_auth(&other)
        .json(&json!({ "text": "bye" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "FORBIDDEN");

    // ... and the post is unchanged
    let res = client
        .get(format!("{}/posts/{}/", server.base_url, id))
        .send()
        .await?;
    assert_eq!(res.json::<serde_json::Value>().await?["text"], "hello");

    // PUT and DELETE are refused the same way
    let res = client
        .put(format!("{}/posts/{}/", server.base_url, id))
        .bearer_auth(&other)
        .json(&json!({ "text": "bye" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(format!("{}/posts/{}/", server.base_url, id))
        .bearer_auth(&other)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(format!("{}/posts/{}/", server.base_url, id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn patch_with_explicit_null_clears_image() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::register_and_login(server, &client, "pia").await?;

    let res = client
        .post(format!("{}/posts/", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "text": "illustrated", "image": "banner.png" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = res.json::<serde_json::Value>().await?["id"]
        .as_i64()
        .expect("post id");

    // An absent field leaves the stored value alone
    let res = client
        .patch(format!("{}/posts/{}/", server.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "text": "still illustrated" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<serde_json::Value>().await?["image"], "banner.png");

    // An explicit null clears it
    let res = client
        .patch(format!("{}/posts/{}/", server.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "image": null }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["image"].is_null());
    assert_eq!(body["text"], "still illustrated");
    Ok(())
}

#[tokio::test]
async fn anonymous_mutation_of_a_missing_post_is_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Lookup outranks the authentication check: an unknown id is a 404
    // even without credentials
    let res = client
        .patch(format!("{}/posts/999999/", server.base_url))
        .json(&json!({ "text": "ghost edit" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(format!("{}/posts/999999/", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn post_without_text_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::register_and_login(server, &client, "gus").await?;

    let res = client
        .post(format!("{}/posts/", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "image": "no-text.png" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["field_errors"].get("text").is_some());
    Ok(())
}

#[tokio::test]
async fn post_with_unknown_group_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::register_and_login(server, &client, "hana").await?;

    let res = client
        .post(format!("{}/posts/", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "text": "grouped", "group": 4242 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["field_errors"].get("group").is_some());
    Ok(())
}

#[tokio::test]
async fn listing_posts_is_public() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::register_and_login(server, &client, "iris").await?;

    let res = client
        .post(format!("{}/posts/", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "text": "listed" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = res.json::<serde_json::Value>().await?["id"]
        .as_i64()
        .expect("post id");

    let res = client
        .get(format!("{}/posts/", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let posts = res.json::<serde_json::Value>().await?;
    let posts = posts.as_array().expect("array body");
    assert!(posts.iter().any(|p| p["id"].as_i64() == Some(id)));
    Ok(())
}

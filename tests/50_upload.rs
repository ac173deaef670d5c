mod common;

use anyhow::Result;
use axum::http::StatusCode;
use devcamper_api::database::models::Role;
use serde_json::json;

use common::{TestApp, UPLOAD_LIMIT};

#[tokio::test]
async fn owner_uploads_a_photo() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let id = app.bootcamp(&owner, "Pictured", json!({})).await?;

    let (status, body) = app
        .upload(&format!("/api/v1/bootcamps/{}/photo", id), &owner, "file", "camp.png", "image/png", b"\x89PNG")
        .await?;

    let expected = format!("photo_{}.png", id);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "data": expected }));
    assert!(app.files.files.lock().unwrap().contains_key(&expected));

    let (_, bootcamp) = app.get(&format!("/api/v1/bootcamps/{}", id)).await?;
    assert_eq!(bootcamp["data"]["photo"], expected);
    Ok(())
}

#[tokio::test]
async fn non_images_are_rejected() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let id = app.bootcamp(&owner, "Text Only", json!({})).await?;

    let (status, body) = app
        .upload(&format!("/api/v1/bootcamps/{}/photo", id), &owner, "file", "notes.txt", "text/plain", b"hello")
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please upload an image");
    Ok(())
}

#[tokio::test]
async fn oversized_images_mention_the_limit() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let id = app.bootcamp(&owner, "Huge", json!({})).await?;
    let data = vec![0u8; UPLOAD_LIMIT * 2];

    let (status, body) = app
        .upload(&format!("/api/v1/bootcamps/{}/photo", id), &owner, "file", "big.jpg", "image/jpeg", &data)
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], format!("Please upload an image less than {}", UPLOAD_LIMIT));
    assert!(app.files.files.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_file_field_is_a_bad_request() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let id = app.bootcamp(&owner, "Empty", json!({})).await?;

    let (status, body) = app
        .upload(&format!("/api/v1/bootcamps/{}/photo", id), &owner, "avatar", "a.png", "image/png", b"png")
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please upload a file");
    Ok(())
}

#[tokio::test]
async fn only_the_owner_may_upload() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let other = app.user(Role::Publisher).await?;
    let id = app.bootcamp(&owner, "Private", json!({})).await?;

    let (status, _) = app
        .upload(&format!("/api/v1/bootcamps/{}/photo", id), &other, "file", "a.png", "image/png", b"png")
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let missing = uuid::Uuid::new_v4();
    let (status, _) = app
        .upload(&format!("/api/v1/bootcamps/{}/photo", missing), &owner, "file", "a.png", "image/png", b"png")
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn storage_failures_are_server_errors() -> Result<()> {
    let app = TestApp::with_failing_storage();
    let owner = app.user(Role::Publisher).await?;
    let id = app.bootcamp(&owner, "Unlucky", json!({})).await?;

    let (status, body) = app
        .upload(&format!("/api/v1/bootcamps/{}/photo", id), &owner, "file", "a.png", "image/png", b"png")
        .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "success": false, "message": "Problem with file upload" }));
    Ok(())
}

mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use devcamper_api::database::models::Role;
use serde_json::{json, Value};

use common::{id_of, TestApp, TestUser};

fn course(title: &str, tuition: u32) -> Value {
    json!({
        "title": title,
        "description": format!("{} description", title),
        "weeks": 8,
        "tuition": tuition,
        "minimumSkill": "intermediate",
        "scholarshipAvailable": true,
    })
}

async fn add_course(app: &TestApp, bootcamp: &str, owner: &TestUser, title: &str, tuition: u32) -> Result<String> {
    let (status, body) = app
        .send(Method::POST, &format!("/api/v1/bootcamps/{}/courses", bootcamp), owner, course(title, tuition))
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "course create failed: {} {}", status, body);
    id_of(&body)
}

#[tokio::test]
async fn courses_embed_their_bootcamp_summary() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let bootcamp = app.bootcamp(&owner, "Devworks", json!({})).await?;
    let id = add_course(&app, &bootcamp, &owner, "Front End", 8000).await?;

    let (status, body) = app.get(&format!("/api/v1/courses/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Front End");
    assert_eq!(body["data"]["minimumSkill"], "intermediate");
    assert_eq!(body["data"]["user"], owner.id.to_string());
    assert_eq!(body["data"]["bootcamp"]["name"], "Devworks");
    assert_eq!(body["data"]["bootcamp"]["description"], "Devworks description");
    assert!(body["data"]["bootcamp"].get("address").is_none());

    let (_, list) = app.get("/api/v1/courses").await?;
    assert_eq!(list["count"], 1);
    assert_eq!(list["data"][0]["bootcamp"]["name"], "Devworks");
    Ok(())
}

#[tokio::test]
async fn bootcamp_courses_lists_only_that_bootcamp() -> Result<()> {
    let app = TestApp::new();
    let admin = app.user(Role::Admin).await?;
    let first = app.bootcamp(&admin, "First", json!({})).await?;
    let second = app.bootcamp(&admin, "Second", json!({})).await?;
    add_course(&app, &first, &admin, "A", 100).await?;
    add_course(&app, &first, &admin, "B", 200).await?;
    add_course(&app, &second, &admin, "C", 300).await?;

    let (status, body) = app.get(&format!("/api/v1/bootcamps/{}/courses", first)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert!(body.get("pagination").is_none());

    let (_, bootcamp) = app.get(&format!("/api/v1/bootcamps/{}", second)).await?;
    assert_eq!(bootcamp["data"]["courses"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn only_the_bootcamp_owner_may_add_courses() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let other = app.user(Role::Publisher).await?;
    let bootcamp = app.bootcamp(&owner, "Mine", json!({})).await?;

    let (status, body) = app
        .send(Method::POST, &format!("/api/v1/bootcamps/{}/courses", bootcamp), &other, course("X", 1))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        format!("User {} is not authorized to add a course to bootcamp {}", other.id, bootcamp)
    );
    Ok(())
}

#[tokio::test]
async fn course_for_missing_bootcamp_is_not_found() -> Result<()> {
    let app = TestApp::new();
    let admin = app.user(Role::Admin).await?;
    let missing = uuid::Uuid::new_v4();

    let (status, body) = app
        .send(Method::POST, &format!("/api/v1/bootcamps/{}/courses", missing), &admin, course("X", 1))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Bootcamp with param id {} not found", missing));
    Ok(())
}

#[tokio::test]
async fn course_validation_reports_missing_fields() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let bootcamp = app.bootcamp(&owner, "Strict", json!({})).await?;

    let (status, body) = app
        .send(Method::POST, &format!("/api/v1/bootcamps/{}/courses", bootcamp), &owner, json!({ "title": "T" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap_or_default();
    assert!(message.contains("Please add a tuition cost"), "{}", message);
    assert!(message.contains("Please add a minimum skill"), "{}", message);
    Ok(())
}

#[tokio::test]
async fn update_and_delete_follow_ownership() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let other = app.user(Role::Publisher).await?;
    let bootcamp = app.bootcamp(&owner, "Owned", json!({})).await?;
    let id = add_course(&app, &bootcamp, &owner, "Course", 500).await?;
    let uri = format!("/api/v1/courses/{}", id);

    let (status, _) = app.send(Method::PUT, &uri, &other, json!({ "tuition": 1 })).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send(Method::PUT, &uri, &owner, json!({ "tuition": 750 })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tuition"], 750.0);

    let (status, _) = app.send(Method::DELETE, &uri, &other, json!({})).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send(Method::DELETE, &uri, &owner, json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], format!("Deleted course {}", id));

    let (status, _) = app.get(&uri).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

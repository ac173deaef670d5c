mod common;

use anyhow::Result;
use axum::http::StatusCode;
use devcamper_api::database::models::Role;
use serde_json::{json, Value};

use common::TestApp;

/// Three bootcamps owned by an admin, created cheapest first
async fn seeded() -> Result<TestApp> {
    let app = TestApp::new();
    let admin = app.user(Role::Admin).await?;
    app.bootcamp(&admin, "Alpha", json!({ "averageCost": 5000, "housing": true, "careers": ["Business"] }))
        .await?;
    app.bootcamp(&admin, "Bravo", json!({ "averageCost": 10000, "careers": ["UI/UX", "Web Development"] }))
        .await?;
    app.bootcamp(&admin, "Charlie", json!({ "averageCost": 15000, "housing": true, "careers": ["Data Science"] }))
        .await?;
    Ok(app)
}

fn names(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["name"].as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn comparison_operators_filter_rows() -> Result<()> {
    let app = seeded().await?;

    let (status, body) = app.get("/api/v1/bootcamps?averageCost%5Bgte%5D=10000").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), ["Bravo", "Charlie"]);

    let (_, body) = app.get("/api/v1/bootcamps?averageCost%5Blt%5D=10000").await?;
    assert_eq!(names(&body), ["Alpha"]);

    let (_, body) = app.get("/api/v1/bootcamps?averageCost%5Bgt%5D=5000&averageCost%5Blte%5D=10000").await?;
    assert_eq!(names(&body), ["Bravo"]);

    let (_, body) = app.get("/api/v1/bootcamps?housing=true").await?;
    assert_eq!(names(&body), ["Alpha", "Charlie"]);
    Ok(())
}

#[tokio::test]
async fn in_operator_matches_list_members() -> Result<()> {
    let app = seeded().await?;

    let (_, body) = app.get("/api/v1/bootcamps?careers%5Bin%5D=UI%2FUX,Business").await?;
    assert_eq!(names(&body), ["Alpha", "Bravo"]);

    let (_, body) = app.get("/api/v1/bootcamps?careers=Data%20Science").await?;
    assert_eq!(names(&body), ["Charlie"]);
    Ok(())
}

#[tokio::test]
async fn sort_and_select_shape_the_rows() -> Result<()> {
    let app = seeded().await?;

    let (_, body) = app.get("/api/v1/bootcamps?sort=-averageCost").await?;
    assert_eq!(names(&body), ["Charlie", "Bravo", "Alpha"]);

    let (_, body) = app.get("/api/v1/bootcamps?select=name,averageCost&sort=name").await?;
    let first = body["data"][0].as_object().cloned().unwrap_or_default();
    assert_eq!(first["name"], "Alpha");
    assert!(first.contains_key("id"));
    assert!(first.contains_key("averageCost"));
    assert!(first.contains_key("courses"));
    assert!(!first.contains_key("description"));
    Ok(())
}

#[tokio::test]
async fn pagination_links_follow_the_filtered_total() -> Result<()> {
    let app = seeded().await?;

    let (_, body) = app.get("/api/v1/bootcamps?limit=1&page=2").await?;
    assert_eq!(body["count"], 1);
    assert_eq!(names(&body), ["Bravo"]);
    assert_eq!(
        body["pagination"],
        json!({ "next": { "page": 3, "limit": 1 }, "prev": { "page": 1, "limit": 1 } })
    );

    let (_, body) = app.get("/api/v1/bootcamps?limit=1&page=3").await?;
    assert_eq!(body["pagination"], json!({ "prev": { "page": 2, "limit": 1 } }));

    let (_, body) = app.get("/api/v1/bootcamps?averageCost%5Bgte%5D=10000&limit=1&page=2").await?;
    assert_eq!(names(&body), ["Charlie"]);
    assert_eq!(body["pagination"], json!({ "prev": { "page": 1, "limit": 1 } }));
    Ok(())
}

#[tokio::test]
async fn non_numeric_paging_falls_back_to_defaults() -> Result<()> {
    let app = seeded().await?;

    let (status, body) = app.get("/api/v1/bootcamps?page=abc&limit=xyz").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["pagination"], json!({}));
    Ok(())
}

#[tokio::test]
async fn unknown_fields_are_rejected() -> Result<()> {
    let app = seeded().await?;

    let (status, body) = app.get("/api/v1/bootcamps?colour=red").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/v1/bootcamps?sort=popularity").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/v1/bootcamps?averageCost%5Bgte%5D=cheap").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn course_lists_filter_by_tuition() -> Result<()> {
    let app = TestApp::new();
    let admin = app.user(Role::Admin).await?;
    let bootcamp = app.bootcamp(&admin, "Courses", json!({})).await?;
    for (title, tuition) in [("Cheap", 100), ("Mid", 500), ("Pricey", 900)] {
        let course = json!({
            "title": title, "description": "d", "weeks": 4, "tuition": tuition, "minimumSkill": "beginner"
        });
        app.send(
            axum::http::Method::POST,
            &format!("/api/v1/bootcamps/{}/courses", bootcamp),
            &admin,
            course,
        )
        .await?;
    }

    let (_, body) = app.get("/api/v1/courses?tuition%5Blte%5D=500&sort=-tuition").await?;
    let titles: Vec<_> = body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, ["Mid", "Cheap"]);
    Ok(())
}

mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use devcamper_api::database::models::Role;
use serde_json::{json, Value};

use common::{id_of, TestApp, TestUser};

fn review(rating: i64) -> Value {
    json!({ "title": "Review", "text": "Some text", "rating": rating })
}

async fn add_review(app: &TestApp, bootcamp: &str, user: &TestUser, rating: i64) -> Result<(StatusCode, Value)> {
    app.send(Method::POST, &format!("/api/v1/bootcamps/{}/reviews", bootcamp), user, review(rating))
        .await
}

async fn average_rating(app: &TestApp, bootcamp: &str) -> Result<Value> {
    let (_, body) = app.get(&format!("/api/v1/bootcamps/{}", bootcamp)).await?;
    Ok(body["data"]["averageRating"].clone())
}

#[tokio::test]
async fn average_rating_tracks_reviews() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let first = app.user(Role::User).await?;
    let second = app.user(Role::User).await?;
    let bootcamp = app.bootcamp(&owner, "Rated", json!({})).await?;

    let (status, created) = add_review(&app, &bootcamp, &first, 8).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["bootcamp"], bootcamp);
    assert_eq!(created["data"]["user"], first.id.to_string());
    let first_review = id_of(&created)?;

    let (status, _) = add_review(&app, &bootcamp, &second, 10).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(average_rating(&app, &bootcamp).await?, 9.0);

    let (status, _) = app
        .send(Method::PUT, &format!("/api/v1/reviews/{}", first_review), &first, json!({ "rating": 4 }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(average_rating(&app, &bootcamp).await?, 7.0);
    Ok(())
}

#[tokio::test]
async fn deleting_the_only_review_clears_the_average() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let reviewer = app.user(Role::User).await?;
    let bootcamp = app.bootcamp(&owner, "Lonely", json!({})).await?;

    let (_, created) = add_review(&app, &bootcamp, &reviewer, 6).await?;
    assert_eq!(average_rating(&app, &bootcamp).await?, 6.0);
    let id = id_of(&created)?;

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/v1/reviews/{}", id), &reviewer, json!({}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], format!("Deleted review {}", id));
    assert_eq!(average_rating(&app, &bootcamp).await?, Value::Null);
    Ok(())
}

#[tokio::test]
async fn one_review_per_user_per_bootcamp() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let reviewer = app.user(Role::User).await?;
    let bootcamp = app.bootcamp(&owner, "Once", json!({})).await?;

    add_review(&app, &bootcamp, &reviewer, 7).await?;
    let (status, body) = add_review(&app, &bootcamp, &reviewer, 3).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Duplicate field value entered");
    assert_eq!(average_rating(&app, &bootcamp).await?, 7.0);
    Ok(())
}

#[tokio::test]
async fn publishers_cannot_review() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let bootcamp = app.bootcamp(&owner, "Self Review", json!({})).await?;

    let (status, body) = add_review(&app, &bootcamp, &owner, 10).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User role publisher is not authorized to access this route");
    Ok(())
}

#[tokio::test]
async fn rating_must_be_in_range() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let reviewer = app.user(Role::User).await?;
    let bootcamp = app.bootcamp(&owner, "Bounds", json!({})).await?;

    let (status, body) = add_review(&app, &bootcamp, &reviewer, 11).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Rating must be between 1 and 10");

    let (status, body) = app
        .send(Method::POST, &format!("/api/v1/bootcamps/{}/reviews", bootcamp), &reviewer, json!({ "rating": 5 }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please add some text, Please add a title for the review");
    Ok(())
}

#[tokio::test]
async fn other_users_cannot_touch_a_review_but_admins_can() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let author = app.user(Role::User).await?;
    let stranger = app.user(Role::User).await?;
    let admin = app.user(Role::Admin).await?;
    let bootcamp = app.bootcamp(&owner, "Guarded", json!({})).await?;

    let (_, created) = add_review(&app, &bootcamp, &author, 5).await?;
    let uri = format!("/api/v1/reviews/{}", id_of(&created)?);

    let (status, _) = app.send(Method::PUT, &uri, &stranger, json!({ "title": "mine now" })).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send(Method::PUT, &uri, &admin, json!({ "title": "Moderated" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Moderated");

    let (status, _) = app.send(Method::DELETE, &uri, &admin, json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn review_reads_embed_the_bootcamp() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Publisher).await?;
    let reviewer = app.user(Role::User).await?;
    let bootcamp = app.bootcamp(&owner, "Embedded", json!({})).await?;
    let (_, created) = add_review(&app, &bootcamp, &reviewer, 9).await?;

    let (status, body) = app.get(&format!("/api/v1/reviews/{}", id_of(&created)?)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bootcamp"]["name"], "Embedded");

    let (_, list) = app.get(&format!("/api/v1/bootcamps/{}/reviews", bootcamp)).await?;
    assert_eq!(list["count"], 1);
    assert_eq!(list["data"][0]["rating"], 9);
    Ok(())
}

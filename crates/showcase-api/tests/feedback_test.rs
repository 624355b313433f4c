//! Comments and suggestions

mod common;

use axum::http::StatusCode;
use common::{spawn_app, tick};
use serde_json::json;

#[tokio::test]
async fn test_comment_author_comes_from_token() {
    let app = spawn_app().await;
    let owner = app.register("owner").await;
    let reader = app.register("reader").await;
    let project = app.create_project(&owner, "Tracker", None, &[]).await;
    let project_id = project["id"].as_str().unwrap();

    let (status, body) = app
        .post(
            "/api/comments",
            Some(&reader.token),
            json!({
                "project_id": project_id,
                "content": "  Nice work  ",
                "author_id": owner.id
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["author_id"], reader.id.to_string());
    assert_eq!(body["author"]["username"], "reader");
    assert_eq!(body["content"], "Nice work");

    let (status, list) = app
        .get(&format!("/api/comments/{}", project_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["items"][0]["author"]["id"], reader.id.to_string());
}

#[tokio::test]
async fn test_feedback_requires_auth_and_content() {
    let app = spawn_app().await;
    let owner = app.register("owner").await;
    let project = app.create_project(&owner, "Tracker", None, &[]).await;
    let project_id = project["id"].as_str().unwrap();

    let (status, _) = app
        .post(
            "/api/comments",
            None,
            json!({"project_id": project_id, "content": "hi"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/api/suggestions",
            Some(&owner.token),
            json!({"project_id": project_id, "content": "   "}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/comments",
            Some(&owner.token),
            json!({"project_id": uuid::Uuid::new_v4(), "content": "hello?"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_suggestion_accepts_legacy_fields() {
    let app = spawn_app().await;
    let owner = app.register("owner").await;
    let mentor = app.register("mentor").await;
    let project = app.create_project(&owner, "Tracker", None, &[]).await;
    let project_id = project["id"].as_str().unwrap();

    let (status, body) = app
        .post(
            "/api/suggestions",
            Some(&mentor.token),
            json!({"projectId": project_id, "suggestion": "Add a README"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["content"], "Add a README");
    assert_eq!(body["project_id"], project_id);

    let (_, list) = app
        .get(&format!("/api/suggestions/{}", project_id), None)
        .await;
    assert_eq!(list["total"], 1);
}

#[tokio::test]
async fn test_deleting_project_keeps_feedback() {
    let app = spawn_app().await;
    let owner = app.register("owner").await;
    let reader = app.register("reader").await;
    let project = app.create_project(&owner, "Tracker", None, &[]).await;
    let project_id = project["id"].as_str().unwrap();

    for text in ["first", "second"] {
        tick().await;
        let (status, _) = app
            .post(
                "/api/comments",
                Some(&reader.token),
                json!({"project_id": project_id, "content": text}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _) = app
        .post(
            "/api/suggestions",
            Some(&reader.token),
            json!({"project_id": project_id, "content": "tests"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .delete(&format!("/api/projects/{}", project_id), &owner.token)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, comments) = app
        .get(&format!("/api/comments/{}", project_id), None)
        .await;
    assert_eq!(comments["total"], 2);
    assert_eq!(comments["items"][0]["content"], "second");

    let (_, suggestions) = app
        .get(&format!("/api/suggestions/{}", project_id), None)
        .await;
    assert_eq!(suggestions["total"], 1);

    // no new feedback on a deleted project
    let (status, _) = app
        .post(
            "/api/comments",
            Some(&reader.token),
            json!({"project_id": project_id, "content": "late"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

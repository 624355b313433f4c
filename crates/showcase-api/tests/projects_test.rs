//! Project CRUD, search and the "my projects" view

mod common;

use axum::http::StatusCode;
use common::{spawn_app, tick};
use serde_json::{json, Value};

fn find<'a>(projects: &'a Value, id: &str) -> Option<&'a Value> {
    projects
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == id)
}

#[tokio::test]
async fn test_create_project_sets_creator_from_token() {
    let app = spawn_app().await;
    let owner = app.register("owner").await;

    let (status, body) = app
        .post(
            "/api/projects",
            Some(&owner.token),
            json!({
                "title": "  Tracker ",
                "codeUrl": "https://github.com/example/tracker",
                "created_by": uuid::Uuid::new_v4(),
                "tags": ["rust", "cli"]
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Tracker");
    assert_eq!(body["created_by"], owner.id.to_string());
    assert_eq!(body["code_url"], "https://github.com/example/tracker");
    assert!(body["team_id"].is_null());
    assert_eq!(body["tags"], json!(["rust", "cli"]));
}

#[tokio::test]
async fn test_create_project_validation() {
    let app = spawn_app().await;
    let owner = app.register("owner").await;

    for bad in [
        json!({"title": "", "code_url": "https://example.com/x"}),
        json!({"title": "X", "code_url": ""}),
        json!({"title": "X", "code_url": "not a url"}),
        json!({"title": "X", "code_url": "ftp://example.com/x"}),
    ] {
        let (status, body) = app.post("/api/projects", Some(&owner.token), bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    let (status, _) = app
        .post(
            "/api/projects",
            None,
            json!({"title": "X", "code_url": "https://example.com/x"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_team_scope_requires_membership() {
    let app = spawn_app().await;
    let owner = app.register("owner").await;
    let outsider = app.register("outsider").await;
    let team = app.create_team(&owner, "Crabs", true).await;

    let (status, _) = app
        .post(
            "/api/projects",
            Some(&outsider.token),
            json!({
                "title": "Sneaky",
                "code_url": "https://example.com/sneaky",
                "team_id": team["id"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/api/projects",
            Some(&owner.token),
            json!({
                "title": "Lost",
                "code_url": "https://example.com/lost",
                "teamId": uuid::Uuid::new_v4()
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_team_project_visible_to_every_member() {
    let app = spawn_app().await;
    let u1 = app.register("alice").await;
    let u2 = app.register("bobby").await;
    let u3 = app.register("carol").await;
    let outsider = app.register("dave").await;

    let team = app.create_team(&u1, "Crew", true).await;
    let team_id = team["id"].as_str().unwrap();
    app.join(team_id, &u2).await;
    app.join(team_id, &u3).await;

    let project = app.create_project(&u2, "Shared", Some(team_id), &[]).await;
    let project_id = project["id"].as_str().unwrap();
    let solo = app.create_project(&outsider, "Solo", None, &[]).await;

    for member in [&u1, &u2, &u3] {
        let (status, mine) = app.get("/api/users/me/projects", Some(&member.token)).await;
        assert_eq!(status, StatusCode::OK);

        let entry = find(&mine["projects"], project_id).expect("team project listed");
        assert_eq!(entry["is_team_project"], true);
        assert_eq!(entry["is_direct_owner"], member.id == u2.id);
        assert_eq!(entry["can_edit"], member.id == u2.id);
        assert!(find(&mine["projects"], solo["id"].as_str().unwrap()).is_none());
    }

    let (_, mine) = app.get("/api/users/me/projects", Some(&outsider.token)).await;
    assert_eq!(mine["total"], 1);
    assert!(find(&mine["projects"], project_id).is_none());
}

#[tokio::test]
async fn test_only_creator_or_admin_edit_project() {
    let app = spawn_app().await;
    let owner = app.register("owner").await;
    let teammate = app.register("teammate").await;
    let admin = app.admin().await;

    let team = app.create_team(&owner, "Crew", true).await;
    let team_id = team["id"].as_str().unwrap();
    app.join(team_id, &teammate).await;
    let project = app.create_project(&owner, "Board", Some(team_id), &[]).await;
    let uri = format!("/api/projects/{}", project["id"].as_str().unwrap());

    let (status, _) = app.put(&uri, &teammate.token, json!({"title": "Mine"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&uri, &teammate.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .put(
            &uri,
            &owner.token,
            json!({"description": "Kanban board", "code_url": "https://gitlab.com/o/board"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Board");
    assert_eq!(body["description"], "Kanban board");
    assert_eq!(body["team_id"], team_id);

    let (status, _) = app
        .put(&uri, &owner.token, json!({"code_url": "mailto:me@example.com"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.put(&uri, &admin.token, json!({"team_id": null})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["team_id"].is_null());

    let (status, _) = app.delete(&uri, &admin.token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_deleted_project_disappears() {
    let app = spawn_app().await;
    let owner = app.register("owner").await;
    let project = app.create_project(&owner, "Gone", None, &["old"]).await;
    let uri = format!("/api/projects/{}", project["id"].as_str().unwrap());

    let (status, _) = app.delete(&uri, &owner.token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&uri, &owner.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.put(&uri, &owner.token, json!({"title": "Back"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.get("/api/projects", None).await;
    assert_eq!(list["total"], 0);

    let (_, tags) = app.get("/api/projects/tags", None).await;
    assert_eq!(tags["tags"], json!([]));

    let (_, mine) = app.get("/api/users/me/projects", Some(&owner.token)).await;
    assert_eq!(mine["total"], 0);
}

#[tokio::test]
async fn test_list_projects_filters() {
    let app = spawn_app().await;
    let u1 = app.register("alice").await;
    let u2 = app.register("bobby").await;
    let team = app.create_team(&u1, "Crew", true).await;
    let team_id = team["id"].as_str().unwrap();

    app.create_project(&u1, "Tracker", None, &["Rust", "cli"]).await;
    app.create_project(&u1, "Dashboard", Some(team_id), &["web"]).await;
    tick().await;
    app.create_project(&u2, "Notebook", None, &["python", "web"]).await;

    let (status, all) = app.get("/api/projects", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["total"], 3);
    assert_eq!(all["limit"], 100);
    assert_eq!(all["projects"][0]["title"], "Notebook");

    let (_, by_text) = app.get("/api/projects?q=TRACK", None).await;
    assert_eq!(by_text["total"], 1);
    assert_eq!(by_text["projects"][0]["title"], "Tracker");

    let (_, by_tag) = app.get("/api/projects?tags=web,go", None).await;
    assert_eq!(by_tag["total"], 2);

    let (_, by_tag_case) = app.get("/api/projects?tags=rust", None).await;
    assert_eq!(by_tag_case["total"], 1);

    let (_, by_team) = app
        .get(&format!("/api/projects?team_id={}", team_id), None)
        .await;
    assert_eq!(by_team["total"], 1);
    assert_eq!(by_team["projects"][0]["title"], "Dashboard");

    let (_, by_creator) = app
        .get(&format!("/api/projects?created_by={}", u2.id), None)
        .await;
    assert_eq!(by_creator["total"], 1);

    let (_, page) = app.get("/api/projects?offset=2&limit=5000", None).await;
    assert_eq!(page["total"], 3);
    assert_eq!(page["limit"], 1000);
    assert_eq!(page["projects"].as_array().unwrap().len(), 1);

    let (_, tags) = app.get("/api/projects/tags", None).await;
    assert_eq!(tags["tags"], json!(["cli", "python", "rust", "web"]));
}

#[tokio::test]
async fn test_tags_are_case_folded() {
    let app = spawn_app().await;
    let u1 = app.register("alice").await;
    let u2 = app.register("bobby").await;

    let project = app
        .create_project(&u1, "Tracker", None, &["Rust", " CLI ", "rust"])
        .await;
    assert_eq!(project["tags"], json!(["rust", "cli"]));
    app.create_project(&u2, "Compiler", None, &["RUST"]).await;

    let (_, tags) = app.get("/api/projects/tags", None).await;
    assert_eq!(tags["tags"], json!(["cli", "rust"]));

    let (_, by_tag) = app.get("/api/projects?tags=Rust", None).await;
    assert_eq!(by_tag["total"], 2);
}

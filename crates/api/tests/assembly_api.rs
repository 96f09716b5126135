//! Integration tests for child attach, detach, replace, and relation edits.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, TestApp};
use piniplm_core::flatten::MAX_ASSEMBLY_DEPTH;
use piniplm_core::types::{InstanceId, PartId};
use serde_json::{json, Value};

async fn attach(app: &TestApp, parent: PartId, child: PartId) -> Value {
    let response = app
        .post_json(
            &format!("/api/v1/parts/{parent}/children"),
            json!({"child_id": child}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[tokio::test]
async fn attach_creates_instance_with_default_transform() {
    let app = build_test_app().await;
    let a = app.seed_part("A").await;
    let b = app.seed_part("B").await;

    let instance = attach(&app, a, b).await;

    assert_eq!(instance["parent_id"], a.to_string());
    assert_eq!(instance["part_id"], b.to_string());
    assert_eq!(instance["position"], json!({"x": 0.0, "y": 0.0, "z": 0.0}));

    let parent = body_json(app.get(&format!("/api/v1/parts/{a}")).await).await;
    let children = parent["data"]["children"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["instance_id"], instance["id"]);
}

#[tokio::test]
async fn attaching_twice_creates_two_instances_and_removes_root() {
    let app = build_test_app().await;
    let a = app.seed_part("A").await;
    let b = app.seed_part("B").await;

    let first = attach(&app, a, b).await;
    let second = attach(&app, a, b).await;
    assert_ne!(first["id"], second["id"]);

    let scene = body_json(app.get("/api/v1/scene").await).await;
    let names: Vec<&str> = scene["data"]["instances"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["display_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A", "B [1]", "B [2]"]);
}

#[tokio::test]
async fn attach_with_explicit_transform() {
    let app = build_test_app().await;
    let a = app.seed_part("A").await;
    let b = app.seed_part("B").await;

    let response = app
        .post_json(
            &format!("/api/v1/parts/{a}/children"),
            json!({"child_id": b, "position": {"x": 1.0, "y": 2.0, "z": 3.0}}),
        )
        .await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["position"], json!({"x": 1.0, "y": 2.0, "z": 3.0}));
    assert_eq!(json["data"]["rotation"], json!({"x": 0.0, "y": 0.0, "z": 0.0}));
}

#[tokio::test]
async fn attach_unknown_child_is_404() {
    let app = build_test_app().await;
    let a = app.seed_part("A").await;

    let response = app
        .post_json(
            &format!("/api/v1/parts/{a}/children"),
            json!({"child_id": PartId::new()}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn attach_creating_cycle_is_conflict() {
    let app = build_test_app().await;
    let a = app.seed_part("A").await;
    let b = app.seed_part("B").await;
    attach(&app, a, b).await;

    let response = app
        .post_json(
            &format!("/api/v1/parts/{b}/children"),
            json!({"child_id": a}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CYCLE_DETECTED");

    let self_loop = app
        .post_json(
            &format!("/api/v1/parts/{a}/children"),
            json!({"child_id": a}),
        )
        .await;
    assert_eq!(self_loop.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn detach_removes_only_that_instance() {
    let app = build_test_app().await;
    let a = app.seed_part("A").await;
    let b = app.seed_part("B").await;
    let first = attach(&app, a, b).await;
    let second = attach(&app, a, b).await;

    let response = app
        .delete(&format!(
            "/api/v1/parts/{a}/children/{}",
            first["id"].as_str().unwrap()
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let parent = body_json(app.get(&format!("/api/v1/parts/{a}")).await).await;
    let children = parent["data"]["children"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["instance_id"], second["id"]);
    assert_eq!(
        app.get(&format!("/api/v1/parts/{b}")).await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn detach_unknown_instance_is_404() {
    let app = build_test_app().await;
    let a = app.seed_part("A").await;

    let response = app
        .delete(&format!("/api/v1/parts/{a}/children/{}", InstanceId::new()))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn replace_keeps_instance_id_and_transform() {
    let app = build_test_app().await;
    let a = app.seed_part("A").await;
    let b = app.seed_part("B").await;
    let c = app.seed_part("C").await;
    let slot = attach(&app, a, b).await;
    let slot_id = slot["id"].as_str().unwrap().to_string();
    app.put_json(
        &format!("/api/v1/parts/{a}/children/{slot_id}/relation"),
        json!({"rotation": {"x": 0.0, "y": 1.5, "z": 0.0}}),
    )
    .await;

    let response = app
        .put_json(
            &format!("/api/v1/parts/{a}/children/{slot_id}"),
            json!({"new_child_id": c}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], slot_id);
    assert_eq!(json["data"]["part_id"], c.to_string());
    assert_eq!(json["data"]["rotation"], json!({"x": 0.0, "y": 1.5, "z": 0.0}));

    // B is no longer placed anywhere, so it renders as a root again.
    let scene = body_json(app.get("/api/v1/scene").await).await;
    let keys: Vec<&str> = scene["data"]["instances"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["render_key"].as_str().unwrap())
        .collect();
    assert!(keys.contains(&b.to_string().as_str()));
    assert!(keys.contains(&slot_id.as_str()));
}

#[tokio::test]
async fn replace_creating_cycle_is_conflict() {
    let app = build_test_app().await;
    let a = app.seed_part("A").await;
    let b = app.seed_part("B").await;
    let c = app.seed_part("C").await;
    attach(&app, a, b).await;
    let slot = attach(&app, b, c).await;

    let response = app
        .put_json(
            &format!("/api/v1/parts/{b}/children/{}", slot["id"].as_str().unwrap()),
            json!({"new_child_id": a}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn relation_update_is_partial_and_scoped() {
    let app = build_test_app().await;
    let a = app.seed_part("A").await;
    let b = app.seed_part("B").await;
    let first = attach(&app, a, b).await;
    let second = attach(&app, a, b).await;

    let response = app
        .put_json(
            &format!(
                "/api/v1/parts/{a}/children/{}/relation",
                first["id"].as_str().unwrap()
            ),
            json!({"position": {"x": 4.0, "y": 0.0, "z": 0.0}}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let parent = body_json(app.get(&format!("/api/v1/parts/{a}")).await).await;
    let children = parent["data"]["children"].as_array().unwrap();
    let find = |id: &Value| {
        children
            .iter()
            .find(|c| c["instance_id"] == *id)
            .unwrap()
            .clone()
    };
    assert_eq!(find(&first["id"])["position"]["x"], 4.0);
    assert_eq!(find(&second["id"])["position"]["x"], 0.0);
}

#[tokio::test]
async fn relation_under_wrong_parent_is_404() {
    let app = build_test_app().await;
    let a = app.seed_part("A").await;
    let b = app.seed_part("B").await;
    let c = app.seed_part("C").await;
    let slot = attach(&app, a, b).await;

    let response = app
        .put_json(
            &format!(
                "/api/v1/parts/{c}/children/{}/relation",
                slot["id"].as_str().unwrap()
            ),
            json!({"position": {"x": 1.0, "y": 0.0, "z": 0.0}}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deepest_allowed_assembly_still_renders_and_deeper_is_rejected() {
    let app = build_test_app().await;
    let mut parent = app.seed_part("level-0").await;
    for level in 1..=MAX_ASSEMBLY_DEPTH {
        let child = app.seed_part(&format!("level-{level}")).await;
        attach(&app, parent, child).await;
        parent = child;
    }

    let scene = app.get("/api/v1/scene").await;
    assert_eq!(scene.status(), StatusCode::OK);
    let json = body_json(scene).await;
    let instances = json["data"]["instances"].as_array().unwrap();
    assert_eq!(instances.len(), MAX_ASSEMBLY_DEPTH + 1);

    let extra = app.seed_part("one-too-many").await;
    let response = app
        .post_json(
            &format!("/api/v1/parts/{parent}/children"),
            json!({"child_id": extra}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "DEPTH_EXCEEDED");
    assert_eq!(
        app.get("/api/v1/scene").await.status(),
        StatusCode::OK
    );
}

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (username, role) in [("alice", "user"), ("root", "admin")] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, role) VALUES (?, ?, ?)",
            vec![username.into(), "password".into(), role.into()],
        ))
        .await
        .unwrap();
    }

    let engine = engine::Engine::builder().database(db.clone()).build();
    router(ServerState {
        engine: Arc::new(engine),
        db,
    })
}

fn basic_auth(username: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:password")))
}

fn request(method: &str, uri: &str, username: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth(username));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn requests_without_credentials_are_rejected() {
    let app = app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/categories")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_credentials_are_unauthorized() {
    let app = app().await;

    let response = app
        .oneshot(request("GET", "/categories", "mallory", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_category_creation_is_active_without_a_thread() {
    let app = app().await;

    let response = app
        .oneshot(request(
            "POST",
            "/categories",
            "root",
            Some(json!({"name": "Food", "color": "#ff8800", "icon": null, "note": null})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["state"], "active");
    assert!(body["notification_id"].is_null());
}

#[tokio::test]
async fn user_category_creation_opens_an_approval_thread() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/categories",
            "alice",
            Some(json!({"name": "Games", "color": "#00ff00", "icon": null, "note": "for my hobby"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["state"], "pending");
    let notification_id = body["notification_id"].as_str().unwrap().to_string();

    // The thread opens requested, with the creator's note as seq 0.
    let response = app
        .oneshot(request("GET", "/notifications", "alice", None))
        .await
        .unwrap();
    let body = json_body(response).await;
    let thread = &body["notifications"][0];
    assert_eq!(thread["id"], notification_id.as_str());
    assert_eq!(thread["status"], "requested");
    assert_eq!(thread["messages"][0]["body"], "for my hobby");
    assert_eq!(thread["messages"][0]["sender"], "user");
}

#[tokio::test]
async fn duplicate_category_returns_conflict() {
    let app = app().await;

    let payload = json!({"name": "Food", "color": "#ff8800", "icon": null, "note": null});
    let response = app
        .clone()
        .oneshot(request("POST", "/categories", "root", Some(payload.clone())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(request("POST", "/categories", "root", Some(payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn users_cannot_flip_category_state() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/categories",
            "alice",
            Some(json!({"name": "Games", "color": "#00ff00", "icon": null, "note": null})),
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    let id = body["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/categories/{id}/state"),
            "alice",
            Some(json!({"active": true})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(request(
            "POST",
            &format!("/categories/{id}/state"),
            "root",
            Some(json!({"active": true})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["state"], "active");
}

#[tokio::test]
async fn expense_flow_updates_budget_spend() {
    let app = app().await;
    let today = chrono::Utc::now().date_naive();
    let start = today - chrono::Days::new(3);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/categories",
            "root",
            Some(json!({"name": "Food", "color": "#ff8800", "icon": null, "note": null})),
        ))
        .await
        .unwrap();
    let category_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/budgets",
            "alice",
            Some(json!({
                "name": "Food budget",
                "amount_minor": 50000,
                "period": "monthly",
                "category_id": category_id,
                "start_date": start,
                "threshold_pct": null,
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let budget = json_body(response).await;
    assert_eq!(budget["spent_minor"], 0);
    assert_eq!(budget["status"], "good");
    let budget_id = budget["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/expenses",
            "alice",
            Some(json!({
                "category_id": category_id,
                "amount_minor": 60000,
                "description": "groceries",
                "date": today,
                "payment_method": "card",
                "recurring": false,
                "frequency": null,
                "attachments": [],
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let expense = json_body(response).await;
    assert_eq!(expense["approval_status"], "requested");

    let response = app
        .oneshot(request("GET", &format!("/budgets/{budget_id}"), "alice", None))
        .await
        .unwrap();
    let budget = json_body(response).await;
    assert_eq!(budget["spent_minor"], 60000);
    assert_eq!(budget["status"], "exceeded");
}

#[tokio::test]
async fn expense_approval_is_admin_only_and_terminal() {
    let app = app().await;
    let today = chrono::Utc::now().date_naive();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/categories",
            "root",
            Some(json!({"name": "Food", "color": "#ff8800", "icon": null, "note": null})),
        ))
        .await
        .unwrap();
    let category_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/expenses",
            "alice",
            Some(json!({
                "category_id": category_id,
                "amount_minor": 1500,
                "description": "coffee",
                "date": today,
                "payment_method": "cash",
                "recurring": false,
                "frequency": null,
                "attachments": [],
            })),
        ))
        .await
        .unwrap();
    let expense_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let uri = format!("/expenses/{expense_id}/approval");
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &uri,
            "alice",
            Some(json!({"status": "approved", "note": null})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &uri,
            "root",
            Some(json!({"status": "approved", "note": "ok"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["approval_status"], "approved");
    assert_eq!(body["approval_note"], "ok");

    let response = app
        .oneshot(request(
            "POST",
            &uri,
            "root",
            Some(json!({"status": "denied", "note": null})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn expense_patch_distinguishes_null_from_absent() {
    let app = app().await;
    let today = chrono::Utc::now().date_naive();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/categories",
            "root",
            Some(json!({"name": "Food", "color": "#ff8800", "icon": null, "note": null})),
        ))
        .await
        .unwrap();
    let category_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/expenses",
            "alice",
            Some(json!({
                "category_id": category_id,
                "amount_minor": 1000,
                "description": "subscription",
                "date": today,
                "payment_method": "card",
                "recurring": true,
                "frequency": "monthly",
                "attachments": [],
            })),
        ))
        .await
        .unwrap();
    let expense_id = json_body(response).await["id"].as_str().unwrap().to_string();
    let uri = format!("/expenses/{expense_id}");

    // An omitted field leaves the stored frequency untouched.
    let response = app
        .clone()
        .oneshot(request("PATCH", &uri, "alice", Some(json!({"amount_minor": 2000}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["frequency"], "monthly");

    // Clearing the frequency while the expense stays recurring is rejected.
    let response = app
        .clone()
        .oneshot(request("PATCH", &uri, "alice", Some(json!({"frequency": null}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // An explicit null together with recurring=false clears it.
    let response = app
        .oneshot(request(
            "PATCH",
            &uri,
            "alice",
            Some(json!({"recurring": false, "frequency": null})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["recurring"], false);
    assert!(body["frequency"].is_null());
}

#[tokio::test]
async fn notification_resolution_round_trip() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/notifications",
            "alice",
            Some(json!({"kind": "category", "message": "please approve"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/notifications/{id}/reply"),
            "root",
            Some(json!({"message": "which color?"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/notifications/{id}/status"),
            "root",
            Some(json!({"status": "approved", "message": "done"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "approved");
    let senders: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["sender"].as_str().unwrap())
        .collect();
    assert_eq!(senders, vec!["user", "admin", "admin"]);

    // Already terminal.
    let response = app
        .oneshot(request(
            "POST",
            &format!("/notifications/{id}/status"),
            "root",
            Some(json!({"status": "denied", "message": "changed my mind"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn notification_listing_is_scoped() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/notifications",
            "alice",
            Some(json!({"kind": "expense", "message": "big purchase"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(request("GET", "/notifications", "root", None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["notifications"].as_array().unwrap().len(), 0);

    let response = app
        .clone()
        .oneshot(request("GET", "/notifications/all", "root", None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["notifications"].as_array().unwrap().len(), 1);

    let response = app
        .oneshot(request("GET", "/notifications/all", "alice", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn pending_categories_are_hidden_from_users() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/categories",
            "alice",
            Some(json!({"name": "Games", "color": "#00ff00", "icon": null, "note": null})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(request("GET", "/categories", "alice", None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["categories"].as_array().unwrap().len(), 0);

    let response = app
        .oneshot(request("GET", "/categories", "root", None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["categories"].as_array().unwrap().len(), 1);
}

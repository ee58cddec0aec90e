//! End-to-end tests: a real server on an ephemeral port, driven through
//! the HTTP client and the client-side store. Account-service behavior is
//! exercised against a stub that honors the same envelope contract.

use std::fs;
use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};

use tickbox::api::{self, AppState};
use tickbox::client::store::TodoStore;
use tickbox::client::{ApiClient, ClientError, Credentials, ListQuery, Registration, TodoDraft};
use tickbox::model::Priority;
use tickbox::store::Store;

// ── Harness ────────────────────────────────────────────────────

/// Boots a fresh server over its own temp task file.
async fn spawn_server(name: &str) -> (String, String) {
    let path = format!("/tmp/tickbox_api_{name}_{}.redb", std::process::id());
    let _ = fs::remove_file(&path);
    let store = Store::open(&path).unwrap();
    let app = api::router(Arc::new(AppState { store }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/api"), path)
}

/// Stub of the account service: login hands out a fixed token, the user
/// endpoint wants it back as a bearer header.
async fn spawn_account_stub() -> String {
    async fn login() -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "success": true,
            "data": {
                "token": "tok-123",
                "user": { "id": 1, "name": "Ada", "email": "ada@example.com" }
            },
            "message": "Login successful"
        }))
    }

    async fn register(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "success": true,
            "data": {
                "token": "tok-456",
                "user": { "id": 2, "name": body["name"], "email": body["email"] }
            },
            "message": "Registration successful"
        }))
    }

    async fn user(headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v == "Bearer tok-123");
        if authorized {
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "success": true,
                    "data": { "id": 1, "name": "Ada", "email": "ada@example.com" },
                    "message": "User retrieved successfully"
                })),
            )
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "success": false,
                    "data": null,
                    "message": "Unauthenticated."
                })),
            )
        }
    }

    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/register", post(register))
        .route("/api/user", get(user));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

// ── Task CRUD ──────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_the_stored_task() {
    let (base, path) = spawn_server("create").await;
    let client = ApiClient::new(&base);

    let todo = client
        .create_todo(&TodoDraft {
            description: Some("Milk and eggs".into()),
            category: Some("Errands".into()),
            priority: Some(Priority::High),
            ..TodoDraft::titled("Buy groceries")
        })
        .await
        .unwrap();

    assert_eq!(todo.id, 1);
    assert_eq!(todo.title, "Buy groceries");
    assert!(!todo.completed);
    assert_eq!(todo.user_id, None);
    assert_eq!(todo.priority, Some(Priority::High));

    let fetched = client.get_todo(todo.id).await.unwrap();
    assert_eq!(fetched, todo);

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn envelopes_and_status_codes_follow_the_contract() {
    let (base, path) = spawn_server("envelope").await;
    let http = reqwest::Client::new();

    let res = http
        .post(format!("{base}/todos"))
        .json(&serde_json::json!({ "title": "Read a book" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 201);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Todo created successfully");
    assert_eq!(body["data"]["id"], 1);
    assert!(body["data"]["due_date"].is_null());
    assert!(body["data"]["user_id"].is_null());

    let res = http
        .get(format!("{base}/todos/999999"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());
    assert_eq!(body["message"], "Todo not found");

    // Non-numeric ids behave like missing tasks.
    let res = http.get(format!("{base}/todos/abc")).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 404);

    let res = http
        .post(format!("{base}/todos"))
        .json(&serde_json::json!({ "priority": "urgent" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 422);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "The title field is required. (and 1 more error)"
    );
    assert_eq!(body["data"]["title"][0], "The title field is required.");
    assert_eq!(body["data"]["priority"][0], "The selected priority is invalid.");

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn toggle_then_filter_by_completion() {
    let (base, path) = spawn_server("toggle").await;
    let client = ApiClient::new(&base);

    let a = client.create_todo(&TodoDraft::titled("one")).await.unwrap();
    let b = client.create_todo(&TodoDraft::titled("two")).await.unwrap();

    let toggled = client.toggle_todo(a.id).await.unwrap();
    assert!(toggled.completed);
    assert!(toggled.updated_at >= a.updated_at);

    let mut query = ListQuery::default();
    query.completed = "true".into();
    let done = client.get_todos(&query).await.unwrap();
    assert_eq!(done.iter().map(|t| t.id).collect::<Vec<_>>(), vec![a.id]);

    query.completed = "0".into();
    let open = client.get_todos(&query).await.unwrap();
    assert_eq!(open.iter().map(|t| t.id).collect::<Vec<_>>(), vec![b.id]);

    let toggled = client.toggle_todo(a.id).await.unwrap();
    assert!(!toggled.completed);

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn search_and_sort_through_query_parameters() {
    let (base, path) = spawn_server("search").await;
    let client = ApiClient::new(&base);

    client
        .create_todo(&TodoDraft {
            category: Some("Home".into()),
            ..TodoDraft::titled("Clean kitchen")
        })
        .await
        .unwrap();
    client
        .create_todo(&TodoDraft {
            description: Some("weekly groceries run".into()),
            category: Some("Errands".into()),
            ..TodoDraft::titled("Shopping")
        })
        .await
        .unwrap();
    client
        .create_todo(&TodoDraft {
            category: Some("Errands".into()),
            ..TodoDraft::titled("Groceries list")
        })
        .await
        .unwrap();

    // Substring search covers descriptions too; default order is newest first.
    let mut query = ListQuery::default();
    query.search = "groceries".into();
    let found = client.get_todos(&query).await.unwrap();
    assert_eq!(found.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 2]);

    let mut query = ListQuery::default();
    query.sort_by = "title".into();
    query.sort_order = "asc".into();
    let titles: Vec<String> = client
        .get_todos(&query)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["Clean kitchen", "Groceries list", "Shopping"]);

    let mut query = ListQuery::default();
    query.category = "Errands".into();
    assert_eq!(client.get_todos(&query).await.unwrap().len(), 2);

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn update_patches_only_named_fields() {
    let (base, path) = spawn_server("update").await;
    let client = ApiClient::new(&base);

    let todo = client
        .create_todo(&TodoDraft {
            description: Some("original".into()),
            category: Some("Home".into()),
            ..TodoDraft::titled("before")
        })
        .await
        .unwrap();

    let updated = client
        .update_todo(todo.id, &TodoDraft::titled("after"))
        .await
        .unwrap();
    assert_eq!(updated.title, "after");
    assert_eq!(updated.description.as_deref(), Some("original"));
    assert_eq!(updated.category.as_deref(), Some("Home"));

    // Explicit null clears a nullable field without touching the rest.
    let http = reqwest::Client::new();
    let res = http
        .put(format!("{base}/todos/{}", todo.id))
        .json(&serde_json::json!({ "description": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["data"]["description"].is_null());
    assert_eq!(body["data"]["category"], "Home");

    // A supplied title still cannot be blank.
    let result = client
        .update_todo(
            todo.id,
            &TodoDraft {
                title: Some("   ".into()),
                ..TodoDraft::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ClientError::Api { status: 422, .. })));

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn delete_shrinks_the_collection() {
    let (base, path) = spawn_server("delete").await;
    let client = ApiClient::new(&base);

    let a = client
        .create_todo(&TodoDraft {
            category: Some("Work".into()),
            ..TodoDraft::titled("doomed")
        })
        .await
        .unwrap();
    client.create_todo(&TodoDraft::titled("survivor")).await.unwrap();

    client.delete_todo(a.id).await.unwrap();

    match client.get_todo(a.id).await {
        Err(ClientError::Api { status: 404, message }) => {
            assert_eq!(message, "Todo not found");
        }
        other => panic!("expected 404, got {other:?}"),
    }

    let stats = client.get_stats().await.unwrap();
    assert_eq!(stats.total, 1);

    let result = client.delete_todo(a.id).await;
    assert!(matches!(result, Err(ClientError::Api { status: 404, .. })));

    let _ = fs::remove_file(&path);
}

// ── Aggregates ─────────────────────────────────────────────────

#[tokio::test]
async fn stats_reflect_the_collection() {
    let (base, path) = spawn_server("stats").await;
    let client = ApiClient::new(&base);

    let today = chrono::Utc::now().date_naive();
    let yesterday = today.pred_opt().unwrap();
    let tomorrow = today.succ_opt().unwrap();

    for i in 0..3 {
        let t = client
            .create_todo(&TodoDraft::titled(format!("done {i}")))
            .await
            .unwrap();
        client.toggle_todo(t.id).await.unwrap();
    }
    client
        .create_todo(&TodoDraft {
            due_date: Some(yesterday),
            priority: Some(Priority::High),
            ..TodoDraft::titled("late")
        })
        .await
        .unwrap();
    client
        .create_todo(&TodoDraft {
            due_date: Some(tomorrow),
            priority: Some(Priority::Low),
            ..TodoDraft::titled("soon")
        })
        .await
        .unwrap();

    let stats = client.get_stats().await.unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.completed, 3);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.total, stats.completed + stats.pending);
    assert_eq!(stats.overdue, 1);
    assert_eq!(stats.by_priority.high, 1);
    assert_eq!(stats.by_priority.medium, 0);
    assert_eq!(stats.by_priority.low, 1);

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn categories_come_back_sorted_and_distinct() {
    let (base, path) = spawn_server("categories").await;
    let client = ApiClient::new(&base);

    for (title, category) in [
        ("one", Some("Work")),
        ("two", Some("Errands")),
        ("three", Some("Work")),
        ("four", None),
    ] {
        client
            .create_todo(&TodoDraft {
                category: category.map(str::to_string),
                ..TodoDraft::titled(title)
            })
            .await
            .unwrap();
    }

    assert_eq!(
        client.get_categories().await.unwrap(),
        vec!["Errands", "Work"]
    );

    let _ = fs::remove_file(&path);
}

// ── Client store ───────────────────────────────────────────────

#[tokio::test]
async fn client_store_tracks_the_server() {
    let (base, path) = spawn_server("client_store").await;
    let mut store = TodoStore::new(ApiClient::new(&base));

    let added = store
        .add_todo(&TodoDraft {
            category: Some("Work".into()),
            ..TodoDraft::titled("Ship it")
        })
        .await
        .unwrap();
    assert_eq!(store.todos.first().map(|t| t.id), Some(added.id));
    assert!(!store.loading);
    assert_eq!(store.error, None);
    assert_eq!(store.stats.as_ref().map(|s| s.total), Some(1));
    assert_eq!(store.categories, vec!["Work"]);

    store.toggle_todo(added.id).await.unwrap();
    assert!(store.todos[0].completed);
    assert_eq!(store.stats.as_ref().map(|s| s.completed), Some(1));

    store.filters.completed = "1".into();
    store.fetch_todos().await.unwrap();
    assert_eq!(store.todos.len(), 1);

    store.clear_filters();
    store.delete_todo(added.id).await.unwrap();
    assert!(store.todos.is_empty());
    assert_eq!(store.stats.as_ref().map(|s| s.total), Some(0));
    assert!(store.categories.is_empty());

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn client_store_surfaces_server_messages() {
    let (base, path) = spawn_server("store_errors").await;
    let mut store = TodoStore::new(ApiClient::new(&base));

    let result = store.add_todo(&TodoDraft::default()).await;
    assert!(matches!(result, Err(ClientError::Api { status: 422, .. })));
    // The field-level wording reaches the store, not a generic summary.
    assert_eq!(store.error.as_deref(), Some("The title field is required."));
    assert!(!store.loading);
    assert!(store.todos.is_empty());

    // The next successful action clears the error.
    store.add_todo(&TodoDraft::titled("recovered")).await.unwrap();
    assert_eq!(store.error, None);

    let _ = fs::remove_file(&path);
}

// ── Sessions ───────────────────────────────────────────────────

#[tokio::test]
async fn session_tokens_flow_through_the_account_service() {
    let base = spawn_account_stub().await;
    let token_path = format!("/tmp/tickbox_itoken_{}.txt", std::process::id());
    let _ = fs::remove_file(&token_path);

    let client = ApiClient::with_token_file(&base, &token_path);

    // No token yet: the protected endpoint turns us away.
    assert!(matches!(
        client.get_user().await,
        Err(ClientError::Unauthenticated)
    ));

    let session = client
        .login(&Credentials {
            email: "ada@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    assert_eq!(session.user.name, "Ada");
    assert_eq!(client.token().as_deref(), Some("tok-123"));

    let user = client.get_user().await.unwrap();
    assert_eq!(user.email, "ada@example.com");

    // A client sharing the token file starts out authenticated.
    let revived = ApiClient::with_token_file(&base, &token_path);
    assert_eq!(revived.token().as_deref(), Some("tok-123"));

    // Logout forgets the local token even when the server call fails.
    let _ = revived.logout().await;
    assert_eq!(revived.token(), None);

    let _ = fs::remove_file(&token_path);
}

#[tokio::test]
async fn registration_signs_the_client_in() {
    let base = spawn_account_stub().await;
    let client = ApiClient::new(&base);
    assert_eq!(client.token(), None);

    let session = client
        .register(&Registration {
            name: "Grace".into(),
            email: "grace@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    assert_eq!(session.user.name, "Grace");
    assert_eq!(session.user.email, "grace@example.com");
    assert_eq!(client.token().as_deref(), Some("tok-456"));
}

#[tokio::test]
async fn a_rejected_token_is_dropped() {
    let base = spawn_account_stub().await;
    let token_path = format!("/tmp/tickbox_rtoken_{}.txt", std::process::id());
    fs::write(&token_path, "stale-token").unwrap();

    let client = ApiClient::with_token_file(&base, &token_path);
    assert_eq!(client.token().as_deref(), Some("stale-token"));

    assert!(matches!(
        client.get_user().await,
        Err(ClientError::Unauthenticated)
    ));
    assert_eq!(client.token(), None);
    assert!(!std::path::Path::new(&token_path).exists());
}

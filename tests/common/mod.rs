//! Common test utilities and helpers
//!
//! - `TestApp`: the full router over a fresh in-memory store, with one
//!   signed-in user, their workspace and request helpers
//! - Custom assertion macros

#![allow(dead_code)]

pub mod assertions;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use taskboard::backend::middleware::CONNECTION_ID_HEADER;
use taskboard::backend::routes::create_router;
use taskboard::backend::server::AppState;
use taskboard::backend::store::{BoardStore, MemoryStore};
use taskboard::shared::board::Member;
use taskboard::shared::AppConfig;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Status and decoded JSON body (`Null` when the body is empty)
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub user: Member,
    pub token: String,
    pub workspace_id: Uuid,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = AppConfig::builder()
            .jwt_secret(TEST_SECRET)
            .channel_capacity(64)
            .build()
            .unwrap();
        let state = AppState::new(Arc::new(MemoryStore::new()), config);
        let router = create_router(state.clone());
        let mut app = Self {
            state,
            router,
            user: Member {
                id: Uuid::nil(),
                username: String::new(),
                email: String::new(),
            },
            token: String::new(),
            workspace_id: Uuid::nil(),
        };
        let (user, token) = app.add_user("ada").await;
        app.user = user;
        app.token = token;
        app.workspace_id = app.create_workspace("Team").await;
        app
    }

    /// Register another user and mint a token for them
    pub async fn add_user(&self, username: &str) -> (Member, String) {
        let user = Member {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
        };
        self.state.store.insert_user(&user).await.unwrap();
        let token = self
            .state
            .tokens
            .create_token(user.id, Some(user.username.clone()))
            .unwrap();
        (user, token)
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        self.send_as(Some(&self.token), None, method, uri, body).await
    }

    /// Full control over credential and origin connection
    pub async fn send_as(
        &self,
        token: Option<&str>,
        connection: Option<Uuid>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(id) = connection {
            builder = builder.header(CONNECTION_ID_HEADER, id.to_string());
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, body }
    }

    // ---- fixtures ----

    pub async fn create_workspace(&self, name: &str) -> Uuid {
        let res = self
            .post("/api/workspaces", serde_json::json!({ "name": name }))
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
        id_of(&res.body)
    }

    pub async fn create_board(&self, name: &str) -> Uuid {
        self.create_board_in(self.workspace_id, name).await
    }

    pub async fn create_board_in(&self, workspace_id: Uuid, name: &str) -> Uuid {
        let res = self
            .post(
                "/api/boards",
                serde_json::json!({ "workspaceId": workspace_id, "name": name }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
        id_of(&res.body)
    }

    pub async fn create_list(&self, board_id: Uuid, name: &str) -> Uuid {
        let res = self
            .post(
                "/api/lists",
                serde_json::json!({ "boardId": board_id, "name": name }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
        id_of(&res.body)
    }

    pub async fn create_card(&self, list_id: Uuid, title: &str) -> Value {
        let res = self
            .post(
                "/api/cards",
                serde_json::json!({ "listId": list_id, "title": title }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
        res.body
    }

    pub async fn board(&self, board_id: Uuid) -> Value {
        let res = self.get(&format!("/api/boards/{}", board_id)).await;
        assert_eq!(res.status, StatusCode::OK, "{:?}", res.body);
        res.body
    }
}

pub fn id_of(value: &Value) -> Uuid {
    value["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(|| panic!("no id in {}", value))
}

/// Card titles of one list in a board aggregate, in display order
pub fn card_titles(board: &Value, list_index: usize) -> Vec<String> {
    board["lists"][list_index]["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap().to_string())
        .collect()
}

/// Card positions of one list in a board aggregate, in display order
pub fn card_positions(board: &Value, list_index: usize) -> Vec<f64> {
    board["lists"][list_index]["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["position"].as_f64().unwrap())
        .collect()
}

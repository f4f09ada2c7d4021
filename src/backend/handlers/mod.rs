//! HTTP Handlers Module
//!
//! Thin axum adapters over the reader and mutation handlers. Each handler
//! authenticates through `AuthUser`, runs one mutation against the store,
//! hands the result to `AppState::commit` (which publishes its events on
//! the board channel, skipping the caller's own connection) and returns
//! the value as JSON.
//!
//! - **`workspaces`** - `/api/workspaces` (no board channel, nothing published)
//! - **`boards`** - `/api/boards`
//! - **`lists`** - `/api/lists`
//! - **`cards`** - `/api/cards`, labels and members
//! - **`checklists`** - `/api/checklists` and `/api/checklists/items`
//! - **`comments`** - `/api/comments`
//! - **`labels`** - `/api/labels`
//!
//! Creates answer 201; everything else 200.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::backend::error::BackendError;

pub mod boards;

pub mod cards;

pub mod checklists;

pub mod comments;

pub mod labels;

pub mod lists;

pub mod workspaces;

/// `Json` whose rejection is a 400 `Validation` error in the house format
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(body_error(rejection)),
        }
    }
}

fn body_error(rejection: JsonRejection) -> BackendError {
    tracing::debug!("[Board] Rejected request body: {}", rejection.body_text());
    BackendError::validation("body", rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        name: String,
    }

    fn request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_malformed_body_is_validation() {
        let result = JsonBody::<Payload>::from_request(request("{not json"), &()).await;
        assert_matches!(result, Err(BackendError::Validation { field, .. }) if field == "body");
    }

    #[tokio::test]
    async fn test_well_formed_body_passes() {
        let result = JsonBody::<Payload>::from_request(request(r#"{"name":"x"}"#), &()).await;
        assert!(result.is_ok());
    }
}

/**
 * Origin Connection
 *
 * A client that also holds a realtime connection names it in the
 * `X-Connection-Id` header so its own mutations are not echoed back.
 * The header only counts when the connection belongs to the
 * authenticated caller; anything else is ignored.
 */

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use crate::backend::middleware::auth::AuthenticatedUser;
use crate::backend::realtime::{BoardHub, ConnectionId};

pub const CONNECTION_ID_HEADER: &str = "x-connection-id";

/// The caller's own realtime connection, if it named one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OriginConnection(pub Option<ConnectionId>);

impl<S> FromRequestParts<S> for OriginConnection
where
    BoardHub: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(id) = parts
            .headers
            .get(CONNECTION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
        else {
            return Ok(OriginConnection(None));
        };
        let Some(user) = parts.extensions.get::<AuthenticatedUser>() else {
            return Ok(OriginConnection(None));
        };

        if BoardHub::from_ref(state).is_owned_by(id, user.user_id) {
            Ok(OriginConnection(Some(id)))
        } else {
            tracing::debug!(
                "[Realtime] Ignoring connection {} named by user {}",
                id,
                user.user_id
            );
            Ok(OriginConnection(None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn caller(user_id: Uuid) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id,
            username: "ada".to_string(),
        }
    }

    async fn extract(
        hub: &BoardHub,
        user: Option<AuthenticatedUser>,
        value: Option<&str>,
    ) -> OriginConnection {
        let mut builder = Request::builder().uri("/api/cards");
        if let Some(v) = value {
            builder = builder.header(CONNECTION_ID_HEADER, v);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        OriginConnection::from_request_parts(&mut parts, hub)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_own_connection_is_accepted() {
        let hub = BoardHub::new(4);
        let user_id = Uuid::new_v4();
        let (id, _rx) = hub.connect(user_id);
        assert_eq!(
            extract(&hub, Some(caller(user_id)), Some(&id.to_string())).await,
            OriginConnection(Some(id))
        );
    }

    #[tokio::test]
    async fn test_someone_elses_connection_is_ignored() {
        let hub = BoardHub::new(4);
        let (id, _rx) = hub.connect(Uuid::new_v4());
        let header = id.to_string();
        assert_eq!(
            extract(&hub, Some(caller(Uuid::new_v4())), Some(&header)).await,
            OriginConnection(None)
        );
        assert_eq!(extract(&hub, None, Some(&header)).await, OriginConnection(None));
        let unknown = Uuid::new_v4().to_string();
        assert_eq!(
            extract(&hub, Some(caller(Uuid::new_v4())), Some(&unknown)).await,
            OriginConnection(None)
        );
    }

    #[tokio::test]
    async fn test_missing_or_malformed_is_none() {
        let hub = BoardHub::new(4);
        let user = caller(Uuid::new_v4());
        assert_eq!(extract(&hub, Some(user.clone()), None).await, OriginConnection(None));
        assert_eq!(extract(&hub, Some(user), Some("nope")).await, OriginConnection(None));
    }
}

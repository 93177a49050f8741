//! Actor identity middleware

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use uuid::Uuid;

use crate::domain::entities::{Actor, Role};
use crate::error::AppError;

pub const ACTOR_ID_HEADER: &str = "X-Actor-Id";
pub const ACTOR_ROLE_HEADER: &str = "X-Actor-Role";

fn header<'a>(request: &'a Request<Body>, name: &str) -> Option<&'a str> {
    request.headers().get(name).and_then(|h| h.to_str().ok())
}

/// Parse the acting identity from the gateway headers
fn extract_actor(request: &Request<Body>) -> Option<Actor> {
    let id = header(request, ACTOR_ID_HEADER)?.trim().parse::<Uuid>().ok()?;
    let role = header(request, ACTOR_ROLE_HEADER)?.parse::<Role>().ok()?;
    if id.is_nil() {
        return None;
    }
    Some(Actor::new(id, role))
}

/// Authentication middleware
///
/// Rejects the request with 401 unless both identity headers are present
/// and valid, then injects the [`Actor`] into request extensions.
pub async fn actor_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let actor = extract_actor(&request).ok_or_else(|| {
        tracing::debug!(path = %request.uri().path(), "Missing or invalid actor headers");
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    async fn whoami(Extension(actor): Extension<Actor>) -> String {
        actor.role.to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn(actor_middleware))
    }

    fn request(id: Option<&str>, role: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/reservations");
        if let Some(id) = id {
            builder = builder.header(ACTOR_ID_HEADER, id);
        }
        if let Some(role) = role {
            builder = builder.header(ACTOR_ROLE_HEADER, role);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn parses_valid_headers() {
        let id = Uuid::new_v4();
        let actor = extract_actor(&request(Some(&id.to_string()), Some("walker"))).unwrap();
        assert_eq!(actor, Actor::new(id, Role::Walker));
    }

    #[test]
    fn rejects_missing_or_malformed_identity() {
        let id = Uuid::new_v4().to_string();
        assert!(extract_actor(&request(None, Some("admin"))).is_none());
        assert!(extract_actor(&request(Some(&id), None)).is_none());
        assert!(extract_actor(&request(Some("not-a-uuid"), Some("admin"))).is_none());
        assert!(extract_actor(&request(Some(&id), Some("superuser"))).is_none());
        assert!(extract_actor(&request(Some(&Uuid::nil().to_string()), Some("admin"))).is_none());
    }

    #[tokio::test]
    async fn middleware_injects_actor() {
        let request = Request::builder()
            .uri("/whoami")
            .header(ACTOR_ID_HEADER, Uuid::new_v4().to_string())
            .header(ACTOR_ROLE_HEADER, "admin")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn middleware_rejects_anonymous_requests() {
        let request = Request::builder()
            .uri("/whoami")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

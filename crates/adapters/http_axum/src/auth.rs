//! Owner resolution — the identity gateway's hand-off into the core.
//!
//! The deployment places an authenticating gateway in front of this
//! service; after validating credentials it forwards the request with the
//! resolved user id in the `x-user-id` header. The core never performs
//! authentication itself — it only refuses requests the gateway did not
//! annotate.

use std::str::FromStr;

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use pothub_domain::id::UserId;

/// Name of the header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the authenticated owner id.
pub struct Owner(pub UserId);

#[derive(Serialize)]
struct UnauthorizedBody {
    success: bool,
    message: &'static str,
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(UnauthorizedBody {
            success: false,
            message: "unauthorized",
        }),
    )
        .into_response()
}

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(unauthorized)?;
        let owner = UserId::from_str(raw).map_err(|_| unauthorized())?;
        Ok(Self(owner))
    }
}

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub uid: Uuid, // user_id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Caller identity for a request. `claims` is `None` when the request carried
/// no valid token; operations decide for themselves how to treat that.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub claims: Option<Claims>,
}

impl RequestContext {
    pub fn authenticated(user_id: Uuid) -> Self {
        RequestContext {
            claims: Some(Claims {
                uid: user_id,
                iat: None,
                exp: None,
            }),
        }
    }

    pub fn anonymous() -> Self {
        RequestContext::default()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.claims.as_ref().map(|claims| claims.uid)
    }
}

// Claims are placed in request extensions by the auth middleware.
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestContext {
            claims: parts.extensions.get::<Claims>().cloned(),
        })
    }
}

//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use homestay_db::entities::account;

/// Authenticated account extractor.
#[derive(Debug, Clone)]
pub struct AuthAccount(pub account::Model);

impl<S> FromRequestParts<S> for AuthAccount
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware when the bearer token resolves.
        parts
            .extensions
            .get::<account::Model>()
            .cloned()
            .map(AuthAccount)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

/// Authenticated admin extractor. Rejects non-admin accounts.
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub account::Model);

impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = parts
            .extensions
            .get::<account::Model>()
            .cloned()
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))?;

        if !account.is_admin {
            return Err((StatusCode::FORBIDDEN, "Admin privileges required"));
        }

        Ok(Self(account))
    }
}

//! API middleware.

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use homestay_core::services::{
    AccountService, DashboardService, FacilitationService, ModerationService, TerminationService,
};

use crate::sse::DashboardBroadcaster;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<AccountService>,
    pub moderation_service: Arc<ModerationService>,
    pub facilitation_service: Arc<FacilitationService>,
    pub termination_service: Arc<TerminationService>,
    pub dashboard_service: Arc<DashboardService>,
    pub dashboard_broadcaster: DashboardBroadcaster,
}

/// Authentication middleware.
///
/// Resolves a bearer token to an account and stashes it in the request
/// extensions. Handlers that require authentication pull it back out via
/// the extractors; unauthenticated requests simply carry no account.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(account) = state.account_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(account);
    }

    next.run(req).await
}

//! API endpoints.

mod accounts;
mod admin;
mod facilitations;
mod terminations;

use axum::Router;

use crate::middleware::AppState;
use crate::sse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/accounts", accounts::router())
        .nest("/admin", admin::router())
        .nest("/facilitations", facilitations::router())
        .nest("/terminations", terminations::router())
        .nest("/sse", sse::router())
}

pub(crate) use accounts::AccountResponse;
pub(crate) use facilitations::FacilitationResponse;
pub(crate) use terminations::TerminationResponse;

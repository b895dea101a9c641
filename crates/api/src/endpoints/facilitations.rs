//! Facilitation endpoints.

use axum::{Json, Router, extract::State, routing::post};
use homestay_common::AppResult;
use homestay_db::entities::facilitation;
use serde::Serialize;

use crate::{extractors::AuthAccount, middleware::AppState, response::ApiResponse};

/// Facilitation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilitationResponse {
    pub id: String,
    pub host_id: String,
    pub student_id: String,
    pub status: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl From<facilitation::Model> for FacilitationResponse {
    fn from(facilitation: facilitation::Model) -> Self {
        Self {
            id: facilitation.id,
            host_id: facilitation.host_id,
            student_id: facilitation.student_id,
            status: facilitation.status.as_str().to_string(),
            created_at: facilitation.created_at.to_rfc3339(),
            completed_at: facilitation.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// List the caller's facilitations.
async fn list_facilitations(
    AuthAccount(account): AuthAccount,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FacilitationResponse>>> {
    let facilitations = state
        .facilitation_service
        .list_for_account(&account.id)
        .await?;
    Ok(ApiResponse::ok(
        facilitations.into_iter().map(Into::into).collect(),
    ))
}

/// Create the facilitations router.
pub fn router() -> Router<AppState> {
    Router::new().route("/list", post(list_facilitations))
}

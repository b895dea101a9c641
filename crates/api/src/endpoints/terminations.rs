//! Termination request endpoints.

use axum::{Json, Router, extract::State, routing::post};
use homestay_common::AppResult;
use homestay_core::services::CreateTerminationInput;
use homestay_db::entities::termination_request;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthAccount, middleware::AppState, response::ApiResponse};

/// Termination request response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminationResponse {
    pub id: String,
    pub facilitation_id: String,
    pub requester_id: String,
    pub requester_role: String,
    pub reason: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<String>,
}

impl From<termination_request::Model> for TerminationResponse {
    fn from(request: termination_request::Model) -> Self {
        Self {
            id: request.id,
            facilitation_id: request.facilitation_id,
            requester_id: request.requester_id,
            requester_role: request.requester_role.as_str().to_string(),
            reason: request.reason,
            status: request.status.as_str().to_string(),
            admin_notes: request.admin_notes,
            reviewed_by: request.reviewed_by,
            created_at: request.created_at.to_rfc3339(),
            reviewed_at: request.reviewed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Create termination request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTerminationRequest {
    pub facilitation_id: String,
    pub reason: String,
}

/// File a termination request against one of the caller's facilitations.
async fn create_termination(
    AuthAccount(account): AuthAccount,
    State(state): State<AppState>,
    Json(req): Json<CreateTerminationRequest>,
) -> AppResult<ApiResponse<TerminationResponse>> {
    let created = state
        .termination_service
        .create_request(CreateTerminationInput {
            facilitation_id: req.facilitation_id,
            requester_id: account.id.clone(),
            requester_role: account.role,
            reason: req.reason,
        })
        .await?;

    Ok(ApiResponse::ok(created.into()))
}

/// Create the terminations router.
pub fn router() -> Router<AppState> {
    Router::new().route("/create", post(create_termination))
}

//! Account endpoints.

use axum::{Json, Router, extract::State, routing::post};
use homestay_common::{AppError, AppResult};
use homestay_core::services::RegisterAccountInput;
use homestay_db::entities::account::{self, AccountRole};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthAccount, middleware::AppState, response::ApiResponse};

/// Account response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub role: String,
    pub status: String,
    pub is_admin: bool,
    /// Only present in the signup response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspension_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban_reason: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<account::Model> for AccountResponse {
    fn from(account: account::Model) -> Self {
        Self {
            id: account.id.clone(),
            username: account.username.clone(),
            role: account.role.as_str().to_string(),
            status: account.status().as_str().to_string(),
            is_admin: account.is_admin,
            token: None,
            rejection_reason: account.rejection_reason,
            suspension_reason: account.suspension_reason,
            ban_reason: account.ban_reason,
            created_at: account.created_at.to_rfc3339(),
            updated_at: account.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Create account request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub username: String,
    /// Either "host" or "student".
    pub role: String,
}

/// Show account request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowAccountRequest {
    /// Defaults to the authenticated account.
    #[serde(default)]
    pub account_id: Option<String>,
}

fn parse_role(role: &str) -> AppResult<AccountRole> {
    match role {
        "host" => Ok(AccountRole::Host),
        "student" => Ok(AccountRole::Student),
        other => Err(AppError::Validation(format!(
            "Unknown role {other:?}, expected \"host\" or \"student\""
        ))),
    }
}

/// Sign up a new account.
async fn create_account(
    State(state): State<AppState>,
    Json(req): Json<CreateAccountRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let role = parse_role(&req.role)?;

    let created = state
        .account_service
        .register(RegisterAccountInput {
            username: req.username,
            role,
        })
        .await?;

    // The token is returned exactly once, at signup.
    let token = created.token.clone();
    let mut response = AccountResponse::from(created);
    response.token = token;

    Ok(ApiResponse::ok(response))
}

/// Show an account. Non-admins may only look at themselves.
async fn show_account(
    AuthAccount(account): AuthAccount,
    State(state): State<AppState>,
    Json(req): Json<ShowAccountRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let target_id = req.account_id.unwrap_or_else(|| account.id.clone());

    if target_id != account.id && !account.is_admin {
        return Err(AppError::Forbidden(
            "Cannot view another account".to_string(),
        ));
    }

    let target = state.account_service.get(&target_id).await?;
    Ok(ApiResponse::ok(target.into()))
}

/// Create the accounts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_account))
        .route("/show", post(show_account))
}

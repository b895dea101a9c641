//! Admin endpoints: moderation, termination adjudication, dashboard.

use axum::{Json, Router, extract::State, routing::post};
use homestay_common::{AppError, AppResult};
use homestay_core::services::{ActivityItem, DashboardStats};
use homestay_db::entities::account::AccountStatus;
use homestay_db::entities::termination_request::TerminationStatus;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::{AccountResponse, FacilitationResponse, TerminationResponse},
    extractors::AuthAdmin,
    middleware::AppState,
    response::ApiResponse,
};

/// List accounts request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountsRequest {
    /// Optional status filter: pending, verified, rejected, suspended, banned.
    #[serde(default)]
    pub status: Option<String>,
}

/// Moderation action on a single account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountActionRequest {
    pub account_id: String,
}

/// Moderation action that requires a reason.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountReasonRequest {
    pub account_id: String,
    pub reason: String,
}

/// List termination requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTerminationsRequest {
    /// Optional status filter: pending, approved, rejected.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    10
}

/// Match a host with a student.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFacilitationRequest {
    pub host_id: String,
    pub student_id: String,
}

/// Approve a termination request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveTerminationRequest {
    pub request_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Reject a termination request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectTerminationRequest {
    pub request_id: String,
    pub notes: String,
}

/// Recent activity request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// Recent activity entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub kind: String,
    pub subject_id: String,
    pub at: String,
}

impl From<ActivityItem> for ActivityResponse {
    fn from(item: ActivityItem) -> Self {
        Self {
            kind: match item.kind {
                homestay_core::services::ActivityKind::Signup => "signup".to_string(),
                homestay_core::services::ActivityKind::TerminationRequested => {
                    "termination_requested".to_string()
                }
            },
            subject_id: item.subject_id,
            at: item.at.to_rfc3339(),
        }
    }
}

fn parse_account_status(status: &str) -> AppResult<AccountStatus> {
    match status {
        "pending" => Ok(AccountStatus::Pending),
        "verified" => Ok(AccountStatus::Verified),
        "rejected" => Ok(AccountStatus::Rejected),
        "suspended" => Ok(AccountStatus::Suspended),
        "banned" => Ok(AccountStatus::Banned),
        other => Err(AppError::Validation(format!(
            "Unknown account status {other:?}"
        ))),
    }
}

fn parse_termination_status(status: &str) -> AppResult<TerminationStatus> {
    match status {
        "pending" => Ok(TerminationStatus::Pending),
        "approved" => Ok(TerminationStatus::Approved),
        "rejected" => Ok(TerminationStatus::Rejected),
        other => Err(AppError::Validation(format!(
            "Unknown termination status {other:?}"
        ))),
    }
}

/// List accounts, optionally filtered by derived status.
async fn list_accounts(
    AuthAdmin(_admin): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<ListAccountsRequest>,
) -> AppResult<ApiResponse<Vec<AccountResponse>>> {
    let status = req
        .status
        .as_deref()
        .map(parse_account_status)
        .transpose()?;

    let accounts = state.account_service.list(status).await?;
    Ok(ApiResponse::ok(
        accounts.into_iter().map(Into::into).collect(),
    ))
}

/// Approve a pending signup.
async fn verify_account(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<AccountActionRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let account = state
        .moderation_service
        .verify(&admin.id, &req.account_id)
        .await?;
    Ok(ApiResponse::ok(account.into()))
}

/// Turn down a pending signup.
async fn reject_account(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<AccountReasonRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let account = state
        .moderation_service
        .reject(&admin.id, &req.account_id, &req.reason)
        .await?;
    Ok(ApiResponse::ok(account.into()))
}

/// Return a rejected signup to the review queue.
async fn reactivate_account(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<AccountActionRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let account = state
        .moderation_service
        .reactivate(&admin.id, &req.account_id)
        .await?;
    Ok(ApiResponse::ok(account.into()))
}

/// Suspend a verified account.
async fn suspend_account(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<AccountReasonRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let account = state
        .moderation_service
        .suspend(&admin.id, &req.account_id, &req.reason)
        .await?;
    Ok(ApiResponse::ok(account.into()))
}

/// Lift a suspension.
async fn unsuspend_account(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<AccountActionRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let account = state
        .moderation_service
        .unsuspend(&admin.id, &req.account_id)
        .await?;
    Ok(ApiResponse::ok(account.into()))
}

/// Ban an account.
async fn ban_account(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<AccountReasonRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let account = state
        .moderation_service
        .ban(&admin.id, &req.account_id, &req.reason)
        .await?;
    Ok(ApiResponse::ok(account.into()))
}

/// Lift a ban.
async fn unban_account(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<AccountActionRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let account = state
        .moderation_service
        .unban(&admin.id, &req.account_id)
        .await?;
    Ok(ApiResponse::ok(account.into()))
}

/// Permanently delete an account.
async fn delete_account(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<AccountActionRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state
        .moderation_service
        .delete(&admin.id, &req.account_id)
        .await?;
    Ok(ApiResponse::ok(serde_json::json!({ "deleted": true })))
}

/// Pair a verified host with a verified student.
async fn create_facilitation(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<CreateFacilitationRequest>,
) -> AppResult<ApiResponse<FacilitationResponse>> {
    let facilitation = state
        .facilitation_service
        .create(&admin.id, &req.host_id, &req.student_id)
        .await?;
    Ok(ApiResponse::ok(facilitation.into()))
}

/// List termination requests.
async fn list_terminations(
    AuthAdmin(_admin): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<ListTerminationsRequest>,
) -> AppResult<ApiResponse<Vec<TerminationResponse>>> {
    let status = req
        .status
        .as_deref()
        .map(parse_termination_status)
        .transpose()?;

    let requests = state
        .termination_service
        .list(status, req.limit.min(100), req.offset)
        .await?;

    Ok(ApiResponse::ok(
        requests.into_iter().map(Into::into).collect(),
    ))
}

/// Approve a termination request.
async fn approve_termination(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<ApproveTerminationRequest>,
) -> AppResult<ApiResponse<TerminationResponse>> {
    let request = state
        .termination_service
        .approve(&req.request_id, &admin.id, req.notes.as_deref())
        .await?;
    Ok(ApiResponse::ok(request.into()))
}

/// Reject a termination request.
async fn reject_termination(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<RejectTerminationRequest>,
) -> AppResult<ApiResponse<TerminationResponse>> {
    let request = state
        .termination_service
        .reject(&req.request_id, &admin.id, &req.notes)
        .await?;
    Ok(ApiResponse::ok(request.into()))
}

/// Dashboard status counts.
async fn dashboard_stats(
    AuthAdmin(_admin): AuthAdmin,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<DashboardStats>> {
    let stats = state.dashboard_service.stats().await?;
    Ok(ApiResponse::ok(stats))
}

/// Recent signups and termination filings.
async fn dashboard_activity(
    AuthAdmin(_admin): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<ActivityRequest>,
) -> AppResult<ApiResponse<Vec<ActivityResponse>>> {
    let items = state
        .dashboard_service
        .recent_activity(req.limit.min(100))
        .await?;
    Ok(ApiResponse::ok(items.into_iter().map(Into::into).collect()))
}

/// Create the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/accounts/list", post(list_accounts))
        .route("/accounts/verify", post(verify_account))
        .route("/accounts/reject", post(reject_account))
        .route("/accounts/reactivate", post(reactivate_account))
        .route("/accounts/suspend", post(suspend_account))
        .route("/accounts/unsuspend", post(unsuspend_account))
        .route("/accounts/ban", post(ban_account))
        .route("/accounts/unban", post(unban_account))
        .route("/accounts/delete", post(delete_account))
        // Facilitations
        .route("/facilitations/create", post(create_facilitation))
        // Terminations
        .route("/terminations/list", post(list_terminations))
        .route("/terminations/approve", post(approve_termination))
        .route("/terminations/reject", post(reject_termination))
        // Dashboard
        .route("/dashboard/stats", post(dashboard_stats))
        .route("/dashboard/activity", post(dashboard_activity))
}

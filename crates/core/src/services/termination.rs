//! Facilitation termination workflow.
//!
//! Either participant of an active facilitation may file a termination
//! request. Requests wait for admin adjudication: approval completes the
//! facilitation atomically, rejection records the admin's notes and leaves
//! the facilitation untouched.

use chrono::Utc;
use homestay_common::{AppError, AppResult, id::generate_id};
use homestay_db::entities::account::AccountRole;
use homestay_db::entities::facilitation::{self, FacilitationStatus};
use homestay_db::entities::termination_request::{self, TerminationStatus};
use homestay_db::repositories::{FacilitationRepository, TerminationRepository};
use sea_orm::{IntoActiveModel, Set};
use tracing::info;

use super::notifier::ChangeNotifierHandle;

/// Input for filing a termination request.
#[derive(Debug, Clone)]
pub struct CreateTerminationInput {
    pub facilitation_id: String,
    pub requester_id: String,
    pub requester_role: AccountRole,
    pub reason: String,
}

/// Termination request service.
pub struct TerminationService {
    termination_repo: TerminationRepository,
    facilitation_repo: FacilitationRepository,
    notifier: ChangeNotifierHandle,
}

impl TerminationService {
    /// Create a new termination service.
    #[must_use]
    pub fn new(
        termination_repo: TerminationRepository,
        facilitation_repo: FacilitationRepository,
        notifier: ChangeNotifierHandle,
    ) -> Self {
        Self {
            termination_repo,
            facilitation_repo,
            notifier,
        }
    }

    /// File a termination request against an active facilitation.
    ///
    /// At most one pending request may exist per facilitation. Concurrent
    /// filers race on a partial unique index, so even if both pass the
    /// pre-check here only one insert succeeds.
    pub async fn create_request(
        &self,
        input: CreateTerminationInput,
    ) -> AppResult<termination_request::Model> {
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "A termination reason is required".to_string(),
            ));
        }

        let facilitation = self
            .facilitation_repo
            .get_by_id(&input.facilitation_id)
            .await?;

        if facilitation.status == FacilitationStatus::Completed {
            return Err(AppError::InvalidTransition(
                "Cannot request termination of a completed facilitation".to_string(),
            ));
        }

        let is_participant = match input.requester_role {
            AccountRole::Host => facilitation.host_id == input.requester_id,
            AccountRole::Student => facilitation.student_id == input.requester_id,
        };
        if !is_participant {
            return Err(AppError::Forbidden(
                "Only participants of a facilitation may request its termination".to_string(),
            ));
        }

        if self
            .termination_repo
            .find_pending_for_facilitation(&facilitation.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "A pending termination request already exists for this facilitation".to_string(),
            ));
        }

        let model = termination_request::ActiveModel {
            id: Set(generate_id()),
            facilitation_id: Set(facilitation.id.clone()),
            requester_id: Set(input.requester_id.clone()),
            requester_role: Set(input.requester_role),
            reason: Set(reason.to_string()),
            status: Set(TerminationStatus::Pending),
            admin_notes: Set(None),
            reviewed_by: Set(None),
            created_at: Set(Utc::now().into()),
            reviewed_at: Set(None),
        };

        let created = self.termination_repo.create(model).await?;
        info!(
            request_id = %created.id,
            facilitation_id = %created.facilitation_id,
            "termination request filed"
        );

        self.notifier.publish_change().await?;

        Ok(created)
    }

    /// Get a termination request by ID.
    pub async fn get(&self, id: &str) -> AppResult<termination_request::Model> {
        self.termination_repo.get_by_id(id).await
    }

    /// List termination requests, optionally filtered by status.
    pub async fn list(
        &self,
        status: Option<TerminationStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<termination_request::Model>> {
        self.termination_repo.list(status, limit, offset).await
    }

    /// Approve a pending request, completing its facilitation in the same
    /// transaction.
    pub async fn approve(
        &self,
        request_id: &str,
        admin_id: &str,
        notes: Option<&str>,
    ) -> AppResult<termination_request::Model> {
        let request = self.termination_repo.get_by_id(request_id).await?;
        Self::require_pending(&request)?;

        let facilitation = self
            .facilitation_repo
            .get_by_id(&request.facilitation_id)
            .await?;

        let now = Utc::now().into();

        let mut request_am = request.into_active_model();
        request_am.status = Set(TerminationStatus::Approved);
        request_am.reviewed_by = Set(Some(admin_id.to_string()));
        request_am.admin_notes = Set(notes.map(str::trim).filter(|n| !n.is_empty()).map(String::from));
        request_am.reviewed_at = Set(Some(now));

        let mut facilitation_am: facilitation::ActiveModel = facilitation.into_active_model();
        facilitation_am.status = Set(FacilitationStatus::Completed);
        facilitation_am.completed_at = Set(Some(now));

        let (request, facilitation) = self
            .termination_repo
            .finalize_approval(request_am, facilitation_am)
            .await?;
        info!(
            request_id = %request.id,
            facilitation_id = %facilitation.id,
            %admin_id,
            "termination request approved"
        );

        self.notifier.publish_change().await?;

        Ok(request)
    }

    /// Reject a pending request. The facilitation stays active and the
    /// participants may file again later. Notes are mandatory so the
    /// requester learns why.
    pub async fn reject(
        &self,
        request_id: &str,
        admin_id: &str,
        notes: &str,
    ) -> AppResult<termination_request::Model> {
        let notes = notes.trim();
        if notes.is_empty() {
            return Err(AppError::Validation(
                "Rejection notes are required".to_string(),
            ));
        }

        let request = self.termination_repo.get_by_id(request_id).await?;
        Self::require_pending(&request)?;

        let mut request_am = request.into_active_model();
        request_am.status = Set(TerminationStatus::Rejected);
        request_am.reviewed_by = Set(Some(admin_id.to_string()));
        request_am.admin_notes = Set(Some(notes.to_string()));
        request_am.reviewed_at = Set(Some(Utc::now().into()));

        let updated = self.termination_repo.update(request_am).await?;
        info!(request_id = %updated.id, %admin_id, "termination request rejected");

        self.notifier.publish_change().await?;

        Ok(updated)
    }

    fn require_pending(request: &termination_request::Model) -> AppResult<()> {
        if request.status == TerminationStatus::Pending {
            Ok(())
        } else {
            Err(AppError::InvalidTransition(format!(
                "Termination request has already been {}",
                request.status.as_str()
            )))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::notifier::NoOpChangeNotifier;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, RuntimeErr};

    fn facilitation_model(id: &str, status: FacilitationStatus) -> facilitation::Model {
        facilitation::Model {
            id: id.to_string(),
            host_id: "host1".to_string(),
            student_id: "student1".to_string(),
            status,
            created_at: Utc::now().into(),
            completed_at: None,
        }
    }

    fn request_model(id: &str, status: TerminationStatus) -> termination_request::Model {
        termination_request::Model {
            id: id.to_string(),
            facilitation_id: "fac1".to_string(),
            requester_id: "host1".to_string(),
            requester_role: AccountRole::Host,
            reason: "host moved away".to_string(),
            status,
            admin_notes: None,
            reviewed_by: None,
            created_at: Utc::now().into(),
            reviewed_at: None,
        }
    }

    fn service(db: sea_orm::DatabaseConnection) -> TerminationService {
        let db = Arc::new(db);
        TerminationService::new(
            TerminationRepository::new(db.clone()),
            FacilitationRepository::new(db),
            Arc::new(NoOpChangeNotifier),
        )
    }

    fn create_input() -> CreateTerminationInput {
        CreateTerminationInput {
            facilitation_id: "fac1".to_string(),
            requester_id: "host1".to_string(),
            requester_role: AccountRole::Host,
            reason: "host moved away".to_string(),
        }
    }

    #[tokio::test]
    async fn create_request_happy_path() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![facilitation_model("fac1", FacilitationStatus::Matched)]])
            .append_query_results([Vec::<termination_request::Model>::new()])
            .append_query_results([vec![request_model("req1", TerminationStatus::Pending)]])
            .into_connection();

        let created = service(db).create_request(create_input()).await.unwrap();
        assert_eq!(created.status, TerminationStatus::Pending);
    }

    #[tokio::test]
    async fn create_request_requires_reason() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mut input = create_input();
        input.reason = "   ".to_string();

        let result = service(db).create_request(input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_request_refuses_completed_facilitation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![facilitation_model(
                "fac1",
                FacilitationStatus::Completed,
            )]])
            .into_connection();

        let result = service(db).create_request(create_input()).await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn create_request_refuses_non_participants() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![facilitation_model("fac1", FacilitationStatus::Matched)]])
            .into_connection();

        let mut input = create_input();
        input.requester_id = "someone-else".to_string();

        let result = service(db).create_request(input).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn create_request_conflicts_on_existing_pending() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![facilitation_model("fac1", FacilitationStatus::Matched)]])
            .append_query_results([vec![request_model("req0", TerminationStatus::Pending)]])
            .into_connection();

        let result = service(db).create_request(create_input()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn approve_completes_facilitation() {
        let mut approved = request_model("req1", TerminationStatus::Approved);
        approved.reviewed_by = Some("admin".to_string());
        let mut completed = facilitation_model("fac1", FacilitationStatus::Completed);
        completed.completed_at = Some(Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request_model("req1", TerminationStatus::Pending)]])
            .append_query_results([vec![facilitation_model("fac1", FacilitationStatus::Matched)]])
            .append_query_results([vec![approved]])
            .append_query_results([vec![completed]])
            .into_connection();

        let result = service(db)
            .approve("req1", "admin", Some("confirmed with both parties"))
            .await
            .unwrap();

        assert_eq!(result.status, TerminationStatus::Approved);
        assert_eq!(result.reviewed_by.as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn approve_refuses_already_adjudicated_requests() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request_model("req1", TerminationStatus::Rejected)]])
            .into_connection();

        let result = service(db).approve("req1", "admin", None).await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn approve_surfaces_transaction_failure() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request_model("req1", TerminationStatus::Pending)]])
            .append_query_results([vec![facilitation_model("fac1", FacilitationStatus::Matched)]])
            .append_query_errors([DbErr::Exec(RuntimeErr::Internal(
                "connection lost".to_string(),
            ))])
            .into_connection();

        let result = service(db).approve("req1", "admin", None).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn reject_requires_notes() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db).reject("req1", "admin", "").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn reject_records_notes_and_reviewer() {
        let mut rejected = request_model("req1", TerminationStatus::Rejected);
        rejected.reviewed_by = Some("admin".to_string());
        rejected.admin_notes = Some("parties reconciled".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request_model("req1", TerminationStatus::Pending)]])
            .append_query_results([vec![rejected]])
            .into_connection();

        let result = service(db)
            .reject("req1", "admin", "parties reconciled")
            .await
            .unwrap();

        assert_eq!(result.status, TerminationStatus::Rejected);
        assert_eq!(result.admin_notes.as_deref(), Some("parties reconciled"));
    }
}

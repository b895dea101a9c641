//! Facilitation matching.
//!
//! Admins pair a verified host with a verified student. The pairing is the
//! anchor for the termination workflow: requests can only be filed against
//! an existing facilitation.

use chrono::Utc;
use homestay_common::{AppError, AppResult, id::generate_id};
use homestay_db::entities::account::{AccountRole, AccountStatus};
use homestay_db::entities::facilitation::{self, FacilitationStatus};
use homestay_db::repositories::{AccountRepository, FacilitationRepository};
use sea_orm::Set;
use tracing::info;

use super::notifier::ChangeNotifierHandle;

/// Facilitation service.
pub struct FacilitationService {
    facilitation_repo: FacilitationRepository,
    account_repo: AccountRepository,
    notifier: ChangeNotifierHandle,
}

impl FacilitationService {
    /// Create a new facilitation service.
    #[must_use]
    pub fn new(
        facilitation_repo: FacilitationRepository,
        account_repo: AccountRepository,
        notifier: ChangeNotifierHandle,
    ) -> Self {
        Self {
            facilitation_repo,
            account_repo,
            notifier,
        }
    }

    /// Match a host with a student.
    ///
    /// Both participants must hold the role their side of the pairing names
    /// and both must currently be verified.
    pub async fn create(
        &self,
        admin_id: &str,
        host_id: &str,
        student_id: &str,
    ) -> AppResult<facilitation::Model> {
        let host = self.account_repo.get_by_id(host_id).await?;
        let student = self.account_repo.get_by_id(student_id).await?;

        if host.role != AccountRole::Host {
            return Err(AppError::Validation(format!(
                "Account {host_id} is not a host"
            )));
        }
        if student.role != AccountRole::Student {
            return Err(AppError::Validation(format!(
                "Account {student_id} is not a student"
            )));
        }
        for account in [&host, &student] {
            if account.status() != AccountStatus::Verified {
                return Err(AppError::InvalidTransition(format!(
                    "Account {} must be verified before it can be matched",
                    account.id
                )));
            }
        }

        let model = facilitation::ActiveModel {
            id: Set(generate_id()),
            host_id: Set(host.id.clone()),
            student_id: Set(student.id.clone()),
            status: Set(FacilitationStatus::Matched),
            created_at: Set(Utc::now().into()),
            completed_at: Set(None),
        };

        let created = self.facilitation_repo.create(model).await?;
        info!(
            facilitation_id = %created.id,
            host_id = %created.host_id,
            student_id = %created.student_id,
            %admin_id,
            "facilitation created"
        );

        self.notifier.publish_change().await?;

        Ok(created)
    }

    /// List the facilitations an account participates in, newest first.
    pub async fn list_for_account(&self, account_id: &str) -> AppResult<Vec<facilitation::Model>> {
        self.facilitation_repo.find_for_account(account_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::notifier::NoOpChangeNotifier;
    use homestay_db::entities::account;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn verified_account(id: &str, role: AccountRole) -> account::Model {
        account::Model {
            id: id.to_string(),
            username: format!("user-{id}"),
            role,
            is_admin: false,
            token: None,
            is_verified: true,
            is_active: true,
            rejection_reason: None,
            is_suspended: false,
            suspension_reason: None,
            suspended_at: None,
            is_banned: false,
            ban_reason: None,
            banned_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn facilitation_model(id: &str) -> facilitation::Model {
        facilitation::Model {
            id: id.to_string(),
            host_id: "host1".to_string(),
            student_id: "student1".to_string(),
            status: FacilitationStatus::Matched,
            created_at: Utc::now().into(),
            completed_at: None,
        }
    }

    fn service(db: sea_orm::DatabaseConnection) -> FacilitationService {
        let db = Arc::new(db);
        FacilitationService::new(
            FacilitationRepository::new(db.clone()),
            AccountRepository::new(db),
            Arc::new(NoOpChangeNotifier),
        )
    }

    #[tokio::test]
    async fn create_matches_verified_participants() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![verified_account("host1", AccountRole::Host)]])
            .append_query_results([vec![verified_account("student1", AccountRole::Student)]])
            .append_query_results([vec![facilitation_model("fac1")]])
            .into_connection();

        let created = service(db)
            .create("admin", "host1", "student1")
            .await
            .unwrap();

        assert_eq!(created.status, FacilitationStatus::Matched);
        assert_eq!(created.host_id, "host1");
    }

    #[tokio::test]
    async fn create_rejects_role_mismatch() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![verified_account("host1", AccountRole::Student)]])
            .append_query_results([vec![verified_account("student1", AccountRole::Student)]])
            .into_connection();

        let result = service(db).create("admin", "host1", "student1").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_requires_verified_participants() {
        let mut suspended = verified_account("student1", AccountRole::Student);
        suspended.is_suspended = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![verified_account("host1", AccountRole::Host)]])
            .append_query_results([vec![suspended]])
            .into_connection();

        let result = service(db).create("admin", "host1", "student1").await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn list_for_account_returns_participations() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![facilitation_model("fac1"), facilitation_model("fac2")]])
            .into_connection();

        let result = service(db).list_for_account("host1").await.unwrap();
        assert_eq!(result.len(), 2);
    }
}

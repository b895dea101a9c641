//! Account moderation lifecycle.
//!
//! All status changes go through the pure transition functions in
//! [`transitions`], which validate the current derived status and return
//! the updated record. The service layer wraps them with persistence and
//! change notifications.

use chrono::Utc;
use homestay_common::{AppError, AppResult};
use homestay_db::entities::account::{self, AccountStatus};
use homestay_db::repositories::AccountRepository;
use sea_orm::{ActiveModelTrait, IntoActiveModel};
use tracing::info;

use super::notifier::ChangeNotifierHandle;

/// Pure lifecycle transitions over account records.
///
/// Each function checks the derived status of the input, applies the flag
/// changes for the transition, and stamps `updated_at`. Invalid source
/// states return `InvalidTransition` without touching the record.
pub mod transitions {
    use homestay_common::{AppError, AppResult};
    use homestay_db::entities::account::{self, AccountStatus};
    use sea_orm::prelude::DateTimeWithTimeZone;

    fn invalid(op: &str, status: AccountStatus) -> AppError {
        AppError::InvalidTransition(format!(
            "Cannot {op} an account in the {} state",
            status.as_str()
        ))
    }

    /// Pending -> Verified.
    pub fn verify(
        mut account: account::Model,
        now: DateTimeWithTimeZone,
    ) -> AppResult<account::Model> {
        match account.status() {
            AccountStatus::Pending => {
                account.is_verified = true;
                account.rejection_reason = None;
                account.updated_at = Some(now);
                Ok(account)
            }
            other => Err(invalid("verify", other)),
        }
    }

    /// Pending -> Rejected.
    pub fn reject(
        mut account: account::Model,
        reason: &str,
        now: DateTimeWithTimeZone,
    ) -> AppResult<account::Model> {
        match account.status() {
            AccountStatus::Pending => {
                account.is_active = false;
                account.rejection_reason = Some(reason.to_string());
                account.updated_at = Some(now);
                Ok(account)
            }
            other => Err(invalid("reject", other)),
        }
    }

    /// Rejected -> Pending, clearing the stored rejection reason.
    pub fn reactivate(
        mut account: account::Model,
        now: DateTimeWithTimeZone,
    ) -> AppResult<account::Model> {
        match account.status() {
            AccountStatus::Rejected => {
                account.is_active = true;
                account.rejection_reason = None;
                account.updated_at = Some(now);
                Ok(account)
            }
            other => Err(invalid("reactivate", other)),
        }
    }

    /// Verified -> Suspended.
    pub fn suspend(
        mut account: account::Model,
        reason: &str,
        now: DateTimeWithTimeZone,
    ) -> AppResult<account::Model> {
        match account.status() {
            AccountStatus::Verified => {
                account.is_suspended = true;
                account.suspension_reason = Some(reason.to_string());
                account.suspended_at = Some(now);
                account.updated_at = Some(now);
                Ok(account)
            }
            other => Err(invalid("suspend", other)),
        }
    }

    /// Suspended -> Verified, clearing the suspension record.
    pub fn unsuspend(
        mut account: account::Model,
        now: DateTimeWithTimeZone,
    ) -> AppResult<account::Model> {
        match account.status() {
            AccountStatus::Suspended => {
                account.is_suspended = false;
                account.suspension_reason = None;
                account.suspended_at = None;
                account.updated_at = Some(now);
                Ok(account)
            }
            other => Err(invalid("unsuspend", other)),
        }
    }

    /// Verified or Suspended -> Banned.
    ///
    /// An existing suspension is left in place so that lifting the ban
    /// later restores the account to Suspended rather than Verified.
    pub fn ban(
        mut account: account::Model,
        reason: &str,
        now: DateTimeWithTimeZone,
    ) -> AppResult<account::Model> {
        match account.status() {
            AccountStatus::Verified | AccountStatus::Suspended => {
                account.is_banned = true;
                account.ban_reason = Some(reason.to_string());
                account.banned_at = Some(now);
                account.updated_at = Some(now);
                Ok(account)
            }
            other => Err(invalid("ban", other)),
        }
    }

    /// Banned -> whatever state the remaining flags derive to.
    pub fn unban(mut account: account::Model, now: DateTimeWithTimeZone) -> AppResult<account::Model> {
        match account.status() {
            AccountStatus::Banned => {
                account.is_banned = false;
                account.ban_reason = None;
                account.banned_at = None;
                account.updated_at = Some(now);
                Ok(account)
            }
            other => Err(invalid("unban", other)),
        }
    }
}

/// Moderation service for admin account actions.
pub struct ModerationService {
    account_repo: AccountRepository,
    notifier: ChangeNotifierHandle,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub fn new(account_repo: AccountRepository, notifier: ChangeNotifierHandle) -> Self {
        Self {
            account_repo,
            notifier,
        }
    }

    fn require_reason(reason: &str, what: &str) -> AppResult<()> {
        if reason.trim().is_empty() {
            return Err(AppError::Validation(format!("A {what} reason is required")));
        }
        Ok(())
    }

    fn forbid_self_action(admin_id: &str, account_id: &str) -> AppResult<()> {
        if admin_id == account_id {
            return Err(AppError::Forbidden(
                "Admins cannot moderate their own account".to_string(),
            ));
        }
        Ok(())
    }

    async fn apply(&self, next: account::Model) -> AppResult<account::Model> {
        let saved = self
            .account_repo
            .update(next.into_active_model().reset_all())
            .await?;
        self.notifier.publish_change().await?;
        Ok(saved)
    }

    /// Approve a pending signup.
    pub async fn verify(&self, admin_id: &str, account_id: &str) -> AppResult<account::Model> {
        let account = self.account_repo.get_by_id(account_id).await?;
        let next = transitions::verify(account, Utc::now().into())?;
        info!(%admin_id, %account_id, "account verified");
        self.apply(next).await
    }

    /// Turn down a pending signup.
    pub async fn reject(
        &self,
        admin_id: &str,
        account_id: &str,
        reason: &str,
    ) -> AppResult<account::Model> {
        Self::require_reason(reason, "rejection")?;
        let account = self.account_repo.get_by_id(account_id).await?;
        let next = transitions::reject(account, reason.trim(), Utc::now().into())?;
        info!(%admin_id, %account_id, "account rejected");
        self.apply(next).await
    }

    /// Give a rejected signup another chance at review.
    pub async fn reactivate(&self, admin_id: &str, account_id: &str) -> AppResult<account::Model> {
        let account = self.account_repo.get_by_id(account_id).await?;
        let next = transitions::reactivate(account, Utc::now().into())?;
        info!(%admin_id, %account_id, "account reactivated");
        self.apply(next).await
    }

    /// Temporarily suspend a verified account.
    pub async fn suspend(
        &self,
        admin_id: &str,
        account_id: &str,
        reason: &str,
    ) -> AppResult<account::Model> {
        Self::forbid_self_action(admin_id, account_id)?;
        Self::require_reason(reason, "suspension")?;
        let account = self.account_repo.get_by_id(account_id).await?;
        let next = transitions::suspend(account, reason.trim(), Utc::now().into())?;
        info!(%admin_id, %account_id, "account suspended");
        self.apply(next).await
    }

    /// Lift a suspension.
    pub async fn unsuspend(&self, admin_id: &str, account_id: &str) -> AppResult<account::Model> {
        let account = self.account_repo.get_by_id(account_id).await?;
        let next = transitions::unsuspend(account, Utc::now().into())?;
        info!(%admin_id, %account_id, "account unsuspended");
        self.apply(next).await
    }

    /// Permanently ban an account.
    pub async fn ban(
        &self,
        admin_id: &str,
        account_id: &str,
        reason: &str,
    ) -> AppResult<account::Model> {
        Self::forbid_self_action(admin_id, account_id)?;
        Self::require_reason(reason, "ban")?;
        let account = self.account_repo.get_by_id(account_id).await?;
        let next = transitions::ban(account, reason.trim(), Utc::now().into())?;
        info!(%admin_id, %account_id, "account banned");
        self.apply(next).await
    }

    /// Lift a ban. A suspension that predates the ban resurfaces.
    pub async fn unban(&self, admin_id: &str, account_id: &str) -> AppResult<account::Model> {
        let account = self.account_repo.get_by_id(account_id).await?;
        let next = transitions::unban(account, Utc::now().into())?;
        info!(%admin_id, %account_id, "account unbanned");
        self.apply(next).await
    }

    /// Permanently delete an account and everything it owns.
    ///
    /// Only allowed from the Banned, Rejected, or Pending states. Verified
    /// and Suspended accounts must be banned or rejected first.
    pub async fn delete(&self, admin_id: &str, account_id: &str) -> AppResult<()> {
        Self::forbid_self_action(admin_id, account_id)?;
        let account = self.account_repo.get_by_id(account_id).await?;
        match account.status() {
            AccountStatus::Banned | AccountStatus::Rejected | AccountStatus::Pending => {}
            other => {
                return Err(AppError::InvalidTransition(format!(
                    "Cannot delete an account in the {} state",
                    other.as_str()
                )));
            }
        }

        self.account_repo.delete_with_owned(account_id).await?;
        info!(%admin_id, %account_id, "account deleted");
        self.notifier.publish_change().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::notifier::{BroadcastNotifier, NoOpChangeNotifier};
    use homestay_db::entities::account::AccountRole;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn fresh_account(id: &str) -> account::Model {
        let now = Utc::now().into();
        account::Model {
            id: id.to_string(),
            username: format!("user-{id}"),
            role: AccountRole::Host,
            is_admin: false,
            token: Some("tok".to_string()),
            is_verified: false,
            is_active: true,
            rejection_reason: None,
            is_suspended: false,
            suspension_reason: None,
            suspended_at: None,
            is_banned: false,
            ban_reason: None,
            banned_at: None,
            created_at: now,
            updated_at: Some(now),
        }
    }

    #[test]
    fn full_lifecycle_chain() {
        let now = Utc::now().into();
        let account = fresh_account("a1");
        assert_eq!(account.status(), AccountStatus::Pending);

        let account = transitions::reject(account, "incomplete documents", now).unwrap();
        assert_eq!(account.status(), AccountStatus::Rejected);

        let account = transitions::reactivate(account, now).unwrap();
        assert_eq!(account.status(), AccountStatus::Pending);

        let account = transitions::verify(account, now).unwrap();
        assert_eq!(account.status(), AccountStatus::Verified);

        let account = transitions::suspend(account, "policy violation", now).unwrap();
        assert_eq!(account.status(), AccountStatus::Suspended);

        let account = transitions::ban(account, "repeat violation", now).unwrap();
        assert_eq!(account.status(), AccountStatus::Banned);
        assert!(account.is_suspended);

        // Lifting the ban surfaces the earlier suspension.
        let account = transitions::unban(account, now).unwrap();
        assert_eq!(account.status(), AccountStatus::Suspended);
        assert_eq!(account.suspension_reason.as_deref(), Some("policy violation"));

        let account = transitions::unsuspend(account, now).unwrap();
        assert_eq!(account.status(), AccountStatus::Verified);
    }

    #[test]
    fn reject_then_reactivate_returns_to_pending() {
        let now = Utc::now().into();
        let account = fresh_account("a1");

        let account = transitions::reject(account, "incomplete profile", now).unwrap();
        assert_eq!(account.status(), AccountStatus::Rejected);
        assert!(account.rejection_reason.is_some());

        let account = transitions::reactivate(account, now).unwrap();
        assert_eq!(account.status(), AccountStatus::Pending);
        assert!(account.rejection_reason.is_none());
    }

    #[test]
    fn verify_requires_pending() {
        let now = Utc::now().into();
        let mut account = fresh_account("a1");
        account.is_verified = true;

        let result = transitions::verify(account, now);
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn suspend_requires_verified() {
        let now = Utc::now().into();
        let account = fresh_account("a1");

        let result = transitions::suspend(account, "spam", now);
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn cannot_ban_twice() {
        let now = Utc::now().into();
        let mut account = fresh_account("a1");
        account.is_banned = true;

        let result = transitions::ban(account, "again", now);
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn ban_requires_verified_or_suspended() {
        let now = Utc::now().into();

        let pending = fresh_account("a1");
        assert!(matches!(
            transitions::ban(pending, "abuse", now),
            Err(AppError::InvalidTransition(_))
        ));

        let mut verified = fresh_account("a2");
        verified.is_verified = true;
        let banned = transitions::ban(verified, "abuse", now).unwrap();
        assert_eq!(banned.status(), AccountStatus::Banned);

        let mut suspended = fresh_account("a3");
        suspended.is_verified = true;
        suspended.is_suspended = true;
        let banned = transitions::ban(suspended, "abuse", now).unwrap();
        assert_eq!(banned.status(), AccountStatus::Banned);
        assert!(banned.is_suspended);
    }

    fn service(db: sea_orm::DatabaseConnection, notifier: ChangeNotifierHandle) -> ModerationService {
        ModerationService::new(AccountRepository::new(Arc::new(db)), notifier)
    }

    #[tokio::test]
    async fn verify_persists_and_notifies() {
        let pending = fresh_account("a1");
        let mut verified = fresh_account("a1");
        verified.is_verified = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending]])
            .append_query_results([vec![verified]])
            .into_connection();

        let notifier = Arc::new(BroadcastNotifier::new(8));
        let mut rx = notifier.subscribe();

        let result = service(db, notifier).verify("admin", "a1").await.unwrap();
        assert_eq!(result.status(), AccountStatus::Verified);
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn suspend_rejects_self_moderation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db, Arc::new(NoOpChangeNotifier))
            .suspend("admin", "admin", "spam")
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn reject_requires_reason() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db, Arc::new(NoOpChangeNotifier))
            .reject("admin", "a1", "  ")
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn delete_refuses_verified_accounts() {
        let mut verified = fresh_account("a1");
        verified.is_verified = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![verified]])
            .into_connection();

        let result = service(db, Arc::new(NoOpChangeNotifier))
            .delete("admin", "a1")
            .await;

        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn delete_removes_banned_account() {
        let mut banned = fresh_account("a1");
        banned.is_banned = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![banned]])
            // facilitation ids owned by the account
            .append_query_results([Vec::<homestay_db::entities::facilitation::Model>::new()])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let result = service(db, Arc::new(NoOpChangeNotifier))
            .delete("admin", "a1")
            .await;

        assert!(result.is_ok());
    }
}

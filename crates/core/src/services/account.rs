//! Account registration and lookup.

use chrono::Utc;
use homestay_common::{AppError, AppResult, id::{generate_id, generate_token}};
use homestay_db::entities::account::{self, AccountRole, AccountStatus};
use homestay_db::repositories::AccountRepository;
use sea_orm::Set;
use tracing::info;

use super::notifier::ChangeNotifierHandle;

/// Input for registering a new account.
#[derive(Debug, Clone)]
pub struct RegisterAccountInput {
    pub username: String,
    pub role: AccountRole,
}

/// Account service handling signup and lookup.
pub struct AccountService {
    account_repo: AccountRepository,
    notifier: ChangeNotifierHandle,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub fn new(account_repo: AccountRepository, notifier: ChangeNotifierHandle) -> Self {
        Self {
            account_repo,
            notifier,
        }
    }

    /// Register a new account. Fresh signups start in the pending state and
    /// stay invisible to matching until an admin verifies them.
    pub async fn register(&self, input: RegisterAccountInput) -> AppResult<account::Model> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username cannot be empty".to_string()));
        }
        if username.len() > 128 {
            return Err(AppError::Validation(
                "Username must be 128 characters or fewer".to_string(),
            ));
        }

        if self
            .account_repo
            .find_by_username(username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Username {username} is already taken"
            )));
        }

        let now = Utc::now().into();
        let model = account::ActiveModel {
            id: Set(generate_id()),
            username: Set(username.to_string()),
            role: Set(input.role),
            is_admin: Set(false),
            token: Set(Some(generate_token())),
            is_verified: Set(false),
            is_active: Set(true),
            rejection_reason: Set(None),
            is_suspended: Set(false),
            suspension_reason: Set(None),
            suspended_at: Set(None),
            is_banned: Set(false),
            ban_reason: Set(None),
            banned_at: Set(None),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let created = self.account_repo.create(model).await?;
        info!(account_id = %created.id, role = %created.role.as_str(), "account registered");

        self.notifier.publish_signup().await?;

        Ok(created)
    }

    /// Resolve an account from its API token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<account::Model> {
        self.account_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get an account by ID.
    pub async fn get(&self, id: &str) -> AppResult<account::Model> {
        self.account_repo.get_by_id(id).await
    }

    /// List accounts, optionally filtered by derived status.
    pub async fn list(&self, status: Option<AccountStatus>) -> AppResult<Vec<account::Model>> {
        let accounts = self.account_repo.find_all().await?;
        Ok(match status {
            Some(wanted) => accounts
                .into_iter()
                .filter(|a| a.status() == wanted)
                .collect(),
            None => accounts,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::notifier::NoOpChangeNotifier;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn account_model(id: &str, username: &str) -> account::Model {
        let now = Utc::now().into();
        account::Model {
            id: id.to_string(),
            username: username.to_string(),
            role: AccountRole::Student,
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

    fn service(db: sea_orm::DatabaseConnection) -> AccountService {
        AccountService::new(
            AccountRepository::new(Arc::new(db)),
            Arc::new(NoOpChangeNotifier),
        )
    }

    #[tokio::test]
    async fn register_creates_pending_account() {
        let created = account_model("a1", "alice");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<account::Model>::new()])
            .append_query_results([vec![created]])
            .into_connection();

        let result = service(db)
            .register(RegisterAccountInput {
                username: "alice".to_string(),
                role: AccountRole::Student,
            })
            .await
            .unwrap();

        assert_eq!(result.status(), AccountStatus::Pending);
        assert!(!result.is_admin);
    }

    #[tokio::test]
    async fn register_rejects_empty_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .register(RegisterAccountInput {
                username: "   ".to_string(),
                role: AccountRole::Host,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let existing = account_model("a1", "alice");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .into_connection();

        let result = service(db)
            .register(RegisterAccountInput {
                username: "alice".to_string(),
                role: AccountRole::Student,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn authenticate_rejects_unknown_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<account::Model>::new()])
            .into_connection();

        let result = service(db).authenticate_by_token("nope").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn list_filters_by_derived_status() {
        let pending = account_model("a1", "alice");
        let mut verified = account_model("a2", "bob");
        verified.is_verified = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending, verified]])
            .into_connection();

        let result = service(db).list(Some(AccountStatus::Verified)).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "a2");
    }
}

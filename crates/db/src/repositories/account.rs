//! Account repository.

use std::sync::Arc;

use crate::entities::{Account, Facilitation, TerminationRequest, account, facilitation, termination_request};
use homestay_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

/// Account repository for database operations.
#[derive(Clone)]
pub struct AccountRepository {
    db: Arc<DatabaseConnection>,
}

impl AccountRepository {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an account by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<account::Model>> {
        Account::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an account by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<account::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(id.to_string()))
    }

    /// Find an account by bearer token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<account::Model>> {
        Account::find()
            .filter(account::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an account by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<account::Model>> {
        Account::find()
            .filter(account::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new account.
    pub async fn create(&self, model: account::ActiveModel) -> AppResult<account::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an account.
    pub async fn update(&self, model: account::ActiveModel) -> AppResult<account::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all accounts, newest first.
    ///
    /// Status filtering happens in the core layer via the derived status, so
    /// this intentionally has no flag-based filters.
    pub async fn find_all(&self) -> AppResult<Vec<account::Model>> {
        Account::find()
            .order_by_desc(account::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the most recently created accounts.
    pub async fn find_recent(&self, limit: u64) -> AppResult<Vec<account::Model>> {
        Account::find()
            .order_by_desc(account::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Hard-delete an account together with the rows it owns: termination
    /// requests it authored and facilitations it participates in (plus their
    /// requests). All-or-nothing.
    pub async fn delete_with_owned(&self, id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let facilitation_ids: Vec<String> = Facilitation::find()
            .filter(
                Condition::any()
                    .add(facilitation::Column::HostId.eq(id))
                    .add(facilitation::Column::StudentId.eq(id)),
            )
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .into_iter()
            .map(|f| f.id)
            .collect();

        if !facilitation_ids.is_empty() {
            TerminationRequest::delete_many()
                .filter(
                    termination_request::Column::FacilitationId.is_in(facilitation_ids.clone()),
                )
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            Facilitation::delete_many()
                .filter(facilitation::Column::Id.is_in(facilitation_ids))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        TerminationRequest::delete_many()
            .filter(termination_request::Column::RequesterId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Account::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

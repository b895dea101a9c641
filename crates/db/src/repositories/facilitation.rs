//! Facilitation repository.

use std::sync::Arc;

use crate::entities::{Facilitation, facilitation};
use homestay_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

/// Facilitation repository for database operations.
#[derive(Clone)]
pub struct FacilitationRepository {
    db: Arc<DatabaseConnection>,
}

impl FacilitationRepository {
    /// Create a new facilitation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a facilitation by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<facilitation::Model>> {
        Facilitation::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a facilitation by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<facilitation::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Facilitation {id} not found")))
    }

    /// Create a new facilitation.
    pub async fn create(&self, model: facilitation::ActiveModel) -> AppResult<facilitation::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all facilitations a participant belongs to, newest first.
    pub async fn find_for_account(&self, account_id: &str) -> AppResult<Vec<facilitation::Model>> {
        Facilitation::find()
            .filter(
                Condition::any()
                    .add(facilitation::Column::HostId.eq(account_id))
                    .add(facilitation::Column::StudentId.eq(account_id)),
            )
            .order_by_desc(facilitation::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

//! Termination request repository.

use std::sync::Arc;

use crate::entities::{
    TerminationRequest, facilitation,
    termination_request::{self, TerminationStatus},
};
use homestay_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};

/// Termination request repository for database operations.
#[derive(Clone)]
pub struct TerminationRepository {
    db: Arc<DatabaseConnection>,
}

impl TerminationRepository {
    /// Create a new termination repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new termination request.
    ///
    /// The partial unique index on `(facilitation_id) WHERE status = 'pending'`
    /// serializes concurrent requesters; a violation surfaces as `Conflict`.
    pub async fn create(
        &self,
        model: termination_request::ActiveModel,
    ) -> AppResult<termination_request::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict(
                    "A pending termination request already exists for this facilitation"
                        .to_string(),
                )
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Get a termination request by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<termination_request::Model> {
        TerminationRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Termination request {id} not found")))
    }

    /// Find the pending request for a facilitation, if any.
    pub async fn find_pending_for_facilitation(
        &self,
        facilitation_id: &str,
    ) -> AppResult<Option<termination_request::Model>> {
        TerminationRequest::find()
            .filter(termination_request::Column::FacilitationId.eq(facilitation_id))
            .filter(termination_request::Column::Status.eq(TerminationStatus::Pending))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get termination requests with optional status filter, newest first.
    pub async fn list(
        &self,
        status: Option<TerminationStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<termination_request::Model>> {
        let mut query =
            TerminationRequest::find().order_by_desc(termination_request::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(termination_request::Column::Status.eq(s));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count pending termination requests.
    pub async fn count_pending(&self) -> AppResult<u64> {
        TerminationRequest::find()
            .filter(termination_request::Column::Status.eq(TerminationStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the most recently created requests.
    pub async fn find_recent(&self, limit: u64) -> AppResult<Vec<termination_request::Model>> {
        TerminationRequest::find()
            .order_by_desc(termination_request::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a termination request.
    pub async fn update(
        &self,
        model: termination_request::ActiveModel,
    ) -> AppResult<termination_request::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply an approval: the request update and the facilitation completion
    /// commit together or not at all.
    pub async fn finalize_approval(
        &self,
        request: termination_request::ActiveModel,
        facilitation: facilitation::ActiveModel,
    ) -> AppResult<(termination_request::Model, facilitation::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let request = request
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let facilitation = facilitation
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((request, facilitation))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::account::AccountRole;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_request(id: &str, facilitation_id: &str) -> termination_request::Model {
        termination_request::Model {
            id: id.to_string(),
            facilitation_id: facilitation_id.to_string(),
            requester_id: "student1".to_string(),
            requester_role: AccountRole::Student,
            reason: "Moving away for an internship".to_string(),
            status: TerminationStatus::Pending,
            admin_notes: None,
            reviewed_by: None,
            created_at: Utc::now().into(),
            reviewed_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let req = create_test_request("req1", "fac1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[req]])
                .into_connection(),
        );

        let repo = TerminationRepository::new(db);
        let result = repo.get_by_id("req1").await.unwrap();

        assert_eq!(result.id, "req1");
        assert_eq!(result.status, TerminationStatus::Pending);
    }

    #[tokio::test]
    async fn test_find_pending_for_facilitation() {
        let req = create_test_request("req1", "fac1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[req]])
                .into_connection(),
        );

        let repo = TerminationRepository::new(db);
        let result = repo.find_pending_for_facilitation("fac1").await.unwrap();

        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_list_pending() {
        let req1 = create_test_request("req1", "fac1");
        let req2 = create_test_request("req2", "fac2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[req1, req2]])
                .into_connection(),
        );

        let repo = TerminationRepository::new(db);
        let result = repo
            .list(Some(TerminationStatus::Pending), 10, 0)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
    }
}

//! Admin dashboard aggregation.
//!
//! Counts are folded from derived account statuses rather than raw flags,
//! so the dashboard can never disagree with what the moderation endpoints
//! report for an individual account.

use homestay_common::AppResult;
use homestay_db::entities::account::{self, AccountStatus};
use homestay_db::entities::termination_request;
use homestay_db::repositories::{AccountRepository, TerminationRepository};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;

/// Aggregate account and termination counts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardStats {
    pub pending: u64,
    pub verified: u64,
    pub rejected: u64,
    pub suspended: u64,
    pub banned: u64,
    pub total: u64,
    pub pending_terminations: u64,
}

/// Kind of recent activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Signup,
    TerminationRequested,
}

/// A single entry in the recent activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityItem {
    pub kind: ActivityKind,
    /// Account ID for signups, request ID for termination requests.
    pub subject_id: String,
    pub at: DateTimeWithTimeZone,
}

/// Dashboard service producing admin overview data.
pub struct DashboardService {
    account_repo: AccountRepository,
    termination_repo: TerminationRepository,
}

impl DashboardService {
    /// Create a new dashboard service.
    #[must_use]
    pub const fn new(
        account_repo: AccountRepository,
        termination_repo: TerminationRepository,
    ) -> Self {
        Self {
            account_repo,
            termination_repo,
        }
    }

    /// Compute current status counts.
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let accounts = self.account_repo.find_all().await?;
        let mut stats = accounts.iter().fold(DashboardStats::default(), fold_status);
        stats.pending_terminations = self.termination_repo.count_pending().await?;
        Ok(stats)
    }

    /// Recent signups and termination filings, newest first.
    pub async fn recent_activity(&self, limit: u64) -> AppResult<Vec<ActivityItem>> {
        let accounts = self.account_repo.find_recent(limit).await?;
        let requests = self.termination_repo.find_recent(limit).await?;

        let mut items: Vec<ActivityItem> = accounts
            .into_iter()
            .map(|a| ActivityItem {
                kind: ActivityKind::Signup,
                subject_id: a.id,
                at: a.created_at,
            })
            .chain(requests.into_iter().map(|r| ActivityItem {
                kind: ActivityKind::TerminationRequested,
                subject_id: r.id,
                at: r.created_at,
            }))
            .collect();

        items.sort_by(|a, b| b.at.cmp(&a.at));
        items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(items)
    }
}

fn fold_status(mut stats: DashboardStats, account: &account::Model) -> DashboardStats {
    stats.total += 1;
    match account.status() {
        AccountStatus::Pending => stats.pending += 1,
        AccountStatus::Verified => stats.verified += 1,
        AccountStatus::Rejected => stats.rejected += 1,
        AccountStatus::Suspended => stats.suspended += 1,
        AccountStatus::Banned => stats.banned += 1,
    }
    stats
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use chrono::{Duration, Utc};
    use homestay_db::entities::account::AccountRole;
    use homestay_db::entities::termination_request::TerminationStatus;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn account_at(id: &str, at: DateTimeWithTimeZone) -> account::Model {
        account::Model {
            id: id.to_string(),
            username: format!("user-{id}"),
            role: AccountRole::Student,
            is_admin: false,
            token: None,
            is_verified: false,
            is_active: true,
            rejection_reason: None,
            is_suspended: false,
            suspension_reason: None,
            suspended_at: None,
            is_banned: false,
            ban_reason: None,
            banned_at: None,
            created_at: at,
            updated_at: Some(at),
        }
    }

    fn request_at(id: &str, at: DateTimeWithTimeZone) -> termination_request::Model {
        termination_request::Model {
            id: id.to_string(),
            facilitation_id: "fac1".to_string(),
            requester_id: "host1".to_string(),
            requester_role: AccountRole::Host,
            reason: "moving".to_string(),
            status: TerminationStatus::Pending,
            admin_notes: None,
            reviewed_by: None,
            created_at: at,
            reviewed_at: None,
        }
    }

    fn service(db: sea_orm::DatabaseConnection) -> DashboardService {
        let db = Arc::new(db);
        DashboardService::new(
            AccountRepository::new(db.clone()),
            TerminationRepository::new(db),
        )
    }

    #[tokio::test]
    async fn stats_fold_derived_statuses() {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let pending = account_at("a1", now);
        let mut verified = account_at("a2", now);
        verified.is_verified = true;
        let mut banned_and_suspended = account_at("a3", now);
        banned_and_suspended.is_verified = true;
        banned_and_suspended.is_suspended = true;
        banned_and_suspended.is_banned = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending, verified, banned_and_suspended]])
            .append_query_results([[count_row(2)]])
            .into_connection();

        let stats = service(db).stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.verified, 1);
        // Ban outranks suspension in the fold.
        assert_eq!(stats.banned, 1);
        assert_eq!(stats.suspended, 0);
        assert_eq!(stats.pending_terminations, 2);
    }

    // Shape of the row PaginatorTrait::count reads back.
    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        std::collections::BTreeMap::from([("num_items", sea_orm::Value::BigInt(Some(n)))])
    }

    #[tokio::test]
    async fn recent_activity_merges_and_sorts() {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                account_at("a1", now - Duration::minutes(10)),
                account_at("a2", now - Duration::minutes(1)),
            ]])
            .append_query_results([vec![request_at("req1", now - Duration::minutes(5))]])
            .into_connection();

        let items = service(db).recent_activity(10).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].subject_id, "a2");
        assert_eq!(items[1].subject_id, "req1");
        assert_eq!(items[1].kind, ActivityKind::TerminationRequested);
        assert_eq!(items[2].subject_id, "a1");
    }

    #[tokio::test]
    async fn recent_activity_respects_limit() {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                account_at("a1", now - Duration::minutes(3)),
                account_at("a2", now - Duration::minutes(2)),
            ]])
            .append_query_results([vec![
                request_at("req1", now - Duration::minutes(1)),
                request_at("req2", now - Duration::minutes(4)),
            ]])
            .into_connection();

        let items = service(db).recent_activity(2).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].subject_id, "req1");
        assert_eq!(items[1].subject_id, "a2");
    }
}

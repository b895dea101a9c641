//! Facilitation entity.
//!
//! An active or historical host–student arrangement. Owned jointly by the two
//! participants; only an approved termination request moves it to completed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Facilitation lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[derive(Default)]
pub enum FacilitationStatus {
    /// Host and student are matched and the arrangement is active.
    #[sea_orm(string_value = "matched")]
    #[default]
    Matched,
    /// The arrangement has ended.
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl FacilitationStatus {
    /// Stable string form used in API payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Completed => "completed",
        }
    }
}

/// Facilitation model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "facilitation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The host account.
    pub host_id: String,

    /// The student account.
    pub student_id: String,

    /// Current status.
    pub status: FacilitationStatus,

    pub created_at: DateTimeWithTimeZone,

    /// Set when the facilitation is completed via an approved termination.
    #[sea_orm(nullable)]
    pub completed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::HostId",
        to = "super::account::Column::Id"
    )]
    Host,
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::StudentId",
        to = "super::account::Column::Id"
    )]
    Student,
    #[sea_orm(has_many = "super::termination_request::Entity")]
    TerminationRequests,
}

impl Related<super::termination_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TerminationRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

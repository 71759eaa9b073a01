//! Claim entity - An employee-submitted reimbursement request.
//!
//! A claim starts `pending` and moves exactly once to `approved` or `denied`,
//! at which point `reviewed_on` and `reviewed_by` are filled in by the same update.
//! Travel fields (`mileage`, `start_location`, `end_location`) are only populated
//! for categories that require mileage.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Claim database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "claims")]
pub struct Model {
    /// Unique identifier for the claim
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Profile id of the employee who owns the claim
    pub employee_id: String,
    /// Expense category, if one has been set
    pub category_id: Option<i64>,
    /// Claimed amount in dollars, always positive
    pub amount: f64,
    /// What the expense was for
    pub description: String,
    /// When the claim was submitted
    pub submitted_on: DateTimeUtc,
    /// `"pending"`, `"approved"` or `"denied"`
    pub status: String,
    /// When the claim was reviewed, None while pending
    pub reviewed_on: Option<DateTimeUtc>,
    /// Profile id of the reviewer, None while pending
    pub reviewed_by: Option<String>,
    /// Distance travelled, for mileage categories only
    pub mileage: Option<f64>,
    /// Trip origin, for mileage categories only
    pub start_location: Option<String>,
    /// Trip destination, for mileage categories only
    pub end_location: Option<String>,
    /// Pointer to an externally stored receipt
    pub receipt_url: Option<String>,
    /// Profile id of whoever performed the submission
    pub submitted_by: Option<String>,
}

/// Defines relationships between Claim and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each claim belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// Each claim belongs to one employee profile
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::EmployeeId",
        to = "super::profile::Column::Id"
    )]
    Employee,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

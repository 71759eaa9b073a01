//! Profile entity - The stored record behind an authenticated identity.
//!
//! The primary key is the identity itself (the Discord user id), so profiles
//! are keyed by string and never auto-increment. `role` governs every
//! authorization check and is stored as text (`employee`, `admin`, `super_admin`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// Identity of the user
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Given name
    pub first_name: String,
    /// Family name, optional
    pub last_name: Option<String>,
    /// Contact email
    pub email: String,
    /// Role name as stored
    pub role: String,
}

/// Defines relationships between Profile and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One profile owns many claims
    #[sea_orm(has_many = "super::claim::Entity")]
    Claims,
}

impl Related<super::claim::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Claims.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

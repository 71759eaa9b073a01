//! Shared test utilities for `ClaimsBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        category,
        claim::{self, NewClaim},
        profile::Role,
    },
    entities,
    errors::Result,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Identity of the default employee fixture
pub const EMPLOYEE_ID: &str = "employee";
/// Identity of the default admin fixture
pub const ADMIN_ID: &str = "admin";
/// Identity of the default super admin fixture
pub const SUPER_ADMIN_ID: &str = "super_admin";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test database with a "Travel" category (mileage required),
/// an employee profile and an admin profile.
pub async fn setup_with_travel_category() -> Result<(DatabaseConnection, entities::category::Model)>
{
    let db = setup_test_db().await?;
    create_test_profile(&db, EMPLOYEE_ID, Role::Employee).await?;
    create_test_profile(&db, ADMIN_ID, Role::Admin).await?;
    let travel = create_test_category(&db, "Travel", true).await?;
    Ok((db, travel))
}

/// Creates a profile with the given role.
///
/// # Defaults
/// * `first_name`: the id
/// * `last_name`: None
/// * `email`: `<id>@example.com`
pub async fn create_test_profile(
    db: &DatabaseConnection,
    id: &str,
    role: Role,
) -> Result<entities::profile::Model> {
    create_custom_profile(db, id, id, None, role).await
}

/// Creates a profile with explicit names.
pub async fn create_custom_profile(
    db: &DatabaseConnection,
    id: &str,
    first_name: &str,
    last_name: Option<&str>,
    role: Role,
) -> Result<entities::profile::Model> {
    let model = entities::profile::ActiveModel {
        id: Set(id.to_string()),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.map(str::to_string)),
        email: Set(format!("{id}@example.com")),
        role: Set(role.as_str().to_string()),
    };
    Ok(model.insert(db).await?)
}

/// Creates a category directly, bypassing the role check.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
    requires_mileage: bool,
) -> Result<entities::category::Model> {
    let config = crate::config::settings::CategoryConfig {
        name: name.to_string(),
        requires_mileage,
    };
    category::seed_categories(db, std::slice::from_ref(&config)).await?;
    category::get_category_by_name(db, name)
        .await?
        .ok_or_else(|| crate::errors::Error::validation("seeded category missing"))
}

/// Submits a pending claim through the regular submission path.
///
/// # Defaults
/// * `description`: "test claim"
pub async fn create_test_claim(
    db: &DatabaseConnection,
    employee_id: &str,
    category_id: i64,
    amount: f64,
) -> Result<entities::claim::Model> {
    let new_claim = NewClaim {
        category_id: Some(category_id),
        amount: amount.to_string(),
        description: "test claim".to_string(),
        ..NewClaim::default()
    };
    claim::submit_claim(db, employee_id, new_claim).await
}

/// Inserts a pending claim with an explicit submission time.
/// Use this for window and ordering tests.
pub async fn insert_claim_at(
    db: &DatabaseConnection,
    employee_id: &str,
    category_id: i64,
    amount: f64,
    submitted_on: DateTime<Utc>,
) -> Result<entities::claim::Model> {
    let model = entities::claim::ActiveModel {
        employee_id: Set(employee_id.to_string()),
        category_id: Set(Some(category_id)),
        amount: Set(amount),
        description: Set("test claim".to_string()),
        submitted_on: Set(submitted_on),
        status: Set("pending".to_string()),
        submitted_by: Set(Some(employee_id.to_string())),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// The instant `days` days before now.
#[must_use]
pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

/// Builds an unsaved profile model, for mock query results.
#[must_use]
pub fn profile_model(id: &str, role: &str) -> entities::profile::Model {
    entities::profile::Model {
        id: id.to_string(),
        first_name: "Test".to_string(),
        last_name: None,
        email: format!("{id}@example.com"),
        role: role.to_string(),
    }
}

/// Builds an unsaved category model.
#[must_use]
pub fn category_model(id: i64, name: &str, requires_mileage: bool) -> entities::category::Model {
    entities::category::Model {
        id,
        name: name.to_string(),
        requires_mileage,
    }
}

/// Builds an unsaved pending claim model.
#[must_use]
pub fn claim_model(
    id: i64,
    employee_id: &str,
    category_id: Option<i64>,
    amount: f64,
    submitted_on: DateTime<Utc>,
) -> entities::claim::Model {
    entities::claim::Model {
        id,
        employee_id: employee_id.to_string(),
        category_id,
        amount,
        description: "test claim".to_string(),
        submitted_on,
        status: "pending".to_string(),
        reviewed_on: None,
        reviewed_by: None,
        mileage: None,
        start_location: None,
        end_location: None,
        receipt_url: None,
        submitted_by: Some(employee_id.to_string()),
    }
}

//! Category business logic - lookup, creation and seeding of expense categories.

use crate::{
    config::settings::CategoryConfig,
    core::profile,
    entities::{Category, category},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Retrieves all categories, ordered alphabetically by name.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by its unique ID.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by its exact name.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a category on behalf of `creator_id`, who must hold a privileged role.
///
/// The name is trimmed and must be non-empty and not already taken.
pub async fn create_category(
    db: &DatabaseConnection,
    creator_id: &str,
    name: &str,
    requires_mileage: bool,
) -> Result<category::Model> {
    if !profile::resolve_role(db, creator_id).await?.is_privileged() {
        return Err(Error::unauthorized("manage categories"));
    }

    insert_category(db, name, requires_mileage).await
}

async fn insert_category(
    db: &DatabaseConnection,
    name: &str,
    requires_mileage: bool,
) -> Result<category::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Category name cannot be empty"));
    }
    if get_category_by_name(db, name).await?.is_some() {
        return Err(Error::validation(format!("Category '{name}' already exists")));
    }

    let model = category::ActiveModel {
        name: Set(name.to_string()),
        requires_mileage: Set(requires_mileage),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Creates any configured categories that don't exist yet.
///
/// Returns the number of categories created.
pub async fn seed_categories(db: &DatabaseConnection, categories: &[CategoryConfig]) -> Result<usize> {
    let mut created = 0;
    for config in categories {
        if get_category_by_name(db, &config.name).await?.is_none() {
            insert_category(db, &config.name, config.requires_mileage).await?;
            info!("Seeded category '{}'", config.name);
            created += 1;
        }
    }
    Ok(created)
}

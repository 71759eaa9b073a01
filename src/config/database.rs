//! Database configuration module for `ClaimsBuddy`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::entities::{Category, Claim, Profile};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, sea_query::TableCreateStatement};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/claims_buddy.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    info!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions, skipping ones that already exist.
///
/// Profiles and categories are created before claims since claims reference both.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables: [TableCreateStatement; 3] = [
        schema.create_table_from_entity(Profile),
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(Claim),
    ];

    for mut table in tables {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }
    debug!("Schema is up to date");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CategoryModel, ClaimModel, ProfileModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ProfileModel> = Profile::find().limit(1).all(&db).await?;
        let _: Vec<CategoryModel> = Category::find().limit(1).all(&db).await?;
        let _: Vec<ClaimModel> = Claim::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}

//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod claim;
pub mod profile;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use claim::{Column as ClaimColumn, Entity as Claim, Model as ClaimModel};
pub use profile::{Column as ProfileColumn, Entity as Profile, Model as ProfileModel};

//! Core business logic - framework-agnostic claims operations.
//!
//! Nothing in here knows about Discord. Every operation takes a database
//! connection (or an object store) and returns [`crate::errors::Result`].

/// Expense category lookup, creation and seeding
pub mod category;

/// Claim submission, review and listing
pub mod claim;

/// Profiles and roles
pub mod profile;

/// Per-category aggregation and CSV export
pub mod report;

/// Report snapshot storage
pub mod snapshot;

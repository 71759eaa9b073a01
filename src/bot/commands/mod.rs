//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Category and profile administration commands
pub mod admin;

/// Claim submission, listing, review and dashboard commands
pub mod claim;

/// Message formatting helpers
pub mod format;

/// General utility commands
pub mod general;

/// Report, CSV export and snapshot commands
pub mod report;

use crate::{bot::BotData, errors::Error};

// Export commands
pub use admin::*;
pub use claim::*;
pub use general::*;
pub use report::*;

/// Every command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        submit_claim(),
        claims(),
        claim(),
        approve(),
        deny(),
        dashboard(),
        report(),
        report_csv(),
        save_report(),
        saved_reports(),
        download_report(),
        categories(),
        add_category(),
        profiles(),
        edit_profile(),
        set_role(),
    ]
}

//! Claim business logic - submission, review and listing of claims.
//!
//! A claim is created `pending` and reviewed exactly once. The review is a single
//! conditional update (`WHERE status = 'pending'`), so when two reviewers race on the
//! same claim the store lets only one of them through; the loser sees
//! [`Error::InvalidState`]. Every mutation here is one insert or one update, so a
//! failed operation never leaves a partial write behind.

use crate::{
    config::settings::ClaimPolicy,
    core::{category, profile},
    entities::{Category, Claim, Profile, claim, profile as profile_entity},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use std::{collections::HashMap, fmt, str::FromStr};
use tracing::{debug, info, instrument, warn};

const SELECT_CATEGORY: &str = "Please select an expense category";
const ENTER_VALID_AMOUNT: &str = "Please enter a valid amount greater than zero";
const PROVIDE_DESCRIPTION: &str = "Please provide a description";
const ENTER_VALID_MILEAGE: &str = "Please enter a valid mileage";

/// Lifecycle state of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimStatus {
    /// Awaiting review
    Pending,
    /// Approved by a reviewer (terminal)
    Approved,
    /// Denied by a reviewer (terminal)
    Denied,
}

impl ClaimStatus {
    /// Stored representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            other => Err(Error::validation(format!("Unknown claim status '{other}'"))),
        }
    }
}

/// Outcome a reviewer can give a pending claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Approve the claim
    Approved,
    /// Deny the claim
    Denied,
}

impl From<ReviewDecision> for ClaimStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => Self::Approved,
            ReviewDecision::Denied => Self::Denied,
        }
    }
}

/// Client-side status filter for an already fetched claim list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Keep everything
    #[default]
    All,
    /// Only pending claims
    Pending,
    /// Only approved claims
    Approved,
    /// Only denied claims
    Denied,
}

impl StatusFilter {
    /// Whether a stored status string passes this filter.
    #[must_use]
    pub fn matches(self, status: &str) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == ClaimStatus::Pending.as_str(),
            Self::Approved => status == ClaimStatus::Approved.as_str(),
            Self::Denied => status == ClaimStatus::Denied.as_str(),
        }
    }
}

/// User-supplied fields of a new claim, as entered on the form.
#[derive(Debug, Clone, Default)]
pub struct NewClaim {
    /// Selected category
    pub category_id: Option<i64>,
    /// Amount as typed; parsed during validation
    pub amount: String,
    /// What the expense was for
    pub description: String,
    /// Distance travelled, kept only for mileage categories
    pub mileage: Option<f64>,
    /// Trip origin, kept only for mileage categories
    pub start_location: Option<String>,
    /// Trip destination, kept only for mileage categories
    pub end_location: Option<String>,
    /// Pointer to an uploaded receipt
    pub receipt_url: Option<String>,
}

/// The parts of a [`NewClaim`] that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedClaim {
    /// Selected category
    pub category_id: i64,
    /// Parsed, positive, finite amount
    pub amount: f64,
    /// Trimmed description
    pub description: String,
}

/// A claim enriched with its category name and the owner's email.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimDisplay {
    /// The stored claim
    pub claim: claim::Model,
    /// Name of the claim's category, if it has one
    pub category_name: Option<String>,
    /// Email of the owning employee, if their profile exists
    pub employee_email: Option<String>,
}

/// Counts of claims per status, shown on dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSummary {
    /// All claims
    pub total: usize,
    /// Claims awaiting review
    pub pending: usize,
    /// Approved claims
    pub approved: usize,
    /// Denied claims
    pub denied: usize,
}

/// Parses a typed amount. Returns `None` unless it is a finite number above zero.
#[must_use]
pub fn parse_amount(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
}

/// Checks the form fields of a new claim without touching the store.
///
/// Checks run in form order: category, amount, description.
pub fn validate_new_claim(new_claim: &NewClaim) -> Result<ValidatedClaim> {
    let category_id = new_claim
        .category_id
        .ok_or_else(|| Error::validation(SELECT_CATEGORY))?;

    let amount = parse_amount(&new_claim.amount).ok_or_else(|| Error::validation(ENTER_VALID_AMOUNT))?;

    let description = new_claim.description.trim();
    if description.is_empty() {
        return Err(Error::validation(PROVIDE_DESCRIPTION));
    }

    Ok(ValidatedClaim {
        category_id,
        amount,
        description: description.to_string(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Submits a claim for the caller themself.
///
/// The new claim is `pending`, owned by and submitted by `submitter_id`.
#[instrument(skip(db, new_claim))]
pub async fn submit_claim(
    db: &DatabaseConnection,
    submitter_id: &str,
    new_claim: NewClaim,
) -> Result<claim::Model> {
    insert_claim(db, submitter_id, submitter_id, new_claim).await
}

/// Submits a claim owned by `employee_id` on their behalf.
///
/// Only privileged roles may do this; `submitted_by` records who did.
#[instrument(skip(db, new_claim))]
pub async fn submit_claim_on_behalf(
    db: &DatabaseConnection,
    submitter_id: &str,
    employee_id: &str,
    new_claim: NewClaim,
) -> Result<claim::Model> {
    if submitter_id != employee_id {
        if !profile::resolve_role(db, submitter_id).await?.is_privileged() {
            return Err(Error::unauthorized("submit claims for other employees"));
        }
        if profile::get_profile(db, employee_id).await?.is_none() {
            return Err(Error::ProfileNotFound {
                id: employee_id.to_string(),
            });
        }
    }

    insert_claim(db, employee_id, submitter_id, new_claim).await
}

async fn insert_claim(
    db: &DatabaseConnection,
    employee_id: &str,
    submitted_by: &str,
    new_claim: NewClaim,
) -> Result<claim::Model> {
    let valid = validate_new_claim(&new_claim)?;

    let category = category::get_category_by_id(db, valid.category_id)
        .await?
        .ok_or_else(|| Error::validation(SELECT_CATEGORY))?;

    // Travel fields are written as explicit nulls outside mileage categories.
    let (mileage, start_location, end_location) = if category.requires_mileage {
        if new_claim
            .mileage
            .is_some_and(|mileage| !mileage.is_finite() || mileage < 0.0)
        {
            return Err(Error::validation(ENTER_VALID_MILEAGE));
        }
        (
            new_claim.mileage,
            non_empty(new_claim.start_location),
            non_empty(new_claim.end_location),
        )
    } else {
        (None, None, None)
    };

    let model = claim::ActiveModel {
        employee_id: Set(employee_id.to_string()),
        category_id: Set(Some(category.id)),
        amount: Set(valid.amount),
        description: Set(valid.description),
        submitted_on: Set(Utc::now()),
        status: Set(ClaimStatus::Pending.as_str().to_string()),
        reviewed_on: Set(None),
        reviewed_by: Set(None),
        mileage: Set(mileage),
        start_location: Set(start_location),
        end_location: Set(end_location),
        receipt_url: Set(non_empty(new_claim.receipt_url)),
        submitted_by: Set(Some(submitted_by.to_string())),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(
        "Claim {} submitted by {} for {} ({:.2} in '{}')",
        created.id, submitted_by, employee_id, created.amount, category.name
    );
    Ok(created)
}

/// Approves or denies a pending claim.
///
/// The reviewer must be privileged, and the claim must still be pending. With
/// `allow_self_review` off, reviewers also cannot act on their own claims.
#[instrument(skip(db, policy))]
pub async fn review_claim(
    db: &DatabaseConnection,
    policy: ClaimPolicy,
    claim_id: i64,
    reviewer_id: &str,
    decision: ReviewDecision,
) -> Result<claim::Model> {
    if !profile::resolve_role(db, reviewer_id).await?.is_privileged() {
        return Err(Error::unauthorized("review claims"));
    }

    let existing = get_claim_by_id(db, claim_id)
        .await?
        .ok_or(Error::ClaimNotFound { id: claim_id })?;

    if !policy.allow_self_review && existing.employee_id == reviewer_id {
        return Err(Error::unauthorized("review your own claim"));
    }

    if existing.status.parse::<ClaimStatus>()? != ClaimStatus::Pending {
        return Err(Error::InvalidState {
            claim_id,
            status: existing.status,
        });
    }

    let status = ClaimStatus::from(decision);
    let result = Claim::update_many()
        .col_expr(claim::Column::Status, Expr::value(status.as_str()))
        .col_expr(claim::Column::ReviewedOn, Expr::value(Utc::now()))
        .col_expr(claim::Column::ReviewedBy, Expr::value(reviewer_id))
        .filter(claim::Column::Id.eq(claim_id))
        .filter(claim::Column::Status.eq(ClaimStatus::Pending.as_str()))
        .exec(db)
        .await?;

    let updated = get_claim_by_id(db, claim_id)
        .await?
        .ok_or(Error::ClaimNotFound { id: claim_id })?;

    if result.rows_affected == 0 {
        warn!("Claim {claim_id} was reviewed concurrently; {reviewer_id} lost the race");
        return Err(Error::InvalidState {
            claim_id,
            status: updated.status,
        });
    }

    info!("Claim {claim_id} {status} by {reviewer_id}");
    Ok(updated)
}

/// Finds a claim by its unique ID without any access check.
pub async fn get_claim_by_id(
    db: &DatabaseConnection,
    claim_id: i64,
) -> Result<Option<claim::Model>> {
    Claim::find_by_id(claim_id).one(db).await.map_err(Into::into)
}

/// Loads one claim for `caller_id`. Non-privileged callers may only see their own.
pub async fn get_claim(
    db: &DatabaseConnection,
    caller_id: &str,
    claim_id: i64,
) -> Result<ClaimDisplay> {
    let (found, category) = Claim::find_by_id(claim_id)
        .find_also_related(Category)
        .one(db)
        .await?
        .ok_or(Error::ClaimNotFound { id: claim_id })?;

    if found.employee_id != caller_id && !profile::resolve_role(db, caller_id).await?.is_privileged()
    {
        return Err(Error::unauthorized("view this claim"));
    }

    let employee_email = profile::get_profile(db, &found.employee_id)
        .await?
        .map(|p| p.email);

    Ok(ClaimDisplay {
        claim: found,
        category_name: category.map(|c| c.name),
        employee_email,
    })
}

/// Lists claims newest first, enriched with category names and employee emails.
///
/// Non-privileged callers only get the claims they own.
pub async fn list_claims(
    db: &DatabaseConnection,
    caller_id: &str,
    is_privileged: bool,
) -> Result<Vec<ClaimDisplay>> {
    let mut query = Claim::find();
    if !is_privileged {
        query = query.filter(claim::Column::EmployeeId.eq(caller_id));
    }

    let rows = query
        .find_also_related(Category)
        .order_by_desc(claim::Column::SubmittedOn)
        .order_by_desc(claim::Column::Id)
        .all(db)
        .await?;

    let mut employee_ids: Vec<String> = rows.iter().map(|(c, _)| c.employee_id.clone()).collect();
    employee_ids.sort();
    employee_ids.dedup();

    let emails: HashMap<String, String> = if employee_ids.is_empty() {
        HashMap::new()
    } else {
        Profile::find()
            .filter(profile_entity::Column::Id.is_in(employee_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.email))
            .collect()
    };

    debug!("Listed {} claims for {caller_id}", rows.len());
    Ok(rows
        .into_iter()
        .map(|(claim, category)| ClaimDisplay {
            employee_email: emails.get(&claim.employee_id).cloned(),
            category_name: category.map(|c| c.name),
            claim,
        })
        .collect())
}

/// Lists claims for `caller_id`, resolving privilege from their role.
pub async fn list_claims_for(db: &DatabaseConnection, caller_id: &str) -> Result<Vec<ClaimDisplay>> {
    let is_privileged = profile::resolve_role(db, caller_id).await?.is_privileged();
    list_claims(db, caller_id, is_privileged).await
}

/// Narrows an already fetched list to one status. [`StatusFilter::All`] keeps everything.
#[must_use]
pub fn filter_by_status(claims: Vec<ClaimDisplay>, filter: StatusFilter) -> Vec<ClaimDisplay> {
    claims
        .into_iter()
        .filter(|c| filter.matches(&c.claim.status))
        .collect()
}

/// Counts claims per status.
#[must_use]
pub fn summarize_statuses(claims: &[ClaimDisplay]) -> StatusSummary {
    claims
        .iter()
        .fold(StatusSummary::default(), |mut summary, c| {
            summary.total += 1;
            match c.claim.status.parse::<ClaimStatus>() {
                Ok(ClaimStatus::Pending) => summary.pending += 1,
                Ok(ClaimStatus::Approved) => summary.approved += 1,
                Ok(ClaimStatus::Denied) => summary.denied += 1,
                Err(_) => {}
            }
            summary
        })
}

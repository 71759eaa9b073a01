//! Profile business logic - role resolution and profile management.
//!
//! An identity's role comes from its stored profile. A missing profile, or a role
//! string we don't recognize, resolves to [`Role::Employee`] so that nobody is ever
//! granted privileges by accident.

use crate::{
    config::settings::ProfileConfig,
    entities::{Profile, profile},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::{fmt, str::FromStr};
use tracing::{info, warn};

/// Role carried by a profile. Governs every authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Submits and views their own claims
    Employee,
    /// Reviews claims and views all employees' data
    Admin,
    /// Admin who can also manage profiles
    SuperAdmin,
}

impl Role {
    /// Stored representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Whether this role may review claims and see everyone's data.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "employee" => Ok(Self::Employee),
            "admin" => Ok(Self::Admin),
            "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            other => Err(Error::validation(format!("Unknown role '{other}'"))),
        }
    }
}

/// Field changes for [`update_profile`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New given name
    pub first_name: Option<String>,
    /// New family name; an empty string clears it
    pub last_name: Option<String>,
    /// New email
    pub email: Option<String>,
    /// New role; only a super admin may change roles
    pub role: Option<Role>,
}

/// Role of a loaded profile. Unrecognized role strings count as employee.
#[must_use]
pub fn role_of(profile: &profile::Model) -> Role {
    profile.role.parse().unwrap_or_else(|_| {
        warn!(
            "Profile {} has unrecognized role '{}', treating as employee",
            profile.id, profile.role
        );
        Role::Employee
    })
}

/// "First Last" display name, trimmed when the last name is missing.
#[must_use]
pub fn display_name(profile: &profile::Model) -> String {
    format!(
        "{} {}",
        profile.first_name,
        profile.last_name.as_deref().unwrap_or_default()
    )
    .trim()
    .to_string()
}

/// Finds a profile by its identity.
pub async fn get_profile(db: &DatabaseConnection, id: &str) -> Result<Option<profile::Model>> {
    Profile::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Resolves the role of an identity, defaulting to [`Role::Employee`].
pub async fn resolve_role(db: &DatabaseConnection, id: &str) -> Result<Role> {
    Ok(get_profile(db, id)
        .await?
        .as_ref()
        .map_or(Role::Employee, role_of))
}

/// Fails with [`Error::Unauthorized`] unless `id` holds a privileged role.
pub async fn require_privileged(db: &DatabaseConnection, id: &str, action: &str) -> Result<Role> {
    let role = resolve_role(db, id).await?;
    if role.is_privileged() {
        Ok(role)
    } else {
        Err(Error::unauthorized(action))
    }
}

/// Returns the profile for `id`, creating an employee profile on first contact.
pub async fn ensure_profile(
    db: &DatabaseConnection,
    id: &str,
    first_name: &str,
) -> Result<profile::Model> {
    if let Some(existing) = get_profile(db, id).await? {
        return Ok(existing);
    }

    info!("Creating employee profile for {id}");
    let new_profile = profile::ActiveModel {
        id: Set(id.to_string()),
        first_name: Set(first_name.trim().to_string()),
        last_name: Set(None),
        email: Set(String::new()),
        role: Set(Role::Employee.as_str().to_string()),
    };
    new_profile.insert(db).await.map_err(Into::into)
}

/// Creates or refreshes the bootstrap profiles from config.toml.
///
/// Returns the number of profiles written.
pub async fn seed_profiles(db: &DatabaseConnection, profiles: &[ProfileConfig]) -> Result<usize> {
    for config in profiles {
        let role: Role = config.role.parse()?;
        let model = profile::ActiveModel {
            id: Set(config.id.clone()),
            first_name: Set(config.first_name.clone()),
            last_name: Set(config.last_name.clone()),
            email: Set(config.email.clone()),
            role: Set(role.as_str().to_string()),
        };

        if get_profile(db, &config.id).await?.is_some() {
            model.update(db).await?;
        } else {
            model.insert(db).await?;
        }
    }

    Ok(profiles.len())
}

/// Lists every profile ordered by last name, then first name.
pub async fn list_profiles(db: &DatabaseConnection) -> Result<Vec<profile::Model>> {
    Profile::find()
        .order_by_asc(profile::Column::LastName)
        .order_by_asc(profile::Column::FirstName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a [`ProfileUpdate`] on behalf of `editor_id`.
///
/// A super admin may edit any profile. Anyone else may edit only their own
/// names and email, never a role.
pub async fn update_profile(
    db: &DatabaseConnection,
    editor_id: &str,
    profile_id: &str,
    changes: ProfileUpdate,
) -> Result<profile::Model> {
    let editor_role = resolve_role(db, editor_id).await?;
    let is_super_admin = editor_role == Role::SuperAdmin;

    if !is_super_admin && (editor_id != profile_id || changes.role.is_some()) {
        return Err(Error::unauthorized("edit this profile"));
    }

    let existing = get_profile(db, profile_id)
        .await?
        .ok_or_else(|| Error::ProfileNotFound {
            id: profile_id.to_string(),
        })?;

    let mut model: profile::ActiveModel = existing.into();

    if let Some(first_name) = changes.first_name {
        let first_name = first_name.trim().to_string();
        if first_name.is_empty() {
            return Err(Error::validation("First name cannot be empty"));
        }
        model.first_name = Set(first_name);
    }
    if let Some(last_name) = changes.last_name {
        let last_name = last_name.trim().to_string();
        model.last_name = Set((!last_name.is_empty()).then_some(last_name));
    }
    if let Some(email) = changes.email {
        model.email = Set(email.trim().to_string());
    }
    if let Some(role) = changes.role {
        info!("{editor_id} set role of {profile_id} to {role}");
        model.role = Set(role.as_str().to_string());
    }

    model.update(db).await.map_err(Into::into)
}

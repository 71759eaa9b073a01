//! Application settings loading from config.toml
//!
//! The config file seeds expense categories and bootstrap profiles on startup,
//! and carries the policy switches for the review workflow and the reporting
//! engine. Every section is optional; missing sections fall back to defaults.

use crate::core::report::ReportSort;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an alternative config file path
pub const CONFIG_PATH_VAR: &str = "CLAIMS_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Categories to seed when missing
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    /// Profiles to create or refresh on startup (typically the first admins)
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,
    /// Review workflow policy
    #[serde(default)]
    pub claims: ClaimPolicy,
    /// Reporting engine settings
    #[serde(default)]
    pub reports: ReportSettings,
}

/// Configuration for a single expense category
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    /// Display name of the category
    pub name: String,
    /// Whether claims in this category carry mileage and trip locations
    #[serde(default)]
    pub requires_mileage: bool,
}

/// Configuration for a bootstrap profile
#[derive(Debug, Deserialize, Clone)]
pub struct ProfileConfig {
    /// Identity (Discord user id)
    pub id: String,
    /// Given name
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: Option<String>,
    /// Contact email
    pub email: String,
    /// `employee`, `admin` or `super_admin`
    pub role: String,
}

/// Policy switches for the claim review workflow
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ClaimPolicy {
    /// Whether a privileged reviewer may approve or deny their own claim
    #[serde(default = "default_allow_self_review")]
    pub allow_self_review: bool,
}

impl Default for ClaimPolicy {
    fn default() -> Self {
        Self {
            allow_self_review: default_allow_self_review(),
        }
    }
}

const fn default_allow_self_review() -> bool {
    true
}

/// Settings for the reporting engine and snapshot storage
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    /// Row ordering for category totals
    #[serde(default)]
    pub sort: ReportSort,
    /// Root directory of the snapshot object store
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            sort: ReportSort::default(),
            storage_root: default_storage_root(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("data/storage")
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads configuration from `CLAIMS_CONFIG`, or ./config.toml when unset.
///
/// A missing default file is not an error; the built-in defaults are used instead.
pub fn load_default_config() -> Result<AppConfig> {
    if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        return load_config(path);
    }

    let default_path = Path::new("config.toml");
    if default_path.exists() {
        load_config(default_path)
    } else {
        tracing::warn!("No config.toml found, using defaults");
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [[categories]]
            name = "Travel"
            requires_mileage = true

            [[categories]]
            name = "Medical"

            [[profiles]]
            id = "1001"
            first_name = "Ada"
            last_name = "Lovelace"
            email = "ada@example.com"
            role = "super_admin"

            [claims]
            allow_self_review = false

            [reports]
            sort = "category_name"
            storage_root = "/tmp/claims"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.categories.len(), 2);
        assert!(config.categories[0].requires_mileage);
        assert!(!config.categories[1].requires_mileage);
        assert_eq!(config.profiles[0].role, "super_admin");
        assert_eq!(config.profiles[0].last_name.as_deref(), Some("Lovelace"));
        assert!(!config.claims.allow_self_review);
        assert_eq!(config.reports.sort, ReportSort::CategoryName);
        assert_eq!(config.reports.storage_root, PathBuf::from("/tmp/claims"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.categories.is_empty());
        assert!(config.profiles.is_empty());
        assert!(config.claims.allow_self_review);
        assert_eq!(config.reports.sort, ReportSort::TotalDesc);
        assert_eq!(config.reports.storage_root, PathBuf::from("data/storage"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}

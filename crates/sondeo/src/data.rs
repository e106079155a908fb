//! Test data generation.
//!
//! Scenarios share the application's backend with whatever else is running
//! against it, so every created record carries a generated unique component
//! and nothing assumes exclusive access to pre-existing data.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Short unique suffix for generated identifiers
#[must_use]
fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Generate a unique email address
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}+{}@example.com", unique_suffix())
}

/// Generate a unique username
#[must_use]
pub fn unique_username(prefix: &str) -> String {
    format!("{prefix}_{}", unique_suffix())
}

/// A generated user for signup scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleUser {
    /// Unique email
    pub email: String,
    /// Password satisfying common complexity rules
    pub password: String,
    /// Display name
    pub full_name: String,
}

impl SampleUser {
    /// Generate a fresh user with a unique email
    #[must_use]
    pub fn generate() -> Self {
        Self {
            email: unique_email("testuser"),
            password: "TestPassword123!".to_string(),
            full_name: "Test Profile User".to_string(),
        }
    }
}

/// A generated entity for CRUD scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleEntity {
    /// Unique title (required field in conventional forms)
    pub title: String,
    /// Description (optional field in conventional forms)
    pub description: String,
}

impl SampleEntity {
    /// Generate a fresh entity with a unique title
    #[must_use]
    pub fn generate() -> Self {
        let suffix = unique_suffix();
        Self {
            title: format!("Test Item {suffix}"),
            description: format!("Created by sondeo run {suffix}"),
        }
    }

    /// Variant with updated values, still unique
    #[must_use]
    pub fn updated(&self) -> Self {
        let suffix = unique_suffix();
        Self {
            title: format!("Updated Entity {suffix}"),
            description: format!("Updated by sondeo run {suffix}"),
        }
    }
}

/// Invalid inputs for validation checks
pub mod invalid_data {
    /// Malformed email addresses
    pub const EMAILS: [&str; 6] = [
        "",
        "invalid-email",
        "@example.com",
        "user@",
        "user@.com",
        "user..double.dot@example.com",
    ];

    /// Passwords rejected by common complexity policies
    pub const PASSWORDS: [&str; 7] = [
        "",
        "123",
        "short",
        "onlylowercase",
        "ONLYUPPERCASE",
        "12345678",
        "NoNumbersOrSpecial",
    ];

    /// Blank values for required-field checks
    pub const REQUIRED_FIELDS: [&str; 3] = ["", "   ", "\t\n"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_unique_email_has_no_collisions() {
        let emails: HashSet<String> = (0..64).map(|_| unique_email("user")).collect();
        assert_eq!(emails.len(), 64);
        assert!(emails.iter().all(|e| e.starts_with("user+")));
        assert!(emails.iter().all(|e| e.ends_with("@example.com")));
    }

    #[test]
    fn test_unique_username_keeps_prefix() {
        let name = unique_username("profile");
        assert!(name.starts_with("profile_"));
        assert!(name.len() > "profile_".len());
    }

    #[test]
    fn test_sample_users_are_distinct() {
        let a = SampleUser::generate();
        let b = SampleUser::generate();
        assert_ne!(a.email, b.email);
    }

    #[test]
    fn test_entity_update_changes_title() {
        let entity = SampleEntity::generate();
        let updated = entity.updated();
        assert_ne!(entity.title, updated.title);
        assert!(updated.title.starts_with("Updated"));
    }

    #[test]
    fn test_invalid_tables_are_nonempty() {
        assert!(!invalid_data::EMAILS.is_empty());
        assert!(!invalid_data::PASSWORDS.is_empty());
        assert!(invalid_data::REQUIRED_FIELDS
            .iter()
            .all(|v| v.trim().is_empty()));
    }
}

//! Registration token entity - Invite links for new clients.
//!
//! A token becomes usable at `valid_at` and stays usable for exactly three days.

use chrono::Duration;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of days a token stays valid after `valid_at`
pub const VALIDITY_DAYS: i64 = 3;

/// Registration token database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registration_tokens")]
pub struct Model {
    /// Unique identifier for the token row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Random alphanumeric token handed out in the invite
    #[sea_orm(unique)]
    pub token: String,
    /// Start of the validity window
    pub valid_at: DateTimeUtc,
    /// When the token was generated
    pub created_at: DateTimeUtc,
}

impl Model {
    /// End of the validity window (inclusive).
    #[must_use]
    pub fn expires_at(&self) -> DateTimeUtc {
        self.valid_at + Duration::days(VALIDITY_DAYS)
    }

    /// Whether the token can be used at `now`: `valid_at <= now <= valid_at + 3 days`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTimeUtc) -> bool {
        self.valid_at <= now && now <= self.expires_at()
    }
}

/// `RegistrationToken` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::{TimeZone, Utc};

    fn token_valid_from(valid_at: DateTimeUtc) -> Model {
        Model {
            id: 1,
            token: "abc".to_string(),
            valid_at,
            created_at: valid_at,
        }
    }

    #[test]
    fn test_validity_window_boundaries() {
        let valid_at = Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap();
        let token = token_valid_from(valid_at);

        assert!(token.is_valid_at(valid_at));
        assert!(token.is_valid_at(valid_at + Duration::days(3)));
        assert!(!token.is_valid_at(valid_at - Duration::seconds(1)));
        assert!(!token.is_valid_at(valid_at + Duration::days(3) + Duration::seconds(1)));
    }

    #[test]
    fn test_expires_at_is_three_days_later() {
        let valid_at = Utc.with_ymd_and_hms(2025, 12, 30, 8, 30, 0).unwrap();
        let token = token_valid_from(valid_at);
        assert_eq!(
            token.expires_at(),
            Utc.with_ymd_and_hms(2026, 1, 2, 8, 30, 0).unwrap()
        );
    }
}

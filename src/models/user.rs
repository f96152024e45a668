//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Subscription plan tier, ordered by entitlement.
///
/// Streak freezes are a paid-plan feature; the free tier never enters the
/// freeze branch regardless of any stored token count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Plan {
    Free,
    Pro,
    Team,
}

impl Plan {
    /// Whether this plan is entitled to streak freezes.
    pub fn allows_streak_freezes(&self) -> bool {
        !matches!(self, Plan::Free)
    }
}

/// User account.
///
/// Created on first authentication by the session provider; plan tier and
/// freeze-token count are mutated only by billing/admin events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID (also used as document ID)
    pub id: u64,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// Display name
    pub display_name: String,
    /// Subscription plan tier
    pub plan: Plan,
    /// Remaining streak-freeze tokens (replenished by billing events)
    pub streak_freezes: u32,
    /// When the account was created (ISO 8601)
    pub created_at: String,
}

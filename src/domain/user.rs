use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::money::Money;

pub type UserId = String;

/// Persisted user document in the `users` collection.
///
/// Field names stay camelCase on the wire so records written by the
/// deployed app remain readable. `total_to_receive`/`total_to_pay` are
/// derived caches over the unpaid debt set; only the ledger operations
/// may write them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub friends: Vec<UserId>,
    pub total_to_receive: Money,
    pub total_to_pay: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A fresh profile: no friends, zero totals.
    pub fn new(id: UserId, username: String, email: String, photo_url: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            email,
            photo_url,
            friends: Vec::new(),
            total_to_receive: Money::zero(),
            total_to_pay: Money::zero(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn totals(&self) -> UserTotals {
        UserTotals {
            total_to_receive: self.total_to_receive,
            total_to_pay: self.total_to_pay,
        }
    }
}

/// The pair of derived aggregates maintained per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTotals {
    pub total_to_receive: Money,
    pub total_to_pay: Money,
}

impl UserTotals {
    pub fn zero() -> Self {
        Self {
            total_to_receive: Money::zero(),
            total_to_pay: Money::zero(),
        }
    }
}

/// The slice of a user profile shown in friend lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl From<&User> for FriendProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            photo_url: user.photo_url.clone(),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::money::Money;
use crate::domain::user::UserId;

pub type DebtId = String;

/// Persisted debt document in the `debts` collection.
///
/// Immutable after creation except for the one-way `paid` transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: DebtId,
    pub creditor_id: UserId,
    pub debtor_id: UserId,
    pub amount: Money,
    pub description: String,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Debt {
    pub fn new(creditor_id: UserId, debtor_id: UserId, amount: Money, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            creditor_id,
            debtor_id,
            amount,
            description,
            paid: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_paid(&mut self, at: DateTime<Utc>) {
        self.paid = true;
        self.updated_at = at;
    }
}

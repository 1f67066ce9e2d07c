use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::error::StoreError;
use crate::domain::debt::{Debt, DebtId};
use crate::domain::user::{User, UserId, UserTotals};

pub mod memory;

pub type Version = u64;

/// A document paired with the store version observed when it was read.
/// Commits guard their writes on these versions, which is how the store
/// detects concurrent modification.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub version: Version,
    pub doc: T,
}

/// Guard checked at commit time: the named document must still be at the
/// version it had when the batch was assembled.
#[derive(Debug, Clone)]
pub enum Precondition {
    UserAt { id: UserId, version: Version },
    DebtAt { id: DebtId, version: Version },
}

/// The writes a ledger operation is permitted to perform. Each variant
/// names exactly the fields it touches; there is no free-form partial
/// update, so an operation cannot corrupt fields it does not own.
#[derive(Debug, Clone)]
pub enum Write {
    InsertDebt(Debt),
    MarkDebtPaid {
        id: DebtId,
        updated_at: DateTime<Utc>,
    },
    SetUserTotals {
        id: UserId,
        totals: UserTotals,
        updated_at: DateTime<Utc>,
    },
    AddFriend {
        id: UserId,
        friend_id: UserId,
        updated_at: DateTime<Utc>,
    },
}

/// An atomic unit of work: every precondition holds and every write
/// applies, or the batch rejects with `StoreError::Conflict` and nothing
/// changes.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub preconditions: Vec<Precondition>,
    pub writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_user(mut self, user: &Versioned<User>) -> Self {
        self.preconditions.push(Precondition::UserAt {
            id: user.doc.id.clone(),
            version: user.version,
        });
        self
    }

    pub fn expect_debt(mut self, debt: &Versioned<Debt>) -> Self {
        self.preconditions.push(Precondition::DebtAt {
            id: debt.doc.id.clone(),
            version: debt.version,
        });
        self
    }

    pub fn write(mut self, write: Write) -> Self {
        self.writes.push(write);
        self
    }
}

/// The document database consumed by the ledger and directory layers.
///
/// Reads return the version alongside the document; `commit` is the
/// compare-and-write primitive that gives the ledger its atomicity.
/// `set_user_totals` bypasses version checks and exists only for the
/// reconciliation path, which overwrites derived fields with freshly
/// computed values.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<Option<Versioned<User>>, StoreError>;

    async fn get_debt(&self, id: &str) -> Result<Option<Versioned<Debt>>, StoreError>;

    /// Unpaid debts naming `user_id` as creditor. Order is unspecified.
    async fn unpaid_debts_by_creditor(&self, user_id: &str) -> Result<Vec<Debt>, StoreError>;

    /// Unpaid debts naming `user_id` as debtor. Order is unspecified.
    async fn unpaid_debts_by_debtor(&self, user_id: &str) -> Result<Vec<Debt>, StoreError>;

    /// Creates a user document; fails with `Conflict` if the id is taken.
    async fn insert_user(&self, user: User) -> Result<(), StoreError>;

    /// Applies the batch atomically, or rejects it wholly with `Conflict`.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Unconditional overwrite of a user's derived totals.
    async fn set_user_totals(&self, user_id: &str, totals: UserTotals) -> Result<(), StoreError>;
}

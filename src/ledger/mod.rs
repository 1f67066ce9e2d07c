use std::sync::Arc;
use std::time::Duration;

use crate::common::error::LedgerError;
use crate::common::money::Money;
use crate::domain::debt::{Debt, DebtId};
use crate::domain::user::UserTotals;
use crate::store::DocumentStore;

pub mod create_debt;
pub mod mark_paid;
pub mod queries;
pub mod reconcile;

/// Attempt bound for the optimistic-concurrency retry loop. The store
/// expects contended transactions to be retried by the caller; past this
/// bound the operation surfaces `LedgerError::Conflict`.
pub(crate) const MAX_ATTEMPTS: u32 = 5;
const BASE_BACKOFF_MS: u64 = 10;

/// Exponential backoff between conflicting transaction attempts.
pub(crate) async fn backoff(attempt: u32) {
    let delay = BASE_BACKOFF_MS << attempt.min(6);
    tokio::time::sleep(Duration::from_millis(delay)).await;
}


/// Entry point for the debt ledger: records obligations between users
/// and keeps the per-user `totalToReceive`/`totalToPay` aggregates
/// consistent with the set of unpaid debts.
///
/// Holds no state of its own; all durability and isolation come from the
/// store's compare-and-write commit.
#[derive(Debug)]
pub struct Ledger<S> {
    store: Arc<S>,
}

impl<S> Clone for Ledger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> Ledger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Records a new unpaid debt and bumps both parties' totals in one
    /// atomic commit.
    pub async fn create_debt(
        &self,
        creditor_id: &str,
        debtor_id: &str,
        amount: Money,
        description: &str,
    ) -> Result<DebtId, LedgerError> {
        create_debt::handle(self.store.as_ref(), creditor_id, debtor_id, amount, description).await
    }

    /// Unpaid debts owed to `user_id`. Empty when none; never an error
    /// for an unknown user.
    pub async fn debts_as_creditor(&self, user_id: &str) -> Result<Vec<Debt>, LedgerError> {
        queries::debts_as_creditor(self.store.as_ref(), user_id).await
    }

    /// Unpaid debts owed by `user_id`.
    pub async fn debts_as_debtor(&self, user_id: &str) -> Result<Vec<Debt>, LedgerError> {
        queries::debts_as_debtor(self.store.as_ref(), user_id).await
    }

    /// Settles a debt: flips `paid` and decrements both parties' totals
    /// in one atomic commit. A repeated call reports `AlreadyPaid`,
    /// which callers may treat as a no-op success.
    pub async fn mark_debt_as_paid(&self, debt_id: &str) -> Result<(), LedgerError> {
        mark_paid::handle(self.store.as_ref(), debt_id).await
    }

    /// Recomputes a user's totals from the unpaid debt set and writes
    /// them back. Repair path for drift; idempotent.
    pub async fn update_user_totals(&self, user_id: &str) -> Result<UserTotals, LedgerError> {
        reconcile::handle(self.store.as_ref(), user_id).await
    }
}

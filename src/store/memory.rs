use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::common::error::StoreError;
use crate::domain::debt::{Debt, DebtId};
use crate::domain::user::{User, UserId, UserTotals};
use crate::store::{DocumentStore, Precondition, Versioned, Write, WriteBatch};

/// In-memory `DocumentStore` with per-document version counters.
///
/// Serves as the crate's test double and reference implementation of the
/// optimistic-concurrency contract: every mutation bumps the document
/// version, and `commit` rejects a batch whenever any precondition
/// version has moved since the read.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, Versioned<User>>,
    debts: HashMap<DebtId, Versioned<Debt>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".into()))
    }
}

impl Inner {
    fn check(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        for pre in &batch.preconditions {
            let holds = match pre {
                Precondition::UserAt { id, version } => {
                    self.users.get(id).is_some_and(|v| v.version == *version)
                }
                Precondition::DebtAt { id, version } => {
                    self.debts.get(id).is_some_and(|v| v.version == *version)
                }
            };
            if !holds {
                return Err(StoreError::Conflict);
            }
        }
        // Writes must also be applicable, so a failure cannot surface
        // halfway through the apply pass.
        for write in &batch.writes {
            let applicable = match write {
                Write::InsertDebt(debt) => !self.debts.contains_key(&debt.id),
                Write::MarkDebtPaid { id, .. } => self.debts.contains_key(id),
                Write::SetUserTotals { id, .. } => self.users.contains_key(id),
                Write::AddFriend { id, friend_id, .. } => {
                    self.users.contains_key(id) && self.users.contains_key(friend_id)
                }
            };
            if !applicable {
                return Err(StoreError::Conflict);
            }
        }
        Ok(())
    }

    fn apply(&mut self, write: Write) {
        match write {
            Write::InsertDebt(debt) => {
                self.debts
                    .insert(debt.id.clone(), Versioned { version: 0, doc: debt });
            }
            Write::MarkDebtPaid { id, updated_at } => {
                if let Some(entry) = self.debts.get_mut(&id) {
                    entry.doc.mark_paid(updated_at);
                    entry.version += 1;
                }
            }
            Write::SetUserTotals {
                id,
                totals,
                updated_at,
            } => {
                if let Some(entry) = self.users.get_mut(&id) {
                    entry.doc.total_to_receive = totals.total_to_receive;
                    entry.doc.total_to_pay = totals.total_to_pay;
                    entry.doc.updated_at = updated_at;
                    entry.version += 1;
                }
            }
            Write::AddFriend {
                id,
                friend_id,
                updated_at,
            } => {
                if let Some(entry) = self.users.get_mut(&id) {
                    if !entry.doc.friends.contains(&friend_id) {
                        entry.doc.friends.push(friend_id);
                    }
                    entry.doc.updated_at = updated_at;
                    entry.version += 1;
                }
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_user(&self, id: &str) -> Result<Option<Versioned<User>>, StoreError> {
        Ok(self.lock()?.users.get(id).cloned())
    }

    async fn get_debt(&self, id: &str) -> Result<Option<Versioned<Debt>>, StoreError> {
        Ok(self.lock()?.debts.get(id).cloned())
    }

    async fn unpaid_debts_by_creditor(&self, user_id: &str) -> Result<Vec<Debt>, StoreError> {
        Ok(self
            .lock()?
            .debts
            .values()
            .filter(|v| !v.doc.paid && v.doc.creditor_id == user_id)
            .map(|v| v.doc.clone())
            .collect())
    }

    async fn unpaid_debts_by_debtor(&self, user_id: &str) -> Result<Vec<Debt>, StoreError> {
        Ok(self
            .lock()?
            .debts
            .values()
            .filter(|v| !v.doc.paid && v.doc.debtor_id == user_id)
            .map(|v| v.doc.clone())
            .collect())
    }

    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.users.contains_key(&user.id) {
            return Err(StoreError::Conflict);
        }
        inner
            .users
            .insert(user.id.clone(), Versioned { version: 0, doc: user });
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.check(&batch)?;
        for write in batch.writes {
            inner.apply(write);
        }
        Ok(())
    }

    async fn set_user_totals(&self, user_id: &str, totals: UserTotals) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        match inner.users.get_mut(user_id) {
            Some(entry) => {
                entry.doc.total_to_receive = totals.total_to_receive;
                entry.doc.total_to_pay = totals.total_to_pay;
                entry.doc.updated_at = Utc::now();
                entry.version += 1;
                Ok(())
            }
            None => Err(StoreError::Conflict),
        }
    }
}

use crate::{common::error::LedgerError, domain::debt::Debt, store::DocumentStore};

/// Unpaid debts naming `user_id` as creditor. An unknown user simply has
/// no debts; lookups never fail with `NotFound`.
pub async fn debts_as_creditor<S: DocumentStore>(
    store: &S,
    user_id: &str,
) -> Result<Vec<Debt>, LedgerError> {
    Ok(store.unpaid_debts_by_creditor(user_id).await?)
}

/// Unpaid debts naming `user_id` as debtor.
pub async fn debts_as_debtor<S: DocumentStore>(
    store: &S,
    user_id: &str,
) -> Result<Vec<Debt>, LedgerError> {
    Ok(store.unpaid_debts_by_debtor(user_id).await?)
}

use futures::future::try_join;

use crate::{
    common::{error::LedgerError, money::Money},
    domain::{debt::Debt, user::UserTotals},
    store::DocumentStore,
};

/// Recomputes both totals for `user_id` from the unpaid debt set and
/// overwrites the cached fields with the result.
///
/// The incremental updates in `create_debt`/`mark_debt_as_paid` are the
/// production path; this is the repair path for drift after a partial
/// failure or outside interference. Safe to call at any time, idempotent,
/// and deliberately unconditional: it writes what the debts say, whatever
/// the cached values were.
pub async fn handle<S: DocumentStore>(store: &S, user_id: &str) -> Result<UserTotals, LedgerError> {
    if store.get_user(user_id).await?.is_none() {
        return Err(LedgerError::NotFound(format!("user {user_id}")));
    }

    let (as_creditor, as_debtor) = try_join(
        store.unpaid_debts_by_creditor(user_id),
        store.unpaid_debts_by_debtor(user_id),
    )
    .await?;

    let totals = UserTotals {
        total_to_receive: sum_amounts(&as_creditor),
        total_to_pay: sum_amounts(&as_debtor),
    };
    store.set_user_totals(user_id, totals).await?;

    log::info!(
        "totals reconciled for {user_id}: receive {}, pay {}",
        totals.total_to_receive,
        totals.total_to_pay
    );
    Ok(totals)
}

fn sum_amounts(debts: &[Debt]) -> Money {
    debts.iter().fold(Money::zero(), |acc, d| acc + d.amount)
}

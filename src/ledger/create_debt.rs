use crate::{
    common::{error::{LedgerError, StoreError}, money::Money},
    domain::{debt::{Debt, DebtId}, user::UserTotals},
    ledger::{backoff, MAX_ATTEMPTS},
    store::{DocumentStore, Write, WriteBatch},
};

pub async fn handle<S: DocumentStore>(
    store: &S,
    creditor_id: &str,
    debtor_id: &str,
    amount: Money,
    description: &str,
) -> Result<DebtId, LedgerError> {
    if creditor_id == debtor_id {
        return Err(LedgerError::InvalidArgument(
            "creditor and debtor must differ".into(),
        ));
    }
    if !amount.is_positive() {
        return Err(LedgerError::InvalidArgument(
            "amount must be greater than zero".into(),
        ));
    }
    let description = description.trim();
    if description.is_empty() {
        return Err(LedgerError::InvalidArgument(
            "description must not be empty".into(),
        ));
    }

    for attempt in 0..MAX_ATTEMPTS {
        // Read both parties at a known version; the commit below is
        // conditional on neither having moved.
        let creditor = store
            .get_user(creditor_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("user {creditor_id}")))?;
        let debtor = store
            .get_user(debtor_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("user {debtor_id}")))?;

        let debt = Debt::new(
            creditor_id.to_owned(),
            debtor_id.to_owned(),
            amount,
            description.to_owned(),
        );
        let debt_id = debt.id.clone();
        let now = debt.created_at;

        let batch = WriteBatch::new()
            .expect_user(&creditor)
            .expect_user(&debtor)
            .write(Write::SetUserTotals {
                id: creditor.doc.id.clone(),
                totals: UserTotals {
                    total_to_receive: creditor.doc.total_to_receive + amount,
                    total_to_pay: creditor.doc.total_to_pay,
                },
                updated_at: now,
            })
            .write(Write::SetUserTotals {
                id: debtor.doc.id.clone(),
                totals: UserTotals {
                    total_to_receive: debtor.doc.total_to_receive,
                    total_to_pay: debtor.doc.total_to_pay + amount,
                },
                updated_at: now,
            })
            .write(Write::InsertDebt(debt));

        match store.commit(batch).await {
            Ok(()) => {
                log::info!(
                    "debt {debt_id} created: {debtor_id} owes {amount} to {creditor_id}"
                );
                return Ok(debt_id);
            }
            Err(StoreError::Conflict) => {
                log::debug!("create_debt conflict on attempt {}", attempt + 1);
                // No point sleeping after the last attempt.
                if attempt + 1 < MAX_ATTEMPTS {
                    backoff(attempt).await;
                }
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(LedgerError::Conflict {
        attempts: MAX_ATTEMPTS,
    })
}

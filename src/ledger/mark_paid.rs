use chrono::Utc;

use crate::{
    common::error::{LedgerError, StoreError},
    domain::user::UserTotals,
    ledger::{backoff, MAX_ATTEMPTS},
    store::{DocumentStore, Write, WriteBatch},
};

pub async fn handle<S: DocumentStore>(store: &S, debt_id: &str) -> Result<(), LedgerError> {
    for attempt in 0..MAX_ATTEMPTS {
        let debt = store
            .get_debt(debt_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("debt {debt_id}")))?;
        if debt.doc.paid {
            // Idempotence signal: callers treat this as a no-op success,
            // but it stays distinguishable for observability.
            return Err(LedgerError::AlreadyPaid(debt_id.to_owned()));
        }

        let creditor_id = debt.doc.creditor_id.clone();
        let debtor_id = debt.doc.debtor_id.clone();
        let amount = debt.doc.amount;

        let creditor = store
            .get_user(&creditor_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("user {creditor_id}")))?;
        let debtor = store
            .get_user(&debtor_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("user {debtor_id}")))?;

        let new_receive = creditor.doc.total_to_receive - amount;
        let new_pay = debtor.doc.total_to_pay - amount;
        // Totals are not clamped at zero: a clamp would hide external
        // drift from reconciliation. Negative results are only possible
        // after outside corruption, so make them visible.
        if new_receive.is_negative() || new_pay.is_negative() {
            log::warn!(
                "paying debt {debt_id} drives a total negative \
                 (creditor {creditor_id}: {new_receive}, debtor {debtor_id}: {new_pay}); \
                 totals need reconciliation"
            );
        }

        let now = Utc::now();
        let batch = WriteBatch::new()
            .expect_debt(&debt)
            .expect_user(&creditor)
            .expect_user(&debtor)
            .write(Write::MarkDebtPaid {
                id: debt_id.to_owned(),
                updated_at: now,
            })
            .write(Write::SetUserTotals {
                id: creditor_id.clone(),
                totals: UserTotals {
                    total_to_receive: new_receive,
                    total_to_pay: creditor.doc.total_to_pay,
                },
                updated_at: now,
            })
            .write(Write::SetUserTotals {
                id: debtor_id.clone(),
                totals: UserTotals {
                    total_to_receive: debtor.doc.total_to_receive,
                    total_to_pay: new_pay,
                },
                updated_at: now,
            });

        match store.commit(batch).await {
            Ok(()) => {
                log::info!("debt {debt_id} paid: {debtor_id} settled {amount} with {creditor_id}");
                return Ok(());
            }
            Err(StoreError::Conflict) => {
                log::debug!("mark_debt_as_paid conflict on attempt {}", attempt + 1);
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

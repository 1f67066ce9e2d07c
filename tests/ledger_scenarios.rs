use std::str::FromStr;
use std::sync::Arc;

use tapago_ledger::directory::friends::add_friend;
use tapago_ledger::directory::users::{initialize_user, NewUser};
use tapago_ledger::{DocumentStore, Ledger, LedgerError, MemoryStore, Money, UserTotals};

async fn setup(user_ids: &[&str]) -> (Arc<MemoryStore>, Ledger<MemoryStore>) {
    let _ = env_logger::builder().is_test(true).try_init();

    let store = Arc::new(MemoryStore::new());
    for id in user_ids {
        initialize_user(
            store.as_ref(),
            NewUser {
                id: (*id).to_owned(),
                email: format!("{id}@example.com"),
                username: None,
                photo_url: None,
            },
        )
        .await
        .expect("failed to seed user");
    }
    let ledger = Ledger::new(Arc::clone(&store));
    (store, ledger)
}

async fn totals_of(store: &MemoryStore, id: &str) -> UserTotals {
    store
        .get_user(id)
        .await
        .expect("store read failed")
        .expect("user exists")
        .doc
        .totals()
}

#[tokio::test]
async fn lunch_debt_lifecycle() {
    let (store, ledger) = setup(&["ana", "bruno"]).await;
    let fifty = Money::from_str("50.00").unwrap();

    let debt_id = ledger
        .create_debt("ana", "bruno", fifty, "lunch")
        .await
        .unwrap();

    let open = ledger.debts_as_creditor("ana").await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].amount, fifty);
    assert_eq!(open[0].description, "lunch");
    assert_eq!(totals_of(&store, "ana").await.total_to_receive, fifty);
    assert_eq!(totals_of(&store, "bruno").await.total_to_pay, fifty);

    ledger.mark_debt_as_paid(&debt_id).await.unwrap();

    assert!(ledger.debts_as_creditor("ana").await.unwrap().is_empty());
    assert!(ledger.debts_as_debtor("bruno").await.unwrap().is_empty());
    assert_eq!(totals_of(&store, "ana").await.total_to_receive, Money::zero());
    assert_eq!(totals_of(&store, "bruno").await.total_to_pay, Money::zero());
}

#[tokio::test]
async fn double_payment_is_flagged_but_harmless() {
    let (store, ledger) = setup(&["ana", "bruno"]).await;

    let debt_id = ledger
        .create_debt("ana", "bruno", Money::from_cents(2500), "coffee")
        .await
        .unwrap();
    ledger.mark_debt_as_paid(&debt_id).await.unwrap();

    let second = ledger.mark_debt_as_paid(&debt_id).await;
    assert!(matches!(second, Err(LedgerError::AlreadyPaid(_))));

    assert_eq!(totals_of(&store, "ana").await, UserTotals::zero());
    assert_eq!(totals_of(&store, "bruno").await, UserTotals::zero());
}

// After every successful mutation, the incrementally maintained totals
// must agree with a full recompute from the unpaid debt set.
#[tokio::test]
async fn incremental_totals_always_match_recompute() {
    let (store, ledger) = setup(&["ana", "bruno", "clara"]).await;

    let mut debt_ids = Vec::new();
    debt_ids.push(
        ledger
            .create_debt("ana", "bruno", Money::from_cents(3000), "groceries")
            .await
            .unwrap(),
    );
    debt_ids.push(
        ledger
            .create_debt("bruno", "clara", Money::from_cents(1575), "cinema")
            .await
            .unwrap(),
    );
    debt_ids.push(
        ledger
            .create_debt("clara", "ana", Money::from_cents(990), "rideshare")
            .await
            .unwrap(),
    );

    let check_all = |store: Arc<MemoryStore>, ledger: Ledger<MemoryStore>| async move {
        for id in ["ana", "bruno", "clara"] {
            let cached = totals_of(&store, id).await;
            let recomputed = ledger.update_user_totals(id).await.unwrap();
            assert_eq!(cached, recomputed, "drift detected for {id}");
        }
    };

    check_all(Arc::clone(&store), ledger.clone()).await;
    for debt_id in debt_ids {
        ledger.mark_debt_as_paid(&debt_id).await.unwrap();
        check_all(Arc::clone(&store), ledger.clone()).await;
    }

    assert_eq!(totals_of(&store, "ana").await, UserTotals::zero());
    assert_eq!(totals_of(&store, "bruno").await, UserTotals::zero());
    assert_eq!(totals_of(&store, "clara").await, UserTotals::zero());
}

#[tokio::test]
async fn reconciliation_is_idempotent() {
    let (_store, ledger) = setup(&["ana", "bruno"]).await;
    ledger
        .create_debt("ana", "bruno", Money::from_cents(1234), "utilities")
        .await
        .unwrap();

    let first = ledger.update_user_totals("ana").await.unwrap();
    let second = ledger.update_user_totals("ana").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.total_to_receive, Money::from_cents(1234));
}

// Two concurrent creations naming the same creditor serialize through
// the store's version checks; the retry loop absorbs the loser's
// conflict and no update is lost.
#[tokio::test]
async fn concurrent_creations_do_not_lose_updates() {
    let (store, ledger) = setup(&["ana", "bruno", "clara"]).await;

    let first = {
        let ledger = ledger.clone();
        tokio::spawn(async move {
            ledger
                .create_debt("ana", "bruno", Money::from_cents(3000), "split one")
                .await
        })
    };
    let second = {
        let ledger = ledger.clone();
        tokio::spawn(async move {
            ledger
                .create_debt("ana", "clara", Money::from_cents(2000), "split two")
                .await
        })
    };

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert_eq!(
        totals_of(&store, "ana").await.total_to_receive,
        Money::from_cents(5000)
    );
    assert_eq!(ledger.debts_as_creditor("ana").await.unwrap().len(), 2);

    // And the cache agrees with a recompute.
    let recomputed = ledger.update_user_totals("ana").await.unwrap();
    assert_eq!(recomputed.total_to_receive, Money::from_cents(5000));
}

#[tokio::test]
async fn debts_do_not_require_friendship() {
    let (_store, ledger) = setup(&["ana", "bruno"]).await;

    // ana and bruno never became friends; creation still succeeds.
    ledger
        .create_debt("ana", "bruno", Money::from_cents(700), "snack")
        .await
        .unwrap();
    assert_eq!(ledger.debts_as_creditor("ana").await.unwrap().len(), 1);
}

#[tokio::test]
async fn friendship_survives_alongside_ledger_traffic() {
    let (store, ledger) = setup(&["ana", "bruno"]).await;

    add_friend(store.as_ref(), "ana", "bruno").await.unwrap();
    ledger
        .create_debt("ana", "bruno", Money::from_cents(4200), "concert")
        .await
        .unwrap();

    let ana = store.get_user("ana").await.unwrap().unwrap();
    let bruno = store.get_user("bruno").await.unwrap().unwrap();
    assert_eq!(ana.doc.friends, vec!["bruno".to_owned()]);
    assert_eq!(bruno.doc.friends, vec!["ana".to_owned()]);
    assert_eq!(ana.doc.total_to_receive, Money::from_cents(4200));
}

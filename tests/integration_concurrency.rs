//! Concurrency Integration Tests
//!
//! Several connections racing on one file-backed store.

use ledger_engine::DomainError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_double_debit() {
    let (ledger, _db) = common::setup_file_ledger(4).await;
    let a = common::funded_account(&ledger, dec!(100.00)).await;

    let (first, second) = tokio::join!(ledger.debit(a, dec!(100.00)), ledger.debit(a, dec!(100.00)));

    let results = [first, second];
    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1, "exactly one debit must win: {:?}", results);

    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(
        loser.domain(),
        Some(DomainError::InsufficientFunds { .. })
    ));

    assert_eq!(ledger.balance_of(a).await.unwrap().value(), Decimal::ZERO);
    assert_eq!(ledger.history(a).collect().await.unwrap().len(), 2);
    assert!(ledger.verify_chain(a).await.unwrap().is_valid);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transfers_conserve_total() {
    let (ledger, _db) = common::setup_file_ledger(4).await;
    let a = common::funded_account(&ledger, dec!(50.00)).await;
    let b = common::funded_account(&ledger, dec!(50.00)).await;

    let mut tasks = Vec::new();
    for i in 0..20 {
        let ledger = ledger.clone();
        let (from, to) = if i % 2 == 0 { (a, b) } else { (b, a) };
        tasks.push(tokio::spawn(async move {
            ledger.transfer(from, to, dec!(7.50)).await
        }));
    }

    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => {}
            Err(err) => assert!(
                matches!(err.domain(), Some(DomainError::InsufficientFunds { .. })),
                "unexpected error: {}",
                err
            ),
        }
    }

    let a_balance = ledger.balance_of(a).await.unwrap().value();
    let b_balance = ledger.balance_of(b).await.unwrap().value();
    assert!(a_balance >= Decimal::ZERO);
    assert!(b_balance >= Decimal::ZERO);
    assert_eq!(a_balance + b_balance, dec!(100.00));

    assert!(ledger.verify_chain(a).await.unwrap().is_valid);
    assert!(ledger.verify_chain(b).await.unwrap().is_valid);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_account_opening() {
    let (ledger, _db) = common::setup_file_ledger(4).await;

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let ledger = ledger.clone();
        tasks.push(tokio::spawn(async move { ledger.open_account().await }));
    }

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap().unwrap());
    }
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), 16);
}

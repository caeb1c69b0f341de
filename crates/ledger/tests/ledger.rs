//! Contract tests for the [`Ledger`] trait, run against an in-memory
//! store with the same key shape and overwrite semantics as the
//! expense table.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use ledger::{Expense, Ledger, LedgerError, NewExpense, find_by_seq, next_seq_id};

/// Partition per user, items sorted by `expense_id`; inserting an
/// existing key overwrites, like `PutItem`.
#[derive(Default)]
struct MemoryLedger {
    partitions: Mutex<BTreeMap<u64, BTreeMap<String, Expense>>>,
}

impl MemoryLedger {
    fn snapshot(&self, user_id: u64) -> Vec<Expense> {
        self.partitions
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|partition| partition.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn append(&self, new: NewExpense) -> Result<Expense, LedgerError> {
        let mut partitions = self.partitions.lock().unwrap();
        let partition = partitions.entry(new.user_id).or_default();

        let current: Vec<Expense> = partition.values().cloned().collect();
        let expense = new.into_expense(next_seq_id(&current));
        partition.insert(expense.expense_id.clone(), expense.clone());
        Ok(expense)
    }

    async fn list(&self, user_id: u64) -> Result<Vec<Expense>, LedgerError> {
        Ok(self.snapshot(user_id))
    }

    async fn get_by_seq(&self, user_id: u64, seq_id: u32) -> Result<Expense, LedgerError> {
        let expenses = self.snapshot(user_id);
        find_by_seq(&expenses, seq_id)
            .cloned()
            .ok_or(LedgerError::NotFound(seq_id))
    }

    async fn delete_by_seq(&self, user_id: u64, seq_id: u32) -> Result<(), LedgerError> {
        let mut partitions = self.partitions.lock().unwrap();
        let partition = partitions.entry(user_id).or_default();

        let expenses: Vec<Expense> = partition.values().cloned().collect();
        let expense = find_by_seq(&expenses, seq_id).ok_or(LedgerError::NotFound(seq_id))?;
        partition.remove(&expense.expense_id);
        Ok(())
    }

    async fn delete_all(&self, user_id: u64) -> Result<usize, LedgerError> {
        let mut partitions = self.partitions.lock().unwrap();
        Ok(partitions
            .remove(&user_id)
            .map(|partition| partition.len())
            .unwrap_or(0))
    }
}

fn submission(user_id: u64, amount: f64, offset_secs: i64) -> NewExpense {
    NewExpense {
        user_id,
        chat_id: 99,
        username: Some("maria".to_string()),
        amount,
        category: "mercado".to_string(),
        method: "pix".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 10, 9, 30, 0).unwrap()
            + Duration::seconds(offset_secs),
    }
}

#[tokio::test]
async fn sequence_numbers_start_at_one_and_increment() {
    let store = MemoryLedger::default();

    for expected in 1..=3 {
        let expense = store
            .append(submission(42, 10.0, i64::from(expected)))
            .await
            .unwrap();
        assert_eq!(expense.seq_id, expected);
    }
}

#[tokio::test]
async fn users_are_numbered_independently() {
    let store = MemoryLedger::default();

    store.append(submission(1, 10.0, 0)).await.unwrap();
    store.append(submission(1, 11.0, 1)).await.unwrap();
    let other = store.append(submission(2, 12.0, 2)).await.unwrap();

    assert_eq!(other.seq_id, 1);
    assert_eq!(store.count(1).await.unwrap(), 2);
    assert_eq!(store.count(2).await.unwrap(), 1);
}

#[tokio::test]
async fn get_by_seq_returns_the_appended_record() {
    let store = MemoryLedger::default();

    let appended = store.append(submission(42, 21.9, 0)).await.unwrap();
    let fetched = store.get_by_seq(42, appended.seq_id).await.unwrap();
    assert_eq!(fetched, appended);
}

#[tokio::test]
async fn get_by_seq_reports_missing_records() {
    let store = MemoryLedger::default();
    store.append(submission(42, 21.9, 0)).await.unwrap();

    let err = store.get_by_seq(42, 3).await.unwrap_err();
    assert_eq!(err, LedgerError::NotFound(3));
}

#[tokio::test]
async fn deleted_records_are_gone() {
    let store = MemoryLedger::default();
    store.append(submission(42, 10.0, 0)).await.unwrap();
    store.append(submission(42, 20.0, 1)).await.unwrap();

    store.delete_by_seq(42, 1).await.unwrap();

    assert_eq!(
        store.get_by_seq(42, 1).await.unwrap_err(),
        LedgerError::NotFound(1)
    );
    assert_eq!(store.count(42).await.unwrap(), 1);
}

#[tokio::test]
async fn delete_all_empties_only_that_user() {
    let store = MemoryLedger::default();
    store.append(submission(1, 10.0, 0)).await.unwrap();
    store.append(submission(1, 20.0, 1)).await.unwrap();
    store.append(submission(2, 30.0, 2)).await.unwrap();

    assert_eq!(store.delete_all(1).await.unwrap(), 2);
    assert_eq!(store.count(1).await.unwrap(), 0);
    assert_eq!(store.count(2).await.unwrap(), 1);
}

#[tokio::test]
async fn remaining_records_keep_their_numbers_after_a_delete() {
    let store = MemoryLedger::default();
    for offset in 0..4 {
        store
            .append(submission(42, 10.0, i64::from(offset)))
            .await
            .unwrap();
    }

    store.delete_by_seq(42, 2).await.unwrap();

    let seqs: BTreeSet<u32> = store
        .list(42)
        .await
        .unwrap()
        .iter()
        .map(|e| e.seq_id)
        .collect();
    assert_eq!(seqs, BTreeSet::from([1, 3, 4]));
}

#[tokio::test]
async fn deleting_the_highest_number_frees_it_for_reuse() {
    let store = MemoryLedger::default();
    store.append(submission(42, 10.0, 0)).await.unwrap();
    store.append(submission(42, 20.0, 1)).await.unwrap();

    store.delete_by_seq(42, 2).await.unwrap();
    let next = store.append(submission(42, 30.0, 2)).await.unwrap();

    assert_eq!(next.seq_id, 2);
}

#[tokio::test]
async fn same_second_submissions_collide_and_overwrite() {
    let store = MemoryLedger::default();

    let first = store.append(submission(42, 10.0, 0)).await.unwrap();
    let second = store.append(submission(42, 99.0, 0)).await.unwrap();

    assert_eq!(first.expense_id, second.expense_id);
    let expenses = store.list(42).await.unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, 99.0);
    assert_eq!(expenses[0].seq_id, 2);
}

//! Expense ledger backed by a single DynamoDB table.
//!
//! Records live under the submitting user's partition key with the
//! derived `expense_id` as sort key. The table has no secondary
//! indexes, so every lookup fetches the user's partition and scans it.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use serde_dynamo::aws_sdk_dynamodb_1::{from_items, to_item};

pub use error::LedgerError;
pub use expense::{Expense, NewExpense, UNKNOWN_METHOD, find_by_seq, next_seq_id};

mod error;
mod expense;

type ResultLedger<T> = Result<T, LedgerError>;

/// Storage operations over a user's expense records.
///
/// Handlers hold the store behind this trait so tests can swap in an
/// in-memory implementation.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Assigns the next sequence number, derives the item identity and
    /// writes the record. Returns the record as stored.
    async fn append(&self, new: NewExpense) -> ResultLedger<Expense>;

    /// Every record of the user, in creation order.
    async fn list(&self, user_id: u64) -> ResultLedger<Vec<Expense>>;

    /// The record carrying the given sequence number.
    async fn get_by_seq(&self, user_id: u64, seq_id: u32) -> ResultLedger<Expense>;

    /// Removes the record carrying the given sequence number.
    async fn delete_by_seq(&self, user_id: u64, seq_id: u32) -> ResultLedger<()>;

    /// Removes every record of the user, one item at a time, and
    /// returns how many were removed. A failure mid-way leaves the
    /// records deleted so far gone.
    async fn delete_all(&self, user_id: u64) -> ResultLedger<usize>;

    /// Number of records the user currently holds.
    async fn count(&self, user_id: u64) -> ResultLedger<usize> {
        Ok(self.list(user_id).await?.len())
    }
}

/// Options for [`LedgerStore::connect`].
#[derive(Clone, Debug, Default)]
pub struct ConnectOptions {
    /// Deadline applied to every DynamoDB call. Set by the webhook
    /// deployment; long polling keeps the SDK defaults.
    pub operation_deadline: Option<Duration>,
}

/// DynamoDB-backed [`Ledger`].
#[derive(Clone, Debug)]
pub struct LedgerStore {
    client: aws_sdk_dynamodb::Client,
    table: String,
}

impl LedgerStore {
    /// Resolves the default AWS configuration chain and binds the store
    /// to `table`.
    pub async fn connect(table: impl Into<String>, options: ConnectOptions) -> ResultLedger<Self> {
        let table = table.into();
        if table.is_empty() {
            return Err(LedgerError::Storage(
                "expense table name is empty".to_string(),
            ));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(deadline) = options.operation_deadline {
            loader = loader
                .timeout_config(TimeoutConfig::builder().operation_timeout(deadline).build());
        }
        let config = loader.load().await;
        let client = aws_sdk_dynamodb::Client::new(&config);

        tracing::info!(table = %table, "expense store initialized");
        Ok(Self { client, table })
    }

    async fn delete_item(&self, expense: &Expense) -> ResultLedger<()> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key("user_id", AttributeValue::N(expense.user_id.to_string()))
            .key("expense_id", AttributeValue::S(expense.expense_id.clone()))
            .send()
            .await
            .map_err(|err| {
                let err = DisplayErrorContext(err);
                tracing::error!(
                    user_id = expense.user_id,
                    seq_id = expense.seq_id,
                    "failed to delete expense: {err}"
                );
                LedgerError::Storage(err.to_string())
            })?;
        Ok(())
    }
}

#[async_trait]
impl Ledger for LedgerStore {
    async fn append(&self, new: NewExpense) -> ResultLedger<Expense> {
        let current = self.list(new.user_id).await?;
        let expense = new.into_expense(next_seq_id(&current));

        let item = to_item(&expense).map_err(|err| {
            tracing::error!(user_id = expense.user_id, "failed to marshal expense: {err}");
            LedgerError::Storage(err.to_string())
        })?;
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|err| {
                let err = DisplayErrorContext(err);
                tracing::error!(user_id = expense.user_id, "failed to write expense: {err}");
                LedgerError::Storage(err.to_string())
            })?;

        tracing::info!(
            user_id = expense.user_id,
            seq_id = expense.seq_id,
            amount = expense.amount,
            category = %expense.category,
            "expense saved"
        );
        Ok(expense)
    }

    async fn list(&self, user_id: u64) -> ResultLedger<Vec<Expense>> {
        let result = self
            .client
            .query()
            .table_name(&self.table)
            .key_condition_expression("user_id = :uid")
            .expression_attribute_values(":uid", AttributeValue::N(user_id.to_string()))
            .scan_index_forward(true)
            .send()
            .await
            .map_err(|err| {
                let err = DisplayErrorContext(err);
                tracing::error!(user_id, "failed to query expenses: {err}");
                LedgerError::Storage(err.to_string())
            })?;

        from_items(result.items.unwrap_or_default()).map_err(|err| {
            tracing::error!(user_id, "failed to unmarshal expenses: {err}");
            LedgerError::Storage(err.to_string())
        })
    }

    async fn get_by_seq(&self, user_id: u64, seq_id: u32) -> ResultLedger<Expense> {
        let expenses = self.list(user_id).await?;
        find_by_seq(&expenses, seq_id)
            .cloned()
            .ok_or(LedgerError::NotFound(seq_id))
    }

    async fn delete_by_seq(&self, user_id: u64, seq_id: u32) -> ResultLedger<()> {
        let expenses = self.list(user_id).await?;
        let expense = find_by_seq(&expenses, seq_id).ok_or(LedgerError::NotFound(seq_id))?;

        self.delete_item(expense).await?;
        tracing::info!(user_id, seq_id, "expense deleted");
        Ok(())
    }

    async fn delete_all(&self, user_id: u64) -> ResultLedger<usize> {
        let expenses = self.list(user_id).await?;
        for expense in &expenses {
            self.delete_item(expense).await?;
        }

        tracing::info!(user_id, count = expenses.len(), "all expenses deleted");
        Ok(expenses.len())
    }
}

//! The module contains the `Expense` type and the pure helpers that
//! assign sequence numbers and derive item identities.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Stored in `method` when the user does not name one.
pub const UNKNOWN_METHOD: &str = "desconhecido";

/// A logged expense, as stored in the expense table.
///
/// `user_id` is the partition key and `expense_id` the sort key; every
/// other attribute rides along as item data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub user_id: u64,
    pub chat_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub amount: f64,
    pub category: String,
    pub method: String,
    pub created_at: DateTime<Utc>,
    pub expense_id: String,
    pub seq_id: u32,
}

/// An expense submission, before the store assigns identity and a
/// sequence number.
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub user_id: u64,
    pub chat_id: i64,
    pub username: Option<String>,
    pub amount: f64,
    pub category: String,
    pub method: String,
    pub created_at: DateTime<Utc>,
}

impl NewExpense {
    /// Builds the stored record for this submission.
    ///
    /// `expense_id` is `<user_id>#<created_at RFC 3339>`, second
    /// precision. Two submissions by the same user in the same second
    /// derive the same id and the later write overwrites the earlier
    /// one; a known limitation of the key shape.
    pub fn into_expense(self, seq_id: u32) -> Expense {
        let created_at = self.created_at.trunc_subsecs(0);
        let expense_id = format!(
            "{}#{}",
            self.user_id,
            created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );

        Expense {
            user_id: self.user_id,
            chat_id: self.chat_id,
            username: self.username,
            amount: self.amount,
            category: self.category,
            method: self.method,
            created_at,
            expense_id,
            seq_id,
        }
    }
}

/// Next sequence number for a user's records: one past the highest
/// assigned so far, starting at 1.
///
/// Two concurrent appends can read the same maximum and assign the same
/// number; the race is documented, not guarded.
pub fn next_seq_id(expenses: &[Expense]) -> u32 {
    expenses.iter().map(|e| e.seq_id).max().unwrap_or(0) + 1
}

/// Finds a record by its user-facing sequence number. The table has no
/// index over `seq_id`, so this is a linear scan.
pub fn find_by_seq(expenses: &[Expense], seq_id: u32) -> Option<&Expense> {
    expenses.iter().find(|e| e.seq_id == seq_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(seq_id: u32) -> Expense {
        submission(42, 30.0 + f64::from(seq_id)).into_expense(seq_id)
    }

    fn submission(user_id: u64, amount: f64) -> NewExpense {
        NewExpense {
            user_id,
            chat_id: 99,
            username: Some("maria".to_string()),
            amount,
            category: "mercado".to_string(),
            method: "pix".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 18, 6, 50).unwrap(),
        }
    }

    #[test]
    fn first_sequence_number_is_one() {
        assert_eq!(next_seq_id(&[]), 1);
    }

    #[test]
    fn sequence_number_is_one_past_the_maximum() {
        let expenses = vec![record(1), record(3)];
        assert_eq!(next_seq_id(&expenses), 4);
    }

    #[test]
    fn expense_id_embeds_user_and_second_precision_timestamp() {
        let mut new = submission(42, 21.9);
        new.created_at = new.created_at + Duration::milliseconds(250);

        let expense = new.into_expense(1);
        assert_eq!(expense.expense_id, "42#2024-03-09T18:06:50Z");
        assert_eq!(
            expense.created_at,
            Utc.with_ymd_and_hms(2024, 3, 9, 18, 6, 50).unwrap()
        );
    }

    #[test]
    fn same_second_submissions_derive_the_same_id() {
        let first = submission(42, 10.0).into_expense(1);
        let second = submission(42, 20.0).into_expense(2);
        assert_eq!(first.expense_id, second.expense_id);
    }

    #[test]
    fn find_by_seq_matches_only_the_requested_record() {
        let expenses = vec![record(1), record(2), record(3)];
        assert_eq!(find_by_seq(&expenses, 2).map(|e| e.seq_id), Some(2));
        assert!(find_by_seq(&expenses, 9).is_none());
    }
}

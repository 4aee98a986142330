//! Domain DTOs for the expenses API.
//!
//! # Design
//! These types mirror the backend's JSON schema but are defined independently
//! of the mock-server crate. Integration tests catch any schema drift between
//! the two.
//!
//! `category` is a plain `String`: the backend may send `null`, which is read
//! as the empty string so the form can bind it without an extra `Option`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Backend-assigned identifier of an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(pub i64);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExpenseId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ExpenseId)
    }
}

/// A single expense record returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    pub amount: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl Expense {
    /// The record's fields without its identifier.
    pub fn fields(&self) -> NewExpense {
        NewExpense {
            description: self.description.clone(),
            amount: self.amount,
            category: self.category.clone(),
            date: self.date,
        }
    }
}

/// Payload for creating an expense, and the full replacement body for an
/// update. Never carries an `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl NewExpense {
    /// Attach a backend id, yielding the record the server is expected to return.
    pub fn with_id(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            description: self.description,
            amount: self.amount,
            category: self.category,
            date: self.date,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

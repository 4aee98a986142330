//! Expense form state machine.
//!
//! The form holds the four raw text buffers a user types into and knows
//! whether it is creating a new record or editing an existing one. It never
//! talks to the network: `submission` validates the buffers and hands back a
//! typed `Submission` for the container to turn into a request.

use chrono::NaiveDate;

use crate::error::FormError;
use crate::types::{Expense, ExpenseId, NewExpense};

/// Date format accepted in the date field and used when populating it.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    Edit(ExpenseId),
}

/// What a valid form turns into.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(NewExpense),
    Update(ExpenseId, NewExpense),
}

impl Submission {
    pub fn fields(&self) -> &NewExpense {
        match self {
            Submission::Create(fields) | Submission::Update(_, fields) => fields,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseForm {
    mode: FormMode,
    description: String,
    amount: String,
    category: String,
    date: String,
}

impl ExpenseForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.description = value.into();
    }

    pub fn set_amount(&mut self, value: impl Into<String>) {
        self.amount = value.into();
    }

    pub fn set_category(&mut self, value: impl Into<String>) {
        self.category = value.into();
    }

    pub fn set_date(&mut self, value: impl Into<String>) {
        self.date = value.into();
    }

    /// Switch to editing `expense`. Every field is overwritten, including
    /// input the user typed but never submitted.
    pub fn begin_edit(&mut self, expense: &Expense) {
        self.mode = FormMode::Edit(expense.id);
        self.description = expense.description.clone();
        self.amount = expense.amount.to_string();
        self.category = expense.category.clone();
        self.date = expense
            .date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
    }

    /// Leave edit mode and discard the buffers.
    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Clear every field and return to create mode.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Validate the buffers and build the record to send.
    pub fn submission(&self) -> Result<Submission, FormError> {
        let fields = self.fields()?;
        Ok(match self.mode {
            FormMode::Create => Submission::Create(fields),
            FormMode::Edit(id) => Submission::Update(id, fields),
        })
    }

    fn fields(&self) -> Result<NewExpense, FormError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(FormError::MissingDescription);
        }
        Ok(NewExpense {
            description: description.to_string(),
            amount: parse_amount(&self.amount)?,
            category: self.category.trim().to_string(),
            date: parse_date(&self.date)?,
        })
    }
}

fn parse_amount(raw: &str) -> Result<f64, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FormError::MissingAmount);
    }
    match raw.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(FormError::InvalidAmount(raw.to_string())),
    }
}

fn parse_date(raw: &str) -> Result<Option<NaiveDate>, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| FormError::InvalidDate(raw.to_string()))
}

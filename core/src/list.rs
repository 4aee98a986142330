//! Text table view over a slice of expenses.
//!
//! The list owns nothing: it borrows whatever set the container currently
//! holds, renders it, and turns row picks into `ListAction`s. It never drops
//! a row on its own; a deleted record disappears only when the container
//! applies the next refresh.

use std::fmt::Write as _;

use crate::form::DATE_FORMAT;
use crate::types::{Expense, ExpenseId};

/// Shown in place of the table when there is nothing to list.
pub const EMPTY_TEXT: &str = "No expenses found.";

const HEADERS: [&str; 5] = ["ID", "Description", "Amount", "Category", "Date"];

/// Which row button the user pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}

/// Resolved row action, ready to hand to the container.
#[derive(Debug, Clone, PartialEq)]
pub enum ListAction {
    Edit(Expense),
    Delete(ExpenseId),
}

#[derive(Debug, Clone, Copy)]
pub struct ExpenseList<'a> {
    expenses: &'a [Expense],
}

impl<'a> ExpenseList<'a> {
    pub fn new(expenses: &'a [Expense]) -> Self {
        Self { expenses }
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    /// Sum of every listed amount.
    pub fn total(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// Resolve a 1-based row number into an action. `None` when the row
    /// does not exist.
    pub fn action_for(&self, row: usize, action: RowAction) -> Option<ListAction> {
        let expense = self.expenses.get(row.checked_sub(1)?)?;
        Some(match action {
            RowAction::Edit => ListAction::Edit(expense.clone()),
            RowAction::Delete => ListAction::Delete(expense.id),
        })
    }

    /// One line per row, suitable for a picker: `#id description (amount)`.
    pub fn labels(&self) -> Vec<String> {
        self.expenses
            .iter()
            .map(|e| format!("#{} {} ({})", e.id, e.description, format_amount(e.amount)))
            .collect()
    }

    /// Render as a fixed-width table with a total footer, or the empty text.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return EMPTY_TEXT.to_string();
        }

        let rows: Vec<[String; 5]> = self.expenses.iter().map(cells).collect();
        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_row(&mut out, &HEADERS.map(String::from), &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let _ = writeln!(out, "{}", rule.join("-+-"));
        for row in &rows {
            push_row(&mut out, row, &widths);
        }
        let _ = write!(
            out,
            "{} expense(s), total {}",
            self.len(),
            format_amount(self.total())
        );
        out
    }
}

fn cells(expense: &Expense) -> [String; 5] {
    [
        expense.id.to_string(),
        expense.description.clone(),
        format_amount(expense.amount),
        expense.category.clone(),
        expense
            .date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
    ]
}

fn push_row(out: &mut String, row: &[String; 5], widths: &[usize; 5]) {
    let padded: Vec<String> = row
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &width))| {
            // Amount column is right-aligned.
            if i == 2 {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}

fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

//! Root container: the authoritative record set and the current selection.
//!
//! # Design
//! `ExpenseApp` never performs I/O. Every operation that needs the backend
//! returns a `Command` carrying a sequence number and a ready-to-send
//! `HttpRequest`. The host executes it and hands the completion back through
//! `receive`, which applies it and may return a follow-up command (the
//! refresh that follows every successful mutation).
//!
//! The record set changes only when a refresh response is applied. The
//! category filter is applied here, over the full listing, so the backend
//! only ever needs to serve `GET /api/expenses`. Sequence
//! numbers are strictly increasing, and a refresh completion older than the
//! newest refresh already applied is discarded, so a slow early listing can
//! never overwrite a later one.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::client::ExpenseClient;
use crate::error::{ApiError, AppError};
use crate::form::{ExpenseForm, FormMode, Submission};
use crate::http::{HttpRequest, HttpResponse};
use crate::list::ExpenseList;
use crate::types::{Expense, ExpenseId};

/// Sequence number attached to every issued command.
pub type Seq = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Refresh,
    Create,
    Update(ExpenseId),
    Delete(ExpenseId),
}

/// A request the host must execute and report back via `ExpenseApp::receive`.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub seq: Seq,
    pub kind: CommandKind,
    pub request: HttpRequest,
}

/// What applying a completion did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A listing was applied; carries the new record count.
    Refreshed(usize),
    /// A listing, or its failure, arrived after a newer one was applied and
    /// was dropped.
    Stale,
    Saved(Expense),
    Deleted(ExpenseId),
    /// The operation failed; the error is also kept as `last_error`.
    Failed(ApiError),
    /// Unknown sequence number, or the app was unmounted.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub outcome: Outcome,
    pub follow_up: Option<Command>,
}

impl Update {
    fn only(outcome: Outcome) -> Self {
        Self {
            outcome,
            follow_up: None,
        }
    }
}

#[derive(Debug)]
pub struct ExpenseApp {
    client: ExpenseClient,
    records: Vec<Expense>,
    /// `records` restricted to `category_filter`, in listing order.
    visible: Vec<Expense>,
    selection: Option<Expense>,
    form: ExpenseForm,
    category_filter: Option<String>,
    last_error: Option<ApiError>,
    next_seq: Seq,
    applied_refresh: Option<Seq>,
    in_flight: HashMap<Seq, CommandKind>,
    mounted: bool,
}

impl ExpenseApp {
    pub fn new(client: ExpenseClient) -> Self {
        Self {
            client,
            records: Vec::new(),
            visible: Vec::new(),
            selection: None,
            form: ExpenseForm::new(),
            category_filter: None,
            last_error: None,
            next_seq: 0,
            applied_refresh: None,
            in_flight: HashMap::new(),
            mounted: false,
        }
    }

    /// Every record from the latest applied listing, ignoring the filter.
    pub fn records(&self) -> &[Expense] {
        &self.records
    }

    /// Records shown under the current category filter.
    pub fn visible(&self) -> &[Expense] {
        &self.visible
    }

    pub fn list(&self) -> ExpenseList<'_> {
        ExpenseList::new(&self.visible)
    }

    pub fn selection(&self) -> Option<&Expense> {
        self.selection.as_ref()
    }

    pub fn form(&self) -> &ExpenseForm {
        &self.form
    }

    /// Field edits go straight to the form; they never trigger a refresh.
    pub fn form_mut(&mut self) -> &mut ExpenseForm {
        &mut self.form
    }

    pub fn category_filter(&self) -> Option<&str> {
        self.category_filter.as_deref()
    }

    /// Most recent unacknowledged failure, for display.
    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Number of issued commands whose completion has not been received.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether at least one listing has been applied since construction.
    pub fn is_loaded(&self) -> bool {
        self.applied_refresh.is_some()
    }

    /// Start accepting completions and issue the initial load.
    pub fn mount(&mut self) -> Command {
        self.mounted = true;
        self.refresh()
    }

    /// Stop accepting completions. Anything still in flight is forgotten.
    pub fn unmount(&mut self) {
        self.mounted = false;
        if !self.in_flight.is_empty() {
            debug!(dropped = self.in_flight.len(), "unmount dropped in-flight commands");
        }
        self.in_flight.clear();
    }

    pub fn refresh(&mut self) -> Command {
        let request = self.client.build_list_expenses();
        self.issue(CommandKind::Refresh, request)
    }

    /// Show only one category (`None` shows everything) and refresh.
    ///
    /// Matching is exact and case-sensitive. The known records are
    /// re-filtered at once; the refresh brings them up to date.
    pub fn set_category_filter(&mut self, category: Option<String>) -> Command {
        self.category_filter = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self.apply_filter();
        self.refresh()
    }

    /// Select a shown expense for editing and load it into the form.
    pub fn select(&mut self, id: ExpenseId) -> Result<&Expense, AppError> {
        let expense = self
            .visible
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(AppError::UnknownExpense(id))?;
        self.form.begin_edit(&expense);
        Ok(&*self.selection.insert(expense))
    }

    /// Drop the selection and discard the form's input. Issues nothing.
    pub fn cancel_edit(&mut self) {
        self.selection = None;
        self.form.cancel();
    }

    /// Validate the form and issue a create or update.
    pub fn submit(&mut self) -> Result<Command, AppError> {
        let (kind, request) = match self.form.submission()? {
            Submission::Create(fields) => {
                (CommandKind::Create, self.client.build_create_expense(&fields)?)
            }
            Submission::Update(id, fields) => (
                CommandKind::Update(id),
                self.client.build_update_expense(id, &fields)?,
            ),
        };
        Ok(self.issue(kind, request))
    }

    pub fn delete(&mut self, id: ExpenseId) -> Command {
        let request = self.client.build_delete_expense(id);
        self.issue(CommandKind::Delete(id), request)
    }

    /// Apply the completion of command `seq`.
    ///
    /// `result` is the host's view of the round-trip: the response if one
    /// arrived, or a transport error if it did not.
    pub fn receive(&mut self, seq: Seq, result: Result<HttpResponse, ApiError>) -> Update {
        if !self.mounted {
            debug!(seq, "completion after unmount ignored");
            return Update::only(Outcome::Ignored);
        }
        let Some(kind) = self.in_flight.remove(&seq) else {
            debug!(seq, "completion for unknown command ignored");
            return Update::only(Outcome::Ignored);
        };

        match kind {
            CommandKind::Refresh => {
                if self.is_stale(seq) {
                    debug!(
                        seq,
                        applied = ?self.applied_refresh,
                        ok = result.is_ok(),
                        "discarding stale listing"
                    );
                    return Update::only(Outcome::Stale);
                }
                match result.and_then(|r| self.client.parse_list_expenses(r)) {
                    Ok(records) => self.apply_refresh(seq, records),
                    Err(err) => self.fail(kind, err),
                }
            }
            CommandKind::Create | CommandKind::Update(_) => {
                let parsed = result.and_then(|r| match kind {
                    CommandKind::Create => self.client.parse_create_expense(r),
                    _ => self.client.parse_update_expense(r),
                });
                match parsed {
                    Ok(expense) => self.apply_saved(kind, expense),
                    Err(err) => self.fail(kind, err),
                }
            }
            CommandKind::Delete(id) => {
                match result.and_then(|r| self.client.parse_delete_expense(r)) {
                    Ok(()) => self.apply_deleted(id),
                    Err(err) => self.fail(kind, err),
                }
            }
        }
    }

    /// A listing older than the newest applied one, whether it succeeded or not.
    fn is_stale(&self, seq: Seq) -> bool {
        self.applied_refresh.is_some_and(|applied| seq < applied)
    }

    fn apply_refresh(&mut self, seq: Seq, records: Vec<Expense>) -> Update {
        self.applied_refresh = Some(seq);
        self.records = records;
        self.apply_filter();
        info!(
            seq,
            total = self.records.len(),
            shown = self.visible.len(),
            "expense list refreshed"
        );
        self.last_error = None;
        Update::only(Outcome::Refreshed(self.visible.len()))
    }

    fn apply_filter(&mut self) {
        self.visible = match &self.category_filter {
            Some(category) => self
                .records
                .iter()
                .filter(|e| e.category == *category)
                .cloned()
                .collect(),
            None => self.records.clone(),
        };
    }

    fn apply_saved(&mut self, kind: CommandKind, expense: Expense) -> Update {
        info!(id = %expense.id, ?kind, "expense saved");
        // Only clear the form if it still shows what was submitted.
        let submitted_mode = match kind {
            CommandKind::Update(id) => FormMode::Edit(id),
            _ => FormMode::Create,
        };
        if self.form.mode() == submitted_mode {
            self.form.reset();
            self.selection = None;
        }
        self.last_error = None;
        Update {
            outcome: Outcome::Saved(expense),
            follow_up: Some(self.refresh()),
        }
    }

    fn apply_deleted(&mut self, id: ExpenseId) -> Update {
        info!(%id, "expense deleted");
        if self.selection.as_ref().is_some_and(|s| s.id == id) {
            self.cancel_edit();
        }
        self.last_error = None;
        Update {
            outcome: Outcome::Deleted(id),
            follow_up: Some(self.refresh()),
        }
    }

    fn fail(&mut self, kind: CommandKind, err: ApiError) -> Update {
        warn!(?kind, error = %err, "expense request failed");
        self.last_error = Some(err.clone());
        Update::only(Outcome::Failed(err))
    }

    fn issue(&mut self, kind: CommandKind, request: HttpRequest) -> Command {
        self.next_seq += 1;
        let seq = self.next_seq;
        debug!(seq, ?kind, %request, "issuing command");
        self.in_flight.insert(seq, kind);
        Command { seq, kind, request }
    }
}

//! Sans-IO client core for the expense tracker.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). On top of the client sit the
//! three view models of the tracker: the form, the list, and the root
//! container that owns the record set and the selection.
//!
//! # Design
//! - `ExpenseClient` is stateless; it holds only the resource URL.
//! - Each CRUD operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `ExpenseApp` turns user intents into sequenced `Command`s and applies
//!   completions, discarding stale listings and anything that lands after
//!   `unmount`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod list;
pub mod types;

pub use app::{Command, CommandKind, ExpenseApp, Outcome, Seq, Update};
pub use client::ExpenseClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, AppError, FormError};
pub use form::{ExpenseForm, FormMode, Submission};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use list::{ExpenseList, ListAction, RowAction};
pub use types::{Expense, ExpenseId, NewExpense};

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

/// Collection path, mirroring the production backend.
pub const RESOURCE_PATH: &str = "/api/expenses";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Body of POST and PUT. Any `id` in the body is ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct ExpenseInput {
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// In-memory table with identity-style ids: they start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct Store {
    next_id: i64,
    expenses: BTreeMap<i64, Expense>,
}

impl Store {
    pub fn insert(&mut self, input: ExpenseInput) -> Expense {
        self.next_id += 1;
        let expense = Expense {
            id: self.next_id,
            description: input.description,
            amount: input.amount,
            category: input.category,
            date: input.date,
        };
        self.expenses.insert(expense.id, expense.clone());
        expense
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Debug)]
pub enum ServerError {
    NotFound(i64),
    Invalid(&'static str),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::NotFound(id) => {
                (StatusCode::NOT_FOUND, format!("expense {id} not found"))
            }
            ServerError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub fn app() -> Router {
    router(Db::default())
}

/// Router over an existing store, so tests can seed or inspect it.
pub fn router(db: Db) -> Router {
    Router::new()
        .route(RESOURCE_PATH, get(list_expenses).post(create_expense))
        .route(
            &format!("{RESOURCE_PATH}/{{id}}"),
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, Db::default()).await
}

pub async fn serve(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, router(db)).await
}

fn validate(input: &ExpenseInput) -> Result<(), ServerError> {
    if input.description.trim().is_empty() {
        return Err(ServerError::Invalid("description is required"));
    }
    if !input.amount.is_finite() {
        return Err(ServerError::Invalid("amount must be a finite number"));
    }
    Ok(())
}

async fn list_expenses(State(db): State<Db>) -> Json<Vec<Expense>> {
    let store = db.read().await;
    Json(store.expenses.values().cloned().collect())
}

async fn create_expense(
    State(db): State<Db>,
    Json(input): Json<ExpenseInput>,
) -> Result<(StatusCode, Json<Expense>), ServerError> {
    validate(&input)?;
    let expense = db.write().await.insert(input);
    tracing::info!(id = expense.id, "expense created");
    Ok((StatusCode::CREATED, Json(expense)))
}

async fn get_expense(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Expense>, ServerError> {
    let store = db.read().await;
    store
        .expenses
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(ServerError::NotFound(id))
}

async fn update_expense(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<ExpenseInput>,
) -> Result<Json<Expense>, ServerError> {
    validate(&input)?;
    let mut store = db.write().await;
    let expense = store.expenses.get_mut(&id).ok_or(ServerError::NotFound(id))?;
    expense.description = input.description;
    expense.amount = input.amount;
    expense.category = input.category;
    expense.date = input.date;
    tracing::info!(id, "expense updated");
    Ok(Json(expense.clone()))
}

async fn delete_expense(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    let mut store = db.write().await;
    store.expenses.remove(&id).ok_or(ServerError::NotFound(id))?;
    tracing::info!(id, "expense deleted");
    Ok(StatusCode::NO_CONTENT)
}

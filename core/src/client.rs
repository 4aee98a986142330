//! Stateless HTTP request builder and response parser for the expenses API.
//!
//! # Design
//! `ExpenseClient` holds only the resource URL and carries no mutable state
//! between calls. Each CRUD operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip.
//!
//! Any 2xx status counts as success: backends answer create with 200 or 201
//! and delete with 200 or 204.

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Expense, ExpenseId, NewExpense};

/// Path of the expenses resource relative to the server origin.
pub const RESOURCE_PATH: &str = "/api/expenses";

/// Synchronous, stateless client for the expenses API.
#[derive(Debug, Clone)]
pub struct ExpenseClient {
    resource_url: String,
}

impl ExpenseClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            resource_url: format!("{}{RESOURCE_PATH}", base_url.trim().trim_end_matches('/')),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url)
    }

    /// Absolute URL of the collection, e.g. `http://localhost:8080/api/expenses`.
    pub fn resource_url(&self) -> &str {
        &self.resource_url
    }

    pub fn build_list_expenses(&self) -> HttpRequest {
        self.bodyless(HttpMethod::Get, self.resource_url.clone())
    }

    pub fn build_get_expense(&self, id: ExpenseId) -> HttpRequest {
        self.bodyless(HttpMethod::Get, self.item_url(id))
    }

    pub fn build_create_expense(&self, input: &NewExpense) -> Result<HttpRequest, ApiError> {
        self.with_body(HttpMethod::Post, self.resource_url.clone(), input)
    }

    pub fn build_update_expense(
        &self,
        id: ExpenseId,
        input: &NewExpense,
    ) -> Result<HttpRequest, ApiError> {
        self.with_body(HttpMethod::Put, self.item_url(id), input)
    }

    pub fn build_delete_expense(&self, id: ExpenseId) -> HttpRequest {
        self.bodyless(HttpMethod::Delete, self.item_url(id))
    }

    pub fn parse_list_expenses(&self, response: HttpResponse) -> Result<Vec<Expense>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_get_expense(&self, response: HttpResponse) -> Result<Expense, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_create_expense(&self, response: HttpResponse) -> Result<Expense, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_update_expense(&self, response: HttpResponse) -> Result<Expense, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_delete_expense(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn item_url(&self, id: ExpenseId) -> String {
        format!("{}/{id}", self.resource_url)
    }

    fn bodyless(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest {
            method,
            url,
            headers: vec![accept_json()],
            body: None,
        }
    }

    fn with_body(
        &self,
        method: HttpMethod,
        url: String,
        input: &NewExpense,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            url,
            headers: vec![
                accept_json(),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body: Some(body),
        })
    }
}

fn accept_json() -> (String, String) {
    ("accept".to_string(), "application/json".to_string())
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        _ if response.is_success() => Ok(()),
        404 => Err(ApiError::NotFound),
        status @ 400..=499 => Err(ApiError::Validation {
            status,
            message: error_message(&response.body),
        }),
        status => Err(ApiError::Transport {
            status: Some(status),
            message: error_message(&response.body),
        }),
    }
}

/// Pull a human-readable message out of an error body. JSON bodies with an
/// `error` or `message` string field are unwrapped; anything else is used as-is.
fn error_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(body) {
        for key in ["error", "message"] {
            if let Some(serde_json::Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn client() -> ExpenseClient {
        ExpenseClient::new("http://localhost:8080")
    }

    fn rent() -> NewExpense {
        NewExpense {
            description: "Rent".to_string(),
            amount: 1200.0,
            category: "Housing".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 1),
        }
    }

    #[test]
    fn build_list_expenses_produces_correct_request() {
        let req = client().build_list_expenses();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8080/api/expenses");
        assert!(req.body.is_none());
        assert_eq!(req.header("accept"), Some("application/json"));
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn build_get_expense_addresses_id() {
        let req = client().build_get_expense(ExpenseId(12));
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8080/api/expenses/12");
    }

    #[test]
    fn build_create_expense_omits_id() {
        let req = client().build_create_expense(&rent()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:8080/api/expenses");
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["description"], "Rent");
        assert_eq!(body["amount"], 1200.0);
        assert_eq!(body["category"], "Housing");
        assert_eq!(body["date"], "2024-02-01");
    }

    #[test]
    fn build_update_expense_sends_all_fields() {
        let mut input = rent();
        input.date = None;
        let req = client().build_update_expense(ExpenseId(5), &input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:8080/api/expenses/5");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert!(body["date"].is_null());
        assert_eq!(body["category"], "Housing");
    }

    #[test]
    fn build_delete_expense_has_no_body() {
        let req = client().build_delete_expense(ExpenseId(1));
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:8080/api/expenses/1");
        assert!(req.body.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = ExpenseClient::new("http://localhost:8080/");
        assert_eq!(client.resource_url(), "http://localhost:8080/api/expenses");
    }

    #[test]
    fn parse_list_expenses_success() {
        let response = HttpResponse::new(
            200,
            r#"[{"id":1,"description":"Coffee","amount":3.5,"category":"Food","date":"2024-01-01"}]"#,
        );
        let expenses = client().parse_list_expenses(response).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].description, "Coffee");
        assert_eq!(expenses[0].date, NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn parse_create_accepts_200_and_201() {
        let body = r#"{"id":9,"description":"Rent","amount":1200.0,"category":"Housing","date":"2024-02-01"}"#;
        for status in [200, 201] {
            let created = client()
                .parse_create_expense(HttpResponse::new(status, body))
                .unwrap();
            assert_eq!(created, rent().with_id(ExpenseId(9)));
        }
    }

    #[test]
    fn parse_get_expense_not_found() {
        let err = client()
            .parse_get_expense(HttpResponse::new(404, ""))
            .unwrap_err();
        assert_eq!(err, ApiError::NotFound);
    }

    #[test]
    fn parse_create_expense_validation_error_unwraps_message() {
        let err = client()
            .parse_create_expense(HttpResponse::new(400, r#"{"error":"description is required"}"#))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Validation {
                status: 400,
                message: "description is required".to_string()
            }
        );
    }

    #[test]
    fn parse_update_expense_server_error_is_transport() {
        let err = client()
            .parse_update_expense(HttpResponse::new(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport { status: Some(500), .. }));
    }

    #[test]
    fn parse_delete_expense_success_and_not_found() {
        assert!(client().parse_delete_expense(HttpResponse::new(204, "")).is_ok());
        assert!(client().parse_delete_expense(HttpResponse::new(200, "")).is_ok());
        let err = client()
            .parse_delete_expense(HttpResponse::new(404, ""))
            .unwrap_err();
        assert_eq!(err, ApiError::NotFound);
    }

    #[test]
    fn parse_list_expenses_bad_json() {
        let err = client()
            .parse_list_expenses(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn empty_error_body_gets_placeholder_message() {
        let err = client()
            .parse_list_expenses(HttpResponse::new(502, "  "))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Transport {
                status: Some(502),
                message: "no response body".to_string()
            }
        );
    }
}

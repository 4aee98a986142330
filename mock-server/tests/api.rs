use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, router, Db, Expense, ExpenseInput};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

async fn seeded(inputs: &[(&str, f64, Option<&str>)]) -> Db {
    let db = Db::default();
    {
        let mut store = db.write().await;
        for (description, amount, category) in inputs {
            store.insert(ExpenseInput {
                description: description.to_string(),
                amount: *amount,
                category: category.map(str::to_string),
                date: None,
            });
        }
    }
    db
}

// --- list ---

#[tokio::test]
async fn list_expenses_empty() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/expenses"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let expenses: Vec<Expense> = body_json(resp).await;
    assert!(expenses.is_empty());
}

#[tokio::test]
async fn list_expenses_in_id_order() {
    let db = seeded(&[("Coffee", 3.5, Some("Food")), ("Rent", 1200.0, Some("Housing"))]).await;
    let resp = router(db)
        .oneshot(empty_request("GET", "/api/expenses"))
        .await
        .unwrap();

    let expenses: Vec<Expense> = body_json(resp).await;
    let ids: Vec<i64> = expenses.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn list_expenses_ignores_query_string() {
    let db = seeded(&[
        ("Coffee", 3.5, Some("Food")),
        ("Rent", 1200.0, Some("Housing")),
        ("Misc", 1.0, None),
    ])
    .await;
    let resp = router(db)
        .oneshot(empty_request("GET", "/api/expenses?category=Food"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let expenses: Vec<Expense> = body_json(resp).await;
    assert_eq!(expenses.len(), 3);
    assert_eq!(expenses[2].category, None);
}

// --- create ---

#[tokio::test]
async fn create_expense_returns_201_with_id() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            r#"{"description":"Rent","amount":1200,"category":"Housing","date":"2024-02-01"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let expense: Expense = body_json(resp).await;
    assert_eq!(expense.id, 1);
    assert_eq!(expense.description, "Rent");
    assert_eq!(expense.amount, 1200.0);
    assert_eq!(expense.category.as_deref(), Some("Housing"));
    assert_eq!(expense.date.unwrap().to_string(), "2024-02-01");
}

#[tokio::test]
async fn create_expense_blank_description_returns_400() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            r#"{"description":" ","amount":5}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "description is required");
}

#[tokio::test]
async fn create_expense_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/expenses", r#"{"description":"No amount"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- get ---

#[tokio::test]
async fn get_expense_not_found() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/expenses/1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_expense_bad_id_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/expenses/not-a-number"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update ---

#[tokio::test]
async fn update_expense_not_found() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/api/expenses/7",
            r#"{"description":"Nope","amount":1}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_expense_replaces_every_field() {
    let db = seeded(&[("Coffee", 3.5, Some("Food"))]).await;
    let resp = router(db.clone())
        .oneshot(json_request(
            "PUT",
            "/api/expenses/1",
            r#"{"description":"Espresso","amount":4}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Expense = body_json(resp).await;
    assert_eq!(updated.id, 1);
    assert_eq!(updated.description, "Espresso");
    assert_eq!(updated.amount, 4.0);
    assert!(updated.category.is_none());
    assert_eq!(db.read().await.len(), 1);
}

// --- delete ---

#[tokio::test]
async fn delete_expense_not_found() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/api/expenses/1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/expenses",
            r#"{"description":"Coffee","amount":3.5,"category":"Food","date":"2024-01-01"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Expense = body_json(resp).await;
    let id = created.id;

    // list: should contain the one expense
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/api/expenses"))
        .await
        .unwrap();
    let expenses: Vec<Expense> = body_json(resp).await;
    assert_eq!(expenses, vec![created.clone()]);

    // update
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/expenses/{id}"),
            r#"{"description":"Coffee","amount":4.25,"category":"Food","date":"2024-01-01"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Expense = body_json(resp).await;
    assert_eq!(updated.amount, 4.25);

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/api/expenses/{id}")))
        .await
        .unwrap();
    let fetched: Expense = body_json(resp).await;
    assert_eq!(fetched, updated);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/api/expenses/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/api/expenses/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete: empty
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/api/expenses"))
        .await
        .unwrap();
    let expenses: Vec<Expense> = body_json(resp).await;
    assert!(expenses.is_empty());
}

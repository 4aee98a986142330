//! Shared helpers for tests that talk to a live mock server.

#![allow(dead_code)]

use expense_core::{ApiError, Command, ExpenseApp, HttpMethod, HttpRequest, HttpResponse, Outcome};

/// Start the mock server on a random port, optionally pre-seeded, and
/// return its base URL.
pub fn spawn_server(db: mock_server::Db) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::serve(listener, db).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation. The request's own headers are
/// sent as built.
pub fn execute(req: &HttpRequest) -> Result<HttpResponse, ApiError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let headers = req.headers.as_slice();
    let mut response = match (req.method, req.body.as_deref()) {
        (HttpMethod::Get, _) => with_headers(agent.get(&req.url), headers).call(),
        (HttpMethod::Delete, _) => with_headers(agent.delete(&req.url), headers).call(),
        (HttpMethod::Post, Some(body)) => {
            with_headers(agent.post(&req.url), headers).send(body.as_bytes())
        }
        (HttpMethod::Post, None) => with_headers(agent.post(&req.url), headers).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            with_headers(agent.put(&req.url), headers).send(body.as_bytes())
        }
        (HttpMethod::Put, None) => with_headers(agent.put(&req.url), headers).send_empty(),
    }
    .map_err(|e| ApiError::transport(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    Ok(HttpResponse::new(status, body))
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Execute `command` and every follow-up it produces, returning the outcomes
/// in order.
pub fn drive(app: &mut ExpenseApp, command: Command) -> Vec<Outcome> {
    let mut outcomes = Vec::new();
    let mut next = Some(command);
    while let Some(command) = next {
        let update = app.receive(command.seq, execute(&command.request));
        outcomes.push(update.outcome);
        next = update.follow_up;
    }
    outcomes
}

//! Blocking HTTP host for the sans-IO core.
//!
//! Executes the `HttpRequest`s that `ExpenseApp` and `ExpenseClient` build,
//! one at a time, and feeds completions back until no follow-up remains.

use expense_core::{
    ApiError, Command, ExpenseApp, HttpMethod, HttpRequest, HttpResponse, Outcome,
};
use tracing::{debug, instrument};
use ureq::{Agent, RequestBuilder};

pub struct Transport {
    agent: Agent,
}

impl Transport {
    pub fn new() -> Self {
        // Statuses are data here; the core classifies them.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Perform one round-trip. Only failures to get any response at all
    /// become errors; every status code is returned as a response.
    #[instrument(skip_all, fields(method = %req.method, url = %req.url))]
    pub fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let headers = req.headers.as_slice();
        let result = match (req.method, req.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&req.url), headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(&req.url), headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&req.url), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(&req.url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(&req.url), headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(&req.url), headers).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::transport(format!("reading response body: {e}")))?;
        debug!(status, bytes = body.len(), "response received");
        Ok(HttpResponse::new(status, body))
    }

    /// Execute `command` and every follow-up it produces. Returns the
    /// outcomes in completion order.
    pub fn run(&self, app: &mut ExpenseApp, command: Command) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        let mut next = Some(command);
        while let Some(command) = next {
            let update = app.receive(command.seq, self.execute(&command.request));
            outcomes.push(update.outcome);
            next = update.follow_up;
        }
        outcomes
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// The first failure among `outcomes`, if any.
pub fn first_failure(outcomes: &[Outcome]) -> Option<&ApiError> {
    outcomes.iter().find_map(|o| match o {
        Outcome::Failed(err) => Some(err),
        _ => None,
    })
}

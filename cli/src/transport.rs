//! Executes core `HttpRequest`s over real HTTP.

use thiserror::Error;
use todo_core::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Error, Debug)]
#[error("request to {url} failed: {source}")]
pub struct TransportError {
    url: String,
    #[source]
    source: ureq::Error,
}

pub struct Transport {
    agent: ureq::Agent,
}

impl Transport {
    pub fn new() -> Self {
        // statuses are data for the core to interpret, not transport errors
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn execute(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method, url, body, ..
        } = req;
        tracing::debug!(%method, %url, "sending");

        let result = match (method, body) {
            (HttpMethod::Get, _) => self.agent.get(&url).call(),
            (HttpMethod::Delete, _) => self.agent.delete(&url).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&url).send_empty(),
            (HttpMethod::Put, Some(body)) => self
                .agent
                .put(&url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Put, None) => self.agent.put(&url).send_empty(),
        };
        let mut response = result.map_err(|source| TransportError {
            url: url.clone(),
            source,
        })?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|source| TransportError { url, source })?;
        Ok(HttpResponse::new(status, body))
    }
}

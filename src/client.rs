//! HTTP client for the question-answering endpoint.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Request body for the ask endpoint.
#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

/// Reply body from the ask endpoint. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct AskReply {
    response: String,
}

/// Client for `POST {endpoint}/ask`.
///
/// Built without a request timeout: a question that never resolves is left
/// to the transport's own limits.
#[derive(Debug, Clone)]
pub struct AskClient {
    client: reqwest::Client,
    endpoint: String,
}

impl AskClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one question and return the answer text.
    ///
    /// Any failure along the way, from connect errors through non-2xx
    /// statuses to bodies missing the `response` field, comes back as a
    /// single error; callers do not need to tell the cases apart.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let url = format!("{}/ask", self.endpoint);

        let response = self
            .client
            .post(&url)
            .json(&AskRequest { question })
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("endpoint returned {}", status);
        }

        let reply: AskReply = response
            .json()
            .await
            .context("reply body was not valid JSON with a response field")?;

        Ok(reply.response)
    }
}

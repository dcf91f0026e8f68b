//! Client for the function service's custom-runtime API.
//!
//! The service exposes a small HTTP API at `$AWS_LAMBDA_RUNTIME_API`. A
//! runtime long-polls `invocation/next`, runs the handler, and reports the
//! result to `invocation/{id}/response` or `invocation/{id}/error`.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::handler::HandlerError;

const API_VERSION: &str = "2018-06-01";

const REQUEST_ID_HEADER: &str = "Lambda-Runtime-Aws-Request-Id";
const DEADLINE_HEADER: &str = "Lambda-Runtime-Deadline-Ms";
const ERROR_TYPE_HEADER: &str = "Lambda-Runtime-Function-Error-Type";

/// One pending invocation handed out by the runtime API.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub request_id: String,
    /// Wall-clock deadline in epoch milliseconds, when the service sends one.
    pub deadline_ms: Option<u64>,
    pub event: serde_json::Value,
}

/// Error document accepted by the `error` endpoints.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDocument {
    pub error_message: String,
    pub error_type: String,
}

impl From<&HandlerError> for ErrorDocument {
    fn from(err: &HandlerError) -> Self {
        Self {
            error_message: err.to_string(),
            error_type: err.error_type().to_string(),
        }
    }
}

/// Blocking runtime API client.
pub struct RuntimeClient {
    agent: ureq::Agent,
    base: String,
}

impl RuntimeClient {
    /// `api` is the `host:port` from `AWS_LAMBDA_RUNTIME_API`.
    #[must_use]
    pub fn new(api: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            base: format!("http://{api}/{API_VERSION}/runtime"),
        }
    }

    /// Block until the next invocation is available.
    pub fn next_invocation(&self) -> Result<Invocation> {
        let url = format!("{}/invocation/next", self.base);
        let resp = self
            .agent
            .get(&url)
            .call()
            .context("polling runtime API for next invocation")?;

        let request_id = resp
            .header(REQUEST_ID_HEADER)
            .map(str::to_string)
            .with_context(|| format!("runtime API response missing {REQUEST_ID_HEADER}"))?;
        let deadline_ms = resp.header(DEADLINE_HEADER).and_then(|v| v.parse().ok());

        let body = resp.into_string().context("reading invocation event")?;
        let event = if body.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&body).context("parsing invocation event")?
        };

        Ok(Invocation {
            request_id,
            deadline_ms,
            event,
        })
    }

    /// Report a successful result for `request_id`.
    pub fn send_response(&self, request_id: &str, result: &serde_json::Value) -> Result<()> {
        let url = format!("{}/invocation/{request_id}/response", self.base);
        let body = serde_json::to_string(result).context("serializing response")?;
        self.agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body)
            .with_context(|| format!("posting response for {request_id}"))?;
        Ok(())
    }

    /// Report a handler failure for `request_id`.
    pub fn send_error(&self, request_id: &str, error: &ErrorDocument) -> Result<()> {
        let url = format!("{}/invocation/{request_id}/error", self.base);
        self.post_error(&url, error)
            .with_context(|| format!("posting error for {request_id}"))
    }

    /// Report a failure that happened before the first invocation.
    pub fn send_init_error(&self, error: &ErrorDocument) -> Result<()> {
        let url = format!("{}/init/error", self.base);
        self.post_error(&url, error).context("posting init error")
    }

    fn post_error(&self, url: &str, error: &ErrorDocument) -> Result<()> {
        let body = serde_json::to_string(error).context("serializing error document")?;
        self.agent
            .post(url)
            .set("Content-Type", "application/json")
            .set(ERROR_TYPE_HEADER, &error.error_type)
            .send_string(&body)?;
        Ok(())
    }
}

/// Report a configuration failure to `/init/error` before exiting.
///
/// Returns whether the report was delivered. A failed report is logged and
/// never replaces `err`.
pub fn report_init_failure(api: &str, err: &anyhow::Error) -> bool {
    let doc = ErrorDocument {
        error_message: format!("{err:#}"),
        error_type: "Runtime.ConfigError".to_string(),
    };
    match RuntimeClient::new(api).send_init_error(&doc) {
        Ok(()) => true,
        Err(report) => {
            tracing::warn!(error = %format!("{report:#}"), "could not report init error");
            false
        }
    }
}

/// Fetch one invocation, run `handler` on it, and report the outcome.
///
/// Handler failures are reported to the runtime API and are not errors of
/// this function; only transport failures are.
pub fn serve_one<F>(client: &RuntimeClient, handler: &mut F) -> Result<()>
where
    F: FnMut(&Invocation) -> Result<String, HandlerError>,
{
    let invocation = client.next_invocation()?;
    let span = tracing::info_span!("invocation", request_id = %invocation.request_id);
    let _guard = span.enter();

    match handler(&invocation) {
        Ok(output) => {
            tracing::info!("invocation succeeded");
            client.send_response(&invocation.request_id, &serde_json::Value::String(output))
        }
        Err(e) => {
            tracing::error!(error = %e, error_type = e.error_type(), "invocation failed");
            client.send_error(&invocation.request_id, &ErrorDocument::from(&e))
        }
    }
}

/// Serve invocations until the runtime API becomes unreachable.
pub fn run<F>(client: &RuntimeClient, mut handler: F) -> Result<()>
where
    F: FnMut(&Invocation) -> Result<String, HandlerError>,
{
    loop {
        serve_one(client, &mut handler)?;
    }
}

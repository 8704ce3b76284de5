//! HTTP client for the combat resolution service.

use std::time::Duration;

use serde::Deserialize;

use rosterlab_core::{CombatResolver, ResolutionRequest, ResolutionResponse, ResolveError};

const MULTI_TARGET_PATH: &str = "calculate-multi-target";

/// Error body returned by the service on failure
#[derive(Debug, Deserialize)]
struct ServiceError {
    detail: String,
}

/// Posts batched requests to `{base_url}/calculate-multi-target`.
pub struct HttpResolver {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpResolver {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("rosterlab/", env!("CARGO_PKG_VERSION")))
            .build();

        Self {
            agent,
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), MULTI_TARGET_PATH)
    }
}

impl CombatResolver for HttpResolver {
    fn resolve(&self, request: &ResolutionRequest) -> Result<ResolutionResponse, ResolveError> {
        if request.is_empty() {
            return Err(ResolveError::InvalidRequest(
                "roster and target list must both be non-empty".to_string(),
            ));
        }

        let url = self.endpoint();
        tracing::debug!(url = %url, weapons = request.weapons.len(), targets = request.targets.len(), "POST");

        // The service reads the flags from the query string
        let result = self
            .agent
            .post(&url)
            .query("assume_cover", bool_param(request.assume_cover))
            .query("assume_half_range", bool_param(request.assume_half_range))
            .send_json(request);

        match result {
            Ok(response) => response
                .into_json::<ResolutionResponse>()
                .map_err(|e| ResolveError::Decode(e.to_string())),
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(ResolveError::Status {
                    code,
                    message: error_message(&body),
                })
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(ResolveError::Transport(transport.to_string()))
            }
        }
    }
}

fn bool_param(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// The service's `detail` field when present, otherwise the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ServiceError>(body)
        .map(|e| e.detail)
        .unwrap_or_else(|_| body.trim().to_string())
}

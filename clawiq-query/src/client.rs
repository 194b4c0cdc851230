use async_trait::async_trait;
use clawiq_core::ClientConfig;
use clawiq_protocol::telemetry::{
    ErrorSummary, ErrorsQuery, ErrorsResponse, EventsQuery, EventsResponse,
    SemanticEventsResponse, SemanticQuery, TracesQuery, TracesResponse,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::backend::TelemetryBackend;

const TRACES_PATH: &str = "v1/traces";
const ERRORS_PATH: &str = "v1/errors";
const EVENTS_PATH: &str = "v1/events";
const SEMANTIC_EVENTS_PATH: &str = "v1/semantic-events";

/// Typed HTTP client for the ClawIQ telemetry API.
#[derive(Clone)]
pub struct TelemetryClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl TelemetryClient {
    /// Creates a new client bound to the provided base URL.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ClientError> {
        let mut url = Url::parse(base_url).map_err(|err| ClientError::InvalidUrl {
            url: base_url.to_string(),
            source: err,
        })?;

        if !url.path().ends_with('/') {
            let mut path = url.path().trim_end_matches('/').to_string();
            path.push('/');
            url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("clawiq/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ClientError::Http(err.to_string()))?;

        Ok(Self {
            http,
            base_url: url,
            api_key: api_key.into(),
        })
    }

    /// Builds a client from loaded configuration and an already resolved key.
    pub fn from_config(
        config: &ClientConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Self::new(config.endpoint.as_str(), api_key)
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        parameters: &[(&'static str, String)],
    ) -> Result<T, ClientError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| ClientError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                source: err,
            })?;

        debug!(%url, parameters = parameters.len(), "querying telemetry API");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(parameters)
            .send()
            .await
            .map_err(|err| ClientError::Http(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ClientError::Http(err.to_string()))?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        parse_response(&body)
    }
}

#[async_trait]
impl TelemetryBackend for TelemetryClient {
    async fn get_traces(&self, query: &TracesQuery) -> Result<TracesResponse, ClientError> {
        self.get(TRACES_PATH, &query.to_query_parameters()).await
    }

    async fn get_errors(&self, query: &ErrorsQuery) -> Result<ErrorsResponse, ClientError> {
        let raw: ErrorsResponse = self.get(ERRORS_PATH, &query.to_query_parameters()).await?;

        // the endpoint ignores these filters, so apply them to the rows it sent
        let page: Vec<_> = raw
            .errors
            .into_iter()
            .filter(|error| matches_opt(&query.channel, &error.channel))
            .filter(|error| matches_opt(&query.error_type, &error.error_type))
            .filter(|error| matches_opt(&query.trace_id, &error.trace_id))
            .skip(query.offset)
            .take(query.effective_limit())
            .collect();

        let summary = ErrorSummary::of(&page);
        Ok(ErrorsResponse {
            errors: page,
            summary,
        })
    }

    async fn get_events(&self, query: &EventsQuery) -> Result<EventsResponse, ClientError> {
        self.get(EVENTS_PATH, &query.to_query_parameters()).await
    }

    async fn get_semantic_events(
        &self,
        query: &SemanticQuery,
    ) -> Result<SemanticEventsResponse, ClientError> {
        self.get(SEMANTIC_EVENTS_PATH, &query.to_query_parameters())
            .await
    }
}

fn matches_opt(expected: &Option<String>, actual: &str) -> bool {
    match expected.as_deref() {
        Some(expected) if !expected.is_empty() => expected == actual,
        _ => true,
    }
}

/// Picks the most useful message out of a failed response body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["error", "message"].iter().find_map(|key| {
                json.get(key)
                    .and_then(Value::as_str)
                    .filter(|message| !message.is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| body.to_string())
}

/// Decodes a successful body, unwrapping the `{success, error, data}`
/// envelope when the service uses it.
fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    let mut json: Value =
        serde_json::from_str(body).map_err(|err| ClientError::Decode(err.to_string()))?;

    let success = json.get("success").and_then(Value::as_bool);
    let payload = match success {
        Some(false) => {
            let message = json
                .get("error")
                .and_then(Value::as_str)
                .filter(|message| !message.is_empty())
                .unwrap_or("Unknown error");
            return Err(ClientError::Rejected(message.to_string()));
        }
        Some(true) => json.get_mut("data").map(Value::take).unwrap_or(Value::Null),
        None => json,
    };

    serde_json::from_value(payload).map_err(|err| ClientError::Decode(err.to_string()))
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid telemetry API url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("telemetry HTTP request failed: {0}")]
    Http(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("{0}")]
    Rejected(String),
    #[error("failed to decode telemetry response: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = TelemetryClient::new("https://api.clawiq.md/tenant", "key").unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.clawiq.md/tenant/");
        assert_eq!(
            client.base_url().join(TRACES_PATH).unwrap().as_str(),
            "https://api.clawiq.md/tenant/v1/traces"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(matches!(
            TelemetryClient::new("::nope", "key"),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(error_message(r#"{"error":"bad key"}"#), "bad key");
        assert_eq!(error_message(r#"{"message":"slow down"}"#), "slow down");
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn unwraps_success_envelope() {
        let total: Value = parse_response(r#"{"success":true,"data":{"total":3}}"#).unwrap();
        assert_eq!(total["total"], 3);

        let bare: Value = parse_response(r#"{"total":4}"#).unwrap();
        assert_eq!(bare["total"], 4);

        let err = parse_response::<Value>(r#"{"success":false}"#).unwrap_err();
        assert_eq!(err.to_string(), "Unknown error");
    }
}

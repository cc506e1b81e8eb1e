//! The HTTP client a transport delegates to.
//!
//! # Design
//! `HttpClient` is the seam between the transport and the network. It takes
//! an `HttpRequest`, performs one blocking round-trip and returns the
//! `HttpResponse` as data. Non-2xx statuses are not errors at this level;
//! only failures that prevent a response (connect, DNS, timeout, bad URI)
//! are. `UreqClient` is the production implementation.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::Options;

/// Performs one synchronous HTTP exchange.
pub trait HttpClient {
    type Error: std::error::Error + Send + Sync + 'static;

    fn execute(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, Self::Error>;

    /// Numeric code kept when `error` is wrapped into a `TransportError`.
    fn error_code(&self, _error: &Self::Error) -> i32 {
        0
    }
}

/// Native client settings, read from the options a transport is built with.
///
/// Unknown keys are ignored so the same options map can carry headers and
/// auth alongside these.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClientOptions {
    /// Whole-request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<f64>,
    /// Connect timeout in seconds.
    #[serde(default)]
    pub connect_timeout: Option<f64>,
}

impl ClientOptions {
    pub fn from_options(options: &Options) -> Result<Self> {
        serde_json::from_value(options.clone().into_value()).map_err(|e| TransportError::wrap(e, 0))
    }
}

fn seconds(value: Option<f64>) -> Result<Option<Duration>> {
    value
        .map(|secs| Duration::try_from_secs_f64(secs).map_err(|e| TransportError::wrap(e, 0)))
        .transpose()
}

/// Blocking client backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqClient {
    agent: ureq::Agent,
    options: ClientOptions,
}

impl UreqClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(seconds(options.timeout)?)
            .timeout_connect(seconds(options.connect_timeout)?)
            .build()
            .new_agent();
        Ok(Self { agent, options })
    }

    /// Build from a raw options map; only the client settings are read.
    pub fn from_options(options: &Options) -> Result<Self> {
        Self::new(ClientOptions::from_options(options)?)
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }
}

impl fmt::Debug for UreqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqClient")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl HttpClient for UreqClient {
    type Error = ureq::Error;

    fn execute(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, ureq::Error> {
        let mut builder = match request.method {
            HttpMethod::Get => self.agent.get(request.uri.as_str()),
            HttpMethod::Head => self.agent.head(request.uri.as_str()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.call()?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        // Unlimited and lossy: a completed exchange never fails on its body.
        let body = match request.method {
            HttpMethod::Head => String::new(),
            HttpMethod::Get => {
                let bytes = response.body_mut().with_config().limit(u64::MAX).read_to_vec()?;
                String::from_utf8_lossy(&bytes).into_owned()
            }
        };
        debug!(status = status.as_u16(), bytes = body.len(), "response received");

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }

    fn error_code(&self, error: &ureq::Error) -> i32 {
        match error {
            ureq::Error::StatusCode(status) => i32::from(*status),
            ureq::Error::Io(io) => io.raw_os_error().unwrap_or(0),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn client_options_ignore_unrelated_keys() {
        let options = Options::from_value(json!({
            "timeout": 2.5,
            "headers": {"X-Api-Key": "abc"},
            "read": {"headers": {"Accept": "application/json"}}
        }))
        .unwrap();
        let parsed = ClientOptions::from_options(&options).unwrap();
        assert_eq!(parsed.timeout, Some(2.5));
        assert_eq!(parsed.connect_timeout, None);
    }

    #[test]
    fn mistyped_timeout_is_rejected() {
        let options = Options::from_value(json!({"timeout": "soon"})).unwrap();
        assert!(UreqClient::from_options(&options).is_err());
    }

    #[test]
    fn negative_timeout_is_rejected() {
        let options = Options::from_value(json!({"connect_timeout": -1.0})).unwrap();
        assert!(UreqClient::from_options(&options).is_err());
    }

    #[test]
    fn empty_options_build_a_client() {
        let client = UreqClient::from_options(&Options::new()).unwrap();
        assert_eq!(client.options(), &ClientOptions::default());
    }

    #[test]
    fn io_errors_keep_their_os_code() {
        let client = UreqClient::from_options(&Options::new()).unwrap();
        let io = std::io::Error::from_raw_os_error(111);
        assert_eq!(client.error_code(&ureq::Error::Io(io)), 111);
        assert_eq!(client.error_code(&ureq::Error::StatusCode(503)), 503);
    }
}

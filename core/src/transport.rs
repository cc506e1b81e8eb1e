//! The HTTP transport adapter.
//!
//! # Design
//! A `Transport` binds one `Endpoint` to one `HttpClient`. At construction it
//! merges three option sources (per-action `Accept` headers, endpoint auth,
//! endpoint native options) into the set it reads on every request. The raw
//! options a caller passes to `Transport::new` configure the client itself
//! (timeouts) and are not merged.
//!
//! Requests are blocking and there is no retry: a failed round-trip surfaces
//! once as a `TransportError`. A completed round-trip is classified against
//! the OK set into `Outcome::Ok` or `Outcome::Error`, with the concrete
//! response type looked up by the class identifier the endpoint names.

use serde_json::json;
use tracing::{info, trace, warn};
use url::Url;

use crate::client::{HttpClient, UreqClient};
use crate::codes::TransportConfig;
use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::{Action, Options};
use crate::response::{Outcome, ResponseMeta, ResponseRegistry};

/// Result of `Transport::ping`: the classified response plus its raw status.
#[derive(Debug)]
pub struct Ping {
    pub status: u16,
    pub outcome: Outcome,
}

pub struct Transport<E: Endpoint, C: HttpClient = UreqClient> {
    endpoint: E,
    client: C,
    options: Options,
    config: TransportConfig,
    registry: ResponseRegistry,
}

impl<E: Endpoint> Transport<E, UreqClient> {
    /// Build a transport with a `ureq` client configured from `options`.
    pub fn new(endpoint: E, options: Options) -> Result<Self> {
        let client = UreqClient::from_options(&options)?;
        Ok(Self::with_client(endpoint, client))
    }
}

impl<E: Endpoint, C: HttpClient> Transport<E, C> {
    pub fn with_client(endpoint: E, client: C) -> Self {
        let options = Options::merge_all([
            action_headers(&endpoint),
            endpoint.auth().unwrap_or_default(),
            endpoint.native_options(),
        ]);

        Self {
            endpoint,
            client,
            options,
            config: TransportConfig::default(),
            registry: ResponseRegistry::default(),
        }
    }

    pub fn with_config(mut self, config: TransportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_registry(mut self, registry: ResponseRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// The merged headers, auth and native options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn is_ok(&self, code: u16) -> bool {
        self.config.is_ok(code)
    }

    pub fn is_error(&self, code: u16) -> bool {
        self.config.is_error(code)
    }

    /// Full URI for `path`: endpoint query parameters first, then `query`.
    pub fn uri(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let endpoint_query = self.endpoint.query_params();
        let pairs = endpoint_query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(query.iter().copied());
        self.build_uri(path, pairs)
    }

    /// GET `path` and classify the response.
    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Outcome> {
        let request = HttpRequest {
            method: HttpMethod::Get,
            uri: self.uri(path, query)?,
            headers: self.options.headers_for(Action::Read),
        };
        let response = self.send(&request)?;
        self.make_response(response)
    }

    /// HEAD `uri` to check that it exists without fetching the body.
    pub fn ping(&self, uri: &str) -> Result<Ping> {
        let request = HttpRequest {
            method: HttpMethod::Head,
            uri: self.build_uri(uri, std::iter::empty())?,
            headers: self.options.headers_for(Action::Exists),
        };
        let response = self.send(&request)?;
        let status = response.status;
        let outcome = self.make_response(response)?;
        Ok(Ping { status, outcome })
    }

    /// Classify `response` using this transport's endpoint, OK set and registry.
    pub fn make_response(&self, response: HttpResponse) -> Result<Outcome> {
        make_response(&self.endpoint, &self.config, &self.registry, response)
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        info!(method = request.method.as_str(), uri = %request.uri, "sync");

        let response = self.client.execute(request).map_err(|e| {
            let code = self.client.error_code(&e);
            warn!(method = request.method.as_str(), uri = %request.uri, code, error = %e, "request failed");
            TransportError::wrap(e, code)
        })?;

        trace!(status = response.status, body = %response.body, "response body");
        Ok(response)
    }

    fn build_uri<'a>(
        &self,
        path: &str,
        query: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<String> {
        let joined = if Url::parse(path).is_ok() {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                self.endpoint.base_uri().trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };

        let mut url = Url::parse(&joined).map_err(|e| TransportError::wrap(e, 0))?;
        let mut query = query.into_iter().peekable();
        if query.peek().is_some() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url.into())
    }
}

/// `Accept` headers for the read and exists actions.
fn action_headers(endpoint: &impl Endpoint) -> Options {
    let accept = json!({ "headers": { "Accept": endpoint.accept_type() } });
    let mut options = Options::new();
    options.insert(Action::Read.key(), accept.clone());
    options.insert(Action::Exists.key(), accept);
    options
}

/// Classify a raw response into the endpoint's success or error type.
///
/// Only OK-set membership of the status decides the variant; the body is
/// never inspected.
pub fn make_response(
    endpoint: &dyn Endpoint,
    config: &TransportConfig,
    registry: &ResponseRegistry,
    response: HttpResponse,
) -> Result<Outcome> {
    let ok = config.is_ok(response.status);
    let content_type = response.content_type();

    let (class, meta) = if ok {
        let meta = ResponseMeta {
            result_code: response.status,
            result_message: None,
            content_type,
        };
        (endpoint.response_class(), meta)
    } else {
        let meta = ResponseMeta {
            result_code: response.status,
            result_message: Some(response.reason_phrase()),
            content_type,
        };
        (endpoint.error_class(), meta)
    };

    let created = registry
        .create(class, endpoint, response.body, meta)
        .ok_or_else(|| {
            TransportError::new(format!("no response type registered for class {class:?}"), 0)
        })?;

    Ok(if ok {
        Outcome::Ok(created)
    } else {
        Outcome::Error(created)
    })
}

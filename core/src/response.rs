//! Response objects and the registry that constructs them.
//!
//! # Design
//! The transport never names a concrete response type. It asks the endpoint
//! for a class identifier and looks that identifier up in a
//! `ResponseRegistry`, so the surrounding framework can swap in its own
//! response types per endpoint. Body parsing is left to the response.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;

/// Registry identifier of the built-in success response.
pub const DEFAULT_RESPONSE_CLASS: &str = "response";

/// Registry identifier of the built-in error response.
pub const DEFAULT_ERROR_CLASS: &str = "error";

/// Metadata attached to every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseMeta {
    pub result_code: u16,
    /// Reason phrase, only set for error responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_message: Option<String>,
    pub content_type: String,
}

/// A response produced by a transport.
pub trait Response: fmt::Debug + Send + Sync {
    fn body(&self) -> &str;
    fn meta(&self) -> &ResponseMeta;
    fn as_any(&self) -> &dyn Any;
}

impl<'a> dyn Response + 'a {
    pub fn result_code(&self) -> u16 {
        self.meta().result_code
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(self.body())
    }

    pub fn downcast_ref<T: Response + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Built-in success response: the raw body and its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub endpoint: String,
    pub body: String,
    pub meta: ResponseMeta,
}

impl Response for RawResponse {
    fn body(&self) -> &str {
        &self.body
    }

    fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Built-in error response for a completed exchange with a non-OK status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub endpoint: String,
    pub body: String,
    pub meta: ResponseMeta,
}

impl ErrorResponse {
    pub fn message(&self) -> &str {
        self.meta.result_message.as_deref().unwrap_or_default()
    }
}

impl Response for ErrorResponse {
    fn body(&self) -> &str {
        &self.body
    }

    fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Builds a response from the endpoint, raw body and metadata.
pub type ResponseConstructor =
    Box<dyn Fn(&dyn Endpoint, String, ResponseMeta) -> Box<dyn Response> + Send + Sync>;

/// Maps class identifiers to response constructors.
pub struct ResponseRegistry {
    constructors: HashMap<String, ResponseConstructor>,
}

impl ResponseRegistry {
    /// A registry with no constructors at all.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Add or replace the constructor for `class`.
    pub fn register<F>(&mut self, class: &str, constructor: F) -> &mut Self
    where
        F: Fn(&dyn Endpoint, String, ResponseMeta) -> Box<dyn Response> + Send + Sync + 'static,
    {
        self.constructors.insert(class.to_string(), Box::new(constructor));
        self
    }

    pub fn contains(&self, class: &str) -> bool {
        self.constructors.contains_key(class)
    }

    /// Construct a `class` response, or `None` if nothing is registered.
    pub fn create(
        &self,
        class: &str,
        endpoint: &dyn Endpoint,
        body: String,
        meta: ResponseMeta,
    ) -> Option<Box<dyn Response>> {
        self.constructors
            .get(class)
            .map(|constructor| constructor(endpoint, body, meta))
    }
}

impl Default for ResponseRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(DEFAULT_RESPONSE_CLASS, |endpoint, body, meta| {
                Box::new(RawResponse {
                    endpoint: endpoint.base_uri().to_string(),
                    body,
                    meta,
                })
            })
            .register(DEFAULT_ERROR_CLASS, |endpoint, body, meta| {
                Box::new(ErrorResponse {
                    endpoint: endpoint.base_uri().to_string(),
                    body,
                    meta,
                })
            });
        registry
    }
}

impl fmt::Debug for ResponseRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        classes.sort_unstable();
        f.debug_struct("ResponseRegistry")
            .field("classes", &classes)
            .finish()
    }
}

/// The classified result of one HTTP exchange.
#[derive(Debug)]
pub enum Outcome {
    /// Status was in the OK set.
    Ok(Box<dyn Response>),
    /// Status was outside the OK set.
    Error(Box<dyn Response>),
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn is_error(&self) -> bool {
        !self.is_ok()
    }

    pub fn response(&self) -> &dyn Response {
        match self {
            Outcome::Ok(response) | Outcome::Error(response) => &**response,
        }
    }

    pub fn into_response(self) -> Box<dyn Response> {
        match self {
            Outcome::Ok(response) | Outcome::Error(response) => response,
        }
    }

    pub fn result_code(&self) -> u16 {
        self.response().result_code()
    }
}

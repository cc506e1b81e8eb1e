//! HTTP transport adapter for Quaff endpoints.
//!
//! # Overview
//! A `Transport` turns calls against an `Endpoint` (a descriptor of a remote
//! resource) into blocking HTTP requests and turns the replies back into
//! typed response objects for the synchronization engine.
//!
//! # Design
//! - Requests and responses cross the client seam as plain data
//!   (`HttpRequest` / `HttpResponse`), so classification is testable without
//!   a network and `UreqClient` can be replaced by any `HttpClient`.
//! - A reply is an `Outcome::Ok` when its status is in the transport's OK set
//!   and an `Outcome::Error` otherwise. Failing to get a reply at all is a
//!   `TransportError`.
//! - Response types are looked up in a `ResponseRegistry` by the class
//!   identifier the endpoint names, never hardcoded.
//! - Options from several sources are deep-merged with array concatenation
//!   (`Options::merge`).

pub mod client;
pub mod codes;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod options;
pub mod response;
pub mod transport;

pub use client::{ClientOptions, HttpClient, UreqClient};
pub use codes::{CodeSet, TransportConfig};
pub use endpoint::{Auth, Endpoint, EndpointConfig};
pub use error::{Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::{Action, Options};
pub use response::{ErrorResponse, Outcome, RawResponse, Response, ResponseMeta, ResponseRegistry};
pub use transport::{make_response, Ping, Transport};

//! HTTP exchange types as plain data.
//!
//! # Design
//! The transport builds an `HttpRequest`, hands it to an `HttpClient`, and
//! classifies the `HttpResponse` it gets back. Keeping both sides as owned
//! data means classification can be tested without a network and clients can
//! be swapped without touching the transport.

use ureq::http::StatusCode;

/// HTTP method for a request. The transport only reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub uri: String,
    pub headers: Vec<(String, String)>,
}

/// An HTTP response described as plain data.
///
/// `headers` keeps repeated header lines as separate entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// All values of header `name`, compared case-insensitively.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// The `Content-Type` values joined with `", "`, or empty when absent.
    pub fn content_type(&self) -> String {
        self.header_values("content-type").join(", ")
    }

    /// Reason phrase from the wire, or the canonical one for `status`.
    pub fn reason_phrase(&self) -> String {
        if !self.reason.is_empty() {
            return self.reason.clone();
        }
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or_default()
            .to_string()
    }
}

//! Inbound webhook verification.
//!
//! The verifier works against the neutral [`WebhookRequest`] and
//! [`WebhookResponse`] traits. Mapping a concrete web framework onto them is
//! left to the embedding application.

mod signature;
mod verifier;

pub use signature::{reference_signature, signatures_match};
pub use verifier::{Verifier, VerifyOutcome};

use std::collections::HashMap;

/// Request shape the verifier consumes.
pub trait WebhookRequest {
    /// HTTP method, e.g. `"GET"`.
    fn method(&self) -> &str;

    /// Decoded query parameter value.
    fn query(&self, name: &str) -> Option<&str>;

    /// Raw request body, if any.
    fn body(&self) -> Option<&[u8]>;
}

/// Response shape the verifier writes to.
pub trait WebhookResponse {
    /// Set a response header.
    fn set(&mut self, header: &str, value: &str);

    /// Send `data` as the response body.
    fn send(&mut self, data: &str);

    /// Finish the response, optionally with a final body.
    fn end(&mut self, data: Option<&str>);
}

/// Owned request built from already decoded parts.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    pub method: String,
    pub query: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl InboundRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl WebhookRequest for InboundRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// Response that records everything written to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferedResponse {
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub finished: bool,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value set for `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// True when nothing has been written.
    pub fn is_untouched(&self) -> bool {
        self == &Self::default()
    }
}

impl WebhookResponse for BufferedResponse {
    fn set(&mut self, header: &str, value: &str) {
        self.headers.push((header.to_string(), value.to_string()));
    }

    fn send(&mut self, data: &str) {
        self.body = Some(data.to_string());
        self.finished = true;
    }

    fn end(&mut self, data: Option<&str>) {
        if let Some(data) = data {
            self.body = Some(data.to_string());
        }
        self.finished = true;
    }
}

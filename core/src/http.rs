//! Request description types and the HTTP client seam.
//!
//! # Design
//! Binding operations first describe a request as plain data (`HttpRequest`)
//! and only then hand it to an injected `HttpClient`. Building is
//! deterministic and testable without I/O; sending is whatever the client
//! does. The binding layer never looks at what comes back.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::context::{RequestContext, RequestOptions};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar payload value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
}

impl fmt::Display for PayloadValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadValue::Text(s) => f.write_str(s),
            PayloadValue::Integer(n) => write!(f, "{n}"),
            PayloadValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        PayloadValue::Text(value)
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        PayloadValue::Text(value.to_string())
    }
}

impl From<&String> for PayloadValue {
    fn from(value: &String) -> Self {
        PayloadValue::Text(value.clone())
    }
}

impl From<bool> for PayloadValue {
    fn from(value: bool) -> Self {
        PayloadValue::Boolean(value)
    }
}

impl From<u32> for PayloadValue {
    fn from(value: u32) -> Self {
        PayloadValue::Integer(i64::from(value))
    }
}

/// Wire-level fields of a request, in insertion order.
///
/// Keys are the names the remote API expects, including bracketed
/// sub-resource keys like `course_navigation[enabled]`. Unset arguments are
/// never inserted, so an absent key means "let the server decide".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    fields: Vec<(String, PayloadValue)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PayloadValue>) {
        self.fields.push((key.into(), value.into()));
    }

    /// Insert only when `value` is set.
    pub fn insert_opt<V: Into<PayloadValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PayloadValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Key/value pairs with values rendered as strings, ready for a query
    /// string or form body.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub payload: Option<Payload>,
    pub options: RequestOptions,
}

/// A response as returned by `UreqClient`.
///
/// Other `HttpClient` implementations are free to use their own type.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The transport collaborator that actually talks to the network.
///
/// Implementations own auth, timeouts, retries and error semantics. The
/// binding layer calls exactly one method per operation and returns the
/// result without inspecting it.
pub trait HttpClient {
    type Response;
    type Error: std::error::Error;

    fn get(
        &self,
        ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<Self::Response, Self::Error>;

    fn post(
        &self,
        ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<Self::Response, Self::Error>;

    fn put(
        &self,
        ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<Self::Response, Self::Error>;

    fn delete(
        &self,
        ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<Self::Response, Self::Error>;

    /// Dispatch a built request to the method-specific call.
    fn execute(
        &self,
        ctx: &RequestContext,
        request: &HttpRequest,
    ) -> Result<Self::Response, Self::Error> {
        let payload = request.payload.as_ref();
        match request.method {
            HttpMethod::Get => self.get(ctx, &request.url, payload, &request.options),
            HttpMethod::Post => self.post(ctx, &request.url, payload, &request.options),
            HttpMethod::Put => self.put(ctx, &request.url, payload, &request.options),
            HttpMethod::Delete => self.delete(ctx, &request.url, payload, &request.options),
        }
    }
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    type Response = C::Response;
    type Error = C::Error;

    fn get(
        &self,
        ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<Self::Response, Self::Error> {
        (**self).get(ctx, url, payload, options)
    }

    fn post(
        &self,
        ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<Self::Response, Self::Error> {
        (**self).post(ctx, url, payload, options)
    }

    fn put(
        &self,
        ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<Self::Response, Self::Error> {
        (**self).put(ctx, url, payload, options)
    }

    fn delete(
        &self,
        ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<Self::Response, Self::Error> {
        (**self).delete(ctx, url, payload, options)
    }
}

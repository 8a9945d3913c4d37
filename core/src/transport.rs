//! Blocking `HttpClient` implementation on top of ureq.
//!
//! Non-2xx statuses are returned as `HttpResponse` data rather than errors,
//! so the caller decides what a 404 means. Failures that happen before the
//! request leaves the machine are retried for every method; timeouts and
//! broken connections only for GET and DELETE, since a POST or PUT may
//! already have been applied by the server.

use std::time::Duration;

use tracing::{debug, warn};
use ureq::http::{HeaderMap, Response};
use ureq::{Agent, Body, RequestBuilder};

use crate::context::{RequestContext, RequestOptions};
use crate::http::{HttpClient, HttpMethod, HttpResponse, Payload};

#[derive(Debug, Clone)]
pub struct UreqClient {
    agent: Agent,
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqClient {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a caller-configured agent. It should have
    /// `http_status_as_error(false)` set, or error statuses surface as
    /// `ureq::Error::StatusCode`.
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }

    fn prepare<B>(
        &self,
        ctx: &RequestContext,
        mut req: RequestBuilder<B>,
        options: &RequestOptions,
    ) -> RequestBuilder<B> {
        if let Some(token) = &ctx.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        for (name, value) in &options.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = options.timeout {
            req = req.config().timeout_global(Some(timeout)).build();
        }
        req
    }

    fn send_once(
        &self,
        ctx: &RequestContext,
        method: HttpMethod,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<Response<Body>, ureq::Error> {
        let pairs = payload.map(Payload::to_pairs).unwrap_or_default();
        match method {
            HttpMethod::Get | HttpMethod::Delete => {
                let req = match method {
                    HttpMethod::Delete => self.agent.delete(url),
                    _ => self.agent.get(url),
                };
                let mut req = self.prepare(ctx, req, options);
                for (key, value) in &pairs {
                    req = req.query(key, value);
                }
                req.call()
            }
            HttpMethod::Post | HttpMethod::Put => {
                let req = match method {
                    HttpMethod::Put => self.agent.put(url),
                    _ => self.agent.post(url),
                };
                let req = self.prepare(ctx, req, options);
                if pairs.is_empty() {
                    req.send_empty()
                } else {
                    req.send_form(pairs)
                }
            }
        }
    }

    fn send(
        &self,
        ctx: &RequestContext,
        method: HttpMethod,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<HttpResponse, ureq::Error> {
        let max_retries = options.max_retries.unwrap_or(ctx.max_retries);
        let mut attempt = 0;
        loop {
            debug!(%method, url, attempt, "sending request");
            match self.send_once(ctx, method, url, payload, options) {
                Ok(response) => return into_response(response),
                Err(err) if attempt < max_retries && is_retryable(method, &err) => {
                    attempt += 1;
                    warn!(%method, url, attempt, error = %err, "transport failure, retrying");
                    std::thread::sleep(backoff(attempt));
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Nothing reached the server.
fn is_unsent(err: &ureq::Error) -> bool {
    match err {
        ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => true,
        ureq::Error::Io(io) => io.kind() == std::io::ErrorKind::ConnectionRefused,
        _ => false,
    }
}

fn is_retryable(method: HttpMethod, err: &ureq::Error) -> bool {
    if is_unsent(err) {
        return true;
    }
    let idempotent = matches!(method, HttpMethod::Get | HttpMethod::Delete);
    idempotent && matches!(err, ureq::Error::Io(_) | ureq::Error::Timeout(_))
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(100 * u64::from(attempt))
}

fn into_response(mut response: Response<Body>) -> Result<HttpResponse, ureq::Error> {
    let status = response.status().as_u16();
    let headers = header_pairs(response.headers());
    let body = response.body_mut().read_to_string()?;
    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

impl HttpClient for UreqClient {
    type Response = HttpResponse;
    type Error = ureq::Error;

    fn get(
        &self,
        ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<HttpResponse, ureq::Error> {
        self.send(ctx, HttpMethod::Get, url, payload, options)
    }

    fn post(
        &self,
        ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<HttpResponse, ureq::Error> {
        self.send(ctx, HttpMethod::Post, url, payload, options)
    }

    fn put(
        &self,
        ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<HttpResponse, ureq::Error> {
        self.send(ctx, HttpMethod::Put, url, payload, options)
    }

    fn delete(
        &self,
        ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<HttpResponse, ureq::Error> {
        self.send(ctx, HttpMethod::Delete, url, payload, options)
    }
}

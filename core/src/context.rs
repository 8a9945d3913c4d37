//! Caller-held configuration threaded through every binding call.
//!
//! # Design
//! `RequestContext` is read-only from the binding layer's point of view.
//! Binding operations borrow it, read `base_api_url` and `per_page`, and
//! hand it on to the HTTP client, which is the only party that cares about
//! the auth token and retry budget.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_PER_PAGE: u32 = 100;

pub const ENV_API_URL: &str = "CANVAS_API_URL";
pub const ENV_PER_PAGE: &str = "CANVAS_PER_PAGE";
pub const ENV_AUTH_TOKEN: &str = "CANVAS_AUTH_TOKEN";
pub const ENV_MAX_RETRIES: &str = "CANVAS_MAX_RETRIES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// API root, e.g. `https://lms.example.edu/api`. Stored without a
    /// trailing slash.
    pub base_api_url: String,
    /// Page size used by listing operations when the caller sets none.
    pub per_page: u32,
    pub auth_token: Option<String>,
    /// Connection-level retries the transport may attempt.
    pub max_retries: u32,
}

impl RequestContext {
    pub fn new(base_api_url: &str) -> Self {
        Self {
            base_api_url: base_api_url.trim_end_matches('/').to_string(),
            per_page: DEFAULT_PER_PAGE,
            auth_token: None,
            max_retries: 0,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Load from `CANVAS_API_URL`, `CANVAS_PER_PAGE`, `CANVAS_AUTH_TOKEN`
    /// and `CANVAS_MAX_RETRIES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base = lookup(ENV_API_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_API_URL))?;
        let mut ctx = Self::new(base.trim());

        if let Some(raw) = lookup(ENV_PER_PAGE) {
            ctx.per_page = parse_number(ENV_PER_PAGE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            ctx.max_retries = parse_number(ENV_MAX_RETRIES, &raw)?;
        }
        ctx.auth_token = lookup(ENV_AUTH_TOKEN).filter(|t| !t.is_empty());
        Ok(ctx)
    }
}

fn parse_number(name: &'static str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}

/// Per-call transport overrides, passed through to the HTTP client as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    /// Overrides `RequestContext::max_retries` for this call.
    pub max_retries: Option<u32>,
}

impl RequestOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

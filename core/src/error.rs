//! Error types for the external tools binding.
//!
//! # Design
//! Only two things can go wrong in a binding call. Either an argument falls
//! outside its allowed set, which is caught locally before any request
//! exists, or the injected HTTP client fails. The client's error is carried
//! as-is in `ApiError::Transport` so callers match on their own transport
//! type instead of a flattened string.

use thiserror::Error;

/// An argument value outside the set the remote API accepts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value {value:?} for `{name}`, expected one of {allowed:?}")]
pub struct InvalidArgument {
    pub name: &'static str,
    pub value: String,
    pub allowed: &'static [&'static str],
}

/// Errors returned by the binding operations in `ExternalTools`.
///
/// `E` is the error type of the injected `HttpClient`.
#[derive(Debug, Error)]
pub enum ApiError<E> {
    /// Raised before any network call is attempted.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    /// Whatever the HTTP client returned, untouched.
    #[error("transport error: {0}")]
    Transport(#[source] E),
}

impl<E> ApiError<E> {
    /// Returns the invalid-argument details, if this is a validation failure.
    pub fn invalid_argument(&self) -> Option<&InvalidArgument> {
        match self {
            ApiError::InvalidArgument(err) => Some(err),
            ApiError::Transport(_) => None,
        }
    }
}

/// Errors raised while loading a `RequestContext` from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    Missing(&'static str),

    #[error("environment variable `{name}` has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

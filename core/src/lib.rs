//! Client binding for the external tools (LTI) endpoints of a
//! learning-management REST API.
//!
//! # Overview
//! Each operation formats a URL from a `Scope` and identifiers, assembles
//! a payload from typed arguments (dropping anything unset), and forwards
//! the request to an injected `HttpClient`. The client's response comes
//! back unmodified; this crate does not parse bodies or statuses.
//!
//! # Design
//! - `RequestContext` carries the base URL, default page size and auth
//!   token. It is borrowed by every call and never mutated.
//! - Each operation has a pure `build_*` function producing an
//!   `HttpRequest`, and a method on `ExternalTools` that sends it.
//! - Account, course and group variants of an endpoint are one operation
//!   parameterized by `Scope`.
//! - Enumerated arguments are enums validated on parse, so an invalid value
//!   fails with `InvalidArgument` before a request exists.
//! - `UreqClient` is a ready-made blocking client; anything implementing
//!   `HttpClient` works in its place.

pub mod context;
pub mod error;
pub mod external_tools;
pub mod http;
pub mod scope;
pub mod transport;
pub mod types;
pub mod validate;

pub use context::{RequestContext, RequestOptions};
pub use error::{ApiError, ConfigError, InvalidArgument};
pub use external_tools::ExternalTools;
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, Payload, PayloadValue};
pub use scope::Scope;
pub use transport::UreqClient;
pub use types::{
    ExternalToolUpdate, LaunchType, ListToolsParams, NavigationVisibility, NewExternalTool,
    Placement, PrivacyLevel, SessionlessLaunchParams, ToolSettings, WindowTarget,
};

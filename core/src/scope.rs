//! The container a resource path is nested under.

use std::fmt;

use crate::error::InvalidArgument;

/// Account, course or group identifier the external tools live in.
///
/// Identifiers are kept as strings so callers can pass numeric ids,
/// `self`, or `sis_course_id:...` style lookups unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Account(String),
    Course(String),
    Group(String),
}

/// Scopes that can own, create and launch tools. Groups can only list.
pub(crate) const TOOL_OWNER_SEGMENTS: &[&str] = &["accounts", "courses"];

impl Scope {
    pub fn account(id: impl Into<String>) -> Self {
        Scope::Account(id.into())
    }

    pub fn course(id: impl Into<String>) -> Self {
        Scope::Course(id.into())
    }

    pub fn group(id: impl Into<String>) -> Self {
        Scope::Group(id.into())
    }

    /// Path segment naming the container type.
    pub fn segment(&self) -> &'static str {
        match self {
            Scope::Account(_) => "accounts",
            Scope::Course(_) => "courses",
            Scope::Group(_) => "groups",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Scope::Account(id) | Scope::Course(id) | Scope::Group(id) => id,
        }
    }

    /// `/v1/{segment}/{id}`
    pub fn path_prefix(&self) -> String {
        format!("/v1/{}/{}", self.segment(), self.id())
    }

    pub(crate) fn require_tool_owner(&self) -> Result<(), InvalidArgument> {
        match self {
            Scope::Account(_) | Scope::Course(_) => Ok(()),
            Scope::Group(_) => Err(InvalidArgument {
                name: "scope",
                value: self.segment().to_string(),
                allowed: TOOL_OWNER_SEGMENTS,
            }),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.segment(), self.id())
    }
}

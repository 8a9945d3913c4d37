//! Typed arguments for the external tools operations.
//!
//! # Design
//! Every optional argument is an `Option`, so "unset" can never be confused
//! with a real value such as `false` or an empty string. Parameters with a
//! fixed set of legal values are enums whose `FromStr` (and serde) impls go
//! through `validate::acceptable`, so a bad string fails with the same
//! `InvalidArgument` whichever way it enters.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::InvalidArgument;
use crate::http::{Payload, PayloadValue};
use crate::validate;

fn parse_one_of<T: Copy>(
    name: &'static str,
    allowed: &'static [&'static str],
    variants: &[T],
    value: &str,
) -> Result<T, InvalidArgument> {
    validate::acceptable(name, Some(value), allowed)?;
    // `allowed` and `variants` are parallel arrays.
    allowed
        .iter()
        .position(|a| *a == value)
        .and_then(|idx| variants.get(idx).copied())
        .ok_or_else(|| InvalidArgument {
            name,
            value: value.to_string(),
            allowed,
        })
}

/// What user information is sent to the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum PrivacyLevel {
    Anonymous,
    NameOnly,
    Public,
}

impl PrivacyLevel {
    pub const PARAM: &'static str = "privacy_level";
    pub const ALLOWED: &'static [&'static str] = &["anonymous", "name_only", "public"];
    const VARIANTS: &'static [Self] = &[Self::Anonymous, Self::NameOnly, Self::Public];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyLevel::Anonymous => "anonymous",
            PrivacyLevel::NameOnly => "name_only",
            PrivacyLevel::Public => "public",
        }
    }
}

/// Who sees a course navigation tab. Unset means everyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum NavigationVisibility {
    Admins,
    Members,
}

impl NavigationVisibility {
    pub const PARAM: &'static str = "course_navigation[visibility]";
    pub const ALLOWED: &'static [&'static str] = &["admins", "members"];
    const VARIANTS: &'static [Self] = &[Self::Admins, Self::Members];

    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationVisibility::Admins => "admins",
            NavigationVisibility::Members => "members",
        }
    }
}

/// How a navigation tab opens: a new window or an iframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum WindowTarget {
    Blank,
    SelfFrame,
}

impl WindowTarget {
    pub const PARAM: &'static str = "course_navigation[windowTarget]";
    pub const ALLOWED: &'static [&'static str] = &["_blank", "_self"];
    const VARIANTS: &'static [Self] = &[Self::Blank, Self::SelfFrame];

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowTarget::Blank => "_blank",
            WindowTarget::SelfFrame => "_self",
        }
    }
}

/// Kind of sessionless launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum LaunchType {
    Assessment,
    ModuleItem,
}

impl LaunchType {
    pub const PARAM: &'static str = "launch_type";
    pub const ALLOWED: &'static [&'static str] = &["assessment", "module_item"];
    const VARIANTS: &'static [Self] = &[Self::Assessment, Self::ModuleItem];

    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchType::Assessment => "assessment",
            LaunchType::ModuleItem => "module_item",
        }
    }
}

macro_rules! enum_conversions {
    ($($ty:ty),* $(,)?) => {$(
        impl FromStr for $ty {
            type Err = InvalidArgument;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_one_of(Self::PARAM, Self::ALLOWED, Self::VARIANTS, s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = InvalidArgument;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )*};
}

enum_conversions!(PrivacyLevel, NavigationVisibility, WindowTarget, LaunchType);

/// Optional filters for listing tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListToolsParams {
    /// Partial tool name to match.
    pub search_term: Option<String>,
    /// Only tools meant to be selectable.
    pub selectable: Option<bool>,
    /// Include tools installed in parent accounts.
    pub include_parents: Option<bool>,
    /// Falls back to `RequestContext::per_page` when unset.
    pub per_page: Option<u32>,
}

/// Arguments for requesting a sessionless launch URL.
///
/// The remote API wants `id` or `url` unless `launch_type` names an
/// assessment or module item launch; that rule is left to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionlessLaunchParams {
    pub id: Option<String>,
    pub url: Option<String>,
    pub assignment_id: Option<String>,
    pub module_item_id: Option<String>,
    pub launch_type: Option<LaunchType>,
}

impl SessionlessLaunchParams {
    pub(crate) fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert_opt("id", self.id.as_ref());
        payload.insert_opt("url", self.url.as_ref());
        payload.insert_opt("assignment_id", self.assignment_id.as_ref());
        payload.insert_opt("module_item_id", self.module_item_id.as_ref());
        payload.insert_opt("launch_type", self.launch_type.map(|t| t.as_str()));
        payload
    }
}

/// Settings for one placement of a tool in the UI.
///
/// Each placement accepts a subset of these fields (see `PLACEMENT_FIELDS`).
/// Only set fields in that subset are sent, keyed as `<placement>[<field>]`;
/// the rest are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub url: Option<String>,
    pub enabled: Option<bool>,
    pub text: Option<String>,
    pub icon_url: Option<String>,
    pub selection_width: Option<u32>,
    pub selection_height: Option<u32>,
    /// `ContentItemSelectionRequest` to use content-item, otherwise unset.
    pub message_type: Option<String>,
    pub visibility: Option<NavigationVisibility>,
    pub window_target: Option<WindowTarget>,
    /// Whether the tab shows by default or must be enabled by a teacher.
    pub default: Option<bool>,
}

impl Placement {
    pub fn enabled() -> Self {
        Self {
            enabled: Some(true),
            ..Self::default()
        }
    }

    fn write_to(&self, placement: &str, fields: &[&str], payload: &mut Payload) {
        let mut put = |field: &str, value: Option<PayloadValue>| {
            if let Some(value) = value.filter(|_| fields.iter().any(|f| *f == field)) {
                payload.insert(format!("{placement}[{field}]"), value);
            }
        };
        put("url", self.url.as_ref().map(Into::into));
        put("enabled", self.enabled.map(Into::into));
        put("text", self.text.as_ref().map(Into::into));
        put("icon_url", self.icon_url.as_ref().map(Into::into));
        put("selection_width", self.selection_width.map(Into::into));
        put("selection_height", self.selection_height.map(Into::into));
        put("message_type", self.message_type.as_ref().map(Into::into));
        put("visibility", self.visibility.map(|v| v.as_str().into()));
        put("windowTarget", self.window_target.map(|w| w.as_str().into()));
        put("default", self.default.map(Into::into));
    }
}

/// Wire fields each placement accepts.
pub const PLACEMENT_FIELDS: &[(&str, &[&str])] = &[
    (
        "account_navigation",
        &["url", "enabled", "text", "selection_width", "selection_height"],
    ),
    ("user_navigation", &["url", "enabled", "text"]),
    ("course_home_sub_navigation", &["url", "enabled", "text", "icon_url"]),
    (
        "course_navigation",
        &["enabled", "text", "visibility", "windowTarget", "default"],
    ),
    (
        "editor_button",
        &["url", "enabled", "icon_url", "selection_width", "selection_height", "message_type"],
    ),
    ("homework_submission", &["url", "enabled", "text", "message_type"]),
    ("link_selection", &["url", "enabled", "text", "message_type"]),
    ("migration_selection", &["url", "enabled", "message_type"]),
    ("tool_configuration", &["url", "enabled", "message_type"]),
    (
        "resource_selection",
        &["url", "enabled", "icon_url", "selection_width", "selection_height"],
    ),
];

fn placement_fields(placement: &str) -> &'static [&'static str] {
    PLACEMENT_FIELDS
        .iter()
        .find(|(name, _)| *name == placement)
        .map_or(&[], |(_, fields)| fields)
}

/// Optional tool fields shared by create and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub description: Option<String>,
    /// Launch URL to match links against. Set this or `domain`, not both.
    pub url: Option<String>,
    pub domain: Option<String>,
    pub icon_url: Option<String>,
    pub text: Option<String>,
    /// Sent as `custom_fields[<name>]`.
    pub custom_fields: Vec<(String, String)>,

    pub account_navigation: Option<Placement>,
    pub user_navigation: Option<Placement>,
    pub course_home_sub_navigation: Option<Placement>,
    pub course_navigation: Option<Placement>,
    pub editor_button: Option<Placement>,
    pub homework_submission: Option<Placement>,
    pub link_selection: Option<Placement>,
    pub migration_selection: Option<Placement>,
    pub tool_configuration: Option<Placement>,
    pub resource_selection: Option<Placement>,

    /// `by_url` or `by_xml`; passed through unchecked.
    pub config_type: Option<String>,
    pub config_xml: Option<String>,
    pub config_url: Option<String>,
    pub not_selectable: Option<bool>,
    pub oauth_compliant: Option<bool>,
}

impl ToolSettings {
    fn placements(&self) -> [(&'static str, Option<&Placement>); 10] {
        [
            ("account_navigation", self.account_navigation.as_ref()),
            ("user_navigation", self.user_navigation.as_ref()),
            ("course_home_sub_navigation", self.course_home_sub_navigation.as_ref()),
            ("course_navigation", self.course_navigation.as_ref()),
            ("editor_button", self.editor_button.as_ref()),
            ("homework_submission", self.homework_submission.as_ref()),
            ("link_selection", self.link_selection.as_ref()),
            ("migration_selection", self.migration_selection.as_ref()),
            ("tool_configuration", self.tool_configuration.as_ref()),
            ("resource_selection", self.resource_selection.as_ref()),
        ]
    }

    fn write_to(&self, payload: &mut Payload) {
        payload.insert_opt("description", self.description.as_ref());
        payload.insert_opt("url", self.url.as_ref());
        payload.insert_opt("domain", self.domain.as_ref());
        payload.insert_opt("icon_url", self.icon_url.as_ref());
        payload.insert_opt("text", self.text.as_ref());
        for (name, value) in &self.custom_fields {
            payload.insert(format!("custom_fields[{name}]"), value);
        }
        for (name, placement) in self.placements() {
            if let Some(placement) = placement {
                placement.write_to(name, placement_fields(name), payload);
            }
        }
        payload.insert_opt("config_type", self.config_type.as_ref());
        payload.insert_opt("config_xml", self.config_xml.as_ref());
        payload.insert_opt("config_url", self.config_url.as_ref());
        payload.insert_opt("not_selectable", self.not_selectable);
        payload.insert_opt("oauth_compliant", self.oauth_compliant);
    }
}

/// Arguments for installing a new tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewExternalTool {
    pub name: String,
    pub privacy_level: PrivacyLevel,
    pub consumer_key: String,
    pub shared_secret: String,
    #[serde(flatten)]
    pub settings: ToolSettings,
}

impl NewExternalTool {
    pub fn new(
        name: impl Into<String>,
        privacy_level: PrivacyLevel,
        consumer_key: impl Into<String>,
        shared_secret: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            privacy_level,
            consumer_key: consumer_key.into(),
            shared_secret: shared_secret.into(),
            settings: ToolSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ToolSettings) -> Self {
        self.settings = settings;
        self
    }

    pub(crate) fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("name", &self.name);
        payload.insert("privacy_level", self.privacy_level.as_str());
        payload.insert("consumer_key", &self.consumer_key);
        payload.insert("shared_secret", &self.shared_secret);
        self.settings.write_to(&mut payload);
        payload
    }
}

/// Arguments for editing a tool. Takes the same fields as create, all
/// optional; anything unset is left as it is on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExternalToolUpdate {
    pub name: Option<String>,
    pub privacy_level: Option<PrivacyLevel>,
    pub consumer_key: Option<String>,
    pub shared_secret: Option<String>,
    #[serde(flatten)]
    pub settings: ToolSettings,
}

impl ExternalToolUpdate {
    pub(crate) fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert_opt("name", self.name.as_ref());
        payload.insert_opt("privacy_level", self.privacy_level.map(|p| p.as_str()));
        payload.insert_opt("consumer_key", self.consumer_key.as_ref());
        payload.insert_opt("shared_secret", self.shared_secret.as_ref());
        self.settings.write_to(&mut payload);
        payload
    }
}

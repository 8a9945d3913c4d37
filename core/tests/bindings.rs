//! Binding operations observed through a recording `HttpClient` double.
//!
//! The double never touches the network. It records every call so tests can
//! assert on the exact method, URL and payload handed to the transport, and
//! on the absence of any call when validation fails.

use std::cell::RefCell;
use std::time::Duration;

use canvas_core::{
    ApiError, ExternalToolUpdate, ExternalTools, HttpClient, HttpMethod, LaunchType,
    ListToolsParams, NewExternalTool, Payload, PayloadValue, Placement, PrivacyLevel,
    RequestContext, RequestOptions, Scope, SessionlessLaunchParams, ToolSettings, WindowTarget,
};

#[derive(Debug, Clone, PartialEq)]
struct Call {
    method: HttpMethod,
    url: String,
    payload: Option<Payload>,
    options: RequestOptions,
}

#[derive(Debug, thiserror::Error)]
#[error("simulated transport failure")]
struct FakeTransportError;

/// Records calls and answers with a canned value, or fails when `fail` is set.
#[derive(Default)]
struct Recorder {
    calls: RefCell<Vec<Call>>,
    fail: bool,
}

impl Recorder {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn record(
        &self,
        method: HttpMethod,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<&'static str, FakeTransportError> {
        self.calls.borrow_mut().push(Call {
            method,
            url: url.to_string(),
            payload: payload.cloned(),
            options: options.clone(),
        });
        if self.fail {
            Err(FakeTransportError)
        } else {
            Ok("raw response")
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl HttpClient for Recorder {
    type Response = &'static str;
    type Error = FakeTransportError;

    fn get(
        &self,
        _ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<Self::Response, Self::Error> {
        self.record(HttpMethod::Get, url, payload, options)
    }

    fn post(
        &self,
        _ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<Self::Response, Self::Error> {
        self.record(HttpMethod::Post, url, payload, options)
    }

    fn put(
        &self,
        _ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<Self::Response, Self::Error> {
        self.record(HttpMethod::Put, url, payload, options)
    }

    fn delete(
        &self,
        _ctx: &RequestContext,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<Self::Response, Self::Error> {
        self.record(HttpMethod::Delete, url, payload, options)
    }
}

const BASE: &str = "https://lms.example.edu/api";

fn ctx() -> RequestContext {
    RequestContext::new(BASE).with_per_page(40)
}

fn text(s: &str) -> PayloadValue {
    PayloadValue::Text(s.to_string())
}

#[test]
fn course_listing_with_search_term_only() {
    let recorder = Recorder::default();
    let api = ExternalTools::new(&recorder);
    let params = ListToolsParams {
        search_term: Some("quiz".to_string()),
        ..ListToolsParams::default()
    };

    let response = api
        .list_external_tools(&ctx(), &Scope::course("101"), &params, &RequestOptions::default())
        .unwrap();
    assert_eq!(response, "raw response");

    let calls = recorder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, HttpMethod::Get);
    assert_eq!(calls[0].url, format!("{BASE}/v1/courses/101/external_tools"));

    let payload = calls[0].payload.as_ref().unwrap();
    assert_eq!(
        serde_json::to_value(payload).unwrap(),
        serde_json::json!({"search_term": "quiz", "per_page": 40})
    );
}

#[test]
fn listing_honors_explicit_per_page_for_every_scope() {
    let recorder = Recorder::default();
    let api = ExternalTools::new(&recorder);
    let params = ListToolsParams {
        per_page: Some(5),
        selectable: Some(false),
        include_parents: Some(true),
        ..ListToolsParams::default()
    };
    for scope in [Scope::account("1"), Scope::course("2"), Scope::group("3")] {
        api.list_external_tools(&ctx(), &scope, &params, &RequestOptions::default())
            .unwrap();
    }

    let calls = recorder.calls();
    let urls: Vec<&str> = calls.iter().map(|c| c.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://lms.example.edu/api/v1/accounts/1/external_tools",
            "https://lms.example.edu/api/v1/courses/2/external_tools",
            "https://lms.example.edu/api/v1/groups/3/external_tools",
        ]
    );
    for call in &calls {
        let payload = call.payload.as_ref().unwrap();
        assert_eq!(payload.get("per_page"), Some(&PayloadValue::Integer(5)));
        assert_eq!(payload.get("selectable"), Some(&PayloadValue::Boolean(false)));
        assert_eq!(payload.get("include_parents"), Some(&PayloadValue::Boolean(true)));
        assert!(!payload.contains_key("search_term"));
    }
}

#[test]
fn invalid_privacy_level_never_reaches_transport() {
    let recorder = Recorder::default();
    let api = ExternalTools::new(&recorder);

    let result = "secret".parse::<PrivacyLevel>().map_err(ApiError::from).and_then(|level| {
        let tool = NewExternalTool::new("Quizzer", level, "key", "shh");
        api.create_external_tool(&ctx(), &Scope::account("1"), &tool, &RequestOptions::default())
    });

    let err = result.unwrap_err();
    let invalid = err.invalid_argument().expect("expected invalid argument");
    assert_eq!(invalid.name, "privacy_level");
    assert_eq!(invalid.value, "secret");
    assert_eq!(invalid.allowed, &["anonymous", "name_only", "public"]);
    assert!(recorder.calls().is_empty());
}

#[test]
fn invalid_enumerated_values_in_json_input_are_rejected() {
    for (input, param) in [
        (r#"{"course_navigation":{"visibility":"everyone"}}"#, "course_navigation[visibility]"),
        (r#"{"course_navigation":{"window_target":"_top"}}"#, "course_navigation[windowTarget]"),
    ] {
        let err = serde_json::from_str::<ToolSettings>(input).unwrap_err();
        assert!(err.to_string().contains(param), "{input}: {err}");
    }
    let err = serde_json::from_str::<SessionlessLaunchParams>(r#"{"launch_type":"course_navigation"}"#)
        .unwrap_err();
    assert!(err.to_string().contains("launch_type"));
}

#[test]
fn group_scope_rejected_before_any_call() {
    let recorder = Recorder::default();
    let api = ExternalTools::new(&recorder);
    let opts = RequestOptions::default();
    let group = Scope::group("3");

    let err = api.get_external_tool(&ctx(), &group, "1", &opts).unwrap_err();
    assert_eq!(err.invalid_argument().map(|e| e.name), Some("scope"));
    assert!(api.delete_external_tool(&ctx(), &group, "1", &opts).is_err());
    assert!(api
        .edit_external_tool(&ctx(), &group, "1", &ExternalToolUpdate::default(), &opts)
        .is_err());
    assert!(recorder.calls().is_empty());
}

#[test]
fn delete_issues_single_delete_without_payload() {
    let recorder = Recorder::default();
    let api = ExternalTools::new(&recorder);

    api.delete_external_tool(&ctx(), &Scope::account("7"), "55", &RequestOptions::default())
        .unwrap();

    let calls = recorder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, HttpMethod::Delete);
    assert_eq!(calls[0].url, format!("{BASE}/v1/accounts/7/external_tools/55"));
    assert!(calls[0].payload.is_none());
}

#[test]
fn create_with_placements_builds_nested_keys() {
    let recorder = Recorder::default();
    let api = ExternalTools::new(&recorder);
    let tool = NewExternalTool::new("Quizzer", PrivacyLevel::Public, "key", "shh").with_settings(
        ToolSettings {
            url: Some("https://quiz.example.com/launch".to_string()),
            course_navigation: Some(Placement {
                text: Some("Quizzes".to_string()),
                window_target: Some(WindowTarget::SelfFrame),
                default: Some(false),
                ..Placement::enabled()
            }),
            editor_button: Some(Placement {
                icon_url: Some("https://quiz.example.com/icon.png".to_string()),
                selection_width: Some(600),
                message_type: Some("ContentItemSelectionRequest".to_string()),
                ..Placement::default()
            }),
            oauth_compliant: Some(true),
            ..ToolSettings::default()
        },
    );

    api.create_external_tool(&ctx(), &Scope::course("9"), &tool, &RequestOptions::default())
        .unwrap();

    let calls = recorder.calls();
    assert_eq!(calls[0].method, HttpMethod::Post);
    assert_eq!(calls[0].url, format!("{BASE}/v1/courses/9/external_tools"));
    let payload = calls[0].payload.as_ref().unwrap();
    let keys: Vec<&str> = payload.iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec![
            "name",
            "privacy_level",
            "consumer_key",
            "shared_secret",
            "url",
            "course_navigation[enabled]",
            "course_navigation[text]",
            "course_navigation[windowTarget]",
            "course_navigation[default]",
            "editor_button[icon_url]",
            "editor_button[selection_width]",
            "editor_button[message_type]",
            "oauth_compliant",
        ]
    );
    assert_eq!(payload.get("course_navigation[windowTarget]"), Some(&text("_self")));
    assert_eq!(payload.get("editor_button[selection_width]"), Some(&PayloadValue::Integer(600)));
}

#[test]
fn edit_sends_put_with_only_set_fields() {
    let recorder = Recorder::default();
    let api = ExternalTools::new(&recorder);
    let update = ExternalToolUpdate {
        privacy_level: Some(PrivacyLevel::Anonymous),
        settings: ToolSettings {
            not_selectable: Some(true),
            ..ToolSettings::default()
        },
        ..ExternalToolUpdate::default()
    };

    api.edit_external_tool(&ctx(), &Scope::course("9"), "12", &update, &RequestOptions::default())
        .unwrap();

    let calls = recorder.calls();
    assert_eq!(calls[0].method, HttpMethod::Put);
    assert_eq!(calls[0].url, format!("{BASE}/v1/courses/9/external_tools/12"));
    assert_eq!(
        serde_json::to_value(calls[0].payload.as_ref().unwrap()).unwrap(),
        serde_json::json!({"privacy_level": "anonymous", "not_selectable": true})
    );
}

#[test]
fn sessionless_launch_sends_launch_type() {
    let recorder = Recorder::default();
    let api = ExternalTools::new(&recorder);
    let params = SessionlessLaunchParams {
        assignment_id: Some("300".to_string()),
        launch_type: Some(LaunchType::Assessment),
        ..SessionlessLaunchParams::default()
    };

    api.get_sessionless_launch_url(&ctx(), &Scope::course("9"), &params, &RequestOptions::default())
        .unwrap();

    let calls = recorder.calls();
    assert_eq!(calls[0].method, HttpMethod::Get);
    assert_eq!(calls[0].url, format!("{BASE}/v1/courses/9/external_tools/sessionless_launch"));
    assert_eq!(
        serde_json::to_value(calls[0].payload.as_ref().unwrap()).unwrap(),
        serde_json::json!({"assignment_id": "300", "launch_type": "assessment"})
    );
}

#[test]
fn transport_options_pass_through() {
    let recorder = Recorder::default();
    let api = ExternalTools::new(&recorder);
    let opts = RequestOptions::default()
        .header("X-Request-Id", "r-1")
        .timeout(Duration::from_secs(2))
        .max_retries(4);

    api.get_external_tool(&ctx(), &Scope::account("1"), "2", &opts).unwrap();

    assert_eq!(recorder.calls()[0].options, opts);
}

#[test]
fn transport_error_is_returned_unchanged() {
    let recorder = Recorder::failing();
    let api = ExternalTools::new(&recorder);

    let err = api
        .get_external_tool(&ctx(), &Scope::account("1"), "2", &RequestOptions::default())
        .unwrap_err();

    assert!(matches!(err, ApiError::Transport(FakeTransportError)));
    assert_eq!(recorder.calls().len(), 1, "no retries at the binding layer");
}

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const PRIVACY_LEVELS: &[&str] = &["anonymous", "name_only", "public"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalTool {
    pub id: u64,
    pub context_type: String,
    pub context_id: String,
    pub name: String,
    pub privacy_level: String,
    pub consumer_key: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub not_selectable: bool,
    pub custom_fields: BTreeMap<String, String>,
    pub placements: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    tools: BTreeMap<u64, ExternalTool>,
    launches: u64,
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route(
            "/api/v1/{scope}/{scope_id}/external_tools",
            get(list_tools).post(create_tool),
        )
        .route(
            "/api/v1/{scope}/{scope_id}/external_tools/sessionless_launch",
            get(sessionless_launch),
        )
        .route(
            "/api/v1/{scope}/{scope_id}/external_tools/{tool_id}",
            get(get_tool).put(edit_tool).delete(delete_tool),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "errors": [{ "message": message.into() }] })))
}

/// Map a path segment to the context type it names. Groups only list.
fn context_type(scope: &str, allow_group: bool) -> ApiResult<&'static str> {
    match scope {
        "accounts" => Ok("Account"),
        "courses" => Ok("Course"),
        "groups" if allow_group => Ok("Group"),
        _ => Err(error(StatusCode::NOT_FOUND, format!("unknown scope {scope}"))),
    }
}

fn flag(params: &HashMap<String, String>, key: &str) -> Option<bool> {
    params.get(key).map(|v| v == "true" || v == "1")
}

/// Split `placement[field]` into its two parts.
fn bracketed(key: &str) -> Option<(&str, &str)> {
    let (outer, rest) = key.split_once('[')?;
    let inner = rest.strip_suffix(']')?;
    Some((outer, inner))
}

fn check_privacy_level(level: &str) -> ApiResult<()> {
    if PRIVACY_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(error(
            StatusCode::BAD_REQUEST,
            format!("invalid privacy_level {level}"),
        ))
    }
}

/// Apply form fields onto `tool`. Unknown top-level keys are ignored.
fn apply_fields(tool: &mut ExternalTool, form: &HashMap<String, String>) -> ApiResult<()> {
    for (key, value) in form {
        match key.as_str() {
            "name" => tool.name = value.clone(),
            "privacy_level" => {
                check_privacy_level(value)?;
                tool.privacy_level = value.clone();
            }
            "consumer_key" => tool.consumer_key = value.clone(),
            "description" => tool.description = Some(value.clone()),
            "url" => tool.url = Some(value.clone()),
            "domain" => tool.domain = Some(value.clone()),
            "not_selectable" => tool.not_selectable = value == "true",
            other => match bracketed(other) {
                Some(("custom_fields", name)) => {
                    tool.custom_fields.insert(name.to_string(), value.clone());
                }
                Some((placement, field)) => {
                    tool.placements
                        .entry(placement.to_string())
                        .or_default()
                        .insert(field.to_string(), value.clone());
                }
                None => {}
            },
        }
    }
    Ok(())
}

fn form_fields(form: Result<Form<HashMap<String, String>>, FormRejection>) -> HashMap<String, String> {
    // An empty PUT carries no content type; treat it as no fields.
    form.map(|Form(fields)| fields).unwrap_or_default()
}

async fn list_tools(
    State(db): State<Db>,
    Path((scope, scope_id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<ExternalTool>>> {
    let ctx_type = context_type(&scope, true)?;
    let search = params.get("search_term").map(|s| s.to_lowercase());
    let selectable = flag(&params, "selectable").unwrap_or(false);
    let include_parents = flag(&params, "include_parents").unwrap_or(false);
    let per_page = match params.get("per_page") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| error(StatusCode::BAD_REQUEST, "per_page must be a number"))?,
        None => 10,
    };
    debug!(%scope, %scope_id, per_page, "list tools");

    let store = db.read().await;
    let tools = store
        .tools
        .values()
        .filter(|t| {
            (t.context_type == ctx_type && t.context_id == scope_id)
                || (include_parents && ctx_type != "Account" && t.context_type == "Account")
        })
        .filter(|t| !selectable || !t.not_selectable)
        .filter(|t| {
            search
                .as_ref()
                .is_none_or(|s| t.name.to_lowercase().contains(s))
        })
        .take(per_page)
        .cloned()
        .collect();
    Ok(Json(tools))
}

async fn create_tool(
    State(db): State<Db>,
    Path((scope, scope_id)): Path<(String, String)>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> ApiResult<Json<ExternalTool>> {
    let ctx_type = context_type(&scope, false)?;
    let form = form_fields(form);
    for required in ["name", "privacy_level", "consumer_key", "shared_secret"] {
        if !form.contains_key(required) {
            return Err(error(
                StatusCode::BAD_REQUEST,
                format!("{required} is required"),
            ));
        }
    }

    let mut store = db.write().await;
    let mut tool = ExternalTool {
        id: store.next_id + 1,
        context_type: ctx_type.to_string(),
        context_id: scope_id,
        name: String::new(),
        privacy_level: String::new(),
        consumer_key: String::new(),
        description: None,
        url: None,
        domain: None,
        not_selectable: false,
        custom_fields: BTreeMap::new(),
        placements: BTreeMap::new(),
    };
    apply_fields(&mut tool, &form)?;
    store.next_id = tool.id;
    store.tools.insert(tool.id, tool.clone());
    Ok(Json(tool))
}

fn find<'a>(
    store: &'a Store,
    ctx_type: &str,
    scope_id: &str,
    tool_id: u64,
) -> ApiResult<&'a ExternalTool> {
    store
        .tools
        .get(&tool_id)
        .filter(|t| t.context_type == ctx_type && t.context_id == scope_id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "The specified resource does not exist."))
}

async fn get_tool(
    State(db): State<Db>,
    Path((scope, scope_id, tool_id)): Path<(String, String, u64)>,
) -> ApiResult<Json<ExternalTool>> {
    let ctx_type = context_type(&scope, false)?;
    let store = db.read().await;
    find(&store, ctx_type, &scope_id, tool_id).cloned().map(Json)
}

async fn edit_tool(
    State(db): State<Db>,
    Path((scope, scope_id, tool_id)): Path<(String, String, u64)>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> ApiResult<Json<ExternalTool>> {
    let ctx_type = context_type(&scope, false)?;
    let form = form_fields(form);
    let mut store = db.write().await;
    let mut tool = find(&store, ctx_type, &scope_id, tool_id)?.clone();
    apply_fields(&mut tool, &form)?;
    store.tools.insert(tool.id, tool.clone());
    Ok(Json(tool))
}

async fn delete_tool(
    State(db): State<Db>,
    Path((scope, scope_id, tool_id)): Path<(String, String, u64)>,
) -> ApiResult<Json<ExternalTool>> {
    let ctx_type = context_type(&scope, false)?;
    let mut store = db.write().await;
    find(&store, ctx_type, &scope_id, tool_id)?;
    store
        .tools
        .remove(&tool_id)
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "The specified resource does not exist."))
}

/// Path of the item an assessment or module item launch opens, when
/// `launch_type` comes with the id it needs.
fn launch_target(params: &HashMap<String, String>) -> Option<String> {
    match params.get("launch_type").map(String::as_str) {
        Some("assessment") => params
            .get("assignment_id")
            .map(|id| format!("assignments/{id}")),
        Some("module_item") => params
            .get("module_item_id")
            .map(|id| format!("modules/items/{id}")),
        _ => None,
    }
}

async fn sessionless_launch(
    State(db): State<Db>,
    Path((scope, scope_id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let ctx_type = context_type(&scope, false)?;
    let mut store = db.write().await;

    let tool = match (params.get("id"), params.get("url")) {
        (Some(id), _) => {
            let id = id
                .parse::<u64>()
                .map_err(|_| error(StatusCode::BAD_REQUEST, "id must be a number"))?;
            find(&store, ctx_type, &scope_id, id)?.clone()
        }
        (None, Some(url)) => store
            .tools
            .values()
            .find(|t| {
                t.context_type == ctx_type && t.context_id == scope_id && t.url.as_ref() == Some(url)
            })
            .cloned()
            .ok_or_else(|| error(StatusCode::NOT_FOUND, "no tool matches url"))?,
        (None, None) => {
            let target = launch_target(&params).ok_or_else(|| {
                error(
                    StatusCode::BAD_REQUEST,
                    "A tool id, tool url, or module item id must be provided",
                )
            })?;
            store.launches += 1;
            return Ok(Json(json!({
                "id": null,
                "name": null,
                "url": format!(
                    "/{scope}/{scope_id}/{target}?display=borderless&verifier={}",
                    store.launches
                ),
            })));
        }
    };

    store.launches += 1;
    Ok(Json(json!({
        "id": tool.id,
        "name": tool.name,
        "url": format!(
            "/{scope}/{scope_id}/external_tools/{}?display=borderless&verifier={}",
            tool.id, store.launches
        ),
    })))
}

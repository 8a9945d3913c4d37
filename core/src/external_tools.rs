//! Bindings for the external tools endpoints.
//!
//! # Design
//! Each operation is split in two. A `build_*` function turns typed
//! arguments into an `HttpRequest` with no I/O, and the matching method on
//! `ExternalTools` sends that request through the injected `HttpClient` and
//! returns the client's response untouched. The per-scope variants of an
//! endpoint are one function taking a `Scope`.

use tracing::debug;

use crate::context::{RequestContext, RequestOptions};
use crate::error::{ApiError, InvalidArgument};
use crate::http::{HttpClient, HttpMethod, HttpRequest, Payload};
use crate::scope::Scope;
use crate::types::{ExternalToolUpdate, ListToolsParams, NewExternalTool, SessionlessLaunchParams};

fn collection_url(ctx: &RequestContext, scope: &Scope) -> String {
    format!("{}{}/external_tools", ctx.base_api_url, scope.path_prefix())
}

fn tool_url(ctx: &RequestContext, scope: &Scope, tool_id: &str) -> String {
    format!("{}/{tool_id}", collection_url(ctx, scope))
}

fn request(
    method: HttpMethod,
    url: String,
    payload: Option<Payload>,
    options: &RequestOptions,
) -> HttpRequest {
    debug!(%method, %url, fields = payload.as_ref().map_or(0, Payload::len), "built request");
    HttpRequest {
        method,
        url,
        payload,
        options: options.clone(),
    }
}

/// `GET /v1/{scope}/{id}/external_tools`. Works for every scope.
pub fn build_list_external_tools(
    ctx: &RequestContext,
    scope: &Scope,
    params: &ListToolsParams,
    options: &RequestOptions,
) -> HttpRequest {
    let mut payload = Payload::new();
    payload.insert_opt("search_term", params.search_term.as_ref());
    payload.insert_opt("selectable", params.selectable);
    payload.insert_opt("include_parents", params.include_parents);
    payload.insert("per_page", params.per_page.unwrap_or(ctx.per_page));
    request(HttpMethod::Get, collection_url(ctx, scope), Some(payload), options)
}

/// `GET /v1/{scope}/{id}/external_tools/sessionless_launch`
pub fn build_sessionless_launch(
    ctx: &RequestContext,
    scope: &Scope,
    params: &SessionlessLaunchParams,
    options: &RequestOptions,
) -> Result<HttpRequest, InvalidArgument> {
    scope.require_tool_owner()?;
    let url = format!("{}/sessionless_launch", collection_url(ctx, scope));
    Ok(request(HttpMethod::Get, url, Some(params.to_payload()), options))
}

/// `GET /v1/{scope}/{id}/external_tools/{tool_id}`
pub fn build_get_external_tool(
    ctx: &RequestContext,
    scope: &Scope,
    tool_id: &str,
    options: &RequestOptions,
) -> Result<HttpRequest, InvalidArgument> {
    scope.require_tool_owner()?;
    Ok(request(HttpMethod::Get, tool_url(ctx, scope, tool_id), None, options))
}

/// `POST /v1/{scope}/{id}/external_tools`
pub fn build_create_external_tool(
    ctx: &RequestContext,
    scope: &Scope,
    tool: &NewExternalTool,
    options: &RequestOptions,
) -> Result<HttpRequest, InvalidArgument> {
    scope.require_tool_owner()?;
    Ok(request(
        HttpMethod::Post,
        collection_url(ctx, scope),
        Some(tool.to_payload()),
        options,
    ))
}

/// `PUT /v1/{scope}/{id}/external_tools/{tool_id}`. An update with nothing
/// set is sent without a payload.
pub fn build_edit_external_tool(
    ctx: &RequestContext,
    scope: &Scope,
    tool_id: &str,
    update: &ExternalToolUpdate,
    options: &RequestOptions,
) -> Result<HttpRequest, InvalidArgument> {
    scope.require_tool_owner()?;
    let payload = Some(update.to_payload()).filter(|p| !p.is_empty());
    Ok(request(HttpMethod::Put, tool_url(ctx, scope, tool_id), payload, options))
}

/// `DELETE /v1/{scope}/{id}/external_tools/{tool_id}`
pub fn build_delete_external_tool(
    ctx: &RequestContext,
    scope: &Scope,
    tool_id: &str,
    options: &RequestOptions,
) -> Result<HttpRequest, InvalidArgument> {
    scope.require_tool_owner()?;
    Ok(request(HttpMethod::Delete, tool_url(ctx, scope, tool_id), None, options))
}

/// External tools operations bound to an HTTP client.
///
/// Holds nothing but the client. The request context is passed into every
/// call and only read.
#[derive(Debug, Clone)]
pub struct ExternalTools<C> {
    client: C,
}

impl<C: HttpClient> ExternalTools<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn send(
        &self,
        ctx: &RequestContext,
        request: HttpRequest,
    ) -> Result<C::Response, ApiError<C::Error>> {
        self.client.execute(ctx, &request).map_err(ApiError::Transport)
    }

    /// List the tools installed in `scope`.
    pub fn list_external_tools(
        &self,
        ctx: &RequestContext,
        scope: &Scope,
        params: &ListToolsParams,
        options: &RequestOptions,
    ) -> Result<C::Response, ApiError<C::Error>> {
        self.send(ctx, build_list_external_tools(ctx, scope, params, options))
    }

    /// Ask for a one-time launch URL for a tool.
    pub fn get_sessionless_launch_url(
        &self,
        ctx: &RequestContext,
        scope: &Scope,
        params: &SessionlessLaunchParams,
        options: &RequestOptions,
    ) -> Result<C::Response, ApiError<C::Error>> {
        let request = build_sessionless_launch(ctx, scope, params, options)?;
        self.send(ctx, request)
    }

    pub fn get_external_tool(
        &self,
        ctx: &RequestContext,
        scope: &Scope,
        tool_id: &str,
        options: &RequestOptions,
    ) -> Result<C::Response, ApiError<C::Error>> {
        let request = build_get_external_tool(ctx, scope, tool_id, options)?;
        self.send(ctx, request)
    }

    pub fn create_external_tool(
        &self,
        ctx: &RequestContext,
        scope: &Scope,
        tool: &NewExternalTool,
        options: &RequestOptions,
    ) -> Result<C::Response, ApiError<C::Error>> {
        let request = build_create_external_tool(ctx, scope, tool, options)?;
        self.send(ctx, request)
    }

    pub fn edit_external_tool(
        &self,
        ctx: &RequestContext,
        scope: &Scope,
        tool_id: &str,
        update: &ExternalToolUpdate,
        options: &RequestOptions,
    ) -> Result<C::Response, ApiError<C::Error>> {
        let request = build_edit_external_tool(ctx, scope, tool_id, update, options)?;
        self.send(ctx, request)
    }

    pub fn delete_external_tool(
        &self,
        ctx: &RequestContext,
        scope: &Scope,
        tool_id: &str,
        options: &RequestOptions,
    ) -> Result<C::Response, ApiError<C::Error>> {
        let request = build_delete_external_tool(ctx, scope, tool_id, options)?;
        self.send(ctx, request)
    }
}

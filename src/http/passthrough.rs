//! Rewrite of the API prefix onto the backend root.
//!
//! `GET /api/user/me?x=1` is forwarded as `GET <backend>/user/me?x=1`. Bodies
//! are streamed in both directions.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode, Uri, Version},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::http::request::{prepare_forward_headers, request_id, strip_hop_by_hop};
use crate::observability::metrics;
use crate::resilience::with_deadline;
use crate::state::AppState;

/// Forward any request under the configured prefix.
pub async fn passthrough_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let gateway = state.load();
    let (mut parts, body) = request.into_parts();
    let request_id = request_id(&parts.headers).to_owned();

    let prefix = gateway.config.passthrough.prefix.trim_end_matches('/');
    let rest = parts.uri.path().strip_prefix(prefix).unwrap_or("/");

    let target: Uri = match gateway
        .config
        .backend
        .endpoint(rest, parts.uri.query())
        .map_err(|e| e.to_string())
        .and_then(|url| url.as_str().parse::<Uri>().map_err(|e| e.to_string()))
    {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Cannot build upstream URI");
            return finish(start, StatusCode::BAD_GATEWAY, "Upstream request failed");
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        target = %target,
        "Forwarding to backend"
    );

    prepare_forward_headers(&mut parts.headers, peer);
    parts.uri = target;
    parts.version = Version::HTTP_11;
    let forward = Request::from_parts(parts, body);

    match with_deadline(gateway.config.passthrough.timeout(), gateway.upstream.request(forward)).await {
        Ok(Ok(response)) => {
            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            metrics::record_request("passthrough", parts.status.as_u16(), start);
            Response::from_parts(parts, Body::new(body))
        }
        Ok(Err(e)) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            finish(start, StatusCode::BAD_GATEWAY, "Upstream request failed")
        }
        Err(elapsed) => {
            tracing::warn!(request_id = %request_id, error = %elapsed, "Upstream timed out");
            finish(start, StatusCode::GATEWAY_TIMEOUT, "Upstream request timed out")
        }
    }
}

fn finish(start: Instant, status: StatusCode, message: &'static str) -> Response {
    metrics::record_request("passthrough", status.as_u16(), start);
    (status, Json(json!({ "error": message }))).into_response()
}

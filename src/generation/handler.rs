//! The generation proxy handler.
//!
//! ```text
//! Received → CredentialChecked → BackendCallInFlight → Succeeded
//!                                                    → BackendFailed
//!                                                    → TimedOut
//!                                                    → Faulted
//! ```
//!
//! Every terminal state is reported once; nothing is retried.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::IgnoredAny;

use super::credential::Credential;
use super::error::ProxyError;
use crate::http::request::{request_id, X_REQUEST_ID};
use crate::observability::metrics;
use crate::resilience::with_deadline;
use crate::state::{AppState, GatewayState};

/// `POST` handler relaying a generation request to the backend.
///
/// The credential is checked first and the body is only buffered once it
/// passes. Rejections of either go through the same outcome reporting as
/// backend results.
pub async fn generate_recipe(
    State(state): State<AppState>,
    credential: Result<Credential, ProxyError>,
    request: Request,
) -> Result<Response, ProxyError> {
    let started = Instant::now();
    let gateway = state.load();
    let request_id = request_id(request.headers()).to_owned();
    let forwarded_id = request.headers().get(X_REQUEST_ID).cloned();

    let result = match credential {
        Err(e) => Err(e),
        Ok(credential) => match Bytes::from_request(request, &()).await {
            Err(rejection) => Err(ProxyError::from(rejection)),
            Ok(body) => {
                tracing::debug!(request_id = %request_id, bytes = body.len(), "Credential checked, forwarding generation");
                let _in_flight = metrics::InFlightGeneration::start();
                forward(&gateway, &credential, forwarded_id.as_ref(), body).await
            }
        },
    };

    let outcome = match &result {
        Ok(_) => "succeeded",
        Err(e) => e.outcome(),
    };
    metrics::record_generation(outcome, started);
    tracing::info!(
        request_id = %request_id,
        outcome,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Generation finished"
    );

    result
}

async fn forward(
    gateway: &GatewayState,
    credential: &Credential,
    request_id: Option<&HeaderValue>,
    body: Bytes,
) -> Result<Response, ProxyError> {
    serde_json::from_slice::<IgnoredAny>(&body)
        .map_err(|e| ProxyError::InternalFault(format!("request body is not JSON: {e}")))?;

    let mut request = gateway
        .http
        .post(gateway.generation_url.clone())
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .header(reqwest::header::AUTHORIZATION, credential.header_value().clone());
    if let Some(id) = request_id {
        request = request.header(X_REQUEST_ID, id.clone());
    }

    let call = async {
        let response = request.body(body).send().await?;
        let status = response.status();
        let payload = response.bytes().await?;
        Ok::<_, reqwest::Error>((status, payload))
    };

    let (status, payload) = with_deadline(gateway.config.generation.timeout(), call).await??;

    if !status.is_success() {
        let detail = String::from_utf8_lossy(&payload).into_owned();
        tracing::warn!(status = %status, "Backend rejected generation");
        return Err(ProxyError::BackendFailure { status, detail });
    }

    serde_json::from_slice::<IgnoredAny>(&payload)
        .map_err(|e| ProxyError::InternalFault(format!("backend returned malformed JSON: {e}")))?;

    tracing::debug!(status = %status, "Backend generation succeeded");
    Ok(success(payload))
}

/// Successful generations always answer 200, whichever 2xx the backend used.
fn success(payload: Bytes) -> Response {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        payload,
    )
        .into_response()
}

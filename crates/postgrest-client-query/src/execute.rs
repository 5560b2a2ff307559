use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value as JsonValue;

use postgrest_client_core::{
    ErrorShape, Method, PostgrestError, PostgrestResponse, PostgrestResult, RawResponse,
    Transport, TransportError, TransportRequest,
};

use crate::builder::RequestState;
use crate::modifier::{CSV, PREFER};

const PLAN_TEXT: &str = "application/vnd.pgrst.plan+text";
const ZERO_ROWS: &str = "Results contain 0 rows";

/// Execute a PostgREST request and normalize the response.
pub async fn execute(
    mut state: RequestState,
    transport: &dyn Transport,
) -> PostgrestResult<PostgrestResponse> {
    if let Err(e) = finalize_headers(&mut state) {
        return fail(&state, e);
    }

    let body = match &state.body {
        Some(body) if !state.method.is_read() => Some(serde_json::to_string(body)?),
        _ => None,
    };

    tracing::debug!(
        method = %state.method,
        url = %state.url,
        "Executing PostgREST request"
    );

    let request = TransportRequest {
        url: state.url.clone(),
        method: state.method,
        headers: state.headers.clone(),
        body,
        signal: state.signal.clone(),
    };

    match transport.fetch(request).await {
        Ok(raw) => normalize(&state, raw),
        Err(e) => fail(&state, e),
    }
}

/// Write the schema profile and content type headers.
pub(crate) fn finalize_headers(state: &mut RequestState) -> Result<(), TransportError> {
    if let Some(schema) = &state.schema {
        let name = if state.method.is_read() {
            "accept-profile"
        } else {
            "content-profile"
        };
        let value = HeaderValue::from_str(schema).map_err(|e| {
            TransportError::InvalidRequest(format!("invalid schema name {schema:?}: {e}"))
        })?;
        state.headers.insert(HeaderName::from_static(name), value);
    }
    if !state.method.is_read() {
        state
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    Ok(())
}

/// Turn a transport failure into a status-0 envelope, or propagate it.
fn fail(state: &RequestState, err: TransportError) -> PostgrestResult<PostgrestResponse> {
    if state.throw_on_error {
        return Err(PostgrestError::Transport(err));
    }
    tracing::debug!(error = %err, "PostgREST request failed before a response");
    Ok(PostgrestResponse::error(
        PostgrestError::Fetch(ErrorShape::from(&err)),
        0,
        "",
    ))
}

/// Classify a raw response into the uniform envelope.
pub(crate) fn normalize(
    state: &RequestState,
    raw: RawResponse,
) -> PostgrestResult<PostgrestResponse> {
    let mut status = raw.status;
    let mut status_text = raw.status_text.clone();
    let mut data: Option<JsonValue> = None;
    let mut error: Option<PostgrestError> = None;
    let mut count: Option<i64> = None;

    if matches!(status, 200 | 201 | 204) {
        if count_requested(&state.headers) {
            count = raw.header("content-range").and_then(parse_content_range);
        }
        if state.method != Method::Head {
            data = read_success_body(&state.headers, raw.body);
            status_text = "OK".to_string();
        }
        if status == 204 {
            status_text = "No Content".to_string();
        }
    } else {
        match serde_json::from_str::<JsonValue>(&raw.body) {
            Ok(JsonValue::Array(_)) if status == 404 => {
                // PostgREST answers 404 with an array body when a view or rpc
                // matched nothing.
                tracing::debug!("Reclassified 404 with array body as empty result");
                data = Some(JsonValue::Array(Vec::new()));
                status = 200;
                status_text = "OK".to_string();
            }
            Ok(JsonValue::Null) => {}
            Ok(body) => error = Some(PostgrestError::Api(body)),
            Err(_) if status == 404 && raw.body.is_empty() => {
                tracing::debug!("Reclassified empty 404 as no content");
                status = 204;
                status_text = "No Content".to_string();
            }
            Err(_) => error = Some(PostgrestError::Api(JsonValue::String(raw.body))),
        }

        if state.allow_empty
            && error
                .as_ref()
                .and_then(PostgrestError::details)
                .is_some_and(|d| d.contains(ZERO_ROWS))
        {
            tracing::debug!("Suppressed zero-row error for maybe_single");
            error = None;
            status = 200;
            status_text = "OK".to_string();
        }

        if let Some(err) = error {
            if state.throw_on_error {
                return Err(err);
            }
            error = Some(err);
        }
    }

    let response = match error {
        Some(err) => PostgrestResponse::error(err, status, status_text),
        None => PostgrestResponse::ok(data, status, status_text),
    };
    Ok(response.with_count(count))
}

/// Empty bodies carry no data; CSV and text plans stay text; anything else is JSON.
fn read_success_body(headers: &HeaderMap, body: String) -> Option<JsonValue> {
    if body.is_empty() {
        return None;
    }
    let accept = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if accept == CSV || accept.contains(PLAN_TEXT) {
        return Some(JsonValue::String(body));
    }
    match serde_json::from_str(&body) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Response body is not JSON, keeping it as text: {e}");
            Some(JsonValue::String(body))
        }
    }
}

fn count_requested(headers: &HeaderMap) -> bool {
    headers
        .get_all(PREFER)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|prefer| {
            ["count=exact", "count=planned", "count=estimated"]
                .iter()
                .any(|directive| prefer.contains(directive))
        })
}

/// Total from a `Content-Range` header: "0-9/100" → 100. "*" totals are None.
pub(crate) fn parse_content_range(value: &str) -> Option<i64> {
    let (_, total) = value.split_once('/')?;
    total.trim().parse::<i64>().ok()
}

use std::collections::HashMap;

use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use prometheus::{Encoder, TextEncoder};
use tracing::{debug, error, info};

use crate::landing;
use crate::state::AppState;

const SCRAPE_TIMEOUT_HEADER: &str = "X-Prometheus-Scrape-Timeout-Seconds";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing_handler))
        .route("/probe", get(probe_handler))
        .route("/metrics", get(metrics_handler))
        .route("/config", get(config_handler))
        .route("/-/reload", post(reload_handler))
        .route("/-/healthy", get(healthy_handler))
        .with_state(state)
}

async fn landing_handler() -> Html<String> {
    Html(landing::page())
}

async fn healthy_handler() -> &'static str {
    "Healthy"
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    let encoder = TextEncoder::new();
    let mut body = Vec::new();

    if let Err(err) = encoder.encode(&state.registry.gather(), &mut body) {
        error!(%err, "Error encoding telemetry");
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
    }

    (
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        body,
    )
        .into_response()
}

async fn config_handler(State(state): State<AppState>) -> Response {
    let rendered = state
        .store
        .provide(|config| serde_yaml::to_string(config));

    match rendered {
        Ok(body) => ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response(),
        Err(err) => {
            error!(%err, "Error marshalling configuration");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

async fn reload_handler(State(state): State<AppState>) -> Response {
    match state.reload() {
        Ok(()) => {
            info!("Reloaded config file");
            "Configuration reloaded".into_response()
        }
        Err(err) => {
            error!(%err, "Error reloading config");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to reload config: {err}"),
            )
                .into_response()
        }
    }
}

async fn probe_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let params = parse_query(query.as_deref().unwrap_or_default());

    let Some(module_name) = first_value(&params, "module") else {
        return (StatusCode::BAD_REQUEST, "Module parameter is missing").into_response();
    };

    let scrape_timeout = match scrape_timeout(&headers) {
        Ok(timeout) => timeout,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("Failed to parse timeout from Prometheus header: {err}"),
            )
                .into_response();
        }
    };

    // the snapshot is pinned for the whole request; a concurrent reload
    // cannot affect this probe
    let config = state.store.snapshot();
    let Some(module) = config.modules.get(&module_name) else {
        debug!(module = %module_name, "Unknown module");
        state.module_unknown.inc();
        return (
            StatusCode::BAD_REQUEST,
            format!("Unknown module {module_name:?}"),
        )
            .into_response();
    };

    let debug = first_value(&params, "debug").as_deref() == Some("true");

    match state
        .prober
        .probe(&module_name, module, &params, scrape_timeout, debug)
        .await
    {
        Ok(body) => ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response(),
        Err(err) => {
            error!(module = %module_name, %err, "Probe request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Splits the raw query string into a multi-valued parameter map; every
/// parameter doubles as a module variable override.
fn parse_query(query: &str) -> HashMap<String, Vec<String>> {
    let mut params: HashMap<String, Vec<String>> = HashMap::new();

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }

    params
}

fn first_value(params: &HashMap<String, Vec<String>>, key: &str) -> Option<String> {
    params.get(key).and_then(|values| values.first()).cloned()
}

/// Parses the scrape deadline announced by the Prometheus server, if any.
fn scrape_timeout(headers: &HeaderMap) -> Result<Option<f64>, String> {
    let Some(value) = headers.get(SCRAPE_TIMEOUT_HEADER) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| "header is not valid text".to_string())?;

    value
        .parse::<f64>()
        .map(Some)
        .map_err(|err| format!("{err}: {value:?}"))
}

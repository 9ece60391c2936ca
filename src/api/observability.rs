use axum::{
    extract::{MatchedPath, Request, State},
    http::Extensions,
    http::header::USER_AGENT,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, Span, info, info_span};
use uuid::Uuid;

use crate::api::AppState;

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

const fn outcome(status: u16) -> &'static str {
    if status >= 500 {
        "error"
    } else if status >= 400 {
        "client_error"
    } else {
        "success"
    }
}

fn record_request_metrics(method: &str, route: &str, status: u16, elapsed: Duration) {
    let labels = [
        ("method", method.to_owned()),
        ("path", route.to_owned()),
        ("status", status.to_string()),
    ];
    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels).record(elapsed.as_secs_f64());
}

/// Handle to the span opened by [`logging_middleware`], carried in the
/// request extensions so inner layers can record on it directly.
#[derive(Clone)]
pub struct RequestSpan(pub Span);

/// The request's own span, falling back to whatever span is current.
#[must_use]
pub fn request_span(extensions: &Extensions) -> Span {
    extensions
        .get::<RequestSpan>()
        .map_or_else(Span::current, |stored| stored.0.clone())
}

/// Opens the `request` span every handler runs in and emits one
/// `http_request_finished` event per request.
pub async fn logging_middleware(mut req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    // Route template when known; raw paths would blow up label cardinality
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| path.clone(), |matched| matched.as_str().to_owned());
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_owned();

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %method,
        path = %path,
        route = %route,
        user_id = tracing::field::Empty,
    );
    req.extensions_mut().insert(RequestSpan(span.clone()));

    async move {
        let response = next.run(req).await;
        let elapsed = started.elapsed();
        let status = response.status().as_u16();

        record_request_metrics(method.as_str(), &route, status, elapsed);

        info!(
            event = "http_request_finished",
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            status_code = status,
            user_agent = %user_agent,
            outcome = outcome(status),
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Extension, Router, body::Body, http::StatusCode, middleware, routing::get};
    use tower::ServiceExt;

    #[test]
    fn outcome_buckets() {
        assert_eq!(outcome(200), "success");
        assert_eq!(outcome(404), "client_error");
        assert_eq!(outcome(503), "error");
    }

    #[test]
    fn request_span_prefers_the_stored_span() {
        tracing::subscriber::with_default(tracing_subscriber::registry(), || {
            let stored = info_span!("request", user_id = tracing::field::Empty);
            let inner = info_span!("inner");
            let _entered = inner.enter();

            let mut extensions = Extensions::new();
            assert_eq!(request_span(&extensions).id(), inner.id());

            extensions.insert(RequestSpan(stored.clone()));
            assert_eq!(request_span(&extensions).id(), stored.id());
        });
    }

    #[tokio::test]
    async fn middleware_exposes_its_span_to_handlers() {
        let app = Router::new()
            .route(
                "/",
                get(|Extension(RequestSpan(span)): Extension<RequestSpan>| async move {
                    span.record("user_id", 42);
                    "ok"
                }),
            )
            .layer(middleware::from_fn(logging_middleware));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

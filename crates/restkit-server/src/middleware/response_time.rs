//! Middleware de tiempo de respuesta y logging estructurado.

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, Response},
};
use std::{
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};
use tracing::{Instrument, info, info_span};

/// Header con la duracion de la request.
pub static RESPONSE_TIME_HEADER: HeaderName = HeaderName::from_static("x-response-time");

/// Layer that times requests, logs them and reports the duration in
/// `X-Response-Time` (`"0.01234 seconds"`).
#[derive(Clone, Default)]
pub struct ResponseTimeLayer;

impl<S> Layer<S> for ResponseTimeLayer {
    type Service = ResponseTimeMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ResponseTimeMiddleware { inner }
    }
}

#[derive(Clone)]
pub struct ResponseTimeMiddleware<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for ResponseTimeMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let start = Instant::now();

        let span = info_span!(
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
        );

        let mut inner = self.inner.clone();

        Box::pin(
            async move {
                let mut response = inner.call(request).await?;

                let duration = start.elapsed();
                let formatted = format_duration(duration.as_secs_f64());
                if let Ok(value) = HeaderValue::from_str(&formatted) {
                    response
                        .headers_mut()
                        .insert(RESPONSE_TIME_HEADER.clone(), value);
                }

                info!(
                    status = response.status().as_u16(),
                    duration_ms = duration.as_millis() as u64,
                    "Request completed"
                );

                Ok(response)
            }
            .instrument(span),
        )
    }
}

fn format_duration(seconds: f64) -> String {
    format!("{:.5} seconds", seconds)
}

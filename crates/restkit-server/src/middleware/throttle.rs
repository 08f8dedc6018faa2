//! Throttle enforcement and throttle headers as tower layers.
//!
//! Apply [`ThrottleInfoLayer`] outside [`ThrottleLayer`] so that rejected
//! requests also carry the `X-Throttle-*` headers, and both inside
//! `IdentityLayer` so that authenticated clients are recognised.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response},
    response::IntoResponse,
};
use std::{
    net::SocketAddr,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::auth::StaticTokens;
use crate::throttle::{Admission, ClientIdentity, ThrottleInspector, ThrottleSet, attach_headers};

// Sin IdentityLayer el cliente se trata como anonimo
fn client_of(request: &Request<Body>) -> ClientIdentity {
    if let Some(client) = request.extensions().get::<ClientIdentity>() {
        return client.clone();
    }
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    ClientIdentity::from_headers(request.headers(), peer, &StaticTokens::default())
}

/// Layer that records each request against its throttles and answers 429
/// once a window is full.
#[derive(Clone)]
pub struct ThrottleLayer {
    inspector: Arc<ThrottleInspector>,
    throttles: ThrottleSet,
}

impl ThrottleLayer {
    pub fn new(inspector: Arc<ThrottleInspector>, throttles: ThrottleSet) -> Self {
        Self { inspector, throttles }
    }
}

impl<S> Layer<S> for ThrottleLayer {
    type Service = ThrottleMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ThrottleMiddleware {
            inner,
            inspector: Arc::clone(&self.inspector),
            throttles: self.throttles.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ThrottleMiddleware<S> {
    inner: S,
    inspector: Arc<ThrottleInspector>,
    throttles: ThrottleSet,
}

impl<S> Service<Request<Body>> for ThrottleMiddleware<S>
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
        let client = client_of(&request);
        let inspector = Arc::clone(&self.inspector);
        let throttles = self.throttles.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            match inspector.enforce(&client, &throttles).await {
                Admission::Allowed => inner.call(request).await,
                Admission::Rejected(rejection) => Ok(rejection.into_response()),
            }
        })
    }
}

/// Layer that inspects throttles after the inner service responds and adds
/// the `X-Throttle-*` headers. Never rejects and never records.
#[derive(Clone)]
pub struct ThrottleInfoLayer {
    inspector: Arc<ThrottleInspector>,
    throttles: ThrottleSet,
}

impl ThrottleInfoLayer {
    pub fn new(inspector: Arc<ThrottleInspector>, throttles: ThrottleSet) -> Self {
        Self { inspector, throttles }
    }
}

impl<S> Layer<S> for ThrottleInfoLayer {
    type Service = ThrottleInfoMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ThrottleInfoMiddleware {
            inner,
            inspector: Arc::clone(&self.inspector),
            throttles: self.throttles.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ThrottleInfoMiddleware<S> {
    inner: S,
    inspector: Arc<ThrottleInspector>,
    throttles: ThrottleSet,
}

impl<S> Service<Request<Body>> for ThrottleInfoMiddleware<S>
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
        let client = client_of(&request);
        let inspector = Arc::clone(&self.inspector);
        let throttles = self.throttles.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mut response = inner.call(request).await?;

            let report = inspector.inspect(&client, &throttles).await;
            attach_headers(response.headers_mut(), &report);

            Ok(response)
        })
    }
}

// Integration tests are in tests/throttle_test.rs.

//! Resolves the [`ClientIdentity`] of each request once and stores it in
//! the request extensions for the throttle layers and handlers.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response},
};
use std::{
    net::SocketAddr,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::auth::Authenticator;
use crate::throttle::ClientIdentity;

/// Layer que identifica al cliente con el [`Authenticator`] configurado.
#[derive(Clone)]
pub struct IdentityLayer {
    authenticator: Arc<dyn Authenticator>,
}

impl IdentityLayer {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self { authenticator }
    }
}

impl<S> Layer<S> for IdentityLayer {
    type Service = IdentityMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        IdentityMiddleware {
            inner,
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

#[derive(Clone)]
pub struct IdentityMiddleware<S> {
    inner: S,
    authenticator: Arc<dyn Authenticator>,
}

impl<S> Service<Request<Body>> for IdentityMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let client = ClientIdentity::from_headers(request.headers(), peer, self.authenticator.as_ref());

        request.extensions_mut().insert(client);
        self.inner.call(request)
    }
}

// Integration tests are in tests/throttle_test.rs.

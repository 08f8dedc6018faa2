//! Throttle classes and client identification.

use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, request::Parts};
use restkit_core::{Result, ToolkitError, derive_scope_name};
use tracing::debug;

use crate::auth::{Authenticator, StaticTokens};

/// Identifier used when no address can be determined.
pub const ANONYMOUS: &str = "anonymous";

/// Who is making a request, as far as throttling is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// User resolved from a recognised `Authorization: Token <value>`.
    pub user: Option<String>,
    pub address: String,
}

impl ClientIdentity {
    pub fn anonymous(address: impl Into<String>) -> Self {
        Self {
            user: None,
            address: address.into(),
        }
    }

    pub fn authenticated(user: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            address: address.into(),
        }
    }

    /// Reads the identity from request headers, falling back to the peer
    /// address.
    ///
    /// The client is authenticated only when `authenticator` recognises its
    /// token. Address precedence: first `X-Forwarded-For` hop, `X-Real-IP`,
    /// peer socket address, then `"anonymous"`.
    pub fn from_headers(
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
        authenticator: &dyn Authenticator,
    ) -> Self {
        let user = header_str(headers, "authorization")
            .and_then(|v| v.strip_prefix("Token "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .and_then(|token| {
                let user = authenticator.authenticate(token);
                if user.is_none() {
                    debug!("Unrecognised token, treating client as anonymous");
                }
                user
            });

        let address = header_str(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| header_str(headers, "x-real-ip").map(str::trim))
            .map(String::from)
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| ANONYMOUS.to_string());

        Self { user, address }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// User token when authenticated, address otherwise.
    pub fn ident(&self) -> &str {
        self.user.as_deref().unwrap_or(&self.address)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    /// Uses the identity resolved by `IdentityLayer`; without it the
    /// client is anonymous.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        if let Some(client) = parts.extensions.get::<ClientIdentity>() {
            return Ok(client.clone());
        }
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_headers(&parts.headers, peer, &StaticTokens::default()))
    }
}

/// A rate-limiting policy applied to requests.
pub trait Throttle: Send + Sync + fmt::Debug {
    /// Class name, e.g. `AnonRateThrottle`.
    fn class_name(&self) -> &str;

    /// Explicitly configured scope name, if any.
    fn declared_scope(&self) -> Option<&str> {
        None
    }

    /// Scope used to look up the rate: the declared one or a name derived
    /// from the class name.
    fn scope(&self) -> String {
        self.declared_scope()
            .map(String::from)
            .unwrap_or_else(|| derive_scope_name(self.class_name()))
    }

    /// Store key for the client's history, or `None` when this throttle
    /// does not apply to the client.
    fn cache_key(&self, client: &ClientIdentity, scope: &str) -> Option<String>;
}

fn history_key(scope: &str, ident: &str) -> String {
    format!("throttle_{}_{}", scope, ident)
}

/// Limits unauthenticated clients by address.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonRateThrottle;

impl Throttle for AnonRateThrottle {
    fn class_name(&self) -> &str {
        "AnonRateThrottle"
    }

    fn declared_scope(&self) -> Option<&str> {
        Some("anon")
    }

    fn cache_key(&self, client: &ClientIdentity, scope: &str) -> Option<String> {
        if client.is_authenticated() {
            return None;
        }
        Some(history_key(scope, &client.address))
    }
}

/// Limits every client, by user when authenticated.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRateThrottle;

impl Throttle for UserRateThrottle {
    fn class_name(&self) -> &str {
        "UserRateThrottle"
    }

    fn declared_scope(&self) -> Option<&str> {
        Some("user")
    }

    fn cache_key(&self, client: &ClientIdentity, scope: &str) -> Option<String> {
        Some(history_key(scope, client.ident()))
    }
}

/// Any other throttle class, identified by name (e.g. `BurstRateThrottle`).
#[derive(Debug, Clone)]
pub struct NamedRateThrottle {
    class_name: String,
    scope: Option<String>,
}

impl NamedRateThrottle {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

impl Throttle for NamedRateThrottle {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn declared_scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    fn cache_key(&self, client: &ClientIdentity, scope: &str) -> Option<String> {
        Some(history_key(scope, client.ident()))
    }
}

/// Throttles configured for a view, in declared order.
#[derive(Debug, Clone, Default)]
pub struct ThrottleSet {
    throttles: Vec<Arc<dyn Throttle>>,
}

impl ThrottleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, throttle: impl Throttle + 'static) -> Self {
        self.throttles.push(Arc::new(throttle));
        self
    }

    /// Builds a set from class names as they appear in settings.
    pub fn from_class_names(names: &[String]) -> Result<Self> {
        let mut set = Self::new();
        for name in names {
            let name = name.trim();
            set = match name {
                "" => {
                    return Err(ToolkitError::configuration(
                        "Empty throttle class name in throttle settings.",
                    ));
                },
                "AnonRateThrottle" => set.with(AnonRateThrottle),
                "UserRateThrottle" => set.with(UserRateThrottle),
                other => set.with(NamedRateThrottle::new(other)),
            };
        }
        Ok(set)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Throttle> {
        self.throttles.iter().map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.throttles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.throttles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn no_auth() -> StaticTokens {
        StaticTokens::default()
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_identity_prefers_forwarded_for() {
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.9, 10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
        ]);
        let peer = "127.0.0.1:9000".parse().ok();

        let client = ClientIdentity::from_headers(&h, peer, &no_auth());
        assert_eq!(client.address, "203.0.113.9");
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_identity_fallbacks() {
        let peer: Option<SocketAddr> = "127.0.0.1:9000".parse().ok();
        assert_eq!(
            ClientIdentity::from_headers(&headers(&[("x-real-ip", "10.0.0.2")]), peer, &no_auth()).address,
            "10.0.0.2"
        );
        assert_eq!(ClientIdentity::from_headers(&HeaderMap::new(), peer, &no_auth()).address, "127.0.0.1");
        assert_eq!(ClientIdentity::from_headers(&HeaderMap::new(), None, &no_auth()).address, ANONYMOUS);
    }

    #[test]
    fn test_identity_resolves_known_token() {
        let auth = StaticTokens::default().with_token("abc123", "alice");

        let client =
            ClientIdentity::from_headers(&headers(&[("authorization", "Token abc123")]), None, &auth);
        assert_eq!(client.user.as_deref(), Some("alice"));
        assert_eq!(client.ident(), "alice");

        let bearer =
            ClientIdentity::from_headers(&headers(&[("authorization", "Bearer abc123")]), None, &auth);
        assert!(!bearer.is_authenticated());
    }

    #[test]
    fn test_unknown_token_is_anonymous() {
        let auth = StaticTokens::default().with_token("abc123", "alice");
        let h = headers(&[("authorization", "Token forged"), ("x-real-ip", "10.0.0.7")]);

        let client = ClientIdentity::from_headers(&h, None, &auth);
        assert!(!client.is_authenticated());
        assert_eq!(client.ident(), "10.0.0.7");
        assert_eq!(
            AnonRateThrottle.cache_key(&client, "anon").as_deref(),
            Some("throttle_anon_10.0.0.7")
        );
    }

    #[test]
    fn test_anon_throttle_skips_authenticated() {
        let throttle = AnonRateThrottle;
        let anon = ClientIdentity::anonymous("1.2.3.4");
        let user = ClientIdentity::authenticated("alice", "1.2.3.4");

        assert_eq!(throttle.scope(), "anon");
        assert_eq!(
            throttle.cache_key(&anon, "anon").as_deref(),
            Some("throttle_anon_1.2.3.4")
        );
        assert!(throttle.cache_key(&user, "anon").is_none());
    }

    #[test]
    fn test_user_throttle_keys_by_user() {
        let throttle = UserRateThrottle;
        let user = ClientIdentity::authenticated("alice", "1.2.3.4");
        assert_eq!(
            throttle.cache_key(&user, "user").as_deref(),
            Some("throttle_user_alice")
        );
    }

    #[test]
    fn test_named_throttle_derives_scope() {
        assert_eq!(NamedRateThrottle::new("UserBurstRateThrottle").scope(), "user_burst");
        assert_eq!(
            NamedRateThrottle::new("UserBurstRateThrottle")
                .with_scope("burst")
                .scope(),
            "burst"
        );
    }

    #[test]
    fn test_set_from_class_names_keeps_order() {
        let names = vec![
            "UserRateThrottle".to_string(),
            "AnonRateThrottle".to_string(),
            "SustainedRateThrottle".to_string(),
        ];
        let set = ThrottleSet::from_class_names(&names).unwrap();
        let scopes: Vec<String> = set.iter().map(|t| t.scope()).collect();

        assert_eq!(scopes, vec!["user", "anon", "sustained"]);
    }

    #[test]
    fn test_set_rejects_empty_name() {
        let err = ThrottleSet::from_class_names(&[" ".to_string()]).unwrap_err();
        assert!(err.is_configuration());
    }
}

//! Cache key generation.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::extractors::query::QueryParams;

/// Number of digest bytes kept in list keys (128 bits).
const DIGEST_BYTES: usize = 16;

/// Kind of view action a cache key is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    List,
    Retrieve,
    CustomList,
    CustomDetail,
}

impl ActionKind {
    /// Resolves an action kind by name; unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "list" => Some(Self::List),
            "retrieve" => Some(Self::Retrieve),
            "custom-list" => Some(Self::CustomList),
            "custom-detail" => Some(Self::CustomDetail),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Retrieve => "retrieve",
            Self::CustomList => "custom-list",
            Self::CustomDetail => "custom-detail",
        }
    }
}

/// Key unica para una entrada del cache de respuestas.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds deterministic cache keys inside one resource namespace.
///
/// | action        | key                                   |
/// |---------------|---------------------------------------|
/// | list          | `{ns}_list_{digest}`                  |
/// | retrieve      | `{ns}_detail_{id}`                    |
/// | custom-list   | `{ns}_{action}_list_{digest}`         |
/// | custom-detail | `{ns}_{action}_detail_{id}`           |
///
/// # Examples
///
/// ```
/// use restkit_server::cache::{ActionKind, CacheKeyBuilder};
///
/// let keys = CacheKeyBuilder::new("todos");
/// let key = keys.build(ActionKind::Retrieve, Some("5"), None, None).unwrap();
/// assert_eq!(key.as_str(), "todos_detail_5");
///
/// // retrieve without an id is not cacheable
/// assert!(keys.build(ActionKind::Retrieve, None, None, None).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeyBuilder {
    namespace: String,
}

impl CacheKeyBuilder {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Builds the key for an action, or `None` when the request must not be
    /// cached (missing id for detail kinds, missing action name for custom
    /// kinds).
    pub fn build(
        &self,
        kind: ActionKind,
        entity_id: Option<&str>,
        action_name: Option<&str>,
        query: Option<&QueryParams>,
    ) -> Option<CacheKey> {
        let ns = &self.namespace;
        let key = match kind {
            ActionKind::List => format!("{}_list_{}", ns, query_digest(query)),
            ActionKind::CustomList => {
                let action = non_empty(action_name)?;
                format!("{}_{}_list_{}", ns, action, query_digest(query))
            },
            ActionKind::Retrieve => {
                let id = non_empty(entity_id)?;
                format!("{}_detail_{}", ns, id)
            },
            ActionKind::CustomDetail => {
                let action = non_empty(action_name)?;
                let id = non_empty(entity_id)?;
                format!("{}_{}_detail_{}", ns, action, id)
            },
        };
        Some(CacheKey(key))
    }

    /// Like [`build`](Self::build) but takes the action kind by name;
    /// unrecognized names are never cached.
    pub fn build_named(
        &self,
        kind: &str,
        entity_id: Option<&str>,
        action_name: Option<&str>,
        query: Option<&QueryParams>,
    ) -> Option<CacheKey> {
        self.build(ActionKind::from_name(kind)?, entity_id, action_name, query)
    }

    pub fn list(&self, query: &QueryParams) -> Option<CacheKey> {
        self.build(ActionKind::List, None, None, Some(query))
    }

    pub fn detail(&self, entity_id: &str) -> Option<CacheKey> {
        self.build(ActionKind::Retrieve, Some(entity_id), None, None)
    }

    /// Glob matching every list key of the namespace.
    pub fn list_pattern(&self) -> String {
        format!("{}_list_*", self.namespace)
    }

    /// Glob matching every list key of a custom action.
    pub fn action_list_pattern(&self, action: &str) -> String {
        format!("{}_{}_list_*", self.namespace, action)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Hex digest (first 128 bits of SHA-256) of the canonical query string.
fn query_digest(query: Option<&QueryParams>) -> String {
    let canonical = query.map(QueryParams::canonical).unwrap_or_else(|| "{}".to_string());
    let digest = Sha256::digest(canonical.as_bytes());
    hex::encode(&digest[..DIGEST_BYTES])
}

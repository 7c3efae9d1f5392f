//! Cache key derived from role flags and namespace.

use crate::registry::RoleFilter;
use std::fmt;

const SEPARATOR: char = '+';

/// Address of a service listing in the failover and snapshot stores.
///
/// Each component is percent-encoded before joining, so the separator never
/// appears inside a component and the key is safe to use as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the key for a role filter within a namespace.
    pub fn new(roles: RoleFilter, namespace: &str) -> Self {
        let providers = if roles.providers { "providers" } else { "" };
        let consumers = if roles.consumers { "consumers" } else { "" };
        let key = [providers, consumers, namespace]
            .iter()
            .map(|part| urlencoding::encode(part).into_owned())
            .collect::<Vec<_>>()
            .join(&SEPARATOR.to_string());
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let key = CacheKey::new(RoleFilter::providers_only(), "ns1");
        assert_eq!(key.as_str(), "providers++ns1");

        let key = CacheKey::new(RoleFilter::both(), "");
        assert_eq!(key.as_str(), "providers+consumers+");
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = CacheKey::new(RoleFilter::consumers_only(), "public");
        let b = CacheKey::new(RoleFilter::consumers_only(), "public");
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_roles_give_distinct_keys() {
        let keys = [
            CacheKey::new(RoleFilter::none(), "ns"),
            CacheKey::new(RoleFilter::providers_only(), "ns"),
            CacheKey::new(RoleFilter::consumers_only(), "ns"),
            CacheKey::new(RoleFilter::both(), "ns"),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_separator_in_namespace_does_not_collide() {
        // Without encoding, both of these would render as "providers++consumers+x".
        let a = CacheKey::new(RoleFilter::providers_only(), "consumers+x");
        let b = CacheKey::new(RoleFilter::both(), "x");
        assert_ne!(a, b);
        assert!(!a.as_str().ends_with("consumers+x"));
    }

    #[test]
    fn test_path_separators_are_encoded() {
        let key = CacheKey::new(RoleFilter::providers_only(), "../etc");
        assert!(!key.as_str().contains('/'));
    }
}

//! Entity identifiers and cache keys

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// Stable entity identifier
///
/// Every entity in the graph is addressed by its `Iid`. Back-references
/// between entities (override → parameter, subscription → value-set,
/// value-set → option/state) are stored as `Iid`s and looked up through
/// the [`EntityGraph`](crate::EntityGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iid(pub Uuid);

impl Iid {
    /// Generate a random identifier
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic identifier, handy for fixtures
    #[inline]
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl Default for Iid {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Iid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key under which an entity is cached
///
/// Engineering-model entities are cached per iteration, so the same
/// `iid` may appear once per loaded iteration. Site-directory entities
/// (domains, parameter types, scales) have no iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Entity identifier
    pub iid: Iid,
    /// Owning iteration, if iteration-scoped
    pub iteration: Option<Iid>,
}

impl CacheKey {
    /// Key of an iteration-scoped entity
    #[inline]
    #[must_use]
    pub const fn scoped(iid: Iid, iteration: Iid) -> Self {
        Self {
            iid,
            iteration: Some(iteration),
        }
    }

    /// Key of a site-directory entity
    #[inline]
    #[must_use]
    pub const fn unscoped(iid: Iid) -> Self {
        Self {
            iid,
            iteration: None,
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.iteration {
            Some(iteration) => write!(f, "{}@{}", self.iid, iteration),
            None => write!(f, "{}", self.iid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u128_is_stable() {
        assert_eq!(Iid::from_u128(7), Iid::from_u128(7));
        assert_ne!(Iid::from_u128(7), Iid::from_u128(8));
    }

    #[test]
    fn cache_key_display() {
        let iid = Iid::from_u128(1);
        let iteration = Iid::from_u128(2);
        assert_eq!(CacheKey::unscoped(iid).to_string(), iid.to_string());
        assert!(CacheKey::scoped(iid, iteration)
            .to_string()
            .ends_with(&iteration.to_string()));
    }
}

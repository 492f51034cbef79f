//! The entity graph / cache collaborator
//!
//! [`EntityGraph`] is the read-only view the core has of the object
//! cache. The cache is populated and kept in sync by someone else; the
//! core only looks things up. [`InMemoryCache`] is a `DashMap`-backed
//! implementation for embedders and tests.

use crate::id::{CacheKey, Iid};
use crate::parameter_type::ParameterType;
use crate::scale::MeasurementScale;
use crate::thing::{
    ActualFiniteState, ClassKind, DesignOption, ElementDefinition, ElementUsage, ParameterBase,
    Thing, ValueSet,
};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Read access to cached entities
pub trait EntityGraph: Send + Sync {
    /// Entity cached under `key`
    fn get(&self, key: &CacheKey) -> Option<Arc<Thing>>;

    /// Every entity cached for `iteration`
    ///
    /// This is a full scan of the iteration's slice of the cache.
    fn things_in(&self, iteration: Iid) -> Vec<Arc<Thing>>;

    /// Counter that changes whenever a cached entity is added, replaced
    /// or removed
    ///
    /// Anything derived from the cache (such as a model-code index) is
    /// stale once the generation it was built at differs from this.
    fn generation(&self) -> u64;
}

/// Graph inconsistencies found while following references
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Referenced entity is not cached
    #[error("{expected} {iid} is not in the cache")]
    Missing {
        /// Class that was expected
        expected: ClassKind,
        /// Referenced id
        iid: Iid,
    },

    /// Referenced entity has another class
    #[error("expected {expected} for {iid}, found {actual}")]
    UnexpectedKind {
        /// Class that was expected
        expected: ClassKind,
        /// Class found in the cache
        actual: ClassKind,
        /// Referenced id
        iid: Iid,
    },

    /// Component index outside the parameter type's components
    #[error("component {index} requested on {parameter_type}, which has {count} value(s)")]
    ComponentOutOfRange {
        /// Parameter type short name
        parameter_type: String,
        /// Requested index
        index: usize,
        /// Number of values of the type
        count: usize,
    },
}

fn lookup<T, F>(
    graph: &(impl EntityGraph + ?Sized),
    key: CacheKey,
    expected: ClassKind,
    pick: F,
) -> Result<T, GraphError>
where
    T: Clone,
    F: FnOnce(&Thing) -> Option<&T>,
{
    let thing = graph.get(&key).ok_or(GraphError::Missing {
        expected,
        iid: key.iid,
    })?;
    pick(&thing).cloned().ok_or(GraphError::UnexpectedKind {
        expected,
        actual: thing.class_kind(),
        iid: key.iid,
    })
}

/// Typed lookups on top of [`EntityGraph`]
///
/// Each lookup returns an owned copy of the entity; entities are small
/// and the cache keeps the authoritative `Arc`.
pub trait GraphExt: EntityGraph {
    /// Any entity
    ///
    /// # Errors
    /// [`GraphError::Missing`] when nothing is cached under the key
    fn thing(&self, key: CacheKey, expected: ClassKind) -> Result<Arc<Thing>, GraphError> {
        self.get(&key).ok_or(GraphError::Missing {
            expected,
            iid: key.iid,
        })
    }

    /// Parameter type (site directory)
    ///
    /// # Errors
    /// Missing or wrong-class entity
    fn parameter_type(&self, iid: Iid) -> Result<ParameterType, GraphError> {
        lookup(self, CacheKey::unscoped(iid), ClassKind::ParameterType, |t| match t {
            Thing::ParameterType(pt) => Some(pt),
            _ => None,
        })
    }

    /// Measurement scale (site directory)
    ///
    /// # Errors
    /// Missing or wrong-class entity
    fn scale(&self, iid: Iid) -> Result<MeasurementScale, GraphError> {
        lookup(self, CacheKey::unscoped(iid), ClassKind::MeasurementScale, |t| match t {
            Thing::MeasurementScale(s) => Some(s),
            _ => None,
        })
    }

    /// Option
    ///
    /// # Errors
    /// Missing or wrong-class entity
    fn option(&self, iid: Iid, iteration: Iid) -> Result<DesignOption, GraphError> {
        lookup(self, CacheKey::scoped(iid, iteration), ClassKind::Option, |t| match t {
            Thing::Option(o) => Some(o),
            _ => None,
        })
    }

    /// Actual finite state
    ///
    /// # Errors
    /// Missing or wrong-class entity
    fn actual_state(&self, iid: Iid, iteration: Iid) -> Result<ActualFiniteState, GraphError> {
        lookup(
            self,
            CacheKey::scoped(iid, iteration),
            ClassKind::ActualFiniteState,
            |t| match t {
                Thing::ActualFiniteState(s) => Some(s),
                _ => None,
            },
        )
    }

    /// Element definition
    ///
    /// # Errors
    /// Missing or wrong-class entity
    fn element_definition(&self, iid: Iid, iteration: Iid) -> Result<ElementDefinition, GraphError> {
        lookup(
            self,
            CacheKey::scoped(iid, iteration),
            ClassKind::ElementDefinition,
            |t| match t {
                Thing::ElementDefinition(e) => Some(e),
                _ => None,
            },
        )
    }

    /// Element usage
    ///
    /// # Errors
    /// Missing or wrong-class entity
    fn element_usage(&self, iid: Iid, iteration: Iid) -> Result<ElementUsage, GraphError> {
        lookup(
            self,
            CacheKey::scoped(iid, iteration),
            ClassKind::ElementUsage,
            |t| match t {
                Thing::ElementUsage(u) => Some(u),
                _ => None,
            },
        )
    }

    /// Parameter, override or subscription
    ///
    /// # Errors
    /// Missing or wrong-class entity
    fn parameter_base(&self, iid: Iid, iteration: Iid) -> Result<ParameterBase, GraphError> {
        lookup(
            self,
            CacheKey::scoped(iid, iteration),
            ClassKind::Parameter,
            Thing::as_parameter_base,
        )
    }

    /// Value-set of any variant
    ///
    /// # Errors
    /// Missing or wrong-class entity
    fn value_set(&self, iid: Iid, iteration: Iid) -> Result<ValueSet, GraphError> {
        lookup(
            self,
            CacheKey::scoped(iid, iteration),
            ClassKind::ParameterValueSet,
            Thing::as_value_set,
        )
    }
}

impl<G: EntityGraph + ?Sized> GraphExt for G {}

/// Concurrent in-memory cache keyed by [`CacheKey`]
#[derive(Debug, Default)]
pub struct InMemoryCache {
    things: DashMap<CacheKey, Arc<Thing>>,
    generation: AtomicU64,
}

impl InMemoryCache {
    /// Empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache `thing` for `iteration`
    ///
    /// Site-directory things are always cached unscoped, whatever
    /// `iteration` says. Returns the previously cached entity, if any.
    pub fn insert(&self, thing: Thing, iteration: Iid) -> Option<Arc<Thing>> {
        let key = if thing.is_iteration_scoped() {
            CacheKey::scoped(thing.iid(), iteration)
        } else {
            CacheKey::unscoped(thing.iid())
        };
        let previous = self.things.insert(key, Arc::new(thing));
        self.generation.fetch_add(1, Ordering::AcqRel);
        previous
    }

    /// Remove the entity cached under `key`
    pub fn remove(&self, key: &CacheKey) -> Option<Arc<Thing>> {
        let removed = self.things.remove(key).map(|(_, thing)| thing);
        if removed.is_some() {
            self.generation.fetch_add(1, Ordering::AcqRel);
        }
        removed
    }

    /// Number of cached entities
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.things.len()
    }

    /// True when nothing is cached
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.things.is_empty()
    }
}

impl EntityGraph for InMemoryCache {
    fn get(&self, key: &CacheKey) -> Option<Arc<Thing>> {
        self.things.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn things_in(&self, iteration: Iid) -> Vec<Arc<Thing>> {
        self.things
            .iter()
            .filter(|entry| entry.key().iteration == Some(iteration))
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter_type::ScalarKind;
    use crate::thing::DomainOfExpertise;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_scopes_by_class() {
        let cache = InMemoryCache::new();
        let iteration = Iid::from_u128(100);
        let pt = ParameterType::simple(Iid::from_u128(1), "mass", ScalarKind::Quantity);
        let option = DesignOption {
            iid: Iid::from_u128(2),
            short_name: "opt".into(),
        };

        cache.insert(Thing::ParameterType(pt.clone()), iteration);
        cache.insert(Thing::Option(option.clone()), iteration);

        assert_eq!(cache.parameter_type(pt.iid).unwrap(), pt);
        assert_eq!(cache.option(option.iid, iteration).unwrap(), option);
        assert_eq!(cache.things_in(iteration).len(), 1);
    }

    #[test]
    fn lookup_reports_missing_and_wrong_kind() {
        let cache = InMemoryCache::new();
        let iteration = Iid::from_u128(100);
        let domain = Iid::from_u128(3);
        cache.insert(
            Thing::DomainOfExpertise(DomainOfExpertise {
                iid: domain,
                short_name: "SYS".into(),
                name: "System".into(),
            }),
            iteration,
        );

        assert!(matches!(
            cache.scale(Iid::from_u128(9)),
            Err(GraphError::Missing { .. })
        ));
        assert!(matches!(
            cache.parameter_type(domain),
            Err(GraphError::UnexpectedKind {
                actual: ClassKind::DomainOfExpertise,
                ..
            })
        ));
    }

    #[test]
    fn generation_moves_on_every_change() {
        let cache = InMemoryCache::new();
        let iteration = Iid::from_u128(100);
        let option = Thing::Option(DesignOption {
            iid: Iid::from_u128(2),
            short_name: "opt".into(),
        });
        assert_eq!(cache.generation(), 0);

        cache.insert(option.clone(), iteration);
        let after_insert = cache.generation();
        assert!(after_insert > 0);

        cache.insert(option, iteration);
        assert!(cache.generation() > after_insert);

        let before_remove = cache.generation();
        assert!(cache.remove(&CacheKey::unscoped(Iid::from_u128(9))).is_none());
        assert_eq!(cache.generation(), before_remove);
        assert!(cache
            .remove(&CacheKey::scoped(Iid::from_u128(2), iteration))
            .is_some());
        assert!(cache.generation() > before_remove);
    }

    #[test]
    fn things_in_filters_other_iterations() {
        let cache = InMemoryCache::new();
        let a = Iid::from_u128(100);
        let b = Iid::from_u128(200);
        let option = |n| {
            Thing::Option(DesignOption {
                iid: Iid::from_u128(n),
                short_name: format!("opt{n}"),
            })
        };
        cache.insert(option(1), a);
        cache.insert(option(2), a);
        cache.insert(option(1), b);

        assert_eq!(cache.things_in(a).len(), 2);
        assert_eq!(cache.things_in(b).len(), 1);
        assert_eq!(cache.len(), 3);
    }
}

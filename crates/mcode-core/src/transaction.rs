//! Transaction building
//!
//! An update hands exactly one detached entity to a [`ThingTransaction`].
//! The transaction records whether it is a create or an update, the
//! content hash of the cached original the change is based on, and the
//! containment route of the entity. [`ThingTransaction::finalize`]
//! produces the [`OperationContainer`] given to the write collaborator.

use crate::error::ServiceError;
use mcode_model::{CacheKey, ClassKind, ContentHash, EntityGraph, Iid, Thing};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// Longest containment chain followed before assuming a cycle
const MAX_ROUTE_DEPTH: usize = 16;

/// One step of a containment route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSegment {
    /// Class of the container
    pub class: ClassKind,
    /// Container id
    pub iid: Iid,
}

/// Where in the graph a transaction applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionContext {
    /// Iteration the change belongs to
    pub iteration: Iid,
    /// Containers from the iteration down to the entity's direct container
    pub route: Vec<RouteSegment>,
}

impl TransactionContext {
    /// Resolve the context of `thing` by following its container chain
    ///
    /// # Errors
    /// [`ServiceError::MalformedGraph`] when a container is missing or the
    /// chain does not end at `iteration`
    pub fn resolve(
        graph: &(impl EntityGraph + ?Sized),
        iteration: Iid,
        thing: &Thing,
    ) -> Result<Self, ServiceError> {
        let mut route = Vec::new();
        let mut next = thing.container();

        while let Some(container) = next {
            if route.len() >= MAX_ROUTE_DEPTH {
                return Err(ServiceError::MalformedGraph(format!(
                    "containment of {} deeper than {MAX_ROUTE_DEPTH}",
                    thing.iid()
                )));
            }
            if container == iteration {
                route.push(RouteSegment {
                    class: ClassKind::Iteration,
                    iid: iteration,
                });
                route.reverse();
                return Ok(Self { iteration, route });
            }
            let parent = graph
                .get(&CacheKey::scoped(container, iteration))
                .ok_or_else(|| {
                    ServiceError::MalformedGraph(format!(
                        "container {container} of {} is not cached",
                        thing.iid()
                    ))
                })?;
            route.push(RouteSegment {
                class: parent.class_kind(),
                iid: container,
            });
            next = parent.container();
        }

        Err(ServiceError::MalformedGraph(format!(
            "{} {} is not contained in iteration {iteration}",
            thing.class_kind(),
            thing.iid()
        )))
    }
}

impl Display for TransactionContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for segment in &self.route {
            write!(f, "/{}/{}", segment.class, segment.iid)?;
        }
        Ok(())
    }
}

/// Create or update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    /// Entity not cached yet
    Create,
    /// Entity replaces its cached original
    Update,
}

/// One change in a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Create or update
    pub kind: OperationKind,
    /// Hash of the cached original, for optimistic concurrency
    pub base_hash: Option<ContentHash>,
    /// Hash of `thing`
    pub new_hash: ContentHash,
    /// The changed entity
    pub thing: Thing,
}

/// Changes scoped to one transaction context
#[derive(Debug, Clone, PartialEq)]
pub struct ThingTransaction {
    context: TransactionContext,
    operations: Vec<Operation>,
}

impl ThingTransaction {
    /// Empty transaction in `context`
    #[inline]
    #[must_use]
    pub fn new(context: TransactionContext) -> Self {
        Self {
            context,
            operations: Vec::new(),
        }
    }

    /// Context
    #[inline]
    #[must_use]
    pub fn context(&self) -> &TransactionContext {
        &self.context
    }

    /// Add `thing`, as an update when its original is cached
    ///
    /// A thing already in the transaction is replaced.
    ///
    /// # Errors
    /// [`ServiceError::MalformedGraph`] when hashing fails
    pub fn create_or_update(
        &mut self,
        graph: &(impl EntityGraph + ?Sized),
        thing: Thing,
    ) -> Result<(), ServiceError> {
        let key = if thing.is_iteration_scoped() {
            CacheKey::scoped(thing.iid(), self.context.iteration)
        } else {
            CacheKey::unscoped(thing.iid())
        };

        let (kind, base_hash) = match graph.get(&key) {
            Some(original) => (OperationKind::Update, Some(ContentHash::of(&*original)?)),
            None => (OperationKind::Create, None),
        };
        let operation = Operation {
            kind,
            base_hash,
            new_hash: ContentHash::of(&thing)?,
            thing,
        };

        let iid = operation.thing.iid();
        match self.operations.iter_mut().find(|op| op.thing.iid() == iid) {
            Some(existing) => *existing = operation,
            None => self.operations.push(operation),
        }
        Ok(())
    }

    /// Number of operations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// True when nothing was added
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Finish the transaction
    #[must_use]
    pub fn finalize(self) -> OperationContainer {
        OperationContainer {
            id: Uuid::new_v4(),
            context: self.context,
            operations: self.operations,
        }
    }
}

/// Finalized transaction, ready for the write collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationContainer {
    /// Container id
    pub id: Uuid,
    /// Context of every operation
    pub context: TransactionContext,
    /// Operations in insertion order
    pub operations: Vec<Operation>,
}

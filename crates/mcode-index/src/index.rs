//! Model-code index with radix tree
//!
//! Provides [`ModelCodeIndex`]: one radix trie per iteration mapping the
//! lowercased model code of every value-set component to the value-sets
//! carrying it. Tries are built on first use and rebuilt when the cache
//! generation moves on or the iteration is explicitly invalidated.

use dashmap::DashMap;
use mcode_model::{normalize, EntityGraph, GraphError, Iid, ModelCoder, Thing};
use radix_trie::{Trie, TrieCommon};
use std::sync::Arc;

/// One value-set component carrying an indexed code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexHit {
    /// Value-set id
    pub value_set: Iid,
    /// Component index within the value-set
    pub component: usize,
}

/// Index of a single iteration
#[derive(Debug)]
pub struct IterationIndex {
    trie: Trie<String, Vec<IndexHit>>,
    value_sets: usize,
    generation: u64,
}

impl IterationIndex {
    /// Build by computing the code of every value-set component in
    /// `iteration`
    ///
    /// # Errors
    /// Any value-set whose code cannot be computed fails the build
    pub fn build(graph: &(impl EntityGraph + ?Sized), iteration: Iid) -> Result<Self, GraphError> {
        let coder = ModelCoder::new(graph, iteration);
        let mut index = Self {
            trie: Trie::new(),
            value_sets: 0,
            generation: graph.generation(),
        };

        for thing in graph.things_in(iteration) {
            let Thing::ValueSet(value_set) = &*thing else {
                continue;
            };
            for (component, code) in coder.value_set_codes(value_set)?.into_iter().enumerate() {
                let hit = IndexHit {
                    value_set: value_set.iid(),
                    component,
                };
                let key = normalize(&code);
                match index.trie.get_mut(&key) {
                    Some(hits) => hits.push(hit),
                    None => {
                        index.trie.insert(key, vec![hit]);
                    }
                }
            }
            index.value_sets += 1;
        }

        Ok(index)
    }

    /// Hits for `model_code` (case-insensitive)
    #[must_use]
    pub fn get(&self, model_code: &str) -> &[IndexHit] {
        self.trie
            .get(&normalize(model_code))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Indexed codes starting with `prefix`, lowercased and sorted
    #[must_use]
    pub fn codes_under(&self, prefix: &str) -> Vec<String> {
        let prefix = normalize(prefix);
        let mut codes: Vec<String> = self
            .trie
            .get_raw_descendant(&prefix)
            .map(|subtrie| {
                subtrie
                    .keys()
                    .filter(|code| code.starts_with(&prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        codes.sort();
        codes
    }

    /// Number of distinct codes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    /// True when the iteration has no value-sets
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Number of value-sets indexed
    #[inline]
    #[must_use]
    pub fn value_set_count(&self) -> usize {
        self.value_sets
    }

    /// Cache generation read before the build started
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Per-iteration model-code indexes
///
/// Concurrent readers share the built tries through `Arc`. Two threads
/// racing on the first lookup of an iteration may both build; the first
/// insert wins and the result is identical either way.
#[derive(Debug, Default)]
pub struct ModelCodeIndex {
    iterations: DashMap<Iid, Arc<IterationIndex>>,
}

impl ModelCodeIndex {
    /// Create empty index
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index for `iteration`, building it from `graph` on first use and
    /// rebuilding it once the graph's generation has moved on
    ///
    /// # Errors
    /// The build failed on a broken reference
    pub fn iteration(
        &self,
        graph: &(impl EntityGraph + ?Sized),
        iteration: Iid,
    ) -> Result<Arc<IterationIndex>, GraphError> {
        let current = graph.generation();
        if let Some(index) = self.iterations.get(&iteration) {
            if index.generation() == current {
                return Ok(Arc::clone(index.value()));
            }
            tracing::debug!(
                "Model-code index of iteration {} is stale (generation {} < {})",
                iteration,
                index.generation(),
                current
            );
        }

        let built = Arc::new(IterationIndex::build(graph, iteration)?);
        tracing::debug!(
            "Indexed {} value-sets ({} codes) for iteration {}",
            built.value_set_count(),
            built.len(),
            iteration
        );
        let mut entry = self.iterations.entry(iteration).or_insert_with(|| Arc::clone(&built));
        if entry.generation() < built.generation() {
            *entry = Arc::clone(&built);
        }
        Ok(Arc::clone(entry.value()))
    }

    /// Value-sets carrying `model_code` in `iteration`, deduplicated
    ///
    /// # Errors
    /// The iteration index could not be built
    pub fn lookup(
        &self,
        graph: &(impl EntityGraph + ?Sized),
        iteration: Iid,
        model_code: &str,
    ) -> Result<Vec<Iid>, GraphError> {
        let index = self.iteration(graph, iteration)?;
        let mut value_sets: Vec<Iid> = index.get(model_code).iter().map(|h| h.value_set).collect();
        value_sets.sort();
        value_sets.dedup();
        Ok(value_sets)
    }

    /// Indexed codes of `iteration` starting with `prefix`
    ///
    /// # Errors
    /// The iteration index could not be built
    pub fn codes_under(
        &self,
        graph: &(impl EntityGraph + ?Sized),
        iteration: Iid,
        prefix: &str,
    ) -> Result<Vec<String>, GraphError> {
        Ok(self.iteration(graph, iteration)?.codes_under(prefix))
    }

    /// Drop the index of `iteration`, to be rebuilt on next use
    ///
    /// Returns true when an index was dropped.
    pub fn invalidate(&self, iteration: Iid) -> bool {
        let dropped = self.iterations.remove(&iteration).is_some();
        if dropped {
            tracing::debug!("Invalidated model-code index of iteration {}", iteration);
        }
        dropped
    }

    /// True when `iteration` has a built index
    #[inline]
    #[must_use]
    pub fn is_loaded(&self, iteration: Iid) -> bool {
        self.iterations.contains_key(&iteration)
    }
}

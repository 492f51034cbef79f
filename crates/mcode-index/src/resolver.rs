//! Model-code resolution
//!
//! [`ModelCodeResolver`] finds every entity of an iteration whose computed
//! model code matches a string, either by scanning the cache or through
//! the [`ModelCodeIndex`]. [`resolve`] then picks exactly one candidate:
//!
//! 1. no candidate: not found
//! 2. one candidate: that one
//! 3. with subscription preference and a known domain: the first
//!    subscription owned by that domain, if any
//! 4. otherwise the single parameter / override candidate
//!
//! Two parameter / override candidates for one code cannot exist in a
//! consistent graph and are reported as [`ResolveError::Ambiguous`].

use crate::index::ModelCodeIndex;
use mcode_model::{
    codes_match, ElementDefinition, ElementUsage, EntityGraph, GraphError, GraphExt, Iid,
    ModelCoder, OwnedThing, ParameterBase, Thing, ValueSet,
};
use std::sync::Arc;

/// Resolution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Nothing usable carries the code
    #[error("no {what} found for model code {model_code}")]
    NotFound {
        /// Kind of entity looked for
        what: &'static str,
        /// Code that was looked up
        model_code: String,
    },

    /// Several parameter / override candidates carry the same code
    #[error("{count} parameter/override candidates carry model code {model_code}")]
    Ambiguous {
        /// Code that was looked up
        model_code: String,
        /// Number of non-subscription candidates
        count: usize,
    },

    /// Broken reference met while computing codes
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Entity that can compete for a model code
pub trait Candidate: OwnedThing {
    /// True for subscriptions and subscription value-sets
    fn is_subscription(&self) -> bool;

    /// Name used in errors and logs
    fn what() -> &'static str;
}

impl Candidate for ValueSet {
    fn is_subscription(&self) -> bool {
        ValueSet::is_subscription(self)
    }

    fn what() -> &'static str {
        "value-set"
    }
}

impl Candidate for ParameterBase {
    fn is_subscription(&self) -> bool {
        ParameterBase::is_subscription(self)
    }

    fn what() -> &'static str {
        "parameter"
    }
}

/// Pick the one candidate a caller in `domain` means by `model_code`
///
/// # Errors
/// [`ResolveError::NotFound`] when nothing qualifies and
/// [`ResolveError::Ambiguous`] when the graph is inconsistent
pub fn resolve<C: Candidate>(
    model_code: &str,
    mut candidates: Vec<C>,
    domain: Option<Iid>,
    prefer_subscription: bool,
) -> Result<C, ResolveError> {
    let not_found = || ResolveError::NotFound {
        what: C::what(),
        model_code: model_code.to_string(),
    };

    if candidates.len() <= 1 {
        return candidates.pop().ok_or_else(not_found);
    }

    if let (true, Some(domain)) = (prefer_subscription, domain) {
        if let Some(position) = candidates
            .iter()
            .position(|c| c.is_subscription() && c.owner() == domain)
        {
            tracing::debug!(
                "Model code {} resolved to subscription {} of domain {}",
                model_code,
                candidates[position].iid(),
                domain
            );
            return Ok(candidates.swap_remove(position));
        }
    }

    let mut base: Vec<C> = candidates
        .into_iter()
        .filter(|c| !c.is_subscription())
        .collect();
    match base.len() {
        0 => Err(not_found()),
        1 => Ok(base.remove(0)),
        count => Err(ResolveError::Ambiguous {
            model_code: model_code.to_string(),
            count,
        }),
    }
}

/// How candidate value-sets are found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Linear scan of the iteration's cached things
    Scan,
    /// Per-iteration radix trie
    #[default]
    Indexed,
}

/// Element definition or usage found by code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementRef {
    /// Element definition
    Definition(ElementDefinition),
    /// Element usage
    Usage(ElementUsage),
}

impl ElementRef {
    /// Identifier
    #[must_use]
    pub fn iid(&self) -> Iid {
        match self {
            Self::Definition(d) => d.iid,
            Self::Usage(u) => u.iid,
        }
    }

    /// Short name
    #[must_use]
    pub fn short_name(&self) -> &str {
        match self {
            Self::Definition(d) => &d.short_name,
            Self::Usage(u) => &u.short_name,
        }
    }
}

/// Finds and disambiguates entities by model code
#[derive(Clone)]
pub struct ModelCodeResolver {
    graph: Arc<dyn EntityGraph>,
    index: Arc<ModelCodeIndex>,
    strategy: Strategy,
}

impl std::fmt::Debug for ModelCodeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCodeResolver")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl ModelCodeResolver {
    /// Indexed resolver over `graph`
    #[must_use]
    pub fn new(graph: Arc<dyn EntityGraph>, index: Arc<ModelCodeIndex>) -> Self {
        Self {
            graph,
            index,
            strategy: Strategy::Indexed,
        }
    }

    /// Builder: set strategy
    #[inline]
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Graph being resolved against
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &Arc<dyn EntityGraph> {
        &self.graph
    }

    /// Index used by [`Strategy::Indexed`]
    #[inline]
    #[must_use]
    pub fn index(&self) -> &ModelCodeIndex {
        &self.index
    }

    /// Active strategy
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Every value-set of `iteration` with a component coded `model_code`,
    /// ordered by id
    ///
    /// # Errors
    /// A broken reference was met while computing codes
    pub fn find_value_sets(
        &self,
        iteration: Iid,
        model_code: &str,
    ) -> Result<Vec<ValueSet>, ResolveError> {
        let graph = &*self.graph;
        let mut found = match self.strategy {
            Strategy::Indexed => self
                .index
                .lookup(graph, iteration, model_code)?
                .into_iter()
                .map(|iid| graph.value_set(iid, iteration))
                .collect::<Result<Vec<_>, _>>()?,
            Strategy::Scan => {
                let coder = ModelCoder::new(graph, iteration);
                let mut found = Vec::new();
                for thing in graph.things_in(iteration) {
                    let Thing::ValueSet(value_set) = &*thing else {
                        continue;
                    };
                    if coder
                        .value_set_codes(value_set)?
                        .iter()
                        .any(|code| codes_match(code, model_code))
                    {
                        found.push(value_set.clone());
                    }
                }
                found
            }
        };
        found.sort_by_key(ValueSet::iid);
        tracing::trace!(
            "{} value-set candidate(s) for {} ({:?})",
            found.len(),
            model_code,
            self.strategy
        );
        Ok(found)
    }

    /// Every parameter, override or subscription of `iteration` coded
    /// `model_code`, ordered by id
    ///
    /// Compound parameters match on their own code, without component.
    ///
    /// # Errors
    /// A broken reference was met while computing codes
    pub fn find_parameters(
        &self,
        iteration: Iid,
        model_code: &str,
    ) -> Result<Vec<ParameterBase>, ResolveError> {
        let graph = &*self.graph;
        let coder = ModelCoder::new(graph, iteration);
        let mut found = Vec::new();
        for thing in graph.things_in(iteration) {
            let Thing::ParameterBase(parameter) = &*thing else {
                continue;
            };
            if codes_match(&coder.parameter_base(parameter, None)?, model_code) {
                found.push(parameter.clone());
            }
        }
        found.sort_by_key(ParameterBase::iid);
        Ok(found)
    }

    /// The element definition or usage coded `model_code`
    ///
    /// # Errors
    /// A usage's containing definition is missing
    pub fn find_element(
        &self,
        iteration: Iid,
        model_code: &str,
    ) -> Result<Option<ElementRef>, ResolveError> {
        let graph = &*self.graph;
        let coder = ModelCoder::new(graph, iteration);
        let mut things = graph.things_in(iteration);
        things.sort_by_key(|thing| thing.iid());

        for thing in things {
            let found = match &*thing {
                Thing::ElementDefinition(definition) => {
                    codes_match(&coder.element_definition(definition), model_code)
                        .then(|| ElementRef::Definition(definition.clone()))
                }
                Thing::ElementUsage(usage) => codes_match(&coder.element_usage(usage)?, model_code)
                    .then(|| ElementRef::Usage(usage.clone())),
                _ => None,
            };
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }

    /// Find and disambiguate the value-set coded `model_code`
    ///
    /// # Errors
    /// See [`resolve`]
    pub fn value_set(
        &self,
        iteration: Iid,
        model_code: &str,
        domain: Option<Iid>,
        prefer_subscription: bool,
    ) -> Result<ValueSet, ResolveError> {
        let candidates = self.find_value_sets(iteration, model_code)?;
        resolve(model_code, candidates, domain, prefer_subscription)
    }

    /// Find and disambiguate the parameter coded `model_code`
    ///
    /// # Errors
    /// See [`resolve`]
    pub fn parameter(
        &self,
        iteration: Iid,
        model_code: &str,
        domain: Option<Iid>,
        prefer_subscription: bool,
    ) -> Result<ParameterBase, ResolveError> {
        let candidates = self.find_parameters(iteration, model_code)?;
        resolve(model_code, candidates, domain, prefer_subscription)
    }
}

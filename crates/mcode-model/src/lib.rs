//! mcode Model
//!
//! Entities of the cached engineering-data graph and the pure functions
//! computed over them.
//!
//! # Overview
//!
//! - **Thing**: closed enum over every cached entity; [`ParameterBase`]
//!   and [`ValueSet`] are the polymorphic families updates work on
//! - **EntityGraph**: read-only cache collaborator, with
//!   [`InMemoryCache`] as the bundled `DashMap` implementation
//! - **ModelCoder**: computes model codes such as `ed1.usage.mass\opt`
//! - **ParameterType**: scalar / compound types and value validation
//! - **ContentHash**: blake3 hash of an entity, used as the base hash of
//!   an update
//!
//! # Example
//!
//! ```rust
//! use mcode_model::{DesignOption, EntityGraph, GraphExt, Iid, InMemoryCache, Thing};
//!
//! let cache = InMemoryCache::new();
//! let iteration = Iid::new();
//! let option = DesignOption { iid: Iid::new(), short_name: "opt".into() };
//! cache.insert(Thing::Option(option.clone()), iteration);
//!
//! assert_eq!(cache.option(option.iid, iteration).unwrap(), option);
//! assert_eq!(cache.things_in(iteration).len(), 1);
//! ```

#![warn(missing_docs)]

pub mod graph;
pub mod hash;
pub mod id;
pub mod model_code;
pub mod parameter_type;
pub mod scale;
pub mod thing;
pub mod value;

// Re-exports
pub use graph::{EntityGraph, GraphError, GraphExt, InMemoryCache};
pub use hash::{ContentHash, HashError};
pub use id::{CacheKey, Iid};
pub use model_code::{codes_match, normalize, ModelCoder};
pub use parameter_type::{
    ParameterType, ParameterTypeComponent, ParameterTypeKind, ScalarKind, ValidationResult,
    ValidationResultKind,
};
pub use scale::{MeasurementScale, NumberSetKind, ScaleBound, ScaleKind};
pub use thing::{
    ActualFiniteState, ClassKind, DesignOption, DomainOfExpertise, ElementDefinition,
    ElementUsage, Iteration, OwnedThing, Parameter, ParameterBase, ParameterCore,
    ParameterOverride, ParameterOverrideValueSet, ParameterSubscription,
    ParameterSubscriptionValueSet, ParameterValueSetBase, Thing, ValueSet,
};
pub use value::{SwitchKind, ValueArray, ValueSlot, NO_VALUE};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for graph work
    pub use crate::{
        CacheKey, ClassKind, EntityGraph, GraphError, GraphExt, Iid, InMemoryCache, ModelCoder,
        OwnedThing, ParameterBase, SwitchKind, Thing, ValueArray, ValueSet, ValueSlot,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! mcode Index
//!
//! Model-code lookup over the cached graph.
//!
//! # Overview
//!
//! - **ModelCodeIndex**: radix tree per iteration, lowercased model code
//!   to value-set components
//! - **ModelCodeResolver**: finds candidates by scan or index and picks
//!   the one the caller's domain means
//!
//! # Example
//!
//! ```rust
//! use mcode_index::{ModelCodeIndex, ModelCodeResolver, Strategy};
//! use mcode_model::{Iid, InMemoryCache};
//! use std::sync::Arc;
//!
//! let resolver = ModelCodeResolver::new(
//!     Arc::new(InMemoryCache::new()),
//!     Arc::new(ModelCodeIndex::new()),
//! )
//! .with_strategy(Strategy::Scan);
//!
//! let found = resolver.find_value_sets(Iid::new(), "ed1.mass").unwrap();
//! assert!(found.is_empty());
//! ```

#![warn(missing_docs)]

pub mod index;
pub mod resolver;

// Re-exports
pub use index::{IndexHit, IterationIndex, ModelCodeIndex};
pub use resolver::{resolve, Candidate, ElementRef, ModelCodeResolver, ResolveError, Strategy};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for resolution
    pub use crate::{ModelCodeIndex, ModelCodeResolver, ResolveError, Strategy};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! mcode Core
//!
//! Read and write values of a cached engineering-data graph by model code.
//!
//! # Overview
//!
//! - **DataReadService**: elements, parameters and values by model code,
//!   seen through the caller's domain
//! - **DataWriteService**: validated, permission-gated single-value
//!   updates, submitted as one transaction to a [`WriteCollaborator`]
//! - **ServiceConfig**: write timeout and lookup strategy, from code or TOML
//!
//! # Example
//!
//! ```rust
//! use mcode_core::prelude::*;
//! use mcode_model::{Iid, InMemoryCache};
//! use std::sync::Arc;
//!
//! let iteration = Iid::new();
//! let session = Arc::new(StaticSession::new().with_iteration(iteration, Iid::new()));
//! let reads = DataReadService::new(
//!     Arc::new(InMemoryCache::new()),
//!     session,
//!     ServiceConfig::default(),
//! );
//!
//! let error = reads.domain_actual_value(iteration, "sat.mass").unwrap_err();
//! assert_eq!(error.kind(), ErrorKind::NotFound);
//! ```

#![warn(missing_docs)]

pub mod accessor;
pub mod config;
pub mod error;
pub mod read;
pub mod session;
pub mod transaction;
pub mod write;
pub mod writer;

// Re-exports
pub use accessor::ValueAccessor;
pub use config::ServiceConfig;
pub use error::{ErrorKind, ServiceError};
pub use read::DataReadService;
pub use session::{OpenIteration, SessionContext, StaticSession};
pub use transaction::{
    Operation, OperationContainer, OperationKind, RouteSegment, ThingTransaction,
    TransactionContext,
};
pub use write::{DataWriteService, UpdateStage};
pub use writer::{TransportError, WriteCollaborator};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for model-code services
    pub use crate::{
        DataReadService, DataWriteService, ErrorKind, ServiceConfig, ServiceError,
        SessionContext, StaticSession, WriteCollaborator,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! mcode Access
//!
//! Ownership and permission checks in front of every value-set write.
//!
//! # Overview
//!
//! - **PermissionService**: the permission collaborator, with
//!   [`AllowAll`] and [`DomainPermissions`] bundled
//! - **WriteGuard**: owner equals current domain, and the permission
//!   service agrees

#![warn(missing_docs)]

pub mod guard;
pub mod permission;

// Re-exports
pub use guard::{AccessDenied, WriteGuard};
pub use permission::{AccessRight, AllowAll, DomainPermissions, PermissionService};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

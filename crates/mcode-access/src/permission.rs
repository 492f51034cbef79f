//! Permission collaborator
//!
//! [`PermissionService`] answers whether the current participant may write
//! a given entity. How rights are obtained (person role, participant role,
//! server) is the embedder's business; two simple implementations are
//! bundled.

use mcode_model::{ClassKind, Iid, OwnedThing};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Write permission check
pub trait PermissionService: Send + Sync {
    /// True when the current participant may write `thing`
    fn can_write(&self, thing: &(dyn OwnedThing + 'static)) -> bool;
}

/// Grants every write
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionService for AllowAll {
    fn can_write(&self, _thing: &(dyn OwnedThing + 'static)) -> bool {
        true
    }
}

/// Access right of a participant on a class of entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessRight {
    /// No access
    None,
    /// Read only
    #[default]
    ReadOnly,
    /// Write when owned by one of the participant's domains
    ModifyIfOwner,
    /// Write unconditionally
    Modify,
}

/// Rights per class for a participant acting for a set of domains
#[derive(Debug, Clone, Default)]
pub struct DomainPermissions {
    domains: HashSet<Iid>,
    rights: HashMap<ClassKind, AccessRight>,
    default: AccessRight,
}

impl DomainPermissions {
    /// Participant acting for `domains`, read-only on everything
    #[must_use]
    pub fn new(domains: impl IntoIterator<Item = Iid>) -> Self {
        Self {
            domains: domains.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Builder: right on one class
    #[must_use]
    pub fn with_right(mut self, class: ClassKind, right: AccessRight) -> Self {
        self.rights.insert(class, right);
        self
    }

    /// Builder: right on classes without an explicit entry
    #[must_use]
    pub fn with_default(mut self, right: AccessRight) -> Self {
        self.default = right;
        self
    }

    /// Right on `class`
    #[must_use]
    pub fn right(&self, class: ClassKind) -> AccessRight {
        self.rights.get(&class).copied().unwrap_or(self.default)
    }
}

impl PermissionService for DomainPermissions {
    fn can_write(&self, thing: &(dyn OwnedThing + 'static)) -> bool {
        match self.right(thing.class_kind()) {
            AccessRight::None | AccessRight::ReadOnly => false,
            AccessRight::ModifyIfOwner => self.domains.contains(&thing.owner()),
            AccessRight::Modify => true,
        }
    }
}

//! Ownership and permission guard
//!
//! A value-set may only be written by the domain that owns it, and only
//! when the permission collaborator agrees. Callers learn that a write
//! was denied, never why; the cause goes to the debug log.

use crate::permission::PermissionService;
use mcode_model::{Iid, OwnedThing};
use std::fmt::{self, Display, Formatter};

/// Write refused by the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("permission denied")]
pub struct AccessDenied;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DenialCause {
    NoDomain,
    NotOwner { owner: Iid, domain: Iid },
    NoPermission,
}

impl Display for DenialCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDomain => f.write_str("no domain selected for the iteration"),
            Self::NotOwner { owner, domain } => {
                write!(f, "owned by {owner}, current domain is {domain}")
            }
            Self::NoPermission => f.write_str("permission service refused the write"),
        }
    }
}

/// Single-writer guard for value-set updates
///
/// Ensures only the owning domain of an entity can write it.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteGuard;

impl WriteGuard {
    /// Create new guard instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check<T: OwnedThing + 'static>(
        target: &T,
        domain: Option<Iid>,
        permission: &dyn PermissionService,
    ) -> Result<(), DenialCause> {
        let domain = domain.ok_or(DenialCause::NoDomain)?;
        let owner = target.owner();
        if owner != domain {
            return Err(DenialCause::NotOwner { owner, domain });
        }
        if !permission.can_write(target) {
            return Err(DenialCause::NoPermission);
        }
        Ok(())
    }

    /// Authorize `domain` to write `target`
    ///
    /// # Errors
    /// [`AccessDenied`] unless a domain is set, it owns `target` and
    /// `permission` grants the write
    pub fn authorize_write<T: OwnedThing + 'static>(
        &self,
        target: &T,
        domain: Option<Iid>,
        permission: &dyn PermissionService,
    ) -> Result<(), AccessDenied> {
        Self::check(target, domain, permission).map_err(|cause| {
            tracing::debug!(
                "Write to {} {} denied: {}",
                target.class_kind(),
                target.iid(),
                cause
            );
            AccessDenied
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::AllowAll;
    use mcode_model::{ClassKind, GraphExt, ValueSet};
    use mcode_test_utils::{build_cache, ids};
    use mockall::mock;
    use proptest::prelude::*;

    mock! {
        Permissions {}
        impl PermissionService for Permissions {
            fn can_write(&self, thing: &(dyn OwnedThing + 'static)) -> bool;
        }
    }

    fn value_set(iid: Iid) -> ValueSet {
        build_cache().value_set(iid, ids::ITERATION).unwrap()
    }

    #[test]
    fn owner_with_permission_passes() {
        let mut permissions = MockPermissions::new();
        permissions
            .expect_can_write()
            .withf(|thing| thing.class_kind() == ClassKind::ParameterValueSet)
            .times(1)
            .return_const(true);

        let result =
            WriteGuard::new().authorize_write(&value_set(ids::VS_P1), Some(ids::D1), &permissions);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn missing_domain_is_denied_before_asking() {
        let mut permissions = MockPermissions::new();
        permissions.expect_can_write().never();

        let vs = value_set(ids::VS_P1);
        assert_eq!(
            WriteGuard::check(&vs, None, &permissions),
            Err(DenialCause::NoDomain)
        );
        assert_eq!(
            WriteGuard::new().authorize_write(&vs, None, &permissions),
            Err(AccessDenied)
        );
    }

    #[test]
    fn permission_refusal_is_denied() {
        let mut permissions = MockPermissions::new();
        permissions.expect_can_write().return_const(false);

        let vs = value_set(ids::VS_SUB_P1_D2);
        assert_eq!(
            WriteGuard::check(&vs, Some(ids::D2), &permissions),
            Err(DenialCause::NoPermission)
        );
    }

    #[test]
    fn subscription_owner_may_write_subscription() {
        let vs = value_set(ids::VS_SUB_P1_D2);
        assert!(WriteGuard::new()
            .authorize_write(&vs, Some(ids::D2), &AllowAll)
            .is_ok());
        assert!(WriteGuard::new()
            .authorize_write(&vs, Some(ids::D1), &AllowAll)
            .is_err());
    }

    proptest! {
        #[test]
        fn foreign_domain_always_denied(raw in any::<u128>()) {
            let domain = Iid::from_u128(raw);
            prop_assume!(domain != ids::D1);
            let vs = value_set(ids::VS_P1);
            prop_assert_eq!(
                WriteGuard::check(&vs, Some(domain), &AllowAll),
                Err(DenialCause::NotOwner { owner: ids::D1, domain })
            );
        }
    }
}

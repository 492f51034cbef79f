//! Entities of the engineering-data graph
//!
//! Every cached entity is a [`Thing`]. The two polymorphic families the
//! resolver and update engine care about are closed enums:
//! [`ParameterBase`] (parameter, override, subscription) and [`ValueSet`]
//! (parameter value-set, override value-set, subscription value-set).
//! All cross-references are [`Iid`]s.

use crate::id::Iid;
use crate::parameter_type::ParameterType;
use crate::scale::MeasurementScale;
use crate::value::{SwitchKind, ValueArray};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Class of a cached entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    /// [`Iteration`]
    Iteration,
    /// [`DomainOfExpertise`]
    DomainOfExpertise,
    /// [`DesignOption`]
    Option,
    /// [`ActualFiniteState`]
    ActualFiniteState,
    /// [`ElementDefinition`]
    ElementDefinition,
    /// [`ElementUsage`]
    ElementUsage,
    /// [`ParameterType`]
    ParameterType,
    /// [`MeasurementScale`]
    MeasurementScale,
    /// [`Parameter`]
    Parameter,
    /// [`ParameterOverride`]
    ParameterOverride,
    /// [`ParameterSubscription`]
    ParameterSubscription,
    /// [`ValueSet::Parameter`]
    ParameterValueSet,
    /// [`ValueSet::Override`]
    ParameterOverrideValueSet,
    /// [`ValueSet::Subscription`]
    ParameterSubscriptionValueSet,
}

impl ClassKind {
    /// Name as used in routes and log lines
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Iteration => "Iteration",
            Self::DomainOfExpertise => "DomainOfExpertise",
            Self::Option => "Option",
            Self::ActualFiniteState => "ActualFiniteState",
            Self::ElementDefinition => "ElementDefinition",
            Self::ElementUsage => "ElementUsage",
            Self::ParameterType => "ParameterType",
            Self::MeasurementScale => "MeasurementScale",
            Self::Parameter => "Parameter",
            Self::ParameterOverride => "ParameterOverride",
            Self::ParameterSubscription => "ParameterSubscription",
            Self::ParameterValueSet => "ParameterValueSet",
            Self::ParameterOverrideValueSet => "ParameterOverrideValueSet",
            Self::ParameterSubscriptionValueSet => "ParameterSubscriptionValueSet",
        }
    }
}

impl Display for ClassKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity that declares an owning domain of expertise
///
/// This is the view the permission collaborator gets of a thing it is
/// asked about.
pub trait OwnedThing {
    /// Identifier
    fn iid(&self) -> Iid;
    /// Owning domain
    fn owner(&self) -> Iid;
    /// Class of the entity
    fn class_kind(&self) -> ClassKind;
}

/// Root scope of a working data-set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Iteration {
    /// Identifier
    pub iid: Iid,
    /// Element definitions
    pub element: Vec<Iid>,
    /// Options
    pub option: Vec<Iid>,
    /// Actual finite states
    pub actual_finite_state: Vec<Iid>,
}

/// Actor role that owns and writes parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainOfExpertise {
    /// Identifier
    pub iid: Iid,
    /// Short name, e.g. `PWR`
    pub short_name: String,
    /// Human-readable name
    pub name: String,
}

/// Design option (the `Option` dependency axis)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignOption {
    /// Identifier
    pub iid: Iid,
    /// Short name, used in model codes
    pub short_name: String,
}

/// Actual finite state (the state dependency axis)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualFiniteState {
    /// Identifier
    pub iid: Iid,
    /// Short name, used in model codes
    pub short_name: String,
}

/// Element definition, owning parameters and element usages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDefinition {
    /// Identifier
    pub iid: Iid,
    /// Owning iteration
    pub container: Iid,
    /// Short name, first segment of model codes
    pub short_name: String,
    /// Owning domain
    pub owner: Iid,
    /// Parameters
    pub parameter: Vec<Iid>,
    /// Contained element usages
    pub contained_element: Vec<Iid>,
}

/// Usage of an element definition inside another one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementUsage {
    /// Identifier
    pub iid: Iid,
    /// Containing element definition
    pub container: Iid,
    /// Short name, used in model codes
    pub short_name: String,
    /// Owning domain
    pub owner: Iid,
    /// The element definition being used
    pub element_definition: Iid,
    /// Overrides of the used definition's parameters
    pub parameter_override: Vec<Iid>,
}

/// Fields shared by parameters, overrides and subscriptions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterCore {
    /// Identifier
    pub iid: Iid,
    /// Structural container
    pub container: Iid,
    /// Owning domain
    pub owner: Iid,
    /// Parameter type
    pub parameter_type: Iid,
    /// Scale, for quantities
    pub scale: Option<Iid>,
    /// One value-set per option
    pub is_option_dependent: bool,
    /// One value-set per actual state of this list
    pub state_dependence: Option<Iid>,
    /// Value-sets, one per option × state combination
    pub value_set: Vec<Iid>,
}

/// Parameter of an element definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Shared fields; `container` is an element definition
    pub core: ParameterCore,
    /// Subscriptions of other domains
    pub subscription: Vec<Iid>,
}

/// Override of a parameter on an element usage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterOverride {
    /// Shared fields; `container` is an element usage
    pub core: ParameterCore,
    /// Overridden parameter
    pub parameter: Iid,
    /// Subscriptions of other domains
    pub subscription: Vec<Iid>,
}

/// Another domain's view of a parameter or override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSubscription {
    /// Shared fields; `container` is a parameter or override
    pub core: ParameterCore,
}

/// Parameter, override or subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterBase {
    /// Parameter of an element definition
    Parameter(Parameter),
    /// Override on an element usage
    Override(ParameterOverride),
    /// Subscription of another domain
    Subscription(ParameterSubscription),
}

impl ParameterBase {
    /// Shared fields
    #[inline]
    #[must_use]
    pub fn core(&self) -> &ParameterCore {
        match self {
            Self::Parameter(p) => &p.core,
            Self::Override(o) => &o.core,
            Self::Subscription(s) => &s.core,
        }
    }

    /// Identifier
    #[inline]
    #[must_use]
    pub fn iid(&self) -> Iid {
        self.core().iid
    }

    /// Structural container
    #[inline]
    #[must_use]
    pub fn container(&self) -> Iid {
        self.core().container
    }

    /// Parameter type id
    #[inline]
    #[must_use]
    pub fn parameter_type(&self) -> Iid {
        self.core().parameter_type
    }

    /// Scale id
    #[inline]
    #[must_use]
    pub fn scale(&self) -> Option<Iid> {
        self.core().scale
    }

    /// Value-set ids
    #[inline]
    #[must_use]
    pub fn value_sets(&self) -> &[Iid] {
        &self.core().value_set
    }

    /// True for subscriptions
    #[inline]
    #[must_use]
    pub fn is_subscription(&self) -> bool {
        matches!(self, Self::Subscription(_))
    }
}

impl OwnedThing for ParameterBase {
    fn iid(&self) -> Iid {
        self.core().iid
    }

    fn owner(&self) -> Iid {
        self.core().owner
    }

    fn class_kind(&self) -> ClassKind {
        match self {
            Self::Parameter(_) => ClassKind::Parameter,
            Self::Override(_) => ClassKind::ParameterOverride,
            Self::Subscription(_) => ClassKind::ParameterSubscription,
        }
    }
}

/// Values of a parameter or override value-set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterValueSetBase {
    /// Identifier
    pub iid: Iid,
    /// Parameter or override holding this value-set
    pub container: Iid,
    /// Owning domain (that of the container)
    pub owner: Iid,
    /// Manual values
    pub manual: ValueArray,
    /// Computed values
    pub computed: ValueArray,
    /// Reference values
    pub reference: ValueArray,
    /// Last published values
    pub published: ValueArray,
    /// Slot holding the actual value
    pub value_switch: SwitchKind,
    /// Option this value-set applies to
    pub actual_option: Option<Iid>,
    /// State this value-set applies to
    pub actual_state: Option<Iid>,
}

impl ParameterValueSetBase {
    /// Writable slot selected by `switch`
    #[inline]
    #[must_use]
    pub fn slot(&self, switch: SwitchKind) -> &ValueArray {
        match switch {
            SwitchKind::Manual => &self.manual,
            SwitchKind::Computed => &self.computed,
            SwitchKind::Reference => &self.reference,
        }
    }

    /// Mutable writable slot selected by `switch`
    #[inline]
    pub fn slot_mut(&mut self, switch: SwitchKind) -> &mut ValueArray {
        match switch {
            SwitchKind::Manual => &mut self.manual,
            SwitchKind::Computed => &mut self.computed,
            SwitchKind::Reference => &mut self.reference,
        }
    }
}

/// Value-set of an override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterOverrideValueSet {
    /// Values
    pub base: ParameterValueSetBase,
    /// Value-set of the overridden parameter
    pub parameter_value_set: Iid,
}

/// Value-set of a subscription; only the manual slot is its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSubscriptionValueSet {
    /// Identifier
    pub iid: Iid,
    /// Subscription holding this value-set
    pub container: Iid,
    /// Owning domain (that of the subscription)
    pub owner: Iid,
    /// The subscriber's own values
    pub manual: ValueArray,
    /// Slot holding the actual value
    pub value_switch: SwitchKind,
    /// Parameter or override value-set subscribed to
    pub subscribed_value_set: Iid,
}

/// Parameter, override or subscription value-set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueSet {
    /// Value-set of a parameter
    Parameter(ParameterValueSetBase),
    /// Value-set of an override
    Override(ParameterOverrideValueSet),
    /// Value-set of a subscription
    Subscription(ParameterSubscriptionValueSet),
}

impl ValueSet {
    /// Identifier
    #[inline]
    #[must_use]
    pub fn iid(&self) -> Iid {
        match self {
            Self::Parameter(v) => v.iid,
            Self::Override(v) => v.base.iid,
            Self::Subscription(v) => v.iid,
        }
    }

    /// Container (parameter, override or subscription)
    #[inline]
    #[must_use]
    pub fn container(&self) -> Iid {
        match self {
            Self::Parameter(v) => v.container,
            Self::Override(v) => v.base.container,
            Self::Subscription(v) => v.container,
        }
    }

    /// Switch
    #[inline]
    #[must_use]
    pub fn value_switch(&self) -> SwitchKind {
        match self {
            Self::Parameter(v) => v.value_switch,
            Self::Override(v) => v.base.value_switch,
            Self::Subscription(v) => v.value_switch,
        }
    }

    /// Manual values, present on every variant
    #[inline]
    #[must_use]
    pub fn manual(&self) -> &ValueArray {
        match self {
            Self::Parameter(v) => &v.manual,
            Self::Override(v) => &v.base.manual,
            Self::Subscription(v) => &v.manual,
        }
    }

    /// Parameter/override values, `None` for subscriptions
    #[inline]
    #[must_use]
    pub fn as_base(&self) -> Option<&ParameterValueSetBase> {
        match self {
            Self::Parameter(v) => Some(v),
            Self::Override(v) => Some(&v.base),
            Self::Subscription(_) => None,
        }
    }

    /// True for subscription value-sets
    #[inline]
    #[must_use]
    pub fn is_subscription(&self) -> bool {
        matches!(self, Self::Subscription(_))
    }

    /// The slot a write with `switch` lands in
    ///
    /// Subscription value-sets only own a manual slot, so every switch
    /// maps to it.
    pub fn target_slot_mut(&mut self, switch: SwitchKind) -> &mut ValueArray {
        match self {
            Self::Parameter(v) => v.slot_mut(switch),
            Self::Override(v) => v.base.slot_mut(switch),
            Self::Subscription(v) => &mut v.manual,
        }
    }

    /// Read-only counterpart of [`Self::target_slot_mut`]
    #[must_use]
    pub fn target_slot(&self, switch: SwitchKind) -> &ValueArray {
        match self {
            Self::Parameter(v) => v.slot(switch),
            Self::Override(v) => v.base.slot(switch),
            Self::Subscription(v) => &v.manual,
        }
    }
}

impl OwnedThing for ValueSet {
    fn iid(&self) -> Iid {
        ValueSet::iid(self)
    }

    fn owner(&self) -> Iid {
        match self {
            Self::Parameter(v) => v.owner,
            Self::Override(v) => v.base.owner,
            Self::Subscription(v) => v.owner,
        }
    }

    fn class_kind(&self) -> ClassKind {
        match self {
            Self::Parameter(_) => ClassKind::ParameterValueSet,
            Self::Override(_) => ClassKind::ParameterOverrideValueSet,
            Self::Subscription(_) => ClassKind::ParameterSubscriptionValueSet,
        }
    }
}

/// Any cached entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Thing {
    /// Iteration
    Iteration(Iteration),
    /// Domain of expertise
    DomainOfExpertise(DomainOfExpertise),
    /// Option
    Option(DesignOption),
    /// Actual finite state
    ActualFiniteState(ActualFiniteState),
    /// Element definition
    ElementDefinition(ElementDefinition),
    /// Element usage
    ElementUsage(ElementUsage),
    /// Parameter type
    ParameterType(ParameterType),
    /// Measurement scale
    MeasurementScale(MeasurementScale),
    /// Parameter, override or subscription
    ParameterBase(ParameterBase),
    /// Value-set
    ValueSet(ValueSet),
}

impl Thing {
    /// Identifier
    #[must_use]
    pub fn iid(&self) -> Iid {
        match self {
            Self::Iteration(t) => t.iid,
            Self::DomainOfExpertise(t) => t.iid,
            Self::Option(t) => t.iid,
            Self::ActualFiniteState(t) => t.iid,
            Self::ElementDefinition(t) => t.iid,
            Self::ElementUsage(t) => t.iid,
            Self::ParameterType(t) => t.iid,
            Self::MeasurementScale(t) => t.iid,
            Self::ParameterBase(t) => t.iid(),
            Self::ValueSet(t) => t.iid(),
        }
    }

    /// Class of the entity
    #[must_use]
    pub fn class_kind(&self) -> ClassKind {
        match self {
            Self::Iteration(_) => ClassKind::Iteration,
            Self::DomainOfExpertise(_) => ClassKind::DomainOfExpertise,
            Self::Option(_) => ClassKind::Option,
            Self::ActualFiniteState(_) => ClassKind::ActualFiniteState,
            Self::ElementDefinition(_) => ClassKind::ElementDefinition,
            Self::ElementUsage(_) => ClassKind::ElementUsage,
            Self::ParameterType(_) => ClassKind::ParameterType,
            Self::MeasurementScale(_) => ClassKind::MeasurementScale,
            Self::ParameterBase(t) => t.class_kind(),
            Self::ValueSet(t) => t.class_kind(),
        }
    }

    /// Structural container, `None` for roots and site-directory data
    #[must_use]
    pub fn container(&self) -> Option<Iid> {
        match self {
            Self::ElementDefinition(t) => Some(t.container),
            Self::ElementUsage(t) => Some(t.container),
            Self::ParameterBase(t) => Some(t.container()),
            Self::ValueSet(t) => Some(t.container()),
            Self::Iteration(_)
            | Self::DomainOfExpertise(_)
            | Self::Option(_)
            | Self::ActualFiniteState(_)
            | Self::ParameterType(_)
            | Self::MeasurementScale(_) => None,
        }
    }

    /// True for entities cached per iteration
    #[must_use]
    pub fn is_iteration_scoped(&self) -> bool {
        !matches!(
            self,
            Self::DomainOfExpertise(_) | Self::ParameterType(_) | Self::MeasurementScale(_)
        )
    }

    /// Value-set view
    #[inline]
    #[must_use]
    pub fn as_value_set(&self) -> Option<&ValueSet> {
        match self {
            Self::ValueSet(v) => Some(v),
            _ => None,
        }
    }

    /// Parameter-base view
    #[inline]
    #[must_use]
    pub fn as_parameter_base(&self) -> Option<&ParameterBase> {
        match self {
            Self::ParameterBase(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(owner: Iid) -> ParameterValueSetBase {
        ParameterValueSetBase {
            iid: Iid::from_u128(10),
            container: Iid::from_u128(11),
            owner,
            manual: ["1"].into_iter().collect(),
            computed: ["2"].into_iter().collect(),
            reference: ["3"].into_iter().collect(),
            published: ["4"].into_iter().collect(),
            value_switch: SwitchKind::Computed,
            actual_option: None,
            actual_state: None,
        }
    }

    #[test]
    fn target_slot_follows_switch_for_base() {
        let mut vs = ValueSet::Parameter(base(Iid::from_u128(1)));
        assert_eq!(vs.target_slot(SwitchKind::Reference).get(0), Some("3"));
        vs.target_slot_mut(SwitchKind::Computed).set(0, "9");
        assert_eq!(vs.as_base().unwrap().computed.get(0), Some("9"));
    }

    #[test]
    fn subscription_target_slot_is_always_manual() {
        let mut vs = ValueSet::Subscription(ParameterSubscriptionValueSet {
            iid: Iid::from_u128(20),
            container: Iid::from_u128(21),
            owner: Iid::from_u128(2),
            manual: ["m"].into_iter().collect(),
            value_switch: SwitchKind::Manual,
            subscribed_value_set: Iid::from_u128(10),
        });
        vs.target_slot_mut(SwitchKind::Reference).set(0, "x");
        assert_eq!(vs.manual().get(0), Some("x"));
        assert!(vs.as_base().is_none());
    }

    #[test]
    fn owned_thing_reports_variant() {
        let owner = Iid::from_u128(1);
        let vs = ValueSet::Override(ParameterOverrideValueSet {
            base: base(owner),
            parameter_value_set: Iid::from_u128(99),
        });
        assert_eq!(vs.owner(), owner);
        assert_eq!(vs.class_kind(), ClassKind::ParameterOverrideValueSet);
        assert_eq!(Thing::ValueSet(vs).container(), Some(Iid::from_u128(11)));
    }

    #[test]
    fn site_directory_things_are_unscoped() {
        let domain = Thing::DomainOfExpertise(DomainOfExpertise {
            iid: Iid::from_u128(1),
            short_name: "SYS".into(),
            name: "System".into(),
        });
        assert!(!domain.is_iteration_scoped());
        assert_eq!(domain.container(), None);
    }
}

//! Model codes
//!
//! A model code is the dotted path that names an element, a parameter or
//! one value of a value-set inside an iteration:
//!
//! - element definition: `ed1`
//! - element usage: `ed1.usage`
//! - parameter: `ed2.mass`, compound component: `ed1.position.x`
//! - override: `ed1.usage.mass`
//! - subscription: same code as the subscribed parameter or override
//! - value-set component: the parameter code followed by `\option` and
//!   `\state` when the value-set is option / state dependent
//!
//! Codes are computed from the graph, never parsed. Matching is
//! case-insensitive, see [`codes_match`].

use crate::graph::{EntityGraph, GraphError, GraphExt};
use crate::id::Iid;
use crate::parameter_type::ParameterTypeKind;
use crate::thing::{ClassKind, ElementDefinition, ElementUsage, ParameterBase, ValueSet};

/// Separator between containment segments
pub const SEGMENT_SEPARATOR: char = '.';

/// Separator introducing option / state qualifiers
pub const QUALIFIER_SEPARATOR: char = '\\';

/// Case-insensitive comparison of two model codes
#[inline]
#[must_use]
pub fn codes_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Canonical (lowercase) form used as an index key
#[inline]
#[must_use]
pub fn normalize(code: &str) -> String {
    code.to_lowercase()
}

/// Computes model codes for entities of one iteration
#[derive(Debug, Clone, Copy)]
pub struct ModelCoder<'g, G: EntityGraph + ?Sized> {
    graph: &'g G,
    iteration: Iid,
}

impl<'g, G: EntityGraph + ?Sized> ModelCoder<'g, G> {
    /// Coder for `iteration`
    #[inline]
    #[must_use]
    pub fn new(graph: &'g G, iteration: Iid) -> Self {
        Self { graph, iteration }
    }

    /// Iteration the coder works in
    #[inline]
    #[must_use]
    pub fn iteration(&self) -> Iid {
        self.iteration
    }

    /// Code of an element definition
    #[inline]
    #[must_use]
    pub fn element_definition(&self, definition: &ElementDefinition) -> String {
        definition.short_name.clone()
    }

    /// Code of an element usage
    ///
    /// # Errors
    /// The containing definition is not cached
    pub fn element_usage(&self, usage: &ElementUsage) -> Result<String, GraphError> {
        let container = self.graph.element_definition(usage.container, self.iteration)?;
        Ok(format!(
            "{}{SEGMENT_SEPARATOR}{}",
            container.short_name, usage.short_name
        ))
    }

    /// Code of a parameter, override or subscription
    ///
    /// With `component` set, compound parameters get the component short
    /// name appended; simple parameters only accept component `0`.
    ///
    /// # Errors
    /// Broken references or a component index out of range
    pub fn parameter_base(
        &self,
        parameter: &ParameterBase,
        component: Option<usize>,
    ) -> Result<String, GraphError> {
        let prefix = match parameter {
            ParameterBase::Parameter(p) => self
                .graph
                .element_definition(p.core.container, self.iteration)?
                .short_name,
            ParameterBase::Override(o) => {
                let usage = self.graph.element_usage(o.core.container, self.iteration)?;
                self.element_usage(&usage)?
            }
            ParameterBase::Subscription(s) => {
                let subscribed = self.graph.parameter_base(s.core.container, self.iteration)?;
                return self.parameter_base(&subscribed, component);
            }
        };

        let parameter_type = self.graph.parameter_type(parameter.parameter_type())?;
        let mut code = format!("{prefix}{SEGMENT_SEPARATOR}{}", parameter_type.short_name);

        match (&parameter_type.kind, component) {
            (_, None) | (ParameterTypeKind::Simple(_), Some(0)) => {}
            (ParameterTypeKind::Compound(components), Some(index)) => {
                let component = components.get(index).ok_or_else(|| {
                    GraphError::ComponentOutOfRange {
                        parameter_type: parameter_type.short_name.clone(),
                        index,
                        count: components.len(),
                    }
                })?;
                code.push(SEGMENT_SEPARATOR);
                code.push_str(&component.short_name);
            }
            (ParameterTypeKind::Simple(_), Some(index)) => {
                return Err(GraphError::ComponentOutOfRange {
                    parameter_type: parameter_type.short_name,
                    index,
                    count: 1,
                });
            }
        }

        Ok(code)
    }

    /// Code of component `component` of a value-set
    ///
    /// # Errors
    /// Broken references or a component index out of range
    pub fn value_set(&self, value_set: &ValueSet, component: usize) -> Result<String, GraphError> {
        let container = self.graph.parameter_base(value_set.container(), self.iteration)?;
        let mut code = self.parameter_base(&container, Some(component))?;

        let (option, state) = match value_set {
            ValueSet::Parameter(v) => (v.actual_option, v.actual_state),
            ValueSet::Override(v) => (v.base.actual_option, v.base.actual_state),
            ValueSet::Subscription(v) => {
                let subscribed = self.graph.value_set(v.subscribed_value_set, self.iteration)?;
                match subscribed.as_base() {
                    Some(base) => (base.actual_option, base.actual_state),
                    None => {
                        return Err(GraphError::UnexpectedKind {
                            expected: ClassKind::ParameterValueSet,
                            actual: ClassKind::ParameterSubscriptionValueSet,
                            iid: v.subscribed_value_set,
                        })
                    }
                }
            }
        };

        if let Some(option) = option {
            let option = self.graph.option(option, self.iteration)?;
            code.push(QUALIFIER_SEPARATOR);
            code.push_str(&option.short_name);
        }
        if let Some(state) = state {
            let state = self.graph.actual_state(state, self.iteration)?;
            code.push(QUALIFIER_SEPARATOR);
            code.push_str(&state.short_name);
        }

        Ok(code)
    }

    /// Number of values of the value-set's parameter type
    ///
    /// # Errors
    /// Broken container or parameter type reference
    pub fn number_of_values(&self, value_set: &ValueSet) -> Result<usize, GraphError> {
        let container = self.graph.parameter_base(value_set.container(), self.iteration)?;
        Ok(self
            .graph
            .parameter_type(container.parameter_type())?
            .number_of_values())
    }

    /// Every applicable code of a value-set, one per component
    ///
    /// # Errors
    /// Broken references anywhere along the way
    pub fn value_set_codes(&self, value_set: &ValueSet) -> Result<Vec<String>, GraphError> {
        (0..self.number_of_values(value_set)?)
            .map(|i| self.value_set(value_set, i))
            .collect()
    }

    /// Index of the component whose code matches `model_code`
    ///
    /// # Errors
    /// Broken references anywhere along the way
    pub fn component_index(
        &self,
        value_set: &ValueSet,
        model_code: &str,
    ) -> Result<Option<usize>, GraphError> {
        Ok(self
            .value_set_codes(value_set)?
            .iter()
            .position(|code| codes_match(code, model_code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::InMemoryCache;
    use crate::parameter_type::{ParameterType, ParameterTypeComponent, ScalarKind};
    use crate::thing::{
        ActualFiniteState, DesignOption, Parameter, ParameterCore, ParameterOverride,
        ParameterOverrideValueSet, ParameterSubscription, ParameterSubscriptionValueSet,
        ParameterValueSetBase, Thing,
    };
    use crate::value::{SwitchKind, ValueArray};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const IT: Iid = Iid::from_u128(100);
    const DOMAIN: Iid = Iid::from_u128(1);
    const ED1: Iid = Iid::from_u128(10);
    const USAGE: Iid = Iid::from_u128(11);
    const PT_MASS: Iid = Iid::from_u128(20);
    const PT_POS: Iid = Iid::from_u128(21);
    const OPT: Iid = Iid::from_u128(30);
    const STATE: Iid = Iid::from_u128(31);
    const P_MASS: Iid = Iid::from_u128(40);
    const P_POS: Iid = Iid::from_u128(41);
    const OVERRIDE: Iid = Iid::from_u128(42);
    const SUB: Iid = Iid::from_u128(43);
    const VS_MASS: Iid = Iid::from_u128(50);
    const VS_POS: Iid = Iid::from_u128(51);
    const VS_OVERRIDE: Iid = Iid::from_u128(52);
    const VS_SUB: Iid = Iid::from_u128(53);

    fn core(iid: Iid, container: Iid, parameter_type: Iid, value_set: Iid) -> ParameterCore {
        ParameterCore {
            iid,
            container,
            owner: DOMAIN,
            parameter_type,
            scale: None,
            is_option_dependent: false,
            state_dependence: None,
            value_set: vec![value_set],
        }
    }

    fn values(iid: Iid, container: Iid, n: usize) -> ParameterValueSetBase {
        ParameterValueSetBase {
            iid,
            container,
            owner: DOMAIN,
            manual: ValueArray::unset(n),
            computed: ValueArray::unset(n),
            reference: ValueArray::unset(n),
            published: ValueArray::unset(n),
            value_switch: SwitchKind::Manual,
            actual_option: None,
            actual_state: None,
        }
    }

    fn graph() -> InMemoryCache {
        let cache = InMemoryCache::new();
        let put = |thing| {
            cache.insert(thing, IT);
        };

        put(Thing::ParameterType(ParameterType::simple(
            PT_MASS,
            "mass",
            ScalarKind::Quantity,
        )));
        let component = |name: &str| ParameterTypeComponent {
            short_name: name.into(),
            parameter_type: PT_MASS,
            scale: None,
        };
        put(Thing::ParameterType(ParameterType::compound(
            PT_POS,
            "position",
            vec![component("x"), component("y")],
        )));
        put(Thing::Option(DesignOption {
            iid: OPT,
            short_name: "opt".into(),
        }));
        put(Thing::ActualFiniteState(ActualFiniteState {
            iid: STATE,
            short_name: "on".into(),
        }));
        put(Thing::ElementDefinition(ElementDefinition {
            iid: ED1,
            container: IT,
            short_name: "Sat".into(),
            owner: DOMAIN,
            parameter: vec![P_MASS, P_POS],
            contained_element: vec![USAGE],
        }));
        put(Thing::ElementUsage(ElementUsage {
            iid: USAGE,
            container: ED1,
            short_name: "bus".into(),
            owner: DOMAIN,
            element_definition: ED1,
            parameter_override: vec![OVERRIDE],
        }));

        let mut mass = core(P_MASS, ED1, PT_MASS, VS_MASS);
        mass.is_option_dependent = true;
        put(Thing::ParameterBase(ParameterBase::Parameter(Parameter {
            core: mass,
            subscription: vec![SUB],
        })));
        let mut mass_values = values(VS_MASS, P_MASS, 1);
        mass_values.actual_option = Some(OPT);
        mass_values.actual_state = Some(STATE);
        put(Thing::ValueSet(ValueSet::Parameter(mass_values)));

        put(Thing::ParameterBase(ParameterBase::Parameter(Parameter {
            core: core(P_POS, ED1, PT_POS, VS_POS),
            subscription: vec![],
        })));
        put(Thing::ValueSet(ValueSet::Parameter(values(VS_POS, P_POS, 2))));

        put(Thing::ParameterBase(ParameterBase::Override(ParameterOverride {
            core: core(OVERRIDE, USAGE, PT_MASS, VS_OVERRIDE),
            parameter: P_MASS,
            subscription: vec![],
        })));
        put(Thing::ValueSet(ValueSet::Override(ParameterOverrideValueSet {
            base: values(VS_OVERRIDE, OVERRIDE, 1),
            parameter_value_set: VS_MASS,
        })));

        put(Thing::ParameterBase(ParameterBase::Subscription(
            ParameterSubscription {
                core: core(SUB, P_MASS, PT_MASS, VS_SUB),
            },
        )));
        put(Thing::ValueSet(ValueSet::Subscription(
            ParameterSubscriptionValueSet {
                iid: VS_SUB,
                container: SUB,
                owner: Iid::from_u128(2),
                manual: ValueArray::unset(1),
                value_switch: SwitchKind::Manual,
                subscribed_value_set: VS_MASS,
            },
        )));

        cache
    }

    fn code_of(cache: &InMemoryCache, value_set: Iid) -> Vec<String> {
        let coder = ModelCoder::new(cache, IT);
        let vs = cache.value_set(value_set, IT).unwrap();
        coder.value_set_codes(&vs).unwrap()
    }

    #[test]
    fn codes_match_ignores_case() {
        assert!(codes_match("Sat.Mass", "sat.mass"));
        assert!(!codes_match("sat.mass", "sat.mas"));
        assert_eq!(normalize("Sat.Bus.MASS"), "sat.bus.mass");
    }

    #[test]
    fn usage_code_is_prefixed_by_definition() {
        let cache = graph();
        let usage = cache.element_usage(USAGE, IT).unwrap();
        assert_eq!(
            ModelCoder::new(&cache, IT).element_usage(&usage).unwrap(),
            "Sat.bus"
        );
    }

    #[test]
    fn option_and_state_are_appended() {
        let cache = graph();
        assert_eq!(code_of(&cache, VS_MASS), vec!["Sat.mass\\opt\\on"]);
    }

    #[test]
    fn compound_yields_one_code_per_component() {
        let cache = graph();
        assert_eq!(
            code_of(&cache, VS_POS),
            vec!["Sat.position.x", "Sat.position.y"]
        );
    }

    #[test]
    fn override_uses_usage_path() {
        let cache = graph();
        assert_eq!(code_of(&cache, VS_OVERRIDE), vec!["Sat.bus.mass"]);
    }

    #[test]
    fn subscription_shares_subscribed_code() {
        let cache = graph();
        assert_eq!(code_of(&cache, VS_SUB), code_of(&cache, VS_MASS));
    }

    #[test]
    fn component_index_is_case_insensitive() {
        let cache = graph();
        let coder = ModelCoder::new(&cache, IT);
        let vs = cache.value_set(VS_POS, IT).unwrap();
        assert_eq!(coder.component_index(&vs, "SAT.POSITION.Y").unwrap(), Some(1));
        assert_eq!(coder.component_index(&vs, "sat.position.z").unwrap(), None);
    }

    #[test]
    fn simple_parameter_rejects_component_above_zero() {
        let cache = graph();
        let coder = ModelCoder::new(&cache, IT);
        let mass = cache.parameter_base(P_MASS, IT).unwrap();
        assert!(coder.parameter_base(&mass, Some(0)).is_ok());
        assert!(matches!(
            coder.parameter_base(&mass, Some(1)),
            Err(GraphError::ComponentOutOfRange { count: 1, .. })
        ));
    }

    proptest! {
        /// Matching agrees with comparing normalized keys, and never cares
        /// about letter case.
        #[test]
        fn matching_agrees_with_normalized_keys(
            a in "[a-zA-Z0-9_.\\\\]{0,16}",
            b in "[a-zA-Z0-9_.\\\\]{0,16}",
        ) {
            prop_assert_eq!(codes_match(&a, &b), normalize(&a) == normalize(&b));
            prop_assert!(codes_match(&a, &a.to_uppercase()));
            prop_assert_eq!(normalize(&a.to_uppercase()), normalize(&a));
        }
    }
}

//! Value accessor
//!
//! Reads one value of a resolved value-set: the slot is chosen by the
//! caller, the component by matching the model code against each
//! component's computed code.

use crate::error::ServiceError;
use mcode_model::{
    EntityGraph, GraphExt, Iid, ModelCoder, ParameterValueSetBase, SwitchKind, ValueArray,
    ValueSet, ValueSlot,
};

/// Reads slots of value-sets in one iteration
#[derive(Debug, Clone, Copy)]
pub struct ValueAccessor<'g, G: EntityGraph + ?Sized> {
    graph: &'g G,
    iteration: Iid,
}

impl<'g, G: EntityGraph + ?Sized> ValueAccessor<'g, G> {
    /// Accessor for `iteration`
    #[inline]
    #[must_use]
    pub fn new(graph: &'g G, iteration: Iid) -> Self {
        Self { graph, iteration }
    }

    fn subscribed(&self, subscribed: Iid) -> Result<ParameterValueSetBase, ServiceError> {
        match self.graph.value_set(subscribed, self.iteration)? {
            ValueSet::Parameter(base) => Ok(base),
            ValueSet::Override(value_set) => Ok(value_set.base),
            ValueSet::Subscription(_) => Err(ServiceError::MalformedGraph(format!(
                "subscription value-set subscribes to subscription value-set {subscribed}"
            ))),
        }
    }

    /// All values of `slot`
    ///
    /// Subscription value-sets only own their manual values; computed,
    /// reference and published values come from the subscribed value-set,
    /// and so does the actual value unless the switch selects manual.
    ///
    /// # Errors
    /// [`ServiceError::MalformedGraph`] when the subscribed value-set is
    /// missing
    pub fn slot_values(
        &self,
        value_set: &ValueSet,
        slot: ValueSlot,
    ) -> Result<ValueArray, ServiceError> {
        let pick = |base: &ParameterValueSetBase, slot: ValueSlot| match slot {
            ValueSlot::Manual => base.manual.clone(),
            ValueSlot::Computed => base.computed.clone(),
            ValueSlot::Reference => base.reference.clone(),
            ValueSlot::Published => base.published.clone(),
            ValueSlot::Actual => base.slot(base.value_switch).clone(),
        };

        match value_set {
            ValueSet::Parameter(base) => Ok(pick(base, slot)),
            ValueSet::Override(value_set) => Ok(pick(&value_set.base, slot)),
            ValueSet::Subscription(subscription) => {
                let own_manual = matches!(slot, ValueSlot::Manual)
                    || (slot == ValueSlot::Actual
                        && subscription.value_switch == SwitchKind::Manual);
                if own_manual {
                    return Ok(subscription.manual.clone());
                }
                let slot = match slot {
                    ValueSlot::Actual => ValueSlot::from(subscription.value_switch),
                    other => other,
                };
                let subscribed = self.subscribed(subscription.subscribed_value_set)?;
                Ok(pick(&subscribed, slot))
            }
        }
    }

    /// Value of the component coded `model_code` in `slot`
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] when no component carries the code,
    /// [`ServiceError::MalformedGraph`] on broken references or a slot
    /// shorter than the parameter type
    pub fn component_value(
        &self,
        value_set: &ValueSet,
        model_code: &str,
        slot: ValueSlot,
    ) -> Result<String, ServiceError> {
        let coder = ModelCoder::new(self.graph, self.iteration);
        let index = coder
            .component_index(value_set, model_code)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no component of value-set {} matches {model_code}",
                    value_set.iid()
                ))
            })?;

        let values = self.slot_values(value_set, slot)?;
        values.get(index).map(str::to_owned).ok_or_else(|| {
            ServiceError::MalformedGraph(format!(
                "value-set {} holds {} {slot} value(s), component {index} requested",
                value_set.iid(),
                values.len()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcode_model::InMemoryCache;
    use mcode_test_utils::{build_cache, ids};

    fn read(cache: &InMemoryCache, vs: Iid, code: &str, slot: ValueSlot) -> Result<String, ServiceError> {
        let value_set = cache.value_set(vs, ids::ITERATION).unwrap();
        ValueAccessor::new(cache, ids::ITERATION).component_value(&value_set, code, slot)
    }

    #[test]
    fn base_slots() {
        let cache = build_cache();
        let code = "ed2.scalar1";
        assert_eq!(read(&cache, ids::VS_P1, code, ValueSlot::Manual).unwrap(), "1");
        assert_eq!(read(&cache, ids::VS_P1, code, ValueSlot::Computed).unwrap(), "2");
        assert_eq!(read(&cache, ids::VS_P1, code, ValueSlot::Reference).unwrap(), "3");
        assert_eq!(read(&cache, ids::VS_P1, code, ValueSlot::Published).unwrap(), "4");
        assert_eq!(read(&cache, ids::VS_P1, code, ValueSlot::Actual).unwrap(), "1");
    }

    #[test]
    fn compound_component_by_code() {
        let cache = build_cache();
        assert_eq!(
            read(&cache, ids::VS_P3, "ED1.COMPOUND.CPT2", ValueSlot::Reference).unwrap(),
            "c"
        );
        assert_eq!(
            read(&cache, ids::VS_P3, "ed1.compound.cpt1", ValueSlot::Published).unwrap(),
            "4"
        );
    }

    #[test]
    fn subscription_reads_through() {
        let cache = build_cache();
        let code = "ed2.scalar1";
        let vs = ids::VS_SUB_P1_D2;
        assert_eq!(read(&cache, vs, code, ValueSlot::Manual).unwrap(), "-");
        assert_eq!(read(&cache, vs, code, ValueSlot::Actual).unwrap(), "-");
        assert_eq!(read(&cache, vs, code, ValueSlot::Computed).unwrap(), "2");
        assert_eq!(read(&cache, vs, code, ValueSlot::Published).unwrap(), "4");
    }

    #[test]
    fn wrong_code_is_not_found() {
        let cache = build_cache();
        let error = read(&cache, ids::VS_P1, "ed2.scalar2", ValueSlot::Manual).unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::NotFound);
    }
}

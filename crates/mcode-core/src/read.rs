//! Read service
//!
//! Looks up elements, parameters and values by model code. Reads never
//! check ownership or permissions and never touch the cache.

use crate::accessor::ValueAccessor;
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::session::SessionContext;
use mcode_index::{ElementRef, ModelCodeIndex, ModelCodeResolver};
use mcode_model::{EntityGraph, Iid, ParameterBase, ValueSet, ValueSlot};
use std::sync::Arc;

/// Model-code reads over the cached graph
#[derive(Clone)]
pub struct DataReadService {
    session: Arc<dyn SessionContext>,
    resolver: ModelCodeResolver,
    config: ServiceConfig,
}

impl std::fmt::Debug for DataReadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataReadService")
            .field("resolver", &self.resolver)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DataReadService {
    /// Service with its own model-code index
    #[must_use]
    pub fn new(
        graph: Arc<dyn EntityGraph>,
        session: Arc<dyn SessionContext>,
        config: ServiceConfig,
    ) -> Self {
        Self::with_index(graph, session, Arc::new(ModelCodeIndex::new()), config)
    }

    /// Service sharing `index` with other services
    #[must_use]
    pub fn with_index(
        graph: Arc<dyn EntityGraph>,
        session: Arc<dyn SessionContext>,
        index: Arc<ModelCodeIndex>,
        config: ServiceConfig,
    ) -> Self {
        let resolver = ModelCodeResolver::new(graph, index).with_strategy(config.strategy());
        Self {
            session,
            resolver,
            config,
        }
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Resolver used for lookups
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &ModelCodeResolver {
        &self.resolver
    }

    fn domain(&self, iteration: Iid) -> Option<Iid> {
        self.session.current_domain(iteration)
    }

    /// Element definition or usage coded `model_code`
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] when no element carries the code
    pub fn element_by_model_code(
        &self,
        iteration: Iid,
        model_code: &str,
    ) -> Result<ElementRef, ServiceError> {
        self.resolver
            .find_element(iteration, model_code)?
            .ok_or_else(|| ServiceError::NotFound(format!("no element found for {model_code}")))
    }

    /// Parameter, override or (the caller's) subscription coded
    /// `model_code`
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] or [`ServiceError::MalformedGraph`]
    pub fn parameter_by_model_code(
        &self,
        iteration: Iid,
        model_code: &str,
    ) -> Result<ParameterBase, ServiceError> {
        Ok(self.resolver.parameter(
            iteration,
            model_code,
            self.domain(iteration),
            self.config.prefer_subscription_on_read,
        )?)
    }

    /// Value-set coded `model_code`, the caller's subscription first
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] or [`ServiceError::MalformedGraph`]
    pub fn value_set_by_model_code(
        &self,
        iteration: Iid,
        model_code: &str,
    ) -> Result<ValueSet, ServiceError> {
        Ok(self.resolver.value_set(
            iteration,
            model_code,
            self.domain(iteration),
            self.config.prefer_subscription_on_read,
        )?)
    }

    fn domain_value(
        &self,
        iteration: Iid,
        model_code: &str,
        slot: ValueSlot,
    ) -> Result<String, ServiceError> {
        tracing::debug!("Reading {} value of {} in iteration {}", slot, model_code, iteration);
        let value_set = self.value_set_by_model_code(iteration, model_code)?;
        ValueAccessor::new(&**self.resolver.graph(), iteration).component_value(
            &value_set,
            model_code,
            slot,
        )
    }

    /// Actual value as seen by the caller's domain
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] or [`ServiceError::MalformedGraph`]
    pub fn domain_actual_value(&self, iteration: Iid, model_code: &str) -> Result<String, ServiceError> {
        self.domain_value(iteration, model_code, ValueSlot::Actual)
    }

    /// Manual value as seen by the caller's domain
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] or [`ServiceError::MalformedGraph`]
    pub fn domain_manual_value(&self, iteration: Iid, model_code: &str) -> Result<String, ServiceError> {
        self.domain_value(iteration, model_code, ValueSlot::Manual)
    }

    /// Computed value as seen by the caller's domain
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] or [`ServiceError::MalformedGraph`]
    pub fn domain_computed_value(
        &self,
        iteration: Iid,
        model_code: &str,
    ) -> Result<String, ServiceError> {
        self.domain_value(iteration, model_code, ValueSlot::Computed)
    }

    /// Reference value as seen by the caller's domain
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] or [`ServiceError::MalformedGraph`]
    pub fn domain_reference_value(
        &self,
        iteration: Iid,
        model_code: &str,
    ) -> Result<String, ServiceError> {
        self.domain_value(iteration, model_code, ValueSlot::Reference)
    }

    /// Published value of the parameter or override value-set
    ///
    /// Subscriptions are never considered.
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] when the code only resolves to a
    /// subscription value-set
    pub fn published_value(&self, iteration: Iid, model_code: &str) -> Result<String, ServiceError> {
        tracing::debug!("Reading published value of {} in iteration {}", model_code, iteration);
        let value_set = self.resolver.value_set(iteration, model_code, None, false)?;
        if value_set.is_subscription() {
            return Err(ServiceError::NotFound(format!(
                "{model_code} resolves to a subscription value-set, which has no published value"
            )));
        }
        ValueAccessor::new(&**self.resolver.graph(), iteration).component_value(
            &value_set,
            model_code,
            ValueSlot::Published,
        )
    }

    /// Value-set codes of `iteration` starting with `prefix`, lowercased
    ///
    /// # Errors
    /// [`ServiceError::MalformedGraph`] when the index cannot be built
    pub fn codes_under(&self, iteration: Iid, prefix: &str) -> Result<Vec<String>, ServiceError> {
        Ok(self
            .resolver
            .index()
            .codes_under(&**self.resolver.graph(), iteration, prefix)?)
    }

    /// Forget the index of a reloaded iteration
    pub fn invalidate(&self, iteration: Iid) -> bool {
        self.resolver.index().invalidate(iteration)
    }
}

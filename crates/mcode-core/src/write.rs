//! Write service
//!
//! Validated, permission-gated updates of one value by model code.
//!
//! Every update walks the same stages, forward only:
//! `Resolving → Authorizing → Validating → CloningAndMutating →
//! Submitting → Done | Failed`. The cached value-set is never modified;
//! a clone carries the change to the write collaborator and is dropped
//! afterwards, whatever the outcome. Nothing is retried here.
//!
//! Two concurrent updates of the same value-set are not serialized:
//! the last one submitted wins, subject to the store's check of the
//! base hash carried by each operation.

use crate::config::ServiceConfig;
use crate::error::{ErrorKind, ServiceError};
use crate::session::SessionContext;
use crate::transaction::{OperationContainer, ThingTransaction, TransactionContext};
use crate::writer::WriteCollaborator;
use mcode_access::{PermissionService, WriteGuard};
use mcode_index::{ModelCodeIndex, ModelCodeResolver};
use mcode_model::{
    EntityGraph, GraphExt, Iid, ModelCoder, ParameterTypeKind, SwitchKind, Thing,
    ValidationResult, ValueArray,
};
use std::fmt::{self, Display, Formatter};
use std::future::Future;
use std::sync::Arc;

/// Stage of one update call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStage {
    /// Finding the value-set
    Resolving,
    /// Ownership and permission check
    Authorizing,
    /// Parameter-type validation
    Validating,
    /// Patching a detached clone
    CloningAndMutating,
    /// Waiting for the write collaborator
    Submitting,
    /// Write accepted
    Done,
    /// Stopped with an error of this kind
    Failed(ErrorKind),
}

impl Display for UpdateStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolving => f.write_str("Resolving"),
            Self::Authorizing => f.write_str("Authorizing"),
            Self::Validating => f.write_str("Validating"),
            Self::CloningAndMutating => f.write_str("CloningAndMutating"),
            Self::Submitting => f.write_str("Submitting"),
            Self::Done => f.write_str("Done"),
            Self::Failed(kind) => write!(f, "Failed({kind})"),
        }
    }
}

fn enter(model_code: &str, stage: UpdateStage) {
    tracing::trace!("Update of {}: {}", model_code, stage);
}

/// Which part of the target slot changes
#[derive(Debug, Clone, Copy)]
enum Patch {
    Whole,
    Component(usize),
}

impl Patch {
    fn apply(self, slot: &mut ValueArray, value: &str) -> Result<(), ServiceError> {
        match self {
            Self::Whole => *slot = ValueArray::new(vec![value.to_string()]),
            Self::Component(index) => {
                if !slot.set(index, value) {
                    return Err(ServiceError::MalformedGraph(format!(
                        "component {index} is outside a slot of {} value(s)",
                        slot.len()
                    )));
                }
            }
        }
        Ok(())
    }
}

fn ensure_valid(
    result: ValidationResult,
    value: &str,
    model_code: &str,
) -> Result<(), ServiceError> {
    if result.is_valid() {
        return Ok(());
    }
    Err(ServiceError::InvalidValue {
        kind: result.kind,
        value: value.to_string(),
        model_code: model_code.to_string(),
        message: result.message,
    })
}

/// Model-code writes over the cached graph
#[derive(Clone)]
pub struct DataWriteService {
    session: Arc<dyn SessionContext>,
    permission: Arc<dyn PermissionService>,
    writer: Arc<dyn WriteCollaborator>,
    resolver: ModelCodeResolver,
    guard: WriteGuard,
    config: ServiceConfig,
}

impl std::fmt::Debug for DataWriteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataWriteService")
            .field("resolver", &self.resolver)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DataWriteService {
    /// Service with its own model-code index
    #[must_use]
    pub fn new(
        graph: Arc<dyn EntityGraph>,
        session: Arc<dyn SessionContext>,
        permission: Arc<dyn PermissionService>,
        writer: Arc<dyn WriteCollaborator>,
        config: ServiceConfig,
    ) -> Self {
        Self::with_index(
            graph,
            session,
            permission,
            writer,
            Arc::new(ModelCodeIndex::new()),
            config,
        )
    }

    /// Service sharing `index` with other services
    #[must_use]
    pub fn with_index(
        graph: Arc<dyn EntityGraph>,
        session: Arc<dyn SessionContext>,
        permission: Arc<dyn PermissionService>,
        writer: Arc<dyn WriteCollaborator>,
        index: Arc<ModelCodeIndex>,
        config: ServiceConfig,
    ) -> Self {
        let resolver = ModelCodeResolver::new(graph, index).with_strategy(config.strategy());
        Self {
            session,
            permission,
            writer,
            resolver,
            guard: WriteGuard::new(),
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

    /// Set the manual value coded `model_code`
    ///
    /// # Errors
    /// See [`Self::update_value`]
    pub async fn update_domain_manual_value(
        &self,
        iteration: Iid,
        model_code: &str,
        value: &str,
    ) -> Result<(), ServiceError> {
        self.update_value(iteration, model_code, value, SwitchKind::Manual)
            .await
    }

    /// Set the computed value coded `model_code`
    ///
    /// # Errors
    /// See [`Self::update_value`]
    pub async fn update_domain_computed_value(
        &self,
        iteration: Iid,
        model_code: &str,
        value: &str,
    ) -> Result<(), ServiceError> {
        self.update_value(iteration, model_code, value, SwitchKind::Computed)
            .await
    }

    /// Set the reference value coded `model_code`
    ///
    /// # Errors
    /// See [`Self::update_value`]
    pub async fn update_domain_reference_value(
        &self,
        iteration: Iid,
        model_code: &str,
        value: &str,
    ) -> Result<(), ServiceError> {
        self.update_value(iteration, model_code, value, SwitchKind::Reference)
            .await
    }

    /// Validate `value` and write it to the `switch` slot of the value
    /// coded `model_code`
    ///
    /// For a subscription value-set of the caller's domain the
    /// subscription's manual slot is written, whatever `switch` says.
    ///
    /// # Errors
    /// - [`ServiceError::NotFound`]: nothing carries the code
    /// - [`ServiceError::PermissionDenied`]: the caller's domain does not
    ///   own the value-set, or may not write it
    /// - [`ServiceError::InvalidValue`]: the parameter type rejects `value`
    /// - [`ServiceError::WriteFailed`]: submission failed or timed out
    /// - [`ServiceError::MalformedGraph`]: the cache contradicts itself
    pub async fn update_value(
        &self,
        iteration: Iid,
        model_code: &str,
        value: &str,
        switch: SwitchKind,
    ) -> Result<(), ServiceError> {
        self.update_value_until(iteration, model_code, value, switch, futures::future::pending())
            .await
    }

    /// [`Self::update_value`], abandoned with
    /// [`ServiceError::WriteFailed`] if `cancel` completes before the
    /// write collaborator answers
    ///
    /// # Errors
    /// See [`Self::update_value`]
    pub async fn update_value_until<F>(
        &self,
        iteration: Iid,
        model_code: &str,
        value: &str,
        switch: SwitchKind,
        cancel: F,
    ) -> Result<(), ServiceError>
    where
        F: Future<Output = ()> + Send,
    {
        tracing::info!(
            "Updating {} value of {} in iteration {}",
            switch,
            model_code,
            iteration
        );

        let result = match self.prepare_update(iteration, model_code, value, switch) {
            Ok(container) => self.submit(model_code, container, cancel).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(()) => {
                enter(model_code, UpdateStage::Done);
                tracing::info!("Updated {} value of {}", switch, model_code);
            }
            Err(e) => {
                enter(model_code, UpdateStage::Failed(e.kind()));
                tracing::warn!("Update of {} failed: {}", model_code, e);
            }
        }
        result
    }

    /// Run every stage up to submission and return the transaction that
    /// would be submitted
    ///
    /// # Errors
    /// See [`Self::update_value`], except `WriteFailed`
    pub fn prepare_update(
        &self,
        iteration: Iid,
        model_code: &str,
        value: &str,
        switch: SwitchKind,
    ) -> Result<OperationContainer, ServiceError> {
        let graph: &dyn EntityGraph = &**self.resolver.graph();

        enter(model_code, UpdateStage::Resolving);
        let domain = self.session.current_domain(iteration);
        let value_set = self.resolver.value_set(iteration, model_code, domain, true)?;

        enter(model_code, UpdateStage::Authorizing);
        self.guard
            .authorize_write(&value_set, domain, &*self.permission)?;

        enter(model_code, UpdateStage::Validating);
        let parameter = graph.parameter_base(value_set.container(), iteration)?;
        let parameter_type = graph.parameter_type(parameter.parameter_type())?;
        let (patch, value) = match &parameter_type.kind {
            ParameterTypeKind::Compound(components) => {
                let current = value_set.target_slot(switch);
                if components.len() != current.len() {
                    return Err(ServiceError::MalformedGraph(format!(
                        "value-set {} holds {} {switch} value(s) but {} has {} components",
                        value_set.iid(),
                        current.len(),
                        parameter_type.short_name,
                        components.len()
                    )));
                }
                let index = ModelCoder::new(graph, iteration)
                    .component_index(&value_set, model_code)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "no component of {} matches {model_code}",
                            parameter_type.short_name
                        ))
                    })?;
                let component = components.get(index).ok_or_else(|| {
                    ServiceError::MalformedGraph(format!(
                        "component {index} missing from {}",
                        parameter_type.short_name
                    ))
                })?;
                let component_type = graph.parameter_type(component.parameter_type)?;
                let scale = component.scale.map(|s| graph.scale(s)).transpose()?;
                let value = component_type.canonical(value);
                ensure_valid(
                    component_type.validate(value, scale.as_ref()),
                    value,
                    model_code,
                )?;
                (Patch::Component(index), value)
            }
            ParameterTypeKind::Simple(_) => {
                let scale = parameter.scale().map(|s| graph.scale(s)).transpose()?;
                let value = parameter_type.canonical(value);
                ensure_valid(
                    parameter_type.validate(value, scale.as_ref()),
                    value,
                    model_code,
                )?;
                (Patch::Whole, value)
            }
        };

        enter(model_code, UpdateStage::CloningAndMutating);
        let mut clone = value_set.clone();
        patch.apply(clone.target_slot_mut(switch), value)?;
        tracing::debug!(
            "Value-set {} {} slot is now {}",
            clone.iid(),
            switch,
            clone.target_slot(switch)
        );

        let thing = Thing::ValueSet(clone);
        let context = TransactionContext::resolve(graph, iteration, &thing)?;
        let mut transaction = ThingTransaction::new(context);
        transaction.create_or_update(graph, thing)?;
        Ok(transaction.finalize())
    }

    async fn submit<F>(
        &self,
        model_code: &str,
        container: OperationContainer,
        cancel: F,
    ) -> Result<(), ServiceError>
    where
        F: Future<Output = ()> + Send,
    {
        enter(model_code, UpdateStage::Submitting);
        let timeout = self.config.write_timeout();
        tracing::debug!(
            "Submitting {} operation(s) at {}",
            container.operations.len(),
            container.context
        );

        // An answer that is already there beats a cancellation.
        tokio::select! {
            biased;
            outcome = tokio::time::timeout(timeout, self.writer.write(container)) => match outcome {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(ServiceError::WriteFailed(e.to_string())),
                Err(_) => Err(ServiceError::WriteFailed(format!(
                    "no answer from the write collaborator within {} ms",
                    timeout.as_millis()
                ))),
            },
            () = cancel => Err(ServiceError::WriteFailed("cancelled by caller".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcode_test_utils::values;

    #[test]
    fn patch_replaces_one_component() {
        let mut slot = values(["1", "a"]);
        Patch::Component(1).apply(&mut slot, "b").unwrap();
        assert_eq!(slot, values(["1", "b"]));

        Patch::Whole.apply(&mut slot, "7").unwrap();
        assert_eq!(slot, values(["7"]));
    }

    #[test]
    fn patch_outside_the_slot_is_malformed() {
        let mut slot = values(["1"]);
        let error = Patch::Component(1).apply(&mut slot, "b").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MalformedGraph);
        assert_eq!(slot, values(["1"]));
    }

    #[test]
    fn stage_names() {
        assert_eq!(UpdateStage::CloningAndMutating.to_string(), "CloningAndMutating");
        assert_eq!(
            UpdateStage::Failed(ErrorKind::PermissionDenied).to_string(),
            "Failed(PermissionDenied)"
        );
    }
}

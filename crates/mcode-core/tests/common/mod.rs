//! Shared harness for the service integration tests.
//!
//! Writers that record, fail or stall, mocks for the collaborators, and a
//! builder wiring both services onto the fixture graph for one domain.

#![allow(dead_code)]

use async_trait::async_trait;
use mcode_access::{AllowAll, PermissionService};
use mcode_core::{
    DataReadService, DataWriteService, OperationContainer, ServiceConfig, StaticSession,
    TransportError, WriteCollaborator,
};
use mcode_model::{GraphExt, Iid, InMemoryCache, OwnedThing, ValueSet};
use mcode_test_utils::{ids, init_tracing, shared_cache};
use mockall::mock;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

mock! {
    pub Writer {}
    #[async_trait]
    impl WriteCollaborator for Writer {
        async fn write(&self, operations: OperationContainer) -> Result<(), TransportError>;
    }
}

mock! {
    pub Permissions {}
    impl PermissionService for Permissions {
        fn can_write(&self, thing: &(dyn OwnedThing + 'static)) -> bool;
    }
}

/// Accepts everything and keeps what it was given
#[derive(Debug, Default)]
pub struct RecordingWriter {
    written: Mutex<Vec<OperationContainer>>,
}

impl RecordingWriter {
    pub fn written(&self) -> Vec<OperationContainer> {
        self.written.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.written.lock().len()
    }

    /// The value-set carried by the only operation of the last submission
    pub fn last_value_set(&self) -> ValueSet {
        let written = self.written.lock();
        let container = written.last().expect("nothing was submitted");
        assert_eq!(container.operations.len(), 1, "one operation per update");
        container.operations[0]
            .thing
            .as_value_set()
            .expect("the operation carries a value-set")
            .clone()
    }
}

#[async_trait]
impl WriteCollaborator for RecordingWriter {
    async fn write(&self, operations: OperationContainer) -> Result<(), TransportError> {
        self.written.lock().push(operations);
        Ok(())
    }
}

/// Answers only after `delay`
#[derive(Debug)]
pub struct SlowWriter {
    pub delay: Duration,
}

#[async_trait]
impl WriteCollaborator for SlowWriter {
    async fn write(&self, _operations: OperationContainer) -> Result<(), TransportError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Both services over one fixture cache, acting as one domain
pub struct Harness {
    pub cache: Arc<InMemoryCache>,
    pub session: Arc<StaticSession>,
    pub writer: Arc<RecordingWriter>,
    pub reads: DataReadService,
    pub writes: DataWriteService,
}

impl Harness {
    /// Open the fixture iteration as `domain`, with every write permitted
    pub fn as_domain(domain: Iid) -> Self {
        Self::with_config(Some(domain), ServiceConfig::default())
    }

    /// Harness for `domain` (none: iteration not open) and `config`
    pub fn with_config(domain: Option<Iid>, config: ServiceConfig) -> Self {
        init_tracing();
        let cache = shared_cache();
        let session = Arc::new(StaticSession::new());
        if let Some(domain) = domain {
            session.open(ids::ITERATION, Some(domain), None);
        }
        let writer = Arc::new(RecordingWriter::default());

        let reads = DataReadService::new(cache.clone(), session.clone(), config.clone());
        let writes = DataWriteService::new(
            cache.clone(),
            session.clone(),
            Arc::new(AllowAll),
            writer.clone(),
            config,
        );

        Self {
            cache,
            session,
            writer,
            reads,
            writes,
        }
    }

    /// The cached (never mutated) value-set
    pub fn cached(&self, value_set: Iid) -> ValueSet {
        self.cache
            .value_set(value_set, ids::ITERATION)
            .expect("fixture value-set is cached")
    }
}

/// Write service over a fresh fixture with the given collaborators
pub fn write_service(
    domain: Iid,
    permission: Arc<dyn PermissionService>,
    writer: Arc<dyn WriteCollaborator>,
    config: ServiceConfig,
) -> (Arc<InMemoryCache>, DataWriteService) {
    init_tracing();
    let cache = shared_cache();
    let session = Arc::new(StaticSession::new().with_iteration(ids::ITERATION, domain));
    let service = DataWriteService::new(cache.clone(), session, permission, writer, config);
    (cache, service)
}

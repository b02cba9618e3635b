use pulse_core::{EntityState, ServiceDomain};
use tracing::info;

use crate::error::FetchError;

/// Raw inputs for one discovery run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub version: String,
    pub states: Vec<EntityState>,
    pub services: Vec<ServiceDomain>,
}

/// Where raw entity and service documents come from.
#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    /// All entity state documents, in source order.
    async fn fetch_states(&self) -> Result<Vec<EntityState>, FetchError>;

    /// All service-domain documents, in source order.
    async fn fetch_services(&self) -> Result<Vec<ServiceDomain>, FetchError>;

    /// Version label of the source system; `unknown` when it has none.
    fn source_version(&self) -> String;
}

/// Fetch states and services concurrently.
pub async fn fetch_snapshot(source: &dyn SnapshotSource) -> Result<Snapshot, FetchError> {
    let (states, services) = tokio::try_join!(source.fetch_states(), source.fetch_services())?;
    let snapshot = Snapshot {
        version: source.source_version(),
        states,
        services,
    };
    info!(
        version = %snapshot.version,
        states = snapshot.states.len(),
        service_domains = snapshot.services.len(),
        "Snapshot fetched"
    );
    Ok(snapshot)
}

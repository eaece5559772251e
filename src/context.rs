//! Run-scoped working context shared by every node task.
//!
//! Constructed once by the orchestrator and passed by reference; there are
//! no ambient singletons. Holds the host handle, the retry policy, both
//! caches, and the resolved target collection.

use crate::cache::{CatalogCell, LazyCache, VariableCatalog};
use crate::config::RelinkConfig;
use crate::error::RelinkError;
use crate::host::VariableHost;
use crate::retry::RetryPolicy;
use crate::types::{MaterializedVariable, VariableCollection, VariableKey};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

pub struct RunContext {
    host: Arc<dyn VariableHost>,
    config: RelinkConfig,
    retry: RetryPolicy,
    catalog: CatalogCell,
    imports: LazyCache<VariableKey, MaterializedVariable>,
    target: RwLock<Option<VariableCollection>>,
}

impl RunContext {
    pub fn new(host: Arc<dyn VariableHost>, config: RelinkConfig) -> Self {
        let retry = RetryPolicy::new(config.max_attempts, config.initial_delay());
        Self {
            host,
            config,
            retry,
            catalog: CatalogCell::new(),
            imports: LazyCache::new(),
            target: RwLock::new(None),
        }
    }

    pub fn host(&self) -> &dyn VariableHost {
        self.host.as_ref()
    }

    pub fn config(&self) -> &RelinkConfig {
        &self.config
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// The resolved target collection, if orchestration resolved one.
    pub fn target_collection(&self) -> Option<VariableCollection> {
        self.target.read().clone()
    }

    /// Record the target collection; normally called once by the
    /// orchestrator before the batch starts.
    pub fn set_target_collection(&self, collection: Option<VariableCollection>) {
        *self.target.write() = collection;
    }

    /// The source-variable catalog, loaded on first call.
    ///
    /// A missing catalog capability, an unknown source library, and a
    /// library without variables all degrade to an *empty* catalog instead
    /// of an error, so the orchestrator can detect the condition and abort
    /// the run in one place.
    pub async fn catalog(&self) -> Result<&VariableCatalog, RelinkError> {
        self.catalog
            .get_or_init(|| async {
                match self.fetch_catalog().await {
                    Ok(catalog) => Ok(catalog),
                    Err(
                        err @ (RelinkError::CapabilityUnavailable(_) | RelinkError::NotFound(_)),
                    ) => {
                        warn!(error = %err, "source catalog unavailable, treating as empty");
                        Ok(VariableCatalog::empty())
                    }
                    Err(err) => Err(err),
                }
            })
            .await
    }

    async fn fetch_catalog(&self) -> Result<VariableCatalog, RelinkError> {
        if !self.host.has_library_catalog() {
            return Err(RelinkError::CapabilityUnavailable(
                "library catalog".to_string(),
            ));
        }
        let libraries = self.retry.run(|| self.host.list_libraries()).await?;
        let library = libraries
            .into_iter()
            .find(|library| library.name == self.config.source_library)
            .ok_or_else(|| {
                RelinkError::NotFound(format!("library '{}'", self.config.source_library))
            })?;
        let descriptors = self
            .retry
            .run(|| self.host.library_variables(&library.key))
            .await?;
        if descriptors.is_empty() {
            return Err(RelinkError::NotFound(format!(
                "variables in library '{}'",
                library.name
            )));
        }
        info!(
            library = %library.name,
            variables = descriptors.len(),
            "source catalog loaded"
        );
        Ok(VariableCatalog::from_descriptors(descriptors))
    }

    /// Import a source variable through the import cache: at most one
    /// remote import per distinct key per run.
    pub async fn import_variable(
        &self,
        key: &VariableKey,
    ) -> Result<MaterializedVariable, RelinkError> {
        self.imports
            .get_or_load(key.clone(), || async {
                self.retry.run(|| self.host.import_variable(key)).await
            })
            .await
    }
}

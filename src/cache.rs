//! Run-scoped caches: the import cache and the source-variable catalog.

use crate::error::RelinkError;
use crate::types::SourceVariableDescriptor;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use tokio::sync::{Mutex, OnceCell};

/// Lazily populated map cache: load on first request, read thereafter.
///
/// Concurrent first-time requests for the same unseen key may each invoke
/// their loader; insert-if-absent on completion means every caller still
/// converges on the single stored value, and warm keys never invoke a
/// loader. Failed loads leave the cache untouched.
pub struct LazyCache<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> LazyCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The cached value for `key`, loading and storing it on first request.
    pub async fn get_or_load<F, Fut>(&self, key: K, loader: F) -> Result<V, RelinkError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, RelinkError>>,
    {
        if let Some(value) = self.entries.lock().await.get(&key) {
            return Ok(value.clone());
        }
        let loaded = loader().await?;
        let mut entries = self.entries.lock().await;
        Ok(entries.entry(key).or_insert(loaded).clone())
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl<K, V> Default for LazyCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Name-indexed snapshot of a source library's variables.
///
/// Entries keep the fetched order. The name index is last-write-wins when
/// two descriptors share a display name, matching the host's map semantics.
#[derive(Debug, Clone, Default)]
pub struct VariableCatalog {
    entries: Vec<SourceVariableDescriptor>,
    by_name: HashMap<String, usize>,
}

impl VariableCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_descriptors(descriptors: Vec<SourceVariableDescriptor>) -> Self {
        let mut catalog = Self::default();
        for descriptor in descriptors {
            catalog.insert(descriptor);
        }
        catalog
    }

    fn insert(&mut self, descriptor: SourceVariableDescriptor) {
        self.by_name
            .insert(descriptor.name.clone(), self.entries.len());
        self.entries.push(descriptor);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// First entry in fetched order.
    pub fn first(&self) -> Option<&SourceVariableDescriptor> {
        self.entries.first()
    }

    /// Look up by display name; the last descriptor with that name wins.
    pub fn find_by_name(&self, name: &str) -> Option<&SourceVariableDescriptor> {
        self.by_name.get(name).map(|&index| &self.entries[index])
    }
}

/// Fill-once holder for the catalog; populated at most once per run and
/// read-only thereafter.
pub struct CatalogCell {
    cell: OnceCell<VariableCatalog>,
}

impl CatalogCell {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// The catalog, initializing it with `load` on first call.
    pub async fn get_or_init<F, Fut>(&self, load: F) -> Result<&VariableCatalog, RelinkError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<VariableCatalog, RelinkError>>,
    {
        self.cell.get_or_try_init(load).await
    }
}

impl Default for CatalogCell {
    fn default() -> Self {
        Self::new()
    }
}

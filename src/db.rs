pub mod cache;
pub mod google_sheets;
pub mod loader;
pub mod store;

pub mod property_repo;
pub use property_repo::PropertyRepository;
pub mod lease_repo;
pub use lease_repo::LeaseRepository;
pub mod ledger_repo;
pub use ledger_repo::LedgerRepository;
pub mod manager_repo;
pub use manager_repo::ManagerRepository;

#[cfg(test)]
pub(crate) mod test_support {
    use std::{collections::HashMap, sync::Arc, time::Duration};

    use super::{cache::TableCache, loader::TableLoader, store::MemoryStore};

    /// Planilha em memória só com cabeçalhos + loader com TTL longo.
    pub fn memory_loader() -> (Arc<MemoryStore>, TableLoader) {
        let store = Arc::new(MemoryStore::with_headers());
        let cache = TableCache::new(Duration::from_secs(600), HashMap::new());
        (store.clone(), TableLoader::new(store, cache))
    }

    pub fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }
}

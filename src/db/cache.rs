// src/db/cache.rs

use moka::{future::Cache, Expiry};
use std::{
    collections::HashMap,
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    common::error::AppError,
    db::{loader::RawTable, store::Table},
};

// TTL por aba: cada entrada expira de acordo com a aba que guarda
struct PerTableExpiry {
    default_ttl: Duration,
    overrides: HashMap<Table, Duration>,
}

impl Expiry<Table, Arc<RawTable>> for PerTableExpiry {
    fn expire_after_create(
        &self,
        table: &Table,
        _value: &Arc<RawTable>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(self.overrides.get(table).copied().unwrap_or(self.default_ttl))
    }
}

/// Cache de leitura compartilhado pelo processo, uma entrada por aba.
#[derive(Clone)]
pub struct TableCache {
    inner: Cache<Table, Arc<RawTable>>,
}

impl TableCache {
    pub fn new(default_ttl: Duration, overrides: HashMap<Table, Duration>) -> Self {
        let inner = Cache::builder()
            .max_capacity(64)
            .expire_after(PerTableExpiry { default_ttl, overrides })
            .build();
        Self { inner }
    }

    /// Devolve o retrato em cache ou executa `load`; leituras simultâneas
    /// da mesma aba esperam a mesma carga.
    pub async fn get_or_load<F>(&self, table: Table, load: F) -> Result<Arc<RawTable>, AppError>
    where
        F: Future<Output = Result<Arc<RawTable>, AppError>>,
    {
        self.inner
            .try_get_with(table, load)
            .await
            .map_err(|shared| {
                Arc::try_unwrap(shared).unwrap_or_else(|e| AppError::StoreError(e.to_string()))
            })
    }

    /// Descarta só a aba que foi alterada.
    pub async fn invalidate(&self, table: Table) {
        self.inner.invalidate(&table).await;
        tracing::debug!("Cache da aba {} invalidado", table.sheet_name());
    }
}

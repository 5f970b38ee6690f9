// src/db/lease_repo.rs

use crate::{
    common::error::AppError,
    db::{
        loader::{SheetRecord, TableLoader},
        store::Table,
    },
    models::lease::{Lease, LEASE_COLUMNS},
};

#[derive(Clone)]
pub struct LeaseRepository {
    loader: TableLoader,
}

impl LeaseRepository {
    pub fn new(loader: TableLoader) -> Self {
        Self { loader }
    }

    pub async fn list(&self) -> Result<Vec<Lease>, AppError> {
        self.loader.load::<Lease>().await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Lease>, AppError> {
        let id = id.trim();
        Ok(self.list().await?.into_iter().find(|l| l.id == id))
    }

    pub async fn create(&self, lease: &Lease) -> Result<(), AppError> {
        self.loader
            .store()
            .append_row(Table::Leases, lease.to_row())
            .await?;
        self.loader.invalidate(Table::Leases).await;
        Ok(())
    }

    /// Sobrescreve a linha inteira (A..P) do contrato.
    pub async fn update(&self, lease: &Lease) -> Result<(), AppError> {
        let row = self
            .loader
            .store()
            .find_row(Table::Leases, 1, &lease.id)
            .await?
            .ok_or_else(|| AppError::row_not_found("Contratos", &lease.id))?;

        self.loader
            .store()
            .update_row_range(Table::Leases, row, 1, LEASE_COLUMNS.len(), lease.to_row())
            .await?;
        self.loader.invalidate(Table::Leases).await;
        Ok(())
    }
}

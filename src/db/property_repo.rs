// src/db/property_repo.rs

use crate::{
    common::error::AppError,
    db::{
        loader::{SheetRecord, TableLoader},
        store::Table,
    },
    models::property::{Property, PropertyStatus, PROPERTY_COLUMNS, PROPERTY_STATUS_COLUMN},
};

// O repositório de imóveis, responsável por todas as interações com a aba 'Imoveis'
#[derive(Clone)]
pub struct PropertyRepository {
    loader: TableLoader,
}

impl PropertyRepository {
    pub fn new(loader: TableLoader) -> Self {
        Self { loader }
    }

    pub async fn list(&self) -> Result<Vec<Property>, AppError> {
        self.loader.load::<Property>().await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Property>, AppError> {
        let id = id.trim();
        Ok(self.list().await?.into_iter().find(|p| p.id == id))
    }

    pub async fn create(&self, property: &Property) -> Result<(), AppError> {
        self.loader
            .store()
            .append_row(Table::Properties, property.to_row())
            .await?;
        self.loader.invalidate(Table::Properties).await;
        Ok(())
    }

    /// Sobrescreve as colunas A..H da linha do imóvel.
    pub async fn update(&self, property: &Property) -> Result<(), AppError> {
        let row = self.locate(&property.id).await?;
        self.loader
            .store()
            .update_row_range(Table::Properties, row, 1, PROPERTY_COLUMNS.len(), property.to_row())
            .await?;
        self.loader.invalidate(Table::Properties).await;
        Ok(())
    }

    // Só a célula de status (coluna E)
    pub async fn set_status(&self, id: &str, status: &PropertyStatus) -> Result<(), AppError> {
        let row = self.locate(id).await?;
        self.loader
            .store()
            .update_cell(Table::Properties, row, PROPERTY_STATUS_COLUMN, status.to_string())
            .await?;
        self.loader.invalidate(Table::Properties).await;
        Ok(())
    }

    async fn locate(&self, id: &str) -> Result<usize, AppError> {
        self.loader
            .store()
            .find_row(Table::Properties, 1, id)
            .await?
            .ok_or_else(|| AppError::row_not_found("Imoveis", id))
    }
}

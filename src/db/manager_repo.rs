// src/db/manager_repo.rs

use crate::{common::error::AppError, db::loader::TableLoader, models::manager::Manager};

#[derive(Clone)]
pub struct ManagerRepository {
    loader: TableLoader,
}

impl ManagerRepository {
    pub fn new(loader: TableLoader) -> Self {
        Self { loader }
    }

    // Nomes vazios são descartados
    pub async fn list(&self) -> Result<Vec<Manager>, AppError> {
        let managers = self.loader.load::<Manager>().await?;
        Ok(managers
            .into_iter()
            .filter(|m| !m.name.trim().is_empty())
            .collect())
    }
}

// src/models/manager.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::db::{
    loader::{RowView, SheetRecord},
    store::Table,
};

pub const MANAGER_COLUMNS: [&str; 1] = ["Nome_Gestor"];

// Gestor responsável pelos contratos (aba Gestores)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Manager {
    #[schema(example = "Maria Souza")]
    pub name: String,
}

impl SheetRecord for Manager {
    const TABLE: Table = Table::Managers;

    fn from_row(row: &RowView<'_>) -> Self {
        Self {
            name: row.text("Nome_Gestor"),
        }
    }

    fn to_row(&self) -> Vec<String> {
        vec![self.name.clone()]
    }
}

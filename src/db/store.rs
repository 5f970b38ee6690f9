// src/db/store.rs

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        PoisonError, RwLock,
    },
};

use crate::{
    common::error::AppError,
    models::{
        lease::LEASE_COLUMNS, manager::MANAGER_COLUMNS, payment::LEDGER_COLUMNS,
        property::PROPERTY_COLUMNS,
    },
};

/// As abas da planilha "Controle de Aluguéis".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Properties,
    Leases,
    Ledger,
    Managers,
}

impl Table {
    pub const ALL: [Table; 4] = [Table::Properties, Table::Leases, Table::Ledger, Table::Managers];

    pub fn sheet_name(self) -> &'static str {
        match self {
            Table::Properties => "Imoveis",
            Table::Leases => "Contratos",
            Table::Ledger => "Lancamentos_Financeiros",
            Table::Managers => "Gestores",
        }
    }

    /// Ordem fixa das colunas; as escritas são posicionais.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Table::Properties => &PROPERTY_COLUMNS,
            Table::Leases => &LEASE_COLUMNS,
            Table::Ledger => &LEDGER_COLUMNS,
            Table::Managers => &MANAGER_COLUMNS,
        }
    }
}

/// Contrato mínimo com o armazenamento tabular (linhas e colunas começam em 1,
/// a linha 1 é o cabeçalho).
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Todas as linhas da aba, cabeçalho incluído.
    async fn read_all(&self, table: Table) -> Result<Vec<Vec<String>>, AppError>;

    async fn append_row(&self, table: Table, values: Vec<String>) -> Result<(), AppError>;

    async fn update_cell(
        &self,
        table: Table,
        row: usize,
        column: usize,
        value: String,
    ) -> Result<(), AppError>;

    async fn update_row_range(
        &self,
        table: Table,
        row: usize,
        start_column: usize,
        end_column: usize,
        values: Vec<String>,
    ) -> Result<(), AppError>;

    /// Primeira linha de dados cuja célula em `column` é igual a `value`.
    async fn find_row(
        &self,
        table: Table,
        column: usize,
        value: &str,
    ) -> Result<Option<usize>, AppError> {
        let rows = self.read_all(table).await?;
        let needle = value.trim();
        let found = rows
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| {
                row.get(column.saturating_sub(1))
                    .is_some_and(|cell| cell.trim() == needle)
            })
            .map(|(index, _)| index + 1);
        Ok(found)
    }
}

pub(crate) fn check_range_width(
    start_column: usize,
    end_column: usize,
    values: &[String],
) -> Result<(), AppError> {
    if start_column == 0 || end_column < start_column || values.len() != end_column - start_column + 1 {
        return Err(AppError::StoreError(format!(
            "intervalo de colunas {}..{} incompatível com {} valores",
            start_column,
            end_column,
            values.len()
        )));
    }
    Ok(())
}

// =========================================================================
//  ARMAZENAMENTO EM MEMÓRIA (desenvolvimento local e testes)
// =========================================================================

#[derive(Default)]
pub struct MemoryStore {
    sheets: RwLock<HashMap<Table, Vec<Vec<String>>>>,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cria todas as abas apenas com o cabeçalho.
    pub fn with_headers() -> Self {
        let store = Self::new();
        {
            let mut sheets = store.sheets.write().unwrap_or_else(PoisonError::into_inner);
            for table in Table::ALL {
                let header = table.columns().iter().map(|c| c.to_string()).collect();
                sheets.insert(table, vec![header]);
            }
        }
        store
    }

    pub fn seed(&self, table: Table, rows: Vec<Vec<String>>) {
        let mut sheets = self.sheets.write().unwrap_or_else(PoisonError::into_inner);
        sheets.entry(table).or_default().extend(rows);
    }

    pub fn snapshot(&self, table: Table) -> Vec<Vec<String>> {
        let sheets = self.sheets.read().unwrap_or_else(PoisonError::into_inner);
        sheets.get(&table).cloned().unwrap_or_default()
    }

    /// Quantas leituras completas de aba chegaram ao armazenamento.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TabularStore for MemoryStore {
    async fn read_all(&self, table: Table) -> Result<Vec<Vec<String>>, AppError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot(table))
    }

    async fn append_row(&self, table: Table, values: Vec<String>) -> Result<(), AppError> {
        self.seed(table, vec![values]);
        Ok(())
    }

    async fn update_cell(
        &self,
        table: Table,
        row: usize,
        column: usize,
        value: String,
    ) -> Result<(), AppError> {
        self.update_row_range(table, row, column, column, vec![value]).await
    }

    async fn update_row_range(
        &self,
        table: Table,
        row: usize,
        start_column: usize,
        end_column: usize,
        values: Vec<String>,
    ) -> Result<(), AppError> {
        check_range_width(start_column, end_column, &values)?;

        let mut sheets = self.sheets.write().unwrap_or_else(PoisonError::into_inner);
        let target = sheets
            .get_mut(&table)
            .and_then(|rows| rows.get_mut(row.wrapping_sub(1)))
            .ok_or_else(|| {
                AppError::StoreError(format!("linha {} inexistente na aba {}", row, table.sheet_name()))
            })?;

        if target.len() < end_column {
            target.resize(end_column, String::new());
        }
        for (offset, value) in values.into_iter().enumerate() {
            target[start_column - 1 + offset] = value;
        }
        Ok(())
    }
}

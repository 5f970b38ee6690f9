// src/db/ledger_repo.rs

use crate::{
    common::error::AppError,
    db::{
        loader::{SheetRecord, TableLoader},
        store::Table,
    },
    models::payment::{EntryValidity, LedgerEntry, LEDGER_VALIDITY_COLUMN},
};

// Lançamentos financeiros: só inclusão e cancelamento, nunca exclusão
#[derive(Clone)]
pub struct LedgerRepository {
    loader: TableLoader,
}

impl LedgerRepository {
    pub fn new(loader: TableLoader) -> Self {
        Self { loader }
    }

    pub async fn list(&self) -> Result<Vec<LedgerEntry>, AppError> {
        self.loader.load::<LedgerEntry>().await
    }

    /// Próximo ID = total de linhas da aba, cabeçalho incluído.
    /// Lido direto do armazenamento, sem passar pelo cache.
    pub async fn next_id(&self) -> Result<usize, AppError> {
        let rows = self.loader.store().read_all(Table::Ledger).await?;
        Ok(rows.len().max(1))
    }

    pub async fn append(&self, entry: &LedgerEntry) -> Result<(), AppError> {
        self.loader
            .store()
            .append_row(Table::Ledger, entry.to_row())
            .await?;
        self.loader.invalidate(Table::Ledger).await;
        Ok(())
    }

    /// Válido -> Cancelado. Nada é escrito se o ID não existir ou já estiver cancelado.
    pub async fn cancel(&self, id: &str) -> Result<(), AppError> {
        let rows = self.loader.store().read_all(Table::Ledger).await?;
        let needle = id.trim();

        let (index, row) = rows
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| row.first().is_some_and(|cell| cell.trim() == needle))
            .ok_or_else(|| AppError::row_not_found("Lancamentos_Financeiros", id))?;

        let current = row
            .get(LEDGER_VALIDITY_COLUMN - 1)
            .map(|cell| EntryValidity::parse(cell))
            .unwrap_or(EntryValidity::Unrecognized(String::new()));
        if current == EntryValidity::Cancelled {
            return Err(AppError::PaymentAlreadyCancelled(needle.to_string()));
        }

        self.loader
            .store()
            .update_cell(
                Table::Ledger,
                index + 1,
                LEDGER_VALIDITY_COLUMN,
                EntryValidity::Cancelled.to_string(),
            )
            .await?;
        self.loader.invalidate(Table::Ledger).await;
        Ok(())
    }
}

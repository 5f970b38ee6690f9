// src/db/loader.rs

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::{str::FromStr, sync::Arc};

use crate::{
    common::error::AppError,
    db::{
        cache::TableCache,
        store::{Table, TabularStore},
    },
};

/// Aba carregada: cabeçalho + linhas de dados, todas com a largura do cabeçalho.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn from_values(values: Vec<Vec<String>>) -> Self {
        let mut lines = values.into_iter();
        let headers: Vec<String> = match lines.next() {
            Some(header) => header.iter().map(|h| h.trim().to_string()).collect(),
            None => return Self::default(),
        };
        let width = headers.len();

        // A API do Sheets corta células vazias no fim da linha
        let rows = lines
            .filter(|cells| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|mut cells| {
                cells.resize(width, String::new());
                cells
            })
            .collect();

        Self { headers, rows }
    }

    /// Só cabeçalho (ou nada): resultado vazio válido, não é erro.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records<T: SheetRecord>(&self) -> Vec<T> {
        self.rows
            .iter()
            .map(|cells| {
                T::from_row(&RowView {
                    headers: &self.headers,
                    cells,
                })
            })
            .collect()
    }
}

/// Uma linha acessada pelo nome da coluna.
pub struct RowView<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> RowView<'a> {
    pub fn new(headers: &'a [String], cells: &'a [String]) -> Self {
        Self { headers, cells }
    }

    fn raw(&self, column: &str) -> &str {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|index| self.cells.get(index))
            .map(|cell| cell.as_str())
            .unwrap_or("")
    }

    /// Identificadores e textos livres: sempre texto, preserva zeros à esquerda.
    pub fn text(&self, column: &str) -> String {
        self.raw(column).trim().to_string()
    }

    pub fn money(&self, column: &str) -> Decimal {
        parse_money(self.raw(column))
    }

    pub fn day(&self, column: &str) -> u32 {
        parse_day(self.raw(column))
    }

    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        parse_date(self.raw(column))
    }
}

/// Valor monetário; qualquer coisa ilegível vira zero.
pub fn parse_money(raw: &str) -> Decimal {
    let cleaned = raw.trim().trim_start_matches("R$").trim().replace(' ', "");
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    if let Ok(value) = Decimal::from_str(&cleaned) {
        return value;
    }

    match normalize_separators(&cleaned) {
        Some(normalized) => Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO),
        None => Decimal::ZERO,
    }
}

// O último separador ("." ou ",") é o decimal; o outro agrupa milhares.
// Uma vírgula isolada seguida de três dígitos ("1,500") é ambígua.
fn normalize_separators(cleaned: &str) -> Option<String> {
    match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => {
            Some(cleaned.replace('.', "").replace(',', "."))
        }
        (Some(_), Some(_)) => Some(cleaned.replace(',', "")),
        (None, Some(_)) => {
            let groups: Vec<&str> = cleaned.split(',').collect();
            match groups.as_slice() {
                [_, decimals] if decimals.len() != 3 => Some(cleaned.replace(',', ".")),
                [_, _] => None,
                [_, rest @ ..] if rest.iter().all(|g| g.len() == 3) => {
                    Some(cleaned.replace(',', ""))
                }
                _ => None,
            }
        }
        (Some(_), None) => {
            // Mais de um ponto: separador de milhares (1.234.567)
            let groups: Vec<&str> = cleaned.split('.').collect();
            match groups.as_slice() {
                [_, rest @ ..] if rest.len() > 1 && rest.iter().all(|g| g.len() == 3) => {
                    Some(cleaned.replace('.', ""))
                }
                _ => None,
            }
        }
        (None, None) => None,
    }
}

/// Dia do mês; ilegível ou negativo vira zero.
pub fn parse_day(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if let Ok(day) = trimmed.parse::<u32>() {
        return day;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value.trunc() as u32,
        _ => 0,
    }
}

/// Data ilegível vira `None` ("sem data") e fica fora dos cálculos.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// Registro tipado de uma aba (o equivalente ao `FromRow` para a planilha).
pub trait SheetRecord: Sized {
    const TABLE: Table;

    fn from_row(row: &RowView<'_>) -> Self;

    /// Linha na ordem fixa de colunas da aba.
    fn to_row(&self) -> Vec<String>;
}

/// Leitura das abas passando pelo cache.
#[derive(Clone)]
pub struct TableLoader {
    store: Arc<dyn TabularStore>,
    cache: TableCache,
}

impl TableLoader {
    pub fn new(store: Arc<dyn TabularStore>, cache: TableCache) -> Self {
        Self { store, cache }
    }

    pub fn store(&self) -> &Arc<dyn TabularStore> {
        &self.store
    }

    pub async fn raw(&self, table: Table) -> Result<Arc<RawTable>, AppError> {
        self.cache
            .get_or_load(table, async {
                let values = self.store.read_all(table).await?;
                let snapshot = Arc::new(RawTable::from_values(values));
                if snapshot.is_empty() {
                    tracing::info!("Aba {} sem dados além do cabeçalho", table.sheet_name());
                }
                Ok::<_, AppError>(snapshot)
            })
            .await
    }

    pub async fn load<T: SheetRecord>(&self) -> Result<Vec<T>, AppError> {
        Ok(self.raw(T::TABLE).await?.records())
    }

    pub async fn invalidate(&self, table: Table) {
        self.cache.invalidate(table).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MemoryStore;
    use std::{collections::HashMap, time::Duration};

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn loader_over(store: Arc<MemoryStore>, ttl: Duration) -> TableLoader {
        TableLoader::new(store, TableCache::new(ttl, HashMap::new()))
    }

    #[test]
    fn header_only_sheet_is_an_empty_result() {
        assert!(RawTable::from_values(vec![]).is_empty());

        let table = RawTable::from_values(vec![cells(&["ID_Imovel", "Grupo"])]);
        assert!(table.is_empty());
        assert_eq!(table.headers, cells(&["ID_Imovel", "Grupo"]));
    }

    #[test]
    fn pads_short_rows_and_skips_blank_lines() {
        let table = RawTable::from_values(vec![
            cells(&["A", "B", "C"]),
            cells(&["1"]),
            cells(&["", " "]),
            cells(&["2", "x", "y", "extra"]),
        ]);

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], cells(&["1", "", ""]));
        assert_eq!(table.rows[1], cells(&["2", "x", "y"]));
    }

    #[test]
    fn coerces_money_and_days_to_zero_when_unreadable() {
        assert_eq!(parse_money("1500.50"), Decimal::new(150050, 2));
        assert_eq!(parse_money("R$ 1.234,56"), Decimal::new(123456, 2));
        assert_eq!(parse_money("850,00"), Decimal::new(85000, 2));
        assert_eq!(parse_money("1.234.567"), Decimal::new(1234567, 0));
        assert_eq!(parse_money("abc"), Decimal::ZERO);
        assert_eq!(parse_money(""), Decimal::ZERO);

        assert_eq!(parse_day("10"), 10);
        assert_eq!(parse_day("5.0"), 5);
        assert_eq!(parse_day("-3"), 0);
        assert_eq!(parse_day("dez"), 0);
    }

    #[test]
    fn thousands_separator_is_the_one_before_the_decimal_mark() {
        assert_eq!(parse_money("1,500.00"), Decimal::new(1500, 0));
        assert_eq!(parse_money("R$ 1.500,00"), Decimal::new(1500, 0));
        assert_eq!(parse_money("R$1,234,567.89"), Decimal::new(123456789, 2));
        assert_eq!(parse_money("2.500.000,5"), Decimal::new(25000005, 1));

        // "1,500" pode ser mil e quinhentos ou um e meio
        assert_eq!(parse_money("1,500"), Decimal::ZERO);
        assert_eq!(parse_money("1.2,3.4"), Decimal::ZERO);
    }

    #[test]
    fn unreadable_dates_become_no_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1);
        assert_eq!(parse_date("2025-03-01"), expected);
        assert_eq!(parse_date("01/03/2025"), expected);
        assert_eq!(parse_date("2025-03-01 00:00:00"), expected);
        assert_eq!(parse_date("2025-02-30"), None);
        assert_eq!(parse_date("amanhã"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn missing_columns_read_as_defaults() {
        let headers = cells(&["ID_Contrato"]);
        let row = cells(&["007"]);
        let view = RowView::new(&headers, &row);

        assert_eq!(view.text("ID_Contrato"), "007");
        assert_eq!(view.text("Nome_Locatario"), "");
        assert_eq!(view.money("Valor_Aluguel_Base"), Decimal::ZERO);
        assert_eq!(view.date("Data_Inicio"), None);
    }

    #[tokio::test]
    async fn second_load_within_ttl_does_not_hit_the_store() {
        let store = Arc::new(MemoryStore::with_headers());
        store.seed(Table::Managers, vec![cells(&["Ana"])]);
        let loader = loader_over(store.clone(), Duration::from_secs(600));

        let first = loader.raw(Table::Managers).await.unwrap();
        let second = loader.raw(Table::Managers).await.unwrap();

        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn invalidation_is_scoped_to_one_table() {
        let store = Arc::new(MemoryStore::with_headers());
        let loader = loader_over(store.clone(), Duration::from_secs(600));

        loader.raw(Table::Managers).await.unwrap();
        loader.raw(Table::Properties).await.unwrap();
        assert_eq!(store.read_count(), 2);

        store.seed(Table::Managers, vec![cells(&["Bruno"])]);
        loader.invalidate(Table::Managers).await;

        let managers = loader.raw(Table::Managers).await.unwrap();
        loader.raw(Table::Properties).await.unwrap();

        assert_eq!(managers.rows.len(), 1);
        assert_eq!(store.read_count(), 3);
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_read() {
        let store = Arc::new(MemoryStore::with_headers());
        store.seed(Table::Properties, vec![cells(&["A1", "Aurora"])]);
        let loader = loader_over(store.clone(), Duration::from_secs(600));

        let (a, b, c) = tokio::join!(
            loader.raw(Table::Properties),
            loader.raw(Table::Properties),
            loader.raw(Table::Properties),
        );

        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(c.unwrap().rows.len(), 1);
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn expired_entries_are_fetched_again() {
        let store = Arc::new(MemoryStore::with_headers());
        let loader = loader_over(store.clone(), Duration::from_millis(50));

        loader.raw(Table::Ledger).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        loader.raw(Table::Ledger).await.unwrap();

        assert_eq!(store.read_count(), 2);
    }
}

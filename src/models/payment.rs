// src/models/payment.rs

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    common::validation::validate_not_negative,
    db::{
        loader::{format_date, RowView, SheetRecord},
        store::Table,
    },
};

pub const LEDGER_COLUMNS: [&str; 10] = [
    "ID_Lancamento",
    "ID_Contrato",
    "Mes_Referencia",
    "Data_Pagamento",
    "Valor_Aluguel_Pago",
    "Valor_Multa_Juros",
    "Valor_Total_Pago",
    "Forma_Pagamento",
    "Status_Pagamento",
    "Status_Lancamento",
];

// Coluna J (1-based) da aba Lancamentos_Financeiros
pub const LEDGER_VALIDITY_COLUMN: usize = 10;

pub const PAYMENT_STATUS_PAID: &str = "Pago";

// =========================================================================
//  MÊS DE REFERÊNCIA (MM/AAAA)
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferencePeriod {
    year: i32,
    month: u32,
}

impl ReferencePeriod {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Aceita "03/2025" e "3/2025".
    pub fn parse(token: &str) -> Option<Self> {
        let (month, year) = token.trim().split_once('/')?;
        let month: u32 = month.trim().parse().ok()?;
        let year: i32 = year.trim().parse().ok()?;
        if !(1..=12).contains(&month) || !(1000..=9999).contains(&year) {
            return None;
        }
        Some(Self { year, month })
    }
}

impl fmt::Display for ReferencePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

// =========================================================================
//  STATUS DO LANÇAMENTO
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryValidity {
    Valid,     // Válido
    Cancelled, // Cancelado
    Unrecognized(String),
}

impl EntryValidity {
    pub fn as_str(&self) -> &str {
        match self {
            EntryValidity::Valid => "Válido",
            EntryValidity::Cancelled => "Cancelado",
            EntryValidity::Unrecognized(raw) => raw,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Válido" => EntryValidity::Valid,
            "Cancelado" => EntryValidity::Cancelled,
            other => EntryValidity::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for EntryValidity {
    fn from(raw: String) -> Self {
        EntryValidity::parse(&raw)
    }
}

impl From<EntryValidity> for String {
    fn from(validity: EntryValidity) -> Self {
        validity.as_str().to_string()
    }
}

impl fmt::Display for EntryValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentMethod {
    #[serde(rename = "PIX")]
    Pix,
    Boleto,
    #[serde(rename = "Transferência")]
    Transfer,
    Dinheiro,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Boleto => "Boleto",
            PaymentMethod::Transfer => "Transferência",
            PaymentMethod::Dinheiro => "Dinheiro",
        }
    }
}

// =========================================================================
//  LANÇAMENTO
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    #[schema(example = "12")]
    pub id: String,
    pub lease_id: String,

    #[schema(example = "03/2025")]
    pub reference_period: String,

    #[schema(value_type = Option<String>, format = Date, example = "2025-03-08")]
    pub payment_date: Option<NaiveDate>,

    pub base_rent_paid: Decimal,
    pub penalty_interest: Decimal,
    pub total_paid: Decimal,

    #[schema(example = "PIX")]
    pub method: String,
    #[schema(example = "Pago")]
    pub payment_status: String,

    #[schema(value_type = String, example = "Válido")]
    pub validity: EntryValidity,
}

impl LedgerEntry {
    pub fn is_valid(&self) -> bool {
        self.validity == EntryValidity::Valid
    }

    pub fn period(&self) -> Option<ReferencePeriod> {
        ReferencePeriod::parse(&self.reference_period)
    }

    pub fn is_valid_for(&self, period: ReferencePeriod) -> bool {
        self.is_valid() && self.period() == Some(period)
    }
}

impl SheetRecord for LedgerEntry {
    const TABLE: Table = Table::Ledger;

    fn from_row(row: &RowView<'_>) -> Self {
        Self {
            id: row.text("ID_Lancamento"),
            lease_id: row.text("ID_Contrato"),
            reference_period: row.text("Mes_Referencia"),
            payment_date: row.date("Data_Pagamento"),
            base_rent_paid: row.money("Valor_Aluguel_Pago"),
            penalty_interest: row.money("Valor_Multa_Juros"),
            total_paid: row.money("Valor_Total_Pago"),
            method: row.text("Forma_Pagamento"),
            payment_status: row.text("Status_Pagamento"),
            validity: EntryValidity::parse(&row.text("Status_Lancamento")),
        }
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.lease_id.clone(),
            self.reference_period.clone(),
            format_date(self.payment_date),
            self.base_rent_paid.to_string(),
            self.penalty_interest.to_string(),
            self.total_paid.to_string(),
            self.method.clone(),
            self.payment_status.clone(),
            self.validity.to_string(),
        ]
    }
}

// =========================================================================
//  PAYLOADS E HISTÓRICO
// =========================================================================

fn validate_reference_period(token: &str) -> Result<(), ValidationError> {
    if ReferencePeriod::parse(token).is_none() {
        let mut err = ValidationError::new("reference_period");
        err.message = Some("O mês de referência deve estar no formato MM/AAAA.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPaymentPayload {
    #[validate(length(min = 1, message = "Selecione um contrato."))]
    pub lease_id: String,

    #[validate(custom(function = "validate_reference_period"))]
    #[schema(example = "03/2025")]
    pub reference_period: String,

    #[schema(value_type = String, format = Date, example = "2025-03-08")]
    pub payment_date: NaiveDate,

    #[validate(custom(function = "validate_not_negative"))]
    pub base_rent_paid: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub penalty_interest: Decimal,

    pub method: PaymentMethod,
}

impl NewPaymentPayload {
    /// Total = aluguel + multa/juros; sempre "Pago" e "Válido".
    pub fn into_entry(self, id: usize) -> LedgerEntry {
        // Mês normalizado para MM/AAAA
        let reference_period = ReferencePeriod::parse(&self.reference_period)
            .map(|p| p.to_string())
            .unwrap_or_else(|| self.reference_period.trim().to_string());

        LedgerEntry {
            id: id.to_string(),
            lease_id: self.lease_id.trim().to_string(),
            reference_period,
            payment_date: Some(self.payment_date),
            base_rent_paid: self.base_rent_paid,
            penalty_interest: self.penalty_interest,
            total_paid: self.base_rent_paid + self.penalty_interest,
            method: self.method.as_str().to_string(),
            payment_status: PAYMENT_STATUS_PAID.to_string(),
            validity: EntryValidity::Valid,
        }
    }
}

// Query string de GET /payments (intervalo inclusivo)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistoryFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub manager: Option<String>,
    pub group: Option<String>,
    pub lease_id: Option<String>,
}

// Lançamento com o contexto do contrato e do imóvel
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistoryRow {
    pub entry: LedgerEntry,
    pub property_id: String,
    pub group: Option<String>,
    pub tenant_name: String,
    pub manager: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistory {
    pub rows: Vec<PaymentHistoryRow>,
    // Soma só dos lançamentos "Válido"
    pub total_valid: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_periods_normalize_month_padding() {
        let march = ReferencePeriod::of(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(march.to_string(), "03/2025");
        assert_eq!(ReferencePeriod::parse("3/2025"), Some(march));
        assert_eq!(ReferencePeriod::parse(" 03/2025 "), Some(march));
    }

    #[test]
    fn rejects_malformed_reference_periods() {
        assert_eq!(ReferencePeriod::parse("13/2025"), None);
        assert_eq!(ReferencePeriod::parse("00/2025"), None);
        assert_eq!(ReferencePeriod::parse("2025-03"), None);
        assert_eq!(ReferencePeriod::parse("03/25"), None);
    }

    #[test]
    fn new_payment_totals_and_normalizes_the_period() {
        let payload = NewPaymentPayload {
            lease_id: "L-1".into(),
            reference_period: "3/2025".into(),
            payment_date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            base_rent_paid: Decimal::new(1500, 0),
            penalty_interest: Decimal::new(4550, 2),
            method: PaymentMethod::Transfer,
        };
        assert!(payload.validate().is_ok());

        let entry = payload.into_entry(7);
        assert_eq!(entry.id, "7");
        assert_eq!(entry.reference_period, "03/2025");
        assert_eq!(entry.total_paid, Decimal::new(154550, 2));
        assert_eq!(entry.method, "Transferência");
        assert!(entry.is_valid());
        assert_eq!(entry.to_row().len(), LEDGER_COLUMNS.len());
    }

    #[test]
    fn rejects_malformed_reference_period_in_payload() {
        let payload = NewPaymentPayload {
            lease_id: "L-1".into(),
            reference_period: "2025-03".into(),
            payment_date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            base_rent_paid: Decimal::ONE,
            penalty_interest: Decimal::ZERO,
            method: PaymentMethod::Pix,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn only_valid_entries_count_for_a_period() {
        let march = ReferencePeriod::parse("03/2025").unwrap();
        let mut entry = LedgerEntry {
            id: "1".into(),
            lease_id: "L-1".into(),
            reference_period: "03/2025".into(),
            payment_date: None,
            base_rent_paid: Decimal::ZERO,
            penalty_interest: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            method: "PIX".into(),
            payment_status: PAYMENT_STATUS_PAID.into(),
            validity: EntryValidity::Valid,
        };
        assert!(entry.is_valid_for(march));

        entry.validity = EntryValidity::Cancelled;
        assert!(!entry.is_valid_for(march));
    }
}

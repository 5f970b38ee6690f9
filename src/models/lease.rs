// src/models/lease.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::validation::{validate_not_blank, validate_not_negative},
    db::{
        loader::{format_date, RowView, SheetRecord},
        store::Table,
    },
};

pub const LEASE_COLUMNS: [&str; 16] = [
    "ID_Contrato",
    "ID_Imovel",
    "Gestor_Responsavel",
    "Nome_Locatario",
    "CPF_Locatario",
    "Telefone_Locatario",
    "Email_Locatario",
    "Data_Inicio",
    "Data_Fim",
    "Valor_Aluguel_Base",
    "Dia_Vencimento",
    "Tipo_Garantia",
    "Valor_da_Garantia",
    "Indice_Reajuste",
    "Status_Contrato",
    "Observacoes_do_Contrato",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeaseStatus {
    Active,  // Ativo
    Ended,   // Encerrado
    Renewed, // Renovado
    Unrecognized(String),
}

impl LeaseStatus {
    pub fn as_str(&self) -> &str {
        match self {
            LeaseStatus::Active => "Ativo",
            LeaseStatus::Ended => "Encerrado",
            LeaseStatus::Renewed => "Renovado",
            LeaseStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Ativo" => LeaseStatus::Active,
            "Encerrado" => LeaseStatus::Ended,
            "Renovado" => LeaseStatus::Renewed,
            other => LeaseStatus::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for LeaseStatus {
    fn from(raw: String) -> Self {
        LeaseStatus::parse(&raw)
    }
}

impl From<LeaseStatus> for String {
    fn from(status: LeaseStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for LeaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lease {
    #[schema(example = "RESI-APTO101-20250301")]
    pub id: String,
    pub property_id: String,
    pub manager: String,

    // Locatário
    pub tenant_name: String,
    pub tenant_cpf: String,
    pub tenant_phone: String,
    pub tenant_email: String,

    // Datas (None = data ilegível na planilha)
    #[schema(value_type = Option<String>, format = Date, example = "2025-03-01")]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date, example = "2028-02-29")]
    pub end_date: Option<NaiveDate>,

    // Valores
    #[schema(example = "1500.00")]
    pub base_rent: Decimal,
    #[schema(example = 10)]
    pub due_day: u32,

    #[schema(example = "Caução")]
    pub guarantee_type: String,
    pub guarantee_amount: Decimal,
    #[schema(example = "IGP-M")]
    pub readjust_index: String,

    #[schema(value_type = String, example = "Ativo")]
    pub status: LeaseStatus,
    pub notes: String,
}

impl Lease {
    pub fn is_active(&self) -> bool {
        self.status == LeaseStatus::Active
    }
}

impl SheetRecord for Lease {
    const TABLE: Table = Table::Leases;

    fn from_row(row: &RowView<'_>) -> Self {
        Self {
            id: row.text("ID_Contrato"),
            property_id: row.text("ID_Imovel"),
            manager: row.text("Gestor_Responsavel"),
            tenant_name: row.text("Nome_Locatario"),
            tenant_cpf: row.text("CPF_Locatario"),
            tenant_phone: row.text("Telefone_Locatario"),
            tenant_email: row.text("Email_Locatario"),
            start_date: row.date("Data_Inicio"),
            end_date: row.date("Data_Fim"),
            base_rent: row.money("Valor_Aluguel_Base"),
            due_day: row.day("Dia_Vencimento"),
            guarantee_type: row.text("Tipo_Garantia"),
            guarantee_amount: row.money("Valor_da_Garantia"),
            readjust_index: row.text("Indice_Reajuste"),
            status: LeaseStatus::parse(&row.text("Status_Contrato")),
            notes: row.text("Observacoes_do_Contrato"),
        }
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.property_id.clone(),
            self.manager.clone(),
            self.tenant_name.clone(),
            self.tenant_cpf.clone(),
            self.tenant_phone.clone(),
            self.tenant_email.clone(),
            format_date(self.start_date),
            format_date(self.end_date),
            self.base_rent.to_string(),
            self.due_day.to_string(),
            self.guarantee_type.clone(),
            self.guarantee_amount.to_string(),
            self.readjust_index.clone(),
            self.status.to_string(),
            self.notes.clone(),
        ]
    }
}

/// `{id_imovel}-{AAAAMMDD}`
pub fn generate_lease_id(property_id: &str, start_date: NaiveDate) -> String {
    format!("{}-{}", property_id, start_date.format("%Y%m%d"))
}

// =========================================================================
//  PAYLOADS
// =========================================================================

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewLeasePayload {
    #[validate(length(min = 1, message = "Selecione um imóvel."))]
    #[schema(example = "RESI-APTO101")]
    pub property_id: String,

    #[validate(custom(function = "validate_not_blank", message = "Selecione o gestor responsável."))]
    pub manager: String,

    #[validate(custom(function = "validate_not_blank", message = "O nome do locatário é obrigatório."))]
    pub tenant_name: String,
    #[serde(default)]
    pub tenant_cpf: String,
    #[serde(default)]
    pub tenant_phone: String,
    #[serde(default)]
    pub tenant_email: String,

    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2026-02-28")]
    pub end_date: NaiveDate,

    #[validate(custom(function = "validate_not_negative"))]
    pub base_rent: Decimal,

    #[validate(range(min = 1, max = 31, message = "O dia de vencimento deve estar entre 1 e 31."))]
    pub due_day: u32,

    #[serde(default)]
    pub guarantee_type: String,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub guarantee_amount: Decimal,
    #[serde(default)]
    pub readjust_index: String,

    #[serde(default)]
    pub notes: String,
}

impl NewLeasePayload {
    /// Contrato novo sempre nasce "Ativo".
    pub fn into_lease(self) -> Lease {
        Lease {
            id: generate_lease_id(self.property_id.trim(), self.start_date),
            property_id: self.property_id.trim().to_string(),
            manager: self.manager.trim().to_string(),
            tenant_name: self.tenant_name.trim().to_string(),
            tenant_cpf: self.tenant_cpf.trim().to_string(),
            tenant_phone: self.tenant_phone.trim().to_string(),
            tenant_email: self.tenant_email.trim().to_string(),
            start_date: Some(self.start_date),
            end_date: Some(self.end_date),
            base_rent: self.base_rent,
            due_day: self.due_day,
            guarantee_type: self.guarantee_type.trim().to_string(),
            guarantee_amount: self.guarantee_amount,
            readjust_index: self.readjust_index.trim().to_string(),
            status: LeaseStatus::Active,
            notes: self.notes,
        }
    }
}

// Edição: ID, imóvel, garantia e índice de reajuste são preservados
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeasePayload {
    #[validate(custom(function = "validate_not_blank", message = "Selecione o gestor responsável."))]
    pub manager: String,

    #[validate(custom(function = "validate_not_blank", message = "O nome do locatário é obrigatório."))]
    pub tenant_name: String,
    #[serde(default)]
    pub tenant_cpf: String,
    #[serde(default)]
    pub tenant_phone: String,
    #[serde(default)]
    pub tenant_email: String,

    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,

    #[validate(custom(function = "validate_not_negative"))]
    pub base_rent: Decimal,

    #[validate(range(min = 1, max = 31, message = "O dia de vencimento deve estar entre 1 e 31."))]
    pub due_day: u32,

    #[schema(value_type = String, example = "Encerrado")]
    pub status: LeaseStatus,

    #[serde(default)]
    pub notes: String,
}

impl UpdateLeasePayload {
    pub fn apply_to(self, lease: &mut Lease) {
        lease.manager = self.manager.trim().to_string();
        lease.tenant_name = self.tenant_name.trim().to_string();
        lease.tenant_cpf = self.tenant_cpf.trim().to_string();
        lease.tenant_phone = self.tenant_phone.trim().to_string();
        lease.tenant_email = self.tenant_email.trim().to_string();
        lease.start_date = Some(self.start_date);
        lease.end_date = Some(self.end_date);
        lease.base_rent = self.base_rent;
        lease.due_day = self.due_day;
        lease.status = self.status;
        lease.notes = self.notes;
    }
}

// =========================================================================
//  LISTAGEM
// =========================================================================

// Query string de GET /leases
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseFilter {
    pub manager: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaseListing {
    pub leases: Vec<Lease>,
    pub shown: usize,
    pub total: usize,
    pub managers: Vec<String>,
    pub statuses: Vec<String>,
}

// src/models/property.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::validation::{validate_not_blank, validate_not_negative},
    db::{
        loader::{RowView, SheetRecord},
        store::Table,
    },
};

pub const PROPERTY_COLUMNS: [&str; 8] = [
    "ID_Imovel",
    "Grupo",
    "Unidade",
    "Endereco_Completo",
    "Status",
    "Valor_IPTU_Anual",
    "Num_Medidor_Saneago",
    "Num_Medidor_Enel",
];

// Coluna E (1-based) da aba Imoveis
pub const PROPERTY_STATUS_COLUMN: usize = 5;

// --- Enums (mapeando o texto da planilha) ---

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyStatus {
    Vacant,           // Vago
    Rented,           // Alugado
    UnderMaintenance, // Em Manutenção
    Other,            // Outro
    // Texto desconhecido é preservado como está na planilha
    Unrecognized(String),
}

impl PropertyStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PropertyStatus::Vacant => "Vago",
            PropertyStatus::Rented => "Alugado",
            PropertyStatus::UnderMaintenance => "Em Manutenção",
            PropertyStatus::Other => "Outro",
            PropertyStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Vago" => PropertyStatus::Vacant,
            "Alugado" => PropertyStatus::Rented,
            "Em Manutenção" => PropertyStatus::UnderMaintenance,
            "Outro" => PropertyStatus::Other,
            other => PropertyStatus::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for PropertyStatus {
    fn from(raw: String) -> Self {
        PropertyStatus::parse(&raw)
    }
}

impl From<PropertyStatus> for String {
    fn from(status: PropertyStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tipos de unidade oferecidos no cadastro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum UnitKind {
    Apto,
    Casa,
    Sala,
    Loja,
}

impl UnitKind {
    pub fn label(self) -> &'static str {
        match self {
            UnitKind::Apto => "Apto",
            UnitKind::Casa => "Casa",
            UnitKind::Sala => "Sala",
            UnitKind::Loja => "Loja",
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[schema(example = "RESI-APTO101")]
    pub id: String,

    #[schema(example = "Residencial Ipê")]
    pub group: String,

    #[schema(example = "Apto 101")]
    pub unit: String,

    pub address: String,

    #[schema(value_type = String, example = "Vago")]
    pub status: PropertyStatus,

    #[schema(example = "1200.00")]
    pub annual_property_tax: Decimal,

    pub water_meter_id: String,
    pub power_meter_id: String,
}

impl SheetRecord for Property {
    const TABLE: Table = Table::Properties;

    fn from_row(row: &RowView<'_>) -> Self {
        Self {
            id: row.text("ID_Imovel"),
            group: row.text("Grupo"),
            unit: row.text("Unidade"),
            address: row.text("Endereco_Completo"),
            status: PropertyStatus::parse(&row.text("Status")),
            annual_property_tax: row.money("Valor_IPTU_Anual"),
            water_meter_id: row.text("Num_Medidor_Saneago"),
            power_meter_id: row.text("Num_Medidor_Enel"),
        }
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.group.clone(),
            self.unit.clone(),
            self.address.clone(),
            self.status.to_string(),
            self.annual_property_tax.to_string(),
            self.water_meter_id.clone(),
            self.power_meter_id.clone(),
        ]
    }
}

/// ID do imóvel: 4 primeiras letras do grupo + unidade, só A-Z/0-9.
/// "Residencial Ipê", "Apto 101" -> "RESI-APTO101"
pub fn generate_property_id(group: &str, unit: &str) -> String {
    let group_prefix: String = group
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase())
        .take(4)
        .collect();
    let clean_unit: String = unit
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect();
    format!("{}-{}", group_prefix, clean_unit)
}

// --- Payloads ---

// Cadastro de imóvel
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPropertyPayload {
    #[validate(custom(function = "validate_not_blank", message = "O grupo é obrigatório."))]
    #[schema(example = "Residencial Ipê")]
    pub group: String,

    pub unit_kind: UnitKind,

    #[validate(custom(function = "validate_not_blank", message = "O número da unidade é obrigatório."))]
    #[schema(example = "101")]
    pub unit_number: String,

    #[validate(custom(function = "validate_not_blank", message = "O endereço é obrigatório."))]
    pub address: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub annual_property_tax: Decimal,

    #[serde(default)]
    pub water_meter_id: String,
    #[serde(default)]
    pub power_meter_id: String,
}

impl NewPropertyPayload {
    /// "Apto 101"
    pub fn unit_label(&self) -> String {
        format!("{} {}", self.unit_kind.label(), self.unit_number.trim())
    }
}

// Edição: o ID nunca muda
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyPayload {
    #[validate(custom(function = "validate_not_blank", message = "O grupo é obrigatório."))]
    pub group: String,

    #[validate(custom(function = "validate_not_blank", message = "A unidade é obrigatória."))]
    pub unit: String,

    #[validate(custom(function = "validate_not_blank", message = "O endereço é obrigatório."))]
    pub address: String,

    #[schema(value_type = String, example = "Em Manutenção")]
    pub status: PropertyStatus,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub annual_property_tax: Decimal,

    #[serde(default)]
    pub water_meter_id: String,
    #[serde(default)]
    pub power_meter_id: String,
}

impl UpdatePropertyPayload {
    pub fn apply_to(self, property: &mut Property) {
        property.group = self.group.trim().to_string();
        property.unit = self.unit.trim().to_string();
        property.address = self.address.trim().to_string();
        property.status = self.status;
        property.annual_property_tax = self.annual_property_tax;
        property.water_meter_id = self.water_meter_id.trim().to_string();
        property.power_meter_id = self.power_meter_id.trim().to_string();
    }
}

// --- Listagem ---

// Query string de GET /properties (igualdade exata; vazio = todos)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilter {
    pub group: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListing {
    pub properties: Vec<Property>,
    pub shown: usize,
    pub total: usize,
    // Opções disponíveis para os filtros
    pub groups: Vec<String>,
    pub statuses: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_ids_from_group_and_unit() {
        assert_eq!(generate_property_id("Residencial Ipê", "Apto 101"), "RESI-APTO101");
        assert_eq!(generate_property_id("Ed. Sol", "Sala 2-B"), "EDSO-SALA2B");
        assert_eq!(generate_property_id("Vila", "Casa 3"), "VILA-CASA3");
    }

    #[test]
    fn unit_label_joins_kind_and_number() {
        let payload = NewPropertyPayload {
            group: "Vila".into(),
            unit_kind: UnitKind::Casa,
            unit_number: " 3 ".into(),
            address: "Rua A, 10".into(),
            annual_property_tax: Decimal::ZERO,
            water_meter_id: String::new(),
            power_meter_id: String::new(),
        };
        assert_eq!(payload.unit_label(), "Casa 3");
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn blank_unit_and_address_fail_validation() {
        let payload = NewPropertyPayload {
            group: "Aurora".into(),
            unit_kind: UnitKind::Apto,
            unit_number: "   ".into(),
            address: " ".into(),
            annual_property_tax: Decimal::ZERO,
            water_meter_id: String::new(),
            power_meter_id: String::new(),
        };

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("unit_number"));
        assert!(fields.contains_key("address"));
        assert!(!fields.contains_key("group"));
    }

    #[test]
    fn keeps_unknown_status_text() {
        assert_eq!(PropertyStatus::parse(" Alugado "), PropertyStatus::Rented);
        assert_eq!(PropertyStatus::parse("Em Manutenção"), PropertyStatus::UnderMaintenance);

        let odd = PropertyStatus::parse("Reservado");
        assert_eq!(odd, PropertyStatus::Unrecognized("Reservado".into()));
        assert_eq!(odd.to_string(), "Reservado");
    }

    #[test]
    fn row_round_trip_keeps_column_order() {
        let headers: Vec<String> = PROPERTY_COLUMNS.iter().map(|c| c.to_string()).collect();
        let cells: Vec<String> = [
            "VILA-CASA3", "Vila", "Casa 3", "Rua A, 10", "Vago", "950.00", "S-1", "E-2",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();

        let property = Property::from_row(&RowView::new(&headers, &cells));

        assert_eq!(property.status, PropertyStatus::Vacant);
        assert_eq!(property.annual_property_tax, Decimal::new(950, 0));
        assert_eq!(property.to_row(), cells);
    }
}

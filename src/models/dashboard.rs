// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// 1. Taxa de Ocupação
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OccupancySummary {
    pub rented: usize,
    pub total: usize,
    #[schema(example = "83.33")]
    pub rate: Decimal, // Percentual (0 quando não há imóveis)
}

// 2. Meta de Recebimento do mês
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    #[schema(example = "03/2025")]
    pub reference_period: String,
    pub expected: Decimal,  // Soma dos aluguéis base dos contratos ativos
    pub collected: Decimal, // Soma dos lançamentos válidos do mês
    pub rate: Decimal,      // Percentual (0 quando não há esperado)
}

// 3. Divergência entre imóveis "Alugado" e contratos "Ativo"
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub rented_properties: usize,
    pub active_leases: usize,
    pub mismatch: bool,
    pub rented_without_active_lease: Vec<String>,
    pub active_leases_on_unrented_properties: Vec<String>,
}

// 4. Painel de ações urgentes
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverdueLease {
    pub lease_id: String,
    pub property_id: String,
    pub tenant_name: String,
    pub manager: String,
    pub due_day: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringLease {
    pub lease_id: String,
    pub property_id: String,
    pub tenant_name: String,
    pub manager: String,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadjustmentDue {
    pub lease_id: String,
    pub property_id: String,
    pub tenant_name: String,
    pub manager: String,
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub next_anniversary: NaiveDate,
    pub readjust_index: String,
}

// 5. Gráficos
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupStatusCount {
    pub group: String,
    pub status: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupCollection {
    pub group: String,
    pub expected: Decimal,
    pub collected: Decimal,
    pub to_collect: Decimal, // Pode ser negativo (pago a mais)
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    #[schema(example = "2025-03")]
    pub month: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupRevenue {
    pub group: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    pub occupancy_by_group: Vec<GroupStatusCount>,
    pub collection_by_group: Vec<GroupCollection>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub revenue_by_group: Vec<GroupRevenue>,
}

// Visão Geral completa
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    #[schema(value_type = String, format = Date)]
    pub reference_date: NaiveDate,
    // Abas sem dados além do cabeçalho (aviso informativo, não erro)
    pub empty_tables: Vec<String>,
    pub occupancy: OccupancySummary,
    pub collection: CollectionSummary,
    pub reconciliation: ReconciliationReport,
    pub overdue: Vec<OverdueLease>,
    pub expiring: Vec<ExpiringLease>,
    pub readjustments: Vec<ReadjustmentDue>,
    pub charts: DashboardCharts,
}

// src/services/dashboard_service.rs

use chrono::NaiveDate;

use crate::{
    common::error::AppError,
    db::{LeaseRepository, LedgerRepository, PropertyRepository},
    models::{
        dashboard::{DashboardCharts, DashboardOverview},
        lease::Lease,
        payment::{LedgerEntry, ReferencePeriod},
        property::Property,
    },
    services::{metrics, rollups},
};

#[derive(Clone)]
pub struct DashboardService {
    properties: PropertyRepository,
    leases: LeaseRepository,
    ledger: LedgerRepository,
}

impl DashboardService {
    pub fn new(
        properties: PropertyRepository,
        leases: LeaseRepository,
        ledger: LedgerRepository,
    ) -> Self {
        Self { properties, leases, ledger }
    }

    pub async fn overview(&self, today: NaiveDate) -> Result<DashboardOverview, AppError> {
        let properties = self.properties.list().await?;
        let leases = self.leases.list().await?;
        let entries = self.ledger.list().await?;

        let overview = build_overview(&properties, &leases, &entries, today);
        if overview.reconciliation.mismatch {
            tracing::warn!(
                "⚠️ Divergência: {} imóveis 'Alugado' e {} contratos 'Ativo'",
                overview.reconciliation.rented_properties,
                overview.reconciliation.active_leases
            );
        }
        Ok(overview)
    }
}

/// Visão Geral completa sobre um retrato das três abas.
pub fn build_overview(
    properties: &[Property],
    leases: &[Lease],
    entries: &[LedgerEntry],
    today: NaiveDate,
) -> DashboardOverview {
    let period = ReferencePeriod::of(today);

    let mut empty_tables = Vec::new();
    if properties.is_empty() {
        empty_tables.push("Imoveis".to_string());
    }
    if leases.is_empty() {
        empty_tables.push("Contratos".to_string());
    }
    if entries.is_empty() {
        empty_tables.push("Lancamentos_Financeiros".to_string());
    }

    DashboardOverview {
        reference_date: today,
        empty_tables,
        occupancy: metrics::occupancy(properties),
        collection: metrics::collection(leases, entries, period),
        reconciliation: metrics::reconcile(properties, leases),
        overdue: metrics::overdue_leases(leases, entries, today),
        expiring: metrics::expiring_leases(leases, today),
        readjustments: metrics::upcoming_readjustments(leases, today),
        charts: DashboardCharts {
            occupancy_by_group: rollups::occupancy_by_group(properties),
            collection_by_group: rollups::collection_by_group(properties, leases, entries, period),
            monthly_revenue: rollups::monthly_revenue(entries, today),
            revenue_by_group: rollups::revenue_by_group(properties, leases, entries),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{store::Table, test_support::*};
    use crate::models::property::PropertyStatus;
    use crate::services::metrics::fixtures::*;
    use rust_decimal::Decimal;

    #[test]
    fn empty_sheets_give_zeroed_overview() {
        let overview = build_overview(&[], &[], &[], date(2025, 3, 15));

        assert_eq!(
            overview.empty_tables,
            vec!["Imoveis", "Contratos", "Lancamentos_Financeiros"]
        );
        assert_eq!(overview.occupancy.rate, Decimal::ZERO);
        assert_eq!(overview.collection.rate, Decimal::ZERO);
        assert!(!overview.reconciliation.mismatch);
        assert!(overview.overdue.is_empty());
        assert!(overview.charts.monthly_revenue.is_empty());
    }

    #[test]
    fn overview_combines_metrics_for_the_current_period() {
        let today = date(2025, 3, 15);
        let properties = vec![
            property("A1", "Aurora", PropertyStatus::Rented),
            property("A2", "Aurora", PropertyStatus::Vacant),
        ];
        let leases = vec![lease("L1", "A1", 1000, 10)];
        let entries = vec![entry("1", "L1", "02/2025", Some(date(2025, 2, 10)), 1000)];

        let overview = build_overview(&properties, &leases, &entries, today);

        assert!(overview.empty_tables.is_empty());
        assert_eq!(overview.occupancy.rate, Decimal::from(50));
        assert_eq!(overview.collection.reference_period, "03/2025");
        assert_eq!(overview.collection.collected, Decimal::ZERO);
        assert_eq!(overview.overdue.len(), 1);
        assert_eq!(overview.charts.revenue_by_group[0].total, Decimal::from(1000));
    }

    #[tokio::test]
    async fn overview_reads_each_sheet_once_inside_the_ttl() {
        let (store, loader) = memory_loader();
        store.seed(
            Table::Properties,
            vec![cells(&["A1", "Aurora", "Apto 1", "Rua A", "Alugado", "0", "", ""])],
        );
        let service = DashboardService::new(
            PropertyRepository::new(loader.clone()),
            LeaseRepository::new(loader.clone()),
            LedgerRepository::new(loader),
        );

        let first = service.overview(date(2025, 3, 15)).await.unwrap();
        let second = service.overview(date(2025, 3, 15)).await.unwrap();

        assert_eq!(first, second);
        assert!(first.reconciliation.mismatch);
        assert_eq!(first.reconciliation.rented_without_active_lease, vec!["A1".to_string()]);
        assert_eq!(store.read_count(), 3);
    }
}

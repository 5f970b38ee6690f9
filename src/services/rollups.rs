// src/services/rollups.rs
//
// Agregações por grupo e por mês usadas nos gráficos da Visão Geral.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::models::{
    dashboard::{GroupCollection, GroupRevenue, GroupStatusCount, MonthlyRevenue},
    lease::Lease,
    payment::{LedgerEntry, ReferencePeriod},
    property::Property,
};

pub const REVENUE_WINDOW_MONTHS: u32 = 12;

fn group_by_property(properties: &[Property]) -> HashMap<&str, &str> {
    let mut groups = HashMap::new();
    for property in properties {
        groups
            .entry(property.id.as_str())
            .or_insert(property.group.as_str());
    }
    groups
}

/// Contrato -> grupo do imóvel. Contratos de imóveis inexistentes ficam de fora.
fn group_by_lease<'a>(
    leases: impl Iterator<Item = &'a Lease>,
    property_groups: &HashMap<&str, &'a str>,
) -> HashMap<&'a str, &'a str> {
    leases
        .filter_map(|lease| {
            property_groups
                .get(lease.property_id.as_str())
                .map(|group| (lease.id.as_str(), *group))
        })
        .collect()
}

pub fn occupancy_by_group(properties: &[Property]) -> Vec<GroupStatusCount> {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for property in properties {
        *counts
            .entry((property.group.as_str(), property.status.as_str()))
            .or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((group, status), count)| GroupStatusCount {
            group: group.to_string(),
            status: status.to_string(),
            count,
        })
        .collect()
}

pub fn collection_by_group(
    properties: &[Property],
    leases: &[Lease],
    entries: &[LedgerEntry],
    period: ReferencePeriod,
) -> Vec<GroupCollection> {
    let property_groups = group_by_property(properties);
    let active: Vec<&Lease> = leases.iter().filter(|l| l.is_active()).collect();
    let lease_groups = group_by_lease(active.iter().copied(), &property_groups);

    // (esperado, recebido) por grupo; grupo aparece se tiver qualquer um dos dois
    let mut totals: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();

    for lease in &active {
        if let Some(group) = lease_groups.get(lease.id.as_str()) {
            totals.entry(group).or_default().0 += lease.base_rent;
        }
    }
    for entry in entries.iter().filter(|e| e.is_valid_for(period)) {
        if let Some(group) = lease_groups.get(entry.lease_id.as_str()) {
            totals.entry(group).or_default().1 += entry.total_paid;
        }
    }

    totals
        .into_iter()
        .map(|(group, (expected, collected))| GroupCollection {
            group: group.to_string(),
            expected,
            collected,
            to_collect: expected - collected,
        })
        .collect()
}

/// Receita válida por mês de pagamento ("AAAA-MM"), últimos 12 meses.
pub fn monthly_revenue(entries: &[LedgerEntry], today: NaiveDate) -> Vec<MonthlyRevenue> {
    let cutoff = today.checked_sub_months(Months::new(REVENUE_WINDOW_MONTHS));

    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.is_valid()) {
        let Some(paid_on) = entry.payment_date else {
            continue;
        };
        if cutoff.is_some_and(|cutoff| paid_on <= cutoff) {
            continue;
        }
        *totals.entry(paid_on.format("%Y-%m").to_string()).or_default() += entry.total_paid;
    }

    totals
        .into_iter()
        .map(|(month, total)| MonthlyRevenue { month, total })
        .collect()
}

/// Receita válida de todo o histórico, por grupo (contratos de qualquer status).
pub fn revenue_by_group(
    properties: &[Property],
    leases: &[Lease],
    entries: &[LedgerEntry],
) -> Vec<GroupRevenue> {
    let property_groups = group_by_property(properties);
    let lease_groups = group_by_lease(leases.iter(), &property_groups);

    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.is_valid()) {
        if let Some(group) = lease_groups.get(entry.lease_id.as_str()) {
            *totals.entry(group).or_default() += entry.total_paid;
        }
    }

    totals
        .into_iter()
        .map(|(group, total)| GroupRevenue {
            group: group.to_string(),
            total,
        })
        .collect()
}

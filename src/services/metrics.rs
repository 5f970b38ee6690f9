// src/services/metrics.rs
//
// Indicadores da Visão Geral. Funções puras sobre um retrato das abas;
// `today` sempre vem de fora.

use chrono::{Datelike, Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::models::{
    dashboard::{
        CollectionSummary, ExpiringLease, OccupancySummary, OverdueLease, ReadjustmentDue,
        ReconciliationReport,
    },
    lease::Lease,
    payment::{LedgerEntry, ReferencePeriod},
    property::{Property, PropertyStatus},
};

pub const EXPIRY_WINDOW_DAYS: i64 = 60;
pub const READJUST_WINDOW_DAYS: i64 = 30;

/// part / whole * 100, arredondado em 2 casas; 0 quando não há base.
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED / whole).round_dp(2)
}

fn active(leases: &[Lease]) -> impl Iterator<Item = &Lease> {
    leases.iter().filter(|lease| lease.is_active())
}

// =========================================================================
//  OCUPAÇÃO E RECEBIMENTO
// =========================================================================

pub fn occupancy(properties: &[Property]) -> OccupancySummary {
    let rented = properties
        .iter()
        .filter(|p| p.status == PropertyStatus::Rented)
        .count();
    let total = properties.len();

    OccupancySummary {
        rented,
        total,
        rate: percentage(Decimal::from(rented), Decimal::from(total)),
    }
}

pub fn collection(
    leases: &[Lease],
    entries: &[LedgerEntry],
    period: ReferencePeriod,
) -> CollectionSummary {
    // Um contrato ativo é "esperado" em todo mês em que está ativo
    let expected: Decimal = active(leases).map(|lease| lease.base_rent).sum();
    let collected: Decimal = entries
        .iter()
        .filter(|entry| entry.is_valid_for(period))
        .map(|entry| entry.total_paid)
        .sum();

    CollectionSummary {
        reference_period: period.to_string(),
        expected,
        collected,
        rate: percentage(collected, expected),
    }
}

// =========================================================================
//  RECONCILIAÇÃO
// =========================================================================

pub fn reconcile(properties: &[Property], leases: &[Lease]) -> ReconciliationReport {
    let rented: Vec<&Property> = properties
        .iter()
        .filter(|p| p.status == PropertyStatus::Rented)
        .collect();
    let active_leases: Vec<&Lease> = active(leases).collect();

    let leased_property_ids: HashSet<&str> =
        active_leases.iter().map(|l| l.property_id.as_str()).collect();
    let rented_ids: HashSet<&str> = rented.iter().map(|p| p.id.as_str()).collect();

    ReconciliationReport {
        rented_properties: rented.len(),
        active_leases: active_leases.len(),
        mismatch: rented.len() != active_leases.len(),
        rented_without_active_lease: rented
            .iter()
            .filter(|p| !leased_property_ids.contains(p.id.as_str()))
            .map(|p| p.id.clone())
            .collect(),
        active_leases_on_unrented_properties: active_leases
            .iter()
            .filter(|l| !rented_ids.contains(l.property_id.as_str()))
            .map(|l| l.id.clone())
            .collect(),
    }
}

// =========================================================================
//  ALUGUÉIS EM ATRASO
// =========================================================================

/// Ativo, dia de hoje depois do vencimento e nenhum lançamento válido no mês.
/// Comparação ingênua de dia do mês: vencimento 31 nunca atrasa em mês de 30 dias.
pub fn overdue_leases(
    leases: &[Lease],
    entries: &[LedgerEntry],
    today: NaiveDate,
) -> Vec<OverdueLease> {
    let period = ReferencePeriod::of(today);
    let paid: HashSet<&str> = entries
        .iter()
        .filter(|entry| entry.is_valid_for(period))
        .map(|entry| entry.lease_id.as_str())
        .collect();

    active(leases)
        .filter(|lease| today.day() > lease.due_day && !paid.contains(lease.id.as_str()))
        .map(|lease| OverdueLease {
            lease_id: lease.id.clone(),
            property_id: lease.property_id.clone(),
            tenant_name: lease.tenant_name.clone(),
            manager: lease.manager.clone(),
            due_day: lease.due_day,
        })
        .collect()
}

// =========================================================================
//  CONTRATOS A VENCER E REAJUSTES
// =========================================================================

pub fn expiring_leases(leases: &[Lease], today: NaiveDate) -> Vec<ExpiringLease> {
    let limit = today + Duration::days(EXPIRY_WINDOW_DAYS);

    active(leases)
        .filter_map(|lease| {
            let end_date = lease.end_date?;
            (end_date > today && end_date <= limit).then(|| ExpiringLease {
                lease_id: lease.id.clone(),
                property_id: lease.property_id.clone(),
                tenant_name: lease.tenant_name.clone(),
                manager: lease.manager.clone(),
                end_date,
                days_remaining: (end_date - today).num_days(),
            })
        })
        .collect()
}

/// Anos completos entre duas datas (negativo se `to` vem antes).
pub fn whole_years_between(from: NaiveDate, to: NaiveDate) -> i32 {
    if to < from {
        return -whole_years_between(to, from);
    }
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}

/// Soma anos; 29/02 vira 28/02 em ano não bissexto.
pub fn add_years(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let months = Months::new(years.unsigned_abs() * 12);
    if years >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    }
}

pub fn next_anniversary(start_date: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    add_years(start_date, whole_years_between(start_date, today) + 1)
}

pub fn upcoming_readjustments(leases: &[Lease], today: NaiveDate) -> Vec<ReadjustmentDue> {
    let limit = today + Duration::days(READJUST_WINDOW_DAYS);

    active(leases)
        .filter_map(|lease| {
            let start_date = lease.start_date?;
            let anniversary = next_anniversary(start_date, today)?;
            (anniversary > today && anniversary <= limit).then(|| ReadjustmentDue {
                lease_id: lease.id.clone(),
                property_id: lease.property_id.clone(),
                tenant_name: lease.tenant_name.clone(),
                manager: lease.manager.clone(),
                start_date,
                next_anniversary: anniversary,
                readjust_index: lease.readjust_index.clone(),
            })
        })
        .collect()
}

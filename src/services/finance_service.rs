// src/services/finance_service.rs

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::{
    common::error::AppError,
    db::{LedgerRepository, LeaseRepository, PropertyRepository},
    models::{
        lease::Lease,
        payment::{LedgerEntry, NewPaymentPayload, PaymentHistory, PaymentHistoryFilter, PaymentHistoryRow},
        property::Property,
    },
    services::listing::matches,
};

#[derive(Clone)]
pub struct FinanceService {
    ledger: LedgerRepository,
    leases: LeaseRepository,
    properties: PropertyRepository,
}

impl FinanceService {
    pub fn new(
        ledger: LedgerRepository,
        leases: LeaseRepository,
        properties: PropertyRepository,
    ) -> Self {
        Self { ledger, leases, properties }
    }

    /// Registra um pagamento contra um contrato ativo.
    pub async fn log_payment(&self, payload: NewPaymentPayload) -> Result<LedgerEntry, AppError> {
        let lease = self
            .leases
            .find_by_id(&payload.lease_id)
            .await?
            .ok_or_else(|| AppError::row_not_found("Contratos", payload.lease_id.trim()))?;
        if !lease.is_active() {
            return Err(AppError::LeaseNotActive(lease.id));
        }

        let id = self.ledger.next_id().await?;
        let entry = payload.into_entry(id);
        self.ledger.append(&entry).await?;

        tracing::info!(
            "✅ Lançamento {} registrado: contrato {}, mês {}, total {}",
            entry.id,
            entry.lease_id,
            entry.reference_period,
            entry.total_paid
        );
        Ok(entry)
    }

    /// Cancelamento lógico e irreversível.
    pub async fn cancel_payment(&self, id: &str) -> Result<(), AppError> {
        self.ledger.cancel(id).await?;
        tracing::info!("✅ Lançamento {} cancelado", id.trim());
        Ok(())
    }

    pub async fn history(&self, filter: &PaymentHistoryFilter) -> Result<PaymentHistory, AppError> {
        let entries = self.ledger.list().await?;
        let leases = self.leases.list().await?;
        let properties = self.properties.list().await?;
        Ok(build_history(entries, &leases, &properties, filter))
    }
}

/// Lançamentos de contratos desconhecidos ficam de fora; com intervalo de datas,
/// os sem data também. Mais recentes primeiro.
pub fn build_history(
    entries: Vec<LedgerEntry>,
    leases: &[Lease],
    properties: &[Property],
    filter: &PaymentHistoryFilter,
) -> PaymentHistory {
    let leases_by_id: HashMap<&str, &Lease> = leases.iter().map(|l| (l.id.as_str(), l)).collect();
    let groups: HashMap<&str, &str> = properties
        .iter()
        .map(|p| (p.id.as_str(), p.group.as_str()))
        .collect();
    let has_range = filter.start_date.is_some() || filter.end_date.is_some();

    let mut rows: Vec<PaymentHistoryRow> = entries
        .into_iter()
        .filter_map(|entry| {
            let lease = leases_by_id.get(entry.lease_id.as_str())?;
            let group = groups.get(lease.property_id.as_str()).copied();

            if has_range {
                let paid_on = entry.payment_date?;
                if filter.start_date.is_some_and(|start| paid_on < start)
                    || filter.end_date.is_some_and(|end| paid_on > end)
                {
                    return None;
                }
            }
            let wants_group = filter.group.as_deref().is_some_and(|g| !g.trim().is_empty());
            if wants_group && !group.is_some_and(|g| matches(filter.group.as_deref(), g)) {
                return None;
            }
            if !matches(filter.manager.as_deref(), &lease.manager)
                || !matches(filter.lease_id.as_deref(), &lease.id)
            {
                return None;
            }

            Some(PaymentHistoryRow {
                property_id: lease.property_id.clone(),
                group: group.map(str::to_string),
                tenant_name: lease.tenant_name.clone(),
                manager: lease.manager.clone(),
                entry,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.entry.payment_date.cmp(&a.entry.payment_date));

    let total_valid: Decimal = rows
        .iter()
        .filter(|row| row.entry.is_valid())
        .map(|row| row.entry.total_paid)
        .sum();

    PaymentHistory { rows, total_valid }
}

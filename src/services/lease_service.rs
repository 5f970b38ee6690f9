// src/services/lease_service.rs

use chrono::NaiveDate;

use crate::{
    common::error::AppError,
    db::{LeaseRepository, PropertyRepository},
    models::{
        lease::{Lease, LeaseFilter, LeaseListing, NewLeasePayload, UpdateLeasePayload},
        property::PropertyStatus,
    },
    services::listing::{distinct, matches},
};

fn check_dates(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), AppError> {
    if end_date <= start_date {
        return Err(AppError::InvalidInput(
            "A data de fim do contrato deve ser posterior à data de início.".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct LeaseService {
    leases: LeaseRepository,
    properties: PropertyRepository,
}

impl LeaseService {
    pub fn new(leases: LeaseRepository, properties: PropertyRepository) -> Self {
        Self { leases, properties }
    }

    pub async fn list_all(&self) -> Result<Vec<Lease>, AppError> {
        self.leases.list().await
    }

    pub async fn find(&self, id: &str) -> Result<Lease, AppError> {
        self.leases
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::row_not_found("Contratos", id))
    }

    pub async fn list(&self, filter: &LeaseFilter) -> Result<LeaseListing, AppError> {
        let all = self.leases.list().await?;

        let managers = distinct(all.iter().map(|l| l.manager.as_str()));
        let statuses = distinct(all.iter().map(|l| l.status.as_str()));
        let total = all.len();

        let leases: Vec<Lease> = all
            .into_iter()
            .filter(|l| {
                matches(filter.manager.as_deref(), &l.manager)
                    && matches(filter.status.as_deref(), l.status.as_str())
            })
            .collect();

        Ok(LeaseListing {
            shown: leases.len(),
            total,
            leases,
            managers,
            statuses,
        })
    }

    /// Só imóvel "Vago" recebe contrato; o imóvel passa para "Alugado".
    pub async fn register(&self, payload: NewLeasePayload) -> Result<Lease, AppError> {
        check_dates(payload.start_date, payload.end_date)?;

        let property = self
            .properties
            .find_by_id(&payload.property_id)
            .await?
            .ok_or_else(|| AppError::row_not_found("Imoveis", payload.property_id.trim()))?;
        if property.status != PropertyStatus::Vacant {
            return Err(AppError::PropertyNotVacant(property.id));
        }

        let lease = payload.into_lease();
        if self.leases.find_by_id(&lease.id).await?.is_some() {
            return Err(AppError::DuplicateRecord {
                table: "Contratos",
                id: lease.id,
            });
        }

        // Sem transação: se a segunda escrita falhar, a reconciliação aponta a divergência
        self.leases.create(&lease).await?;
        self.properties
            .set_status(&property.id, &PropertyStatus::Rented)
            .await?;

        tracing::info!(
            "✅ Contrato {} registrado; imóvel {} agora está Alugado",
            lease.id,
            property.id
        );
        Ok(lease)
    }

    pub async fn update(&self, id: &str, payload: UpdateLeasePayload) -> Result<Lease, AppError> {
        check_dates(payload.start_date, payload.end_date)?;

        let mut lease = self.find(id).await?;
        payload.apply_to(&mut lease);
        self.leases.update(&lease).await?;

        tracing::info!("✅ Contrato {} atualizado", lease.id);
        Ok(lease)
    }
}

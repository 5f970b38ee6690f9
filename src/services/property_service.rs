// src/services/property_service.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    db::PropertyRepository,
    models::property::{
        generate_property_id, NewPropertyPayload, Property, PropertyFilter, PropertyListing,
        PropertyStatus, UpdatePropertyPayload,
    },
    services::listing::{distinct, matches},
};

#[derive(Clone)]
pub struct PropertyService {
    repo: PropertyRepository,
}

impl PropertyService {
    pub fn new(repo: PropertyRepository) -> Self {
        Self { repo }
    }

    pub async fn list_all(&self) -> Result<Vec<Property>, AppError> {
        self.repo.list().await
    }

    pub async fn find(&self, id: &str) -> Result<Property, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::row_not_found("Imoveis", id))
    }

    pub async fn list(&self, filter: &PropertyFilter) -> Result<PropertyListing, AppError> {
        let all = self.repo.list().await?;

        let groups = distinct(all.iter().map(|p| p.group.as_str()));
        let statuses = distinct(all.iter().map(|p| p.status.as_str()));
        let total = all.len();

        let properties: Vec<Property> = all
            .into_iter()
            .filter(|p| {
                matches(filter.group.as_deref(), &p.group)
                    && matches(filter.status.as_deref(), p.status.as_str())
            })
            .collect();

        Ok(PropertyListing {
            shown: properties.len(),
            total,
            properties,
            groups,
            statuses,
        })
    }

    /// Novo imóvel sempre nasce "Vago".
    pub async fn register(&self, payload: NewPropertyPayload) -> Result<Property, AppError> {
        payload.validate()?;
        let unit = payload.unit_label();
        let group = payload.group.trim().to_string();
        let id = generate_property_id(&group, &unit);

        if self.repo.find_by_id(&id).await?.is_some() {
            return Err(AppError::DuplicateRecord { table: "Imoveis", id });
        }

        let property = Property {
            id,
            group,
            unit,
            address: payload.address.trim().to_string(),
            status: PropertyStatus::Vacant,
            annual_property_tax: payload.annual_property_tax,
            water_meter_id: payload.water_meter_id.trim().to_string(),
            power_meter_id: payload.power_meter_id.trim().to_string(),
        };
        self.repo.create(&property).await?;

        tracing::info!("✅ Imóvel {} cadastrado no grupo {}", property.id, property.group);
        Ok(property)
    }

    pub async fn update(
        &self,
        id: &str,
        payload: UpdatePropertyPayload,
    ) -> Result<Property, AppError> {
        let mut property = self.find(id).await?;
        payload.apply_to(&mut property);
        self.repo.update(&property).await?;

        tracing::info!("✅ Imóvel {} atualizado", property.id);
        Ok(property)
    }
}

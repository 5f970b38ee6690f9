// src/services/form_flow.rs
//
// Máquina de estados dos formulários de várias etapas. As transições são
// puras; só o envio (Submit) chega aos serviços de escrita.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::ManagerRepository,
    models::{
        flow::{FlowInput, FlowKind, FlowRequest, FlowStep, FlowTarget, FlowView},
        lease::{Lease, NewLeasePayload, UpdateLeasePayload},
        payment::NewPaymentPayload,
        property::{Property, PropertyStatus, UpdatePropertyPayload},
    },
    services::{
        finance_service::FinanceService, lease_service::LeaseService, listing::distinct,
        property_service::PropertyService,
    },
};

fn invalid(message: impl Into<String>) -> AppError {
    AppError::InvalidFlowTransition(message.into())
}

/// Opções de seleção de um fluxo: grupos e alvos (imóveis ou contratos).
#[derive(Debug, Clone, Default)]
pub struct FlowCatalog {
    pub targets: Vec<FlowTarget>,
}

impl FlowCatalog {
    pub fn groups(&self) -> Vec<String> {
        distinct(self.targets.iter().map(|t| t.group.as_str()))
    }

    pub fn targets_in(&self, group: &str) -> Vec<FlowTarget> {
        self.targets
            .iter()
            .filter(|t| t.group == group)
            .cloned()
            .collect()
    }

    fn has_group(&self, group: &str) -> bool {
        self.targets.iter().any(|t| t.group == group)
    }

    fn has_target(&self, group: &str, id: &str) -> bool {
        self.targets.iter().any(|t| t.group == group && t.id == id)
    }
}

impl FlowStep {
    /// Escolhas e "voltar". `Submit` é tratado por quem executa o fluxo.
    pub fn apply(self, input: &FlowInput, catalog: &FlowCatalog) -> Result<FlowStep, AppError> {
        match (self, input) {
            (FlowStep::SelectGroup, FlowInput::ChooseGroup { group }) => {
                let group = group.trim();
                if !catalog.has_group(group) {
                    return Err(invalid(format!("grupo '{}' não disponível", group)));
                }
                Ok(FlowStep::SelectTarget { group: group.to_string() })
            }
            (FlowStep::SelectTarget { group }, FlowInput::ChooseTarget { id }) => {
                let id = id.trim();
                if !catalog.has_target(&group, id) {
                    return Err(invalid(format!("opção '{}' não disponível no grupo '{}'", id, group)));
                }
                Ok(FlowStep::EditForm { group, target_id: id.to_string() })
            }
            (FlowStep::SelectTarget { .. }, FlowInput::Back) => Ok(FlowStep::SelectGroup),
            (FlowStep::EditForm { group, .. }, FlowInput::Back) => Ok(FlowStep::SelectTarget { group }),
            (FlowStep::Submitted { .. }, _) => Err(invalid("formulário já enviado")),
            (step, input) => Err(invalid(format!("ação {:?} não permitida na etapa {:?}", input, step))),
        }
    }
}

// =========================================================================
//  EXECUÇÃO DOS FLUXOS
// =========================================================================

fn to_json<T: Serialize>(value: &T) -> Result<Value, AppError> {
    Ok(serde_json::to_value(value).map_err(anyhow::Error::from)?)
}

/// Lê o formulário enviado fixando o campo de seleção (imóvel/contrato).
fn read_form<T: DeserializeOwned + Validate>(
    mut form: Value,
    pinned: Option<(&str, &str)>,
) -> Result<T, AppError> {
    if let Some((field, value)) = pinned {
        let object = form
            .as_object_mut()
            .ok_or_else(|| AppError::InvalidInput("O formulário deve ser um objeto JSON.".to_string()))?;
        object.insert(field.to_string(), Value::String(value.to_string()));
    }
    let payload: T = serde_json::from_value(form)
        .map_err(|e| AppError::InvalidInput(format!("Formulário inválido: {}", e)))?;
    payload.validate()?;
    Ok(payload)
}

fn property_targets<'a>(properties: impl Iterator<Item = &'a Property>) -> Vec<FlowTarget> {
    properties
        .map(|p| FlowTarget {
            id: p.id.clone(),
            group: p.group.clone(),
            label: p.unit.clone(),
        })
        .collect()
}

// Contratos cujo imóvel não existe ficam fora das opções
fn lease_targets<'a>(
    leases: impl Iterator<Item = &'a Lease>,
    properties: &[Property],
) -> Vec<FlowTarget> {
    let by_id: HashMap<&str, &Property> = properties.iter().map(|p| (p.id.as_str(), p)).collect();
    leases
        .filter_map(|lease| {
            let property = by_id.get(lease.property_id.as_str())?;
            Some(FlowTarget {
                id: lease.id.clone(),
                group: property.group.clone(),
                label: format!("{} - {}", property.unit, lease.tenant_name),
            })
        })
        .collect()
}

#[derive(Clone)]
pub struct FlowService {
    properties: PropertyService,
    leases: LeaseService,
    finance: FinanceService,
    managers: ManagerRepository,
}

impl FlowService {
    pub fn new(
        properties: PropertyService,
        leases: LeaseService,
        finance: FinanceService,
        managers: ManagerRepository,
    ) -> Self {
        Self { properties, leases, finance, managers }
    }

    async fn catalog(&self, kind: FlowKind, include_inactive: bool) -> Result<FlowCatalog, AppError> {
        let properties = self.properties.list_all().await?;
        let targets = match kind {
            FlowKind::NewLease => property_targets(
                properties.iter().filter(|p| p.status == PropertyStatus::Vacant),
            ),
            FlowKind::EditProperty => property_targets(properties.iter()),
            FlowKind::EditLease => {
                let leases = self.leases.list_all().await?;
                lease_targets(
                    leases.iter().filter(|l| include_inactive || l.is_active()),
                    &properties,
                )
            }
            FlowKind::LogPayment => {
                let leases = self.leases.list_all().await?;
                lease_targets(leases.iter().filter(|l| l.is_active()), &properties)
            }
        };
        Ok(FlowCatalog { targets })
    }

    /// Reaplica as ações recebidas a partir do início e devolve a etapa final.
    pub async fn run(&self, kind: FlowKind, request: FlowRequest) -> Result<FlowView, AppError> {
        let catalog = self.catalog(kind, request.include_inactive).await?;

        let mut step = FlowStep::SelectGroup;
        for input in request.inputs {
            step = match (step, input) {
                (FlowStep::EditForm { target_id, .. }, FlowInput::Submit { form }) => {
                    let record_id = self.submit(kind, &target_id, form).await?;
                    FlowStep::Submitted { record_id }
                }
                (step, input) => step.apply(&input, &catalog)?,
            };
        }

        self.view(kind, step, &catalog).await
    }

    async fn submit(&self, kind: FlowKind, target_id: &str, form: Value) -> Result<String, AppError> {
        let record_id = match kind {
            FlowKind::NewLease => {
                let payload: NewLeasePayload = read_form(form, Some(("propertyId", target_id)))?;
                self.leases.register(payload).await?.id
            }
            FlowKind::EditProperty => {
                let payload: UpdatePropertyPayload = read_form(form, None)?;
                self.properties.update(target_id, payload).await?.id
            }
            FlowKind::EditLease => {
                let payload: UpdateLeasePayload = read_form(form, None)?;
                self.leases.update(target_id, payload).await?.id
            }
            FlowKind::LogPayment => {
                let payload: NewPaymentPayload = read_form(form, Some(("leaseId", target_id)))?;
                self.finance.log_payment(payload).await?.id
            }
        };
        Ok(record_id)
    }

    async fn view(&self, kind: FlowKind, step: FlowStep, catalog: &FlowCatalog) -> Result<FlowView, AppError> {
        let mut view = FlowView {
            flow: kind,
            step: step.clone(),
            groups: Vec::new(),
            targets: Vec::new(),
            prefill: None,
            managers: Vec::new(),
        };

        match &step {
            FlowStep::SelectGroup => view.groups = catalog.groups(),
            FlowStep::SelectTarget { group } => view.targets = catalog.targets_in(group),
            FlowStep::EditForm { target_id, .. } => {
                view.prefill = Some(match kind {
                    FlowKind::NewLease | FlowKind::EditProperty => {
                        to_json(&self.properties.find(target_id).await?)?
                    }
                    FlowKind::EditLease | FlowKind::LogPayment => {
                        to_json(&self.leases.find(target_id).await?)?
                    }
                });
                if matches!(kind, FlowKind::NewLease | FlowKind::EditLease) {
                    view.managers = self.managers.list().await?.into_iter().map(|m| m.name).collect();
                }
            }
            FlowStep::Submitted { .. } => {}
        }
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        store::{MemoryStore, Table},
        test_support::*,
        LeaseRepository, LedgerRepository, PropertyRepository,
    };
    use serde_json::json;
    use std::sync::Arc;

    fn catalog() -> FlowCatalog {
        FlowCatalog {
            targets: vec![
                FlowTarget { id: "AURO-APTO1".into(), group: "Aurora".into(), label: "Apto 1".into() },
                FlowTarget { id: "BELA-CASA1".into(), group: "Bela Vista".into(), label: "Casa 1".into() },
            ],
        }
    }

    fn choose_group(group: &str) -> FlowInput {
        FlowInput::ChooseGroup { group: group.into() }
    }

    fn choose_target(id: &str) -> FlowInput {
        FlowInput::ChooseTarget { id: id.into() }
    }

    #[test]
    fn walks_forward_and_back() {
        let catalog = catalog();

        let step = FlowStep::SelectGroup.apply(&choose_group("Aurora"), &catalog).unwrap();
        assert_eq!(step, FlowStep::SelectTarget { group: "Aurora".into() });

        let step = step.apply(&choose_target("AURO-APTO1"), &catalog).unwrap();
        assert_eq!(
            step,
            FlowStep::EditForm { group: "Aurora".into(), target_id: "AURO-APTO1".into() }
        );

        let step = step.apply(&FlowInput::Back, &catalog).unwrap();
        assert_eq!(step, FlowStep::SelectTarget { group: "Aurora".into() });
        assert_eq!(step.apply(&FlowInput::Back, &catalog).unwrap(), FlowStep::SelectGroup);
    }

    #[test]
    fn rejects_unknown_choices_and_out_of_order_actions() {
        let catalog = catalog();

        let unknown_group = FlowStep::SelectGroup.apply(&choose_group("Centro"), &catalog);
        assert!(matches!(unknown_group, Err(AppError::InvalidFlowTransition(_))));

        // Unidade de outro grupo
        let wrong_group = FlowStep::SelectTarget { group: "Aurora".into() }
            .apply(&choose_target("BELA-CASA1"), &catalog);
        assert!(wrong_group.is_err());

        assert!(FlowStep::SelectGroup.apply(&FlowInput::Back, &catalog).is_err());
        assert!(FlowStep::SelectGroup.apply(&choose_target("AURO-APTO1"), &catalog).is_err());
        assert!(FlowStep::Submitted { record_id: "1".into() }
            .apply(&FlowInput::Back, &catalog)
            .is_err());
    }

    #[test]
    fn catalog_lists_sorted_groups() {
        assert_eq!(catalog().groups(), vec!["Aurora", "Bela Vista"]);
        assert_eq!(catalog().targets_in("Aurora").len(), 1);
    }

    fn flow_service() -> (Arc<MemoryStore>, FlowService) {
        let (store, loader) = memory_loader();
        store.seed(
            Table::Properties,
            vec![
                cells(&["AURO-APTO1", "Aurora", "Apto 1", "Rua A", "Vago", "0", "", ""]),
                cells(&["AURO-APTO2", "Aurora", "Apto 2", "Rua A", "Alugado", "0", "", ""]),
            ],
        );
        store.seed(Table::Managers, vec![cells(&["Maria"]), cells(&["João"])]);

        let properties = PropertyRepository::new(loader.clone());
        let leases = LeaseRepository::new(loader.clone());
        let property_service = PropertyService::new(properties.clone());
        let lease_service = LeaseService::new(leases.clone(), properties.clone());
        let finance = FinanceService::new(LedgerRepository::new(loader.clone()), leases, properties);
        let service = FlowService::new(
            property_service,
            lease_service,
            finance,
            ManagerRepository::new(loader),
        );
        (store, service)
    }

    #[tokio::test]
    async fn new_lease_flow_only_offers_vacant_units_and_prefills() {
        let (_, service) = flow_service();

        let view = service
            .run(
                FlowKind::NewLease,
                FlowRequest {
                    inputs: vec![choose_group("Aurora")],
                    include_inactive: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(view.targets.len(), 1);
        assert_eq!(view.targets[0].id, "AURO-APTO1");

        let view = service
            .run(
                FlowKind::NewLease,
                FlowRequest {
                    inputs: vec![choose_group("Aurora"), choose_target("AURO-APTO1")],
                    include_inactive: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(view.managers, vec!["Maria", "João"]);
        assert_eq!(view.prefill.unwrap()["id"], "AURO-APTO1");
    }

    #[tokio::test]
    async fn submitting_new_lease_flow_registers_the_lease() {
        let (store, service) = flow_service();

        let form = json!({
            "manager": "Maria",
            "tenantName": "Carlos Lima",
            "startDate": "2025-03-01",
            "endDate": "2026-02-28",
            "baseRent": 1500,
            "dueDay": 10
        });
        let view = service
            .run(
                FlowKind::NewLease,
                FlowRequest {
                    inputs: vec![
                        choose_group("Aurora"),
                        choose_target("AURO-APTO1"),
                        FlowInput::Submit { form },
                    ],
                    include_inactive: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(
            view.step,
            FlowStep::Submitted { record_id: "AURO-APTO1-20250301".into() }
        );
        assert_eq!(store.snapshot(Table::Leases).len(), 2);
        assert_eq!(store.snapshot(Table::Properties)[1][4], "Alugado");
    }

    #[tokio::test]
    async fn submit_before_the_form_step_is_rejected() {
        let (store, service) = flow_service();

        let err = service
            .run(
                FlowKind::LogPayment,
                FlowRequest {
                    inputs: vec![FlowInput::Submit { form: json!({}) }],
                    include_inactive: false,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidFlowTransition(_)));
        assert_eq!(store.snapshot(Table::Ledger).len(), 1);
    }
}

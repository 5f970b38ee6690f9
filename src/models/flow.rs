// src/models/flow.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Formulários de várias etapas (grupo -> unidade/contrato -> formulário).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FlowKind {
    NewLease,
    EditProperty,
    EditLease,
    LogPayment,
}

/// Uma ação do usuário sobre o formulário.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum FlowInput {
    ChooseGroup { group: String },
    ChooseTarget { id: String },
    // Campos do formulário final, no mesmo formato do endpoint de cadastro/edição
    Submit {
        #[schema(value_type = Object)]
        form: serde_json::Value,
    },
    Back,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum FlowStep {
    SelectGroup,
    #[serde(rename_all = "camelCase")]
    SelectTarget { group: String },
    #[serde(rename_all = "camelCase")]
    EditForm { group: String, target_id: String },
    #[serde(rename_all = "camelCase")]
    Submitted { record_id: String },
}

// Uma opção da etapa de seleção (imóvel ou contrato)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowTarget {
    pub id: String,
    pub group: String,
    #[schema(example = "Apto 101 - Carlos Lima")]
    pub label: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowRequest {
    #[serde(default)]
    pub inputs: Vec<FlowInput>,
    // Só para edit-lease: inclui contratos encerrados/renovados
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowView {
    pub flow: FlowKind,
    pub step: FlowStep,
    // Opções da etapa atual
    pub groups: Vec<String>,
    pub targets: Vec<FlowTarget>,
    // Registro selecionado, para preencher o formulário
    #[schema(value_type = Option<Object>)]
    pub prefill: Option<serde_json::Value>,
    // Gestores disponíveis (novo contrato / edição de contrato)
    pub managers: Vec<String>,
}

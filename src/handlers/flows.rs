// src/handlers/flows.rs

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::flow::{FlowKind, FlowRequest, FlowView},
    services::auth::SessionContext,
};

#[utoipa::path(
    post,
    path = "/api/flows/{flow}",
    tag = "Flows",
    request_body = FlowRequest,
    params(
        ("flow" = FlowKind, Path, description = "new-lease, edit-property, edit-lease ou log-payment")
    ),
    responses(
        (status = 200, description = "Etapa atual do formulário com as opções ou o registro a editar", body = FlowView),
        (status = 400, description = "Ação inválida para a etapa atual")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn run_flow(
    State(app_state): State<AppState>,
    session: SessionContext,
    Path(flow): Path<FlowKind>,
    Json(request): Json<FlowRequest>,
) -> Result<Json<FlowView>, AppError> {
    tracing::debug!(
        "Fluxo {:?} com {} ações ({:?})",
        flow,
        request.inputs.len(),
        session.username
    );
    let view = app_state.flow_service.run(flow, request).await?;
    Ok(Json(view))
}

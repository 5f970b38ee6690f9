// src/handlers/leases.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::lease::{Lease, LeaseFilter, LeaseListing, NewLeasePayload, UpdateLeasePayload},
    services::auth::SessionContext,
};

#[utoipa::path(
    get,
    path = "/api/leases",
    tag = "Leases",
    params(
        ("manager" = Option<String>, Query, description = "Filtra por gestor responsável"),
        ("status" = Option<String>, Query, description = "Filtra por status (Ativo, Encerrado, Renovado)")
    ),
    responses(
        (status = 200, description = "Contratos filtrados, contagens e opções de filtro", body = LeaseListing),
        (status = 401, description = "Não autenticado")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn list_leases(
    State(app_state): State<AppState>,
    _session: SessionContext,
    Query(filter): Query<LeaseFilter>,
) -> Result<Json<LeaseListing>, AppError> {
    let listing = app_state.lease_service.list(&filter).await?;
    Ok(Json(listing))
}

#[utoipa::path(
    post,
    path = "/api/leases",
    tag = "Leases",
    request_body = NewLeasePayload,
    responses(
        (status = 201, description = "Contrato registrado; imóvel passa para Alugado", body = Lease),
        (status = 404, description = "Imóvel não encontrado"),
        (status = 409, description = "Imóvel não está vago ou contrato já existe"),
        (status = 422, description = "Data de fim anterior à de início")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn create_lease(
    State(app_state): State<AppState>,
    _session: SessionContext,
    Json(payload): Json<NewLeasePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lease = app_state.lease_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(lease)))
}

#[utoipa::path(
    put,
    path = "/api/leases/{id}",
    tag = "Leases",
    request_body = UpdateLeasePayload,
    params(
        ("id" = String, Path, description = "ID do contrato")
    ),
    responses(
        (status = 200, description = "Contrato atualizado", body = Lease),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn update_lease(
    State(app_state): State<AppState>,
    _session: SessionContext,
    Path(id): Path<String>,
    Json(payload): Json<UpdateLeasePayload>,
) -> Result<Json<Lease>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lease = app_state.lease_service.update(&id, payload).await?;
    Ok(Json(lease))
}

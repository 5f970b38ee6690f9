// src/handlers/properties.rs

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
    models::property::{
        NewPropertyPayload, Property, PropertyFilter, PropertyListing, UpdatePropertyPayload,
    },
    services::auth::SessionContext,
};

#[utoipa::path(
    get,
    path = "/api/properties",
    tag = "Properties",
    params(
        ("group" = Option<String>, Query, description = "Filtra por grupo"),
        ("status" = Option<String>, Query, description = "Filtra por status (Vago, Alugado...)")
    ),
    responses(
        (status = 200, description = "Imóveis filtrados, contagens e opções de filtro", body = PropertyListing),
        (status = 401, description = "Não autenticado")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn list_properties(
    State(app_state): State<AppState>,
    _session: SessionContext,
    Query(filter): Query<PropertyFilter>,
) -> Result<Json<PropertyListing>, AppError> {
    let listing = app_state.property_service.list(&filter).await?;
    Ok(Json(listing))
}

#[utoipa::path(
    post,
    path = "/api/properties",
    tag = "Properties",
    request_body = NewPropertyPayload,
    responses(
        (status = 201, description = "Imóvel cadastrado como Vago", body = Property),
        (status = 400, description = "Campos obrigatórios ausentes"),
        (status = 409, description = "Já existe um imóvel com este ID")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn create_property(
    State(app_state): State<AppState>,
    _session: SessionContext,
    Json(payload): Json<NewPropertyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let property = app_state.property_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    tag = "Properties",
    request_body = UpdatePropertyPayload,
    params(
        ("id" = String, Path, description = "ID do imóvel")
    ),
    responses(
        (status = 200, description = "Imóvel atualizado", body = Property),
        (status = 404, description = "Imóvel não encontrado")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn update_property(
    State(app_state): State<AppState>,
    _session: SessionContext,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePropertyPayload>,
) -> Result<Json<Property>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let property = app_state.property_service.update(&id, payload).await?;
    Ok(Json(property))
}

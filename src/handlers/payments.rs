// src/handlers/payments.rs

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
    models::payment::{LedgerEntry, NewPaymentPayload, PaymentHistory, PaymentHistoryFilter},
    services::auth::SessionContext,
};

#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "Payments",
    params(
        ("startDate" = Option<String>, Query, description = "Data de pagamento inicial (AAAA-MM-DD)"),
        ("endDate" = Option<String>, Query, description = "Data de pagamento final (AAAA-MM-DD)"),
        ("manager" = Option<String>, Query, description = "Filtra por gestor"),
        ("group" = Option<String>, Query, description = "Filtra por grupo do imóvel"),
        ("leaseId" = Option<String>, Query, description = "Filtra por contrato")
    ),
    responses(
        (status = 200, description = "Histórico de lançamentos e total válido", body = PaymentHistory),
        (status = 401, description = "Não autenticado")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    _session: SessionContext,
    Query(filter): Query<PaymentHistoryFilter>,
) -> Result<Json<PaymentHistory>, AppError> {
    let history = app_state.finance_service.history(&filter).await?;
    Ok(Json(history))
}

#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    request_body = NewPaymentPayload,
    responses(
        (status = 201, description = "Pagamento lançado", body = LedgerEntry),
        (status = 404, description = "Contrato não encontrado"),
        (status = 409, description = "Contrato não está ativo")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn create_payment(
    State(app_state): State<AppState>,
    _session: SessionContext,
    Json(payload): Json<NewPaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let entry = app_state.finance_service.log_payment(payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/cancel",
    tag = "Payments",
    params(
        ("id" = String, Path, description = "ID do lançamento")
    ),
    responses(
        (status = 204, description = "Lançamento cancelado"),
        (status = 404, description = "Lançamento não encontrado"),
        (status = 409, description = "Lançamento já cancelado")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn cancel_payment(
    State(app_state): State<AppState>,
    _session: SessionContext,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    app_state.finance_service.cancel_payment(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

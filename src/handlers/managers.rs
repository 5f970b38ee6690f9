// src/handlers/managers.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError, config::AppState, models::manager::Manager,
    services::auth::SessionContext,
};

#[utoipa::path(
    get,
    path = "/api/managers",
    tag = "Leases",
    responses(
        (status = 200, description = "Gestores cadastrados na aba Gestores", body = Vec<Manager>),
        (status = 401, description = "Não autenticado")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn list_managers(
    State(app_state): State<AppState>,
    _session: SessionContext,
) -> Result<Json<Vec<Manager>>, AppError> {
    Ok(Json(app_state.manager_repo.list().await?))
}

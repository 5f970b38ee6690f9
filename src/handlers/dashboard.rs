// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::{
    common::error::AppError,
    config::AppState,
    models::dashboard::DashboardOverview,
    services::auth::SessionContext,
};

#[derive(Debug, Default, Deserialize)]
pub struct OverviewQuery {
    // Data de referência; padrão: hoje
    pub date: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/dashboard/overview",
    tag = "Dashboard",
    params(
        ("date" = Option<String>, Query, description = "Data de referência (AAAA-MM-DD); padrão: hoje")
    ),
    responses(
        (status = 200, description = "Indicadores, alertas e gráficos da Visão Geral", body = DashboardOverview),
        (status = 401, description = "Não autenticado")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn get_overview(
    State(app_state): State<AppState>,
    _session: SessionContext,
    Query(query): Query<OverviewQuery>,
) -> Result<Json<DashboardOverview>, AppError> {
    let today = query.date.unwrap_or_else(|| Local::now().date_naive());
    let overview = app_state.dashboard_service.overview(today).await?;
    Ok(Json(overview))
}

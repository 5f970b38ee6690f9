// src/handlers/auth.rs

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::session_from_jar,
    models::auth::{LoginPayload, SessionResponse},
    services::auth::SessionContext,
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login realizado; cookie de sessão definido", body = SessionResponse),
        (status = 400, description = "Usuário ou senha em branco"),
        (status = 401, description = "Usuário ou senha incorretos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (token, session) = app_state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    let settings = app_state.auth_service.cookie_settings();
    let cookie = Cookie::build((settings.name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), Json(session.into())))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Sessão encerrada", body = SessionResponse)
    )
)]
pub async fn logout(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SessionResponse>) {
    let name = app_state.auth_service.cookie_settings().name.clone();
    let jar = jar.remove(Cookie::build((name, "")).path("/"));

    (jar, Json(SessionContext::unset().into()))
}

// Pública: informa o estado da sessão sem exigir login
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Estado atual da sessão", body = SessionResponse)
    )
)]
pub async fn get_me(State(app_state): State<AppState>, jar: CookieJar) -> Json<SessionResponse> {
    Json(session_from_jar(&app_state, &jar).into())
}

// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{common::error::AppError, config::AppState, services::auth::SessionContext};

/// Resolve a sessão a partir do cookie (autenticado, rejeitado ou ausente).
pub fn session_from_jar(app_state: &AppState, jar: &CookieJar) -> SessionContext {
    let cookie_name = &app_state.auth_service.cookie_settings().name;
    app_state
        .auth_service
        .resolve_session(jar.get(cookie_name).map(|c| c.value()))
}

// O middleware em si: só deixa passar sessões autenticadas
pub async fn auth_guard(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = session_from_jar(&app_state, &jar);
    if !session.is_authenticated() {
        return Err(AppError::NotAuthenticated);
    }

    // Insere a sessão nos "extensions" da requisição
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

// Extrator para obter a sessão diretamente nos handlers
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or(AppError::NotAuthenticated)
    }
}

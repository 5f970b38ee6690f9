// src/services/auth.rs

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use crate::{
    common::error::AppError,
    models::auth::{AuthStatus, Claims, CookieSettings, CredentialMap, SessionResponse},
};

/// Sessão resolvida uma vez por requisição a partir do cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub status: AuthStatus,
    pub username: Option<String>,
    pub name: Option<String>,
}

impl SessionContext {
    pub fn unset() -> Self {
        Self { status: AuthStatus::Unset, username: None, name: None }
    }

    pub fn rejected() -> Self {
        Self { status: AuthStatus::Rejected, username: None, name: None }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }
}

impl From<SessionContext> for SessionResponse {
    fn from(session: SessionContext) -> Self {
        Self {
            status: session.status,
            username: session.username,
            name: session.name,
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<CredentialMap>,
    cookie: CookieSettings,
}

impl AuthService {
    pub fn new(credentials: CredentialMap, cookie: CookieSettings) -> Self {
        Self { credentials: Arc::new(credentials), cookie }
    }

    pub fn cookie_settings(&self) -> &CookieSettings {
        &self.cookie
    }

    /// Confere usuário e senha; devolve o token do cookie e a sessão aberta.
    pub async fn login(&self, username: &str, password: &str) -> Result<(String, SessionContext), AppError> {
        let username = username.trim();
        let entry = match self.credentials.usernames.get(username) {
            Some(entry) => entry,
            None => {
                tracing::warn!("Tentativa de login com usuário desconhecido: {}", username);
                return Err(AppError::InvalidCredentials);
            }
        };

        let password_clone = password.to_owned();
        let password_hash_clone = entry.password.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?
        ?;

        if !is_password_valid {
            tracing::warn!("Senha incorreta para o usuário {}", username);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(username, &entry.name)?;
        tracing::info!("✅ Login de {}", username);

        Ok((
            token,
            SessionContext {
                status: AuthStatus::Authenticated,
                username: Some(username.to_string()),
                name: Some(entry.name.clone()),
            },
        ))
    }

    /// Cookie ausente = Unset; inválido, expirado ou de usuário removido = Rejected.
    pub fn resolve_session(&self, token: Option<&str>) -> SessionContext {
        let Some(token) = token else {
            return SessionContext::unset();
        };

        let claims = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.cookie.key.as_ref()),
            &Validation::default(),
        ) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!("Cookie de sessão recusado: {}", e);
                return SessionContext::rejected();
            }
        };

        if !self.credentials.usernames.contains_key(&claims.sub) {
            return SessionContext::rejected();
        }

        SessionContext {
            status: AuthStatus::Authenticated,
            username: Some(claims.sub),
            name: Some(claims.name),
        }
    }

    fn create_token(&self, username: &str, name: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.cookie.expiry_days);

        let claims = Claims {
            sub: username.to_string(),
            name: name.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.cookie.key.as_ref()),
        )?)
    }
}

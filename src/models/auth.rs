// src/models/auth.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use validator::Validate;

// Um usuário do mapa de credenciais (Secrets)
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialEntry {
    pub name: String,
    pub email: String,
    // Hash bcrypt, nunca a senha em texto
    pub password: String,
}

/// `{ "usernames": { "joao": { "name": ..., "email": ..., "password": "$2b$..." } } }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialMap {
    pub usernames: HashMap<String, CredentialEntry>,
}

// Parâmetros do cookie de sessão
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub key: String,
    pub expiry_days: i64,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Por favor, digite seu usuário e senha."))]
    #[schema(example = "joao")]
    pub username: String,
    #[validate(length(min = 1, message = "Por favor, digite seu usuário e senha."))]
    pub password: String,
}

/// Estado da autenticação: autenticado, rejeitado ou ainda não informado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AuthStatus {
    Authenticated,
    Rejected,
    Unset,
}

// Resposta de login / sessão atual
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub status: AuthStatus,
    pub username: Option<String>,
    #[schema(example = "João Silva")]
    pub name: Option<String>,
}

// Estrutura de dados ("claims") dentro do cookie de sessão
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Subject (username)
    pub name: String, // Nome de exibição
    pub exp: usize,   // Expiration time (quando o cookie expira)
    pub iat: usize,   // Issued At (quando o cookie foi criado)
}

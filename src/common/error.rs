use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Regras que o `validator` não cobre (datas, mês de referência...)
    #[error("Dados inválidos: {0}")]
    InvalidInput(String),

    // Secrets ausentes ou incompletos: fatal para a página
    #[error("Configuração ausente ou incompleta: {0}")]
    Configuration(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Sessão ausente ou expirada")]
    NotAuthenticated,

    #[error("Registro '{id}' não encontrado na aba {table}")]
    RowNotFound { table: &'static str, id: String },

    #[error("Registro '{id}' já existe na aba {table}")]
    DuplicateRecord { table: &'static str, id: String },

    #[error("Imóvel '{0}' não está vago")]
    PropertyNotVacant(String),

    #[error("Contrato '{0}' não está ativo")]
    LeaseNotActive(String),

    #[error("Lançamento '{0}' já foi cancelado")]
    PaymentAlreadyCancelled(String),

    #[error("Transição de formulário inválida: {0}")]
    InvalidFlowTransition(String),

    // Resposta inesperada da API da planilha
    #[error("Erro na planilha: {0}")]
    StoreError(String),

    #[error("Erro HTTP ao acessar a planilha: {0}")]
    HttpError(#[from] reqwest::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn row_not_found(table: &'static str, id: impl Into<String>) -> Self {
        AppError::RowNotFound { table, id: id.into() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidInput(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Configuration(ref msg) => {
                tracing::error!("🔥 Configuração inválida: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A configuração de autenticação (Secrets) não foi encontrada ou está incompleta.".to_string(),
                )
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Usuário ou senha incorretos.".to_string()),
            AppError::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                "Você precisa fazer login para acessar esta página.".to_string(),
            ),
            e @ AppError::RowNotFound { .. } => (StatusCode::NOT_FOUND, e.to_string()),
            e @ (AppError::DuplicateRecord { .. }
            | AppError::PropertyNotVacant(_)
            | AppError::LeaseNotActive(_)
            | AppError::PaymentAlreadyCancelled(_)) => (StatusCode::CONFLICT, e.to_string()),
            e @ AppError::InvalidFlowTransition(_) => (StatusCode::BAD_REQUEST, e.to_string()),
            ref e @ (AppError::StoreError(_) | AppError::HttpError(_)) => {
                tracing::error!("🔥 Falha ao acessar a planilha: {}", e);
                (StatusCode::BAD_GATEWAY, "Não foi possível acessar a planilha.".to_string())
            }

            // Todos os outros erros (Bcrypt, JWT, InternalServerError) viram 500.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

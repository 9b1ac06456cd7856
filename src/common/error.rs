// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    // Conflitos detectados pelo validador de agenda: a operação é abortada
    // antes de qualquer escrita e o chamador recebe a lista completa de motivos.
    #[error("Conflito de agenda")]
    ScheduleConflict(Vec<String>),

    #[error("Saldo insuficiente: {0}")]
    InsufficientBalance(String),

    #[error("Intervalo de datas inválido")]
    InvalidDateRange,

    #[error("Assinatura do webhook inválida")]
    InvalidWebhookSignature,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Falha em um provedor externo (e-mail, deploy, git, pagamentos) ANTES de
    // qualquer escrita local; depois da escrita a falha vira warning, não erro.
    #[error("Erro no provedor externo: {0}")]
    UpstreamError(String),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::UpstreamError(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
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
            // Conflito de agenda: a lista de motivos vai inteira no corpo.
            AppError::ScheduleConflict(reasons) => {
                let body = Json(json!({
                    "error": "Operação bloqueada por conflitos de agenda.",
                    "conflicts": reasons,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Você não tem permissão para esta operação.".to_string(),
            ),
            AppError::ResourceNotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{} não encontrado.", what))
            }
            AppError::InsufficientBalance(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidDateRange => (
                StatusCode::BAD_REQUEST,
                "A data inicial deve ser anterior ou igual à final.".to_string(),
            ),
            AppError::InvalidWebhookSignature => (
                StatusCode::BAD_REQUEST,
                "Assinatura do webhook inválida.".to_string(),
            ),
            AppError::UpstreamError(msg) => {
                tracing::error!("Falha no provedor externo: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Falha ao contatar um serviço externo.".to_string(),
                )
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

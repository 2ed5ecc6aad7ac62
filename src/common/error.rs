use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::{inventory::Shortfall, order::OrderStatus};

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Cada variante mapeia para uma categoria da taxonomia da API:
// validação (400), não encontrado (404), transição inválida (400),
// estoque insuficiente (400), conflito de chave única (409), interno (500).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("O pedido precisa de pelo menos um item")]
    EmptyOrder,

    #[error("O modelo é obrigatório (ou selecione um template)")]
    MissingModel,

    #[error("A quantidade deve ser maior que zero")]
    InvalidQuantity,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Peça não encontrada")]
    PartNotFound,

    #[error("SKU não encontrado")]
    SkuNotFound,

    #[error("Pedido não encontrado")]
    OrderNotFound,

    #[error("Equipamento não encontrado")]
    EquipmentNotFound,

    #[error("Template não encontrado")]
    TemplateNotFound,

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Estoque insuficiente")]
    InsufficientStock(Vec<Shortfall>),

    #[error("Nome de usuário já existe")]
    UsernameAlreadyExists,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Já existe um registro com o nome '{0}'")]
    NameAlreadyExists(String),

    #[error("Já existe um SKU para esta combinação de peça e cor")]
    SkuAlreadyExists,

    #[error("Número de série já cadastrado")]
    SerialNumberAlreadyExists,

    #[error("Já existe um template com este nome")]
    TemplateNameAlreadyExists,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
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
                    "success": false,
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // Faltas de estoque carregam a lista completa de itens em falta.
            AppError::InsufficientStock(shortfalls) => {
                let body = Json(json!({
                    "success": false,
                    "error": "Estoque insuficiente para alguns itens.",
                    "insufficientParts": shortfalls,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::InvalidTransition { from, to } => {
                let body = Json(json!({
                    "success": false,
                    "error": format!("Transição de status inválida: {} -> {}.", from, to),
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::EmptyOrder => {
                (StatusCode::BAD_REQUEST, "O pedido precisa de pelo menos um item.")
            }
            AppError::MissingModel => {
                (StatusCode::BAD_REQUEST, "O modelo é obrigatório (ou selecione um template).")
            }
            AppError::InvalidQuantity => {
                (StatusCode::BAD_REQUEST, "A quantidade deve ser maior que zero.")
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Usuário ou senha inválidos.")
            }
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente.")
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Acesso negado."),

            AppError::UserNotFound => (StatusCode::NOT_FOUND, "Usuário não encontrado."),
            AppError::PartNotFound => (StatusCode::NOT_FOUND, "Peça não encontrada."),
            AppError::SkuNotFound => (StatusCode::NOT_FOUND, "SKU não encontrado."),
            AppError::OrderNotFound => (StatusCode::NOT_FOUND, "Pedido não encontrado."),
            AppError::EquipmentNotFound => (StatusCode::NOT_FOUND, "Equipamento não encontrado."),
            AppError::TemplateNotFound => (StatusCode::NOT_FOUND, "Template não encontrado."),

            AppError::UsernameAlreadyExists => {
                (StatusCode::CONFLICT, "Este nome de usuário já está em uso.")
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso."),
            AppError::NameAlreadyExists(name) => {
                let body = Json(json!({
                    "success": false,
                    "error": format!("Já existe um registro com o nome '{}'.", name),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::SkuAlreadyExists => {
                (StatusCode::CONFLICT, "Já existe um SKU para esta combinação de peça e cor.")
            }
            AppError::SerialNumberAlreadyExists => {
                (StatusCode::CONFLICT, "Este número de série já está cadastrado.")
            }
            AppError::TemplateNameAlreadyExists => {
                (StatusCode::CONFLICT, "Já existe um template com este nome.")
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente recebe o genérico.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "success": false, "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn erros_de_regra_de_negocio_respondem_400() {
        let transition = AppError::InvalidTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Ordered,
        };
        assert_eq!(transition.into_response().status(), StatusCode::BAD_REQUEST);

        let stock = AppError::InsufficientStock(vec![Shortfall {
            sku_id: Uuid::new_v4(),
            needed: 5,
            available: 2,
            missing: 3,
        }]);
        assert_eq!(stock.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflitos_de_chave_unica_respondem_409() {
        assert_eq!(
            AppError::SerialNumberAlreadyExists.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::SkuAlreadyExists.into_response().status(), StatusCode::CONFLICT);
    }
}

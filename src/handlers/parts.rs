// src/handlers/parts.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        response::{ApiMessage, ApiResponse},
    },
    config::AppState,
    models::catalog::Part,
    services::catalog_service::PartChanges,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePartPayload {
    #[validate(length(min = 1, message = "O nome da peça é obrigatório."))]
    #[schema(example = "Rolamento 6204")]
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub purchase_price: Decimal,
    #[serde(default)]
    pub selling_price: Decimal,
    pub article_id: Option<String>,
    pub supplier: Option<String>,
}

// Atualização parcial: campo ausente mantém o valor atual
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePartPayload {
    #[validate(length(min = 1, message = "O nome da peça não pode ser vazio."))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub purchase_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub article_id: Option<String>,
    pub supplier: Option<String>,
}

// GET /api/parts
#[utoipa::path(
    get,
    path = "/api/parts",
    tag = "Parts",
    responses((status = 200, description = "Todas as peças ativas", body = [Part])),
    security(("api_jwt" = []))
)]
pub async fn get_all_parts(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let parts = app_state.catalog_service.get_all_parts().await?;
    Ok(Json(ApiResponse::list(parts)))
}

// GET /api/parts/{id}
#[utoipa::path(
    get,
    path = "/api/parts/{id}",
    tag = "Parts",
    params(("id" = Uuid, Path, description = "ID da peça")),
    responses(
        (status = 200, description = "Peça encontrada", body = Part),
        (status = 404, description = "Peça não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_part_by_id(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let part = app_state.catalog_service.get_part(id).await?;
    Ok(Json(ApiResponse::of(part)))
}

// POST /api/parts
#[utoipa::path(
    post,
    path = "/api/parts",
    tag = "Parts",
    request_body = CreatePartPayload,
    responses((status = 201, description = "Peça criada", body = Part)),
    security(("api_jwt" = []))
)]
pub async fn create_part(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePartPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let part = app_state
        .catalog_service
        .create_part(
            &payload.name,
            payload.description.as_deref(),
            payload.category_id,
            payload.purchase_price,
            payload.selling_price,
            payload.article_id.as_deref(),
            payload.supplier.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::of(part))))
}

// PUT /api/parts/{id}
#[utoipa::path(
    put,
    path = "/api/parts/{id}",
    tag = "Parts",
    params(("id" = Uuid, Path, description = "ID da peça")),
    request_body = UpdatePartPayload,
    responses(
        (status = 200, description = "Peça atualizada", body = Part),
        (status = 404, description = "Peça não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_part(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePartPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let changes = PartChanges {
        name: payload.name,
        description: payload.description,
        category_id: payload.category_id,
        purchase_price: payload.purchase_price,
        selling_price: payload.selling_price,
        article_id: payload.article_id,
        supplier: payload.supplier,
    };

    let part = app_state.catalog_service.update_part(id, changes).await?;
    Ok(Json(ApiResponse::of(part)))
}

// DELETE /api/parts/{id}
#[utoipa::path(
    delete,
    path = "/api/parts/{id}",
    tag = "Parts",
    params(("id" = Uuid, Path, description = "ID da peça")),
    responses(
        (status = 200, description = "Peça removida (soft delete)"),
        (status = 404, description = "Peça não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_part(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalog_service.delete_part(id).await?;
    Ok(Json(ApiMessage::new("Peça removida com sucesso.")))
}

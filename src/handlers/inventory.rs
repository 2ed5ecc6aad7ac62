// src/handlers/inventory.rs
//
// Borda HTTP do estoque: SKUs, saldos e o livro-razão de movimentações.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::inventory::{
        InventoryStats, MovementDirection, MovementReason, Sku, SkuDetails, StockMovement,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSkuPayload {
    pub part_id: Uuid,
    pub color_id: Option<Uuid>,
    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    #[serde(default)]
    pub min_stock_level: i32,
    #[validate(range(min = 0, message = "A quantidade inicial não pode ser negativa."))]
    #[serde(default)]
    pub initial_quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordMovementPayload {
    pub sku_id: Uuid,
    pub direction: MovementDirection,
    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdjustStockPayload {
    pub sku_id: Uuid,
    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MovementsQuery {
    pub limit: Option<i64>,
}

// GET /api/inventory/skus
#[utoipa::path(
    get,
    path = "/api/inventory/skus",
    tag = "Inventory",
    responses((status = 200, description = "Todos os SKUs ativos", body = [SkuDetails])),
    security(("api_jwt" = []))
)]
pub async fn get_all_skus(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let skus = app_state.inventory_service.get_all_skus().await?;
    Ok(Json(ApiResponse::list(skus)))
}

// GET /api/inventory/skus/low-stock
#[utoipa::path(
    get,
    path = "/api/inventory/skus/low-stock",
    tag = "Inventory",
    responses((status = 200, description = "SKUs abaixo do estoque mínimo", body = [SkuDetails])),
    security(("api_jwt" = []))
)]
pub async fn get_low_stock_skus(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let skus = app_state.inventory_service.get_low_stock_skus().await?;
    Ok(Json(ApiResponse::list(skus)))
}

// GET /api/inventory/stats
#[utoipa::path(
    get,
    path = "/api/inventory/stats",
    tag = "Inventory",
    responses((status = 200, description = "Agregados do estoque", body = InventoryStats)),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.inventory_service.get_stats().await?;
    Ok(Json(ApiResponse::of(stats)))
}

// POST /api/inventory/skus
#[utoipa::path(
    post,
    path = "/api/inventory/skus",
    tag = "Inventory",
    request_body = CreateSkuPayload,
    responses(
        (status = 201, description = "SKU criado", body = Sku),
        (status = 404, description = "Peça não encontrada"),
        (status = 409, description = "Combinação peça+cor já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sku(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateSkuPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let sku = app_state
        .inventory_service
        .create_sku(
            payload.part_id,
            payload.color_id,
            payload.min_stock_level,
            payload.initial_quantity,
            Some(user.id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::of(sku))))
}

// POST /api/inventory/movements
#[utoipa::path(
    post,
    path = "/api/inventory/movements",
    tag = "Inventory",
    request_body = RecordMovementPayload,
    responses(
        (status = 201, description = "Movimentação registrada", body = StockMovement),
        (status = 400, description = "Saldo insuficiente para a saída"),
        (status = 404, description = "SKU não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_movement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<RecordMovementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let movement = app_state
        .inventory_service
        .record_movement(
            &app_state.db_pool,
            payload.sku_id,
            payload.direction,
            payload.quantity,
            MovementReason::Manual,
            None,
            Some(user.id),
            payload.notes.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::of(movement))))
}

// POST /api/inventory/adjust
//
// Correção autoritativa: define o saldo e registra o delta no
// livro-razão. Saldo já correto não gera movimentação.
#[utoipa::path(
    post,
    path = "/api/inventory/adjust",
    tag = "Inventory",
    request_body = AdjustStockPayload,
    responses(
        (status = 200, description = "Saldo corrigido; movimentação do delta (data null se nada mudou)", body = StockMovement),
        (status = 404, description = "SKU não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<AdjustStockPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let movement = app_state
        .inventory_service
        .adjust_to(
            payload.sku_id,
            payload.quantity,
            Some(user.id),
            payload.notes.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::of(movement)))
}

// GET /api/inventory/movements?limit=50
#[utoipa::path(
    get,
    path = "/api/inventory/movements",
    tag = "Inventory",
    params(MovementsQuery),
    responses((status = 200, description = "Movimentações recentes", body = [StockMovement])),
    security(("api_jwt" = []))
)]
pub async fn get_recent_movements(
    State(app_state): State<AppState>,
    Query(query): Query<MovementsQuery>,
) -> Result<impl IntoResponse, AppError> {
    // Teto de 500 para não arrastar o livro-razão inteiro
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let movements = app_state.inventory_service.get_recent_movements(limit).await?;
    Ok(Json(ApiResponse::list(movements)))
}

// GET /api/inventory/skus/{id}/movements
#[utoipa::path(
    get,
    path = "/api/inventory/skus/{id}/movements",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do SKU")),
    responses(
        (status = 200, description = "Histórico do SKU", body = [StockMovement]),
        (status = 404, description = "SKU não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_movements_by_sku(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let movements = app_state.inventory_service.get_movements_by_sku(id).await?;
    Ok(Json(ApiResponse::list(movements)))
}

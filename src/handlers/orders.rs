// src/handlers/orders.rs
//
// Borda HTTP dos pedidos. A mudança de status com itens de entrega é o
// ponto de entrada do motor de reconciliação do OrderService.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::order::{
        DeliveryEvent, Order, OrderItemStatus, OrderStats, OrderStatus, OrderSummary,
        OrderWithDetails,
    },
    services::order_service::NewOrderItem,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderItemPayload {
    pub sku_id: Uuid,
    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderPayload {
    #[validate(length(min = 1, message = "O pedido precisa de pelo menos um item."), nested)]
    pub items: Vec<CreateOrderItemPayload>,
    pub notes: Option<String>,
}

/// Item de entrega na mudança de status: quanto chegou AGORA (não o
/// acumulado), backorder manual opcional e override de status.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeliveryItemPayload {
    pub id: Uuid,
    #[validate(range(min = 0, message = "A quantidade entregue não pode ser negativa."))]
    #[serde(default)]
    pub quantity_delivered: i32,
    #[validate(range(min = 0, message = "O backorder não pode ser negativo."))]
    pub quantity_backorder: Option<i32>,
    pub item_status: Option<OrderItemStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusPayload {
    pub status: OrderStatus,
    pub notes: Option<String>,
    #[validate(nested)]
    pub items: Option<Vec<DeliveryItemPayload>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AppendNotePayload {
    #[validate(length(min = 1, message = "A anotação não pode ser vazia."))]
    pub notes: String,
}

// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    responses((status = 200, description = "Todos os pedidos", body = [OrderSummary])),
    security(("api_jwt" = []))
)]
pub async fn get_all_orders(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.order_service.get_all_orders().await?;
    Ok(Json(ApiResponse::list(orders)))
}

// GET /api/orders/my
#[utoipa::path(
    get,
    path = "/api/orders/my",
    tag = "Orders",
    responses((status = 200, description = "Pedidos do usuário autenticado", body = [OrderSummary])),
    security(("api_jwt" = []))
)]
pub async fn get_my_orders(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.order_service.get_orders_by_user(user.id).await?;
    Ok(Json(ApiResponse::list(orders)))
}

// GET /api/orders/stats
#[utoipa::path(
    get,
    path = "/api/orders/stats",
    tag = "Orders",
    responses((status = 200, description = "Contagem de pedidos por status", body = OrderStats)),
    security(("api_jwt" = []))
)]
pub async fn get_order_stats(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.order_service.get_stats().await?;
    Ok(Json(ApiResponse::of(stats)))
}

// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido com itens, anotações e histórico", body = OrderWithDetails),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order_by_id(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.get_order_with_details(id).await?;
    Ok(Json(ApiResponse::of(order)))
}

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado com preços congelados", body = OrderWithDetails),
        (status = 400, description = "Pedido vazio ou quantidade inválida"),
        (status = 404, description = "SKU não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let items = payload
        .items
        .into_iter()
        .map(|i| NewOrderItem { sku_id: i.sku_id, quantity: i.quantity, notes: i.notes })
        .collect();

    let order = app_state
        .order_service
        .create_order(Some(user.id), items, payload.notes)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::of(order))))
}

// PATCH /api/orders/{id}/status
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = UpdateOrderStatusPayload,
    responses(
        (status = 200, description = "Status reconciliado; itens e estoque atualizados", body = OrderWithDetails),
        (status = 400, description = "Transição de status inválida"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let events = payload.items.map(|items| {
        items
            .into_iter()
            .map(|i| DeliveryEvent {
                item_id: i.id,
                quantity_received: i.quantity_delivered,
                backorder_override: i.quantity_backorder,
                item_status: i.item_status,
            })
            .collect()
    });

    let order = app_state
        .order_service
        .update_status(id, payload.status, events, payload.notes, Some(user.id))
        .await?;
    Ok(Json(ApiResponse::of(order)))
}

// POST /api/orders/{id}/notes
#[utoipa::path(
    post,
    path = "/api/orders/{id}/notes",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = AppendNotePayload,
    responses(
        (status = 201, description = "Anotação registrada", body = OrderWithDetails),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn append_note(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AppendNotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let order = app_state.order_service.append_note(id, &payload.notes).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::of(order))))
}

// POST /api/orders/{id}/cancel
//
// Cancela sem tocar no estoque: o que já foi entregue fica entregue.
#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido cancelado", body = Order),
        (status = 400, description = "Pedido já em estado terminal"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_order(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.cancel_order(id, Some(user.id)).await?;
    Ok(Json(ApiResponse::of(order)))
}

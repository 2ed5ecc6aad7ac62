// src/handlers/equipment.rs
//
// Montagem de equipamentos e templates (listas de materiais).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
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
    middleware::auth::AuthenticatedUser,
    models::equipment::{
        BomLine, ConsumptionReport, Equipment, EquipmentTemplate, EquipmentWithParts,
    },
    services::equipment_service::{CreateEquipmentInput, NewEquipmentPart},
};

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EquipmentPartPayload {
    pub sku_id: Uuid,
    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantity_needed: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipmentPayload {
    pub template_id: Option<Uuid>,
    #[schema(example = "Torno CNC TX-200")]
    pub model: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub serial_number: Option<String>,
    pub year_manufactured: Option<i32>,
    pub production_date: Option<NaiveDate>,
    pub article_id: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub parts: Vec<EquipmentPartPayload>,
    /// Baixa os componentes do estoque na montagem (padrão: sim)
    #[serde(default = "default_true")]
    pub reduce_stock: bool,
    #[serde(default)]
    pub save_as_template: bool,
    pub template_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTemplatePayload {
    #[validate(length(min = 1, message = "O nome do template é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub article_id: Option<String>,
    #[serde(default)]
    pub parts: Vec<BomLine>,
}

// GET /api/equipment
#[utoipa::path(
    get,
    path = "/api/equipment",
    tag = "Equipment",
    responses((status = 200, description = "Todos os equipamentos ativos", body = [Equipment])),
    security(("api_jwt" = []))
)]
pub async fn get_all_equipment(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let equipment = app_state.equipment_service.get_all_equipment().await?;
    Ok(Json(ApiResponse::list(equipment)))
}

// GET /api/equipment/{id}
#[utoipa::path(
    get,
    path = "/api/equipment/{id}",
    tag = "Equipment",
    params(("id" = Uuid, Path, description = "ID do equipamento")),
    responses(
        (status = 200, description = "Equipamento com a lista de componentes", body = EquipmentWithParts),
        (status = 404, description = "Equipamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_equipment_by_id(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let equipment = app_state.equipment_service.get_equipment_with_parts(id).await?;
    Ok(Json(ApiResponse::of(equipment)))
}

// POST /api/equipment
#[utoipa::path(
    post,
    path = "/api/equipment",
    tag = "Equipment",
    request_body = CreateEquipmentPayload,
    responses(
        (status = 201, description = "Equipamento montado", body = EquipmentWithParts),
        (status = 400, description = "Modelo ausente, quantidade inválida ou saldo insuficiente"),
        (status = 404, description = "Template ou SKU não encontrado"),
        (status = 409, description = "Número de série duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_equipment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateEquipmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let input = CreateEquipmentInput {
        template_id: payload.template_id,
        model: payload.model,
        brand: payload.brand,
        category: payload.category,
        serial_number: payload.serial_number,
        year_manufactured: payload.year_manufactured,
        production_date: payload.production_date,
        article_id: payload.article_id,
        parts: payload
            .parts
            .into_iter()
            .map(|p| NewEquipmentPart {
                sku_id: p.sku_id,
                quantity_needed: p.quantity_needed,
                notes: p.notes,
            })
            .collect(),
        reduce_stock: payload.reduce_stock,
        save_as_template: payload.save_as_template,
        template_name: payload.template_name,
    };

    let equipment = app_state
        .equipment_service
        .create_equipment(input, Some(user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::of(equipment))))
}

// POST /api/equipment/{id}/produce
#[utoipa::path(
    post,
    path = "/api/equipment/{id}/produce",
    tag = "Equipment",
    params(("id" = Uuid, Path, description = "ID do equipamento")),
    responses(
        (status = 200, description = "Componentes baixados do estoque", body = ConsumptionReport),
        (status = 400, description = "Saldo insuficiente (todas as faltas listadas)"),
        (status = 404, description = "Equipamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn produce_equipment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.equipment_service.produce(id, Some(user.id)).await?;
    Ok(Json(ApiResponse::of(report)))
}

// DELETE /api/equipment/{id}
#[utoipa::path(
    delete,
    path = "/api/equipment/{id}",
    tag = "Equipment",
    params(("id" = Uuid, Path, description = "ID do equipamento")),
    responses(
        (status = 200, description = "Equipamento removido (soft delete)"),
        (status = 404, description = "Equipamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_equipment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.equipment_service.delete_equipment(id).await?;
    Ok(Json(ApiMessage::new("Equipamento removido com sucesso.")))
}

// GET /api/templates
#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "Templates",
    responses((status = 200, description = "Todos os templates", body = [EquipmentTemplate])),
    security(("api_jwt" = []))
)]
pub async fn get_all_templates(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let templates = app_state.equipment_service.get_all_templates().await?;
    Ok(Json(ApiResponse::list(templates)))
}

// GET /api/templates/{id}
#[utoipa::path(
    get,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(("id" = Uuid, Path, description = "ID do template")),
    responses(
        (status = 200, description = "Template encontrado", body = EquipmentTemplate),
        (status = 404, description = "Template não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_template_by_id(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let template = app_state.equipment_service.get_template(id).await?;
    Ok(Json(ApiResponse::of(template)))
}

// POST /api/templates
#[utoipa::path(
    post,
    path = "/api/templates",
    tag = "Templates",
    request_body = CreateTemplatePayload,
    responses(
        (status = 201, description = "Template criado", body = EquipmentTemplate),
        (status = 409, description = "Nome de template já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_template(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateTemplatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let template = app_state
        .equipment_service
        .save_as_template(
            &payload.name,
            payload.description.as_deref(),
            payload.brand.as_deref(),
            payload.category.as_deref(),
            payload.article_id.as_deref(),
            payload.parts,
            Some(user.id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::of(template))))
}

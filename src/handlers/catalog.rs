// src/handlers/catalog.rs
//
// Cadastros de consulta: marcas, cores e categorias.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    models::catalog::{Brand, Category, Color},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNamePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Bosch")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Motores")]
    pub name: String,
    pub description: Option<String>,
}

// GET /api/catalog/brands
#[utoipa::path(
    get,
    path = "/api/catalog/brands",
    tag = "Catalog",
    responses((status = 200, description = "Todas as marcas", body = [Brand])),
    security(("api_jwt" = []))
)]
pub async fn get_all_brands(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let brands = app_state.catalog_service.get_all_brands().await?;
    Ok(Json(ApiResponse::list(brands)))
}

// POST /api/catalog/brands
#[utoipa::path(
    post,
    path = "/api/catalog/brands",
    tag = "Catalog",
    request_body = CreateNamePayload,
    responses(
        (status = 201, description = "Marca criada", body = Brand),
        (status = 409, description = "Nome já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_brand(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateNamePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let brand = app_state.catalog_service.create_brand(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::of(brand))))
}

// GET /api/catalog/colors
#[utoipa::path(
    get,
    path = "/api/catalog/colors",
    tag = "Catalog",
    responses((status = 200, description = "Todas as cores", body = [Color])),
    security(("api_jwt" = []))
)]
pub async fn get_all_colors(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let colors = app_state.catalog_service.get_all_colors().await?;
    Ok(Json(ApiResponse::list(colors)))
}

// POST /api/catalog/colors
#[utoipa::path(
    post,
    path = "/api/catalog/colors",
    tag = "Catalog",
    request_body = CreateNamePayload,
    responses(
        (status = 201, description = "Cor criada", body = Color),
        (status = 409, description = "Nome já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_color(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateNamePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let color = app_state.catalog_service.create_color(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::of(color))))
}

// GET /api/catalog/categories
#[utoipa::path(
    get,
    path = "/api/catalog/categories",
    tag = "Catalog",
    responses((status = 200, description = "Todas as categorias", body = [Category])),
    security(("api_jwt" = []))
)]
pub async fn get_all_categories(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.catalog_service.get_all_categories().await?;
    Ok(Json(ApiResponse::list(categories)))
}

// POST /api/catalog/categories
#[utoipa::path(
    post,
    path = "/api/catalog/categories",
    tag = "Catalog",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 409, description = "Nome já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .catalog_service
        .create_category(&payload.name, payload.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::of(category))))
}

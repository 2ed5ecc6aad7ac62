// src/services/catalog_service.rs
//
// Cadastros simples: marcas, cores, categorias e peças. Nada aqui toca
// no livro-razão; saldo é assunto do InventoryService.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::catalog::{Brand, Category, Color, Part},
};

/// Campos editáveis de uma peça. `None` mantém o valor atual.
#[derive(Debug, Clone, Default)]
pub struct PartChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub purchase_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub article_id: Option<String>,
    pub supplier: Option<String>,
}

#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository, pool: PgPool) -> Self {
        Self { catalog_repo, pool }
    }

    pub async fn get_all_brands(&self) -> Result<Vec<Brand>, AppError> {
        self.catalog_repo.get_all_brands(&self.pool).await
    }

    pub async fn create_brand(&self, name: &str) -> Result<Brand, AppError> {
        self.catalog_repo.create_brand(&self.pool, name).await
    }

    pub async fn get_all_colors(&self) -> Result<Vec<Color>, AppError> {
        self.catalog_repo.get_all_colors(&self.pool).await
    }

    pub async fn create_color(&self, name: &str) -> Result<Color, AppError> {
        self.catalog_repo.create_color(&self.pool, name).await
    }

    pub async fn get_all_categories(&self) -> Result<Vec<Category>, AppError> {
        self.catalog_repo.get_all_categories(&self.pool).await
    }

    pub async fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError> {
        self.catalog_repo.create_category(&self.pool, name, description).await
    }

    pub async fn get_all_parts(&self) -> Result<Vec<Part>, AppError> {
        self.catalog_repo.get_all_parts(&self.pool).await
    }

    pub async fn get_part(&self, id: Uuid) -> Result<Part, AppError> {
        self.catalog_repo
            .get_part(&self.pool, id)
            .await?
            .ok_or(AppError::PartNotFound)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_part(
        &self,
        name: &str,
        description: Option<&str>,
        category_id: Option<Uuid>,
        purchase_price: Decimal,
        selling_price: Decimal,
        article_id: Option<&str>,
        supplier: Option<&str>,
    ) -> Result<Part, AppError> {
        self.catalog_repo
            .create_part(
                &self.pool,
                name,
                description,
                category_id,
                purchase_price,
                selling_price,
                article_id,
                supplier,
            )
            .await
    }

    /// Atualização parcial: relê a peça e só sobrescreve o que veio.
    pub async fn update_part(&self, id: Uuid, changes: PartChanges) -> Result<Part, AppError> {
        let current = self.get_part(id).await?;

        let name = changes.name.unwrap_or(current.name);
        let description = changes.description.or(current.description);
        let category_id = changes.category_id.or(current.category_id);
        let purchase_price = changes.purchase_price.unwrap_or(current.purchase_price);
        let selling_price = changes.selling_price.unwrap_or(current.selling_price);
        let article_id = changes.article_id.or(current.article_id);
        let supplier = changes.supplier.or(current.supplier);

        self.catalog_repo
            .update_part(
                &self.pool,
                id,
                &name,
                description.as_deref(),
                category_id,
                purchase_price,
                selling_price,
                article_id.as_deref(),
                supplier.as_deref(),
            )
            .await?
            .ok_or(AppError::PartNotFound)
    }

    pub async fn delete_part(&self, id: Uuid) -> Result<(), AppError> {
        let deleted = self.catalog_repo.soft_delete_part(&self.pool, id).await?;
        if !deleted {
            return Err(AppError::PartNotFound);
        }
        Ok(())
    }
}

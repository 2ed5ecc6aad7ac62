// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{Brand, Category, Color, Part},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn get_all_brands<'e, E>(&self, executor: E) -> Result<Vec<Brand>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let brands = sqlx::query_as::<_, Brand>("SELECT * FROM brands ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(brands)
    }

    pub async fn get_all_colors<'e, E>(&self, executor: E) -> Result<Vec<Color>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let colors = sqlx::query_as::<_, Color>("SELECT * FROM colors ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(colors)
    }

    pub async fn get_all_categories<'e, E>(&self, executor: E) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
                .fetch_all(executor)
                .await?;
        Ok(categories)
    }

    pub async fn get_all_parts<'e, E>(&self, executor: E) -> Result<Vec<Part>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parts = sqlx::query_as::<_, Part>(
            "SELECT * FROM parts WHERE deleted_at IS NULL ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(parts)
    }

    pub async fn get_part<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Part>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let part =
            sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(part)
    }

    // ---
    // Funções de "Escrita"
    // ---

    pub async fn create_brand<'e, E>(&self, executor: E, name: &str) -> Result<Brand, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Brand>("INSERT INTO brands (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(executor)
            .await
            .map_err(|e| map_unique_to_name_conflict(e, name))
    }

    pub async fn create_color<'e, E>(&self, executor: E, name: &str) -> Result<Color, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Color>("INSERT INTO colors (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(executor)
            .await
            .map_err(|e| map_unique_to_name_conflict(e, name))
    }

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_to_name_conflict(e, name))
    }

    pub async fn create_part<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        category_id: Option<Uuid>,
        purchase_price: Decimal,
        selling_price: Decimal,
        article_id: Option<&str>,
        supplier: Option<&str>,
    ) -> Result<Part, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let part = sqlx::query_as::<_, Part>(
            r#"
            INSERT INTO parts (name, description, category_id, purchase_price, selling_price, article_id, supplier)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(category_id)
        .bind(purchase_price)
        .bind(selling_price)
        .bind(article_id)
        .bind(supplier)
        .fetch_one(executor)
        .await?;
        Ok(part)
    }

    pub async fn update_part<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        description: Option<&str>,
        category_id: Option<Uuid>,
        purchase_price: Decimal,
        selling_price: Decimal,
        article_id: Option<&str>,
        supplier: Option<&str>,
    ) -> Result<Option<Part>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let part = sqlx::query_as::<_, Part>(
            r#"
            UPDATE parts
            SET name = $2, description = $3, category_id = $4,
                purchase_price = $5, selling_price = $6,
                article_id = $7, supplier = $8, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(category_id)
        .bind(purchase_price)
        .bind(selling_price)
        .bind(article_id)
        .bind(supplier)
        .fetch_optional(executor)
        .await?;
        Ok(part)
    }

    /// Soft delete: marca a peça sem remover, preservando o histórico.
    pub async fn soft_delete_part<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE parts SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_unique_to_name_conflict(e: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::NameAlreadyExists(name.to_string());
        }
    }
    e.into()
}

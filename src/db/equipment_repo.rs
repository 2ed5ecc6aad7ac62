// src/db/equipment_repo.rs

use chrono::NaiveDate;
use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::equipment::{BomLine, Equipment, EquipmentPart, EquipmentStatus, EquipmentTemplate},
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: PgPool,
}

impl EquipmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Templates
    // ---

    pub async fn get_all_templates<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<EquipmentTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let templates = sqlx::query_as::<_, EquipmentTemplate>(
            "SELECT * FROM equipment_templates ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(templates)
    }

    pub async fn get_template<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<EquipmentTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, EquipmentTemplate>(
            "SELECT * FROM equipment_templates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(template)
    }

    pub async fn insert_template<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        brand: Option<&str>,
        category: Option<&str>,
        article_id: Option<&str>,
        parts: &[BomLine],
        user_id: Option<Uuid>,
    ) -> Result<EquipmentTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, EquipmentTemplate>(
            r#"
            INSERT INTO equipment_templates (name, description, brand, category, article_id, parts, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(brand)
        .bind(category)
        .bind(article_id)
        .bind(Json(parts))
        .bind(user_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::TemplateNameAlreadyExists;
                }
            }
            e.into()
        })
    }

    // ---
    // Equipamentos
    // ---

    pub async fn get_all_equipment<'e, E>(&self, executor: E) -> Result<Vec<Equipment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let equipment = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE deleted_at IS NULL ORDER BY model ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(equipment)
    }

    pub async fn get_equipment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Equipment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let equipment = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(equipment)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_equipment<'e, E>(
        &self,
        executor: E,
        template_id: Option<Uuid>,
        model: &str,
        brand: Option<&str>,
        category: Option<&str>,
        serial_number: Option<&str>,
        year_manufactured: Option<i32>,
        production_date: Option<NaiveDate>,
        article_id: Option<&str>,
        status: EquipmentStatus,
    ) -> Result<Equipment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment
                (template_id, model, brand, category, serial_number,
                 year_manufactured, production_date, article_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(template_id)
        .bind(model)
        .bind(brand)
        .bind(category)
        .bind(serial_number)
        .bind(year_manufactured)
        .bind(production_date)
        .bind(article_id)
        .bind(status)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::SerialNumberAlreadyExists;
                }
            }
            e.into()
        })
    }

    pub async fn insert_equipment_part<'e, E>(
        &self,
        executor: E,
        equipment_id: Uuid,
        sku_id: Uuid,
        quantity_needed: i32,
        notes: Option<&str>,
    ) -> Result<EquipmentPart, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let part = sqlx::query_as::<_, EquipmentPart>(
            r#"
            INSERT INTO equipment_parts (equipment_id, sku_id, quantity_needed, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(equipment_id)
        .bind(sku_id)
        .bind(quantity_needed)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(part)
    }

    pub async fn get_equipment_parts<'e, E>(
        &self,
        executor: E,
        equipment_id: Uuid,
    ) -> Result<Vec<EquipmentPart>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parts = sqlx::query_as::<_, EquipmentPart>(
            "SELECT * FROM equipment_parts WHERE equipment_id = $1 ORDER BY created_at ASC",
        )
        .bind(equipment_id)
        .fetch_all(executor)
        .await?;
        Ok(parts)
    }

    /// Soft delete: o equipamento some das listagens mas o consumo
    /// registrado no livro-razão permanece.
    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE equipment SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

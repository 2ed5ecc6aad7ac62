// src/db/inventory_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{
        InventoryStats, MovementDirection, MovementReason, Sku, SkuDetails, StockMovement,
        StockStatus,
    },
};

const SKU_DETAILS_SELECT: &str = r#"
    SELECT
        s.id, s.part_id, s.color_id,
        p.name AS part_name,
        c.name AS color_name,
        cat.name AS category_name,
        p.purchase_price, p.selling_price,
        s.quantity, s.min_stock_level, s.status
    FROM skus s
    JOIN parts p ON s.part_id = p.id
    LEFT JOIN colors c ON s.color_id = c.id
    LEFT JOIN categories cat ON p.category_id = cat.id
    WHERE s.deleted_at IS NULL AND p.deleted_at IS NULL
"#;

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn get_all_skus<'e, E>(&self, executor: E) -> Result<Vec<SkuDetails>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{SKU_DETAILS_SELECT} ORDER BY p.name ASC, c.name ASC NULLS FIRST");
        let skus = sqlx::query_as::<_, SkuDetails>(&sql).fetch_all(executor).await?;
        Ok(skus)
    }

    pub async fn get_low_stock_skus<'e, E>(&self, executor: E) -> Result<Vec<SkuDetails>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "{SKU_DETAILS_SELECT} AND s.quantity <= s.min_stock_level ORDER BY s.quantity ASC"
        );
        let skus = sqlx::query_as::<_, SkuDetails>(&sql).fetch_all(executor).await?;
        Ok(skus)
    }

    pub async fn get_stats<'e, E>(&self, executor: E) -> Result<InventoryStats, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stats = sqlx::query_as::<_, InventoryStats>(
            r#"
            SELECT
                COUNT(*)::BIGINT AS total_skus,
                COALESCE(SUM(quantity), 0)::BIGINT AS total_quantity,
                COUNT(*) FILTER (WHERE status = 'in_stock')::BIGINT AS in_stock_count,
                COUNT(*) FILTER (WHERE status = 'low_stock')::BIGINT AS low_stock_count,
                COUNT(*) FILTER (WHERE status = 'out_of_stock')::BIGINT AS out_of_stock_count
            FROM skus
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_one(executor)
        .await?;
        Ok(stats)
    }

    pub async fn get_recent_movements<'e, E>(
        &self,
        executor: E,
        limit: i64,
    ) -> Result<Vec<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, StockMovement>(
            "SELECT * FROM stock_movements ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(movements)
    }

    pub async fn get_movements_by_sku<'e, E>(
        &self,
        executor: E,
        sku_id: Uuid,
    ) -> Result<Vec<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, StockMovement>(
            "SELECT * FROM stock_movements WHERE sku_id = $1 ORDER BY created_at DESC",
        )
        .bind(sku_id)
        .fetch_all(executor)
        .await?;
        Ok(movements)
    }

    pub async fn get_sku<'e, E>(&self, executor: E, sku_id: Uuid) -> Result<Option<Sku>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sku =
            sqlx::query_as::<_, Sku>("SELECT * FROM skus WHERE id = $1 AND deleted_at IS NULL")
                .bind(sku_id)
                .fetch_optional(executor)
                .await?;
        Ok(sku)
    }

    /// Preço de compra atual da peça do SKU (para o snapshot no pedido).
    pub async fn get_sku_purchase_price<'e, E>(
        &self,
        executor: E,
        sku_id: Uuid,
    ) -> Result<Option<rust_decimal::Decimal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let price = sqlx::query_scalar::<_, rust_decimal::Decimal>(
            r#"
            SELECT p.purchase_price
            FROM skus s
            JOIN parts p ON s.part_id = p.id
            WHERE s.id = $1 AND s.deleted_at IS NULL AND p.deleted_at IS NULL
            "#,
        )
        .bind(sku_id)
        .fetch_optional(executor)
        .await?;
        Ok(price)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---
    // Estas usam o padrão genérico 'Executor' para rodar dentro de uma transação.

    pub async fn create_sku<'e, E>(
        &self,
        executor: E,
        part_id: Uuid,
        color_id: Option<Uuid>,
        min_stock_level: i32,
    ) -> Result<Sku, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Sku>(
            r#"
            INSERT INTO skus (part_id, color_id, quantity, min_stock_level, status)
            VALUES ($1, $2, 0, $3, 'out_of_stock')
            RETURNING *
            "#,
        )
        .bind(part_id)
        .bind(color_id)
        .bind(min_stock_level)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::SkuAlreadyExists;
                }
            }
            e.into()
        })
    }

    /// Carrega o SKU com lock de linha (FOR UPDATE). Toda mutação de saldo
    /// relê o estado mais recente por aqui, dentro da mesma transação, para
    /// serializar entregas concorrentes sobre o mesmo SKU.
    pub async fn get_sku_for_update<'e, E>(
        &self,
        executor: E,
        sku_id: Uuid,
    ) -> Result<Option<Sku>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sku = sqlx::query_as::<_, Sku>(
            "SELECT * FROM skus WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(sku_id)
        .fetch_optional(executor)
        .await?;
        Ok(sku)
    }

    /// Persiste o novo saldo e o status derivado (calculado no service).
    pub async fn set_quantity<'e, E>(
        &self,
        executor: E,
        sku_id: Uuid,
        quantity: i32,
        status: StockStatus,
    ) -> Result<Sku, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sku = sqlx::query_as::<_, Sku>(
            r#"
            UPDATE skus
            SET quantity = $2, status = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(sku_id)
        .bind(quantity)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(sku)
    }

    /// Registra uma movimentação no livro-razão (auditoria). Append-only.
    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        sku_id: Uuid,
        direction: MovementDirection,
        quantity: i32,
        reason: MovementReason,
        reference_id: Option<Uuid>,
        user_id: Option<Uuid>,
        notes: Option<&str>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (sku_id, direction, quantity, reason, reference_id, user_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(sku_id)
        .bind(direction)
        .bind(quantity)
        .bind(reason)
        .bind(reference_id)
        .bind(user_id)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }
}

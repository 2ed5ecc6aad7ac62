// src/db/order_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::order::{
        Order, OrderItem, OrderItemStatus, OrderNote, OrderStats, OrderStatus,
        OrderStatusHistoryEntry, OrderSummary,
    },
};

const ORDER_SUMMARY_SELECT: &str = r#"
    SELECT
        o.id, o.order_number, o.status,
        u.username AS created_by,
        COUNT(oi.id)::BIGINT AS total_items,
        COALESCE(SUM(oi.quantity_ordered), 0)::BIGINT AS total_quantity,
        COALESCE(SUM(oi.quantity_ordered * oi.purchase_price_at_order), 0) AS total_amount,
        o.created_at, o.updated_at
    FROM orders o
    LEFT JOIN users u ON o.user_id = u.id
    LEFT JOIN order_items oi ON oi.order_id = o.id
"#;

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn get_all_orders<'e, E>(&self, executor: E) -> Result<Vec<OrderSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "{ORDER_SUMMARY_SELECT} GROUP BY o.id, u.username ORDER BY o.created_at DESC"
        );
        let orders = sqlx::query_as::<_, OrderSummary>(&sql).fetch_all(executor).await?;
        Ok(orders)
    }

    pub async fn get_orders_by_user<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Vec<OrderSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "{ORDER_SUMMARY_SELECT} WHERE o.user_id = $1 GROUP BY o.id, u.username ORDER BY o.created_at DESC"
        );
        let orders = sqlx::query_as::<_, OrderSummary>(&sql)
            .bind(user_id)
            .fetch_all(executor)
            .await?;
        Ok(orders)
    }

    pub async fn get_order<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    /// Lock de linha no pedido: serializa reconciliações concorrentes
    /// sobre o mesmo pedido.
    pub async fn get_order_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn get_items<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    /// Relê o item com lock de linha imediatamente antes de calcular o
    /// incremento de entrega (fecha a corrida de lost-update).
    pub async fn get_item_for_update<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE id = $1 AND order_id = $2 FOR UPDATE",
        )
        .bind(item_id)
        .bind(order_id)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    pub async fn get_notes<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<OrderNote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notes = sqlx::query_as::<_, OrderNote>(
            "SELECT * FROM order_notes WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(notes)
    }

    pub async fn get_status_history<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<OrderStatusHistoryEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let history = sqlx::query_as::<_, OrderStatusHistoryEntry>(
            "SELECT * FROM order_status_history WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(history)
    }

    pub async fn get_stats<'e, E>(&self, executor: E) -> Result<OrderStats, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stats = sqlx::query_as::<_, OrderStats>(
            r#"
            SELECT
                COUNT(*)::BIGINT AS total_orders,
                COUNT(*) FILTER (WHERE status = 'waiting_for_answer')::BIGINT AS waiting_for_answer,
                COUNT(*) FILTER (WHERE status = 'to_order')::BIGINT AS to_order,
                COUNT(*) FILTER (WHERE status = 'ordered')::BIGINT AS ordered,
                COUNT(*) FILTER (WHERE status = 'partial')::BIGINT AS partial,
                COUNT(*) FILTER (WHERE status = 'delivered')::BIGINT AS delivered,
                COUNT(*) FILTER (WHERE status = 'cancelled')::BIGINT AS cancelled
            FROM orders
            "#,
        )
        .fetch_one(executor)
        .await?;
        Ok(stats)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    pub async fn insert_order<'e, E>(
        &self,
        executor: E,
        order_number: &str,
        user_id: Option<Uuid>,
        status: OrderStatus,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (order_number, user_id, status)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(order_number)
        .bind(user_id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        sku_id: Uuid,
        quantity_ordered: i32,
        purchase_price_at_order: Decimal,
        notes: Option<&str>,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, sku_id, quantity_ordered, purchase_price_at_order, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(sku_id)
        .bind(quantity_ordered)
        .bind(purchase_price_at_order)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn update_item_delivery<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        quantity_delivered: i32,
        quantity_backorder: i32,
        status: OrderItemStatus,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            UPDATE order_items
            SET quantity_delivered = $2, quantity_backorder = $3, status = $4, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(quantity_delivered)
        .bind(quantity_backorder)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn set_item_status<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        status: OrderItemStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE order_items SET status = $2, updated_at = now() WHERE id = $1")
            .bind(item_id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(order_id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    /// Anexa uma observação ao log corrido do pedido (append-only).
    pub async fn insert_note<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        note: &str,
    ) -> Result<OrderNote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let note = sqlx::query_as::<_, OrderNote>(
            "INSERT INTO order_notes (order_id, note) VALUES ($1, $2) RETURNING *",
        )
        .bind(order_id)
        .bind(note)
        .fetch_one(executor)
        .await?;
        Ok(note)
    }

    /// Anexa uma entrada ao histórico estruturado de status (append-only).
    pub async fn insert_status_history<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        old_status: Option<OrderStatus>,
        new_status: OrderStatus,
        user_id: Option<Uuid>,
        note: Option<&str>,
    ) -> Result<OrderStatusHistoryEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, OrderStatusHistoryEntry>(
            r#"
            INSERT INTO order_status_history (order_id, old_status, new_status, user_id, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(old_status)
        .bind(new_status)
        .bind(user_id)
        .bind(note)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }
}

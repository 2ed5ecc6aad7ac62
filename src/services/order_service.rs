// src/services/order_service.rs
//
// O agregado de Pedido e o motor de reconciliação de entregas.
// A aritmética fica em models::order (pura, testável); aqui mora a
// orquestração transacional: locks de linha, escrita dos itens,
// lançamentos no livro-razão e trilha de auditoria.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, OrderRepository},
    models::{
        inventory::{MovementDirection, MovementReason},
        order::{
            apply_delivery, can_transition, derive_order_status, DeliveryEvent, Order,
            OrderItemStatus, OrderStats, OrderStatus, OrderSummary, OrderWithDetails,
        },
    },
    services::inventory_service::InventoryService,
};

/// Item de um pedido novo, já validado na borda HTTP.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub sku_id: Uuid,
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    inventory_repo: InventoryRepository,
    inventory_service: InventoryService,
    pool: PgPool,
}

impl OrderService {
    pub fn new(
        order_repo: OrderRepository,
        inventory_repo: InventoryRepository,
        inventory_service: InventoryService,
        pool: PgPool,
    ) -> Self {
        Self { order_repo, inventory_repo, inventory_service, pool }
    }

    // --- CREATE ---
    pub async fn create_order(
        &self,
        user_id: Option<Uuid>,
        items: Vec<NewOrderItem>,
        notes: Option<String>,
    ) -> Result<OrderWithDetails, AppError> {
        if items.is_empty() {
            return Err(AppError::EmptyOrder);
        }
        if items.iter().any(|i| i.quantity <= 0) {
            return Err(AppError::InvalidQuantity);
        }

        let mut tx = self.pool.begin().await?;

        // Token baseado em tempo; a unicidade é garantida pela constraint
        let order_number = format!("ORD-{}", Utc::now().timestamp_millis());

        let order = self
            .order_repo
            .insert_order(&mut *tx, &order_number, user_id, OrderStatus::WaitingForAnswer)
            .await?;

        for item in &items {
            // Snapshot do preço de compra no momento do pedido
            let price = self
                .inventory_repo
                .get_sku_purchase_price(&mut *tx, item.sku_id)
                .await?
                .ok_or(AppError::SkuNotFound)?;

            self.order_repo
                .insert_item(&mut *tx, order.id, item.sku_id, item.quantity, price, item.notes.as_deref())
                .await?;
        }

        if let Some(note) = &notes {
            self.order_repo.insert_note(&mut *tx, order.id, note).await?;
        }

        self.order_repo
            .insert_status_history(&mut *tx, order.id, None, order.status, user_id, notes.as_deref())
            .await?;

        let details = self.load_details(&mut tx, order).await?;
        tx.commit().await?;
        Ok(details)
    }

    // --- RECONCILIAÇÃO (mudança de status com eventos de entrega) ---
    //
    // Tudo ou nada: qualquer falha desfaz itens, saldos e lançamentos.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        target: OrderStatus,
        events: Option<Vec<DeliveryEvent>>,
        note: Option<String>,
        user_id: Option<Uuid>,
    ) -> Result<OrderWithDetails, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Lock no pedido: reconciliações concorrentes se serializam aqui
        let order = self
            .order_repo
            .get_order_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        if !can_transition(order.status, target) {
            return Err(AppError::InvalidTransition { from: order.status, to: target });
        }

        // 2. Sem eventos explícitos, um alvo com entrega recebe o restante
        //    de cada item (nunca o total de novo: evita dupla contagem)
        let mut events = events.unwrap_or_default();
        if target.implies_delivery() && events.is_empty() {
            let items = self.order_repo.get_items(&mut *tx, order_id).await?;
            if items.is_empty() {
                return Err(AppError::EmptyOrder);
            }
            events = items
                .iter()
                .map(|i| DeliveryEvent {
                    item_id: i.id,
                    quantity_received: (i.quantity_ordered - i.quantity_delivered).max(0),
                    backorder_override: None,
                    item_status: None,
                })
                .collect();
        }

        // 3. Aplica os eventos na ordem recebida
        for event in &events {
            // Relê o item com lock ANTES de calcular o incremento
            let Some(item) = self
                .order_repo
                .get_item_for_update(&mut *tx, order_id, event.item_id)
                .await?
            else {
                // Item desconhecido é ignorado de propósito, não derruba a transação
                tracing::warn!(
                    "Evento de entrega para item {} ignorado: não pertence ao pedido {}",
                    event.item_id,
                    order_id
                );
                continue;
            };

            let outcome = apply_delivery(item.quantity_ordered, item.quantity_delivered, event);

            self.order_repo
                .update_item_delivery(
                    &mut *tx,
                    item.id,
                    outcome.quantity_delivered,
                    outcome.quantity_backorder,
                    outcome.status,
                )
                .await?;

            // Entrada aditiva de estoque: sem checagem de piso
            if outcome.received > 0 {
                self.inventory_service
                    .record_movement(
                        &mut *tx,
                        item.sku_id,
                        MovementDirection::In,
                        outcome.received,
                        MovementReason::Order,
                        Some(order_id),
                        user_id,
                        Some("Recebimento de pedido"),
                    )
                    .await?;
            }

            if outcome.over_delivered {
                self.order_repo
                    .insert_note(
                        &mut *tx,
                        order_id,
                        &format!(
                            "Item {}: recebido {} de {} pedido(s) — entrega acima do solicitado.",
                            item.id, outcome.quantity_delivered, item.quantity_ordered
                        ),
                    )
                    .await?;
            }
        }

        // 4. Status geral recalculado a partir do conjunto completo de itens
        let items = self.order_repo.get_items(&mut *tx, order_id).await?;
        let snapshots: Vec<_> = items.iter().map(|i| i.snapshot()).collect();
        let final_status = derive_order_status(&snapshots, target);

        let updated = self.order_repo.set_status(&mut *tx, order_id, final_status).await?;

        // 5. Trilha de auditoria
        if let Some(n) = &note {
            self.order_repo.insert_note(&mut *tx, order_id, n).await?;
        }
        self.order_repo
            .insert_status_history(
                &mut *tx,
                order_id,
                Some(order.status),
                final_status,
                user_id,
                note.as_deref(),
            )
            .await?;

        let details = self.load_details(&mut tx, updated).await?;

        // 6. Commit: qualquer erro antes daqui desfez tudo no drop da tx
        tx.commit().await?;
        Ok(details)
    }

    // --- NOTES ---
    pub async fn append_note(&self, order_id: Uuid, note: &str) -> Result<OrderWithDetails, AppError> {
        let order = self
            .order_repo
            .get_order(&self.pool, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        self.order_repo.insert_note(&self.pool, order_id, note).await?;
        self.get_order_with_details(order.id).await
    }

    // --- CANCEL ---
    //
    // Cancelamento não toca no estoque: ele só sobe na entrega.
    pub async fn cancel_order(&self, order_id: Uuid, user_id: Option<Uuid>) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .get_order_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        if order.status.is_terminal() {
            return Err(AppError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Cancelled,
            });
        }

        // Só o que ainda não chegou é cancelado; entregas ficam como estão
        let items = self.order_repo.get_items(&mut *tx, order_id).await?;
        for item in &items {
            if !item.status.survives_cancellation() {
                self.order_repo
                    .set_item_status(&mut *tx, item.id, OrderItemStatus::Cancelled)
                    .await?;
            }
        }
        let updated = self.order_repo.set_status(&mut *tx, order_id, OrderStatus::Cancelled).await?;

        self.order_repo
            .insert_note(&mut *tx, order_id, "Pedido cancelado pelo usuário")
            .await?;
        self.order_repo
            .insert_status_history(
                &mut *tx,
                order_id,
                Some(order.status),
                OrderStatus::Cancelled,
                user_id,
                None,
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // --- Leituras ---

    pub async fn get_all_orders(&self) -> Result<Vec<OrderSummary>, AppError> {
        self.order_repo.get_all_orders(&self.pool).await
    }

    pub async fn get_orders_by_user(&self, user_id: Uuid) -> Result<Vec<OrderSummary>, AppError> {
        self.order_repo.get_orders_by_user(&self.pool, user_id).await
    }

    pub async fn get_stats(&self) -> Result<OrderStats, AppError> {
        self.order_repo.get_stats(&self.pool).await
    }

    pub async fn get_order_with_details(&self, order_id: Uuid) -> Result<OrderWithDetails, AppError> {
        let order = self
            .order_repo
            .get_order(&self.pool, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        let items = self.order_repo.get_items(&self.pool, order_id).await?;
        let notes = self.order_repo.get_notes(&self.pool, order_id).await?;
        let status_history = self.order_repo.get_status_history(&self.pool, order_id).await?;

        Ok(OrderWithDetails { order, items, notes, status_history })
    }

    /// Monta a resposta completa usando a transação em andamento.
    async fn load_details(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order: Order,
    ) -> Result<OrderWithDetails, AppError> {
        let items = self.order_repo.get_items(&mut **tx, order.id).await?;
        let notes = self.order_repo.get_notes(&mut **tx, order.id).await?;
        let status_history = self.order_repo.get_status_history(&mut **tx, order.id).await?;
        Ok(OrderWithDetails { order, items, notes, status_history })
    }
}

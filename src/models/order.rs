// src/models/order.rs
//
// O agregado de Pedido e a parte pura do motor de reconciliação.
// As funções aqui não tocam no banco: o OrderService carrega o estado,
// chama estas funções e persiste o resultado dentro da transação.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Status do pedido ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    WaitingForAnswer,
    ToOrder,
    Ordered,
    Partial,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::WaitingForAnswer => "waiting_for_answer",
            OrderStatus::ToOrder => "to_order",
            OrderStatus::Ordered => "ordered",
            OrderStatus::Partial => "partial",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Estados terminais: nenhuma transição sai deles.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// O status alvo carrega entrega de mercadoria?
    pub fn implies_delivery(&self) -> bool {
        matches!(self, OrderStatus::Partial | OrderStatus::Delivered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Máquina de estados do pedido. Transição para o mesmo status é
/// permitida em estados não-terminais (entregas parciais sucessivas).
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    if from.is_terminal() {
        return false;
    }
    if from == to {
        return true;
    }
    match from {
        Draft | WaitingForAnswer => matches!(to, Draft | WaitingForAnswer | ToOrder | Ordered | Cancelled),
        ToOrder | Ordered => matches!(to, ToOrder | Ordered | Partial | Delivered | Cancelled),
        Partial => matches!(to, Delivered | Cancelled),
        Delivered | Cancelled => false,
    }
}

// --- Status por item ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_item_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderItemStatus {
    Pending,
    Partial,
    Backorder,
    Delivered,
    Cancelled,
}

impl OrderItemStatus {
    /// Cancelar o pedido só cancela o que ainda não chegou: itens já
    /// entregues permanecem entregues (o estoque deles já subiu).
    pub fn survives_cancellation(self) -> bool {
        self == OrderItemStatus::Delivered
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderItemStatus::Pending => "pending",
            OrderItemStatus::Partial => "partial",
            OrderItemStatus::Backorder => "backorder",
            OrderItemStatus::Delivered => "delivered",
            OrderItemStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Entidades ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Option<Uuid>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub sku_id: Uuid,
    pub quantity_ordered: i32,
    pub quantity_delivered: i32,
    pub quantity_backorder: i32,
    pub purchase_price_at_order: Decimal,
    pub status: OrderItemStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            status: self.status,
            quantity_ordered: self.quantity_ordered,
            quantity_delivered: self.quantity_delivered,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OrderNote {
    pub id: Uuid,
    pub order_id: Uuid,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OrderStatusHistoryEntry {
    pub id: Uuid,
    pub order_id: Uuid,
    pub old_status: Option<OrderStatus>,
    pub new_status: OrderStatus,
    pub user_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Linha de listagem com agregados (JOIN em order_items)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OrderSummary {
    pub id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub created_by: Option<String>,
    pub total_items: i64,
    pub total_quantity: i64,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OrderStats {
    pub total_orders: i64,
    pub waiting_for_answer: i64,
    pub to_order: i64,
    pub ordered: i64,
    pub partial: i64,
    pub delivered: i64,
    pub cancelled: i64,
}

// Pedido completo para o GET /orders/{id}
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderWithDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub notes: Vec<OrderNote>,
    pub status_history: Vec<OrderStatusHistoryEntry>,
}

// --- Motor de reconciliação (parte pura) ---

/// Evento de recebimento de um item, vindo da requisição de mudança de status.
#[derive(Debug, Clone)]
pub struct DeliveryEvent {
    pub item_id: Uuid,
    pub quantity_received: i32,
    pub backorder_override: Option<i32>,
    pub item_status: Option<OrderItemStatus>,
}

/// Resultado do cálculo de entrega para um item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub received: i32,
    pub quantity_delivered: i32,
    pub quantity_backorder: i32,
    pub status: OrderItemStatus,
    pub over_delivered: bool,
}

/// Aplica um evento de entrega sobre o estado atual do item.
///
/// `quantity_delivered` só cresce (acumulador); o backorder manual é
/// limitado ao intervalo [0, backorder calculado] para nunca exceder o
/// que de fato falta entregar.
pub fn apply_delivery(
    quantity_ordered: i32,
    already_delivered: i32,
    event: &DeliveryEvent,
) -> DeliveryOutcome {
    let received = event.quantity_received.max(0);
    let new_total = already_delivered + received;
    let calculated = (quantity_ordered - new_total).max(0);

    let backorder = match event.backorder_override {
        Some(manual) if manual > 0 => manual.min(calculated),
        _ => calculated,
    };

    let status = if event.item_status == Some(OrderItemStatus::Cancelled) {
        OrderItemStatus::Cancelled
    } else if backorder > 0 {
        if new_total > 0 {
            OrderItemStatus::Partial
        } else {
            OrderItemStatus::Backorder
        }
    } else if received == 0 && already_delivered == 0 {
        OrderItemStatus::Cancelled
    } else {
        // Inclui o caso de entrega acima do pedido: aceita e anota.
        OrderItemStatus::Delivered
    };

    DeliveryOutcome {
        received,
        quantity_delivered: new_total,
        quantity_backorder: backorder,
        status,
        over_delivered: new_total > quantity_ordered,
    }
}

/// Estado mínimo de um item para derivar o status do pedido.
#[derive(Debug, Clone, Copy)]
pub struct ItemSnapshot {
    pub status: OrderItemStatus,
    pub quantity_ordered: i32,
    pub quantity_delivered: i32,
}

impl ItemSnapshot {
    fn fully_delivered(&self) -> bool {
        self.status == OrderItemStatus::Delivered
            || self.quantity_delivered >= self.quantity_ordered
    }
}

/// Recalcula o status geral do pedido a partir do conjunto completo de itens.
pub fn derive_order_status(items: &[ItemSnapshot], requested: OrderStatus) -> OrderStatus {
    if items.is_empty() {
        return requested;
    }

    if items.iter().all(|i| i.status == OrderItemStatus::Cancelled) {
        return OrderStatus::Cancelled;
    }

    // Itens cancelados não contam contra a entrega completa do restante
    let active: Vec<&ItemSnapshot> = items
        .iter()
        .filter(|i| i.status != OrderItemStatus::Cancelled)
        .collect();

    if active.iter().all(|i| i.fully_delivered()) {
        return OrderStatus::Delivered;
    }

    let any_partial = items.iter().any(|i| {
        matches!(i.status, OrderItemStatus::Partial | OrderItemStatus::Backorder)
            || (i.quantity_delivered > 0 && i.quantity_delivered < i.quantity_ordered)
    });
    if any_partial {
        return OrderStatus::Partial;
    }

    requested
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(received: i32) -> DeliveryEvent {
        DeliveryEvent {
            item_id: Uuid::new_v4(),
            quantity_received: received,
            backorder_override: None,
            item_status: None,
        }
    }

    fn snap(status: OrderItemStatus, ordered: i32, delivered: i32) -> ItemSnapshot {
        ItemSnapshot { status, quantity_ordered: ordered, quantity_delivered: delivered }
    }

    #[test]
    fn entrega_parcial_gera_backorder() {
        // Pedido de 10, recebe 6
        let out = apply_delivery(10, 0, &event(6));
        assert_eq!(out.quantity_delivered, 6);
        assert_eq!(out.quantity_backorder, 4);
        assert_eq!(out.status, OrderItemStatus::Partial);
        assert!(!out.over_delivered);

        let status = derive_order_status(&[snap(out.status, 10, out.quantity_delivered)], OrderStatus::Delivered);
        assert_eq!(status, OrderStatus::Partial);
    }

    #[test]
    fn entrega_complementar_fecha_o_item() {
        // Continua a entrega parcial: recebe os 4 restantes
        let out = apply_delivery(10, 6, &event(4));
        assert_eq!(out.quantity_delivered, 10);
        assert_eq!(out.quantity_backorder, 0);
        assert_eq!(out.status, OrderItemStatus::Delivered);

        let status = derive_order_status(&[snap(out.status, 10, out.quantity_delivered)], OrderStatus::Delivered);
        assert_eq!(status, OrderStatus::Delivered);
    }

    #[test]
    fn entrega_acima_do_pedido_e_aceita_com_aviso() {
        // Recebe 12 de um pedido de 10
        let out = apply_delivery(10, 0, &event(12));
        assert_eq!(out.quantity_delivered, 12);
        assert_eq!(out.quantity_backorder, 0);
        assert_eq!(out.status, OrderItemStatus::Delivered);
        assert!(out.over_delivered);
    }

    #[test]
    fn quantidade_entregue_nunca_diminui() {
        let mut delivered = 0;
        for received in [3, 0, 5, 0, 2] {
            let out = apply_delivery(10, delivered, &event(received));
            assert!(out.quantity_delivered >= delivered);
            delivered = out.quantity_delivered;
        }
        assert_eq!(delivered, 10);
    }

    #[test]
    fn recebimento_negativo_e_tratado_como_zero() {
        let out = apply_delivery(10, 4, &event(-3));
        assert_eq!(out.received, 0);
        assert_eq!(out.quantity_delivered, 4);
        assert_eq!(out.quantity_backorder, 6);
        assert_eq!(out.status, OrderItemStatus::Partial);
    }

    #[test]
    fn backorder_manual_e_limitado_ao_calculado() {
        // Faltam 4; o override não pode inventar mais do que isso
        let mut ev = event(6);
        ev.backorder_override = Some(99);
        let out = apply_delivery(10, 0, &ev);
        assert_eq!(out.quantity_backorder, 4);

        // Override menor que o calculado é respeitado
        let mut ev = event(6);
        ev.backorder_override = Some(2);
        let out = apply_delivery(10, 0, &ev);
        assert_eq!(out.quantity_backorder, 2);
    }

    #[test]
    fn item_sem_recebimento_e_sem_historico_e_cancelado() {
        let out = apply_delivery(10, 0, &event(0));
        assert_eq!(out.status, OrderItemStatus::Cancelled);
    }

    #[test]
    fn status_manual_cancelado_prevalece() {
        let mut ev = event(6);
        ev.item_status = Some(OrderItemStatus::Cancelled);
        let out = apply_delivery(10, 0, &ev);
        assert_eq!(out.status, OrderItemStatus::Cancelled);
    }

    #[test]
    fn pedido_sem_nada_recebido_vira_backorder() {
        let mut ev = event(0);
        ev.backorder_override = Some(10);
        let out = apply_delivery(10, 0, &ev);
        assert_eq!(out.status, OrderItemStatus::Backorder);
        assert_eq!(out.quantity_backorder, 10);
    }

    #[test]
    fn pedido_todo_cancelado_deriva_cancelado() {
        let items = [
            snap(OrderItemStatus::Cancelled, 5, 0),
            snap(OrderItemStatus::Cancelled, 3, 0),
        ];
        assert_eq!(derive_order_status(&items, OrderStatus::Delivered), OrderStatus::Cancelled);
    }

    #[test]
    fn entregue_mais_cancelado_deriva_entregue() {
        let items = [
            snap(OrderItemStatus::Delivered, 5, 5),
            snap(OrderItemStatus::Cancelled, 3, 0),
        ];
        assert_eq!(derive_order_status(&items, OrderStatus::Delivered), OrderStatus::Delivered);
    }

    #[test]
    fn qualquer_pendencia_deriva_parcial() {
        let items = [
            snap(OrderItemStatus::Delivered, 5, 5),
            snap(OrderItemStatus::Backorder, 3, 0),
        ];
        assert_eq!(derive_order_status(&items, OrderStatus::Delivered), OrderStatus::Partial);
    }

    #[test]
    fn sem_entregas_mantem_o_status_pedido() {
        let items = [snap(OrderItemStatus::Pending, 5, 0)];
        assert_eq!(derive_order_status(&items, OrderStatus::Ordered), OrderStatus::Ordered);
    }

    #[test]
    fn cancelamento_so_cancela_o_que_nao_foi_entregue() {
        use OrderItemStatus::*;
        // Cancelamento de pedido 'ordered': nada entregue, tudo vira cancelado
        let before = [Pending, Partial, Backorder, Delivered, Cancelled];
        let after: Vec<_> = before
            .iter()
            .map(|s| if s.survives_cancellation() { *s } else { Cancelled })
            .collect();
        assert_eq!(after, [Cancelled, Cancelled, Cancelled, Delivered, Cancelled]);
    }

    #[test]
    fn cancelamento_sem_entregas_nao_preserva_nenhum_item() {
        use OrderItemStatus::*;
        for status in [Pending, Partial, Backorder, Cancelled] {
            assert!(!status.survives_cancellation());
        }
        assert!(Delivered.survives_cancellation());
    }

    #[test]
    fn maquina_de_estados_bloqueia_terminais() {
        use OrderStatus::*;
        assert!(!can_transition(Delivered, Cancelled));
        assert!(!can_transition(Delivered, Delivered));
        assert!(!can_transition(Cancelled, Ordered));
    }

    #[test]
    fn maquina_de_estados_caminho_feliz() {
        use OrderStatus::*;
        assert!(can_transition(WaitingForAnswer, ToOrder));
        assert!(can_transition(ToOrder, Ordered));
        assert!(can_transition(Ordered, Partial));
        assert!(can_transition(Partial, Partial)); // entregas parciais sucessivas
        assert!(can_transition(Partial, Delivered));
        assert!(can_transition(Ordered, Cancelled));
        assert!(!can_transition(Partial, Ordered));
        assert!(!can_transition(Draft, Delivered));
    }
}

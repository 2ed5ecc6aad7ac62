// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Status de estoque (derivado, nunca editado à mão) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "stock_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Função pura: recalculada após TODA mutação de saldo.
    pub fn derive(quantity: i32, min_stock_level: i32) -> Self {
        if quantity == 0 {
            StockStatus::OutOfStock
        } else if quantity <= min_stock_level {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "movement_direction", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "movement_reason", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MovementReason {
    Manual,
    Adjustment,
    Order,
    Production,
}

/// Delta de um ajuste autoritativo: a direção e a magnitude da única
/// movimentação a registrar, ou `None` quando o saldo já está correto
/// (o livro-razão não ganha entrada de magnitude zero).
pub fn adjustment_delta(current: i32, new_quantity: i32) -> Option<(MovementDirection, i32)> {
    match new_quantity - current {
        0 => None,
        d if d > 0 => Some((MovementDirection::In, d)),
        d => Some((MovementDirection::Out, -d)),
    }
}

// --- SKU: peça + cor opcional, a unidade que tem saldo ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Sku {
    pub id: Uuid,
    pub part_id: Uuid,
    pub color_id: Option<Uuid>,
    pub quantity: i32,
    pub min_stock_level: i32,
    pub status: StockStatus,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Listagem enriquecida (JOIN com peça/cor/categoria)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SkuDetails {
    pub id: Uuid,
    pub part_id: Uuid,
    pub color_id: Option<Uuid>,
    pub part_name: String,
    pub color_name: Option<String>,
    pub category_name: Option<String>,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    pub quantity: i32,
    pub min_stock_level: i32,
    pub status: StockStatus,
}

// --- Movimentação: registro imutável do livro-razão ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StockMovement {
    pub id: Uuid,
    pub sku_id: Uuid,
    pub direction: MovementDirection,
    pub quantity: i32,
    pub reason: MovementReason,
    pub reference_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Visão agregada para o dashboard de estoque
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct InventoryStats {
    pub total_skus: i64,
    pub total_quantity: i64,
    pub in_stock_count: i64,
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
}

// Item em falta numa montagem: usado pelo erro InsufficientStock
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Shortfall {
    pub sku_id: Uuid,
    pub needed: i32,
    pub available: i32,
    pub missing: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_zero_e_esgotado() {
        assert_eq!(StockStatus::derive(0, 5), StockStatus::OutOfStock);
        assert_eq!(StockStatus::derive(0, 0), StockStatus::OutOfStock);
    }

    #[test]
    fn status_abaixo_do_minimo_e_baixo() {
        assert_eq!(StockStatus::derive(1, 5), StockStatus::LowStock);
        assert_eq!(StockStatus::derive(5, 5), StockStatus::LowStock);
    }

    #[test]
    fn status_acima_do_minimo_e_disponivel() {
        assert_eq!(StockStatus::derive(6, 5), StockStatus::InStock);
        assert_eq!(StockStatus::derive(100, 0), StockStatus::InStock);
    }

    #[test]
    fn derivacao_e_idempotente() {
        // Recalcular com a mesma entrada sempre dá o mesmo resultado
        for qty in 0..20 {
            let a = StockStatus::derive(qty, 5);
            let b = StockStatus::derive(qty, 5);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn ajuste_para_cima_e_entrada_com_a_diferenca() {
        assert_eq!(adjustment_delta(3, 10), Some((MovementDirection::In, 7)));
    }

    #[test]
    fn ajuste_para_baixo_e_saida_com_a_diferenca() {
        assert_eq!(adjustment_delta(10, 3), Some((MovementDirection::Out, 7)));
        assert_eq!(adjustment_delta(5, 0), Some((MovementDirection::Out, 5)));
    }

    #[test]
    fn ajuste_para_o_mesmo_saldo_nao_gera_movimentacao() {
        assert_eq!(adjustment_delta(7, 7), None);
        assert_eq!(adjustment_delta(0, 0), None);
    }

    #[test]
    fn magnitude_do_ajuste_fecha_com_o_saldo_final() {
        // Aplicar o delta com o sinal da direção sempre leva ao saldo alvo
        for (current, target) in [(0, 9), (9, 0), (4, 4), (12, 5)] {
            match adjustment_delta(current, target) {
                None => assert_eq!(current, target),
                Some((MovementDirection::In, m)) => {
                    assert!(m > 0);
                    assert_eq!(current + m, target);
                }
                Some((MovementDirection::Out, m)) => {
                    assert!(m > 0);
                    assert_eq!(current - m, target);
                }
            }
        }
    }
}

// src/services/inventory_service.rs
//
// O livro-razão de estoque. Toda mudança de saldo passa por aqui:
// trava a linha do SKU, aplica o delta, rederiva o status e grava a
// movimentação — tudo dentro da transação do chamador (savepoint
// quando aninhada) ou de uma transação própria.

use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, InventoryRepository},
    models::inventory::{
        adjustment_delta, InventoryStats, MovementDirection, MovementReason, Shortfall, Sku,
        SkuDetails, StockMovement, StockStatus,
    },
};

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    catalog_repo: CatalogRepository,
    pool: PgPool,
}

impl InventoryService {
    pub fn new(
        inventory_repo: InventoryRepository,
        catalog_repo: CatalogRepository,
        pool: PgPool,
    ) -> Self {
        Self { inventory_repo, catalog_repo, pool }
    }

    // --- CREATE SKU ---
    pub async fn create_sku(
        &self,
        part_id: Uuid,
        color_id: Option<Uuid>,
        min_stock_level: i32,
        initial_quantity: i32,
        user_id: Option<Uuid>,
    ) -> Result<Sku, AppError> {
        let mut tx = self.pool.begin().await?;

        // A peça precisa existir (e não estar marcada como excluída)
        self.catalog_repo
            .get_part(&mut *tx, part_id)
            .await?
            .ok_or(AppError::PartNotFound)?;

        let sku = self
            .inventory_repo
            .create_sku(&mut *tx, part_id, color_id, min_stock_level)
            .await?;

        // Estoque inicial entra como movimentação manual normal
        if initial_quantity > 0 {
            self.record_movement(
                &mut *tx,
                sku.id,
                MovementDirection::In,
                initial_quantity,
                MovementReason::Manual,
                None,
                user_id,
                Some("Estoque inicial"),
            )
            .await?;
        }

        let sku = self
            .inventory_repo
            .get_sku(&mut *tx, sku.id)
            .await?
            .ok_or(AppError::SkuNotFound)?;

        tx.commit().await?;
        Ok(sku)
    }

    // --- RECORD MOVEMENT (ENTRADA / SAÍDA) ---
    //
    // Entradas nunca falham por disponibilidade; saídas exigem saldo
    // suficiente e falham com a lista de faltas.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_movement<'e, E>(
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
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if quantity <= 0 {
            return Err(AppError::InvalidQuantity);
        }

        let mut tx = executor.begin().await?;

        // Relê o saldo mais recente com lock de linha
        let sku = self
            .inventory_repo
            .get_sku_for_update(&mut *tx, sku_id)
            .await?
            .ok_or(AppError::SkuNotFound)?;

        let new_quantity = match direction {
            MovementDirection::In => sku.quantity + quantity,
            MovementDirection::Out => {
                if sku.quantity < quantity {
                    return Err(AppError::InsufficientStock(vec![Shortfall {
                        sku_id,
                        needed: quantity,
                        available: sku.quantity,
                        missing: quantity - sku.quantity,
                    }]));
                }
                sku.quantity - quantity
            }
        };

        let status = StockStatus::derive(new_quantity, sku.min_stock_level);
        self.inventory_repo
            .set_quantity(&mut *tx, sku_id, new_quantity, status)
            .await?;

        let movement = self
            .inventory_repo
            .insert_movement(&mut *tx, sku_id, direction, quantity, reason, reference_id, user_id, notes)
            .await?;

        tx.commit().await?;
        Ok(movement)
    }

    // --- ADJUST TO (CORREÇÃO AUTORITATIVA) ---
    //
    // Define o saldo diretamente e registra UMA movimentação com o
    // |delta|. Não passa pela checagem de disponibilidade: ajustes são
    // correções de inventário.
    pub async fn adjust_to(
        &self,
        sku_id: Uuid,
        new_quantity: i32,
        user_id: Option<Uuid>,
        notes: Option<&str>,
    ) -> Result<Option<StockMovement>, AppError> {
        if new_quantity < 0 {
            return Err(AppError::InvalidQuantity);
        }

        let mut tx = self.pool.begin().await?;

        let sku = self
            .inventory_repo
            .get_sku_for_update(&mut *tx, sku_id)
            .await?
            .ok_or(AppError::SkuNotFound)?;

        let Some((direction, magnitude)) = adjustment_delta(sku.quantity, new_quantity) else {
            // Nada a corrigir
            tx.commit().await?;
            return Ok(None);
        };

        let status = StockStatus::derive(new_quantity, sku.min_stock_level);

        self.inventory_repo
            .set_quantity(&mut *tx, sku_id, new_quantity, status)
            .await?;

        let movement = self
            .inventory_repo
            .insert_movement(
                &mut *tx,
                sku_id,
                direction,
                magnitude,
                MovementReason::Adjustment,
                None,
                user_id,
                notes.or(Some("Ajuste de estoque")),
            )
            .await?;

        tx.commit().await?;
        Ok(Some(movement))
    }

    // --- Leituras ---

    pub async fn get_all_skus(&self) -> Result<Vec<SkuDetails>, AppError> {
        self.inventory_repo.get_all_skus(&self.pool).await
    }

    pub async fn get_low_stock_skus(&self) -> Result<Vec<SkuDetails>, AppError> {
        self.inventory_repo.get_low_stock_skus(&self.pool).await
    }

    pub async fn get_stats(&self) -> Result<InventoryStats, AppError> {
        self.inventory_repo.get_stats(&self.pool).await
    }

    pub async fn get_recent_movements(&self, limit: i64) -> Result<Vec<StockMovement>, AppError> {
        self.inventory_repo.get_recent_movements(&self.pool, limit).await
    }

    pub async fn get_movements_by_sku(&self, sku_id: Uuid) -> Result<Vec<StockMovement>, AppError> {
        // 404 se o SKU nem existe, em vez de lista vazia enganosa
        self.inventory_repo
            .get_sku(&self.pool, sku_id)
            .await?
            .ok_or(AppError::SkuNotFound)?;
        self.inventory_repo.get_movements_by_sku(&self.pool, sku_id).await
    }
}

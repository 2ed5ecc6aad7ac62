// src/services/equipment_service.rs
//
// Montagem de equipamentos a partir de uma lista de materiais (ad hoc
// ou de um template salvo). Padrão pré-checa-depois-grava: primeiro
// trava e confere o saldo de TODOS os componentes; só então insere o
// equipamento, os registros de consumo e as baixas no livro-razão.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EquipmentRepository, InventoryRepository},
    models::{
        equipment::{
            aggregate_bom, check_availability, BomLine, ConsumptionReport, Equipment,
            EquipmentStatus, EquipmentTemplate, EquipmentWithParts,
        },
        inventory::{MovementDirection, MovementReason},
    },
    services::inventory_service::InventoryService,
};

/// Linha da lista de materiais vinda da requisição.
#[derive(Debug, Clone)]
pub struct NewEquipmentPart {
    pub sku_id: Uuid,
    pub quantity_needed: i32,
    pub notes: Option<String>,
}

/// Entrada completa da montagem, já validada na borda HTTP.
#[derive(Debug, Clone)]
pub struct CreateEquipmentInput {
    pub template_id: Option<Uuid>,
    pub model: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub serial_number: Option<String>,
    pub year_manufactured: Option<i32>,
    pub production_date: Option<NaiveDate>,
    pub article_id: Option<String>,
    pub parts: Vec<NewEquipmentPart>,
    pub reduce_stock: bool,
    pub save_as_template: bool,
    pub template_name: Option<String>,
}

#[derive(Clone)]
pub struct EquipmentService {
    equipment_repo: EquipmentRepository,
    inventory_repo: InventoryRepository,
    inventory_service: InventoryService,
    pool: PgPool,
}

impl EquipmentService {
    pub fn new(
        equipment_repo: EquipmentRepository,
        inventory_repo: InventoryRepository,
        inventory_service: InventoryService,
        pool: PgPool,
    ) -> Self {
        Self { equipment_repo, inventory_repo, inventory_service, pool }
    }

    // --- CREATE EQUIPMENT ---
    pub async fn create_equipment(
        &self,
        input: CreateEquipmentInput,
        user_id: Option<Uuid>,
    ) -> Result<EquipmentWithParts, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut model = input.model.filter(|m| !m.trim().is_empty());
        let mut brand = input.brand;
        let mut category = input.category;
        let mut article_id = input.article_id;
        let mut parts = input.parts;
        let mut template_id_used = input.template_id;

        // Template selecionado: preenche os padrões, a requisição sobrepõe
        if let Some(template_id) = input.template_id {
            let template = self
                .equipment_repo
                .get_template(&mut *tx, template_id)
                .await?
                .ok_or(AppError::TemplateNotFound)?;

            model = model.or(Some(template.name.clone()));
            brand = brand.or(template.brand.clone());
            category = category.or(template.category.clone());
            article_id = article_id.or(template.article_id.clone());

            if parts.is_empty() {
                parts = template
                    .parts
                    .0
                    .iter()
                    .map(|line| NewEquipmentPart {
                        sku_id: line.sku_id,
                        quantity_needed: line.quantity.max(1),
                        notes: None,
                    })
                    .collect();
            }
        }

        let model = model.ok_or(AppError::MissingModel)?;
        if parts.iter().any(|p| p.quantity_needed <= 0) {
            return Err(AppError::InvalidQuantity);
        }

        // Configuração nova pode virar template na mesma transação
        if input.save_as_template && input.template_id.is_none() {
            let bom: Vec<BomLine> = parts
                .iter()
                .map(|p| BomLine { sku_id: p.sku_id, quantity: p.quantity_needed })
                .collect();
            let name = input.template_name.clone().unwrap_or_else(|| model.clone());

            let template = self
                .equipment_repo
                .insert_template(
                    &mut *tx,
                    &name,
                    Some(&format!("Template criado a partir do equipamento: {}", model)),
                    brand.as_deref(),
                    category.as_deref(),
                    article_id.as_deref(),
                    &bom,
                    user_id,
                )
                .await?;
            template_id_used = Some(template.id);
        }

        // Pré-checagem: trava cada SKU e junta TODAS as faltas antes de
        // qualquer mutação
        if input.reduce_stock && !parts.is_empty() {
            self.precheck_availability(&mut tx, &parts).await?;
        }

        let equipment = self
            .equipment_repo
            .insert_equipment(
                &mut *tx,
                template_id_used,
                &model,
                brand.as_deref(),
                category.as_deref(),
                input.serial_number.as_deref(),
                input.year_manufactured,
                input.production_date,
                article_id.as_deref(),
                EquipmentStatus::Active,
            )
            .await?;

        for part in &parts {
            self.equipment_repo
                .insert_equipment_part(
                    &mut *tx,
                    equipment.id,
                    part.sku_id,
                    part.quantity_needed,
                    part.notes.as_deref(),
                )
                .await?;

            if input.reduce_stock {
                self.inventory_service
                    .record_movement(
                        &mut *tx,
                        part.sku_id,
                        MovementDirection::Out,
                        part.quantity_needed,
                        MovementReason::Production,
                        Some(equipment.id),
                        user_id,
                        Some("Montagem de equipamento"),
                    )
                    .await?;
            }
        }

        let parts = self.equipment_repo.get_equipment_parts(&mut *tx, equipment.id).await?;
        tx.commit().await?;
        Ok(EquipmentWithParts { equipment, parts })
    }

    // --- PRODUCE ---
    //
    // Reexecuta o consumo dos componentes já declarados do equipamento,
    // com a mesma pré-checagem.
    pub async fn produce(
        &self,
        equipment_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<ConsumptionReport, AppError> {
        let mut tx = self.pool.begin().await?;

        let equipment = self
            .equipment_repo
            .get_equipment(&mut *tx, equipment_id)
            .await?
            .ok_or(AppError::EquipmentNotFound)?;

        let parts: Vec<NewEquipmentPart> = self
            .equipment_repo
            .get_equipment_parts(&mut *tx, equipment_id)
            .await?
            .into_iter()
            .map(|p| NewEquipmentPart {
                sku_id: p.sku_id,
                quantity_needed: p.quantity_needed,
                notes: None,
            })
            .collect();

        self.precheck_availability(&mut tx, &parts).await?;

        let mut consumed = Vec::with_capacity(parts.len());
        for part in &parts {
            self.inventory_service
                .record_movement(
                    &mut *tx,
                    part.sku_id,
                    MovementDirection::Out,
                    part.quantity_needed,
                    MovementReason::Production,
                    Some(equipment.id),
                    user_id,
                    Some("Produção de equipamento"),
                )
                .await?;
            consumed.push(BomLine { sku_id: part.sku_id, quantity: part.quantity_needed });
        }

        tx.commit().await?;
        Ok(ConsumptionReport { equipment_id: equipment.id, consumed })
    }

    // --- SAVE AS TEMPLATE ---
    //
    // Escrita pura de metadados, sem tocar no livro-razão.
    pub async fn save_as_template(
        &self,
        name: &str,
        description: Option<&str>,
        brand: Option<&str>,
        category: Option<&str>,
        article_id: Option<&str>,
        parts: Vec<BomLine>,
        user_id: Option<Uuid>,
    ) -> Result<EquipmentTemplate, AppError> {
        if parts.iter().any(|p| p.quantity <= 0) {
            return Err(AppError::InvalidQuantity);
        }
        self.equipment_repo
            .insert_template(
                &self.pool,
                name,
                description,
                brand,
                category,
                article_id,
                &parts,
                user_id,
            )
            .await
    }

    // --- Leituras / exclusão ---

    pub async fn get_all_equipment(&self) -> Result<Vec<Equipment>, AppError> {
        self.equipment_repo.get_all_equipment(&self.pool).await
    }

    pub async fn get_equipment_with_parts(&self, id: Uuid) -> Result<EquipmentWithParts, AppError> {
        let equipment = self
            .equipment_repo
            .get_equipment(&self.pool, id)
            .await?
            .ok_or(AppError::EquipmentNotFound)?;
        let parts = self.equipment_repo.get_equipment_parts(&self.pool, id).await?;
        Ok(EquipmentWithParts { equipment, parts })
    }

    pub async fn delete_equipment(&self, id: Uuid) -> Result<(), AppError> {
        let deleted = self.equipment_repo.soft_delete(&self.pool, id).await?;
        if !deleted {
            return Err(AppError::EquipmentNotFound);
        }
        Ok(())
    }

    pub async fn get_all_templates(&self) -> Result<Vec<EquipmentTemplate>, AppError> {
        self.equipment_repo.get_all_templates(&self.pool).await
    }

    pub async fn get_template(&self, id: Uuid) -> Result<EquipmentTemplate, AppError> {
        self.equipment_repo
            .get_template(&self.pool, id)
            .await?
            .ok_or(AppError::TemplateNotFound)
    }

    /// Trava cada SKU da lista e devolve InsufficientStock com todas as
    /// faltas de uma vez (nunca só a primeira). Linhas repetidas do
    /// mesmo SKU são somadas antes da comparação com o saldo.
    async fn precheck_availability(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        parts: &[NewEquipmentPart],
    ) -> Result<(), AppError> {
        let bom: Vec<BomLine> = parts
            .iter()
            .map(|p| BomLine { sku_id: p.sku_id, quantity: p.quantity_needed })
            .collect();

        let mut lines = Vec::with_capacity(bom.len());
        for line in aggregate_bom(&bom) {
            let sku = self
                .inventory_repo
                .get_sku_for_update(&mut **tx, line.sku_id)
                .await?
                .ok_or(AppError::SkuNotFound)?;
            lines.push((line, sku.quantity));
        }

        let shortfalls = check_availability(&lines);
        if !shortfalls.is_empty() {
            return Err(AppError::InsufficientStock(shortfalls));
        }
        Ok(())
    }
}

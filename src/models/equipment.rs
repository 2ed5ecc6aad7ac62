// src/models/equipment.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::inventory::Shortfall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "equipment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    Active,
    Maintenance,
    Retired,
}

/// Uma linha da lista de materiais: SKU + quantidade por unidade montada.
/// É assim que o campo JSONB `parts` do template é (de)serializado —
/// o domínio nunca enxerga o texto cru.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BomLine {
    pub sku_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct EquipmentTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub article_id: Option<String>,
    #[schema(value_type = Vec<BomLine>)]
    pub parts: sqlx::types::Json<Vec<BomLine>>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: Uuid,
    pub template_id: Option<Uuid>,
    pub model: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub serial_number: Option<String>,
    pub year_manufactured: Option<i32>,
    pub production_date: Option<NaiveDate>,
    pub article_id: Option<String>,
    pub status: EquipmentStatus,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registro de consumo: quanto de cada SKU este equipamento usa.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct EquipmentPart {
    pub id: Uuid,
    pub equipment_id: Uuid,
    pub sku_id: Uuid,
    pub quantity_needed: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentWithParts {
    #[serde(flatten)]
    pub equipment: Equipment,
    pub parts: Vec<EquipmentPart>,
}

/// Relatório devolvido pelo `produce`: o que foi baixado do estoque.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConsumptionReport {
    pub equipment_id: Uuid,
    pub consumed: Vec<BomLine>,
}

/// Consolida a lista de materiais somando as quantidades de linhas que
/// repetem o mesmo SKU, preservando a ordem da primeira ocorrência. A
/// checagem de disponibilidade precisa ver o total por SKU, não cada
/// linha isolada.
pub fn aggregate_bom(lines: &[BomLine]) -> Vec<BomLine> {
    let mut totals: Vec<BomLine> = Vec::with_capacity(lines.len());
    for line in lines {
        match totals.iter_mut().find(|t| t.sku_id == line.sku_id) {
            Some(total) => total.quantity += line.quantity,
            None => totals.push(line.clone()),
        }
    }
    totals
}

/// Pré-checagem de disponibilidade: compara cada linha da lista de
/// materiais com o saldo atual e devolve TODAS as faltas, não só a
/// primeira. Lista vazia significa que a montagem pode prosseguir.
pub fn check_availability(lines: &[(BomLine, i32)]) -> Vec<Shortfall> {
    lines
        .iter()
        .filter(|(line, available)| available < &line.quantity)
        .map(|(line, available)| Shortfall {
            sku_id: line.sku_id,
            needed: line.quantity,
            available: *available,
            missing: line.quantity - available,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32) -> BomLine {
        BomLine { sku_id: Uuid::new_v4(), quantity }
    }

    #[test]
    fn saldo_suficiente_nao_gera_faltas() {
        let lines = vec![(line(3), 5), (line(2), 2)];
        assert!(check_availability(&lines).is_empty());
    }

    #[test]
    fn falta_e_reportada_com_o_tamanho_exato() {
        // Precisa de 5, tem 3 -> falta 2
        let lines = vec![(line(5), 3)];
        let shortfalls = check_availability(&lines);
        assert_eq!(shortfalls.len(), 1);
        assert_eq!(shortfalls[0].needed, 5);
        assert_eq!(shortfalls[0].available, 3);
        assert_eq!(shortfalls[0].missing, 2);
    }

    #[test]
    fn todas_as_faltas_sao_listadas() {
        let lines = vec![(line(5), 3), (line(1), 1), (line(4), 0)];
        let shortfalls = check_availability(&lines);
        assert_eq!(shortfalls.len(), 2);
        assert_eq!(shortfalls[0].missing, 2);
        assert_eq!(shortfalls[1].missing, 4);
    }

    #[test]
    fn linhas_repetidas_do_mesmo_sku_sao_somadas() {
        let id = Uuid::new_v4();
        let bom = vec![
            BomLine { sku_id: id, quantity: 3 },
            line(2),
            BomLine { sku_id: id, quantity: 3 },
        ];
        let agg = aggregate_bom(&bom);
        assert_eq!(agg.len(), 2);
        assert_eq!(agg[0].sku_id, id);
        assert_eq!(agg[0].quantity, 6);
        assert_eq!(agg[1].quantity, 2);
    }

    #[test]
    fn falta_e_detectada_sobre_o_total_consolidado() {
        // Duas linhas de 3 contra saldo 5: cada uma passa sozinha,
        // o total de 6 não
        let id = Uuid::new_v4();
        let bom = vec![
            BomLine { sku_id: id, quantity: 3 },
            BomLine { sku_id: id, quantity: 3 },
        ];
        let agg = aggregate_bom(&bom);
        let lines: Vec<_> = agg.into_iter().map(|l| (l, 5)).collect();
        let shortfalls = check_availability(&lines);
        assert_eq!(shortfalls.len(), 1);
        assert_eq!(shortfalls[0].needed, 6);
        assert_eq!(shortfalls[0].available, 5);
        assert_eq!(shortfalls[0].missing, 1);
    }
}

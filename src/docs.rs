// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::list_users,

        // --- Catalog ---
        handlers::catalog::get_all_brands,
        handlers::catalog::create_brand,
        handlers::catalog::get_all_colors,
        handlers::catalog::create_color,
        handlers::catalog::get_all_categories,
        handlers::catalog::create_category,

        // --- Parts ---
        handlers::parts::get_all_parts,
        handlers::parts::get_part_by_id,
        handlers::parts::create_part,
        handlers::parts::update_part,
        handlers::parts::delete_part,

        // --- Inventory ---
        handlers::inventory::get_all_skus,
        handlers::inventory::get_low_stock_skus,
        handlers::inventory::get_stats,
        handlers::inventory::create_sku,
        handlers::inventory::record_movement,
        handlers::inventory::adjust_stock,
        handlers::inventory::get_recent_movements,
        handlers::inventory::get_movements_by_sku,

        // --- Orders ---
        handlers::orders::get_all_orders,
        handlers::orders::get_my_orders,
        handlers::orders::get_order_stats,
        handlers::orders::get_order_by_id,
        handlers::orders::create_order,
        handlers::orders::update_order_status,
        handlers::orders::append_note,
        handlers::orders::cancel_order,

        // --- Equipment ---
        handlers::equipment::get_all_equipment,
        handlers::equipment::get_equipment_by_id,
        handlers::equipment::create_equipment,
        handlers::equipment::produce_equipment,
        handlers::equipment::delete_equipment,
        handlers::equipment::get_all_templates,
        handlers::equipment::get_template_by_id,
        handlers::equipment::create_template,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Catalog ---
            models::catalog::Brand,
            models::catalog::Color,
            models::catalog::Category,
            models::catalog::Part,

            // --- Inventory ---
            models::inventory::StockStatus,
            models::inventory::MovementDirection,
            models::inventory::MovementReason,
            models::inventory::Sku,
            models::inventory::SkuDetails,
            models::inventory::StockMovement,
            models::inventory::InventoryStats,
            models::inventory::Shortfall,

            // --- Orders ---
            models::order::OrderStatus,
            models::order::OrderItemStatus,
            models::order::Order,
            models::order::OrderItem,
            models::order::OrderNote,
            models::order::OrderStatusHistoryEntry,
            models::order::OrderSummary,
            models::order::OrderStats,
            models::order::OrderWithDetails,

            // --- Equipment ---
            models::equipment::EquipmentStatus,
            models::equipment::BomLine,
            models::equipment::EquipmentTemplate,
            models::equipment::Equipment,
            models::equipment::EquipmentPart,
            models::equipment::EquipmentWithParts,
            models::equipment::ConsumptionReport,

            // --- Payloads ---
            handlers::catalog::CreateNamePayload,
            handlers::catalog::CreateCategoryPayload,
            handlers::parts::CreatePartPayload,
            handlers::parts::UpdatePartPayload,
            handlers::inventory::CreateSkuPayload,
            handlers::inventory::RecordMovementPayload,
            handlers::inventory::AdjustStockPayload,
            handlers::orders::CreateOrderItemPayload,
            handlers::orders::CreateOrderPayload,
            handlers::orders::DeliveryItemPayload,
            handlers::orders::UpdateOrderStatusPayload,
            handlers::orders::AppendNotePayload,
            handlers::equipment::EquipmentPartPayload,
            handlers::equipment::CreateEquipmentPayload,
            handlers::equipment::CreateTemplatePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Registro e login"),
        (name = "Users", description = "Usuários autenticados"),
        (name = "Catalog", description = "Marcas, cores e categorias"),
        (name = "Parts", description = "Catálogo de peças"),
        (name = "Inventory", description = "SKUs, saldos e movimentações"),
        (name = "Orders", description = "Pedidos e reconciliação de entregas"),
        (name = "Equipment", description = "Montagem de equipamentos"),
        (name = "Templates", description = "Listas de materiais reutilizáveis"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

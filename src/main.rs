//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/", get(handlers::auth::list_users))
        .route("/me", get(handlers::auth::get_me));

    let catalog_routes = Router::new()
        .route(
            "/brands",
            get(handlers::catalog::get_all_brands).post(handlers::catalog::create_brand),
        )
        .route(
            "/colors",
            get(handlers::catalog::get_all_colors).post(handlers::catalog::create_color),
        )
        .route(
            "/categories",
            get(handlers::catalog::get_all_categories).post(handlers::catalog::create_category),
        );

    let parts_routes = Router::new()
        .route(
            "/",
            get(handlers::parts::get_all_parts).post(handlers::parts::create_part),
        )
        .route(
            "/{id}",
            get(handlers::parts::get_part_by_id)
                .put(handlers::parts::update_part)
                .delete(handlers::parts::delete_part),
        );

    let inventory_routes = Router::new()
        .route(
            "/skus",
            get(handlers::inventory::get_all_skus).post(handlers::inventory::create_sku),
        )
        .route("/skus/low-stock", get(handlers::inventory::get_low_stock_skus))
        .route("/skus/{id}/movements", get(handlers::inventory::get_movements_by_sku))
        .route("/stats", get(handlers::inventory::get_stats))
        .route(
            "/movements",
            get(handlers::inventory::get_recent_movements)
                .post(handlers::inventory::record_movement),
        )
        .route("/adjust", post(handlers::inventory::adjust_stock));

    let order_routes = Router::new()
        .route(
            "/",
            get(handlers::orders::get_all_orders).post(handlers::orders::create_order),
        )
        .route("/my", get(handlers::orders::get_my_orders))
        .route("/stats", get(handlers::orders::get_order_stats))
        .route("/{id}", get(handlers::orders::get_order_by_id))
        .route("/{id}/status", axum::routing::patch(handlers::orders::update_order_status))
        .route("/{id}/notes", post(handlers::orders::append_note))
        .route("/{id}/cancel", post(handlers::orders::cancel_order));

    let equipment_routes = Router::new()
        .route(
            "/",
            get(handlers::equipment::get_all_equipment).post(handlers::equipment::create_equipment),
        )
        .route(
            "/{id}",
            get(handlers::equipment::get_equipment_by_id)
                .delete(handlers::equipment::delete_equipment),
        )
        .route("/{id}/produce", post(handlers::equipment::produce_equipment));

    let template_routes = Router::new()
        .route(
            "/",
            get(handlers::equipment::get_all_templates).post(handlers::equipment::create_template),
        )
        .route("/{id}", get(handlers::equipment::get_template_by_id));

    // Tudo que não é /api/auth passa pelo auth_guard
    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/catalog", catalog_routes)
        .nest("/api/parts", parts_routes)
        .nest("/api/inventory", inventory_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/equipment", equipment_routes)
        .nest("/api/templates", template_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}

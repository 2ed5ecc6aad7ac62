// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        CatalogRepository, EquipmentRepository, InventoryRepository, OrderRepository,
        UserRepository,
    },
    services::{
        auth::AuthService, catalog_service::CatalogService, equipment_service::EquipmentService,
        inventory_service::InventoryService, order_service::OrderService,
    },
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub inventory_service: InventoryService,
    pub order_service: OrderService,
    pub equipment_service: EquipmentService,
}

impl AppState {
    // Carrega as configurações, conecta no banco e monta o grafo de serviços
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL deve ser definida"))?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET deve ser definido"))?;

        let db_pool = match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await
        {
            Ok(pool) => {
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
                pool
            }
            Err(e) => {
                tracing::error!("🔥 Falha ao conectar ao banco de dados: {:?}", e);
                std::process::exit(1);
            }
        };

        let user_repo = UserRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let equipment_repo = EquipmentRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret, db_pool.clone());
        let catalog_service = CatalogService::new(catalog_repo.clone(), db_pool.clone());
        let inventory_service =
            InventoryService::new(inventory_repo.clone(), catalog_repo, db_pool.clone());
        let order_service = OrderService::new(
            order_repo,
            inventory_repo.clone(),
            inventory_service.clone(),
            db_pool.clone(),
        );
        let equipment_service = EquipmentService::new(
            equipment_repo,
            inventory_repo,
            inventory_service.clone(),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            auth_service,
            catalog_service,
            inventory_service,
            order_service,
            equipment_service,
        })
    }
}

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod equipment_repo;
pub use equipment_repo::EquipmentRepository;

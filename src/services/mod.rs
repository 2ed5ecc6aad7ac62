pub mod auth;
pub mod catalog_service;
pub mod equipment_service;
pub mod inventory_service;
pub mod order_service;

pub mod auth;
pub mod catalog;
pub mod equipment;
pub mod inventory;
pub mod orders;
pub mod parts;

pub mod health;
pub mod not_found;
pub mod products;

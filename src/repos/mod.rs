pub mod error;
pub mod product_repo;

pub use product_repo::{PgProductRepo, ProductRepo, ProductRow};

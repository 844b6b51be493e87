/*
 * Responsibility
 * - モジュール構成の公開 (bin と tests/ の双方から使う)
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;

/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (Bearer 検証), cors, http (request-id/trace/timeout), security_headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;

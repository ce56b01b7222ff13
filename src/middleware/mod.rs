/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - require_auth(...), cors::apply(...), http::apply(...)
 */
pub mod auth;
pub mod cors;
pub mod http;

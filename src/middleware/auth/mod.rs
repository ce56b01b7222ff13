pub mod access;

pub use access::require_auth;

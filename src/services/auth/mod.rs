pub mod claims;
pub mod error;
pub mod factory;
pub mod header;
pub mod jwks;
pub mod permissions;
pub mod service;
pub mod verifier;

pub use claims::ClaimSet;
pub use error::{AuthError, TokenPhase};
pub use factory::build_auth_service;
pub use header::extract_token;
pub use permissions::check_permission;
pub use service::AuthService;

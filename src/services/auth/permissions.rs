use super::claims::ClaimSet;
use super::error::AuthError;

/// Require `required` to be listed in the token's `permissions` claim.
///
/// The claim itself must always be present. An empty `required` then
/// accepts the token whatever the claim lists.
pub fn check_permission(claims: &ClaimSet, required: &str) -> Result<(), AuthError> {
    let granted = claims.permissions().ok_or(AuthError::PermissionsMissing)?;

    if required.is_empty() || granted.contains(&required) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}

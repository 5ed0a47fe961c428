use serde_json::Value;

use super::{AuthError, Claims};

pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
pub const POST_DRINKS: &str = "post:drinks";
pub const PATCH_DRINKS: &str = "patch:drinks";
pub const DELETE_DRINKS: &str = "delete:drinks";

/// Succeeds when the `permissions` claim lists `required`.
///
/// A token without the claim (or with something other than an array in it)
/// fails differently from one whose permissions simply lack `required`.
pub fn check_permission(claims: &Claims, required: &str) -> Result<(), AuthError> {
    let permissions = match claims.get("permissions") {
        Some(Value::Array(items)) => items,
        _ => return Err(AuthError::PermissionsClaimMissing),
    };

    if permissions.iter().any(|p| p.as_str() == Some(required)) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}

//! Owner kind resolution.

use tracing::debug;

use crate::api::GitLabApi;
use crate::error::ScmError;
use crate::models::OwnerKind;

/// Probe whether `owner` is an individual account or a group.
///
/// An owner is an individual when the user lookup finds an account with that
/// username, and a group otherwise.
///
/// # Errors
///
/// Propagates any error from the user lookup.
pub async fn resolve_owner_kind(api: &dyn GitLabApi, owner: &str) -> Result<OwnerKind, ScmError> {
    let kind = match api.find_user(owner).await? {
        Some(user) => {
            debug!(owner = %owner, user_id = user.id, "Owner is a user account");
            OwnerKind::Individual
        }
        None => OwnerKind::Group,
    };

    debug!(owner = %owner, kind = %kind, "Resolved project owner");
    Ok(kind)
}

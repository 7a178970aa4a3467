//! Finding an existing hook that already targets the callback URL.

use crate::api::GitLabApi;
use crate::error::ScmError;
use crate::models::{Project, ProjectHook};

/// First hook whose URL equals `target_url` exactly, if any.
#[must_use]
pub fn matching_hook<'a>(hooks: &'a [ProjectHook], target_url: &str) -> Option<&'a ProjectHook> {
    hooks.iter().find(|hook| hook.url == target_url)
}

/// List the project's hooks and return the one pointing at `target_url`.
///
/// `Ok(None)` means the project has no such hook yet.
///
/// # Errors
///
/// Returns an error if the hooks cannot be listed.
pub async fn find_matching_hook(
    api: &dyn GitLabApi,
    project: &Project,
    target_url: &str,
) -> Result<Option<ProjectHook>, ScmError> {
    let hooks = api.list_hooks(project).await?;
    Ok(matching_hook(&hooks, target_url).cloned())
}

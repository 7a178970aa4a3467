//! Remote capability set the reconciler consumes.

use async_trait::async_trait;

use crate::error::ScmError;
use crate::models::{GitLabUser, HookSpec, Project, ProjectHook, Token, TreeEntry};

/// Operations the reconciler needs from a GitLab server.
#[async_trait]
pub trait GitLabApi: Send + Sync {
    /// Look up an individual account by username.
    ///
    /// Returns `Ok(None)` when no account carries that username.
    async fn find_user(&self, username: &str) -> Result<Option<GitLabUser>, ScmError>;

    /// Projects owned by the authenticated account.
    async fn owned_projects(&self) -> Result<Vec<Project>, ScmError>;

    /// Projects directly under a group path.
    async fn group_projects(&self, group: &str) -> Result<Vec<Project>, ScmError>;

    /// Fetch a single project by its full path.
    async fn get_project(&self, path: &str) -> Result<Project, ScmError>;

    /// Top level of the project's repository tree.
    async fn repository_tree(&self, project: &Project) -> Result<Vec<TreeEntry>, ScmError>;

    /// All hooks registered on a project.
    async fn list_hooks(&self, project: &Project) -> Result<Vec<ProjectHook>, ScmError>;

    /// Register a new hook on a project.
    async fn add_hook(
        &self,
        project: &Project,
        url: &str,
        spec: &HookSpec,
    ) -> Result<ProjectHook, ScmError>;
}

/// Opens an API session against a server.
///
/// One session is opened per reconciliation and dropped when it ends.
pub trait ApiConnector: Send + Sync {
    fn connect(&self, server_url: &str, token: &Token) -> Result<Box<dyn GitLabApi>, ScmError>;
}

//! Hook reconciliation for GitLab owners and single projects.
//!
//! GitLab has no API for group-level hooks, so an owner is reconciled by
//! walking its projects and creating the callback hook on every project that
//! does not already have one. Existing hooks are never modified.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{ApiConnector, GitLabApi};
use crate::config::{HooksConfig, ServerConfig, ServerDirectory};
use crate::error::ScmError;
use crate::inspector::find_matching_hook;
use crate::models::{HookSpec, OwnerKind, Project, Token};
use crate::owner::resolve_owner_kind;
use crate::registration::{select_credential, RegistrationMode};
use crate::target_url::build_target_url;

/// A navigator: every project of one owner on one server.
#[derive(Debug, Clone)]
pub struct NavigatorConfig {
    pub server_name: String,
    /// Username or group path.
    pub project_owner: String,
    /// Credential configured on the navigator, used in item-managed mode.
    pub credentials: Option<Token>,
}

/// A source: a single project on one server.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub server_name: String,
    /// Full project path, e.g. `group/subgroup/project`.
    pub project_path: String,
    /// Credential configured on the source, used in item-managed mode.
    pub credentials: Option<Token>,
}

/// Why a reconciliation ended without doing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoServer,
    ModeDisabled,
    HooksNotManaged,
    NoCredentials,
    NoTargetUrl,
    NoProjects,
    EmptyRepository,
}

/// A project whose hook could not be checked or created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    pub project: String,
    pub error: String,
}

/// Per-project results of a reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Projects that received a new hook.
    pub created: Vec<String>,
    /// Projects that already had the hook.
    pub existing: Vec<String>,
    pub failed: Vec<HookFailure>,
}

/// Result of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Skipped(SkipReason),
    Completed(ReconcileReport),
    /// Discovery failed; nothing further was attempted.
    Failed(String),
}

impl ReconcileOutcome {
    /// Whether anything went wrong, including isolated per-project failures.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        match self {
            Self::Skipped(_) => false,
            Self::Completed(report) => !report.failed.is_empty(),
            Self::Failed(_) => true,
        }
    }
}

/// State of a project's hook after [`HookReconciler`] looked at it.
enum HookState {
    Existing,
    Created,
}

/// Everything a reconciliation needs once the preconditions hold.
struct Session {
    server: ServerConfig,
    api: Box<dyn GitLabApi>,
    target_url: String,
}

/// Ensures GitLab projects carry a hook pointing at the automation server.
pub struct HookReconciler {
    servers: Arc<dyn ServerDirectory>,
    connector: Arc<dyn ApiConnector>,
    hooks: HooksConfig,
    hook_spec: HookSpec,
}

impl HookReconciler {
    #[must_use]
    pub fn new(
        servers: Arc<dyn ServerDirectory>,
        connector: Arc<dyn ApiConnector>,
        hooks: HooksConfig,
    ) -> Self {
        Self {
            servers,
            connector,
            hooks,
            hook_spec: HookSpec::default(),
        }
    }

    /// Override the settings of created hooks.
    #[must_use]
    pub fn with_hook_spec(mut self, hook_spec: HookSpec) -> Self {
        self.hook_spec = hook_spec;
        self
    }

    /// Ensure every project of the navigator's owner has the hook.
    ///
    /// A failure on one project is recorded in the report and does not stop
    /// the remaining projects.
    pub async fn reconcile_owner(
        &self,
        navigator: &NavigatorConfig,
        mode: RegistrationMode,
    ) -> ReconcileOutcome {
        let session = match self.open_session(&navigator.server_name, mode, || {
            navigator.credentials.clone()
        }) {
            Ok(session) => session,
            Err(outcome) => return outcome,
        };
        let owner = navigator.project_owner.as_str();
        let api = session.api.as_ref();

        let projects = match list_owner_projects(api, owner).await {
            Ok(projects) => projects,
            Err(e) => {
                warn!(
                    owner = %owner,
                    server = %session.server.server_url,
                    error = %e,
                    "Could not manage group hooks"
                );
                return ReconcileOutcome::Failed(e.to_string());
            }
        };

        if projects.is_empty() {
            info!(owner = %owner, "Owner has no projects, no hooks to manage");
            return ReconcileOutcome::Skipped(SkipReason::NoProjects);
        }

        let mut report = ReconcileReport::default();
        for project in &projects {
            let path = project.path_with_namespace.clone();
            match self.ensure_hook(api, project, &session.target_url).await {
                Ok(HookState::Existing) => report.existing.push(path),
                Ok(HookState::Created) => report.created.push(path),
                Err(e) => {
                    warn!(
                        owner = %owner,
                        project = %path,
                        server = %session.server.server_url,
                        error = %e,
                        "Could not manage project hook"
                    );
                    report.failed.push(HookFailure {
                        project: path,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            owner = %owner,
            total = projects.len(),
            created = report.created.len(),
            existing = report.existing.len(),
            failed = report.failed.len(),
            "Group hook reconciliation complete"
        );

        ReconcileOutcome::Completed(report)
    }

    /// Ensure a single project has the hook.
    ///
    /// Empty repositories are skipped.
    pub async fn reconcile_project(
        &self,
        source: &SourceConfig,
        mode: RegistrationMode,
    ) -> ReconcileOutcome {
        let session = match self.open_session(&source.server_name, mode, || {
            source.credentials.clone()
        }) {
            Ok(session) => session,
            Err(outcome) => return outcome,
        };
        let path = source.project_path.as_str();
        let api = session.api.as_ref();

        let failed = |e: &ScmError| {
            warn!(
                project = %path,
                server = %session.server.server_url,
                error = %e,
                "Could not manage project hooks"
            );
            ReconcileOutcome::Failed(e.to_string())
        };

        let project = match api.get_project(path).await {
            Ok(project) => project,
            Err(e) => return failed(&e),
        };

        match api.repository_tree(&project).await {
            Ok(entries) if entries.is_empty() => {
                info!(project = %path, "Project is empty, no hook created");
                return ReconcileOutcome::Skipped(SkipReason::EmptyRepository);
            }
            Ok(entries) => {
                debug!(
                    project = %path,
                    entries = entries.len(),
                    first = %entries[0].path,
                    "Repository has content"
                );
            }
            Err(e) if e.is_not_found() => {
                info!(project = %path, "Project has no repository tree, no hook created");
                return ReconcileOutcome::Skipped(SkipReason::EmptyRepository);
            }
            Err(e) => return failed(&e),
        }

        let mut report = ReconcileReport::default();
        match self.ensure_hook(api, &project, &session.target_url).await {
            Ok(HookState::Existing) => report.existing.push(project.path_with_namespace.clone()),
            Ok(HookState::Created) => report.created.push(project.path_with_namespace.clone()),
            Err(e) => return failed(&e),
        }

        ReconcileOutcome::Completed(report)
    }

    /// Check the preconditions shared by both entry points and connect.
    ///
    /// No remote call is made unless every precondition holds.
    fn open_session<F>(
        &self,
        server_name: &str,
        mode: RegistrationMode,
        item_credentials: F,
    ) -> Result<Session, ReconcileOutcome>
    where
        F: FnOnce() -> Option<Token>,
    {
        let skip = |reason: SkipReason| {
            debug!(server = %server_name, mode = %mode, reason = ?reason, "Skipping hook management");
            ReconcileOutcome::Skipped(reason)
        };

        let Some(server) = self.servers.find_server(server_name) else {
            return Err(skip(SkipReason::NoServer));
        };

        let Some(token) = select_credential(mode, &server, item_credentials) else {
            let reason = match mode {
                RegistrationMode::Disabled => SkipReason::ModeDisabled,
                RegistrationMode::SystemManaged if !server.manage_hooks => {
                    SkipReason::HooksNotManaged
                }
                _ => SkipReason::NoCredentials,
            };
            return Err(skip(reason));
        };

        let Some(target_url) = build_target_url(&self.hooks.root_url) else {
            return Err(skip(SkipReason::NoTargetUrl));
        };

        let api = self.connector.connect(&server.server_url, &token).map_err(|e| {
            warn!(server = %server.server_url, error = %e, "Could not connect to GitLab");
            ReconcileOutcome::Failed(e.to_string())
        })?;

        Ok(Session {
            server,
            api,
            target_url,
        })
    }

    async fn ensure_hook(
        &self,
        api: &dyn GitLabApi,
        project: &Project,
        target_url: &str,
    ) -> Result<HookState, ScmError> {
        if let Some(hook) = find_matching_hook(api, project, target_url).await? {
            debug!(project = %project.path_with_namespace, hook_id = hook.id, "Hook already present");
            return Ok(HookState::Existing);
        }

        let hook = api.add_hook(project, target_url, &self.hook_spec).await?;
        info!(
            project = %project.path_with_namespace,
            hook_id = hook.id,
            url = %target_url,
            "Created project hook"
        );
        Ok(HookState::Created)
    }
}

/// Projects of an owner that hooks are managed for.
///
/// For an individual, projects they own inside group namespaces are left to
/// the group.
async fn list_owner_projects(api: &dyn GitLabApi, owner: &str) -> Result<Vec<Project>, ScmError> {
    let kind = resolve_owner_kind(api, owner).await?;
    info!(owner = %owner, kind = %kind, "Project owner");

    let projects = match kind {
        OwnerKind::Individual => api
            .owned_projects()
            .await?
            .into_iter()
            .filter(|p| !p.is_group_namespace())
            .collect(),
        OwnerKind::Group => api.group_projects(owner).await?,
    };

    debug!(owner = %owner, count = projects.len(), "Listed owner projects");
    Ok(projects)
}

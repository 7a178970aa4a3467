//! GitLab webhook management for the automation server.
//!
//! This crate keeps GitLab projects pointed at the automation server's
//! webhook receiver:
//!
//! - [`HookReconciler`] creates the callback hook on every project of an owner
//!   (user or group), or on a single project, where it is missing
//! - [`RegistrationMode`] decides whether hooks are managed at all and with
//!   which credential
//! - [`GitLabClient`] implements the [`GitLabApi`] capability over GitLab REST v4
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gitlab_hooks::{
//!     GitLabConnector, HookReconciler, HooksConfig, NavigatorConfig, RegistrationMode,
//!     ServersFile,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let servers = ServersFile::load("gitlab-servers.toml".as_ref())?;
//! let reconciler = HookReconciler::new(
//!     Arc::new(servers),
//!     Arc::new(GitLabConnector),
//!     HooksConfig::default(),
//! );
//!
//! let navigator = NavigatorConfig {
//!     server_name: "gitlab".to_string(),
//!     project_owner: "acme".to_string(),
//!     credentials: None,
//! };
//! let outcome = reconciler
//!     .reconcile_owner(&navigator, RegistrationMode::SystemManaged)
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! - `GITLAB_SERVERS_CONFIG`: path of the servers file (default `gitlab-servers.toml`)
//! - `HOOKS_ROOT_URL`: public root URL of the automation server

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod error;
pub mod gitlab;
pub mod inspector;
pub mod models;
pub mod owner;
pub mod reconciler;
pub mod registration;
pub mod target_url;

pub use api::{ApiConnector, GitLabApi};
pub use config::{HooksConfig, ServerConfig, ServerDirectory, ServersFile};
pub use error::ScmError;
pub use gitlab::{GitLabClient, GitLabConnector};
pub use inspector::find_matching_hook;
pub use models::{
    GitLabUser, HookSpec, Namespace, OwnerKind, Project, ProjectHook, Token, TreeEntry,
};
pub use owner::resolve_owner_kind;
pub use reconciler::{
    HookFailure, HookReconciler, NavigatorConfig, ReconcileOutcome, ReconcileReport, SkipReason,
    SourceConfig,
};
pub use registration::{select_credential, RegistrationMode};
pub use target_url::build_target_url;

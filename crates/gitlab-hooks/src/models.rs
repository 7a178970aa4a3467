//! GitLab entities consumed by the hook reconciler.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespace kind GitLab reports for group-owned projects.
pub const GROUP_NAMESPACE_KIND: &str = "group";

/// A GitLab user account, as returned by the user lookup.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GitLabUser {
    pub id: u64,
    pub username: String,
}

/// Whether an owner string names an individual account or a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerKind {
    Individual,
    Group,
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual => write!(f, "user"),
            Self::Group => write!(f, "group"),
        }
    }
}

/// Namespace a project lives in.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Namespace {
    /// `user` or `group`.
    pub kind: String,
    #[serde(default)]
    pub full_path: String,
}

/// A GitLab project (repository).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Project {
    pub id: u64,
    pub path_with_namespace: String,
    pub namespace: Namespace,
}

impl Project {
    /// Whether the project sits under a group namespace.
    #[must_use]
    pub fn is_group_namespace(&self) -> bool {
        self.namespace.kind == GROUP_NAMESPACE_KIND
    }
}

/// A webhook registered on a project.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProjectHook {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub push_events: bool,
    #[serde(default)]
    pub merge_requests_events: bool,
    #[serde(default)]
    pub tag_push_events: bool,
    #[serde(default)]
    pub enable_ssl_verification: bool,
}

/// Entry of a repository file tree.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
}

/// Settings applied to every hook the reconciler creates.
///
/// The default is the managed-hook policy: push, merge request and tag push
/// events, no SSL verification, no secret token.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HookSpec {
    pub push_events: bool,
    pub merge_requests_events: bool,
    pub tag_push_events: bool,
    pub enable_ssl_verification: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for HookSpec {
    fn default() -> Self {
        Self {
            push_events: true,
            merge_requests_events: true,
            tag_push_events: true,
            enable_ssl_verification: false,
            token: None,
        }
    }
}

/// An API credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Plain-text secret, for building request headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

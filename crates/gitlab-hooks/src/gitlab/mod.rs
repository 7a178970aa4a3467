//! GitLab REST v4 implementation of [`GitLabApi`](crate::api::GitLabApi).

mod client;

pub use client::{GitLabClient, GitLabConnector};

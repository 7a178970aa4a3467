//! GitLab REST API client.
//!
//! API Documentation: <https://docs.gitlab.com/ee/api/rest/>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::{ApiConnector, GitLabApi};
use crate::error::ScmError;
use crate::models::{GitLabUser, HookSpec, Project, ProjectHook, Token, TreeEntry};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size requested from list endpoints.
const PER_PAGE: &str = "100";

/// Header GitLab uses to announce the next page of a listing.
const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Header carrying a personal access token.
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// GitLab API client bound to one server and one token.
#[derive(Clone)]
pub struct GitLabClient {
    client: Client,
    api_url: String,
    token: Token,
}

/// Body of `POST /projects/:id/hooks`.
#[derive(Debug, Serialize)]
struct AddHookRequest<'a> {
    url: &'a str,
    #[serde(flatten)]
    spec: &'a HookSpec,
}

impl GitLabClient {
    /// Create a client for `server_url` (e.g. `https://gitlab.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL is blank or the HTTP client cannot
    /// be created.
    pub fn new(server_url: &str, token: Token) -> Result<Self, ScmError> {
        let server_url = server_url.trim().trim_end_matches('/');
        if server_url.is_empty() {
            return Err(ScmError::Config("GitLab server URL is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("gitlab-hooks/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_url: format!("{server_url}/api/v4"),
            token,
        })
    }

    /// GET a single JSON document.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ScmError> {
        let url = format!("{}{path}", self.api_url);
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, self.token.expose())
            .query(query)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// GET every page of a listing, following `X-Next-Page`.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ScmError> {
        let url = format!("{}{path}", self.api_url);
        let mut items = Vec::new();
        let mut page = "1".to_string();

        loop {
            debug!(url = %url, page = %page, "GET request (paginated)");

            let response = self
                .client
                .get(&url)
                .header(TOKEN_HEADER, self.token.expose())
                .query(query)
                .query(&[("per_page", PER_PAGE), ("page", page.as_str())])
                .send()
                .await?;

            let next = response
                .headers()
                .get(NEXT_PAGE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string);

            let mut batch: Vec<T> = Self::handle_response(response).await?;
            items.append(&mut batch);

            match next {
                Some(next) if next != page => page = next,
                _ => break,
            }
        }

        Ok(items)
    }

    /// POST a JSON body and decode the JSON response.
    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ScmError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let url = format!("{}{path}", self.api_url);
        debug!(url = %url, "POST request");

        let response = self
            .client
            .post(&url)
            .header(TOKEN_HEADER, self.token.expose())
            .json(body)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Handle API response, parsing JSON or error.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ScmError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "Failed to parse response");
                ScmError::Serialization(e)
            })
        } else if status == StatusCode::NOT_FOUND {
            Err(ScmError::NotFound(text))
        } else {
            Err(ScmError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[async_trait]
impl GitLabApi for GitLabClient {
    async fn find_user(&self, username: &str) -> Result<Option<GitLabUser>, ScmError> {
        let users: Vec<GitLabUser> = self.get("/users", &[("username", username)]).await?;
        Ok(users
            .into_iter()
            .find(|u| u.username.eq_ignore_ascii_case(username)))
    }

    async fn owned_projects(&self) -> Result<Vec<Project>, ScmError> {
        self.get_all("/projects", &[("owned", "true")]).await
    }

    async fn group_projects(&self, group: &str) -> Result<Vec<Project>, ScmError> {
        let path = format!("/groups/{}/projects", urlencoding::encode(group));
        self.get_all(&path, &[]).await
    }

    async fn get_project(&self, path: &str) -> Result<Project, ScmError> {
        let path = format!("/projects/{}", urlencoding::encode(path));
        self.get(&path, &[]).await
    }

    async fn repository_tree(&self, project: &Project) -> Result<Vec<TreeEntry>, ScmError> {
        let path = format!("/projects/{}/repository/tree", project.id);
        self.get(&path, &[]).await
    }

    async fn list_hooks(&self, project: &Project) -> Result<Vec<ProjectHook>, ScmError> {
        let path = format!("/projects/{}/hooks", project.id);
        self.get_all(&path, &[]).await
    }

    async fn add_hook(
        &self,
        project: &Project,
        url: &str,
        spec: &HookSpec,
    ) -> Result<ProjectHook, ScmError> {
        let path = format!("/projects/{}/hooks", project.id);
        self.post(&path, &AddHookRequest { url, spec }).await
    }
}

/// Opens [`GitLabClient`] sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitLabConnector;

impl ApiConnector for GitLabConnector {
    fn connect(&self, server_url: &str, token: &Token) -> Result<Box<dyn GitLabApi>, ScmError> {
        Ok(Box::new(GitLabClient::new(server_url, token.clone())?))
    }
}

//! Integration tests for the GitLab REST client.
//!
//! These tests run the client against a mock GitLab server.

use std::sync::Arc;

use gitlab_hooks::{
    GitLabApi, GitLabClient, GitLabConnector, HookReconciler, HookSpec, HooksConfig,
    NavigatorConfig, Project, ReconcileOutcome, RegistrationMode, ScmError, ServerConfig, Token,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "glpat-test";

fn client(server: &MockServer) -> GitLabClient {
    GitLabClient::new(&server.uri(), Token::new(TOKEN)).unwrap()
}

fn project_json(id: u64, path: &str, kind: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": path.rsplit('/').next().unwrap(),
        "path_with_namespace": path,
        "namespace": {"id": 99, "kind": kind, "full_path": path.rsplit_once('/').unwrap().0}
    })
}

fn acme_api() -> Project {
    serde_json::from_value(project_json(7, "acme/api", "group")).unwrap()
}

#[tokio::test]
async fn test_find_user_sends_token_and_matches_username() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/users"))
        .and(query_param("username", "alice"))
        .and(header("PRIVATE-TOKEN", TOKEN))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 3, "username": "alice", "name": "Alice"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let user = client(&server).find_user("alice").await.unwrap().unwrap();
    assert_eq!(user.id, 3);
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn test_find_user_empty_listing_means_group() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert!(client(&server).find_user("acme").await.unwrap().is_none());
}

#[tokio::test]
async fn test_owned_projects_follows_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .and(query_param("owned", "true"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-next-page", "2")
                .set_body_json(json!([project_json(1, "alice/one", "user")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .and(query_param("owned", "true"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-next-page", "")
                .set_body_json(json!([project_json(2, "acme/two", "group")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let projects = client(&server).owned_projects().await.unwrap();
    let paths: Vec<&str> = projects
        .iter()
        .map(|p| p.path_with_namespace.as_str())
        .collect();
    assert_eq!(paths, vec!["alice/one", "acme/two"]);
    assert!(projects[1].is_group_namespace());
}

#[tokio::test]
async fn test_group_projects_encodes_group_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/groups/acme%2Fplatform/projects"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([project_json(5, "acme/platform/core", "group")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let projects = client(&server).group_projects("acme/platform").await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, 5);
}

#[tokio::test]
async fn test_get_project_maps_404_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/acme%2Fmissing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "404 Project Not Found"})),
        )
        .mount(&server)
        .await;

    let err = client(&server).get_project("acme/missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/7/repository/tree"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let err = client(&server).repository_tree(&acme_api()).await.unwrap_err();
    match err {
        ScmError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "oops");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_hooks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/7/hooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 11,
            "url": "https://ci.example.org/gitlab-webhook/post",
            "push_events": true,
            "merge_requests_events": true,
            "tag_push_events": false,
            "enable_ssl_verification": true,
            "created_at": "2024-01-01T00:00:00Z"
        }])))
        .mount(&server)
        .await;

    let hooks = client(&server).list_hooks(&acme_api()).await.unwrap();
    assert_eq!(hooks.len(), 1);
    assert_eq!(hooks[0].id, 11);
    assert!(!hooks[0].tag_push_events);
}

#[tokio::test]
async fn test_add_hook_posts_managed_spec() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/7/hooks"))
        .and(header("PRIVATE-TOKEN", TOKEN))
        .and(body_json(json!({
            "url": "https://ci.example.org/gitlab-webhook/post",
            "push_events": true,
            "merge_requests_events": true,
            "tag_push_events": true,
            "enable_ssl_verification": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 12,
            "url": "https://ci.example.org/gitlab-webhook/post",
            "push_events": true,
            "merge_requests_events": true,
            "tag_push_events": true,
            "enable_ssl_verification": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let hook = client(&server)
        .add_hook(
            &acme_api(),
            "https://ci.example.org/gitlab-webhook/post",
            &HookSpec::default(),
        )
        .await
        .unwrap();
    assert_eq!(hook.id, 12);
}

#[tokio::test]
async fn test_reconcile_group_against_gitlab() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/users"))
        .and(query_param("username", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/groups/acme/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            project_json(7, "acme/api", "group"),
            project_json(8, "acme/web", "group")
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/7/hooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "url": "https://ci.example.org/gitlab-webhook/post"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/8/hooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/8/hooks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 2,
            "url": "https://ci.example.org/gitlab-webhook/post"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/7/hooks"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let reconciler = HookReconciler::new(
        Arc::new(vec![ServerConfig {
            name: "gitlab".to_string(),
            server_url: server.uri(),
            manage_hooks: true,
            credentials: Some(Token::new(TOKEN)),
        }]),
        Arc::new(GitLabConnector),
        HooksConfig {
            root_url: "https://ci.example.org/".to_string(),
        },
    );
    let navigator = NavigatorConfig {
        server_name: "gitlab".to_string(),
        project_owner: "acme".to_string(),
        credentials: None,
    };

    match reconciler
        .reconcile_owner(&navigator, RegistrationMode::SystemManaged)
        .await
    {
        ReconcileOutcome::Completed(report) => {
            assert_eq!(report.existing, vec!["acme/api"]);
            assert_eq!(report.created, vec!["acme/web"]);
            assert!(report.failed.is_empty());
        }
        other => panic!("expected a completed reconciliation, got {other:?}"),
    }
}

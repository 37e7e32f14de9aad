use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::rate_limit::respect_rate_limit;
use super::types::{GitHubBranchDto, GitHubCommitDto, GitHubRepositoryDto};
use crate::auth::Token;
use crate::error::{CommitLensError, Result};
use crate::models::CommitQuery;
use crate::pagination::PageCursor;
use crate::providers::api_timestamp;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

pub struct GitHubClient {
    client: Client,
    api_url: Url,
    token: Option<Token>,
}

impl GitHubClient {
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("commitlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CommitLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(base_url)
            .map_err(|e| CommitLensError::Config(format!("Invalid GitHub base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    fn auth_request(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    /// Appends path segments to the API root, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                CommitLensError::Config(format!(
                    "GitHub base URL cannot be a base: {}",
                    self.api_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
        cursor: PageCursor,
    ) -> Result<Vec<T>> {
        let (page, per_page) = cursor.as_page();

        let request = self
            .client
            .get(url)
            .query(params)
            .query(&[("page", page), ("per_page", per_page)]);

        let response = self.auth_request(request).send().await?;
        respect_rate_limit(response.headers()).await;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(CommitLensError::Api { status, body });
        }

        Ok(response.json::<Vec<T>>().await?)
    }

    pub async fn fetch_repositories_page(
        &self,
        org: &str,
        cursor: PageCursor,
    ) -> Result<Vec<GitHubRepositoryDto>> {
        let url = self.endpoint(&["orgs", org, "repos"])?;
        self.fetch_page(url, &[], cursor).await
    }

    pub async fn fetch_branches_page(
        &self,
        org: &str,
        repo: &str,
        cursor: PageCursor,
    ) -> Result<Vec<GitHubBranchDto>> {
        let url = self.endpoint(&["repos", org, repo, "branches"])?;
        self.fetch_page(url, &[], cursor).await
    }

    pub async fn fetch_commits_page(
        &self,
        org: &str,
        repo: &str,
        query: &CommitQuery,
        cursor: PageCursor,
    ) -> Result<Vec<GitHubCommitDto>> {
        let url = self.endpoint(&["repos", org, repo, "commits"])?;

        let mut params = Vec::new();
        if let Some(branch) = &query.branch {
            params.push(("sha", branch.clone()));
        }
        if let Some(author) = &query.author {
            params.push(("author", author.clone()));
        }
        if let Some(since) = query.since {
            params.push(("since", api_timestamp(since)));
        }
        if let Some(until) = query.until {
            params.push(("until", api_timestamp(until)));
        }

        self.fetch_page(url, &params, cursor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockito::{Matcher, Server};
    use std::time::{Duration, Instant};

    fn page_query(page: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), page.into()),
            Matcher::UrlEncoded("per_page".into(), "100".into()),
        ])
    }

    #[tokio::test]
    async fn test_fetch_repositories_sends_auth_and_paging() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/orgs/acme/repos")
            .match_query(page_query("1"))
            .match_header("authorization", "Bearer ghp_test")
            .match_header("accept", GITHUB_ACCEPT)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"name": "api"}, {"name": "web"}]"#)
            .create_async()
            .await;

        let client = GitHubClient::new(&server.url(), Some(Token::from("ghp_test"))).unwrap();
        let repos = client
            .fetch_repositories_page("acme", PageCursor::first_page())
            .await
            .unwrap();

        mock.assert_async().await;
        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["api", "web"]);
    }

    #[tokio::test]
    async fn test_fetch_commits_passes_filters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/acme/api/commits")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sha".into(), "feature/login".into()),
                Matcher::UrlEncoded("author".into(), "janedoe".into()),
                Matcher::UrlEncoded("since".into(), "2024-01-01T00:00:00Z".into()),
                Matcher::UrlEncoded("until".into(), "2024-03-31T00:00:00Z".into()),
                Matcher::UrlEncoded("page".into(), "2".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let client = GitHubClient::new(&server.url(), None).unwrap();
        let query = CommitQuery {
            author: Some("janedoe".to_string()),
            ..CommitQuery::between(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap(),
            )
        }
        .on_branch("feature/login");

        let commits = client
            .fetch_commits_page(
                "acme",
                "api",
                &query,
                PageCursor::Page {
                    page: 2,
                    per_page: 100,
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(commits.is_empty());
    }

    #[tokio::test]
    async fn test_non_ok_status_is_an_api_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/acme/api/branches")
            .match_query(page_query("1"))
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let client = GitHubClient::new(&server.url(), None).unwrap();
        let result = client
            .fetch_branches_page("acme", "api", PageCursor::first_page())
            .await;

        match result {
            Err(CommitLensError::Api { status, body }) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert!(body.contains("Not Found"));
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    async fn exhausted_quota_branches(
        status: usize,
        body: &str,
    ) -> (Result<Vec<GitHubBranchDto>>, Duration) {
        let mut server = Server::new_async().await;
        let reset = Utc::now().timestamp() + 2;
        let _mock = server
            .mock("GET", "/repos/acme/api/branches")
            .match_query(page_query("1"))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_header("x-ratelimit-remaining", "0")
            .with_header("x-ratelimit-reset", &reset.to_string())
            .with_body(body)
            .create_async()
            .await;

        let client = GitHubClient::new(&server.url(), None).unwrap();
        let started = Instant::now();
        let result = client
            .fetch_branches_page("acme", "api", PageCursor::first_page())
            .await;
        (result, started.elapsed())
    }

    #[tokio::test]
    async fn test_exhausted_quota_waits_after_success() {
        let (result, elapsed) = exhausted_quota_branches(200, r#"[{"name": "main"}]"#).await;

        assert_eq!(result.unwrap().len(), 1);
        assert!(elapsed >= Duration::from_millis(900), "returned after {elapsed:?}");
    }

    #[tokio::test]
    async fn test_exhausted_quota_waits_before_reporting_failure() {
        let (result, elapsed) =
            exhausted_quota_branches(403, r#"{"message": "API rate limit exceeded"}"#).await;

        assert!(matches!(
            result,
            Err(CommitLensError::Api { status, .. }) if status == StatusCode::FORBIDDEN
        ));
        assert!(elapsed >= Duration::from_millis(900), "returned after {elapsed:?}");
    }

    #[test]
    fn test_endpoint_encodes_segments_under_base_path() {
        let client = GitHubClient::new("https://ghe.example.com/api/v3/", None).unwrap();

        let url = client.endpoint(&["repos", "acme", "my repo", "commits"]).unwrap();

        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/acme/my%20repo/commits"
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let result = GitHubClient::new("not a url", None);

        assert!(matches!(result, Err(CommitLensError::Config(_))));
    }
}

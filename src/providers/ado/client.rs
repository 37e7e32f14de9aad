use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{AdoCommitDto, AdoList, AdoRefDto, AdoRepositoryDto};
use crate::auth::Token;
use crate::error::{CommitLensError, Result};
use crate::models::CommitQuery;
use crate::pagination::PageCursor;
use crate::providers::api_timestamp;

const API_VERSION: &str = "6.0";

pub struct AdoClient {
    client: Client,
    git_url: Url,
    username: String,
    token: Option<Token>,
}

impl AdoClient {
    pub fn new(
        base_url: &str,
        org: &str,
        project: &str,
        username: String,
        token: Option<Token>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("commitlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CommitLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut git_url = Url::parse(base_url)
            .map_err(|e| CommitLensError::Config(format!("Invalid Azure DevOps base URL: {e}")))?;
        git_url
            .path_segments_mut()
            .map_err(|()| {
                CommitLensError::Config(format!(
                    "Azure DevOps base URL cannot be a base: {base_url}"
                ))
            })?
            .pop_if_empty()
            .extend([org, project, "_apis", "git"]);

        Ok(Self {
            client,
            git_url,
            username,
            token,
        })
    }

    fn auth_request(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.token {
            request.basic_auth(&self.username, Some(token.as_str()))
        } else {
            request
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.git_url.clone();
        // git_url was already validated as a base in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, params: &[(&str, String)]) -> Result<T> {
        let request = self
            .client
            .get(url)
            .query(&[("api-version", API_VERSION)])
            .query(params);

        let response = self.auth_request(request).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(CommitLensError::Api { status, body });
        }

        Ok(response.json::<T>().await?)
    }

    pub async fn fetch_repositories(&self) -> Result<Vec<AdoRepositoryDto>> {
        let url = self.endpoint(&["repositories"]);
        let list: AdoList<AdoRepositoryDto> = self.get(url, &[]).await?;
        Ok(list.value)
    }

    pub async fn fetch_branches(&self, repository_id: &str) -> Result<Vec<AdoRefDto>> {
        let url = self.endpoint(&["repositories", repository_id, "refs"]);
        let params = [("filter", "heads/".to_string())];
        let list: AdoList<AdoRefDto> = self.get(url, &params).await?;
        Ok(list.value)
    }

    pub async fn fetch_commits_page(
        &self,
        repository_id: &str,
        query: &CommitQuery,
        cursor: PageCursor,
    ) -> Result<Vec<AdoCommitDto>> {
        let url = self.endpoint(&["repositories", repository_id, "commits"]);
        let (skip, top) = cursor.as_window();

        let mut params = Vec::new();
        if let Some(author) = &query.author {
            params.push(("searchCriteria.author", author.clone()));
        }
        if let Some(branch) = &query.branch {
            params.push(("searchCriteria.itemVersion.version", branch.clone()));
            params.push(("searchCriteria.itemVersion.versionType", "branch".to_string()));
        }
        if let Some(since) = query.since {
            params.push(("searchCriteria.fromDate", api_timestamp(since)));
        }
        if let Some(until) = query.until {
            params.push(("searchCriteria.toDate", api_timestamp(until)));
        }
        params.push(("searchCriteria.$skip", skip.to_string()));
        params.push(("searchCriteria.$top", top.to_string()));

        let list: AdoList<AdoCommitDto> = self.get(url, &params).await?;
        Ok(list.value)
    }
}
